use core::fmt;

/// Failures the main loop knows how to classify.
///
/// Every variant is recoverable: the loop logs it and carries on, so nothing
/// here ever terminates the process.
#[derive(Debug)]
pub enum ClockError {
    /// Time sync did not complete. Retried on the next due check.
    TimeSync(anyhow::Error),
    /// Network fetch of the weather payload failed.
    Fetch(anyhow::Error),
    /// Payload arrived but a required field was missing or had the wrong type.
    MalformedPayload(&'static str),
    /// Render surface could not commit the frame.
    Render(anyhow::Error),
    /// Remote log record could not be delivered. Never leaves the logger.
    LogDelivery(anyhow::Error),
}

impl ClockError {
    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TimeSync(_) => "time-sync",
            Self::Fetch(_) => "fetch",
            Self::MalformedPayload(_) => "malformed-payload",
            Self::Render(_) => "render",
            Self::LogDelivery(_) => "log-delivery",
        }
    }

    /// Whether this error sends the loop into the backoff sleep.
    pub fn triggers_backoff(&self) -> bool {
        matches!(
            self,
            Self::Fetch(_) | Self::MalformedPayload(_) | Self::Render(_)
        )
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeSync(e) => write!(f, "time sync failed: {}", e),
            Self::Fetch(e) => write!(f, "weather fetch failed: {}", e),
            Self::MalformedPayload(field) => {
                write!(f, "malformed weather payload: missing or invalid `{}`", field)
            }
            Self::Render(e) => write!(f, "render failed: {}", e),
            Self::LogDelivery(e) => write!(f, "log delivery failed: {}", e),
        }
    }
}

impl std::error::Error for ClockError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TimeSync(e) | Self::Fetch(e) | Self::Render(e) | Self::LogDelivery(e) => {
                Some(&**e)
            }
            Self::MalformedPayload(_) => None,
        }
    }
}
