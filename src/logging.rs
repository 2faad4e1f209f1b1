use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::ClockError;

/// Remote sink for forwarded log lines (an Adafruit IO feed on hardware).
pub trait LogFeed: Send + Sync {
    fn push(&self, value: &str) -> anyhow::Result<()>;
}

/// `log::Log` that writes everything to an inner logger and forwards records
/// at or above `threshold` to a remote feed.
///
/// Delivery is best-effort: failures are reported to the inner logger only.
/// Records emitted while a push is in flight (the HTTP stack logs too) stay
/// local.
pub struct FeedLogger<F: LogFeed> {
    inner: Box<dyn Log>,
    feed: Option<F>,
    threshold: Level,
    sending: AtomicBool,
}

impl<F: LogFeed> FeedLogger<F> {
    pub fn new(inner: Box<dyn Log>, feed: Option<F>, threshold: Level) -> Self {
        Self {
            inner,
            feed,
            threshold,
            sending: AtomicBool::new(false),
        }
    }

    fn forward(&self, feed: &F, record: &Record) {
        if record.level() > self.threshold {
            return;
        }
        if self.sending.swap(true, Ordering::Acquire) {
            return;
        }
        if let Err(e) = feed.push(&format_record(record)) {
            let err = ClockError::LogDelivery(e);
            self.inner.log(
                &Record::builder()
                    .level(Level::Warn)
                    .target("logging")
                    .args(format_args!("{}", err))
                    .build(),
            );
        }
        self.sending.store(false, Ordering::Release);
    }
}

impl<F: LogFeed + 'static> FeedLogger<F> {
    /// Install as the global logger.
    pub fn install(self, max_level: LevelFilter) -> anyhow::Result<()> {
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| anyhow::anyhow!("logger already installed: {}", e))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl<F: LogFeed> Log for FeedLogger<F> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata) || (self.feed.is_some() && metadata.level() <= self.threshold)
    }

    fn log(&self, record: &Record) {
        self.inner.log(record);
        if let Some(feed) = &self.feed {
            self.forward(feed, record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Feed line for one record: `"{LEVEL} - {message}"`.
pub fn format_record(record: &Record) -> String {
    format!("{} - {}", record.level(), record.args())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<String>>>);

    impl Capture {
        fn lines(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Log for Capture {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.0.lock().unwrap().push(format_record(record));
        }

        fn flush(&self) {}
    }

    struct TestFeed {
        sent: Capture,
        fail: bool,
    }

    impl LogFeed for TestFeed {
        fn push(&self, value: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("HTTP error: status 503");
            }
            self.sent.0.lock().unwrap().push(value.to_string());
            Ok(())
        }
    }

    fn emit(logger: &impl Log, level: Level, msg: &str) {
        logger.log(
            &Record::builder()
                .level(level)
                .target("test")
                .args(format_args!("{}", msg))
                .build(),
        );
    }

    fn logger(fail: bool) -> (FeedLogger<TestFeed>, Capture, Capture) {
        let local = Capture::default();
        let sent = Capture::default();
        let feed = TestFeed { sent: sent.clone(), fail };
        let logger = FeedLogger::new(Box::new(local.clone()), Some(feed), Level::Info);
        (logger, local, sent)
    }

    #[test]
    fn test_threshold_filters_feed_only() {
        let (logger, local, sent) = logger(false);
        emit(&logger, Level::Debug, "redraw");
        emit(&logger, Level::Info, "FETCH weather");
        emit(&logger, Level::Error, "fault");

        assert_eq!(local.lines().len(), 3);
        assert_eq!(sent.lines(), vec!["INFO - FETCH weather", "ERROR - fault"]);
    }

    #[test]
    fn test_delivery_failure_is_swallowed() {
        let (logger, local, _) = logger(true);
        emit(&logger, Level::Warn, "time sync failed");

        let lines = local.lines();
        assert_eq!(lines[0], "WARN - time sync failed");
        assert!(lines[1].starts_with("WARN - log delivery failed"));
        assert!(!logger.sending.load(Ordering::Relaxed));
    }

    #[test]
    fn test_records_during_push_stay_local() {
        let (logger, local, sent) = logger(false);
        logger.sending.store(true, Ordering::Relaxed);
        emit(&logger, Level::Info, "HTTP POST");

        assert_eq!(local.lines(), vec!["INFO - HTTP POST"]);
        assert!(sent.lines().is_empty());
    }

    #[test]
    fn test_without_feed_is_plain_passthrough() {
        let local = Capture::default();
        let logger: FeedLogger<TestFeed> = FeedLogger::new(Box::new(local.clone()), None, Level::Info);
        emit(&logger, Level::Info, "boot");
        assert_eq!(local.lines(), vec!["INFO - boot"]);
    }
}
