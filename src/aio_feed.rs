use anyhow::Result;

use matrix_weather_clock::logging::LogFeed;

use crate::http_client;

const AIO_BASE: &str = "https://io.adafruit.com/api/v2";

/// Adafruit IO feed receiving forwarded log lines.
pub struct AioFeed {
    url: String,
    key: String,
}

impl AioFeed {
    pub fn new(username: &str, key: &str, feed: &str) -> Self {
        Self {
            url: format!("{}/{}/feeds/{}/data", AIO_BASE, username, feed),
            key: key.to_string(),
        }
    }
}

impl LogFeed for AioFeed {
    fn push(&self, value: &str) -> Result<()> {
        let body = serde_json::json!({ "value": value }).to_string();
        http_client::https_post_json(&self.url, &[("X-AIO-Key", self.key.as_str())], &body)
    }
}
