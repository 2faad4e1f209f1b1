// Copy to secrets.local.rs (ignored by git). build.rs lifts these into
// LOCAL_* compile-time env vars used as configuration defaults.
pub const WIFI_SSID: &str = "MyWifi";
pub const WIFI_PASS: &str = "password1";
pub const OPENWEATHER_TOKEN: &str = "YOUR_API_KEY_HERE";
pub const LATITUDE: &str = "37.8";
pub const LONGITUDE: &str = "-122.26";
pub const TIMEZONE: &str = "PST8PDT,M3.2.0,M11.1.0";
pub const AIO_USERNAME: &str = "";
pub const AIO_KEY: &str = "";
