use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct WebConfig {
    /// Address of the public API listener
    pub api_host: String,
    /// Address of the debug listener serving `/metrics`
    pub debug_host: String,
    /// Deadline for a single request before it is cancelled
    pub request_timeout: Duration,
    /// How long in-flight requests may drain after shutdown begins
    pub shutdown_timeout: Duration,
    /// Directory for rolling log files
    pub log_dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0:3000".to_string(),
            debug_host: "0.0.0.0:4000".to_string(),
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(5),
            log_dir: "storage/logs".to_string(),
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_host: env::var("SALES_WEB_API_HOST").unwrap_or(defaults.api_host),
            debug_host: env::var("SALES_WEB_DEBUG_HOST").unwrap_or(defaults.debug_host),
            request_timeout: env::var("SALES_WEB_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            shutdown_timeout: env::var("SALES_WEB_SHUTDOWN_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_timeout),
            log_dir: env::var("SALES_LOG_DIR").unwrap_or(defaults.log_dir),
        }
    }
}
