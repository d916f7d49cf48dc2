use log::{error, info, warn};
use serde_json::json;

/// Installs the env_logger backend; safe to call more than once.
pub fn init() {
    let _ = env_logger::builder().format_timestamp_millis().try_init();
}

/// Logs an informational event in JSON format.
pub fn log_info(event: &str, message: &str) {
    info!("{}", json!({
        "event": event,
        "message": message
    }));
}

/// Logs a warning event in JSON format.
pub fn log_warn(event: &str, message: &str) {
    warn!("{}", json!({
        "event": event,
        "message": message
    }));
}

/// Logs an error event in JSON format.
pub fn log_error(event: &str, error_message: &str) {
    error!("{}", json!({
        "event": event,
        "error": error_message
    }));
}
