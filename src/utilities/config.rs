use dotenv::dotenv;
use std::env;

/// Initialize dotenv (only needs to be called once at startup)
pub fn init() {
    if dotenv().is_ok() {
        println!("Loaded .env file");
    } else {
        println!("No .env file loaded");
    }
}

/// Whether oversized frames should be accepted instead of failing the send.
/// Read at send time and passed into `message_for_sending` explicitly.
pub fn get_auto_truncate() -> bool {
    env::var("APN_AUTO_TRUNCATE")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
