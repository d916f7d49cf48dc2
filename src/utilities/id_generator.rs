use uuid::Uuid;

/// Generates a unique notification ID
pub fn generate_notification_id() -> String {
    format!("not_{}", Uuid::new_v4())
}

/// Generates a unique device ID
pub fn generate_device_id() -> String {
    format!("dev_{}", Uuid::new_v4())
}
