use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("alert for notification {notification_id} cannot be truncated below the wire size limit")]
    TruncationFailure {
        notification_id: String,
        alert: Option<String>,
    },

    #[error("encoded message is {} bytes, over the 2048 byte wire limit", .message.len())]
    ExceededMessageSize { message: Vec<u8> },

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device token decodes to {0} bytes, expected 32")]
    InvalidTokenLength(usize),

    #[error("device token is not valid hex: {0}")]
    InvalidTokenHex(#[from] hex::FromHexError),
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),
}
