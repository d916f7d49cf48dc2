pub mod device;
pub mod errors;
pub mod notification;
