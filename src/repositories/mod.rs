pub mod device_repository;
pub mod notification_repository;
