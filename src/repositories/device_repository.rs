use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::device::Device;
use crate::models::errors::RepositoryError;

/// Interface
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn save_device(&self, device: &Device) -> Result<(), RepositoryError>;
    async fn get_device(&self, id: &str) -> Result<Option<Device>, RepositoryError>;
}

/// In-memory implementation
#[derive(Default)]
pub struct InMemoryDeviceRepository {
    devices: RwLock<HashMap<String, Device>>,
}

impl InMemoryDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRepository for InMemoryDeviceRepository {
    async fn save_device(&self, device: &Device) -> Result<(), RepositoryError> {
        let mut devices = self.devices.write().await;
        devices.insert(device.id.clone(), device.clone());
        Ok(())
    }

    async fn get_device(&self, id: &str) -> Result<Option<Device>, RepositoryError> {
        let devices = self.devices.read().await;
        Ok(devices.get(id).cloned())
    }
}
