use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::errors::RepositoryError;
use crate::models::notification::Notification;

/// Persistence port for notification records. Production backends live in
/// consuming crates; the encoder only ever sees plain `Notification` values.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn save(&self, notification: &Notification) -> Result<(), RepositoryError>;
    async fn find(&self, id: &str) -> Result<Option<Notification>, RepositoryError>;
    /// Records not yet marked sent, oldest first.
    async fn unsent(&self) -> Result<Vec<Notification>, RepositoryError>;
    async fn unsent_ids(&self) -> Result<Vec<String>, RepositoryError>;
    async fn mark_sent(&self, id: &str, when: DateTime<Utc>) -> Result<(), RepositoryError>;
}

/// In-memory implementation backing tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryNotificationRepository {
    records: RwLock<HashMap<String, Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn save(&self, notification: &Notification) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        records.insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Notification>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn unsent(&self) -> Result<Vec<Notification>, RepositoryError> {
        let records = self.records.read().await;
        let mut unsent: Vec<Notification> = records
            .values()
            .filter(|record| record.sent_at.is_none())
            .cloned()
            .collect();
        unsent.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(unsent)
    }

    async fn unsent_ids(&self) -> Result<Vec<String>, RepositoryError> {
        let unsent = self.unsent().await?;
        Ok(unsent.into_iter().map(|record| record.id).collect())
    }

    async fn mark_sent(&self, id: &str, when: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        record.sent_at = Some(when);
        Ok(())
    }
}
