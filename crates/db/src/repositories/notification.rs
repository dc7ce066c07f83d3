//! Notification repository implementing the fire-and-forget sink.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::entities::notifications;
use tillbook_core::audit::{AuditError, NewNotification, NotificationSink};

/// Notification repository implementation.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl NotificationSink for NotificationRepository {
    async fn notify(&self, notification: NewNotification) -> Result<(), AuditError> {
        let active = notifications::ActiveModel {
            id: Set(Uuid::new_v4()),
            recipient_user_id: Set(notification.recipient_user_id),
            actor_user_id: Set(notification.actor_user_id),
            notification_type: Set(notification.kind),
            title: Set(notification.title),
            message: Set(notification.message),
            link: Set(notification.link),
            severity: Set("warning".to_string()),
            data: Set(notification.data),
            read_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        active
            .insert(&self.db)
            .await
            .map_err(|e| AuditError::Notification(e.to_string()))?;
        Ok(())
    }
}
