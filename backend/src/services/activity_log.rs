//! Best-effort audit-trail writer.
//!
//! Mutating handlers call [`ActivityLogService::log`] after their primary
//! operation commits. The write is dispatched fire-and-forget; a sink
//! failure is reported to diagnostics and swallowed, so the triggering
//! operation never blocks on, or fails because of, the audit trail.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::models::activity::{Activity, ActivityAction, ItemType};
use crate::repositories::activity as activity_repo;

/// One audit event as reported by a handler.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    pub user_id: Option<String>,
    pub action: ActivityAction,
    pub item_type: ItemType,
    pub item_id: Option<String>,
    pub metadata: Option<Value>,
    pub ip_address: Option<String>,
}

/// Destination for audit records; injected so tests can observe or fail
/// writes without a database.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, activity: Activity) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct SqlActivitySink {
    pool: PgPool,
}

impl SqlActivitySink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivitySink for SqlActivitySink {
    async fn record(&self, activity: Activity) -> anyhow::Result<()> {
        activity_repo::insert_activity(&self.pool, &activity).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct ActivityLogService {
    sink: Arc<dyn ActivitySink>,
}

impl ActivityLogService {
    pub fn new(sink: Arc<dyn ActivitySink>) -> Self {
        Self { sink }
    }

    /// Appends one audit record, fire-and-forget. Returns immediately; the
    /// spawned write reports failure via `tracing::warn!` and nothing else.
    pub fn log(&self, entry: ActivityEntry) {
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            user_id: entry.user_id,
            action: entry.action,
            item_type: entry.item_type,
            item_id: entry.item_id,
            metadata: entry.metadata.map(Json),
            ip_address: entry.ip_address,
            created_at: Utc::now(),
        };
        let action = activity.action.as_str();
        let item_type = activity.item_type.as_str();
        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(err) = sink.record(activity).await {
                tracing::warn!(
                    error = ?err,
                    action,
                    item_type,
                    "Failed to record activity"
                );
            }
        });
    }

    pub fn log_listing(
        &self,
        user_id: Option<String>,
        action: ActivityAction,
        listing_id: &str,
        title: &str,
        ip_address: Option<String>,
    ) {
        self.log(ActivityEntry {
            user_id,
            action,
            item_type: ItemType::Listing,
            item_id: Some(listing_id.to_string()),
            metadata: Some(json!({ "title": title })),
            ip_address,
        });
    }

    pub fn log_blog_post(
        &self,
        user_id: Option<String>,
        action: ActivityAction,
        post_id: &str,
        title: &str,
        ip_address: Option<String>,
    ) {
        self.log(ActivityEntry {
            user_id,
            action,
            item_type: ItemType::BlogPost,
            item_id: Some(post_id.to_string()),
            metadata: Some(json!({ "title": title })),
            ip_address,
        });
    }

    pub fn log_user(
        &self,
        actor_id: Option<String>,
        action: ActivityAction,
        target_user_id: &str,
        email: &str,
        ip_address: Option<String>,
    ) {
        self.log(ActivityEntry {
            user_id: actor_id,
            action,
            item_type: ItemType::User,
            item_id: Some(target_user_id.to_string()),
            metadata: Some(json!({ "email": email })),
            ip_address,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct RecordingSink {
        tx: mpsc::UnboundedSender<Activity>,
    }

    #[async_trait]
    impl ActivitySink for RecordingSink {
        async fn record(&self, activity: Activity) -> anyhow::Result<()> {
            self.tx.send(activity).ok();
            Ok(())
        }
    }

    struct FailingSink {
        calls: Mutex<u32>,
        tx: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl ActivitySink for FailingSink {
        async fn record(&self, _activity: Activity) -> anyhow::Result<()> {
            *self.calls.lock().unwrap() += 1;
            self.tx.send(()).ok();
            Err(anyhow::anyhow!("audit store down"))
        }
    }

    #[tokio::test]
    async fn log_listing_records_title_metadata() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = ActivityLogService::new(Arc::new(RecordingSink { tx }));

        service.log_listing(
            Some("user-1".into()),
            ActivityAction::Create,
            "listing-1",
            "Sunny duplex",
            Some("203.0.113.9".into()),
        );

        let recorded = rx.recv().await.expect("activity recorded");
        assert_eq!(recorded.user_id.as_deref(), Some("user-1"));
        assert_eq!(recorded.action, ActivityAction::Create);
        assert_eq!(recorded.item_type, ItemType::Listing);
        assert_eq!(recorded.item_id.as_deref(), Some("listing-1"));
        assert_eq!(recorded.metadata.unwrap().0["title"], "Sunny duplex");
    }

    #[tokio::test]
    async fn sink_failure_never_reaches_the_caller() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service = ActivityLogService::new(Arc::new(FailingSink {
            calls: Mutex::new(0),
            tx,
        }));

        // The caller's side of the contract: log() returns immediately and
        // the spawned write's failure stays inside the service.
        service.log(ActivityEntry {
            user_id: None,
            action: ActivityAction::Delete,
            item_type: ItemType::Listing,
            item_id: Some("listing-9".into()),
            metadata: None,
            ip_address: None,
        });

        rx.recv().await.expect("sink was invoked");
    }
}
