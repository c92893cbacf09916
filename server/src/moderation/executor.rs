//! Moderation action executor.
//!
//! Runs the local policy checks, issues exactly one primary mutation and then
//! posts one derived notice. The notice is best-effort.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::action::ModerationAction;
use super::notice::derived_notice;
use super::policy;
use super::types::{ModerationReceipt, PolicyError};
use crate::gateway::{AnnouncementRecord, DataGateway, Filter, Patch, Record, Table, UserRecord};
use crate::session::{Role, Session};

/// Executes privileged moderation actions against the data gateway.
#[derive(Clone)]
pub struct ModerationExecutor {
    gateway: Arc<dyn DataGateway>,
    notice_room: String,
}

impl ModerationExecutor {
    #[must_use]
    pub fn new(gateway: Arc<dyn DataGateway>, notice_room: impl Into<String>) -> Self {
        Self {
            gateway,
            notice_room: notice_room.into(),
        }
    }

    /// Authorize and run `action` on behalf of `session`.
    #[tracing::instrument(
        skip(self, action, session),
        fields(action = action.action_name(), actor = %session.username, role = %session.role)
    )]
    pub async fn execute(
        &self,
        action: ModerationAction,
        session: &Session,
    ) -> Result<ModerationReceipt, PolicyError> {
        let action = action.normalized();

        policy::authorize(&action, session)?;

        if policy::needs_target_lookup(&action, session.role) {
            let target = action.target().unwrap_or_default();
            let user = self
                .find_user(target)
                .await?
                .ok_or_else(|| PolicyError::TargetNotFound {
                    username: target.to_string(),
                })?;
            policy::check_kick_target(user.role)?;
        }

        let rows_affected = self.apply(&action, session).await?;

        info!(rows_affected, "Moderation action applied");

        let warning = self.post_notice(&action, session).await;

        Ok(ModerationReceipt {
            action: action.action_name(),
            rows_affected,
            warning,
        })
    }

    /// Primary mutation. Exactly one gateway write.
    async fn apply(&self, action: &ModerationAction, session: &Session) -> Result<u64, PolicyError> {
        match action {
            ModerationAction::Announce { text } => {
                let record = Record::Announcement(AnnouncementRecord {
                    text: text.clone(),
                    created_by: session.user_id,
                    timestamp: Utc::now(),
                    read_by: Vec::new(),
                });
                self.gateway.insert(record).await?;
                Ok(1)
            }
            ModerationAction::Kick { target } => {
                self.update_user(target, Patch::Online(false)).await
            }
            ModerationAction::GrantAdmin { target } => {
                self.update_user(target, Patch::Role(Role::Admin)).await
            }
            ModerationAction::RevokeAdmin { target } => {
                self.update_user(target, Patch::Role(Role::User)).await
            }
            ModerationAction::ClearChat { room } => {
                // An empty room clears nothing and is still a success.
                let rows = self
                    .gateway
                    .update(Table::Messages, &Filter::Room(room.clone()), &Patch::Deleted(true))
                    .await?;
                Ok(rows)
            }
        }
    }

    async fn update_user(&self, username: &str, patch: Patch) -> Result<u64, PolicyError> {
        let rows = self
            .gateway
            .update(Table::Users, &Filter::Username(username.to_string()), &patch)
            .await?;

        if rows == 0 {
            return Err(PolicyError::TargetNotFound {
                username: username.to_string(),
            });
        }

        Ok(rows)
    }

    async fn find_user(&self, username: &str) -> Result<Option<UserRecord>, PolicyError> {
        let record = self
            .gateway
            .select_one(Table::Users, &Filter::Username(username.to_string()))
            .await?;

        Ok(record.and_then(Record::into_user))
    }

    /// Post the derived notice. Returns a warning instead of failing.
    async fn post_notice(&self, action: &ModerationAction, session: &Session) -> Option<String> {
        let notice = derived_notice(action, session, &self.notice_room);

        match self.gateway.insert(Record::Message(notice)).await {
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to post moderation notice");
                Some(format!("Action applied, but the chat notice failed: {e}"))
            }
        }
    }
}
