//! Upload gatekeeper: admit a file, store it, hand it to the composer.
//!
//! Each session has at most one attempt in flight. The phase of that attempt
//! lives in a concurrent map keyed by user id; a missing entry means `Idle`.

use std::sync::Arc;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::error::UploadError;
use super::key::storage_key;
use super::validation::{UploadCandidate, UploadPolicy};
use crate::gateway::{MessageComposer, ObjectStore, PublicUrl, PutOptions, StoreError};
use crate::session::Session;

/// Cache header stored with every uploaded image.
pub const CACHE_CONTROL: &str = "max-age=3600";

/// Where a session's current attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    Idle,
    Validating,
    Uploading,
    Composing,
}

/// Admits, stores and publishes chat images.
pub struct UploadGatekeeper {
    store: Arc<dyn ObjectStore>,
    composer: Arc<dyn MessageComposer>,
    policy: UploadPolicy,
    in_flight: DashMap<Uuid, UploadPhase>,
}

impl UploadGatekeeper {
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        composer: Arc<dyn MessageComposer>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            store,
            composer,
            policy,
            in_flight: DashMap::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Current phase of `user_id`'s attempt.
    #[must_use]
    pub fn phase(&self, user_id: Uuid) -> UploadPhase {
        self.in_flight
            .get(&user_id)
            .map_or(UploadPhase::Idle, |phase| *phase)
    }

    /// Validate a candidate against this gatekeeper's policy.
    pub fn validate(&self, candidate: &UploadCandidate) -> Result<(), UploadError> {
        self.policy.validate(candidate).map_err(UploadError::from)
    }

    /// Store the file and return its public URL.
    #[tracing::instrument(
        skip(self, candidate, session),
        fields(user_id = %session.user_id, filename = %candidate.filename, size = candidate.byte_size)
    )]
    pub async fn upload(
        &self,
        candidate: UploadCandidate,
        session: &Session,
    ) -> Result<PublicUrl, UploadError> {
        let attempt = self.begin(session.user_id)?;
        self.store_candidate(&attempt, candidate, session).await
    }

    /// Full attempt: store the file, then post `[Image: name]` with its URL.
    #[tracing::instrument(
        skip(self, candidate, session),
        fields(user_id = %session.user_id, filename = %candidate.filename, room = %room)
    )]
    pub async fn submit(
        &self,
        candidate: UploadCandidate,
        session: &Session,
        room: &str,
    ) -> Result<PublicUrl, UploadError> {
        let attempt = self.begin(session.user_id)?;
        let filename = candidate.filename.clone();
        let url = self.store_candidate(&attempt, candidate, session).await?;

        attempt.set(UploadPhase::Composing);
        let text = format!("[Image: {filename}]");
        self.composer
            .post(session, room, &text, Some(url.as_str()))
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to post image message"))?;

        info!(url = %url, "Image message composed");
        Ok(url)
    }

    /// Claim the session's slot or report it busy.
    fn begin(&self, user_id: Uuid) -> Result<Attempt<'_>, UploadError> {
        match self.in_flight.entry(user_id) {
            Entry::Occupied(_) => Err(UploadError::InProgress),
            Entry::Vacant(slot) => {
                slot.insert(UploadPhase::Validating);
                Ok(Attempt {
                    in_flight: &self.in_flight,
                    user_id,
                })
            }
        }
    }

    async fn store_candidate(
        &self,
        attempt: &Attempt<'_>,
        candidate: UploadCandidate,
        session: &Session,
    ) -> Result<PublicUrl, UploadError> {
        self.validate(&candidate)?;

        attempt.set(UploadPhase::Uploading);

        let key = storage_key(
            session.user_id,
            &candidate.filename,
            &candidate.mime_type,
            Utc::now().timestamp_millis(),
            &mut rand::thread_rng(),
        );
        let options = PutOptions {
            overwrite: false,
            content_type: candidate.mime_type,
            cache_control: Some(CACHE_CONTROL.to_string()),
        };

        self.store
            .put(&key, candidate.bytes, options)
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "Object store write failed");
                UploadError::StoreWrite(e)
            })?;

        let url = self.store.public_url(&key).map_err(|e| match e {
            StoreError::Url(msg) => UploadError::UrlResolution(msg),
            other => UploadError::UrlResolution(other.to_string()),
        })?;

        info!(key = %key, "Image stored");
        Ok(url)
    }
}

/// Busy flag for one session. Released on drop, whatever the outcome.
struct Attempt<'a> {
    in_flight: &'a DashMap<Uuid, UploadPhase>,
    user_id: Uuid,
}

impl Attempt<'_> {
    fn set(&self, phase: UploadPhase) {
        if let Some(mut current) = self.in_flight.get_mut(&self.user_id) {
            *current = phase;
        }
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.user_id);
    }
}
