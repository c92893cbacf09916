//! Message composer writing chat messages through the data gateway.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::gateway::{ComposerError, DataGateway, MessageComposer, MessageRecord, Record};
use crate::session::Session;

/// Posts user messages as `messages` rows.
#[derive(Clone)]
pub struct GatewayComposer {
    gateway: Arc<dyn DataGateway>,
}

impl GatewayComposer {
    #[must_use]
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl MessageComposer for GatewayComposer {
    async fn post(
        &self,
        session: &Session,
        room: &str,
        text: &str,
        attachment_url: Option<&str>,
    ) -> Result<(), ComposerError> {
        let text = text.trim();
        if text.is_empty() && attachment_url.is_none() {
            return Err(ComposerError::Empty);
        }

        let mut message = MessageRecord::new(session.user_id, &session.display_name, room, text);
        if let Some(url) = attachment_url {
            message = message.with_image(url);
        }

        self.gateway.insert(Record::Message(message)).await?;

        debug!(room = %room, user_id = %session.user_id, "Message posted");
        Ok(())
    }
}
