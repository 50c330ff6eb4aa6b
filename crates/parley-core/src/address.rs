use serde::{Deserialize, Serialize};

use crate::Activity;

/// Structured identifier for a conversation endpoint.
///
/// An address pins down one participant pair on one channel: which bot,
/// which user, which conversation, and the service URL the channel is
/// reachable at. Two addresses are equal when all five fields are equal,
/// and the address is the sole input to a containing token's hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelAddress {
    /// Identifier of the bot participant.
    pub bot_id: String,
    /// Identifier of the channel (e.g. "slack", "webchat").
    pub channel_id: String,
    /// Identifier of the human participant.
    pub user_id: String,
    /// Identifier of the conversation on the channel.
    pub conversation_id: String,
    /// Base URL of the channel service hosting the conversation.
    pub service_url: String,
}

impl ChannelAddress {
    /// Creates an address from its five identity fields.
    pub fn new(
        bot_id: impl Into<String>,
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        conversation_id: impl Into<String>,
        service_url: impl Into<String>,
    ) -> Self {
        Self {
            bot_id: bot_id.into(),
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            conversation_id: conversation_id.into(),
            service_url: service_url.into(),
        }
    }

    /// Derives the address of an inbound activity.
    ///
    /// The activity's `from` account is the user side and its `recipient`
    /// is the bot side.
    pub fn from_activity(activity: &Activity) -> Self {
        Self {
            bot_id: activity.recipient.id.clone(),
            channel_id: activity.channel_id.clone(),
            user_id: activity.from.id.clone(),
            conversation_id: activity.conversation.id.clone(),
            service_url: activity.service_url.clone(),
        }
    }
}
