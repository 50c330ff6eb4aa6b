use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant account on a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    /// Channel-scoped identifier of the participant.
    pub id: String,
    /// Optional display name of the participant.
    #[serde(default)]
    pub name: Option<String>,
}

impl ChannelAccount {
    /// Creates an account with an ID and no display name.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Creates an account with an ID and a display name.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    /// Channel-scoped identifier of the conversation.
    pub id: String,
    /// Whether the conversation has more than two participants.
    /// Channels that omit the flag mean a direct conversation.
    #[serde(default)]
    pub is_group: bool,
}

/// A single inbound or outbound message on a channel.
///
/// This is the minimal activity shape the framework routes: enough to
/// identify the participants, the conversation, and the channel service,
/// plus optional text and locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier for this activity.
    pub id: Uuid,
    /// Identifier of the channel the activity travels on.
    pub channel_id: String,
    /// Base URL of the channel service.
    pub service_url: String,
    /// The sending participant.
    pub from: ChannelAccount,
    /// The receiving participant.
    pub recipient: ChannelAccount,
    /// The conversation this activity belongs to.
    pub conversation: ConversationAccount,
    /// Optional message text.
    #[serde(default)]
    pub text: Option<String>,
    /// Optional BCP-47 locale tag of the sender.
    #[serde(default)]
    pub locale: Option<String>,
    /// UTC timestamp of when the activity was created.
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    /// Creates an activity with a fresh random ID and current timestamp.
    pub fn new(
        channel_id: impl Into<String>,
        service_url: impl Into<String>,
        from: ChannelAccount,
        recipient: ChannelAccount,
        conversation: ConversationAccount,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id: channel_id.into(),
            service_url: service_url.into(),
            from,
            recipient,
            conversation,
            text: None,
            locale: None,
            timestamp: Utc::now(),
        }
    }
}
