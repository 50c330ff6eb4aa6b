use parley_core::{
    Activity, ChannelAccount, ChannelAddress, ConversationAccount, ParleyError, ParleyResult,
};
use parley_trust::ServiceUrlTrust;

/// Locale assumed when a token is built from raw identity fields.
pub const DEFAULT_LOCALE: &str = "en";

/// A token carrying enough context to resume a prior conversation.
///
/// Equality is structural over all five fields. The hash covers only the
/// address, so two tokens for the same address but different locale or
/// user name hash identically; callers bucketing tokens by hash get one
/// bucket per conversation endpoint, which is the intended behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumptionToken {
    address: ChannelAddress,
    /// Display name of the user, when known; mutable.
    pub user_name: Option<String>,
    is_trusted_service_url: bool,
    /// Whether the conversation is a group conversation; mutable.
    pub is_group: bool,
    /// BCP-47 locale tag of the conversation, when known; mutable.
    pub locale: Option<String>,
}

impl ResumptionToken {
    /// Builds a token from a pre-built channel address.
    ///
    /// The trust flag is evaluated here, once, against the address's
    /// service URL; later mutation of the other fields never changes it.
    pub fn from_address(address: ChannelAddress, trust: &impl ServiceUrlTrust) -> Self {
        let is_trusted_service_url = trust.is_trusted(&address.service_url);
        Self {
            address,
            user_name: None,
            is_trusted_service_url,
            is_group: false,
            locale: None,
        }
    }

    /// Builds a token from raw identity fields with the [`DEFAULT_LOCALE`].
    pub fn from_identity(
        user_id: impl Into<String>,
        bot_id: impl Into<String>,
        conversation_id: impl Into<String>,
        channel_id: impl Into<String>,
        service_url: impl Into<String>,
        trust: &impl ServiceUrlTrust,
    ) -> Self {
        let address = ChannelAddress::new(bot_id, channel_id, user_id, conversation_id, service_url);
        let mut token = Self::from_address(address, trust);
        token.locale = Some(DEFAULT_LOCALE.to_string());
        token
    }

    /// Builds a token from raw identity fields with an explicit locale.
    ///
    /// Returns [`ParleyError::InvalidArgument`] when `locale` is empty;
    /// callers without a locale use [`ResumptionToken::from_identity`],
    /// which applies the default.
    pub fn from_identity_with_locale(
        user_id: impl Into<String>,
        bot_id: impl Into<String>,
        conversation_id: impl Into<String>,
        channel_id: impl Into<String>,
        service_url: impl Into<String>,
        locale: &str,
        trust: &impl ServiceUrlTrust,
    ) -> ParleyResult<Self> {
        if locale.is_empty() {
            return Err(ParleyError::InvalidArgument(
                "locale must not be empty".to_string(),
            ));
        }
        let mut token =
            Self::from_identity(user_id, bot_id, conversation_id, channel_id, service_url, trust);
        token.locale = Some(locale.to_string());
        Ok(token)
    }

    /// Builds a token from an inbound activity.
    ///
    /// The user name comes from the sender's display name (absent name
    /// stays `None`), the group flag from the conversation, and the
    /// locale from the activity verbatim, with no default applied.
    pub fn from_activity(activity: &Activity, trust: &impl ServiceUrlTrust) -> Self {
        let mut token = Self::from_address(ChannelAddress::from_activity(activity), trust);
        token.user_name = activity.from.name.clone();
        token.is_group = activity.conversation.is_group;
        token.locale = activity.locale.clone();
        token
    }

    /// The channel address the token was built for.
    pub fn address(&self) -> &ChannelAddress {
        &self.address
    }

    /// Whether the service URL was on the trust-list when the token was
    /// built. Fixed at construction time.
    pub fn is_trusted_service_url(&self) -> bool {
        self.is_trusted_service_url
    }

    /// Produces a minimal activity addressed back into the conversation.
    ///
    /// The activity gets a fresh random ID; the token's user becomes the
    /// sender and its bot the recipient. The consumer resuming the
    /// conversation is expected to trust the service URL's host first
    /// when [`ResumptionToken::is_trusted_service_url`] is `true` — the
    /// token itself performs no side effects.
    pub fn to_activity(&self) -> Activity {
        let from = ChannelAccount {
            id: self.address.user_id.clone(),
            name: self.user_name.clone(),
        };
        let recipient = ChannelAccount::new(self.address.bot_id.clone());
        let conversation = ConversationAccount {
            id: self.address.conversation_id.clone(),
            is_group: self.is_group,
        };
        let mut activity = Activity::new(
            self.address.channel_id.clone(),
            self.address.service_url.clone(),
            from,
            recipient,
            conversation,
        );
        activity.locale = self.locale.clone();
        activity
    }

    /// Rebuilds a token from decoded parts. The trust flag is restored
    /// verbatim rather than re-evaluated, so a decoded token compares
    /// equal to the one that was encoded.
    pub(crate) fn from_parts(
        address: ChannelAddress,
        user_name: Option<String>,
        is_trusted_service_url: bool,
        is_group: bool,
        locale: Option<String>,
    ) -> Self {
        Self {
            address,
            user_name,
            is_trusted_service_url,
            is_group,
            locale,
        }
    }
}

// Hash covers only the address by contract; see the type docs.
impl std::hash::Hash for ResumptionToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn trust_none(_: &str) -> bool {
        false
    }

    fn trust_all(_: &str) -> bool {
        true
    }

    fn sample_address() -> ChannelAddress {
        ChannelAddress::new("b1", "test", "u1", "c1", "https://trusted.example.com")
    }

    fn hash_of(token: &ResumptionToken) -> u64 {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn from_address_preserves_the_address() {
        let address = sample_address();
        let token = ResumptionToken::from_address(address.clone(), &trust_none);
        assert_eq!(token.address(), &address);
    }

    #[test]
    fn from_identity_defaults_the_locale() {
        let token = ResumptionToken::from_identity(
            "u1",
            "b1",
            "c1",
            "test",
            "https://trusted.example.com",
            &trust_none,
        );
        assert_eq!(token.locale.as_deref(), Some(DEFAULT_LOCALE));
        assert_eq!(token.address().user_id, "u1");
        assert_eq!(token.address().bot_id, "b1");
        assert_eq!(token.address().conversation_id, "c1");
        assert_eq!(token.address().channel_id, "test");
        assert!(!token.is_group);
        assert_eq!(token.user_name, None);
    }

    #[test]
    fn empty_locale_is_rejected() {
        let result = ResumptionToken::from_identity_with_locale(
            "u1",
            "b1",
            "c1",
            "test",
            "https://trusted.example.com",
            "",
            &trust_none,
        );
        assert!(matches!(result, Err(ParleyError::InvalidArgument(_))));
    }

    #[test]
    fn explicit_locale_is_stored() {
        let token = ResumptionToken::from_identity_with_locale(
            "u1",
            "b1",
            "c1",
            "test",
            "https://trusted.example.com",
            "en-US",
            &trust_none,
        )
        .unwrap();
        assert_eq!(token.locale.as_deref(), Some("en-US"));
    }

    #[test]
    fn trust_flag_is_fixed_at_construction() {
        let mut token = ResumptionToken::from_address(sample_address(), &trust_all);
        assert!(token.is_trusted_service_url());

        token.user_name = Some("Ada".to_string());
        token.is_group = true;
        token.locale = Some("fr".to_string());
        assert!(token.is_trusted_service_url());
    }

    #[test]
    fn trust_predicate_sees_the_service_url() {
        let trust = |url: &str| url == "https://trusted.example.com";
        let trusted = ResumptionToken::from_address(sample_address(), &trust);
        assert!(trusted.is_trusted_service_url());

        let other =
            ChannelAddress::new("b1", "test", "u1", "c1", "https://unknown.example.com");
        let untrusted = ResumptionToken::from_address(other, &trust);
        assert!(!untrusted.is_trusted_service_url());
    }

    #[test]
    fn equality_is_structural_over_all_fields() {
        let a = ResumptionToken::from_address(sample_address(), &trust_none);
        let b = ResumptionToken::from_address(sample_address(), &trust_none);
        assert_eq!(a, b);
        assert_eq!(b, a);

        let mut c = b.clone();
        c.locale = Some("de".to_string());
        assert_ne!(a, c);

        let mut d = b.clone();
        d.user_name = Some("Ada".to_string());
        assert_ne!(a, d);

        let e = ResumptionToken::from_address(sample_address(), &trust_all);
        assert_ne!(a, e);
    }

    #[test]
    fn hash_depends_only_on_the_address() {
        let a = ResumptionToken::from_address(sample_address(), &trust_none);
        let mut b = a.clone();
        b.user_name = Some("Ada".to_string());
        b.is_group = true;
        b.locale = Some("fr".to_string());

        assert_ne!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn from_activity_copies_sender_group_and_locale() {
        let mut activity = Activity::new(
            "slack",
            "https://slack.example.com",
            ChannelAccount::named("u1", "Ada"),
            ChannelAccount::new("b1"),
            ConversationAccount {
                id: "c1".to_string(),
                is_group: true,
            },
        );
        activity.locale = Some("en-GB".to_string());

        let token = ResumptionToken::from_activity(&activity, &trust_none);
        assert_eq!(token.user_name.as_deref(), Some("Ada"));
        assert!(token.is_group);
        assert_eq!(token.locale.as_deref(), Some("en-GB"));
        assert_eq!(token.address().user_id, "u1");
        assert_eq!(token.address().bot_id, "b1");
    }

    #[test]
    fn from_activity_without_locale_stores_none() {
        let activity = Activity::new(
            "slack",
            "https://slack.example.com",
            ChannelAccount::new("u1"),
            ChannelAccount::new("b1"),
            ConversationAccount {
                id: "c1".to_string(),
                is_group: false,
            },
        );

        let token = ResumptionToken::from_activity(&activity, &trust_none);
        assert_eq!(token.locale, None);
        assert_eq!(token.user_name, None);
    }

    #[test]
    fn to_activity_addresses_the_conversation() {
        let mut token = ResumptionToken::from_address(sample_address(), &trust_none);
        token.user_name = Some("Ada".to_string());
        token.is_group = true;
        token.locale = Some("en-US".to_string());

        let activity = token.to_activity();
        assert_eq!(activity.from.id, "u1");
        assert_eq!(activity.from.name.as_deref(), Some("Ada"));
        assert_eq!(activity.recipient.id, "b1");
        assert_eq!(activity.channel_id, "test");
        assert_eq!(activity.service_url, "https://trusted.example.com");
        assert_eq!(activity.conversation.id, "c1");
        assert!(activity.conversation.is_group);
        assert_eq!(activity.locale.as_deref(), Some("en-US"));
    }

    #[test]
    fn to_activity_generates_fresh_ids() {
        let token = ResumptionToken::from_address(sample_address(), &trust_none);
        assert_ne!(token.to_activity().id, token.to_activity().id);
    }
}
