//! Conversation resumption tokens for the Parley framework.
//!
//! A [`ResumptionToken`] captures enough participant and address context
//! to greet a previously known conversation again later: the channel
//! address, the user's display name, whether the conversation is a group,
//! the locale, and whether the channel's service URL was trusted when the
//! token was built.
//!
//! The [`codec`] module turns a token into a compact transportable string
//! (`base64(deflate(tagged binary record))`) and back.
//!
//! # Example
//!
//! ```
//! use parley_resume::{codec, ResumptionToken};
//!
//! let trust = |url: &str| url == "https://svc.example.com";
//! let token = ResumptionToken::from_identity(
//!     "u1", "b1", "c1", "webchat", "https://svc.example.com", &trust,
//! );
//! let encoded = codec::serialize(&token)?;
//! let restored = codec::deserialize(&encoded)?;
//! assert_eq!(restored, token);
//! # Ok::<(), parley_core::ParleyError>(())
//! ```

/// Wire codec for resumption tokens.
pub mod codec;

/// The resumption token value object.
pub mod token;

pub use token::{ResumptionToken, DEFAULT_LOCALE};
