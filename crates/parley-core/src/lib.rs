//! Core types and error definitions for the Parley conversation framework.
//!
//! This crate provides the foundational types shared across all Parley
//! crates: the channel address model, the activity (message) model, and
//! the unified error type.
//!
//! # Main types
//!
//! - [`ParleyError`] — Unified error enum for all Parley subsystems.
//! - [`ParleyResult`] — Convenience alias for `Result<T, ParleyError>`.
//! - [`ChannelAddress`] — Structured identifier for a conversation endpoint.
//! - [`Activity`] — A single inbound or outbound message on a channel.

/// Channel address model.
pub mod address;

/// Activity (message) model.
pub mod activity;

pub use activity::{Activity, ChannelAccount, ConversationAccount};
pub use address::ChannelAddress;

// --- Error types ---

/// Top-level error type for the Parley framework.
#[derive(Debug, thiserror::Error)]
pub enum ParleyError {
    /// A required argument was missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A serialized payload could not be decoded (bad base64, corrupt
    /// compression stream, or unexpected binary layout).
    #[error("Decode error: {0}")]
    Decode(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`ParleyError`].
pub type ParleyResult<T> = Result<T, ParleyError>;
