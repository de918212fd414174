/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Error types for the ferrofix FIX protocol engine.
//!
//! Each layer owns a `thiserror` enum; [`FixError`] unifies them for callers
//! that drive the whole stack.

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all ferrofix operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error during message encoding.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Invalid numeric literal.
    #[error("numeric error: {0}")]
    Numeric(#[from] NumericError),

    /// I/O error from underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing fixed-point numbers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumericError {
    /// A byte that is not a digit, a leading sign or a single decimal point.
    #[error("invalid numeric literal: '{0}'")]
    InvalidNumericLiteral(String),

    /// The literal does not fit a 64-bit scaled value.
    #[error("numeric literal out of range: '{0}'")]
    Overflow(String),
}

/// Errors that occur during FIX message decoding.
///
/// Every variant is fatal to the message being assembled, never to the
/// decoder: the next BeginString starts from a clean state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The first field of a message was not BeginString (tag 8).
    #[error("missing begin string: message started with tag {tag}")]
    MissingBeginString {
        /// Tag of the field that arrived instead.
        tag: u32,
    },

    /// BeginString arrived before the previous message was closed by tag 10.
    #[error("unexpected begin string while a message is in progress")]
    UnexpectedBeginString,

    /// Checksum mismatch between the declared and the computed value.
    #[error("checksum mismatch: expected {expected}, actual {actual}")]
    ChecksumMismatch {
        /// Checksum declared in tag 10.
        expected: u8,
        /// Checksum computed over the received bytes.
        actual: u8,
    },

    /// Raw field without a `tag=value` shape.
    #[error("malformed field: {0}")]
    MalformedField(String),

    /// Invalid tag format (not a positive integer).
    #[error("invalid tag format: {0}")]
    InvalidTag(String),

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Repeating group count mismatch.
    #[error("group count mismatch for tag {count_tag}: expected {expected}, found {actual}")]
    GroupCountMismatch {
        /// The tag containing the group count.
        count_tag: u32,
        /// Declared number of group entries.
        expected: usize,
        /// Number of group entries found on the wire.
        actual: usize,
    },
}

impl DecodeError {
    /// Builds an [`DecodeError::InvalidFieldValue`] for `tag`.
    pub fn invalid_value(tag: u32, reason: impl Into<String>) -> Self {
        Self::InvalidFieldValue {
            tag,
            reason: reason.into(),
        }
    }
}

/// Errors that occur during FIX message encoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A header field the wire format cannot do without.
    #[error("missing required field: tag {tag}")]
    MissingRequiredField {
        /// The tag number of the missing field.
        tag: u32,
    },

    /// Invalid field value for encoding.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },
}

/// Errors in FIX session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Session is not in the correct state for the operation.
    #[error("illegal state: expected {expected}, current {current}")]
    IllegalState {
        /// Expected state for the operation.
        expected: String,
        /// Current session state.
        current: String,
    },

    /// Outbound message requested before the session was established.
    #[error("session not established")]
    NotEstablished,

    /// Sequence number lower than expected (possible duplicate).
    #[error("sequence too low: expected {expected}, received {received}")]
    SequenceTooLow {
        /// Expected sequence number.
        expected: u32,
        /// Received sequence number.
        received: u32,
    },

    /// Another live connection already owns the session.
    #[error("session already active: {0}")]
    DuplicateSession(String),

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}
