/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Transport errors.

use ferrofix_core::EncodeError;
use thiserror::Error;

/// Errors that end or interrupt a FIX byte stream.
///
/// Decode errors are not here: the codec yields them as items so that a
/// bad message does not end the stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A field record exceeded the configured maximum without an SOH.
    #[error("field too long: {length} bytes exceeds maximum {max}")]
    FieldTooLong {
        /// Bytes seen for the record.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// An outbound message could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
