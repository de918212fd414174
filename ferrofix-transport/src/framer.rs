/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! SOH field framing.
//!
//! The wire is split into `tag=value<SOH>` records. Message boundaries are
//! left to the streaming decoder, so BodyLength is never trusted here.

use crate::error::TransportError;
use bytes::{Buf, BytesMut};
use ferrofix_core::SOH;
use memchr::memchr;
use tokio_util::codec::Decoder;

/// Default upper bound on one field record, delimiter included.
pub const DEFAULT_MAX_FIELD_LENGTH: usize = 64 * 1024;

/// Splits a byte stream into SOH-terminated field records.
///
/// Each yielded record includes its trailing SOH.
#[derive(Debug, Clone)]
pub struct FieldFramer {
    max_field_length: usize,
    /// Bytes of `src` already scanned without finding SOH.
    scanned: usize,
}

impl FieldFramer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
            scanned: 0,
        }
    }

    #[must_use]
    pub const fn with_max_field_length(mut self, max: usize) -> Self {
        self.max_field_length = max;
        self
    }

    #[must_use]
    pub const fn max_field_length(&self) -> usize {
        self.max_field_length
    }

    /// Takes the next complete record off the front of `src`.
    ///
    /// # Errors
    /// [`TransportError::FieldTooLong`] when no SOH appears within the
    /// maximum field length. The offending bytes are discarded.
    pub fn next_field(&mut self, src: &mut BytesMut) -> Result<Option<BytesMut>, TransportError> {
        let start = self.scanned.min(src.len());
        match memchr(SOH, &src[start..]) {
            Some(pos) => {
                let end = start + pos + 1;
                self.scanned = 0;
                if end > self.max_field_length {
                    src.advance(end);
                    return Err(TransportError::FieldTooLong {
                        length: end,
                        max: self.max_field_length,
                    });
                }
                Ok(Some(src.split_to(end)))
            }
            None if src.len() > self.max_field_length => {
                let length = src.len();
                src.clear();
                self.scanned = 0;
                Err(TransportError::FieldTooLong {
                    length,
                    max: self.max_field_length,
                })
            }
            None => {
                self.scanned = src.len();
                Ok(None)
            }
        }
    }
}

impl Default for FieldFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FieldFramer {
    type Item = BytesMut;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.next_field(src)
    }
}
