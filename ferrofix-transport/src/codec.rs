/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Tokio codec for FIX messages.
//!
//! Frames fields with [`FieldFramer`], assembles them with the streaming
//! [`Decoder`](ferrofix_tagvalue::Decoder) and encodes outbound messages
//! with the stateless [`Encoder`](ferrofix_tagvalue::Encoder).

use crate::error::TransportError;
use crate::framer::FieldFramer;
use bytes::BytesMut;
use ferrofix_core::{DecodeError, Message};
use ferrofix_dictionary::Dictionary;
use ferrofix_tagvalue::{Decoder as MessageDecoder, Encoder as MessageEncoder};
use std::sync::Arc;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

/// Tokio codec producing one item per completed or failed message.
///
/// Items are `Result<Message, DecodeError>`: a checksum mismatch or a bad
/// field discards that message only and the stream continues.
#[derive(Debug)]
pub struct FixCodec {
    framer: FieldFramer,
    decoder: MessageDecoder,
    encoder: MessageEncoder,
}

impl FixCodec {
    /// Creates a codec with the standard dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_dictionary(Arc::new(Dictionary::default()))
    }

    /// Creates a codec whose decoder uses `dictionary` for field types and
    /// group layouts.
    #[must_use]
    pub fn with_dictionary(dictionary: Arc<Dictionary>) -> Self {
        Self {
            framer: FieldFramer::new(),
            decoder: MessageDecoder::new(dictionary),
            encoder: MessageEncoder::new(),
        }
    }

    /// Sets the maximum length of one field record.
    #[must_use]
    pub fn with_max_field_length(mut self, max: usize) -> Self {
        self.framer = self.framer.with_max_field_length(max);
        self
    }
}

impl Default for FixCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FixCodec {
    type Item = Result<Message, DecodeError>;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while let Some(field) = self.framer.next_field(src)? {
            match self.decoder.decode_field(&field) {
                Ok(None) => {}
                Ok(Some(message)) => return Ok(Some(Ok(message))),
                Err(err) => return Ok(Some(Err(err))),
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        if !src.is_empty() || !self.decoder.is_idle() {
            warn!(pending = src.len(), "stream closed inside a message");
            src.clear();
            self.decoder.reset();
        }
        Ok(None)
    }
}

impl Encoder<Message> for FixCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.encoder.encode_into(&item, dst)?;
        Ok(())
    }
}
