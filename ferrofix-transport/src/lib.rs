/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix transport
//!
//! Stream framing for the ferrofix FIX engine.
//!
//! This crate provides:
//! - **Field framing**: SOH record splitter with a maximum field length
//! - **Codec**: Tokio codec yielding decoded messages, one per item

pub mod codec;
pub mod error;
pub mod framer;

pub use codec::FixCodec;
pub use error::TransportError;
pub use framer::{DEFAULT_MAX_FIELD_LENGTH, FieldFramer};
