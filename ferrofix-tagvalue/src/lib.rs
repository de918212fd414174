/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix tag-value
//!
//! FIX tag=value encoding and decoding for the ferrofix engine.
//!
//! ## Features
//!
//! - **Streaming decoding**: records are fed one at a time; the checksum is
//!   accumulated in the same pass
//! - **Repeating groups**: group layouts from the dictionary drive nesting
//! - **Stateless encoding**: BodyLength and CheckSum are always computed
//! - **`memchr` splitting** for whole-buffer decoding

pub mod checksum;
pub mod decoder;
pub mod encoder;

pub use checksum::{RunningChecksum, calculate_checksum, format_checksum, parse_checksum};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use ferrofix_core::SOH;
