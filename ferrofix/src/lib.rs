/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix
//!
//! A FIX tag=value codec and session engine for Rust.
//!
//! ## Features
//!
//! - **Streaming decoder**: fields are consumed one at a time, so a message
//!   can arrive in any number of reads
//! - **Checksum verified**: corrupt messages are discarded without
//!   tearing down the connection
//! - **Repeating groups**: nested groups laid out by the dictionary
//! - **Async support**: built on Tokio, with sans-IO protocol handlers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrofix::prelude::*;
//!
//! let engine = Engine::builder()
//!     .with_application(MyApplication)
//!     .with_session(SessionSettings::new("FIX.4.4", "SENDER", "TARGET"))
//!     .build()?;
//! let connection = engine.connect("127.0.0.1:9876").await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Message model, field values and error definitions
//! - [`dictionary`]: Field types and repeating group layouts
//! - [`tagvalue`]: Tag=value encoding and decoding
//! - [`session`]: Session identity, settings and sequence numbers
//! - [`transport`]: Stream framing and the Tokio codec
//! - [`engine`]: Acceptor, initiator and application callbacks

pub mod core {
    //! Message model, field values and error definitions.
    pub use ferrofix_core::*;
}

pub mod dictionary {
    //! Field types and repeating group layouts.
    pub use ferrofix_dictionary::*;
}

pub mod tagvalue {
    //! Tag=value encoding and decoding.
    pub use ferrofix_tagvalue::*;
}

pub mod session {
    //! Session identity, settings and sequence numbers.
    pub use ferrofix_session::*;
}

pub mod transport {
    //! Stream framing and the Tokio codec.
    pub use ferrofix_transport::*;
}

pub mod engine {
    //! Acceptor, initiator and application callbacks.
    pub use ferrofix_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use ferrofix_core::{
        DecodeError, EncodeError, Field, FieldValue, FixError, FixedPointNumber, Group,
        GroupField, Message, MsgType, Result, SessionError, UtcTimestamp, tags,
    };

    // Dictionary
    pub use ferrofix_dictionary::{Dictionary, FieldType, Version};

    // Tag-value encoding
    pub use ferrofix_tagvalue::{Decoder, Encoder, calculate_checksum};

    // Session
    pub use ferrofix_session::{
        Clock, ProtocolState, Session, SessionId, SessionRepository, SessionSettings, SystemClock,
    };

    // Transport
    pub use ferrofix_transport::{FixCodec, TransportError};

    // Engine
    pub use ferrofix_engine::{
        Application, BusinessReject, BusinessRejectReason, Engine, EngineBuilder,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let id = SessionId::new("SENDER", "TARGET");
        assert_eq!(id.to_string(), "SENDER->TARGET");
        assert_eq!(MsgType::Logon.as_str(), "A");
        assert_eq!(calculate_checksum(b"8=FIX.4.4\x01"), 33);
    }

    #[test]
    fn test_version() {
        let version = Version::Fix44;
        assert_eq!(version.begin_string(), "FIX.4.4");
    }

    #[test]
    fn test_engine_from_prelude() {
        let engine = Engine::builder()
            .with_session(SessionSettings::new("FIX.4.4", "SENDER", "TARGET"))
            .build();
        assert!(engine.is_ok());
    }
}
