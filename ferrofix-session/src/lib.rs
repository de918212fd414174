/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix session
//!
//! FIX session layer building blocks for the ferrofix engine.
//!
//! This crate provides:
//! - **Identity**: [`SessionId`], always from the local side's perspective
//! - **Sequence management**: lock-free atomic counters with compare-and-swap
//! - **Registry**: [`SessionRepository`] with atomic insert-if-absent
//! - **Protocol state**: the Logon handshake states
//! - **Configuration**: [`SessionSettings`] and its builder
//! - **Injection points**: [`Clock`] and [`SequenceProvider`]
//!
//! Nothing here performs I/O or runs timers.

pub mod clock;
pub mod config;
pub mod id;
pub mod repository;
pub mod sequence;
pub mod session;
pub mod state;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SessionSettings, SessionSettingsBuilder};
pub use id::SessionId;
pub use repository::SessionRepository;
pub use sequence::{
    FixedSequenceProvider, ResetSequenceProvider, SequenceCounters, SequenceProvider,
    SequenceResult,
};
pub use session::Session;
pub use state::ProtocolState;
