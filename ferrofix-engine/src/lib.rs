/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix Engine
//!
//! Session protocol engine for the ferrofix FIX implementation.
//!
//! This crate provides:
//! - **Acceptor**: waits for Logon, authenticates and registers the session
//! - **Initiator**: sends Logon on connect and waits for the acknowledgement
//! - **Application trait**: callbacks for logon, logout and business messages
//! - **Connection driver**: runs a handler over any tokio byte stream
//! - **Builder API**: fluent configuration and the TCP entry points
//!
//! Handlers are sans-IO: they receive decoded messages and return
//! [`Action`]s, so the protocol can be exercised without a socket.

pub mod acceptor;
pub mod admin;
pub mod application;
pub mod authenticator;
pub mod builder;
pub mod connection;
pub mod context;
pub mod handler;
pub mod initiator;
pub mod outbound;

pub use acceptor::AcceptorHandler;
pub use application::{Application, BusinessReject, BusinessRejectReason, NoOpApplication};
pub use authenticator::{AcceptAll, Authenticator, StaticCredentials};
pub use builder::{Engine, EngineBuilder, InitiatorConnection};
pub use connection::run_connection;
pub use context::EngineContext;
pub use handler::{Action, DisconnectReason, ProtocolHandler};
pub use initiator::InitiatorHandler;
pub use outbound::{OutboundRegistry, SessionSender};
