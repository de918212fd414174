/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Collaborators shared by every connection of an engine.

use crate::application::{Application, NoOpApplication};
use crate::authenticator::{AcceptAll, Authenticator};
use crate::outbound::OutboundRegistry;
use ferrofix_session::{Clock, ResetSequenceProvider, SequenceProvider, SessionRepository, SystemClock};
use std::fmt;
use std::sync::Arc;

/// Injected dependencies of the protocol handlers.
///
/// Cloning is cheap; every part is reference counted.
#[derive(Clone)]
pub struct EngineContext {
    pub application: Arc<dyn Application>,
    pub authenticator: Arc<dyn Authenticator>,
    pub repository: Arc<SessionRepository>,
    pub clock: Arc<dyn Clock>,
    pub sequences: Arc<dyn SequenceProvider>,
    pub outbound: Arc<OutboundRegistry>,
}

impl EngineContext {
    /// Context with `application`, accepting every Logon, wall-clock time
    /// and sequence numbers starting at 1.
    #[must_use]
    pub fn new(application: Arc<dyn Application>) -> Self {
        Self {
            application,
            authenticator: Arc::new(AcceptAll),
            repository: Arc::new(SessionRepository::new()),
            clock: Arc::new(SystemClock),
            sequences: Arc::new(ResetSequenceProvider),
            outbound: Arc::new(OutboundRegistry::new()),
        }
    }

    #[must_use]
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: Arc<SessionRepository>) -> Self {
        self.repository = repository;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_sequences(mut self, sequences: Arc<dyn SequenceProvider>) -> Self {
        self.sequences = sequences;
        self
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new(Arc::new(NoOpApplication))
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("sessions", &self.repository.len())
            .field("outbound", &self.outbound.len())
            .finish_non_exhaustive()
    }
}
