/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Engine builder and the tokio entry points.

use crate::acceptor::AcceptorHandler;
use crate::application::{Application, NoOpApplication};
use crate::authenticator::Authenticator;
use crate::connection::run_connection;
use crate::context::EngineContext;
use crate::initiator::InitiatorHandler;
use crate::outbound::SessionSender;
use ferrofix_core::{FixError, SessionError};
use ferrofix_dictionary::Dictionary;
use ferrofix_session::{Clock, SequenceProvider, SessionId, SessionRepository, SessionSettings};
use ferrofix_transport::{DEFAULT_MAX_FIELD_LENGTH, FixCodec, TransportError};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Default capacity of each connection's outbound queue.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 1024;

/// Builder for configuring a FIX engine.
#[derive(Debug)]
pub struct EngineBuilder {
    context: EngineContext,
    settings: Option<SessionSettings>,
    dictionary: Arc<Dictionary>,
    max_field_length: usize,
    strict_sequence_check: bool,
    outbound_capacity: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    /// Creates a builder with a no-op application and default collaborators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            context: EngineContext::new(Arc::new(NoOpApplication)),
            settings: None,
            dictionary: Arc::new(Dictionary::default()),
            max_field_length: DEFAULT_MAX_FIELD_LENGTH,
            strict_sequence_check: false,
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }

    /// Sets the application callback handler.
    #[must_use]
    pub fn with_application(mut self, application: impl Application + 'static) -> Self {
        self.context.application = Arc::new(application);
        self
    }

    /// Sets the Logon authenticator used by acceptor connections.
    #[must_use]
    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.context.authenticator = Arc::new(authenticator);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.context.clock = Arc::new(clock);
        self
    }

    /// Sets where new sessions take their starting sequence numbers from.
    #[must_use]
    pub fn with_sequence_provider(mut self, sequences: impl SequenceProvider + 'static) -> Self {
        self.context.sequences = Arc::new(sequences);
        self
    }

    /// Shares a session repository with other engines.
    #[must_use]
    pub fn with_repository(mut self, repository: Arc<SessionRepository>) -> Self {
        self.context.repository = repository;
        self
    }

    /// Session used by [`Engine::connect`].
    #[must_use]
    pub fn with_session(mut self, settings: SessionSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Dictionary used to type fields and lay out groups when decoding.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self
    }

    #[must_use]
    pub const fn with_max_field_length(mut self, max: usize) -> Self {
        self.max_field_length = max;
        self
    }

    /// Strict steady-state sequence checking for accepted connections.
    /// Initiated connections follow their [`SessionSettings`].
    #[must_use]
    pub const fn with_strict_sequence_check(mut self, strict: bool) -> Self {
        self.strict_sequence_check = strict;
        self
    }

    #[must_use]
    pub const fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    #[must_use]
    pub fn settings(&self) -> Option<&SessionSettings> {
        self.settings.as_ref()
    }

    /// Builds the engine.
    ///
    /// # Errors
    /// [`SessionError::Configuration`] when the session settings are
    /// incomplete or the outbound capacity is zero.
    pub fn build(self) -> Result<Engine, SessionError> {
        if let Some(settings) = &self.settings {
            settings.validate()?;
        }
        if self.outbound_capacity == 0 {
            return Err(SessionError::Configuration(
                "outbound capacity must be positive".to_string(),
            ));
        }
        Ok(Engine {
            context: self.context,
            settings: self.settings,
            dictionary: self.dictionary,
            max_field_length: self.max_field_length,
            strict_sequence_check: self.strict_sequence_check,
            outbound_capacity: self.outbound_capacity,
        })
    }
}

/// An initiated connection.
#[derive(Debug)]
pub struct InitiatorConnection {
    /// Sends application messages once the Logon has been exchanged.
    pub sender: SessionSender,
    /// Resolves when the connection ends.
    pub task: JoinHandle<Result<(), TransportError>>,
}

/// A configured FIX engine.
#[derive(Debug, Clone)]
pub struct Engine {
    context: EngineContext,
    settings: Option<SessionSettings>,
    dictionary: Arc<Dictionary>,
    max_field_length: usize,
    strict_sequence_check: bool,
    outbound_capacity: usize,
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<SessionRepository> {
        &self.context.repository
    }

    /// Sender for an established session, if one is connected.
    #[must_use]
    pub fn sender(&self, session_id: &SessionId) -> Option<SessionSender> {
        self.context.outbound.get(session_id)
    }

    fn codec(&self) -> FixCodec {
        FixCodec::with_dictionary(Arc::clone(&self.dictionary))
            .with_max_field_length(self.max_field_length)
    }

    /// Accepts connections until the listener fails, running an
    /// [`AcceptorHandler`] for each on its own task.
    ///
    /// # Errors
    /// The listener's accept error.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), TransportError> {
        info!(addr = ?listener.local_addr().ok(), "acceptor listening");
        loop {
            let (stream, peer) = listener.accept().await?;
            info!(%peer, "connection accepted");
            let _ = stream.set_nodelay(true);
            let (tx, rx) = mpsc::channel(self.outbound_capacity);
            let mut handler = AcceptorHandler::new(self.context.clone())
                .with_strict_sequence_check(self.strict_sequence_check)
                .with_outbound(tx);
            let codec = self.codec();
            tokio::spawn(async move {
                if let Err(err) = run_connection(stream, codec, &mut handler, rx).await {
                    error!(%peer, error = %err, "acceptor connection ended with error");
                }
            });
        }
    }

    /// Connects to `addr` and runs an [`InitiatorHandler`] for the
    /// configured session on its own task.
    ///
    /// # Errors
    /// [`SessionError::Configuration`] without session settings, or the
    /// connect error.
    pub async fn connect(&self, addr: impl ToSocketAddrs) -> Result<InitiatorConnection, FixError> {
        let settings = self.settings.clone().ok_or_else(|| {
            SessionError::Configuration("initiator requires session settings".to_string())
        })?;
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!(session = %settings.session_id(), peer = ?stream.peer_addr().ok(), "connected");

        let (tx, rx) = mpsc::channel(self.outbound_capacity);
        let sender = SessionSender::new(settings.session_id(), tx.clone());
        let mut handler = InitiatorHandler::new(self.context.clone(), settings).with_outbound(tx);
        let codec = self.codec();
        let task = tokio::spawn(async move { run_connection(stream, codec, &mut handler, rx).await });
        Ok(InitiatorConnection { sender, task })
    }
}
