/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Initiator-side protocol handler.

use crate::admin;
use crate::context::EngineContext;
use crate::handler::{Action, DisconnectReason, LogonSequence, ProtocolHandler, SessionCore, logon_sequence};
use async_trait::async_trait;
use ferrofix_core::{Message, MsgType, SessionError, tags};
use ferrofix_session::{ProtocolState, Session, SessionId, SessionSettings};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Handles one outbound connection: sends Logon on connect, waits for the
/// acknowledgement and then runs the steady-state protocol.
pub struct InitiatorHandler {
    core: SessionCore,
    settings: SessionSettings,
}

impl InitiatorHandler {
    #[must_use]
    pub fn new(context: EngineContext, settings: SessionSettings) -> Self {
        let mut core = SessionCore::new(context, ProtocolState::Connecting);
        core.set_strict_sequence_check(settings.strict_sequence_check);
        Self { core, settings }
    }

    /// Channel the application uses to originate messages once established.
    #[must_use]
    pub fn with_outbound(mut self, tx: mpsc::Sender<Message>) -> Self {
        self.core.set_outbound(tx);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn session(&self) -> Option<&Arc<Session>> {
        self.core.session.as_ref()
    }

    fn logon_message(&self) -> Message {
        let mut logon = admin::logon(
            self.settings.heartbeat_interval_secs(),
            self.settings.reset_on_logon,
        );
        if let Some(username) = self.settings.username.as_ref().filter(|u| !u.is_empty()) {
            logon.add_str(tags::USERNAME, username.as_str());
        }
        if let Some(password) = self.settings.password.as_ref().filter(|p| !p.is_empty()) {
            logon.add_str(tags::PASSWORD, password.as_str());
        }
        logon
    }

    async fn on_logon_ack(&mut self, logon: &Message) -> Vec<Action> {
        let Some(session) = self.core.session.clone() else {
            return Vec::new();
        };
        let Some(received) = logon.msg_seq_num() else {
            warn!(session = %session.id(), "Logon reply without MsgSeqNum");
            return vec![self.core.close(DisconnectReason::MissingSequenceNumber)];
        };
        let mut actions = Vec::new();
        match logon_sequence(&session, received) {
            LogonSequence::InOrder => self.core.establish(&session).await,
            LogonSequence::Gap { expected, received } => {
                info!(
                    session = %session.id(),
                    expected,
                    received,
                    "Logon reply ahead of expected, requesting resend"
                );
                self.core.establish(&session).await;
                actions.push(
                    self.core
                        .send_with(&session, admin::resend_request(expected, received - 1)),
                );
            }
            LogonSequence::Stale { expected, received } => {
                warn!(session = %session.id(), expected, received, "Logon reply sequence too low");
                let reason = DisconnectReason::SequenceTooLow { expected, received };
                actions.push(self.core.logout_with(&session, &reason.to_string()));
                actions.push(self.core.close(reason));
            }
        }
        actions
    }
}

#[async_trait]
impl ProtocolHandler for InitiatorHandler {
    async fn on_connected(&mut self) -> Vec<Action> {
        let id = self.settings.session_id();
        let sequences = &self.core.context.sequences;
        let (next_outgoing, next_incoming) = if self.settings.reset_on_logon {
            (1, 1)
        } else {
            (sequences.next_outgoing(&id), sequences.next_incoming(&id))
        };
        let session = Arc::new(Session::from_settings(
            &self.settings,
            next_outgoing,
            next_incoming,
        ));
        if !self.core.register(&session) {
            error!(session = %id, "session already active, not sending Logon");
            return vec![self.core.close(DisconnectReason::DuplicateSession)];
        }

        let logon = self.core.send_with(&session, self.logon_message());
        self.core.transition(ProtocolState::AwaitingLogonAck);
        info!(session = %id, next_outgoing, next_incoming, "Logon sent");
        vec![logon]
    }

    async fn on_message(&mut self, message: Message) -> Vec<Action> {
        match self.core.state {
            ProtocolState::AwaitingLogonAck => match message.msg_type() {
                Some(MsgType::Logon) => self.on_logon_ack(&message).await,
                Some(MsgType::Logout) => {
                    warn!(
                        session = ?self.core.session_id(),
                        text = ?message.get_str(tags::TEXT),
                        "Logon refused by counterparty"
                    );
                    vec![self.core.close(DisconnectReason::Logout)]
                }
                other => {
                    warn!(msg_type = ?other, "message before Logon acknowledgement");
                    vec![self.core.close(DisconnectReason::LogonExpected)]
                }
            },
            ProtocolState::Established => self.core.on_established(message).await,
            state => {
                debug!(%state, msg_type = ?message.msg_type(), "message ignored");
                Vec::new()
            }
        }
    }

    async fn on_disconnected(&mut self) {
        self.core.disconnected().await;
    }

    fn stamp(&mut self, message: &mut Message) -> Result<u32, SessionError> {
        self.core.stamp(message)
    }

    fn state(&self) -> ProtocolState {
        self.core.state
    }

    fn session_id(&self) -> Option<&SessionId> {
        self.core.session_id()
    }
}
