/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Acceptor-side protocol handler.

use crate::admin;
use crate::context::EngineContext;
use crate::handler::{Action, DisconnectReason, LogonSequence, ProtocolHandler, SessionCore, logon_sequence};
use async_trait::async_trait;
use ferrofix_core::{Message, MsgType, SessionError, tags};
use ferrofix_session::config::DEFAULT_HEARTBEAT_SECS;
use ferrofix_session::{ProtocolState, Session, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Handles one inbound connection: waits for Logon, authenticates,
/// registers the session and then runs the steady-state protocol.
pub struct AcceptorHandler {
    core: SessionCore,
}

impl AcceptorHandler {
    #[must_use]
    pub fn new(context: EngineContext) -> Self {
        Self {
            core: SessionCore::new(context, ProtocolState::AwaitingLogon),
        }
    }

    /// Acts on steady-state sequence mismatches instead of only logging.
    #[must_use]
    pub fn with_strict_sequence_check(mut self, strict: bool) -> Self {
        self.core.set_strict_sequence_check(strict);
        self
    }

    /// Channel the application uses to originate messages once established.
    #[must_use]
    pub fn with_outbound(mut self, tx: mpsc::Sender<Message>) -> Self {
        self.core.set_outbound(tx);
        self
    }

    #[must_use]
    pub fn session(&self) -> Option<&Arc<Session>> {
        self.core.session.as_ref()
    }

    async fn on_logon(&mut self, logon: Message) -> Vec<Action> {
        let header = logon.header();
        if !self.core.context.authenticator.authenticate(&logon).await {
            warn!(
                sender = %header.sender_comp_id,
                target = %header.target_comp_id,
                "authentication failed, closing without reply"
            );
            return vec![self.core.close(DisconnectReason::AuthenticationFailed)];
        }

        let id = SessionId::from_inbound(header);
        let Some(received) = logon.msg_seq_num() else {
            warn!(session = %id, "Logon without MsgSeqNum");
            return vec![self.core.close(DisconnectReason::MissingSequenceNumber)];
        };
        let reset = logon.get_bool(tags::RESET_SEQ_NUM_FLAG).unwrap_or(false);
        let next_incoming = if reset {
            1
        } else {
            self.core.context.sequences.next_incoming(&id)
        };
        let session = Arc::new(Session::new(
            id.clone(),
            header.begin_string.clone(),
            1,
            next_incoming,
        ));

        if !self.core.register(&session) {
            warn!(session = %id, "Logon for a session that is already active");
            let reason = DisconnectReason::DuplicateSession;
            let logout = self.core.logout_with(&session, &reason.to_string());
            return vec![logout, self.core.close(reason)];
        }

        let heartbeat = logon
            .get_int(tags::HEART_BT_INT)
            .unwrap_or_else(|| i64::try_from(DEFAULT_HEARTBEAT_SECS).unwrap_or(i64::MAX));
        let mut actions = Vec::with_capacity(2);
        match logon_sequence(&session, received) {
            LogonSequence::InOrder => {
                actions.push(self.core.send_with(&session, admin::logon(heartbeat, reset)));
                self.core.establish(&session).await;
            }
            LogonSequence::Gap { expected, received } => {
                info!(
                    session = %id,
                    expected,
                    received,
                    "Logon sequence ahead of expected, requesting resend"
                );
                actions.push(self.core.send_with(&session, admin::logon(heartbeat, reset)));
                actions.push(
                    self.core
                        .send_with(&session, admin::resend_request(expected, received - 1)),
                );
                self.core.establish(&session).await;
            }
            LogonSequence::Stale { expected, received } => {
                warn!(session = %id, expected, received, "Logon sequence too low");
                let reason = DisconnectReason::SequenceTooLow { expected, received };
                actions.push(self.core.logout_with(&session, &reason.to_string()));
                actions.push(self.core.close(reason));
                self.core.release();
            }
        }
        actions
    }
}

#[async_trait]
impl ProtocolHandler for AcceptorHandler {
    async fn on_connected(&mut self) -> Vec<Action> {
        debug!("connection accepted, awaiting Logon");
        Vec::new()
    }

    async fn on_message(&mut self, message: Message) -> Vec<Action> {
        match self.core.state {
            ProtocolState::AwaitingLogon => {
                if message.msg_type() == Some(&MsgType::Logon) {
                    self.on_logon(message).await
                } else {
                    warn!(msg_type = ?message.msg_type(), "message before Logon");
                    vec![self.core.close(DisconnectReason::LogonExpected)]
                }
            }
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
