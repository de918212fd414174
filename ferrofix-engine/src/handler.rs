/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Sans-IO protocol handling shared by the acceptor and the initiator.
//!
//! Handlers never touch a socket. Every entry point returns the ordered
//! [`Action`]s the connection driver must perform; outbound messages in
//! those actions are already stamped.

use crate::admin;
use crate::context::EngineContext;
use async_trait::async_trait;
use ferrofix_core::{Message, MsgType, SessionError, tags};
use ferrofix_session::{ProtocolState, SequenceResult, Session, SessionId};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Why a handler asked for the connection to be closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The authenticator refused the Logon. Nothing was sent.
    AuthenticationFailed,
    /// The first message was not a Logon.
    LogonExpected,
    /// A Logon arrived without MsgSeqNum.
    MissingSequenceNumber,
    /// MsgSeqNum below the expected value.
    SequenceTooLow { expected: u32, received: u32 },
    /// Another connection already owns the session.
    DuplicateSession,
    /// Logon received on an established session.
    DuplicateLogon,
    /// Logout exchanged.
    Logout,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationFailed => f.write_str("authentication failed"),
            Self::LogonExpected => f.write_str("first message was not a Logon"),
            Self::MissingSequenceNumber => f.write_str("Logon without MsgSeqNum"),
            Self::SequenceTooLow { expected, received } => write!(
                f,
                "MsgSeqNum too low, expecting {expected} but received {received}"
            ),
            Self::DuplicateSession => f.write_str("session already active"),
            Self::DuplicateLogon => f.write_str("Logon received while already logged on"),
            Self::Logout => f.write_str("logout"),
        }
    }
}

/// Work for the connection driver, performed in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Encode and write a stamped message.
    Send(Message),
    /// Flush and close the connection.
    Disconnect(DisconnectReason),
}

impl Action {
    /// The message if this is a send.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Send(message) => Some(message),
            Self::Disconnect(_) => None,
        }
    }

    #[must_use]
    pub const fn is_disconnect(&self) -> bool {
        matches!(self, Self::Disconnect(_))
    }
}

/// Event interface of a protocol handler, driven by the transport.
#[async_trait]
pub trait ProtocolHandler: Send {
    /// The transport is up.
    async fn on_connected(&mut self) -> Vec<Action>;

    /// A message was decoded from the transport.
    async fn on_message(&mut self, message: Message) -> Vec<Action>;

    /// The transport is gone. Emits the logout event and releases the
    /// session.
    async fn on_disconnected(&mut self);

    /// Stamps an application-originated message for sending. A Logout
    /// stamped here counts as ours, so the peer's reply is not answered.
    ///
    /// # Errors
    /// [`SessionError::NotEstablished`] before Logon has been exchanged.
    fn stamp(&mut self, message: &mut Message) -> Result<u32, SessionError>;

    fn state(&self) -> ProtocolState;

    fn session_id(&self) -> Option<&SessionId>;
}

/// Outcome of checking a Logon's MsgSeqNum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogonSequence {
    InOrder,
    /// Expectation moved to `received + 1`; `[expected, received - 1]` is
    /// missing.
    Gap { expected: u32, received: u32 },
    Stale { expected: u32, received: u32 },
}

/// Checks a Logon's MsgSeqNum against the session.
pub(crate) fn logon_sequence(session: &Session, received: u32) -> LogonSequence {
    match session.check_and_increment(received) {
        SequenceResult::Ok => LogonSequence::InOrder,
        SequenceResult::Gap { expected, received } => {
            session.counters().advance_incoming(received.saturating_add(1));
            LogonSequence::Gap { expected, received }
        }
        SequenceResult::TooLow { expected, received } => {
            LogonSequence::Stale { expected, received }
        }
    }
}

/// State and steady-state behavior common to both roles.
pub(crate) struct SessionCore {
    pub(crate) context: EngineContext,
    pub(crate) state: ProtocolState,
    pub(crate) session: Option<Arc<Session>>,
    strict_sequence_check: bool,
    logged_on: bool,
    logout_sent: bool,
    /// Last MsgSeqNum of an outstanding strict-mode ResendRequest.
    resend_until: Option<u32>,
    outbound: Option<mpsc::Sender<Message>>,
}

impl SessionCore {
    pub(crate) fn new(context: EngineContext, state: ProtocolState) -> Self {
        Self {
            context,
            state,
            session: None,
            strict_sequence_check: false,
            logged_on: false,
            logout_sent: false,
            resend_until: None,
            outbound: None,
        }
    }

    pub(crate) fn set_strict_sequence_check(&mut self, strict: bool) {
        self.strict_sequence_check = strict;
    }

    pub(crate) fn set_outbound(&mut self, tx: mpsc::Sender<Message>) {
        self.outbound = Some(tx);
    }

    pub(crate) fn session_id(&self) -> Option<&SessionId> {
        self.session.as_deref().map(Session::id)
    }

    pub(crate) fn transition(&mut self, next: ProtocolState) {
        if !self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, "unexpected state transition");
        }
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    /// Registers `session` in the repository. Returns false if another live
    /// session already owns its id.
    pub(crate) fn register(&mut self, session: &Arc<Session>) -> bool {
        let (_, inserted) = self.context.repository.insert_if_absent(Arc::clone(session));
        if inserted {
            self.session = Some(Arc::clone(session));
        }
        inserted
    }

    pub(crate) fn release(&mut self) {
        if let Some(session) = self.session.take() {
            self.context.repository.remove_if_same(session.id(), &session);
            if let Some(tx) = &self.outbound {
                self.context.outbound.unregister(session.id(), tx);
            }
        }
    }

    /// Stamps `message` with `session` regardless of protocol state.
    pub(crate) fn send_with(&self, session: &Session, mut message: Message) -> Action {
        session.prepare_outgoing(&mut message, self.context.clock.as_ref());
        Action::Send(message)
    }

    /// Stamps a Logout and remembers that we sent one.
    pub(crate) fn logout_with(&mut self, session: &Session, text: &str) -> Action {
        self.logout_sent = true;
        self.send_with(session, admin::logout(Some(text)))
    }

    pub(crate) fn stamp(&mut self, message: &mut Message) -> Result<u32, SessionError> {
        match (&self.session, self.state) {
            (Some(session), ProtocolState::Established) => {
                if message.msg_type() == Some(&MsgType::Logout) {
                    self.logout_sent = true;
                }
                Ok(session.prepare_outgoing(message, self.context.clock.as_ref()))
            }
            _ => Err(SessionError::NotEstablished),
        }
    }

    pub(crate) fn close(&mut self, reason: DisconnectReason) -> Action {
        info!(session = ?self.session_id(), %reason, "closing connection");
        self.transition(ProtocolState::Closed);
        Action::Disconnect(reason)
    }

    /// Moves to `Established` and emits the logon event.
    pub(crate) async fn establish(&mut self, session: &Arc<Session>) {
        self.transition(ProtocolState::Established);
        self.logged_on = true;
        if let Some(tx) = &self.outbound {
            self.context.outbound.register(session.id().clone(), tx.clone());
        }
        info!(
            session = %session.id(),
            next_incoming = session.next_incoming(),
            next_outgoing = session.next_outgoing(),
            "session established"
        );
        self.context.application.on_logon(session.id()).await;
    }

    /// Logout event for established sessions, then repository removal.
    pub(crate) async fn disconnected(&mut self) {
        if self.logged_on {
            self.logged_on = false;
            if let Some(session) = &self.session {
                info!(session = %session.id(), "session logged out");
                self.context.application.on_logout(session.id()).await;
            }
        }
        self.release();
        self.state = ProtocolState::Closed;
    }

    /// Handles one inbound message on an established session.
    pub(crate) async fn on_established(&mut self, message: Message) -> Vec<Action> {
        let Some(session) = self.session.clone() else {
            return Vec::new();
        };
        let Some(msg_type) = message.msg_type().cloned() else {
            warn!(session = %session.id(), "message without MsgType ignored");
            return Vec::new();
        };
        let mut actions = Vec::new();

        if msg_type == MsgType::Logon {
            if let Err(error) = self.state.expect(ProtocolState::AwaitingLogon) {
                warn!(session = %session.id(), %error, "Logon on established session");
            }
            let reason = DisconnectReason::DuplicateLogon;
            actions.push(self.logout_with(&session, &reason.to_string()));
            actions.push(self.close(reason));
            return actions;
        }

        let gap_fill = message.get_bool(tags::GAP_FILL_FLAG).unwrap_or(false);
        if msg_type == MsgType::SequenceReset && !gap_fill {
            apply_sequence_reset(&session, &message);
            return actions;
        }

        if !self.check_sequence(&session, &message, &mut actions) {
            return actions;
        }

        match msg_type {
            MsgType::Heartbeat => {
                debug!(session = %session.id(), seq = ?message.msg_seq_num(), "heartbeat");
            }
            MsgType::TestRequest => {
                let test_req_id = message.get_str(tags::TEST_REQ_ID);
                actions.push(self.send_with(&session, admin::heartbeat(test_req_id)));
            }
            MsgType::Logout => {
                info!(
                    session = %session.id(),
                    text = ?message.get_str(tags::TEXT),
                    "logout received"
                );
                if !self.logout_sent {
                    self.logout_sent = true;
                    actions.push(self.send_with(&session, admin::logout(None)));
                }
                actions.push(self.close(DisconnectReason::Logout));
            }
            MsgType::SequenceReset => apply_sequence_reset(&session, &message),
            other => {
                if matches!(other, MsgType::Reject | MsgType::ResendRequest) {
                    warn!(
                        session = %session.id(),
                        msg_type = %other,
                        ref_seq = ?message.get_int(tags::REF_SEQ_NUM),
                        begin = ?message.get_int(tags::BEGIN_SEQ_NO),
                        end = ?message.get_int(tags::END_SEQ_NO),
                        text = ?message.get_str(tags::TEXT),
                        "session-level message forwarded to application"
                    );
                }
                self.dispatch(&session, &other, &message, &mut actions).await;
            }
        }
        actions
    }

    /// Applies the steady-state sequence policy. Returns whether the message
    /// should be processed.
    fn check_sequence(&mut self, session: &Session, message: &Message, actions: &mut Vec<Action>) -> bool {
        let Some(received) = message.msg_seq_num() else {
            warn!(session = %session.id(), msg_type = ?message.msg_type(), "message without MsgSeqNum");
            return !self.strict_sequence_check;
        };
        if message.poss_dup() && received < session.next_incoming() {
            debug!(session = %session.id(), received, "possible duplicate, counter untouched");
            return true;
        }
        match session.check_and_increment(received) {
            SequenceResult::Ok => {
                if self.resend_until.is_some_and(|end| received >= end) {
                    debug!(session = %session.id(), received, "resend range complete");
                    self.resend_until = None;
                }
                true
            }
            SequenceResult::TooLow { expected, received } if self.strict_sequence_check => {
                warn!(session = %session.id(), expected, received, "sequence number too low");
                let reason = DisconnectReason::SequenceTooLow { expected, received };
                actions.push(self.logout_with(session, &reason.to_string()));
                actions.push(self.close(reason));
                false
            }
            SequenceResult::Gap { expected, received } if self.strict_sequence_check => {
                if self.resend_until.is_none() {
                    warn!(session = %session.id(), expected, received, "sequence gap, requesting resend");
                    self.resend_until = Some(received);
                    actions.push(self.send_with(session, admin::resend_request(expected, received)));
                } else {
                    debug!(session = %session.id(), expected, received, "resend outstanding, message dropped");
                }
                false
            }
            SequenceResult::TooLow { expected, received } | SequenceResult::Gap { expected, received } => {
                warn!(
                    session = %session.id(),
                    expected,
                    received,
                    "sequence mismatch, forwarding anyway"
                );
                true
            }
        }
    }

    async fn dispatch(&self, session: &Session, msg_type: &MsgType, message: &Message, actions: &mut Vec<Action>) {
        match self.context.application.on_message(session.id(), message).await {
            Ok(replies) => {
                for reply in replies {
                    actions.push(self.send_with(session, reply));
                }
            }
            Err(reject) => {
                warn!(
                    session = %session.id(),
                    msg_type = %msg_type,
                    seq = ?message.msg_seq_num(),
                    reason = ?reject.reason,
                    text = ?reject.text,
                    "business reject"
                );
                let reply = admin::business_message_reject(message.msg_seq_num(), msg_type.as_str(), &reject);
                actions.push(self.send_with(session, reply));
            }
        }
    }
}

/// Moves the incoming expectation to NewSeqNo (36); never backwards.
fn apply_sequence_reset(session: &Session, message: &Message) {
    let Some(new_seq) = message
        .get_int(tags::NEW_SEQ_NO)
        .and_then(|n| u32::try_from(n).ok())
    else {
        warn!(session = %session.id(), "SequenceReset without a valid NewSeqNo");
        return;
    };
    if session.counters().advance_incoming(new_seq) {
        info!(session = %session.id(), new_seq, "incoming sequence advanced by SequenceReset");
    } else if new_seq < session.next_incoming() {
        warn!(
            session = %session.id(),
            new_seq,
            expected = session.next_incoming(),
            "SequenceReset would move sequence backwards, ignored"
        );
    }
}
