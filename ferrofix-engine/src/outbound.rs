/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application-originated sends.
//!
//! Each connection owns an mpsc channel drained by its driver. Once the
//! session is established the sending half is registered here under the
//! session's id.

use ferrofix_core::{Message, SessionError};
use ferrofix_session::SessionId;
use parking_lot::RwLock;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;

/// Handle for sending messages on one session's connection.
///
/// Messages are stamped by the session when the driver picks them up.
#[derive(Debug, Clone)]
pub struct SessionSender {
    session_id: SessionId,
    tx: mpsc::Sender<Message>,
}

impl SessionSender {
    #[must_use]
    pub fn new(session_id: SessionId, tx: mpsc::Sender<Message>) -> Self {
        Self { session_id, tx }
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Queues `message` for the connection.
    ///
    /// # Errors
    /// [`SessionError::NotEstablished`] once the connection has ended.
    pub async fn send(&self, message: Message) -> Result<(), SessionError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| SessionError::NotEstablished)
    }

    /// Queues `message` without waiting for channel capacity.
    ///
    /// # Errors
    /// [`SessionError::NotEstablished`] when the connection has ended or
    /// its queue is full.
    pub fn try_send(&self, message: Message) -> Result<(), SessionError> {
        self.tx
            .try_send(message)
            .map_err(|_| SessionError::NotEstablished)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Senders of every established connection, by session id.
#[derive(Debug, Default)]
pub struct OutboundRegistry {
    senders: RwLock<HashMap<SessionId, mpsc::Sender<Message>>>,
}

impl OutboundRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, session_id: SessionId, tx: mpsc::Sender<Message>) {
        debug!(session = %session_id, "outbound channel registered");
        self.senders.write().insert(session_id, tx);
    }

    /// Removes the entry only if it still belongs to `tx`'s channel.
    pub fn unregister(&self, session_id: &SessionId, tx: &mpsc::Sender<Message>) {
        let mut senders = self.senders.write();
        if senders.get(session_id).is_some_and(|current| current.same_channel(tx)) {
            senders.remove(session_id);
        }
    }

    #[must_use]
    pub fn get(&self, session_id: &SessionId) -> Option<SessionSender> {
        self.senders
            .read()
            .get(session_id)
            .map(|tx| SessionSender::new(session_id.clone(), tx.clone()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.senders.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.senders.read().is_empty()
    }
}
