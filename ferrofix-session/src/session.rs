/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! A live FIX session.

use crate::clock::Clock;
use crate::config::SessionSettings;
use crate::id::SessionId;
use crate::sequence::{SequenceCounters, SequenceResult};
use ferrofix_core::Message;
use tracing::trace;

/// Identity and sequence counters of one logged-on counterparty.
///
/// Shared between the connection that owns it and the repository, so every
/// mutable part is atomic.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    begin_string: String,
    counters: SequenceCounters,
}

impl Session {
    /// Creates a session with explicit starting sequence numbers.
    #[must_use]
    pub fn new(
        id: SessionId,
        begin_string: impl Into<String>,
        next_outgoing: u32,
        next_incoming: u32,
    ) -> Self {
        Self {
            id,
            begin_string: begin_string.into(),
            counters: SequenceCounters::new(next_outgoing, next_incoming),
        }
    }

    /// Creates a session keyed by the settings' identity.
    #[must_use]
    pub fn from_settings(settings: &SessionSettings, next_outgoing: u32, next_incoming: u32) -> Self {
        Self::new(
            settings.session_id(),
            settings.begin_string.clone(),
            next_outgoing,
            next_incoming,
        )
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    #[must_use]
    pub fn sender_comp_id(&self) -> &str {
        &self.id.sender_comp_id
    }

    #[must_use]
    pub fn target_comp_id(&self) -> &str {
        &self.id.target_comp_id
    }

    #[must_use]
    pub fn counters(&self) -> &SequenceCounters {
        &self.counters
    }

    #[inline]
    #[must_use]
    pub fn next_outgoing(&self) -> u32 {
        self.counters.next_outgoing()
    }

    #[inline]
    #[must_use]
    pub fn next_incoming(&self) -> u32 {
        self.counters.next_incoming()
    }

    /// Stamps the session header onto `message` and allocates its sequence
    /// number.
    ///
    /// Sets BeginString, the sender/target comp, sub and location ids,
    /// MsgSeqNum and SendingTime (from `clock`). Returns the allocated
    /// MsgSeqNum.
    pub fn prepare_outgoing(&self, message: &mut Message, clock: &dyn Clock) -> u32 {
        let seq = self.counters.allocate_outgoing();
        let header = message.header_mut();
        header.begin_string.clone_from(&self.begin_string);
        header.sender_comp_id.clone_from(&self.id.sender_comp_id);
        header.target_comp_id.clone_from(&self.id.target_comp_id);
        header.sender_sub_id.clone_from(&self.id.sender_sub_id);
        header.target_sub_id.clone_from(&self.id.target_sub_id);
        header.sender_location_id.clone_from(&self.id.sender_location_id);
        header.target_location_id.clone_from(&self.id.target_location_id);
        header.msg_seq_num = Some(seq);
        header.sending_time = Some(clock.timestamp());
        trace!(session = %self.id, seq, msg_type = ?header.msg_type, "stamped outgoing message");
        seq
    }

    /// Accepts `received` as the next incoming number in a single
    /// compare-and-swap. See [`SequenceCounters::check_and_increment`].
    #[inline]
    pub fn check_and_increment(&self, received: u32) -> SequenceResult {
        self.counters.check_and_increment(received)
    }
}
