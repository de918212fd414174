/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Protocol state of one connection.
//!
//! Acceptor: `AwaitingLogon -> Established -> Closed`.
//! Initiator: `Connecting -> AwaitingLogonAck -> Established -> Closed`.

use ferrofix_core::SessionError;
use std::fmt;

/// Where a connection stands in the Logon handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolState {
    /// Initiator: transport up, Logon not sent yet.
    #[default]
    Connecting,
    /// Acceptor: waiting for the counterparty's Logon.
    AwaitingLogon,
    /// Initiator: Logon sent, waiting for the acknowledgement.
    AwaitingLogonAck,
    /// Logon exchanged; application traffic flows.
    Established,
    /// Terminal.
    Closed,
}

impl ProtocolState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::AwaitingLogon => "AwaitingLogon",
            Self::AwaitingLogonAck => "AwaitingLogonAck",
            Self::Established => "Established",
            Self::Closed => "Closed",
        }
    }

    #[must_use]
    pub const fn is_established(&self) -> bool {
        matches!(self, Self::Established)
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Whether moving to `next` follows one of the two handshake paths.
    /// Any state may close.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Connecting, Self::AwaitingLogonAck)
                | (Self::AwaitingLogon, Self::Established)
                | (Self::AwaitingLogonAck, Self::Established)
                | (_, Self::Closed)
        )
    }

    /// Fails with [`SessionError::IllegalState`] unless the current state is
    /// `expected`.
    ///
    /// # Errors
    /// See above.
    pub fn expect(&self, expected: Self) -> Result<(), SessionError> {
        if *self == expected {
            Ok(())
        } else {
            Err(SessionError::IllegalState {
                expected: expected.as_str().to_string(),
                current: self.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptor_path() {
        let state = ProtocolState::AwaitingLogon;
        assert!(state.can_transition_to(ProtocolState::Established));
        assert!(!state.can_transition_to(ProtocolState::AwaitingLogonAck));
        assert!(ProtocolState::Established.can_transition_to(ProtocolState::Closed));
    }

    #[test]
    fn test_initiator_path() {
        assert!(ProtocolState::Connecting.can_transition_to(ProtocolState::AwaitingLogonAck));
        assert!(ProtocolState::AwaitingLogonAck.can_transition_to(ProtocolState::Established));
        assert!(!ProtocolState::Connecting.can_transition_to(ProtocolState::Established));
        assert!(!ProtocolState::Closed.can_transition_to(ProtocolState::Established));
    }

    #[test]
    fn test_expect() {
        assert!(ProtocolState::Established.expect(ProtocolState::Established).is_ok());
        assert_eq!(
            ProtocolState::Established.expect(ProtocolState::AwaitingLogon),
            Err(SessionError::IllegalState {
                expected: "AwaitingLogon".to_string(),
                current: "Established".to_string(),
            })
        );
    }
}
