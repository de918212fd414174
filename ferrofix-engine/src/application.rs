/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Application callback interface.
//!
//! The protocol handlers own the session layer; the application only sees
//! logon and logout events and the non-administrative messages.

use async_trait::async_trait;
use ferrofix_core::Message;
use ferrofix_session::SessionId;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// BusinessRejectReason (tag 380).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromPrimitive, ToPrimitive,
)]
#[repr(u8)]
pub enum BusinessRejectReason {
    Other = 0,
    UnknownId = 1,
    UnknownSecurity = 2,
    UnsupportedMessageType = 3,
    ApplicationNotAvailable = 4,
    ConditionallyRequiredFieldMissing = 5,
    NotAuthorized = 6,
    DeliverToFirmNotAvailable = 7,
    InvalidPriceIncrement = 18,
}

impl BusinessRejectReason {
    /// Wire value of tag 380.
    #[must_use]
    pub fn code(self) -> i64 {
        self.to_i64().unwrap_or(0)
    }

    /// Maps a wire value back; unknown codes become [`Self::Other`].
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        Self::from_i64(code).unwrap_or(Self::Other)
    }
}

/// Application-level refusal of an inbound message.
///
/// Returned from [`Application::on_message`]; the handler answers with a
/// BusinessMessageReject (35=j) and keeps the connection open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("business reject ({reason:?}){}", text_suffix(.text))]
pub struct BusinessReject {
    pub reason: BusinessRejectReason,
    /// Text (58).
    pub text: Option<String>,
    /// BusinessRejectRefID (379), usually the rejected message's id field.
    pub ref_id: Option<String>,
}

fn text_suffix(text: &Option<String>) -> String {
    text.as_deref().map(|t| format!(": {t}")).unwrap_or_default()
}

impl BusinessReject {
    #[must_use]
    pub const fn new(reason: BusinessRejectReason) -> Self {
        Self {
            reason,
            text: None,
            ref_id: None,
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_ref_id(mut self, ref_id: impl Into<String>) -> Self {
        self.ref_id = Some(ref_id.into());
        self
    }
}

/// Application callback interface for handling FIX messages.
///
/// Implement this trait to receive callbacks for session events and
/// message processing. Returned messages are stamped by the session before
/// they are sent.
#[async_trait]
pub trait Application: Send + Sync {
    /// Called once a Logon has been exchanged.
    async fn on_logon(&self, session_id: &SessionId);

    /// Called when an established session's connection ends.
    async fn on_logout(&self, session_id: &SessionId);

    /// Called for every application message and for inbound Reject (3) and
    /// ResendRequest (2).
    ///
    /// # Errors
    /// A [`BusinessReject`] is turned into a BusinessMessageReject reply.
    async fn on_message(
        &self,
        session_id: &SessionId,
        message: &Message,
    ) -> Result<Vec<Message>, BusinessReject>;
}

/// Default no-op application implementation.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_logon(&self, _session_id: &SessionId) {}

    async fn on_logout(&self, _session_id: &SessionId) {}

    async fn on_message(
        &self,
        _session_id: &SessionId,
        _message: &Message,
    ) -> Result<Vec<Message>, BusinessReject> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrofix_core::MsgType;

    #[test]
    fn test_reject_reason_codes() {
        assert_eq!(BusinessRejectReason::UnsupportedMessageType.code(), 3);
        assert_eq!(BusinessRejectReason::InvalidPriceIncrement.code(), 18);
        assert_eq!(
            BusinessRejectReason::from_code(6),
            BusinessRejectReason::NotAuthorized
        );
        assert_eq!(BusinessRejectReason::from_code(99), BusinessRejectReason::Other);
    }

    #[test]
    fn test_business_reject_display() {
        let reject = BusinessReject::new(BusinessRejectReason::UnknownSecurity)
            .with_text("no such symbol")
            .with_ref_id("ORD-1");
        assert_eq!(reject.to_string(), "business reject (UnknownSecurity): no such symbol");
        assert_eq!(reject.ref_id.as_deref(), Some("ORD-1"));
        assert_eq!(
            BusinessReject::new(BusinessRejectReason::Other).to_string(),
            "business reject (Other)"
        );
    }

    #[tokio::test]
    async fn test_noop_application() {
        let app = NoOpApplication;
        let session_id = SessionId::new("SENDER", "TARGET");

        app.on_logon(&session_id).await;
        let replies = app
            .on_message(&session_id, &Message::new(MsgType::NewOrderSingle))
            .await
            .unwrap();
        assert!(replies.is_empty());
        app.on_logout(&session_id).await;
    }
}
