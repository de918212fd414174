/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session settings.
//!
//! Settings are plain data. They derive `serde` so an outer layer can load
//! them from wherever it likes; nothing in this crate reads files or the
//! environment.

use crate::id::SessionId;
use ferrofix_core::SessionError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default BeginString when none is configured.
pub const DEFAULT_BEGIN_STRING: &str = "FIX.4.4";

/// Default HeartBtInt (108) in seconds.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Configuration of one FIX session, seen from the local side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// BeginString (8), e.g. `FIX.4.4`.
    pub begin_string: String,
    /// SenderCompID (49).
    pub sender_comp_id: String,
    /// TargetCompID (56).
    pub target_comp_id: String,
    /// SenderSubID (50).
    pub sender_sub_id: Option<String>,
    /// TargetSubID (57).
    pub target_sub_id: Option<String>,
    /// SenderLocationID (142).
    pub sender_location_id: Option<String>,
    /// TargetLocationID (143).
    pub target_location_id: Option<String>,
    /// Start both counters at 1 and send ResetSeqNumFlag on Logon.
    pub reset_on_logon: bool,
    /// Value sent as HeartBtInt. No heartbeat timers run in the engine.
    pub heartbeat_interval: Duration,
    /// Act on steady-state sequence mismatches instead of only logging them.
    pub strict_sequence_check: bool,
    /// Username (553) sent on Logon.
    pub username: Option<String>,
    /// Password (554) sent on Logon.
    pub password: Option<String>,
}

impl SessionSettings {
    /// Creates settings with the required fields and defaults for the rest.
    #[must_use]
    pub fn new(
        begin_string: impl Into<String>,
        sender_comp_id: impl Into<String>,
        target_comp_id: impl Into<String>,
    ) -> Self {
        Self {
            begin_string: begin_string.into(),
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            sender_sub_id: None,
            target_sub_id: None,
            sender_location_id: None,
            target_location_id: None,
            reset_on_logon: false,
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            strict_sequence_check: false,
            username: None,
            password: None,
        }
    }

    #[must_use]
    pub fn with_sender_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(sub_id.into());
        self
    }

    #[must_use]
    pub fn with_target_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.target_sub_id = Some(sub_id.into());
        self
    }

    #[must_use]
    pub fn with_sender_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.sender_location_id = Some(location_id.into());
        self
    }

    #[must_use]
    pub fn with_target_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.target_location_id = Some(location_id.into());
        self
    }

    #[must_use]
    pub const fn with_reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    #[must_use]
    pub const fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_strict_sequence_check(mut self, strict: bool) -> Self {
        self.strict_sequence_check = strict;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// HeartBtInt as sent on the wire.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> i64 {
        i64::try_from(self.heartbeat_interval.as_secs()).unwrap_or(i64::MAX)
    }

    /// Session key for these settings.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        SessionId {
            sender_comp_id: self.sender_comp_id.clone(),
            target_comp_id: self.target_comp_id.clone(),
            sender_sub_id: self.sender_sub_id.clone(),
            target_sub_id: self.target_sub_id.clone(),
            sender_location_id: self.sender_location_id.clone(),
            target_location_id: self.target_location_id.clone(),
        }
    }

    /// Checks the fields that must be present before a session can start.
    ///
    /// # Errors
    /// [`SessionError::Configuration`] naming the first missing field.
    pub fn validate(&self) -> Result<(), SessionError> {
        let required = [
            ("begin_string", &self.begin_string),
            ("sender_comp_id", &self.sender_comp_id),
            ("target_comp_id", &self.target_comp_id),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(SessionError::Configuration(format!("{name} is required")));
            }
        }
        Ok(())
    }
}

/// Builder for [`SessionSettings`].
#[derive(Debug, Default)]
pub struct SessionSettingsBuilder {
    begin_string: Option<String>,
    sender_comp_id: Option<String>,
    target_comp_id: Option<String>,
    sender_sub_id: Option<String>,
    target_sub_id: Option<String>,
    sender_location_id: Option<String>,
    target_location_id: Option<String>,
    reset_on_logon: bool,
    heartbeat_interval: Option<Duration>,
    strict_sequence_check: bool,
    username: Option<String>,
    password: Option<String>,
}

impl SessionSettingsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn begin_string(mut self, begin_string: impl Into<String>) -> Self {
        self.begin_string = Some(begin_string.into());
        self
    }

    #[must_use]
    pub fn sender_comp_id(mut self, id: impl Into<String>) -> Self {
        self.sender_comp_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn target_comp_id(mut self, id: impl Into<String>) -> Self {
        self.target_comp_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn sender_sub_id(mut self, id: impl Into<String>) -> Self {
        self.sender_sub_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn target_sub_id(mut self, id: impl Into<String>) -> Self {
        self.target_sub_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn sender_location_id(mut self, id: impl Into<String>) -> Self {
        self.sender_location_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn target_location_id(mut self, id: impl Into<String>) -> Self {
        self.target_location_id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn reset_on_logon(mut self, reset: bool) -> Self {
        self.reset_on_logon = reset;
        self
    }

    #[must_use]
    pub const fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    #[must_use]
    pub const fn strict_sequence_check(mut self, strict: bool) -> Self {
        self.strict_sequence_check = strict;
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Builds the settings. BeginString defaults to [`DEFAULT_BEGIN_STRING`].
    ///
    /// # Errors
    /// [`SessionError::Configuration`] when a CompID is missing or empty.
    pub fn build(self) -> Result<SessionSettings, SessionError> {
        let sender = self
            .sender_comp_id
            .ok_or_else(|| SessionError::Configuration("sender_comp_id is required".into()))?;
        let target = self
            .target_comp_id
            .ok_or_else(|| SessionError::Configuration("target_comp_id is required".into()))?;
        let begin_string = self
            .begin_string
            .unwrap_or_else(|| DEFAULT_BEGIN_STRING.to_string());

        let settings = SessionSettings {
            begin_string,
            sender_comp_id: sender,
            target_comp_id: target,
            sender_sub_id: self.sender_sub_id,
            target_sub_id: self.target_sub_id,
            sender_location_id: self.sender_location_id,
            target_location_id: self.target_location_id,
            reset_on_logon: self.reset_on_logon,
            heartbeat_interval: self
                .heartbeat_interval
                .unwrap_or(Duration::from_secs(DEFAULT_HEARTBEAT_SECS)),
            strict_sequence_check: self.strict_sequence_check,
            username: self.username,
            password: self.password,
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_new_defaults() {
        let settings = SessionSettings::new("FIX.4.2", "CLIENT", "SERVER");
        assert_eq!(settings.begin_string, "FIX.4.2");
        assert_eq!(settings.heartbeat_interval_secs(), 30);
        assert!(!settings.reset_on_logon);
        assert!(!settings.strict_sequence_check);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_session_id() {
        let id = SessionSettings::new("FIX.4.4", "CLIENT", "SERVER")
            .with_sender_sub_id("DESK")
            .with_target_location_id("LDN")
            .session_id();
        assert_eq!(
            id,
            SessionId::new("CLIENT", "SERVER")
                .with_sender_sub_id("DESK")
                .with_target_location_id("LDN")
        );
    }

    #[test]
    fn test_builder() {
        let settings = SessionSettingsBuilder::new()
            .sender_comp_id("CLIENT")
            .target_comp_id("SERVER")
            .heartbeat_interval(Duration::from_secs(60))
            .reset_on_logon(true)
            .credentials("trader", "secret")
            .build()
            .unwrap();
        assert_eq!(settings.begin_string, DEFAULT_BEGIN_STRING);
        assert_eq!(settings.username.as_deref(), Some("trader"));
        assert_eq!(settings.heartbeat_interval_secs(), 60);
        assert!(settings.reset_on_logon);
    }

    #[test]
    fn test_builder_requires_comp_ids() {
        let err = SessionSettingsBuilder::new()
            .sender_comp_id("CLIENT")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::Configuration("target_comp_id is required".to_string())
        );

        let err = SessionSettingsBuilder::new()
            .sender_comp_id("")
            .target_comp_id("SERVER")
            .build()
            .unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
    }
}
