/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Logon authentication.

use async_trait::async_trait;
use ferrofix_core::{Message, tags};
use std::collections::HashMap;

/// Decides whether an inbound Logon may establish a session.
///
/// A rejected Logon closes the connection without any reply.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, logon: &Message) -> bool;
}

/// Accepts every Logon.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl Authenticator for AcceptAll {
    async fn authenticate(&self, _logon: &Message) -> bool {
        true
    }
}

/// Checks Username (553) and Password (554) against a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }
}

#[async_trait]
impl Authenticator for StaticCredentials {
    async fn authenticate(&self, logon: &Message) -> bool {
        let (Some(username), Some(password)) =
            (logon.get_str(tags::USERNAME), logon.get_str(tags::PASSWORD))
        else {
            return false;
        };
        self.users
            .get(username)
            .is_some_and(|expected| expected == password)
    }
}
