/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Session identity.

use ferrofix_core::Header;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a FIX session, always seen from the local side: `sender_*` is us.
///
/// Equality and hashing cover every component, optional ones included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId {
    pub sender_comp_id: String,
    pub target_comp_id: String,
    pub sender_sub_id: Option<String>,
    pub target_sub_id: Option<String>,
    pub sender_location_id: Option<String>,
    pub target_location_id: Option<String>,
}

impl SessionId {
    /// Creates an id from the two CompIDs.
    #[must_use]
    pub fn new(sender_comp_id: impl Into<String>, target_comp_id: impl Into<String>) -> Self {
        Self {
            sender_comp_id: sender_comp_id.into(),
            target_comp_id: target_comp_id.into(),
            sender_sub_id: None,
            target_sub_id: None,
            sender_location_id: None,
            target_location_id: None,
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

    /// Derives our id from a header the counterparty sent us.
    ///
    /// The peer's sender ids become our target ids and the other way round.
    #[must_use]
    pub fn from_inbound(header: &Header) -> Self {
        Self {
            sender_comp_id: header.target_comp_id.clone(),
            target_comp_id: header.sender_comp_id.clone(),
            sender_sub_id: header.target_sub_id.clone(),
            target_sub_id: header.sender_sub_id.clone(),
            sender_location_id: header.target_location_id.clone(),
            target_location_id: header.sender_location_id.clone(),
        }
    }

    /// The same session seen from the counterparty.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            sender_comp_id: self.target_comp_id.clone(),
            target_comp_id: self.sender_comp_id.clone(),
            sender_sub_id: self.target_sub_id.clone(),
            target_sub_id: self.sender_sub_id.clone(),
            sender_location_id: self.target_location_id.clone(),
            target_location_id: self.sender_location_id.clone(),
        }
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side(f: &mut fmt::Formatter<'_>, comp: &str, sub: &Option<String>, loc: &Option<String>) -> fmt::Result {
            f.write_str(comp)?;
            if let Some(sub) = sub {
                write!(f, "/{sub}")?;
            }
            if let Some(loc) = loc {
                write!(f, "@{loc}")?;
            }
            Ok(())
        }
        side(f, &self.sender_comp_id, &self.sender_sub_id, &self.sender_location_id)?;
        f.write_str("->")?;
        side(f, &self.target_comp_id, &self.target_sub_id, &self.target_location_id)
    }
}
