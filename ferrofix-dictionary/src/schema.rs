/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Schema definitions for FIX dictionaries.
//!
//! This module defines:
//! - [`Version`]: FIX protocol versions and their BeginString
//! - [`FieldType`]: Semantic field categories
//! - [`GroupDef`]: Repeating group layouts
//! - [`Dictionary`]: Static registry plus overrides and group layouts

use crate::registry;
use ferrofix_core::{DecodeError, Field, tags};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// FIX protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// FIX 4.0
    Fix40,
    /// FIX 4.1
    Fix41,
    /// FIX 4.2
    Fix42,
    /// FIX 4.3
    Fix43,
    /// FIX 4.4
    Fix44,
    /// FIXT 1.1 (transport layer for FIX 5.0+)
    Fixt11,
}

impl Version {
    /// Returns the BeginString value for this version.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        match self {
            Self::Fix40 => "FIX.4.0",
            Self::Fix41 => "FIX.4.1",
            Self::Fix42 => "FIX.4.2",
            Self::Fix43 => "FIX.4.3",
            Self::Fix44 => "FIX.4.4",
            Self::Fixt11 => "FIXT.1.1",
        }
    }

    /// Looks a version up by its BeginString.
    #[must_use]
    pub fn from_begin_string(value: &str) -> Option<Self> {
        match value {
            "FIX.4.0" => Some(Self::Fix40),
            "FIX.4.1" => Some(Self::Fix41),
            "FIX.4.2" => Some(Self::Fix42),
            "FIX.4.3" => Some(Self::Fix43),
            "FIX.4.4" => Some(Self::Fix44),
            "FIXT.1.1" => Some(Self::Fixt11),
            _ => None,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.begin_string())
    }
}

/// FIX field data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer value.
    Int,
    /// Length field (for data fields).
    Length,
    /// Sequence number.
    SeqNum,
    /// Number of entries in a repeating group.
    NumInGroup,
    /// Tag number reference.
    TagNum,
    /// Day of month (1-31).
    DayOfMonth,
    /// Decimal number.
    Float,
    /// Quantity.
    Qty,
    /// Price.
    Price,
    /// Price offset.
    PriceOffset,
    /// Amount (price * quantity).
    Amt,
    /// Percentage.
    Percentage,
    /// Single character.
    Char,
    /// Boolean (Y/N).
    Boolean,
    /// String.
    String,
    /// Space-separated values.
    MultipleValueString,
    /// Currency code (ISO 4217).
    Currency,
    /// Exchange code (ISO 10383 MIC).
    Exchange,
    /// Country code (ISO 3166).
    Country,
    /// Month-year (YYYYMM, YYYYMMDD or YYYYMMWW).
    MonthYear,
    /// UTC timestamp.
    UtcTimestamp,
    /// UTC time only.
    UtcTimeOnly,
    /// UTC date only.
    UtcDateOnly,
    /// Local market date.
    LocalMktDate,
    /// Raw data.
    Data,
}

impl FieldType {
    /// Categories decoded as `Int`.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Length
                | Self::SeqNum
                | Self::NumInGroup
                | Self::TagNum
                | Self::DayOfMonth
        )
    }

    /// Categories decoded as `Float`.
    #[must_use]
    pub const fn is_decimal(&self) -> bool {
        matches!(
            self,
            Self::Float | Self::Qty | Self::Price | Self::PriceOffset | Self::Amt | Self::Percentage
        )
    }

    /// Returns true if this type represents a numeric value.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_decimal()
    }

    /// Returns true if this type is one of the UTC temporal categories.
    #[must_use]
    pub const fn is_timestamp(&self) -> bool {
        matches!(
            self,
            Self::UtcTimestamp | Self::UtcTimeOnly | Self::UtcDateOnly
        )
    }
}

impl std::str::FromStr for FieldType {
    type Err = std::convert::Infallible;

    /// Parses a QuickFIX-style type name. Unknown names map to `String`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "INT" => Self::Int,
            "LENGTH" => Self::Length,
            "SEQNUM" => Self::SeqNum,
            "NUMINGROUP" => Self::NumInGroup,
            "TAGNUM" => Self::TagNum,
            "DAYOFMONTH" => Self::DayOfMonth,
            "FLOAT" => Self::Float,
            "QTY" | "QUANTITY" => Self::Qty,
            "PRICE" => Self::Price,
            "PRICEOFFSET" => Self::PriceOffset,
            "AMT" | "AMOUNT" => Self::Amt,
            "PERCENTAGE" => Self::Percentage,
            "CHAR" => Self::Char,
            "BOOLEAN" => Self::Boolean,
            "MULTIPLEVALUESTRING" | "MULTIPLESTRINGVALUE" | "MULTIPLECHARVALUE" => {
                Self::MultipleValueString
            }
            "CURRENCY" => Self::Currency,
            "EXCHANGE" => Self::Exchange,
            "COUNTRY" => Self::Country,
            "MONTHYEAR" => Self::MonthYear,
            "UTCTIMESTAMP" => Self::UtcTimestamp,
            "UTCTIMEONLY" => Self::UtcTimeOnly,
            "UTCDATEONLY" | "UTCDATE" => Self::UtcDateOnly,
            "LOCALMKTDATE" => Self::LocalMktDate,
            "DATA" => Self::Data,
            _ => Self::String,
        })
    }
}

/// Layout of a repeating group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Tag of the count field (NumInGroup).
    pub count_tag: u32,
    /// Name of the group.
    pub name: String,
    /// Tag of the first field in each group entry.
    pub delimiter_tag: u32,
    /// Member field tags, delimiter included.
    pub members: Vec<u32>,
    /// Nested groups within this group.
    pub groups: Vec<GroupDef>,
}

impl GroupDef {
    /// Creates a layout whose only member is the delimiter.
    #[must_use]
    pub fn new(count_tag: u32, name: impl Into<String>, delimiter_tag: u32) -> Self {
        Self {
            count_tag,
            name: name.into(),
            delimiter_tag,
            members: vec![delimiter_tag],
            groups: Vec::new(),
        }
    }

    /// Adds member tags.
    #[must_use]
    pub fn with_members(mut self, members: &[u32]) -> Self {
        for &tag in members {
            if !self.members.contains(&tag) {
                self.members.push(tag);
            }
        }
        self
    }

    /// Adds a nested group.
    #[must_use]
    pub fn with_group(mut self, group: GroupDef) -> Self {
        self.groups.push(group);
        self
    }

    /// Returns true if `tag` is a plain member of an instance.
    #[must_use]
    pub fn is_member(&self, tag: u32) -> bool {
        self.members.contains(&tag)
    }

    /// Nested group opened by `count_tag`.
    #[must_use]
    pub fn nested(&self, count_tag: u32) -> Option<&GroupDef> {
        self.groups.iter().find(|g| g.count_tag == count_tag)
    }
}

/// Field-type registry plus repeating-group layouts.
///
/// Lookups consult per-dictionary overrides first, then the static table
/// in [`registry`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    /// FIX version.
    pub version: Version,
    overrides: HashMap<u32, FieldType>,
    groups: HashMap<u32, GroupDef>,
}

impl Dictionary {
    /// Creates a dictionary with the static table only and no groups.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            overrides: HashMap::new(),
            groups: HashMap::new(),
        }
    }

    /// Creates a dictionary with the common session and application groups.
    #[must_use]
    pub fn standard(version: Version) -> Self {
        let mut dict = Self::new(version);
        for group in standard_groups() {
            dict.add_group(group);
        }
        dict
    }

    /// Overrides the type of `tag`.
    #[must_use]
    pub fn with_field(mut self, tag: u32, field_type: FieldType) -> Self {
        self.overrides.insert(tag, field_type);
        self
    }

    /// Registers a top-level repeating group.
    #[must_use]
    pub fn with_group(mut self, group: GroupDef) -> Self {
        self.add_group(group);
        self
    }

    /// Registers a top-level repeating group, replacing one with the same
    /// count tag.
    pub fn add_group(&mut self, group: GroupDef) {
        self.groups.insert(group.count_tag, group);
    }

    /// Semantic category of `tag`.
    #[must_use]
    pub fn field_type(&self, tag: u32) -> FieldType {
        self.overrides
            .get(&tag)
            .copied()
            .unwrap_or_else(|| registry::field_type(tag))
    }

    /// Top-level group opened by `count_tag`.
    #[must_use]
    pub fn group(&self, count_tag: u32) -> Option<&GroupDef> {
        self.groups.get(&count_tag)
    }

    /// Returns an iterator over all top-level groups.
    pub fn groups(&self) -> impl Iterator<Item = &GroupDef> {
        self.groups.values()
    }

    /// Decodes `bytes` for `tag` using this dictionary's type for the tag.
    ///
    /// # Errors
    /// [`DecodeError::InvalidFieldValue`] when the bytes do not fit the type.
    pub fn decode_value(&self, tag: u32, bytes: &[u8]) -> Result<Field, DecodeError> {
        registry::decode_value(tag, self.field_type(tag), bytes)
    }

    /// Returns true for standard header tags.
    #[must_use]
    pub const fn is_header_tag(&self, tag: u32) -> bool {
        registry::is_header_tag(tag)
    }

    /// Returns true for standard trailer tags.
    #[must_use]
    pub const fn is_trailer_tag(&self, tag: u32) -> bool {
        registry::is_trailer_tag(tag)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::standard(Version::Fix44)
    }
}

fn parties(count_tag: u32, name: &str, id: u32, source: u32, role: u32) -> GroupDef {
    GroupDef::new(count_tag, name, id).with_members(&[source, role])
}

/// Group layouts registered by [`Dictionary::standard`].
#[must_use]
pub fn standard_groups() -> Vec<GroupDef> {
    vec![
        GroupDef::new(tags::NO_MSG_TYPES, "NoMsgTypes", tags::REF_MSG_TYPE)
            .with_members(&[tags::MSG_DIRECTION, 1130, 1131]),
        GroupDef::new(tags::NO_RELATED_SYM, "NoRelatedSym", tags::SYMBOL).with_members(&[
            65, 48, 22, 167, 200, 207, 15, tags::ORDER_QTY, tags::SIDE,
        ]),
        GroupDef::new(tags::NO_MD_ENTRIES, "NoMDEntries", 269).with_members(&[
            270, 271, 272, 273, 278, 279, 280, tags::SYMBOL, 15, 290, 346,
        ]),
        parties(tags::NO_PARTY_IDS, "NoPartyIDs", tags::PARTY_ID, tags::PARTY_ID_SOURCE, tags::PARTY_ROLE)
            .with_group(GroupDef::new(802, "NoPartySubIDs", 523).with_members(&[803])),
        GroupDef::new(tags::NO_ALLOCS, "NoAllocs", 79)
            .with_members(&[661, 80])
            .with_group(parties(539, "NoNestedPartyIDs", 524, 525, 538)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_begin_string() {
        assert_eq!(Version::Fix42.begin_string(), "FIX.4.2");
        assert_eq!(Version::Fixt11.begin_string(), "FIXT.1.1");
        assert_eq!(Version::from_begin_string("FIX.4.4"), Some(Version::Fix44));
        assert_eq!(Version::from_begin_string("FIX.9.9"), None);
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("INT".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("price".parse::<FieldType>().unwrap(), FieldType::Price);
        assert_eq!(
            "UTCTIMESTAMP".parse::<FieldType>().unwrap(),
            FieldType::UtcTimestamp
        );
        assert_eq!("unknown".parse::<FieldType>().unwrap(), FieldType::String);
    }

    #[test]
    fn test_field_type_categories() {
        assert!(FieldType::SeqNum.is_integer());
        assert!(FieldType::Price.is_decimal());
        assert!(FieldType::Qty.is_numeric());
        assert!(!FieldType::String.is_numeric());
        assert!(FieldType::UtcDateOnly.is_timestamp());
        assert!(!FieldType::LocalMktDate.is_timestamp());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let dict = Dictionary::new(Version::Fix44).with_field(5001, FieldType::Price);
        assert_eq!(dict.field_type(5001), FieldType::Price);
        assert_eq!(dict.field_type(44), FieldType::Price);
        assert_eq!(dict.field_type(5002), FieldType::String);
        let f = dict.decode_value(5001, b"1.5").unwrap();
        assert!(f.value.as_float().is_some());
    }

    #[test]
    fn test_standard_groups() {
        let dict = Dictionary::standard(Version::Fix44);
        let parties = dict.group(tags::NO_PARTY_IDS).unwrap();
        assert_eq!(parties.delimiter_tag, tags::PARTY_ID);
        assert!(parties.is_member(tags::PARTY_ROLE));
        assert!(parties.nested(802).is_some());
        assert!(dict.group(tags::NO_MD_ENTRIES).is_some());
        assert!(dict.group(tags::NO_ALLOCS).unwrap().nested(539).is_some());
        assert!(Dictionary::new(Version::Fix44).group(146).is_none());
    }

    #[test]
    fn test_custom_group_members_dedup() {
        let g = GroupDef::new(1002, "Custom", 1003).with_members(&[1003, 1004]);
        assert_eq!(g.members, vec![1003, 1004]);
    }
}
