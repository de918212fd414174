/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Repeating groups.
//!
//! A message body is a sequence of [`Fragment`]s: plain fields and
//! [`GroupField`]s. A `GroupField` is rendered as `count_tag=<n>` followed by
//! the contents of each of its `n` [`Group`] instances, which may nest
//! further groups.

use crate::field::{Field, FieldValue};
use crate::fixed::FixedPointNumber;

/// Element of a message body or of a group instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    /// A plain field.
    Field(Field),
    /// A repeating group with its instances.
    Group(GroupField),
}

impl Fragment {
    /// Tag of the field, or count tag of the group.
    #[must_use]
    pub const fn tag(&self) -> u32 {
        match self {
            Self::Field(field) => field.tag,
            Self::Group(group) => group.count_tag,
        }
    }

    /// Appends the wire form, SOH-terminated, to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Field(field) => field.write_to(buf),
            Self::Group(group) => group.write_to(buf),
        }
    }

    /// Pushes the flattened `(tag, rendered value)` sequence onto `out`.
    pub fn flatten_into(&self, out: &mut Vec<(u32, Vec<u8>)>) {
        match self {
            Self::Field(field) => out.push((field.tag, field.value.to_bytes())),
            Self::Group(group) => {
                out.push((group.count_tag, FieldValue::Int(group.len() as i64).to_bytes()));
                for instance in &group.groups {
                    for fragment in &instance.fragments {
                        fragment.flatten_into(out);
                    }
                }
            }
        }
    }
}

impl From<Field> for Fragment {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<GroupField> for Fragment {
    fn from(group: GroupField) -> Self {
        Self::Group(group)
    }
}

/// One instance of a repeating group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Group {
    fragments: Vec<Fragment>,
}

impl Group {
    /// Creates an empty instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Appends a fragment, keeping order.
    pub fn push(&mut self, fragment: impl Into<Fragment>) -> &mut Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Builder-style [`Group::push`].
    #[must_use]
    pub fn with(mut self, fragment: impl Into<Fragment>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Appends a string field.
    pub fn add_str(&mut self, tag: u32, value: impl Into<String>) -> &mut Self {
        self.push(Field::string(tag, value))
    }

    /// Appends an integer field.
    pub fn add_int(&mut self, tag: u32, value: i64) -> &mut Self {
        self.push(Field::int(tag, value))
    }

    /// Appends a decimal field.
    pub fn add_float(&mut self, tag: u32, value: FixedPointNumber) -> &mut Self {
        self.push(Field::float(tag, value))
    }

    /// First field with `tag` in this instance.
    #[must_use]
    pub fn get(&self, tag: u32) -> Option<&Field> {
        self.fragments.iter().find_map(|fragment| match fragment {
            Fragment::Field(field) if field.tag == tag => Some(field),
            _ => None,
        })
    }

    /// Text of the first field with `tag`.
    #[must_use]
    pub fn get_str(&self, tag: u32) -> Option<&str> {
        self.get(tag).and_then(|field| field.value.as_str())
    }

    /// First nested group with `count_tag`.
    #[must_use]
    pub fn get_group(&self, count_tag: u32) -> Option<&GroupField> {
        self.fragments.iter().find_map(|fragment| match fragment {
            Fragment::Group(group) if group.count_tag == count_tag => Some(group),
            _ => None,
        })
    }

    /// Fragments in insertion order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A repeating group: count tag plus its instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupField {
    /// The `NoXxx` tag carrying the instance count.
    pub count_tag: u32,
    /// Instances in order.
    pub groups: Vec<Group>,
}

impl GroupField {
    /// Creates a group with no instances.
    #[must_use]
    pub const fn new(count_tag: u32) -> Self {
        Self {
            count_tag,
            groups: Vec::new(),
        }
    }

    /// Appends an instance.
    pub fn push(&mut self, group: Group) -> &mut Self {
        self.groups.push(group);
        self
    }

    /// Builder-style [`GroupField::push`].
    #[must_use]
    pub fn with(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Appends `count_tag=<n>` and every instance to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        Field::int(self.count_tag, self.groups.len() as i64).write_to(buf);
        for group in &self.groups {
            for fragment in &group.fragments {
                fragment.write_to(buf);
            }
        }
    }
}
