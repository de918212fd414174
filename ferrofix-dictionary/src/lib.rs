/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! # ferrofix dictionary
//!
//! Field metadata for the ferrofix engine.
//!
//! This crate provides:
//! - **Static registry**: tag → semantic [`FieldType`], with unknown tags as strings
//! - **Typed decoding**: [`decode_value`] builds the matching core `Field`
//! - **Group layouts**: [`GroupDef`] trees that drive repeating-group decoding
//! - **Header routing**: [`is_header_tag`] and [`is_trailer_tag`]

pub mod registry;
pub mod schema;

pub use registry::{decode_value, field_type, is_header_tag, is_trailer_tag};
pub use schema::{Dictionary, FieldType, GroupDef, Version, standard_groups};
