//! Data models for the Arca SDK.
//!
//! Request types are builders that serialize to the exact JSON shape the Arca
//! API expects. Response types decode leniently: documented fields are typed,
//! everything else lands in an `extra` map so new server fields never break
//! deserialization.

pub mod common;
pub mod skill;
pub mod table;
pub mod vector;

pub use common::*;
pub use skill::*;
pub use table::*;
pub use vector::*;
