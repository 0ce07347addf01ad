//! Test fixtures and field helpers for Halo development.
//!
//! Provides standard domains and layouts ([`fixtures`]), seeded random
//! field fills and bitwise field comparison ([`fields`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fields;
pub mod fixtures;

pub use fields::{assert_interiors_bitwise_eq, first_interior_difference, random_field, Difference};
pub use fixtures::{layout, periodic_square};
