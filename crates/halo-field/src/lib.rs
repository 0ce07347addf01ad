//! Distributed field storage and ghost exchange for Halo simulations.
//!
//! A [`DistributedField`] holds one dense [`TileArray`] per tile of a
//! [`TileDecomposition`](halo_tiling::TileDecomposition), each padded by a
//! halo of ghost cells. Before every stencil application an
//! [`ExchangePlan`] refreshes those ghosts from neighbouring (or
//! periodically wrapped) tile interiors.
//!
//! # Execution
//!
//! Per-tile work runs through [`Execution`], which either walks tiles in
//! order or runs each worker's tile set as a rayon task. The two are
//! observably identical: tiles never read each other's in-flight data.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod exchange;
pub mod exec;
pub mod field;
pub mod tile;

pub use error::FieldError;
pub use exchange::{exchange, ExchangePlan, HaloCopy};
pub use exec::{for_each_cell, Execution};
pub use field::DistributedField;
pub use tile::TileArray;
