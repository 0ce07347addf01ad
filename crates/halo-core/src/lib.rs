//! Core geometry types for the Halo tiled stencil framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! integer index space ([`IntVect`], [`IndexBox`]) and the physical
//! description of the simulated region ([`Domain`]) that every other Halo
//! crate builds on.
//!
//! All index boxes are **inclusive** on both ends (`[lo, hi]`), and always
//! carry three coordinates. Axes beyond the box's dimension are inactive:
//! they hold `lo == hi == 0` and never grow, shift, or split.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod index;

pub use domain::Domain;
pub use error::DomainError;
pub use index::{Cells, IndexBox, IntVect, MAX_DIM};
