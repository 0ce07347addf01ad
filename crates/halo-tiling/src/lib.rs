//! Tile decomposition for Halo simulations.
//!
//! Splits a domain's index box into bounded-size tiles by deterministic
//! recursive bisection ([`decompose`]) and maps tiles onto workers
//! ([`assign`]). The resulting [`TileDecomposition`] is the shared layout
//! every distributed field, exchange plan and checkpoint is built against.
//!
//! Determinism is load-bearing: identical inputs always yield an
//! identical, identically ordered tile list, so a checkpoint written by
//! one run can be read back by another.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assign;
pub mod decompose;
pub mod error;
pub mod layout;

pub use assign::{assign, AssignmentPolicy, WorkerId};
pub use decompose::decompose;
pub use error::DecompositionError;
pub use layout::TileDecomposition;
