//! Stencil updates for Halo fields.
//!
//! A [`Stencil`] computes one tile of the "new" field from the same tile
//! of the "old" field, ghosts included. [`advance`] applies a stencil to
//! every tile under an [`Execution`](halo_field::Execution) backend.
//!
//! The stock stencil is [`HeatStencil`], the explicit forward-Euler update
//! of the heat equation with a second-order central Laplacian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod heat;
pub mod stencil;

pub use error::StencilError;
pub use heat::{max_stable_dt, HeatStencil};
pub use stencil::{advance, Stencil};
