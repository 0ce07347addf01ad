//! Checkpoint/restart for Halo simulations.
//!
//! A checkpoint is one directory per step, named `<prefix><step:05>`:
//!
//! ```text
//! chk00010/
//!   Header          domain, step, time, field shape, tile list
//!   tile_00000.bin  interior values of tile 0
//!   tile_00001.bin  ...
//! ```
//!
//! Reading a checkpoint rebuilds the exact tile list (order included)
//! and every interior value bit for bit. Ghost cells are not stored; the
//! caller exchanges before the first stencil application.
//!
//! # Format
//!
//! All integers and floats are little-endian, with no padding.
//!
//! ```text
//! Header: [MAGIC "HCHK"] [VERSION u8] [step u64] [time f64]
//!         [dim u8] [cells u32 × dim] [prob_lo f64 × dim] [prob_hi f64 × dim]
//!         [periodic u8 × dim] [components u32] [ghost u32]
//!         [workers u32] [policy u8] [tiles u32] [(lo i32 × dim, hi i32 × dim) × tiles]
//! Tile:   [MAGIC "HTIL"] [VERSION u8] [index u32] [count u64] [f64 × count] [checksum u64]
//! ```
//!
//! The tile checksum is FNV-1a over the tile index and every value's bits.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod hash;
pub mod store;
pub mod types;

pub use error::CheckpointError;
pub use hash::block_checksum;
pub use store::{CheckpointStore, Restored};
pub use types::{CheckpointHeader, TileBlock};

/// Magic bytes at the start of every checkpoint header.
pub const HEADER_MAGIC: [u8; 4] = *b"HCHK";

/// Magic bytes at the start of every tile block.
pub const TILE_MAGIC: [u8; 4] = *b"HTIL";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// File name of the header inside a checkpoint directory.
pub const HEADER_FILE: &str = "Header";
