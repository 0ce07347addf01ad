//! Binary encode/decode for checkpoint headers and tile blocks.
//!
//! All integers are little-endian. There is no compression, alignment
//! padding or self-describing schema; the version byte gates layout changes.

use std::io::{self, Read, Write};

use halo_core::{Domain, IndexBox, MAX_DIM};
use halo_tiling::AssignmentPolicy;

use crate::error::CheckpointError;
use crate::hash::block_checksum;
use crate::types::{CheckpointHeader, TileBlock};
use crate::{FORMAT_VERSION, HEADER_MAGIC, TILE_MAGIC};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CheckpointError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
fn read_u8(r: &mut dyn Read) -> Result<u8, CheckpointError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
fn read_u32_le(r: &mut dyn Read) -> Result<u32, CheckpointError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i32.
fn read_i32_le(r: &mut dyn Read) -> Result<i32, CheckpointError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a little-endian u64.
fn read_u64_le(r: &mut dyn Read) -> Result<u64, CheckpointError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a little-endian f64.
fn read_f64_le(r: &mut dyn Read) -> Result<f64, CheckpointError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn is_eof(e: &CheckpointError) -> bool {
    matches!(e, CheckpointError::Io { source, .. } if source.kind() == io::ErrorKind::UnexpectedEof)
}

fn read_magic(r: &mut dyn Read, expected: [u8; 4]) -> Result<(), CheckpointError> {
    let mut found = [0u8; 4];
    r.read_exact(&mut found)?;
    if found != expected {
        return Err(CheckpointError::InvalidMagic { expected, found });
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CheckpointError::UnsupportedVersion { found: version });
    }
    Ok(())
}

// ── Header ──────────────────────────────────────────────────────

/// Encode a checkpoint header.
pub fn encode_header(w: &mut dyn Write, header: &CheckpointHeader) -> Result<(), CheckpointError> {
    w.write_all(&HEADER_MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    write_u64_le(w, header.step)?;
    write_f64_le(w, header.time)?;

    let domain = &header.domain;
    let dim = domain.dim();
    write_u8(w, dim as u8)?;
    for &n in domain.cells() {
        write_u32_le(w, n)?;
    }
    for &lo in domain.prob_lo() {
        write_f64_le(w, lo)?;
    }
    for &hi in domain.prob_hi() {
        write_f64_le(w, hi)?;
    }
    for &p in domain.periodicity() {
        write_u8(w, u8::from(p))?;
    }

    write_u32_le(w, header.components)?;
    write_u32_le(w, header.ghost)?;
    write_u32_le(w, header.worker_count)?;
    write_u8(w, header.policy.tag())?;

    write_u32_le(w, header.tiles.len() as u32)?;
    for bx in &header.tiles {
        for axis in 0..dim {
            write_i32_le(w, bx.lo()[axis])?;
        }
        for axis in 0..dim {
            write_i32_le(w, bx.hi()[axis])?;
        }
    }
    Ok(())
}

/// Decode and validate a checkpoint header.
///
/// A header that ends early is reported as
/// [`MalformedHeader`](CheckpointError::MalformedHeader).
pub fn decode_header(r: &mut dyn Read) -> Result<CheckpointHeader, CheckpointError> {
    decode_header_fields(r).map_err(|e| {
        if is_eof(&e) {
            CheckpointError::MalformedHeader {
                detail: "header ends early".into(),
            }
        } else {
            e
        }
    })
}

fn decode_header_fields(r: &mut dyn Read) -> Result<CheckpointHeader, CheckpointError> {
    read_magic(r, HEADER_MAGIC)?;

    let step = read_u64_le(r)?;
    let time = read_f64_le(r)?;

    let dim = read_u8(r)? as usize;
    if !(2..=MAX_DIM).contains(&dim) {
        return Err(CheckpointError::MalformedHeader {
            detail: format!("dimension {dim} out of range"),
        });
    }
    let mut cells = Vec::with_capacity(dim);
    for _ in 0..dim {
        cells.push(read_u32_le(r)?);
    }
    let mut prob_lo = Vec::with_capacity(dim);
    for _ in 0..dim {
        prob_lo.push(read_f64_le(r)?);
    }
    let mut prob_hi = Vec::with_capacity(dim);
    for _ in 0..dim {
        prob_hi.push(read_f64_le(r)?);
    }
    let mut periodic = Vec::with_capacity(dim);
    for axis in 0..dim {
        periodic.push(match read_u8(r)? {
            0 => false,
            1 => true,
            other => {
                return Err(CheckpointError::MalformedHeader {
                    detail: format!("periodic flag {other} on axis {axis}"),
                })
            }
        });
    }
    let domain = Domain::new(&cells, &prob_lo, &prob_hi, &periodic)?;

    let components = read_u32_le(r)?;
    let ghost = read_u32_le(r)?;
    let worker_count = read_u32_le(r)?;
    let tag = read_u8(r)?;
    let policy = AssignmentPolicy::from_tag(tag).ok_or_else(|| CheckpointError::MalformedHeader {
        detail: format!("unknown assignment policy tag {tag}"),
    })?;

    let count = read_u32_le(r)? as usize;
    // The count comes from disk: cap the preallocation.
    let mut tiles = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        let mut lo = [0i32; MAX_DIM];
        let mut hi = [0i32; MAX_DIM];
        for v in lo.iter_mut().take(dim) {
            *v = read_i32_le(r)?;
        }
        for v in hi.iter_mut().take(dim) {
            *v = read_i32_le(r)?;
        }
        tiles.push(IndexBox::new(&lo[..dim], &hi[..dim])?);
    }

    Ok(CheckpointHeader {
        step,
        time,
        domain,
        components,
        ghost,
        worker_count,
        policy,
        tiles,
    })
}

// ── Tile blocks ─────────────────────────────────────────────────

/// Encode one tile block with its checksum.
pub fn encode_tile(w: &mut dyn Write, tile: u32, values: &[f64]) -> Result<(), CheckpointError> {
    w.write_all(&TILE_MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u32_le(w, tile)?;
    write_u64_le(w, values.len() as u64)?;
    for &v in values {
        write_f64_le(w, v)?;
    }
    write_u64_le(w, block_checksum(tile, values))?;
    Ok(())
}

/// Decode the block of tile `tile`, which must hold exactly `expected`
/// values, and verify its checksum. The reader must end after the block.
pub fn decode_tile(
    r: &mut dyn Read,
    tile: usize,
    expected: usize,
) -> Result<TileBlock, CheckpointError> {
    let malformed = |detail: &str| CheckpointError::MalformedBlock {
        tile,
        detail: detail.to_string(),
    };
    let eof_as = |e: CheckpointError, detail: &str| {
        if is_eof(&e) {
            malformed(detail)
        } else {
            e
        }
    };

    read_magic(r, TILE_MAGIC).map_err(|e| eof_as(e, "block header ends early"))?;
    let index = read_u32_le(r).map_err(|e| eof_as(e, "block header ends early"))?;
    if index as usize != tile {
        return Err(malformed(&format!("block is labelled tile {index}")));
    }
    let count = read_u64_le(r).map_err(|e| eof_as(e, "block header ends early"))? as usize;
    if count < expected {
        return Err(CheckpointError::Truncated {
            tile,
            expected,
            found: count,
        });
    }
    if count > expected {
        return Err(malformed(&format!(
            "block holds {count} values, tile needs {expected}"
        )));
    }

    let mut values = Vec::with_capacity(expected);
    for found in 0..expected {
        match read_f64_le(r) {
            Ok(v) => values.push(v),
            Err(e) if is_eof(&e) => {
                return Err(CheckpointError::Truncated {
                    tile,
                    expected,
                    found,
                })
            }
            Err(e) => return Err(e),
        }
    }
    let stored = read_u64_le(r).map_err(|e| eof_as(e, "checksum missing"))?;
    let computed = block_checksum(index, &values);
    if stored != computed {
        return Err(CheckpointError::ChecksumMismatch {
            tile,
            stored,
            computed,
        });
    }
    let mut extra = [0u8; 1];
    if r.read(&mut extra)? != 0 {
        return Err(malformed("trailing bytes after checksum"));
    }
    Ok(TileBlock {
        tile: index,
        values,
    })
}
