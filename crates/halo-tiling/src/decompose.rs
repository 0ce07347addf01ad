//! Recursive bisection of a domain box into bounded-size tiles.

use halo_core::IndexBox;

use crate::error::DecompositionError;

/// Split `domain` into tiles no longer than `max_tile_size` on any axis.
///
/// While a box is too long on some axis, its longest axis (ties go to the
/// lowest axis index) is cut in two, the lower half holding
/// `floor(len / 2)` cells. Halves are processed depth-first, lower before
/// upper, so the output order is fully determined by the inputs.
///
/// # Examples
///
/// ```
/// use halo_core::IndexBox;
/// use halo_tiling::decompose;
///
/// let tiles = decompose(&IndexBox::from_extent(&[8, 8]), 4).unwrap();
/// assert_eq!(tiles.len(), 4);
/// assert_eq!(tiles[0], IndexBox::new(&[0, 0], &[3, 3]).unwrap());
/// assert_eq!(tiles[1], IndexBox::new(&[0, 4], &[3, 7]).unwrap());
/// assert_eq!(tiles[2], IndexBox::new(&[4, 0], &[7, 3]).unwrap());
/// assert_eq!(tiles[3], IndexBox::new(&[4, 4], &[7, 7]).unwrap());
/// ```
pub fn decompose(
    domain: &IndexBox,
    max_tile_size: u32,
) -> Result<Vec<IndexBox>, DecompositionError> {
    if max_tile_size < 1 {
        return Err(DecompositionError::InvalidMaxTileSize { got: max_tile_size });
    }
    if domain.is_empty() {
        return Err(DecompositionError::EmptyDomain { domain: *domain });
    }

    let mut tiles = Vec::new();
    // Explicit stack: push upper before lower so lower pops first.
    let mut pending = vec![*domain];
    while let Some(bx) = pending.pop() {
        let axis = bx.longest_axis();
        if bx.length(axis) <= max_tile_size {
            tiles.push(bx);
            continue;
        }
        let (lower, upper) = bx.bisect(axis);
        pending.push(upper);
        pending.push(lower);
    }
    Ok(tiles)
}
