//! The [`TileDecomposition`]: an ordered tile list plus worker ownership.

use halo_core::IndexBox;

use crate::assign::{assign, AssignmentPolicy, WorkerId};
use crate::decompose::decompose;
use crate::error::DecompositionError;

/// An ordered partition of a domain box into tiles, with an owner per tile.
///
/// Invariants, checked at construction:
/// - every tile is non-empty and lies inside the domain box;
/// - tiles are pairwise disjoint;
/// - their union is exactly the domain box.
///
/// Tile order is part of the layout's identity. Two decompositions are
/// compatible only if they list the same boxes in the same order.
///
/// # Examples
///
/// ```
/// use halo_core::IndexBox;
/// use halo_tiling::{AssignmentPolicy, TileDecomposition, WorkerId};
///
/// let domain = IndexBox::from_extent(&[8, 8]);
/// let layout = TileDecomposition::new(&domain, 4, 2, AssignmentPolicy::RoundRobin).unwrap();
/// assert_eq!(layout.len(), 4);
/// assert_eq!(layout.owner(3), WorkerId(1));
/// assert_eq!(layout.tiles_of(WorkerId(0)).collect::<Vec<_>>(), vec![0, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileDecomposition {
    domain: IndexBox,
    boxes: Vec<IndexBox>,
    owners: Vec<WorkerId>,
    worker_count: usize,
    policy: AssignmentPolicy,
}

impl TileDecomposition {
    /// Decompose `domain` from scratch and assign the tiles.
    pub fn new(
        domain: &IndexBox,
        max_tile_size: u32,
        worker_count: usize,
        policy: AssignmentPolicy,
    ) -> Result<Self, DecompositionError> {
        let boxes = decompose(domain, max_tile_size)?;
        let owners = assign(&boxes, worker_count, policy)?;
        Ok(Self {
            domain: *domain,
            boxes,
            owners,
            worker_count,
            policy,
        })
    }

    /// Rebuild a layout from an explicit tile list (e.g. one read from a
    /// checkpoint), validating coverage and disjointness. Tile order is
    /// preserved exactly.
    pub fn from_boxes(
        domain: &IndexBox,
        boxes: Vec<IndexBox>,
        worker_count: usize,
        policy: AssignmentPolicy,
    ) -> Result<Self, DecompositionError> {
        if domain.is_empty() {
            return Err(DecompositionError::EmptyDomain { domain: *domain });
        }
        validate_partition(domain, &boxes)?;
        let owners = assign(&boxes, worker_count, policy)?;
        Ok(Self {
            domain: *domain,
            boxes,
            owners,
            worker_count,
            policy,
        })
    }

    /// The same tiles, reassigned to a different worker count and policy.
    pub fn reassigned(
        &self,
        worker_count: usize,
        policy: AssignmentPolicy,
    ) -> Result<Self, DecompositionError> {
        let owners = assign(&self.boxes, worker_count, policy)?;
        Ok(Self {
            domain: self.domain,
            boxes: self.boxes.clone(),
            owners,
            worker_count,
            policy,
        })
    }

    /// The domain box being partitioned.
    pub fn domain_box(&self) -> &IndexBox {
        &self.domain
    }

    /// Tile boxes in decomposition order.
    pub fn boxes(&self) -> &[IndexBox] {
        &self.boxes
    }

    /// Tile box at `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `tile >= self.len()`.
    pub fn tile(&self, tile: usize) -> &IndexBox {
        &self.boxes[tile]
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Always `false`: construction rejects empty domains.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Owner of every tile, in tile order.
    pub fn owners(&self) -> &[WorkerId] {
        &self.owners
    }

    /// Owner of `tile`.
    ///
    /// # Panics
    ///
    /// Panics if `tile >= self.len()`.
    pub fn owner(&self, tile: usize) -> WorkerId {
        self.owners[tile]
    }

    /// Tile indices owned by `worker`, ascending.
    pub fn tiles_of(&self, worker: WorkerId) -> impl Iterator<Item = usize> + '_ {
        self.owners
            .iter()
            .enumerate()
            .filter(move |(_, &w)| w == worker)
            .map(|(i, _)| i)
    }

    /// Number of workers tiles were assigned across.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// The assignment policy in effect.
    pub fn policy(&self) -> AssignmentPolicy {
        self.policy
    }

    /// Whether `other` has the same tiles in the same order. Ownership is
    /// not compared.
    pub fn same_tiles(&self, other: &TileDecomposition) -> bool {
        self.domain == other.domain && self.boxes == other.boxes
    }
}

/// Check that `boxes` partitions `domain` exactly.
fn validate_partition(domain: &IndexBox, boxes: &[IndexBox]) -> Result<(), DecompositionError> {
    let mut covered = 0usize;
    for (i, bx) in boxes.iter().enumerate() {
        if bx.dim() != domain.dim() {
            return Err(DecompositionError::DimensionMismatch {
                tile: i,
                expected: domain.dim(),
                got: bx.dim(),
            });
        }
        if bx.is_empty() || !domain.contains_box(bx) {
            return Err(DecompositionError::TileOutsideDomain {
                tile: i,
                tile_box: *bx,
            });
        }
        covered += bx.num_cells();
    }
    for i in 0..boxes.len() {
        for j in (i + 1)..boxes.len() {
            if boxes[i].intersect(&boxes[j]).is_some() {
                return Err(DecompositionError::Overlap {
                    first: i,
                    second: j,
                });
            }
        }
    }
    // Disjoint tiles inside the domain cover it iff the cell counts match.
    let expected = domain.num_cells();
    if covered != expected {
        return Err(DecompositionError::CoverageGap { covered, expected });
    }
    Ok(())
}
