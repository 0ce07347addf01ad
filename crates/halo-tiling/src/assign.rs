//! Deterministic tile-to-worker assignment.

use std::fmt;
use std::str::FromStr;

use halo_core::IndexBox;

use crate::error::DecompositionError;

/// Identifies a worker (thread, task or process) that owns a set of tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// How tiles are distributed over workers.
///
/// Both policies are pure functions of the tile list and the worker count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssignmentPolicy {
    /// Tile `i` goes to worker `i mod workers`.
    #[default]
    RoundRobin,
    /// Largest tile first (ties by tile index) onto the least-loaded
    /// worker (ties by worker id), balancing total cell counts.
    LoadBalanced,
}

impl AssignmentPolicy {
    /// Stable wire tag used by checkpoint headers.
    pub fn tag(self) -> u8 {
        match self {
            Self::RoundRobin => 0,
            Self::LoadBalanced => 1,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::RoundRobin),
            1 => Some(Self::LoadBalanced),
            _ => None,
        }
    }
}

impl fmt::Display for AssignmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin => write!(f, "round_robin"),
            Self::LoadBalanced => write!(f, "load_balanced"),
        }
    }
}

impl FromStr for AssignmentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round_robin" => Ok(Self::RoundRobin),
            "load_balanced" => Ok(Self::LoadBalanced),
            other => Err(format!(
                "unknown assignment policy '{other}' (expected round_robin or load_balanced)"
            )),
        }
    }
}

/// Map every tile to a worker.
///
/// Returns one [`WorkerId`] per tile, in tile order.
pub fn assign(
    tiles: &[IndexBox],
    worker_count: usize,
    policy: AssignmentPolicy,
) -> Result<Vec<WorkerId>, DecompositionError> {
    if worker_count == 0 {
        return Err(DecompositionError::NoWorkers);
    }
    let owners = match policy {
        AssignmentPolicy::RoundRobin => (0..tiles.len())
            .map(|i| WorkerId((i % worker_count) as u32))
            .collect(),
        AssignmentPolicy::LoadBalanced => load_balanced(tiles, worker_count),
    };
    Ok(owners)
}

fn load_balanced(tiles: &[IndexBox], worker_count: usize) -> Vec<WorkerId> {
    let mut order: Vec<usize> = (0..tiles.len()).collect();
    // Stable sort keeps tile-index order among equal sizes.
    order.sort_by(|&a, &b| tiles[b].num_cells().cmp(&tiles[a].num_cells()));

    // Workers past the tile count would only ever stay empty.
    let active = worker_count.min(tiles.len()).max(1);
    let mut load = vec![0usize; active];
    let mut owners = vec![WorkerId(0); tiles.len()];
    for tile in order {
        let mut target = 0;
        for w in 1..active {
            if load[w] < load[target] {
                target = w;
            }
        }
        load[target] += tiles[tile].num_cells();
        owners[tile] = WorkerId(target as u32);
    }
    owners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;

    #[test]
    fn zero_workers_is_rejected() {
        let tiles = vec![IndexBox::from_extent(&[4, 4])];
        assert_eq!(
            assign(&tiles, 0, AssignmentPolicy::RoundRobin),
            Err(DecompositionError::NoWorkers)
        );
    }

    #[test]
    fn surplus_workers_leave_load_balanced_owners_unchanged() {
        let tiles = decompose(&IndexBox::from_extent(&[12, 8]), 4).unwrap();
        let n = tiles.len();
        let exact = assign(&tiles, n, AssignmentPolicy::LoadBalanced).unwrap();
        let huge = assign(&tiles, 20_000_000, AssignmentPolicy::LoadBalanced).unwrap();
        assert_eq!(exact, huge);
        let mut ids: Vec<u32> = huge.iter().map(|w| w.0).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..n as u32).collect::<Vec<_>>());
    }

    #[test]
    fn round_robin_is_index_mod_workers() {
        let tiles = decompose(&IndexBox::from_extent(&[16, 16]), 4).unwrap();
        let owners = assign(&tiles, 3, AssignmentPolicy::RoundRobin).unwrap();
        for (i, w) in owners.iter().enumerate() {
            assert_eq!(w.0 as usize, i % 3);
        }
    }

    #[test]
    fn load_balanced_spreads_uneven_tiles() {
        let tiles = vec![
            IndexBox::new(&[0, 0], &[1, 0]).unwrap(),
            IndexBox::new(&[2, 0], &[9, 0]).unwrap(),
            IndexBox::new(&[10, 0], &[12, 0]).unwrap(),
            IndexBox::new(&[13, 0], &[17, 0]).unwrap(),
        ];
        let owners = assign(&tiles, 2, AssignmentPolicy::LoadBalanced).unwrap();
        // Sizes [2, 8, 3, 5]: 8 -> w0, 5 -> w1, 3 -> w1, then 2 breaks the
        // 8/8 tie toward w0.
        assert_eq!(
            owners,
            vec![WorkerId(0), WorkerId(0), WorkerId(1), WorkerId(1)]
        );
    }

    #[test]
    fn more_workers_than_tiles_leaves_some_idle() {
        let tiles = decompose(&IndexBox::from_extent(&[4, 4]), 4).unwrap();
        let owners = assign(&tiles, 8, AssignmentPolicy::LoadBalanced).unwrap();
        assert_eq!(owners, vec![WorkerId(0)]);
    }

    #[test]
    fn policy_parses_and_round_trips_tag() {
        for p in [AssignmentPolicy::RoundRobin, AssignmentPolicy::LoadBalanced] {
            assert_eq!(p.to_string().parse::<AssignmentPolicy>(), Ok(p));
            assert_eq!(AssignmentPolicy::from_tag(p.tag()), Some(p));
        }
        assert!("cyclic".parse::<AssignmentPolicy>().is_err());
        assert_eq!(AssignmentPolicy::from_tag(7), None);
    }
}
