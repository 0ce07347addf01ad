//! Per-tile execution backends.

use std::collections::BTreeMap;

use halo_core::{IndexBox, IntVect};
use halo_tiling::{TileDecomposition, WorkerId};
use rayon::prelude::*;

/// How per-tile work is scheduled.
///
/// `Parallel` runs each worker's tile set as one rayon task, so a tile is
/// only ever touched by its owning worker. `Serial` walks tiles in
/// decomposition order on the calling thread. Per-tile arithmetic does not
/// depend on the schedule, so both produce bit-identical fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    /// Tiles in order on the current thread.
    Serial,
    /// One rayon task per worker.
    #[default]
    Parallel,
}

impl Execution {
    /// From the `parallel` flag of a run configuration.
    pub fn from_flag(parallel: bool) -> Self {
        if parallel {
            Self::Parallel
        } else {
            Self::Serial
        }
    }

    /// Run `f(tile, &mut items[tile])` for every tile.
    ///
    /// `items` must hold one entry per tile of `layout`.
    pub fn for_each_tile<T, F>(self, layout: &TileDecomposition, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync,
    {
        debug_assert_eq!(items.len(), layout.len());
        match self {
            Self::Serial => {
                for (i, item) in items.iter_mut().enumerate() {
                    f(i, item);
                }
            }
            Self::Parallel => {
                let mut buckets: BTreeMap<WorkerId, Vec<(usize, &mut T)>> = BTreeMap::new();
                for (i, item) in items.iter_mut().enumerate() {
                    buckets.entry(layout.owner(i)).or_default().push((i, item));
                }
                let buckets: Vec<_> = buckets.into_values().collect();
                buckets.into_par_iter().for_each(|bucket| {
                    for (i, item) in bucket {
                        f(i, item);
                    }
                });
            }
        }
    }

    /// Compute `f(tile)` for every tile, returning results in tile order.
    pub fn map_tiles<R, F>(self, layout: &TileDecomposition, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Sync,
    {
        match self {
            Self::Serial => (0..layout.len()).map(f).collect(),
            Self::Parallel => {
                let buckets: Vec<Vec<usize>> = owner_buckets(layout).into_values().collect();
                let f = &f;
                let mut tagged: Vec<(usize, R)> = buckets
                    .into_par_iter()
                    .flat_map_iter(|tiles| tiles.into_iter().map(move |t| (t, f(t))))
                    .collect();
                tagged.sort_by_key(|(t, _)| *t);
                tagged.into_iter().map(|(_, r)| r).collect()
            }
        }
    }
}

/// Tiles grouped by owner, one pass over the owner list. Workers that own
/// no tile get no bucket.
fn owner_buckets(layout: &TileDecomposition) -> BTreeMap<WorkerId, Vec<usize>> {
    let mut buckets: BTreeMap<WorkerId, Vec<usize>> = BTreeMap::new();
    for (tile, owner) in layout.owners().iter().enumerate() {
        buckets.entry(*owner).or_default().push(tile);
    }
    buckets
}

/// Call `f` on every cell of `bx`, x fastest.
pub fn for_each_cell<F: FnMut(IntVect)>(bx: &IndexBox, mut f: F) {
    for p in bx.cells() {
        f(p);
    }
}
