//! Directory-backed checkpoint store.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use halo_core::Domain;
use halo_field::{DistributedField, FieldError};
use halo_tiling::TileDecomposition;
use tracing::{debug, info, warn};

use crate::codec::{decode_header, decode_tile, encode_header, encode_tile};
use crate::error::CheckpointError;
use crate::types::CheckpointHeader;
use crate::HEADER_FILE;

/// Checkpoints of one run, one directory per step under a root directory.
///
/// # Examples
///
/// ```
/// use halo_checkpoint::CheckpointStore;
///
/// let store = CheckpointStore::new("/tmp/run", "chk");
/// assert!(store.path_for(10).ends_with("chk00010"));
/// assert!(store.path_for(123456).ends_with("chk123456"));
/// ```
#[derive(Clone, Debug)]
pub struct CheckpointStore {
    root: PathBuf,
    prefix: String,
}

/// A field restored from a checkpoint, ready to resume from.
#[derive(Clone, Debug)]
pub struct Restored {
    /// Step the checkpoint was taken after.
    pub step: u64,
    /// Simulation time at that step.
    pub time: f64,
    /// The stored domain.
    pub domain: Domain,
    /// The stored tiles, in stored order, assigned as the writing run did.
    pub layout: Arc<TileDecomposition>,
    /// Interior values restored; ghosts are zero.
    pub field: DistributedField,
}

fn tile_file(tile: usize) -> String {
    format!("tile_{tile:05}.bin")
}

fn is_tile_file(name: &str) -> bool {
    name.starts_with("tile_") && name.ends_with(".bin")
}

impl CheckpointStore {
    /// A store rooted at `root`, naming step directories `<prefix><step:05>`.
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Directory holding every checkpoint.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Step directory name prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Directory of the checkpoint for `step`.
    pub fn path_for(&self, step: u64) -> PathBuf {
        self.root.join(format!("{}{step:05}", self.prefix))
    }

    /// Write `field` as the checkpoint for `step` at simulation time `time`.
    ///
    /// The checkpoint is staged in a hidden sibling directory and renamed
    /// into place, so a crash never leaves a half-written checkpoint under
    /// the final name. An existing checkpoint for the same step is replaced.
    pub fn write(
        &self,
        step: u64,
        time: f64,
        field: &DistributedField,
        domain: &Domain,
    ) -> Result<PathBuf, CheckpointError> {
        if step == 0 {
            return Err(CheckpointError::InvalidStep { step });
        }
        let layout = field.layout();
        if layout.domain_box() != domain.index_box() {
            return Err(FieldError::ShapeMismatch {
                reason: format!(
                    "field covers {} but domain is {}",
                    layout.domain_box(),
                    domain.index_box()
                ),
            }
            .into());
        }

        let header = CheckpointHeader {
            step,
            time,
            domain: domain.clone(),
            components: field.components() as u32,
            ghost: field.ghost_width(),
            worker_count: layout.worker_count() as u32,
            policy: layout.policy(),
            tiles: layout.boxes().to_vec(),
        };

        let target = self.path_for(step);
        let name = format!("{}{step:05}", self.prefix);
        let staging = self.root.join(format!(".{name}.tmp"));
        fs::create_dir_all(&self.root).map_err(|e| CheckpointError::from(e).at(&self.root))?;
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| CheckpointError::from(e).at(&staging))?;
        }
        fs::create_dir(&staging).map_err(|e| CheckpointError::from(e).at(&staging))?;

        let path = staging.join(HEADER_FILE);
        write_file(&path, |w| encode_header(w, &header))?;
        for (i, tile) in field.tiles().iter().enumerate() {
            let path = staging.join(tile_file(i));
            let values = tile.interior_to_vec();
            write_file(&path, |w| encode_tile(w, i as u32, &values))?;
        }

        if target.exists() {
            let retired = self.root.join(format!(".{name}.old"));
            replace_dir(&staging, &target, &retired)?;
        } else {
            fs::rename(&staging, &target).map_err(|e| CheckpointError::from(e).at(&target))?;
        }

        info!(
            step,
            time,
            tiles = header.tiles.len(),
            path = %target.display(),
            "wrote checkpoint"
        );
        Ok(target)
    }

    /// Read only the header of the checkpoint for `step`.
    pub fn read_header(&self, step: u64) -> Result<CheckpointHeader, CheckpointError> {
        let dir = self.path_for(step);
        let path = dir.join(HEADER_FILE);
        if !path.is_file() {
            return Err(CheckpointError::NotFound { step, path: dir });
        }
        let file = File::open(&path).map_err(|e| CheckpointError::from(e).at(&path))?;
        let header =
            decode_header(&mut BufReader::new(file)).map_err(|e| e.at(&path))?;
        if header.step != step {
            return Err(CheckpointError::StepMismatch {
                requested: step,
                stored: header.step,
            });
        }
        Ok(header)
    }

    /// Restore the checkpoint for `step`: domain, exact tile list, time and
    /// every interior value.
    pub fn read(&self, step: u64) -> Result<Restored, CheckpointError> {
        let header = self.read_header(step)?;
        let dir = self.path_for(step);

        let found = fs::read_dir(&dir)
            .map_err(|e| CheckpointError::from(e).at(&dir))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_str().is_some_and(is_tile_file))
            .count();
        if found != header.tiles.len() {
            return Err(CheckpointError::TileCountMismatch {
                expected: header.tiles.len(),
                found,
            });
        }

        let layout = Arc::new(TileDecomposition::from_boxes(
            header.domain.index_box(),
            header.tiles.clone(),
            header.worker_count as usize,
            header.policy,
        )?);
        let mut field = DistributedField::allocate(
            Arc::clone(&layout),
            header.components as usize,
            header.ghost,
        )?;

        for tile in 0..header.tiles.len() {
            let path = dir.join(tile_file(tile));
            let file = File::open(&path).map_err(|e| CheckpointError::from(e).at(&path))?;
            let expected = field.tile(tile).interior_len();
            let block = decode_tile(&mut BufReader::new(file), tile, expected)
                .map_err(|e| e.at(&path))?;
            field.load_interior(tile, &block.values)?;
        }

        debug!(step, tiles = header.tiles.len(), "read checkpoint");
        Ok(Restored {
            step: header.step,
            time: header.time,
            domain: header.domain,
            layout,
            field,
        })
    }

    /// Steps of every complete checkpoint in the store, ascending.
    ///
    /// A missing root directory holds no checkpoints.
    pub fn list_steps(&self) -> Result<Vec<u64>, CheckpointError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CheckpointError::from(e).at(&self.root)),
        };
        let mut steps: Vec<u64> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let digits = name.to_str()?.strip_prefix(self.prefix.as_str())?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                let step = digits.parse::<u64>().ok()?;
                entry.path().join(HEADER_FILE).is_file().then_some(step)
            })
            .collect();
        steps.sort_unstable();
        Ok(steps)
    }

    /// The most recent complete checkpoint, if any.
    pub fn latest(&self) -> Result<Option<u64>, CheckpointError> {
        Ok(self.list_steps()?.last().copied())
    }
}

/// Move `staging` over the existing `target`, parking the old contents at
/// `retired` meanwhile. If `staging` cannot be moved in, the old target is
/// put back before the error is returned.
fn replace_dir(staging: &Path, target: &Path, retired: &Path) -> Result<(), CheckpointError> {
    if retired.exists() {
        fs::remove_dir_all(retired).map_err(|e| CheckpointError::from(e).at(retired))?;
    }
    fs::rename(target, retired).map_err(|e| CheckpointError::from(e).at(target))?;
    if let Err(e) = fs::rename(staging, target) {
        if let Err(restore) = fs::rename(retired, target) {
            warn!(
                path = %target.display(),
                error = %restore,
                "could not restore previous checkpoint"
            );
        }
        return Err(CheckpointError::from(e).at(target));
    }
    fs::remove_dir_all(retired).map_err(|e| CheckpointError::from(e).at(retired))?;
    Ok(())
}

fn write_file<F>(path: &Path, encode: F) -> Result<(), CheckpointError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), CheckpointError>,
{
    let file = File::create(path).map_err(|e| CheckpointError::from(e).at(path))?;
    let mut w = BufWriter::new(file);
    encode(&mut w).map_err(|e| e.at(path))?;
    let file = w
        .into_inner()
        .map_err(|e| CheckpointError::from(e.into_error()).at(path))?;
    file.sync_all().map_err(|e| CheckpointError::from(e).at(path))?;
    Ok(())
}
