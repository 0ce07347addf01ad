use std::fs;

use halo_checkpoint::{CheckpointError, CheckpointStore, HEADER_FILE};
use halo_core::Domain;
use halo_test_utils::{assert_interiors_bitwise_eq, layout, periodic_square, random_field};
use halo_tiling::{AssignmentPolicy, TileDecomposition};
use std::sync::Arc;

fn store() -> (tempfile::TempDir, CheckpointStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path(), "chk");
    (dir, store)
}

#[test]
fn write_read_roundtrip_is_exact() {
    let (_dir, store) = store();
    let domain = periodic_square(8);
    let field = random_field(layout(&domain, 4, 2), 2, 1, 11);

    let path = store.write(3, 0.0123, &field, &domain).unwrap();
    assert!(path.ends_with("chk00003"));

    let restored = store.read(3).unwrap();
    assert_eq!(restored.step, 3);
    assert_eq!(restored.time.to_bits(), 0.0123f64.to_bits());
    assert_eq!(restored.domain, domain);
    assert_eq!(restored.layout.boxes(), field.layout().boxes());
    assert_eq!(restored.layout.owners(), field.layout().owners());
    assert_eq!(restored.field.components(), 2);
    assert_interiors_bitwise_eq(&restored.field, &field);
}

#[test]
fn restored_ghosts_are_zero() {
    let (_dir, store) = store();
    let domain = periodic_square(8);
    let field = random_field(layout(&domain, 4, 1), 1, 1, 5);
    store.write(1, 0.0, &field, &domain).unwrap();
    let restored = store.read(1).unwrap();
    assert_eq!(restored.field.tile(0).at(&[-1, -1, 0], 0), 0.0);
}

#[test]
fn load_balanced_three_dimensional_roundtrip() {
    let (_dir, store) = store();
    let domain =
        Domain::new(&[6, 4, 5], &[0.0; 3], &[3.0, 2.0, 1.0], &[true, false, true]).unwrap();
    let layout = Arc::new(
        TileDecomposition::new(domain.index_box(), 3, 3, AssignmentPolicy::LoadBalanced).unwrap(),
    );
    let field = random_field(layout, 1, 2, 99);
    store.write(20, 1.5, &field, &domain).unwrap();
    let restored = store.read(20).unwrap();
    assert_eq!(restored.layout.policy(), AssignmentPolicy::LoadBalanced);
    assert_eq!(restored.layout.worker_count(), 3);
    assert_eq!(restored.field.ghost_width(), 2);
    assert_interiors_bitwise_eq(&restored.field, &field);
}

#[test]
fn step_zero_rejected() {
    let (_dir, store) = store();
    let domain = periodic_square(4);
    let field = random_field(layout(&domain, 4, 1), 1, 1, 0);
    assert!(matches!(
        store.write(0, 0.0, &field, &domain),
        Err(CheckpointError::InvalidStep { step: 0 })
    ));
}

#[test]
fn missing_checkpoint_is_not_found() {
    let (_dir, store) = store();
    assert!(matches!(
        store.read(7),
        Err(CheckpointError::NotFound { step: 7, .. })
    ));
}

#[test]
fn missing_tile_block_is_count_mismatch() {
    let (_dir, store) = store();
    let domain = periodic_square(8);
    let field = random_field(layout(&domain, 4, 2), 1, 1, 1);
    let path = store.write(2, 0.0, &field, &domain).unwrap();
    fs::remove_file(path.join("tile_00003.bin")).unwrap();
    assert!(matches!(
        store.read(2),
        Err(CheckpointError::TileCountMismatch {
            expected: 4,
            found: 3
        })
    ));
}

#[test]
fn truncated_tile_block_is_rejected() {
    let (_dir, store) = store();
    let domain = periodic_square(8);
    let field = random_field(layout(&domain, 4, 2), 1, 1, 1);
    let path = store.write(2, 0.0, &field, &domain).unwrap();
    let tile = path.join("tile_00001.bin");
    let bytes = fs::read(&tile).unwrap();
    fs::write(&tile, &bytes[..bytes.len() / 2]).unwrap();
    assert!(matches!(
        store.read(2),
        Err(CheckpointError::Truncated { tile: 1, .. })
    ));
}

#[test]
fn renamed_directory_is_step_mismatch() {
    let (dir, store) = store();
    let domain = periodic_square(4);
    let field = random_field(layout(&domain, 4, 1), 1, 1, 1);
    let path = store.write(5, 0.0, &field, &domain).unwrap();
    fs::rename(&path, dir.path().join("chk00006")).unwrap();
    assert!(matches!(
        store.read(6),
        Err(CheckpointError::StepMismatch {
            requested: 6,
            stored: 5
        })
    ));
}

#[test]
fn corrupt_header_is_rejected() {
    let (_dir, store) = store();
    let domain = periodic_square(4);
    let field = random_field(layout(&domain, 4, 1), 1, 1, 1);
    let path = store.write(1, 0.0, &field, &domain).unwrap();
    fs::write(path.join(HEADER_FILE), b"HCHK").unwrap();
    assert!(matches!(
        store.read(1),
        Err(CheckpointError::MalformedHeader { .. })
    ));
}

#[test]
fn rewrite_replaces_existing_checkpoint() {
    let (_dir, store) = store();
    let domain = periodic_square(8);
    let first = random_field(layout(&domain, 4, 2), 1, 1, 1);
    let second = random_field(layout(&domain, 4, 2), 1, 1, 2);
    store.write(4, 0.1, &first, &domain).unwrap();
    store.write(4, 0.2, &second, &domain).unwrap();
    let restored = store.read(4).unwrap();
    assert_eq!(restored.time, 0.2);
    assert_interiors_bitwise_eq(&restored.field, &second);
    assert_eq!(store.list_steps().unwrap(), vec![4]);
}

#[test]
fn list_and_latest() {
    let (dir, store) = store();
    assert_eq!(store.latest().unwrap(), None);
    let domain = periodic_square(4);
    let field = random_field(layout(&domain, 4, 1), 1, 1, 1);
    for step in [10, 2, 30] {
        store.write(step, step as f64, &field, &domain).unwrap();
    }
    // Directories that are not complete checkpoints are ignored.
    fs::create_dir(dir.path().join("chk00099")).unwrap();
    fs::create_dir(dir.path().join("plt00001")).unwrap();
    assert_eq!(store.list_steps().unwrap(), vec![2, 10, 30]);
    assert_eq!(store.latest().unwrap(), Some(30));
}

#[test]
fn missing_root_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = CheckpointStore::new(dir.path().join("absent"), "chk");
    assert_eq!(store.list_steps().unwrap(), Vec::<u64>::new());
}
