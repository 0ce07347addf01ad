use std::sync::Arc;

use halo_core::{Domain, IntVect};
use halo_field::{exchange, DistributedField, Execution, ExchangePlan, FieldError};
use halo_stencil::{advance, HeatStencil, StencilError};
use halo_tiling::{AssignmentPolicy, TileDecomposition};
use proptest::prelude::*;

fn fields(domain: &Domain, max: u32, ghost: u32) -> (DistributedField, DistributedField) {
    let layout = Arc::new(
        TileDecomposition::new(domain.index_box(), max, 2, AssignmentPolicy::RoundRobin).unwrap(),
    );
    let old = DistributedField::allocate(Arc::clone(&layout), 1, ghost).unwrap();
    let new = DistributedField::allocate(layout, 1, ghost).unwrap();
    (old, new)
}

fn bump(p: &IntVect, _comp: usize) -> f64 {
    let x = f64::from(p[0]);
    let y = f64::from(p[1]);
    (x * 0.37).sin() + (y * 0.91).cos() + f64::from(p[2])
}

fn step(
    domain: &Domain,
    max: u32,
    exec: Execution,
    init: fn(&IntVect, usize) -> f64,
) -> DistributedField {
    let (mut old, mut new) = fields(domain, max, 1);
    old.fill_interior(init);
    let layout = Arc::clone(old.layout());
    exchange(&mut old, &layout, domain).unwrap();
    advance(&HeatStencil::new(1e-4), &old, &mut new, domain, exec).unwrap();
    new
}

#[test]
fn constant_field_is_a_fixed_point() {
    let domain = Domain::unit(&[8, 8]).unwrap();
    let new = step(&domain, 4, Execution::Parallel, |_, _| 2.5);
    for t in new.tiles() {
        for p in t.valid_box().cells() {
            assert_eq!(t.at(&p, 0), 2.5);
        }
    }
}

#[test]
fn periodic_step_conserves_total() {
    let domain = Domain::unit(&[8, 8]).unwrap();
    let (mut old, mut new) = fields(&domain, 4, 1);
    old.fill_interior(|p, _| if p[0] == 4 && p[1] == 4 { 1.0 } else { 0.0 });
    let plan = ExchangePlan::build(old.layout(), &domain, 1).unwrap();
    plan.execute(&mut old, Execution::Serial).unwrap();
    advance(&HeatStencil::new(1e-3), &old, &mut new, &domain, Execution::Serial).unwrap();
    assert!((new.sum(0) - old.sum(0)).abs() < 1e-12);
    assert!(new.interior_value(&[4, 4, 0], 0).unwrap() < 1.0);
    assert!(new.interior_value(&[3, 4, 0], 0).unwrap() > 0.0);
}

#[test]
fn three_dimensional_constant_fixed_point() {
    let domain = Domain::unit(&[4, 4, 4]).unwrap();
    let new = step(&domain, 2, Execution::Serial, |_, _| -1.25);
    assert_eq!(new.min(0), -1.25);
    assert_eq!(new.max(0), -1.25);
}

#[test]
fn narrow_ghost_rejected() {
    let domain = Domain::unit(&[8, 8]).unwrap();
    let (old, mut new) = fields(&domain, 4, 0);
    let err = advance(&HeatStencil::new(0.1), &old, &mut new, &domain, Execution::Serial)
        .unwrap_err();
    assert_eq!(
        err,
        StencilError::GhostTooNarrow {
            stencil: "heat".into(),
            required: 1,
            actual: 0
        }
    );
}

#[test]
fn mismatched_fields_rejected() {
    let domain = Domain::unit(&[8, 8]).unwrap();
    let (old, _) = fields(&domain, 4, 1);
    let (_, mut new) = fields(&domain, 2, 1);
    assert!(matches!(
        advance(&HeatStencil::new(0.1), &old, &mut new, &domain, Execution::Serial),
        Err(StencilError::Field(_))
    ));
}

#[test]
fn domain_of_other_shape_rejected() {
    let flat = Domain::unit(&[4, 4]).unwrap();
    let cube = Domain::unit(&[4, 4, 4]).unwrap();
    let (old, mut new) = fields(&flat, 4, 1);
    assert!(matches!(
        advance(&HeatStencil::new(1e-3), &old, &mut new, &cube, Execution::Serial),
        Err(StencilError::Field(FieldError::ShapeMismatch { .. }))
    ));
    let wider = Domain::unit(&[8, 4]).unwrap();
    assert!(advance(&HeatStencil::new(1e-3), &old, &mut new, &wider, Execution::Serial).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn result_independent_of_tiling_and_backend(
        n in 4u32..14,
        max in 1u32..8,
        parallel in any::<bool>(),
    ) {
        let domain = Domain::unit(&[n, n]).unwrap();
        let reference = step(&domain, n, Execution::Serial, bump);
        let tiled = step(&domain, max, Execution::from_flag(parallel), bump);
        for p in domain.index_box().cells() {
            prop_assert_eq!(
                reference.interior_value(&p, 0).map(f64::to_bits),
                tiled.interior_value(&p, 0).map(f64::to_bits)
            );
        }
    }
}
