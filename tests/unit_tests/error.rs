use super::previous_deformation_gradient;
use fenris_kinematics::evolution::{evolve_f_with_jacobians, EvolutionMode};
use fenris_kinematics::{ErrorKind, KinematicsError};
use std::error::Error;

fn singular_evolution_error() -> KinematicsError {
    let identity = vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    evolve_f_with_jacobians(
        1.0,
        &previous_deformation_gradient(),
        &identity,
        &identity,
        0.0,
        EvolutionMode::Current,
    )
    .unwrap_err()
}

#[test]
fn wrapped_error_keeps_kind_of_root_cause() {
    let error = KinematicsError::parameter("inner", "alpha is out of range")
        .wrap("middle", "failed in the middle")
        .wrap("outer", "failed on the outside");
    assert_eq!(error.kind(), ErrorKind::Parameter);
    assert_eq!(error.operation(), "outer");
    assert_eq!(error.message(), "failed on the outside");

    let operations: Vec<_> = error.chain().map(|record| record.operation()).collect();
    assert_eq!(operations, vec!["outer", "middle", "inner"]);
    assert_eq!(error.root_cause().message(), "alpha is out of range");
    assert_eq!(error.cause().unwrap().operation(), "middle");
}

#[test]
fn unwrapped_error_is_its_own_root_cause() {
    let error = KinematicsError::shape("infer_dimension", "a tensor of length 3 is not square");
    assert!(error.cause().is_none());
    assert!(error.source().is_none());
    assert_eq!(error.chain().count(), 1);
    assert_eq!(error.root_cause(), &error);
}

#[test]
fn error_display() {
    let error = singular_evolution_error();
    insta::assert_snapshot!(error.to_string(), @"evolve_f_with_jacobians: failed to evolve the deformation gradient");
    assert_eq!(
        format!("{error:#}"),
        "evolve_f_with_jacobians: failed to evolve the deformation gradient\n  \
         caused by evolve_f: I - dt (1 - alpha) L is singular"
    );
    insta::assert_snapshot!(ErrorKind::Domain.to_string(), @"domain error");
}

#[test]
fn error_source_follows_chain() {
    let error = singular_evolution_error();
    assert_eq!(error.kind(), ErrorKind::Domain);
    let source = error.source().unwrap();
    assert_eq!(source.to_string(), "evolve_f: I - dt (1 - alpha) L is singular");
    assert!(source.source().is_none());
}

#[test]
fn error_converts_into_eyre_report() {
    let result: eyre::Result<()> = Err(singular_evolution_error().into());
    let report = result.unwrap_err();
    assert_eq!(report.chain().count(), 2);
    assert_eq!(report.root_cause().to_string(), "evolve_f: I - dt (1 - alpha) L is singular");
    let error = report.downcast_ref::<KinematicsError>().unwrap();
    assert_eq!(error.operation(), "evolve_f_with_jacobians");
}
