use super::{assert_jacobian_matches_fd, dvector, previous_deformation_gradient, previous_velocity_gradient};
use fenris_kinematics::mapping::{
    map_pk2_to_cauchy, pull_back_almansi_strain, pull_back_almansi_strain_with_jacobians, pull_back_cauchy_stress,
    pull_back_cauchy_stress_with_jacobians, pull_back_velocity_gradient, pull_back_velocity_gradient_with_jacobians,
    push_forward_green_lagrange_strain, push_forward_green_lagrange_strain_with_jacobians, push_forward_pk2_stress,
    push_forward_pk2_stress_with_jacobians, rotate_matrix,
};
use fenris_kinematics::measures::green_lagrange_strain;
use fenris_kinematics::proptest::{deformation_gradient, rotation3, symmetric_strain, tensor3};
use fenris_kinematics::ErrorKind;
use matrixcompare::assert_matrix_eq;
use proptest::prelude::*;

fn pk2_fixture_deformation_gradient() -> Vec<f64> {
    vec![
        1.96469186, -2.13860665, -2.73148546, 0.51314769, 2.1946897, -0.7689354, 4.80764198, 1.84829739, -0.19068099,
    ]
}

fn pk2_stress() -> Vec<f64> {
    vec![
        -1.07882482, -1.56821984, 2.29049707, -0.61427755, -4.40322103, -1.01955745, 2.37995406, -3.1750827, -3.24548244,
    ]
}

fn cauchy_stress() -> Vec<f64> {
    vec![
        -2.47696057, 0.48015011, -0.28838671, 0.16490963, -0.57481137, -0.92071407, -0.21450698, -1.22714923, -1.73532173,
    ]
}

#[test]
fn push_forward_pk2_stress_reference_values() {
    let F = pk2_fixture_deformation_gradient();
    let sigma = push_forward_pk2_stress(&pk2_stress(), &F).unwrap();
    assert_matrix_eq!(dvector(&sigma), dvector(&cauchy_stress()), comp = abs, tol = 1e-7);

    let sigma_alias = map_pk2_to_cauchy(&pk2_stress(), &F).unwrap();
    assert_eq!(sigma, sigma_alias);
}

#[test]
#[allow(non_snake_case)]
fn push_forward_pk2_stress_jacobians_match_finite_differences() {
    let F = pk2_fixture_deformation_gradient();
    let S = pk2_stress();
    let jacobians = push_forward_pk2_stress_with_jacobians(&S, &F).unwrap();
    assert_eq!(jacobians.mapped, push_forward_pk2_stress(&S, &F).unwrap());

    assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| push_forward_pk2_stress(x, &F), &S, 1e-7);
    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_deformation_gradient,
        |x| push_forward_pk2_stress(&S, x),
        &F,
        1e-7,
    );
}

#[test]
#[allow(non_snake_case)]
fn pull_back_cauchy_stress_inverts_push_forward() {
    let F = pk2_fixture_deformation_gradient();
    let S = pull_back_cauchy_stress(&cauchy_stress(), &F).unwrap();
    assert_matrix_eq!(dvector(&S), dvector(&pk2_stress()), comp = abs, tol = 1e-6);
}

#[test]
#[allow(non_snake_case)]
fn pull_back_cauchy_stress_jacobians_match_finite_differences() {
    let F = pk2_fixture_deformation_gradient();
    let sigma = cauchy_stress();
    let jacobians = pull_back_cauchy_stress_with_jacobians(&sigma, &F).unwrap();

    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_tensor,
        |x| pull_back_cauchy_stress(x, &F),
        &sigma,
        1e-7,
    );
    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_deformation_gradient,
        |x| pull_back_cauchy_stress(&sigma, x),
        &F,
        1e-7,
    );
}

#[test]
fn stress_mappings_reject_mismatched_shapes() {
    let error = push_forward_pk2_stress(&[1.0; 9], &[1.0; 4]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Shape);

    let error = pull_back_cauchy_stress(&[1.0; 4], &[1.0; 4]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Shape);

    let error = pull_back_cauchy_stress_with_jacobians(&[1.0; 9], &[1.0; 8]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Shape);
    assert_eq!(error.operation(), "pull_back_cauchy_stress_with_jacobians");
    assert_eq!(error.chain().count(), 2);
}

#[test]
fn stress_mappings_reject_singular_deformation_gradient() {
    // Rank deficient: the last row is the sum of the first two
    let F = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 7.0, 9.0];
    let error = push_forward_pk2_stress(&pk2_stress(), &F).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Domain);
    let error = pull_back_velocity_gradient_with_jacobians(&previous_velocity_gradient(), &F).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Domain);
}

#[test]
#[allow(non_snake_case)]
fn mapping_jacobians_wrap_a_single_base_error() {
    let F = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 7.0, 9.0];
    let tensor = pk2_stress();
    let errors = [
        push_forward_pk2_stress_with_jacobians(&tensor, &F).unwrap_err(),
        pull_back_cauchy_stress_with_jacobians(&tensor, &F).unwrap_err(),
        push_forward_green_lagrange_strain_with_jacobians(&tensor, &F).unwrap_err(),
        pull_back_velocity_gradient_with_jacobians(&tensor, &F).unwrap_err(),
    ];
    let operations: Vec<Vec<_>> = errors
        .iter()
        .map(|error| error.chain().map(|record| record.operation()).collect())
        .collect();
    assert_eq!(
        operations,
        vec![
            vec!["push_forward_pk2_stress_with_jacobians", "push_forward_pk2_stress"],
            vec!["pull_back_cauchy_stress_with_jacobians", "pull_back_cauchy_stress"],
            vec![
                "push_forward_green_lagrange_strain_with_jacobians",
                "push_forward_green_lagrange_strain"
            ],
            vec!["pull_back_velocity_gradient_with_jacobians", "pull_back_velocity_gradient"],
        ]
    );
    assert!(errors.iter().all(|error| error.kind() == ErrorKind::Domain));
}

fn almansi_fixture_deformation_gradient() -> Vec<f64> {
    vec![
        0.30027935, -0.72811411, 0.26475099, 1.2285819, 0.57663593, 1.43113814, -0.45871432, 0.2175795, 0.54013937,
    ]
}

#[test]
#[allow(non_snake_case)]
fn push_forward_green_lagrange_strain_reference_values() {
    let F = almansi_fixture_deformation_gradient();
    let E = green_lagrange_strain(&F).unwrap();
    let e = push_forward_green_lagrange_strain(&E, &F).unwrap();
    let expected = vec![
        -0.33393717, 0.0953188, -0.29053383, 0.0953188, 0.35345526, 0.11588247, -0.29053383, 0.11588247, -0.56150741,
    ];
    assert_matrix_eq!(dvector(&e), dvector(&expected), comp = abs, tol = 1e-7);

    let jacobians = push_forward_green_lagrange_strain_with_jacobians(&E, &F).unwrap();
    assert_eq!(jacobians.mapped, e);
    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_tensor,
        |x| push_forward_green_lagrange_strain(x, &F),
        &E,
        1e-7,
    );
    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_deformation_gradient,
        |x| push_forward_green_lagrange_strain(&E, x),
        &F,
        1e-7,
    );
}

#[test]
#[allow(non_snake_case)]
fn pull_back_almansi_strain_reference_values() {
    let F = vec![
        0.1740535, 1.2519364, -0.9531442, -0.7512021, -0.60229072, 0.32640812, -0.59754476, -0.06209685, -1.50856757,
    ];
    let e = vec![
        0.25045537, 0.48303426, 0.98555979, 0.51948512, 0.61289453, 0.12062867, 0.8263408, 0.60306013, 0.54506801,
    ];
    let E = pull_back_almansi_strain(&e, &F).unwrap();
    let expected = vec![
        0.55339061, -0.59325289, 0.92984685, -0.83130342, -0.25274097, -1.5877536, 1.67911302, -0.83554021, 3.47033811,
    ];
    assert_matrix_eq!(dvector(&E), dvector(&expected), comp = abs, tol = 1e-7);

    let jacobians = pull_back_almansi_strain_with_jacobians(&e, &F).unwrap();
    assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| pull_back_almansi_strain(x, &F), &e, 1e-7);
    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_deformation_gradient,
        |x| pull_back_almansi_strain(&e, x),
        &F,
        1e-7,
    );
}

#[test]
#[allow(non_snake_case)]
fn pull_back_velocity_gradient_reference_values() {
    let F = previous_deformation_gradient();
    let L = previous_velocity_gradient();
    let L_bar = pull_back_velocity_gradient(&L, &F).unwrap();
    let expected = vec![
        6.32482111, 3.11877752, 2.43195977, 20.19439192, 10.22175689, 7.88052809, -38.85113898, -18.79212468,
        -14.76285795,
    ];
    assert_matrix_eq!(dvector(&L_bar), dvector(&expected), comp = abs, tol = 1e-6);
}

#[test]
#[allow(non_snake_case)]
fn pull_back_velocity_gradient_jacobians_match_finite_differences() {
    // Note: F is badly conditioned, so the tangent with respect to F has entries of order 1e3
    let F = previous_deformation_gradient();
    let L = previous_velocity_gradient();
    let jacobians = pull_back_velocity_gradient_with_jacobians(&L, &F).unwrap();
    assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| pull_back_velocity_gradient(x, &F), &L, 1e-7);
    assert_jacobian_matches_fd(
        &jacobians.d_mapped_d_deformation_gradient,
        |x| pull_back_velocity_gradient(&L, x),
        &F,
        1e-6,
    );
}

#[test]
#[allow(non_snake_case)]
fn rotate_matrix_reference_values() {
    let Q = vec![
        -0.44956296, -0.88488713, -0.12193405, -0.37866166, 0.31242661, -0.87120891, 0.80901699, -0.3454915, -0.47552826,
    ];
    let A: Vec<f64> = (1..=9).map(f64::from).collect();
    let rotated = rotate_matrix(&A, &Q).unwrap();
    let expected = vec![
        -0.09485264, -3.38815017, -5.39748037, -1.09823916, 2.23262233, 4.68884658, -1.68701666, 6.92240128, 12.8622303,
    ];
    assert_matrix_eq!(dvector(&rotated), dvector(&expected), comp = abs, tol = 1e-6);

    // Rotating back with the transpose recovers the input tensor
    let Q_t = vec![Q[0], Q[3], Q[6], Q[1], Q[4], Q[7], Q[2], Q[5], Q[8]];
    let restored = rotate_matrix(&rotated, &Q_t).unwrap();
    assert_matrix_eq!(dvector(&restored), dvector(&A), comp = abs, tol = 1e-6);
}

#[test]
fn rotate_matrix_infers_dimension() {
    // Rotation by 90 degrees in 2D
    let Q = vec![0.0, -1.0, 1.0, 0.0];
    let rotated = rotate_matrix(&[1.0, 2.0, 3.0, 4.0], &Q).unwrap();
    assert_matrix_eq!(dvector(&rotated), dvector(&[4.0, -3.0, -2.0, 1.0]), comp = abs, tol = 1e-15);
}

#[test]
fn rotate_matrix_rejects_invalid_shapes() {
    let error = rotate_matrix(&[1.0; 9], &[1.0; 4]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Shape);
    let error = rotate_matrix(&[1.0; 8], &[1.0; 8]).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Shape);
}

proptest! {
    #[test]
    #[allow(non_snake_case)]
    fn almansi_round_trip(E in symmetric_strain(), F in deformation_gradient()) {
        let e = push_forward_green_lagrange_strain(&E, &F).unwrap();
        let E_restored = pull_back_almansi_strain(&e, &F).unwrap();
        prop_assert!(E.iter().zip(&E_restored).all(|(a, b)| (a - b).abs() <= 1e-12));
    }

    #[test]
    #[allow(non_snake_case)]
    fn stress_round_trip(S in tensor3(), F in deformation_gradient()) {
        let sigma = push_forward_pk2_stress(&S, &F).unwrap();
        let S_restored = pull_back_cauchy_stress(&sigma, &F).unwrap();
        prop_assert!(S.iter().zip(&S_restored).all(|(a, b)| (a - b).abs() <= 1e-12));
    }

    #[test]
    #[allow(non_snake_case)]
    fn velocity_gradient_pull_back_jacobians_are_consistent(L in tensor3(), F in deformation_gradient()) {
        let jacobians = pull_back_velocity_gradient_with_jacobians(&L, &F).unwrap();
        assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| pull_back_velocity_gradient(x, &F), &L, 1e-7);
        assert_jacobian_matches_fd(
            &jacobians.d_mapped_d_deformation_gradient,
            |x| pull_back_velocity_gradient(&L, x),
            &F,
            1e-7,
        );
    }

    #[test]
    #[allow(non_snake_case)]
    fn pk2_stress_push_forward_jacobians_are_consistent(S in tensor3(), F in deformation_gradient()) {
        let jacobians = push_forward_pk2_stress_with_jacobians(&S, &F).unwrap();
        assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| push_forward_pk2_stress(x, &F), &S, 1e-7);
        assert_jacobian_matches_fd(
            &jacobians.d_mapped_d_deformation_gradient,
            |x| push_forward_pk2_stress(&S, x),
            &F,
            1e-7,
        );
    }

    #[test]
    #[allow(non_snake_case)]
    fn cauchy_stress_pull_back_jacobians_are_consistent(sigma in tensor3(), F in deformation_gradient()) {
        let jacobians = pull_back_cauchy_stress_with_jacobians(&sigma, &F).unwrap();
        assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| pull_back_cauchy_stress(x, &F), &sigma, 1e-7);
        assert_jacobian_matches_fd(
            &jacobians.d_mapped_d_deformation_gradient,
            |x| pull_back_cauchy_stress(&sigma, x),
            &F,
            1e-7,
        );
    }

    #[test]
    #[allow(non_snake_case)]
    fn strain_push_forward_jacobians_are_consistent(E in symmetric_strain(), F in deformation_gradient()) {
        let jacobians = push_forward_green_lagrange_strain_with_jacobians(&E, &F).unwrap();
        assert_jacobian_matches_fd(
            &jacobians.d_mapped_d_tensor,
            |x| push_forward_green_lagrange_strain(x, &F),
            &E,
            1e-7,
        );
        assert_jacobian_matches_fd(
            &jacobians.d_mapped_d_deformation_gradient,
            |x| push_forward_green_lagrange_strain(&E, x),
            &F,
            1e-7,
        );
    }

    #[test]
    #[allow(non_snake_case)]
    fn strain_pull_back_jacobians_are_consistent(e in symmetric_strain(), F in deformation_gradient()) {
        let jacobians = pull_back_almansi_strain_with_jacobians(&e, &F).unwrap();
        assert_jacobian_matches_fd(&jacobians.d_mapped_d_tensor, |x| pull_back_almansi_strain(x, &F), &e, 1e-7);
        assert_jacobian_matches_fd(
            &jacobians.d_mapped_d_deformation_gradient,
            |x| pull_back_almansi_strain(&e, x),
            &F,
            1e-7,
        );
    }

    #[test]
    #[allow(non_snake_case)]
    fn rotation_preserves_trace(A in tensor3(), Q in rotation3()) {
        let rotated = rotate_matrix(&A, &Q).unwrap();
        let trace = |t: &[f64]| t[0] + t[4] + t[8];
        prop_assert!((trace(&A) - trace(&rotated)).abs() <= 1e-12);
    }
}
