//! Integration tests for the inverse-depth reprojection factors.
//!
//! These exercise the end-to-end evaluation path an optimizer sees: residuals
//! generated from known geometry, numerical Jacobians checked against
//! observed residual changes under tangent-space perturbations, the
//! degenerate-projection fallback, and the serialization of a factor's fixed
//! fields.

// Allow expect() in test code
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use invdepth_factors::camera::{Calibration, PinholeCamera};
use invdepth_factors::factors::{Factor, InverseDepthFactor, TwoViewInverseDepthFactor};
use invdepth_factors::landmark::InvDepthLandmark;
use invdepth_factors::manifold::se3::SE3;
use invdepth_factors::manifold::Manifold;
use nalgebra::{DMatrix, DVector, Vector2};
use std::sync::Arc;

fn vga_calibration() -> Arc<Calibration> {
    Arc::new(Calibration::new(520.0, 520.0, 0.0, 320.0, 240.0))
}

/// Observed change of the residual under a retraction of one variable must
/// match the change predicted by the corresponding Jacobian column block.
fn assert_jacobian_predicts<F>(jacobian: &DMatrix<f64>, delta: &DVector<f64>, observed: F)
where
    F: Fn(&DVector<f64>) -> Vector2<f64>,
{
    let baseline = observed(&DVector::zeros(delta.len()));
    let perturbed = observed(delta);
    let actual_change = perturbed - baseline;
    let predicted_change = jacobian * delta;
    let diff = (Vector2::new(predicted_change[0], predicted_change[1]) - actual_change).norm();
    let scale = actual_change.norm().max(1.0);
    assert!(
        diff < 1e-4 * scale,
        "Jacobian prediction off: predicted {:?}, observed {:?}",
        predicted_change,
        actual_change
    );
}

#[test]
fn residual_matches_generated_measurement() {
    let calibration = vga_calibration();
    let pose = SE3::from_translation_euler(0.3, -0.1, 0.2, 0.02, -0.04, 0.06);
    let landmark = InvDepthLandmark::new(0.15, -0.08, 0.35);

    let world_point = landmark.world_point(&pose);
    let measured = PinholeCamera::new(pose.clone(), Arc::clone(&calibration))
        .project(&world_point)
        .expect("landmark is in front of the camera");

    let factor = InverseDepthFactor::new(0, 1, measured, calibration);
    let residual = factor.residual(&pose, &landmark);
    assert!(residual.norm() < 1e-9, "residual = {residual}");
}

#[test]
fn evaluation_is_idempotent() {
    let calibration = vga_calibration();
    let factor = InverseDepthFactor::new(0, 1, Vector2::new(310.0, 250.0), calibration);
    let pose = SE3::from_translation_euler(0.1, 0.0, -0.3, 0.0, 0.1, -0.05);
    let landmark = InvDepthLandmark::new(0.05, 0.1, 0.6);

    let mut jac_a = DMatrix::zeros(0, 0);
    let mut jac_b = DMatrix::zeros(0, 0);
    let first = factor.evaluate(&pose, &landmark, Some(&mut jac_a), None);
    let second = factor.evaluate(&pose, &landmark, Some(&mut jac_b), None);

    assert_eq!(first, second);
    assert_eq!(jac_a, jac_b);
}

#[test]
fn unit_calibration_identity_scenario() {
    // Reference pose = identity, landmark (theta=0, phi=0, rho=1) sits at
    // (0, 0, 1); with unit focal lengths and zero principal point the
    // projection is (0, 0), so a (0, 0) measurement gives a zero residual.
    let calibration = Arc::new(Calibration::new(1.0, 1.0, 0.0, 0.0, 0.0));
    let factor = InverseDepthFactor::new(0, 1, Vector2::zeros(), calibration);

    let residual = factor.residual(&SE3::identity(), &InvDepthLandmark::new(0.0, 0.0, 1.0));
    assert!(residual.norm() < 1e-12, "residual = {residual}");
}

#[test]
fn one_view_jacobians_predict_residual_change() {
    let calibration = vga_calibration();
    let pose = SE3::from_translation_euler(0.2, -0.1, 0.1, 0.03, 0.02, -0.01);
    let landmark = InvDepthLandmark::new(0.1, 0.05, 0.4);
    let factor = InverseDepthFactor::new(0, 1, Vector2::new(300.0, 220.0), calibration);

    let mut jac_pose = DMatrix::zeros(0, 0);
    let mut jac_landmark = DMatrix::zeros(0, 0);
    factor.evaluate(
        &pose,
        &landmark,
        Some(&mut jac_pose),
        Some(&mut jac_landmark),
    );

    let mut pose_delta = DVector::zeros(6);
    pose_delta[1] = 1e-5;
    pose_delta[4] = -1e-5;
    assert_jacobian_predicts(&jac_pose, &pose_delta, |d| {
        factor.residual(&pose.retract(d), &landmark)
    });

    let mut landmark_delta = DVector::zeros(3);
    landmark_delta[0] = 1e-5;
    landmark_delta[2] = 1e-5;
    assert_jacobian_predicts(&jac_landmark, &landmark_delta, |d| {
        factor.residual(&pose, &landmark.retract(d))
    });
}

#[test]
fn two_view_jacobians_predict_residual_change() {
    let calibration = vga_calibration();
    let reference = SE3::from_translation_euler(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    let observer = SE3::from_translation_euler(0.4, 0.1, -0.3, -0.02, 0.05, 0.01);
    let landmark = InvDepthLandmark::new(0.12, -0.04, 0.5);
    let factor = TwoViewInverseDepthFactor::new(0, 1, 2, Vector2::new(315.0, 245.0), calibration);

    let mut jac_reference = DMatrix::zeros(0, 0);
    let mut jac_observer = DMatrix::zeros(0, 0);
    let mut jac_landmark = DMatrix::zeros(0, 0);
    factor.evaluate(
        &reference,
        &observer,
        &landmark,
        Some(&mut jac_reference),
        Some(&mut jac_observer),
        Some(&mut jac_landmark),
    );

    let mut delta = DVector::zeros(6);
    delta[0] = 1e-5;
    delta[5] = 1e-5;
    assert_jacobian_predicts(&jac_reference, &delta, |d| {
        factor.residual(&reference.retract(d), &observer, &landmark)
    });
    assert_jacobian_predicts(&jac_observer, &delta, |d| {
        factor.residual(&reference, &observer.retract(d), &landmark)
    });

    let mut landmark_delta = DVector::zeros(3);
    landmark_delta[1] = 1e-5;
    assert_jacobian_predicts(&jac_landmark, &landmark_delta, |d| {
        factor.residual(&reference, &observer, &landmark.retract(d))
    });
}

#[test]
fn jacobians_predict_residual_change_over_sampled_poses() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let calibration = vga_calibration();
    let factor = InverseDepthFactor::new(0, 1, Vector2::new(300.0, 220.0), calibration);

    // Fixed seed keeps the draws reproducible across runs. The landmark is
    // expressed in the pose's own frame, so a positive inverse depth with
    // small bearing angles stays in front of the camera for any pose.
    let mut rng = StdRng::seed_from_u64(0x1d_fac);
    for _ in 0..8 {
        let pose = SE3::sample(&mut rng);
        let landmark = InvDepthLandmark::new(
            rng.random_range(-0.3..0.3),
            rng.random_range(-0.3..0.3),
            rng.random_range(0.2..1.0),
        );

        let mut jac_pose = DMatrix::zeros(0, 0);
        let mut jac_landmark = DMatrix::zeros(0, 0);
        factor.evaluate(
            &pose,
            &landmark,
            Some(&mut jac_pose),
            Some(&mut jac_landmark),
        );

        let mut pose_delta = DVector::zeros(6);
        pose_delta[2] = 1e-5;
        pose_delta[3] = -1e-5;
        assert_jacobian_predicts(&jac_pose, &pose_delta, |d| {
            factor.residual(&pose.retract(d), &landmark)
        });

        let mut landmark_delta = DVector::zeros(3);
        landmark_delta[0] = -1e-5;
        landmark_delta[2] = 1e-5;
        assert_jacobian_predicts(&jac_landmark, &landmark_delta, |d| {
            factor.residual(&pose, &landmark.retract(d))
        });
    }
}

#[test]
fn degenerate_projection_yields_fixed_residual() {
    let calibration = vga_calibration();
    let fallback = Vector2::repeat(2.0 * calibration.fx);

    // One-view variant: negative inverse depth places the point behind the
    // camera that parameterizes it.
    let one_view = InverseDepthFactor::new(0, 1, Vector2::zeros(), Arc::clone(&calibration));
    let residual = one_view.residual(&SE3::identity(), &InvDepthLandmark::new(0.0, 0.0, -0.5));
    assert_eq!(residual, fallback);

    // Two-view variant: the observer moves past the landmark along the
    // optical axis, so the world point falls behind it.
    let two_view =
        TwoViewInverseDepthFactor::new(0, 1, 2, Vector2::zeros(), Arc::clone(&calibration));
    let observer = SE3::from_translation_euler(0.0, 0.0, 3.0, 0.0, 0.0, 0.0);
    let residual = two_view.residual(
        &SE3::identity(),
        &observer,
        &InvDepthLandmark::new(0.0, 0.0, 1.0),
    );
    assert_eq!(residual, fallback);
}

#[test]
fn degenerate_projection_does_not_disturb_linearization_contract() {
    let calibration = vga_calibration();
    let factor = InverseDepthFactor::new(0, 1, Vector2::zeros(), calibration);

    let params = vec![
        SE3::identity().to_vector(),
        DVector::from_vec(vec![0.0, 0.0, -0.5]),
    ];
    let lin = factor
        .linearize(&params, &[true, true])
        .expect("degenerate geometry is not an error");

    assert_eq!(lin.residual.len(), 2);
    let jac = lin.jacobians[0].as_ref().expect("requested Jacobian");
    assert_eq!((jac.nrows(), jac.ncols()), (2, 6));
}

#[test]
fn factor_serialization_roundtrip() {
    let calibration = vga_calibration();
    let factor =
        TwoViewInverseDepthFactor::new(3, 5, 9, Vector2::new(101.5, 202.25), calibration);

    let encoded = serde_json::to_string(&factor).expect("serialization succeeds");
    let decoded: TwoViewInverseDepthFactor =
        serde_json::from_str(&encoded).expect("deserialization succeeds");

    assert!(factor.equals(&decoded, 1e-12));
    assert_eq!(factor.keys(), decoded.keys());
}

#[test]
fn equality_distinguishes_every_field() {
    let calibration = vga_calibration();
    let base = InverseDepthFactor::new(1, 2, Vector2::new(100.0, 200.0), Arc::clone(&calibration));
    let same = InverseDepthFactor::new(1, 2, Vector2::new(100.0, 200.0), Arc::clone(&calibration));
    assert!(base.equals(&same, 1e-9));

    let other_keys =
        InverseDepthFactor::new(2, 1, Vector2::new(100.0, 200.0), Arc::clone(&calibration));
    assert!(!base.equals(&other_keys, 1e-9));

    let other_measurement =
        InverseDepthFactor::new(1, 2, Vector2::new(100.1, 200.0), Arc::clone(&calibration));
    assert!(!base.equals(&other_measurement, 1e-9));

    let other_calibration = InverseDepthFactor::new(
        1,
        2,
        Vector2::new(100.0, 200.0),
        Arc::new(Calibration::new(520.0, 520.0, 0.0, 321.0, 240.0)),
    );
    assert!(!base.equals(&other_calibration, 1e-9));
}

#[test]
fn shared_calibration_across_factors() {
    let calibration = vga_calibration();
    let factors: Vec<InverseDepthFactor> = (0..4)
        .map(|i| {
            InverseDepthFactor::new(
                i,
                10 + i,
                Vector2::new(300.0 + i as f64, 200.0),
                Arc::clone(&calibration),
            )
        })
        .collect();

    // Strong count: local handle plus one per factor.
    assert_eq!(Arc::strong_count(&calibration), 5);
    for factor in &factors {
        assert!(Arc::ptr_eq(factor.calibration(), &calibration));
    }
}
