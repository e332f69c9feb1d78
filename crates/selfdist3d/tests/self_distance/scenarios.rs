use crate::{ball_and_box, coarse_params};
use selfdist3d::kinematics::{
    AllowList, AllowedCollision, AllowedCollisionMatrix, Joint, KinematicTree,
};
use selfdist3d::math::{Isometry, Vector};
use selfdist3d::self_distance::{
    DistanceRequest, FieldParams, SelfDistanceEngine, SelfDistanceError,
};
use selfdist3d::shape::{CollisionShape, PartShape};

#[test]
fn active_ball_is_measured_against_static_box() {
    let tree = ball_and_box();
    let engine = SelfDistanceEngine::new(&tree, None, coarse_params()).unwrap();

    assert_eq!(engine.static_fields().len(), 1);
    assert_eq!(engine.active_fields().len(), 1);
    assert!(engine.dynamic_fields().is_empty());

    let result = engine
        .distance_self(&tree, &DistanceRequest::new("arm", true))
        .unwrap();
    let min = result.minimum().unwrap();

    assert_eq!(min.part, "A");
    assert_eq!(min.nearest_part.as_deref(), Some("B"));
    // 2.0 (center distance) - 0.1 (ball radius) - 1.0 (box half-extent).
    assert_relative_eq!(min.distance, 0.9, epsilon = 0.1);
    assert!(min.has_gradient);
    assert_relative_eq!(min.gradient.norm(), 1.0, epsilon = 1.0e-5);
    assert!(min.gradient.x < -0.9);
}

#[test]
fn always_allowed_pair_is_not_queried() {
    let tree = ball_and_box();
    let mut acm = AllowedCollisionMatrix::new();
    acm.set_entry("A", "B", AllowedCollision::Always);

    let engine = SelfDistanceEngine::new(&tree, Some(&acm), coarse_params()).unwrap();
    assert!(engine.query_plan("A").unwrap().is_empty());

    let result = engine
        .distance_self(&tree, &DistanceRequest::new("arm", true))
        .unwrap();
    let a = result.get("A").unwrap();

    assert_eq!(a.distance, coarse_params().background);
    assert_eq!(a.nearest_part, None);
    assert!(!a.has_gradient);
    assert_eq!(a.gradient, Vector::zeros());
}

#[test]
fn unknown_group_is_rejected() {
    let tree = ball_and_box();
    let engine = SelfDistanceEngine::new(&tree, None, coarse_params()).unwrap();

    assert_eq!(
        engine.distance_self(&tree, &DistanceRequest::new("legs", false)),
        Err(SelfDistanceError::UnknownJointGroup("legs".to_string()))
    );
}

#[test]
fn model_without_active_part_gives_empty_result() {
    let mut tree = KinematicTree::new("world");
    tree.add_shape(0, PartShape::at_origin(CollisionShape::sphere(0.2)))
        .unwrap();
    tree.add_joint_group("none", &[]).unwrap();

    let engine = SelfDistanceEngine::new(&tree, None, FieldParams::default()).unwrap();
    let result = engine
        .distance_self(&tree, &DistanceRequest::new("none", true))
        .unwrap();

    assert!(result.is_empty());
    assert!(result.minimum().is_none());
}

#[test]
fn invalid_params_are_rejected() {
    let tree = ball_and_box();
    let params = FieldParams {
        voxel_size: -0.1,
        ..coarse_params()
    };

    assert!(matches!(
        SelfDistanceEngine::new(&tree, None, params),
        Err(SelfDistanceError::InvalidParams(_))
    ));
}

/// Two balls of radius 0.1, sliding along `x`, with their centers 0.5 apart at rest.
fn two_sliders() -> KinematicTree {
    let mut tree = KinematicTree::new("base");
    let a = tree
        .add_part(
            "A",
            0,
            Joint::prismatic(Isometry::identity(), Vector::x_axis()),
        )
        .unwrap();
    let c = tree
        .add_part(
            "C",
            0,
            Joint::prismatic(Isometry::translation(0.5, 0.0, 0.0), Vector::x_axis()),
        )
        .unwrap();

    for part in [a, c] {
        tree.add_shape(part, PartShape::at_origin(CollisionShape::sphere(0.1)))
            .unwrap();
    }

    tree.add_joint_group("arm", &[a, c]).unwrap();
    tree
}

fn slider_params() -> FieldParams {
    FieldParams {
        voxel_size: 0.05,
        background: 1.0,
        exterior_band: 10.0,
        interior_band: 3.0,
    }
}

#[test]
fn active_parts_follow_their_joints() {
    let mut tree = two_sliders();
    let engine = SelfDistanceEngine::new(&tree, None, slider_params()).unwrap();
    let request = DistanceRequest::new("arm", true);

    let result = engine.distance_self(&tree, &request).unwrap();
    let a = result.get("A").unwrap();
    let c = result.get("C").unwrap();

    assert_eq!(a.nearest_part.as_deref(), Some("C"));
    assert_eq!(c.nearest_part.as_deref(), Some("A"));
    assert_relative_eq!(a.distance, 0.3, epsilon = 0.06);
    assert_relative_eq!(c.distance, 0.3, epsilon = 0.06);
    assert!(a.gradient.x < -0.9);
    assert!(c.gradient.x > 0.9);

    let slider = tree.find_part("A").unwrap();
    tree.set_joint_position(slider, 0.2).unwrap();

    let result = engine.distance_self(&tree, &request).unwrap();
    assert_relative_eq!(result.get("A").unwrap().distance, 0.1, epsilon = 0.06);
    assert!(result.minimum().unwrap().distance < 0.16);
}

#[test]
fn allow_list_lookups_are_symmetric_in_plans() {
    let tree = two_sliders();
    let mut acm = AllowedCollisionMatrix::new();
    acm.set_entry("C", "A", AllowedCollision::Always);
    assert_eq!(acm.lookup("A", "C"), Some(AllowedCollision::Always));

    let engine = SelfDistanceEngine::new(&tree, Some(&acm), slider_params()).unwrap();
    assert!(engine.query_plan("A").unwrap().is_empty());
    assert!(engine.query_plan("C").unwrap().is_empty());
}
