use crate::coarse_params;
use oorandom::Rand32;
use selfdist3d::kinematics::{AllowedCollision, AllowedCollisionMatrix, Joint, KinematicTree};
use selfdist3d::math::{Isometry, Point, Vector};
use selfdist3d::self_distance::{
    DistanceRequest, FieldParams, PartDistance, SelfDistanceEngine,
};
use selfdist3d::shape::{CollisionShape, PartShape};
use selfdist3d::volume::VolumetricField;

fn random_far_point(rng: &mut Rand32, min_dist: f32) -> Point<f32> {
    let dir = Vector::new(
        rng.rand_float() - 0.5,
        rng.rand_float() - 0.5,
        rng.rand_float() - 0.5,
    )
    .try_normalize(1.0e-3)
    .unwrap_or(Vector::x());
    Point::from(dir * (min_dist + rng.rand_float() * 10.0))
}

#[test]
fn far_points_read_exactly_background() {
    let shapes = [
        CollisionShape::cuboid(Vector::new(0.3, 0.2, 0.5)),
        CollisionShape::sphere(0.25),
        CollisionShape::cylinder(0.1, 0.6),
        CollisionShape::cone(0.2, 0.4),
    ];
    let mut rng = Rand32::new(7);

    for shape in shapes {
        let mut field = VolumetricField::new(0.05, 0.75);
        field
            .insert_shape(&PartShape::at_origin(shape), &Isometry::identity(), 3.0, 3.0)
            .unwrap();

        for _ in 0..500 {
            // Every shape fits in a ball of radius 0.5, and the band is 0.15 wide.
            let pt = random_far_point(&mut rng, 0.8);
            assert_eq!(field.distance(&pt), 0.75);
            assert!(field.gradient(&pt).is_none());
        }
    }
}

#[test]
fn gradients_are_unit_or_absent() {
    let mut tree = KinematicTree::new("base");
    tree.add_shape(
        0,
        PartShape::at_origin(CollisionShape::cuboid(Vector::new(0.6, 0.6, 0.1))),
    )
    .unwrap();
    let shoulder = tree
        .add_part(
            "shoulder",
            0,
            Joint::revolute(Isometry::translation(0.0, 0.0, 0.15), Vector::y_axis()),
        )
        .unwrap();
    tree.add_shape(
        shoulder,
        PartShape::new(
            Isometry::translation(0.15, 0.0, 0.0),
            CollisionShape::cuboid(Vector::new(0.3, 0.08, 0.08)),
        ),
    )
    .unwrap();
    let elbow = tree
        .add_part(
            "elbow",
            shoulder,
            Joint::revolute(Isometry::translation(0.3, 0.0, 0.0), Vector::y_axis()),
        )
        .unwrap();
    tree.add_shape(
        elbow,
        PartShape::new(
            Isometry::translation(0.1, 0.0, 0.0),
            CollisionShape::cylinder(0.04, 0.2),
        ),
    )
    .unwrap();
    tree.add_joint_group("arm", &[shoulder, elbow]).unwrap();

    let params = FieldParams {
        voxel_size: 0.02,
        background: 0.3,
        exterior_band: 6.0,
        interior_band: 3.0,
    };
    let engine = SelfDistanceEngine::new(&tree, None, params).unwrap();
    let request = DistanceRequest::new("arm", true);
    let mut rng = Rand32::new(3);
    let mut num_gradients = 0;

    for _ in 0..30 {
        tree.set_joint_position(shoulder, rng.rand_float() * 3.0 - 1.5)
            .unwrap();
        tree.set_joint_position(elbow, rng.rand_float() * 3.0 - 1.5)
            .unwrap();

        let result = engine.distance_self(&tree, &request).unwrap();
        assert_eq!(result.parts.len(), 2);

        for part in &result.parts {
            if part.has_gradient {
                num_gradients += 1;
                assert_relative_eq!(part.gradient.norm(), 1.0, epsilon = 1.0e-4);
            } else {
                assert_eq!(part.gradient, Vector::zeros());
            }

            if part.nearest_part.is_none() {
                assert_eq!(part.distance, params.background);
                assert!(!part.has_gradient);
            } else {
                assert!(part.distance < params.background);
            }
        }
    }

    assert!(num_gradients > 0);
}

/// An active ball `A` of radius 0.1 at the origin, between two static boxes: the root `first`
/// and its fixed child `second`.
fn ball_between(first: PartShape, second: PartShape) -> KinematicTree {
    let mut tree = KinematicTree::new("first");
    tree.add_shape(0, first).unwrap();
    let second_id = tree
        .add_part("second", 0, Joint::fixed(Isometry::identity()))
        .unwrap();
    tree.add_shape(second_id, second).unwrap();

    let a = tree
        .add_part(
            "A",
            0,
            Joint::revolute(Isometry::identity(), Vector::z_axis()),
        )
        .unwrap();
    tree.add_shape(a, PartShape::at_origin(CollisionShape::sphere(0.1)))
        .unwrap();
    tree.add_joint_group("arm", &[a]).unwrap();
    tree
}

/// The distance of `A`, measured against `only` if given, against both boxes otherwise.
fn measure_ball(tree: &KinematicTree, params: FieldParams, only: Option<&str>) -> PartDistance {
    let mut acm = AllowedCollisionMatrix::new();
    match only {
        Some("first") => acm.set_entry("A", "second", AllowedCollision::Always),
        Some(_) => acm.set_entry("A", "first", AllowedCollision::Always),
        None => {}
    }

    let engine = SelfDistanceEngine::new(tree, Some(&acm), params).unwrap();
    let result = engine
        .distance_self(tree, &DistanceRequest::new("arm", true))
        .unwrap();
    result.get("A").unwrap().clone()
}

#[test]
fn gradient_blend_leans_toward_the_closer_part() {
    let tree = ball_between(
        PartShape::new(
            Isometry::translation(0.5, 0.0, 0.0),
            CollisionShape::cuboid(Vector::repeat(0.2)),
        ),
        PartShape::new(
            Isometry::translation(0.0, 0.8, 0.0),
            CollisionShape::cuboid(Vector::repeat(0.2)),
        ),
    );
    let params = coarse_params();

    let near = measure_ball(&tree, params, Some("first"));
    let far = measure_ball(&tree, params, Some("second"));
    let both = measure_ball(&tree, params, None);

    assert_eq!(near.nearest_part.as_deref(), Some("first"));
    assert_eq!(far.nearest_part.as_deref(), Some("second"));
    assert!(near.has_gradient && far.has_gradient);
    assert!(near.distance < far.distance);
    assert!(near.gradient.x < -0.9);
    assert!(far.gradient.y < -0.9);

    // Each direction is weighted by how far its distance is below the background.
    let expected = (near.gradient * (params.background - near.distance)
        + far.gradient * (params.background - far.distance))
        .normalize();

    assert_eq!(both.nearest_part.as_deref(), Some("first"));
    assert_eq!(both.distance, near.distance);
    assert!(both.has_gradient);
    assert_relative_eq!(both.gradient, expected, epsilon = 1.0e-5);
    assert!(both.gradient.dot(&near.gradient) > both.gradient.dot(&far.gradient));
}

#[test]
fn flat_gradients_are_discarded() {
    // The ball is deep inside of the first box, where its distance is clamped, so the
    // gradient of that box vanishes around the ball.
    let tree = ball_between(
        PartShape::at_origin(CollisionShape::cuboid(Vector::repeat(2.0))),
        PartShape::new(
            Isometry::translation(0.0, 1.3, 0.0),
            CollisionShape::cuboid(Vector::repeat(0.2)),
        ),
    );
    let params = FieldParams {
        exterior_band: 16.0,
        ..coarse_params()
    };

    let inside = measure_ball(&tree, params, Some("first"));
    let above = measure_ball(&tree, params, Some("second"));
    let both = measure_ball(&tree, params, None);

    assert_eq!(inside.nearest_part.as_deref(), Some("first"));
    assert!(inside.distance < 0.0);
    assert!(!inside.has_gradient);
    assert_eq!(inside.gradient, Vector::zeros());

    assert_eq!(above.nearest_part.as_deref(), Some("second"));
    assert!(above.has_gradient);

    assert_eq!(both.nearest_part.as_deref(), Some("first"));
    assert_eq!(both.distance, inside.distance);
    assert!(both.has_gradient);
    assert_relative_eq!(both.gradient, above.gradient, epsilon = 1.0e-6);
}
