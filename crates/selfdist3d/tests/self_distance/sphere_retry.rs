use selfdist3d::kinematics::{Joint, KinematicTree};
use selfdist3d::math::{Isometry, Point, Real, Vector};
use selfdist3d::parry3d::bounding_volume::BoundingSphere;
use selfdist3d::self_distance::{DistanceRequest, FieldParams, SelfDistanceEngine};
use selfdist3d::shape::{CollisionShape, PartShape};
use selfdist3d::volume::{SpherePacker, SpherePackingOptions, VolumetricField};
use std::cell::RefCell;

/// Records the voxel size of every field it is given, and returns `num_spheres(voxel_size)`
/// spheres.
struct RecordingPacker<F> {
    num_spheres: F,
    voxel_sizes: RefCell<Vec<Real>>,
}

impl<F: Fn(Real) -> usize> RecordingPacker<F> {
    fn new(num_spheres: F) -> Self {
        Self {
            num_spheres,
            voxel_sizes: RefCell::new(Vec::new()),
        }
    }
}

impl<F: Fn(Real) -> usize> SpherePacker for RecordingPacker<F> {
    fn pack(&self, field: &VolumetricField, _: &SpherePackingOptions) -> Vec<BoundingSphere> {
        self.voxel_sizes.borrow_mut().push(field.voxel_size());
        (0..(self.num_spheres)(field.voxel_size()))
            .map(|i| BoundingSphere::new(Point::new(i as Real * 0.01, 0.0, 0.0), 0.01))
            .collect()
    }
}

/// A static box at the root and an active part carrying the given shape.
fn model(active_shape: CollisionShape) -> KinematicTree {
    let mut tree = KinematicTree::new("base");
    tree.add_shape(
        0,
        PartShape::new(
            Isometry::translation(0.3, 0.0, 0.0),
            CollisionShape::cuboid(Vector::repeat(0.2)),
        ),
    )
    .unwrap();
    let link = tree
        .add_part(
            "link",
            0,
            Joint::revolute(Isometry::identity(), Vector::z_axis()),
        )
        .unwrap();
    tree.add_shape(link, PartShape::at_origin(active_shape))
        .unwrap();
    tree.add_joint_group("arm", &[link]).unwrap();
    tree
}

#[test]
fn packing_retries_at_half_resolution() {
    let tree = model(CollisionShape::cuboid(Vector::repeat(0.1)));
    let params = FieldParams::default();
    let packer = RecordingPacker::new(|voxel_size| {
        if voxel_size < params.voxel_size * 0.75 {
            3
        } else {
            0
        }
    });

    let engine = SelfDistanceEngine::with_packer(
        &tree,
        None,
        params,
        &packer,
        &SpherePackingOptions::default(),
    )
    .unwrap();

    let active = &engine.active_fields()[0];
    assert_relative_eq!(active.field.voxel_size(), params.voxel_size / 2.0);
    assert_eq!(active.spheres.len(), 3);
    assert!(!active.degenerate);
    assert!(!active.field.is_empty());
    assert!(!engine.query_plan("link").unwrap().is_empty());
    assert_eq!(
        *packer.voxel_sizes.borrow(),
        [params.voxel_size, params.voxel_size / 2.0]
    );

    // The static field keeps the nominal resolution.
    assert_eq!(engine.static_fields()[0].field.voxel_size(), params.voxel_size);
}

#[test]
fn degenerate_packing_stops_after_ten_attempts() {
    // A shape that never voxelizes keeps the field empty at every resolution.
    let tree = model(CollisionShape::sphere(-1.0));
    let params = FieldParams::default();
    let packer = RecordingPacker::new(|_| 0);

    let engine = SelfDistanceEngine::with_packer(
        &tree,
        None,
        params,
        &packer,
        &SpherePackingOptions::default(),
    )
    .unwrap();

    let voxel_sizes = packer.voxel_sizes.borrow();
    assert_eq!(voxel_sizes.len(), 10);
    assert_eq!(voxel_sizes[0], params.voxel_size);
    for pair in voxel_sizes.windows(2) {
        assert_relative_eq!(pair[1], pair[0] / 2.0);
    }

    let active = &engine.active_fields()[0];
    assert!(active.degenerate);
    assert!(active.spheres.is_empty());
    assert!(active.field.is_empty());
    assert!(engine.query_plan("link").unwrap().is_empty());

    // A part without spheres is not queried at all.
    let result = engine
        .distance_self(&tree, &DistanceRequest::new("arm", false))
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn single_sphere_is_degenerate() {
    let tree = model(CollisionShape::cuboid(Vector::repeat(0.1)));
    let packer = RecordingPacker::new(|_| 1);
    let options = SpherePackingOptions {
        max_attempts: 3,
        ..SpherePackingOptions::default()
    };

    let engine =
        SelfDistanceEngine::with_packer(&tree, None, FieldParams::default(), &packer, &options)
            .unwrap();

    assert_eq!(packer.voxel_sizes.borrow().len(), 3);
    let active = &engine.active_fields()[0];
    assert!(active.degenerate);
    // The last attempt is kept, so the part is still queried with its only sphere.
    assert_eq!(active.spheres.len(), 1);
    assert_relative_eq!(active.field.voxel_size(), 0.005);
    assert!(!engine.query_plan("link").unwrap().is_empty());
}

#[test]
fn open_mesh_parts_keep_their_field() {
    let plate = CollisionShape::mesh(
        vec![
            Point::new(-0.05, -0.05, 0.0),
            Point::new(0.05, -0.05, 0.0),
            Point::new(0.05, 0.05, 0.0),
            Point::new(-0.05, 0.05, 0.0),
        ],
        vec![[0, 1, 2], [0, 2, 3]],
    );

    let mut tree = KinematicTree::new("base");
    let plate_id = tree
        .add_part(
            "plate",
            0,
            Joint::revolute(Isometry::identity(), Vector::z_axis()),
        )
        .unwrap();
    tree.add_shape(plate_id, PartShape::at_origin(plate)).unwrap();
    let ball_id = tree
        .add_part(
            "ball",
            0,
            Joint::prismatic(Isometry::translation(0.0, 0.0, 0.1), Vector::z_axis()),
        )
        .unwrap();
    tree.add_shape(ball_id, PartShape::at_origin(CollisionShape::sphere(0.05)))
        .unwrap();
    tree.add_joint_group("arm", &[plate_id, ball_id]).unwrap();

    let params = FieldParams {
        voxel_size: 0.1,
        background: 1.0,
        exterior_band: 2.0,
        interior_band: 1.0,
    };
    let engine = SelfDistanceEngine::new(&tree, None, params).unwrap();

    // An open mesh has no inside: it never gets spheres, but keeps its nominal field.
    let plate_field = engine.field("plate").unwrap();
    assert!(plate_field.degenerate);
    assert!(plate_field.spheres.is_empty());
    assert!(!plate_field.field.is_empty());
    assert_eq!(plate_field.field.voxel_size(), params.voxel_size);

    let result = engine
        .distance_self(&tree, &DistanceRequest::new("arm", false))
        .unwrap();
    assert!(result.get("plate").is_none());

    let ball = result.get("ball").unwrap();
    assert_eq!(ball.nearest_part.as_deref(), Some("plate"));
    assert!(ball.distance < 0.1);
}
