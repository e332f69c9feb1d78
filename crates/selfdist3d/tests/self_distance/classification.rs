use oorandom::Rand32;
use selfdist3d::kinematics::{Joint, KinematicModel, KinematicTree, PartId};
use selfdist3d::math::{Isometry, Vector};
use selfdist3d::self_distance::{MobilityClass, PartClassification};
use selfdist3d::shape::{CollisionShape, PartShape};
use std::collections::HashSet;

fn random_tree(rng: &mut Rand32) -> KinematicTree {
    let mut tree = KinematicTree::new("root");
    let num_parts = rng.rand_range(1..40) as usize;

    if rng.rand_float() < 0.5 {
        tree.add_shape(0, PartShape::at_origin(CollisionShape::sphere(0.1)))
            .unwrap();
    }

    for i in 1..num_parts {
        let parent = rng.rand_range(0..i as u32) as PartId;
        let origin = Isometry::translation(
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
            rng.rand_float() - 0.5,
        );
        let joint = match rng.rand_range(0..3) {
            0 => Joint::fixed(origin),
            1 => Joint::revolute(origin, Vector::z_axis()),
            _ => Joint::prismatic(origin, Vector::y_axis()),
        };

        let part = tree.add_part(format!("part{}", i), parent, joint).unwrap();
        if rng.rand_float() < 0.7 {
            tree.add_shape(part, PartShape::at_origin(CollisionShape::sphere(0.05)))
                .unwrap();
        }
    }

    for g in 0..rng.rand_range(0..4) {
        let members: Vec<_> = (0..num_parts)
            .filter(|_| rng.rand_float() < 0.3)
            .collect();
        tree.add_joint_group(format!("group{}", g), &members).unwrap();
    }

    tree
}

/// Is every joint between `part` and the root fixed?
fn is_fixed_to_root(tree: &KinematicTree, mut part: PartId) -> bool {
    while let Some(joint) = tree.joint(part) {
        if !joint.is_fixed() {
            return false;
        }
        part = tree.parent(part).unwrap();
    }
    true
}

#[test]
fn classes_partition_collision_parts() {
    let mut rng = Rand32::new(42);

    for _ in 0..200 {
        let tree = random_tree(&mut rng);
        let classes = PartClassification::classify(&tree);

        let mut seen = HashSet::new();
        for part in classes.iter() {
            assert!(seen.insert(part.part), "{} classified twice", part.name);
            assert_eq!(classes.class_of(&part.name), Some(part.class));
        }

        let expected: HashSet<_> = tree.parts_with_collision_geometry().into_iter().collect();
        assert_eq!(seen, expected);

        let group_members: HashSet<_> = tree
            .joint_group_names()
            .into_iter()
            .flat_map(|group| tree.joint_group_parts(group).unwrap())
            .collect();

        for part in &classes.statics {
            assert_eq!(part.class, MobilityClass::Static);
            assert!(is_fixed_to_root(&tree, part.part));
            // The root pose is the identity, so the accumulated transform is the world one.
            assert_relative_eq!(
                part.fixed_transform,
                tree.part_world_transform(part.part),
                epsilon = 1.0e-5
            );
        }

        for part in &classes.actives {
            assert_eq!(part.class, MobilityClass::Active);
            assert!(group_members.contains(&part.part));
            assert!(!is_fixed_to_root(&tree, part.part));
        }

        for part in &classes.dynamics {
            assert_eq!(part.class, MobilityClass::Dynamic);
            assert!(!group_members.contains(&part.part));
            assert!(!is_fixed_to_root(&tree, part.part));
        }
    }
}
