use crate::kinematics::{FixedAttachments, KinematicModel, PartId};
use crate::math::{Isometry, Real, Translation, UnitVector};
use crate::shape::PartShape;
use hashbrown::HashMap;
use na::UnitQuaternion;

/// Errors raised while assembling or updating a [`KinematicTree`].
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A part with the same name already exists.
    #[error("a part named `{0}` already exists")]
    DuplicatePart(String),
    /// No part has the given name or id.
    #[error("unknown part `{0}`")]
    UnknownPart(String),
    /// No joint group has the given name.
    #[error("unknown joint group `{0}`")]
    UnknownGroup(String),
}

/// The motion allowed by the joint connecting a part to its parent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum JointKind {
    /// The part is rigidly attached to its parent.
    Fixed,
    /// The part rotates about an axis expressed in the joint frame.
    Revolute(UnitVector<Real>),
    /// The part translates along an axis expressed in the joint frame.
    Prismatic(UnitVector<Real>),
}

/// The joint connecting a part to its parent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Joint {
    /// The transform of the joint frame relative to the parent frame.
    pub origin: Isometry<Real>,
    /// The kind of motion of this joint.
    pub kind: JointKind,
    /// The current joint position (an angle for revolute joints, a length for prismatic ones).
    pub position: Real,
}

impl Joint {
    /// A joint rigidly attaching a part at `origin`.
    pub fn fixed(origin: Isometry<Real>) -> Self {
        Self {
            origin,
            kind: JointKind::Fixed,
            position: 0.0,
        }
    }

    /// A revolute joint located at `origin` and rotating about `axis`.
    pub fn revolute(origin: Isometry<Real>, axis: UnitVector<Real>) -> Self {
        Self {
            origin,
            kind: JointKind::Revolute(axis),
            position: 0.0,
        }
    }

    /// A prismatic joint located at `origin` and sliding along `axis`.
    pub fn prismatic(origin: Isometry<Real>, axis: UnitVector<Real>) -> Self {
        Self {
            origin,
            kind: JointKind::Prismatic(axis),
            position: 0.0,
        }
    }

    /// Is this joint actuated?
    pub fn is_fixed(&self) -> bool {
        self.kind == JointKind::Fixed
    }

    /// The transform of the child frame relative to the parent frame at the current position.
    pub fn transform(&self) -> Isometry<Real> {
        match self.kind {
            JointKind::Fixed => self.origin,
            JointKind::Revolute(axis) => {
                self.origin * UnitQuaternion::from_axis_angle(&axis, self.position)
            }
            JointKind::Prismatic(axis) => {
                self.origin * Translation::from(axis.into_inner() * self.position)
            }
        }
    }
}

struct PartNode {
    name: String,
    parent: Option<(PartId, Joint)>,
    children: Vec<PartId>,
    shapes: Vec<PartShape>,
}

/// An in-memory articulated body made of parts connected by joints.
///
/// Parts form a tree rooted at the part given to [`KinematicTree::new`]. The world
/// transform of a part is the root pose composed with the transforms of all the joints on
/// the path from the root to that part.
pub struct KinematicTree {
    parts: Vec<PartNode>,
    part_ids: HashMap<String, PartId>,
    groups: Vec<(String, Vec<PartId>)>,
    root_pose: Isometry<Real>,
}

impl KinematicTree {
    /// Creates a tree containing only its root part.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        let mut part_ids = HashMap::default();
        let _ = part_ids.insert(root_name.clone(), 0);

        Self {
            parts: vec![PartNode {
                name: root_name,
                parent: None,
                children: Vec::new(),
                shapes: Vec::new(),
            }],
            part_ids,
            groups: Vec::new(),
            root_pose: Isometry::identity(),
        }
    }

    /// Adds a new part attached to `parent` through `joint`.
    pub fn add_part(
        &mut self,
        name: impl Into<String>,
        parent: PartId,
        joint: Joint,
    ) -> Result<PartId, ModelError> {
        let name = name.into();

        if parent >= self.parts.len() {
            return Err(ModelError::UnknownPart(format!("#{}", parent)));
        }
        if self.part_ids.contains_key(&name) {
            return Err(ModelError::DuplicatePart(name));
        }

        let id = self.parts.len();
        let _ = self.part_ids.insert(name.clone(), id);
        self.parts[parent].children.push(id);
        self.parts.push(PartNode {
            name,
            parent: Some((parent, joint)),
            children: Vec::new(),
            shapes: Vec::new(),
        });

        Ok(id)
    }

    /// Adds a collision shape to a part.
    pub fn add_shape(&mut self, part: PartId, shape: PartShape) -> Result<(), ModelError> {
        self.parts
            .get_mut(part)
            .ok_or_else(|| ModelError::UnknownPart(format!("#{}", part)))?
            .shapes
            .push(shape);
        Ok(())
    }

    /// Declares a joint group moving the given parts.
    ///
    /// Declaring a group with an existing name replaces it.
    pub fn add_joint_group(
        &mut self,
        name: impl Into<String>,
        parts: &[PartId],
    ) -> Result<(), ModelError> {
        if let Some(bad) = parts.iter().find(|part| **part >= self.parts.len()) {
            return Err(ModelError::UnknownPart(format!("#{}", bad)));
        }

        let name = name.into();
        self.groups.retain(|(group, _)| *group != name);
        self.groups.push((name, parts.to_vec()));
        Ok(())
    }

    /// Sets the pose of the root part relative to the world.
    pub fn set_root_pose(&mut self, pose: Isometry<Real>) {
        self.root_pose = pose;
    }

    /// Sets the position of the joint connecting `part` to its parent.
    ///
    /// Setting the position of a fixed joint has no effect on the transforms.
    pub fn set_joint_position(&mut self, part: PartId, position: Real) -> Result<(), ModelError> {
        match self.parts.get_mut(part).and_then(|node| node.parent.as_mut()) {
            Some((_, joint)) => {
                joint.position = position;
                Ok(())
            }
            None => Err(ModelError::UnknownPart(format!("#{}", part))),
        }
    }

    /// The joint connecting `part` to its parent, if it is not the root.
    pub fn joint(&self, part: PartId) -> Option<&Joint> {
        self.parts
            .get(part)
            .and_then(|node| node.parent.as_ref())
            .map(|(_, joint)| joint)
    }

    /// The parent of `part`, if it is not the root.
    pub fn parent(&self, part: PartId) -> Option<PartId> {
        self.parts
            .get(part)
            .and_then(|node| node.parent.as_ref())
            .map(|(parent, _)| *parent)
    }

    /// The id of the part named `name`.
    pub fn find_part(&self, name: &str) -> Result<PartId, ModelError> {
        self.part_ids
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownPart(name.to_string()))
    }
}

impl KinematicModel for KinematicTree {
    fn num_parts(&self) -> usize {
        self.parts.len()
    }

    fn root_part(&self) -> PartId {
        0
    }

    fn part_name(&self, part: PartId) -> &str {
        &self.parts[part].name
    }

    fn collision_shapes(&self, part: PartId) -> &[PartShape] {
        &self.parts[part].shapes
    }

    fn fixed_attachments(&self, part: PartId) -> FixedAttachments {
        self.parts[part]
            .children
            .iter()
            .filter_map(|child| match &self.parts[*child].parent {
                Some((_, joint)) if joint.is_fixed() => Some((*child, joint.origin)),
                _ => None,
            })
            .collect()
    }

    fn joint_group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn joint_group_parts(&self, group: &str) -> Option<Vec<PartId>> {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map(|(_, parts)| parts.clone())
    }

    fn part_world_transform(&self, part: PartId) -> Isometry<Real> {
        let mut result = Isometry::identity();
        let mut curr = part;

        while let Some((parent, joint)) = &self.parts[curr].parent {
            result = joint.transform() * result;
            curr = *parent;
        }

        self.root_pose * result
    }

    fn part_id(&self, name: &str) -> Option<PartId> {
        self.part_ids.get(name).copied()
    }
}
