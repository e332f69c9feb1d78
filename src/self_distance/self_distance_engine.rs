use crate::kinematics::{AllowList, KinematicModel};
use crate::math::{Isometry, Point, Real, Vector};
use crate::self_distance::{
    build_active_field, build_dynamic_field, build_static_field, CandidateChild, ClassifiedPart,
    DistanceQueryPlan, DistanceRequest, DistanceResult, FieldParams, FieldSet, MobilityClass,
    PartClassification, PartDistance, PartField, SelfDistanceError,
};
use crate::volume::{
    FieldAccessor, SpherePacker, SpherePackingOptions, VolumeSpherePacker, VolumetricField,
};
use hashbrown::HashMap;
use na::Unit;
use parry3d::bounding_volume::BoundingSphere;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Minimum distances between the parts of an articulated body, computed from distance fields.
///
/// The engine is built once per kinematic model. Every collision-bearing part is classified
/// as static, active or dynamic, and gets its own distance field. Active parts are also
/// approximated by a set of spheres. At query time, the spheres of each active part are
/// moved to their current world pose and looked up in the fields of every other part its
/// query plan names.
///
/// After construction the engine is immutable: concurrent queries are safe as long as the
/// kinematic model is not modified while they run.
#[derive(Clone, Debug)]
pub struct SelfDistanceEngine {
    params: FieldParams,
    statics: Vec<PartField>,
    actives: Vec<PartField>,
    dynamics: Vec<PartField>,
    plans: Vec<DistanceQueryPlan>,
}

impl SelfDistanceEngine {
    /// Builds the engine of `model` with the default sphere packer.
    ///
    /// Pairs marked as always allowed by `allow_list` are never queried.
    pub fn new<M: KinematicModel + ?Sized>(
        model: &M,
        allow_list: Option<&dyn AllowList>,
        params: FieldParams,
    ) -> Result<Self, SelfDistanceError> {
        Self::with_packer(
            model,
            allow_list,
            params,
            &VolumeSpherePacker,
            &SpherePackingOptions::default(),
        )
    }

    /// Builds the engine of `model`, approximating active parts with `packer`.
    pub fn with_packer<M: KinematicModel + ?Sized>(
        model: &M,
        allow_list: Option<&dyn AllowList>,
        params: FieldParams,
        packer: &dyn SpherePacker,
        options: &SpherePackingOptions,
    ) -> Result<Self, SelfDistanceError> {
        params.validate()?;

        let classes = PartClassification::classify(model);
        let root_pose = model.part_world_transform(model.root_part());

        let statics = classes
            .statics
            .iter()
            .map(|part| build_static_field(model, part, &root_pose, &params))
            .collect();
        let actives = classes
            .actives
            .iter()
            .map(|part| build_active_field(model, part, &params, packer, options))
            .collect();
        let dynamics = classes
            .dynamics
            .iter()
            .map(|part| build_dynamic_field(model, part, &params))
            .collect();

        let result = Self::from_parts(params, statics, actives, dynamics, allow_list);
        log::info!(
            "Built self-distance engine: {} static, {} active ({} degenerate), {} dynamic fields, {} bytes.",
            result.statics.len(),
            result.actives.len(),
            result.actives.iter().filter(|field| field.degenerate).count(),
            result.dynamics.len(),
            result.memory_footprint()
        );

        Ok(result)
    }

    /// Rebuilds an engine for `model` from previously built fields.
    ///
    /// The model is classified again and every classified part must have a field with the
    /// same name and class in `set`. Fields of `set` without a matching part are ignored.
    pub fn from_field_set<M: KinematicModel + ?Sized>(
        model: &M,
        allow_list: Option<&dyn AllowList>,
        set: FieldSet,
    ) -> Result<Self, SelfDistanceError> {
        let params = FieldParams::from(set.metadata);
        params.validate()?;

        let classes = PartClassification::classify(model);
        let mut archived: HashMap<String, PartField> = set
            .fields
            .into_iter()
            .map(|field| (field.name.clone(), field))
            .collect();

        let mut take = |parts: &[ClassifiedPart]| {
            parts
                .iter()
                .map(|part| {
                    let mut field = archived
                        .remove(&part.name)
                        .ok_or_else(|| SelfDistanceError::MissingField(part.name.clone()))?;

                    if field.class != part.class {
                        return Err(SelfDistanceError::ClassMismatch {
                            part: part.name.clone(),
                            expected: part.class,
                            found: field.class,
                        });
                    }

                    field.part = part.part;
                    Ok(field)
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let statics = take(&classes.statics)?;
        let actives = take(&classes.actives)?;
        let dynamics = take(&classes.dynamics)?;

        if !archived.is_empty() {
            log::debug!(
                "Ignoring {} archived fields without a matching part.",
                archived.len()
            );
        }

        Ok(Self::from_parts(params, statics, actives, dynamics, allow_list))
    }

    fn from_parts(
        params: FieldParams,
        statics: Vec<PartField>,
        actives: Vec<PartField>,
        dynamics: Vec<PartField>,
        allow_list: Option<&dyn AllowList>,
    ) -> Self {
        let plans = (0..actives.len())
            .map(|i| DistanceQueryPlan::new(i, &actives, &dynamics, &statics, allow_list))
            .collect();

        Self {
            params,
            statics,
            actives,
            dynamics,
            plans,
        }
    }

    /// The nominal field parameters.
    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    /// The fields of the static parts.
    pub fn static_fields(&self) -> &[PartField] {
        &self.statics
    }

    /// The fields of the active parts.
    pub fn active_fields(&self) -> &[PartField] {
        &self.actives
    }

    /// The fields of the dynamic parts.
    pub fn dynamic_fields(&self) -> &[PartField] {
        &self.dynamics
    }

    /// Iterates through all the fields, statics first, then actives and dynamics.
    pub fn fields(&self) -> impl Iterator<Item = &PartField> {
        self.statics
            .iter()
            .chain(self.actives.iter())
            .chain(self.dynamics.iter())
    }

    /// The field of the part named `name`.
    pub fn field(&self, name: &str) -> Option<&PartField> {
        self.fields().find(|field| field.name == name)
    }

    /// The query plans of the active parts, in active part order.
    pub fn query_plans(&self) -> &[DistanceQueryPlan] {
        &self.plans
    }

    /// The query plan of the active part named `name`.
    pub fn query_plan(&self, name: &str) -> Option<&DistanceQueryPlan> {
        self.plans.iter().find(|plan| plan.parent == name)
    }

    /// An approximation of the memory usage (in bytes) of all the fields.
    pub fn memory_footprint(&self) -> usize {
        self.fields()
            .map(|field| field.field.memory_footprint())
            .sum()
    }

    /// Exports every field with the parameters they were built with.
    pub fn to_field_set(&self) -> FieldSet {
        FieldSet {
            metadata: self.params.into(),
            fields: self.fields().cloned().collect(),
        }
    }

    /// The spheres of every active part, moved to their current world pose.
    pub fn world_spheres<M: KinematicModel + ?Sized>(
        &self,
        model: &M,
    ) -> Vec<(&str, Vec<BoundingSphere>)> {
        self.actives
            .iter()
            .map(|field| {
                let pose = model.part_world_transform(field.part);
                let spheres = field.spheres.iter().map(|s| s.transform_by(&pose)).collect();
                (field.name.as_str(), spheres)
            })
            .collect()
    }

    /// The voxel centers of every field, in world frame, split between the ones inside and
    /// outside of the parts.
    ///
    /// Active and dynamic fields are moved to their current world pose. Fields of parts named
    /// in `exclude` are skipped.
    pub fn point_clouds<M: KinematicModel + ?Sized>(
        &self,
        model: &M,
        exclude: &[&str],
    ) -> (Vec<Point<Real>>, Vec<Point<Real>>) {
        let mut inside = Vec::new();
        let mut outside = Vec::new();

        for field in self.fields() {
            if exclude.contains(&field.name.as_str()) {
                continue;
            }

            let pose = match field.class {
                MobilityClass::Static => None,
                MobilityClass::Active | MobilityClass::Dynamic => {
                    Some(model.part_world_transform(field.part))
                }
            };
            let (field_inside, field_outside) = field.field.inside_outside_points(pose.as_ref());
            inside.extend(field_inside);
            outside.extend(field_outside);
        }

        (inside, outside)
    }

    /// Computes, for every active part with spheres, its distance to the closest other part.
    ///
    /// Fails if the joint group of the request does not exist in `model`. The result has no
    /// entry if the model has no active part.
    pub fn distance_self<M: KinematicModel + ?Sized>(
        &self,
        model: &M,
        request: &DistanceRequest,
    ) -> Result<DistanceResult, SelfDistanceError> {
        if model.joint_group_parts(&request.group_name).is_none() {
            return Err(SelfDistanceError::UnknownJointGroup(
                request.group_name.clone(),
            ));
        }

        let (world_spheres, posed) = self.pose_fields(model);

        let queried = self
            .plans
            .iter()
            .filter(|plan| !world_spheres[plan.parent_index].is_empty());

        #[cfg(not(feature = "parallel"))]
        let parts = queried
            .map(|plan| {
                self.evaluate_parent(
                    plan,
                    &world_spheres[plan.parent_index],
                    &posed,
                    request.gradient,
                    |field| field.accessor(),
                )
            })
            .collect();

        #[cfg(feature = "parallel")]
        let parts = queried
            .collect::<Vec<_>>()
            .par_iter()
            .map(|plan| {
                self.evaluate_parent(
                    plan,
                    &world_spheres[plan.parent_index],
                    &posed,
                    request.gradient,
                    |field| field,
                )
            })
            .collect();

        Ok(DistanceResult { parts })
    }

    /// The spheres of every active part and every field, at the current pose of `model`.
    fn pose_fields<M: KinematicModel + ?Sized>(
        &self,
        model: &M,
    ) -> (Vec<Vec<BoundingSphere>>, PosedFields<'_>) {
        let active_poses: Vec<_> = self
            .actives
            .iter()
            .map(|field| model.part_world_transform(field.part))
            .collect();
        let world_spheres: Vec<Vec<_>> = self
            .actives
            .iter()
            .zip(active_poses.iter())
            .map(|(field, pose)| field.spheres.iter().map(|s| s.transform_by(pose)).collect())
            .collect();

        let posed = PosedFields {
            statics: self
                .statics
                .iter()
                .map(|field| PosedField::new(&field.field, None))
                .collect(),
            actives: self
                .actives
                .iter()
                .zip(active_poses.iter())
                .map(|(field, pose)| PosedField::new(&field.field, Some(*pose)))
                .collect(),
            dynamics: self
                .dynamics
                .iter()
                .map(|field| {
                    PosedField::new(&field.field, Some(model.part_world_transform(field.part)))
                })
                .collect(),
        };

        (world_spheres, posed)
    }

    fn evaluate_parent<'a, L, F>(
        &self,
        plan: &DistanceQueryPlan,
        spheres: &[BoundingSphere],
        posed: &PosedFields<'a>,
        gradient: bool,
        make_lookup: F,
    ) -> PartDistance
    where
        L: DistanceLookup,
        F: Fn(&'a VolumetricField) -> L,
    {
        let background = self.params.background;
        let mut result = PartDistance::far(plan.parent.clone(), background);
        let mut gradient_sum = Vector::zeros();
        let mut total_weight = 0.0;

        for candidate in &plan.candidates {
            let child = posed.get(candidate);
            let mut lookup = make_lookup(child.field);
            let mut child_min = background;
            let mut child_min_key = None;

            for sphere in spheres {
                let key = child.voxel_key(&sphere.center);
                let dist = lookup.distance_at(key);

                if child.field.is_background(dist) {
                    continue;
                }

                let dist = dist - sphere.radius;
                if dist < child_min {
                    child_min = dist;
                    child_min_key = Some(key);
                }
            }

            let Some(key) = child_min_key else {
                continue;
            };

            if child_min < result.distance {
                result.distance = child_min;
                result.nearest_part = Some(candidate.name.clone());
            }

            if gradient {
                let raw = lookup.index_gradient_at(key);

                if let Some(dir) = Unit::try_new(child.world_gradient(raw), 0.0) {
                    let weight = background - child_min;
                    total_weight += weight;
                    gradient_sum += dir.into_inner() * weight;
                }
            }
        }

        if total_weight > 0.0 {
            if let Some(dir) = Unit::try_new(gradient_sum / total_weight, 0.0) {
                result.gradient = dir.into_inner();
                result.has_gradient = true;
            }
        }

        result
    }
}

/// Distance lookups on a single field, either cached or re-entrant.
trait DistanceLookup {
    fn distance_at(&mut self, key: Point<i32>) -> Real;
    fn index_gradient_at(&mut self, key: Point<i32>) -> Vector<Real>;
}

impl DistanceLookup for FieldAccessor<'_> {
    fn distance_at(&mut self, key: Point<i32>) -> Real {
        FieldAccessor::distance_at(self, key)
    }

    fn index_gradient_at(&mut self, key: Point<i32>) -> Vector<Real> {
        FieldAccessor::index_gradient_at(self, key)
    }
}

impl DistanceLookup for &VolumetricField {
    fn distance_at(&mut self, key: Point<i32>) -> Real {
        VolumetricField::distance_at(*self, key)
    }

    fn index_gradient_at(&mut self, key: Point<i32>) -> Vector<Real> {
        VolumetricField::index_gradient_at(*self, key)
    }
}

/// A field together with its world pose for the duration of one query.
///
/// Static fields have no pose: they are already expressed in world frame.
struct PosedField<'a> {
    field: &'a VolumetricField,
    pose: Option<Isometry<Real>>,
}

impl<'a> PosedField<'a> {
    fn new(field: &'a VolumetricField, pose: Option<Isometry<Real>>) -> Self {
        Self { field, pose }
    }

    fn voxel_key(&self, world_pt: &Point<Real>) -> Point<i32> {
        match &self.pose {
            Some(pose) => self
                .field
                .world_to_index(&pose.inverse_transform_point(world_pt)),
            None => self.field.world_to_index(world_pt),
        }
    }

    fn world_gradient(&self, index_gradient: Vector<Real>) -> Vector<Real> {
        let gradient = index_gradient / self.field.voxel_size();
        match &self.pose {
            Some(pose) => pose.rotation * gradient,
            None => gradient,
        }
    }
}

struct PosedFields<'a> {
    statics: Vec<PosedField<'a>>,
    actives: Vec<PosedField<'a>>,
    dynamics: Vec<PosedField<'a>>,
}

impl<'a> PosedFields<'a> {
    fn get(&self, candidate: &CandidateChild) -> &PosedField<'a> {
        match candidate.class {
            MobilityClass::Static => &self.statics[candidate.index],
            MobilityClass::Active => &self.actives[candidate.index],
            MobilityClass::Dynamic => &self.dynamics[candidate.index],
        }
    }
}
