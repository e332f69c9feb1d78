//! Construction of the distance fields and sphere sets of classified parts.

use crate::kinematics::{KinematicModel, PartId};
use crate::math::{Isometry, Real};
use crate::self_distance::{ClassifiedPart, FieldParams, MobilityClass};
use crate::volume::{encloses_volume, SpherePacker, SpherePackingOptions, VolumetricField};
use parry3d::bounding_volume::BoundingSphere;

/// The distance field built for a single part.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PartField {
    /// The part name.
    pub name: String,
    /// The part id in the kinematic model the field was built from.
    pub part: PartId,
    /// The mobility class the field was built for.
    pub class: MobilityClass,
    /// The distance field.
    ///
    /// Static fields are expressed in the world frame as it was when the engine was built.
    /// Active and dynamic fields are expressed in their part frame.
    pub field: VolumetricField,
    /// The spheres approximating the part, in the field frame. Only set for active parts.
    pub spheres: Vec<BoundingSphere>,
    /// Did sphere packing fail to produce more than one sphere at every resolution tried?
    pub degenerate: bool,
}

impl PartField {
    fn empty(part: &ClassifiedPart, voxel_size: Real, background: Real) -> Self {
        Self {
            name: part.name.clone(),
            part: part.part,
            class: part.class,
            field: VolumetricField::new(voxel_size, background),
            spheres: Vec::new(),
            degenerate: false,
        }
    }
}

/// Builds the field of a static part at its accumulated fixed pose, relative to `root_pose`.
pub fn build_static_field<M: KinematicModel + ?Sized>(
    model: &M,
    part: &ClassifiedPart,
    root_pose: &Isometry<Real>,
    params: &FieldParams,
) -> PartField {
    let mut result = PartField::empty(part, params.voxel_size, params.background);
    let pose = root_pose * part.fixed_transform;
    let _ = result.field.insert_part_shapes(
        &part.name,
        model.collision_shapes(part.part),
        &pose,
        params.exterior_band,
        params.interior_band,
    );

    log::debug!(
        "Built static field of {} with {} voxels.",
        part.name,
        result.field.grid().num_active_voxels()
    );
    result
}

/// Builds the field of a dynamic part in its own frame.
pub fn build_dynamic_field<M: KinematicModel + ?Sized>(
    model: &M,
    part: &ClassifiedPart,
    params: &FieldParams,
) -> PartField {
    let mut result = PartField::empty(part, params.voxel_size, params.background);
    let _ = result.field.insert_part_shapes(
        &part.name,
        model.collision_shapes(part.part),
        &Isometry::identity(),
        params.exterior_band,
        params.interior_band,
    );

    log::debug!(
        "Built dynamic field of {} with {} voxels.",
        part.name,
        result.field.grid().num_active_voxels()
    );
    result
}

/// Builds the field and the sphere set of an active part in its own frame.
///
/// The field is first built at the nominal voxel size. As long as `packer` returns at most
/// one sphere, the field is rebuilt at half the previous voxel size, with truncation bands
/// scaled so their physical width stays the same, for at most `options.max_attempts`
/// attempts in total. If every attempt is degenerate, the last field and sphere set are
/// kept and the part is flagged as `degenerate`.
///
/// Parts without any closed shape (e.g. only open meshes) can never get an interior, so
/// they are built once at the nominal voxel size. Halving also stops early once some shape
/// that could be voxelized at the nominal voxel size no longer can (typically because it
/// would cover too many voxels). The previous attempt is kept instead, so the part never
/// ends up with fewer shapes than at the nominal resolution.
pub fn build_active_field<M: KinematicModel + ?Sized>(
    model: &M,
    part: &ClassifiedPart,
    params: &FieldParams,
    packer: &dyn SpherePacker,
    options: &SpherePackingOptions,
) -> PartField {
    let shapes = model.collision_shapes(part.part);
    let max_attempts = if shapes.iter().any(|shape| encloses_volume(&shape.shape)) {
        options.max_attempts.max(1)
    } else {
        1
    };
    let mut voxel_size = params.voxel_size;
    let mut attempt = 1;
    let mut nominal_inserted = None;
    let mut previous: Option<PartField> = None;

    loop {
        let ratio = params.voxel_size / voxel_size;
        let mut result = PartField::empty(part, voxel_size, params.background);
        let num_inserted = result.field.insert_part_shapes(
            &part.name,
            shapes,
            &Isometry::identity(),
            params.exterior_band * ratio,
            params.interior_band * ratio,
        );

        if num_inserted < *nominal_inserted.get_or_insert(num_inserted) {
            if let Some(mut coarser) = previous.take() {
                log::warn!(
                    "Sphere packing of {} stayed degenerate ({} sphere(s)); stopping at voxel size {} since finer voxels drop some of its shapes.",
                    part.name,
                    coarser.spheres.len(),
                    coarser.field.voxel_size()
                );
                coarser.degenerate = true;
                return coarser;
            }
        }

        result.spheres = packer.pack(&result.field, options);

        if result.spheres.len() > 1 {
            log::debug!(
                "Built active field of {} at voxel size {} with {} spheres after {} attempt(s).",
                part.name,
                voxel_size,
                result.spheres.len(),
                attempt
            );
            return result;
        }

        if attempt >= max_attempts {
            log::warn!(
                "Sphere packing of {} stayed degenerate ({} sphere(s)) after {} attempts, down to voxel size {}.",
                part.name,
                result.spheres.len(),
                max_attempts,
                voxel_size
            );
            result.degenerate = true;
            return result;
        }

        previous = Some(result);
        attempt += 1;
        voxel_size *= 0.5;
    }
}
