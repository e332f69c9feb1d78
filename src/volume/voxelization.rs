//! Conversion of collision shapes into truncated signed distance grids.

use crate::math::{Isometry, Point, Real, Vector};
use crate::shape::CollisionShape;
use crate::volume::sparse_grid::GridChunk;
use crate::volume::{SparseGrid, VolumeError};
use parry3d::bounding_volume::BoundingVolume;
use parry3d::shape::{Ball, Cone, Cuboid, Cylinder, Shape, TriMesh, TriMeshFlags};

/// The largest number of voxels a single shape may sweep while being voxelized.
pub const MAX_VOXELS_PER_SHAPE: u64 = 1 << 24;

/// A collision shape converted into a parry shape, ready for signed distance evaluation.
struct ShapeSampler {
    shape: Box<dyn Shape>,
    // The pose of the parry shape, which differs from the collision shape pose for
    // `z`-aligned primitives since parry aligns them with `y`.
    pose: Isometry<Real>,
    signed: bool,
}

impl ShapeSampler {
    fn new(shape: &CollisionShape, pose: &Isometry<Real>) -> Result<Self, VolumeError> {
        let y_to_z = Isometry::rotation(Vector::x() * std::f32::consts::FRAC_PI_2);

        match shape {
            CollisionShape::Box { size } => {
                if !size.iter().all(|e| e.is_finite() && *e > 0.0) {
                    return Err(VolumeError::UnsupportedShape(format!(
                        "box with invalid size {:?}",
                        size
                    )));
                }
                Ok(Self {
                    shape: Box::new(Cuboid::new(size.abs() / 2.0)),
                    pose: *pose,
                    signed: true,
                })
            }
            CollisionShape::Sphere { radius } => {
                check_positive("sphere radius", *radius)?;
                Ok(Self {
                    shape: Box::new(Ball::new(*radius)),
                    pose: *pose,
                    signed: true,
                })
            }
            CollisionShape::Cylinder { radius, length } => {
                check_positive("cylinder radius", *radius)?;
                check_positive("cylinder length", *length)?;
                Ok(Self {
                    shape: Box::new(Cylinder::new(*length / 2.0, *radius)),
                    pose: pose * y_to_z,
                    signed: true,
                })
            }
            CollisionShape::Cone { radius, length } => {
                check_positive("cone radius", *radius)?;
                check_positive("cone length", *length)?;
                Ok(Self {
                    shape: Box::new(Cone::new(*length / 2.0, *radius)),
                    pose: pose * y_to_z,
                    signed: true,
                })
            }
            CollisionShape::Mesh { vertices, indices } => {
                if indices.is_empty() {
                    return Err(VolumeError::UnsupportedShape(
                        "mesh without any triangle".to_string(),
                    ));
                }

                let num_vertices = vertices.len() as u32;
                if let Some(bad) = indices.iter().flatten().find(|i| **i >= num_vertices) {
                    return Err(VolumeError::UnsupportedShape(format!(
                        "mesh index {} out of bounds ({} vertices)",
                        bad, num_vertices
                    )));
                }

                let closed = TriMesh::with_flags(
                    vertices.clone(),
                    indices.clone(),
                    TriMeshFlags::ORIENTED
                        | TriMeshFlags::HALF_EDGE_TOPOLOGY
                        | TriMeshFlags::MERGE_DUPLICATE_VERTICES,
                );

                let (mesh, signed) = match closed {
                    Ok(mesh) if has_no_boundary(&mesh) => (mesh, true),
                    result => {
                        let reason = match result {
                            Ok(_) => "it has boundary edges".to_string(),
                            Err(err) => err.to_string(),
                        };
                        log::warn!(
                            "Mesh is not a closed oriented surface ({}), its interior will not be filled.",
                            reason
                        );
                        let mesh = TriMesh::with_flags(
                            vertices.clone(),
                            indices.clone(),
                            TriMeshFlags::MERGE_DUPLICATE_VERTICES,
                        )
                        .map_err(|e| VolumeError::UnsupportedShape(format!("mesh: {}", e)))?;
                        (mesh, false)
                    }
                };

                Ok(Self {
                    shape: Box::new(mesh),
                    pose: *pose,
                    signed,
                })
            }
        }
    }

    fn signed_distance(&self, pt: &Point<Real>) -> Real {
        let proj = self.shape.project_point(&self.pose, pt, false);
        let dist = na::distance(pt, &proj.point);

        if dist.is_finite() {
            return if self.signed && proj.is_inside {
                -dist
            } else {
                dist
            };
        }

        // The projection is undefined at the center of a ball.
        let dist = self.shape.distance_to_point(&self.pose, pt, false).abs();
        if self.signed && self.shape.contains_point(&self.pose, pt) {
            -dist
        } else {
            dist
        }
    }
}

fn has_no_boundary(mesh: &TriMesh) -> bool {
    mesh.topology()
        .is_some_and(|topology| topology.half_edges.iter().all(|he| he.twin != u32::MAX))
}

fn check_positive(what: &str, value: Real) -> Result<(), VolumeError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(VolumeError::UnsupportedShape(format!(
            "{} must be positive, got {}",
            what, value
        )))
    }
}

/// Does `shape` bound a solid region, i.e., can its field have an interior at all?
///
/// Primitives always do. Meshes only do if they are closed and consistently oriented.
pub fn encloses_volume(shape: &CollisionShape) -> bool {
    match shape {
        CollisionShape::Mesh { .. } => {
            ShapeSampler::new(shape, &Isometry::identity()).is_ok_and(|sampler| sampler.signed)
        }
        _ => true,
    }
}

/// Voxelizes `shape` located at `pose` into a new narrow-band signed distance grid.
///
/// The voxel with key `ijk` is centered at `ijk * voxel_size` in the frame `pose` is expressed
/// in. Distances are kept within `[-interior_band, exterior_band]` voxels of the surface:
/// voxels further outside are left to the background, voxels deeper inside are clamped to
/// `-interior_band * voxel_size`. Values are always strictly smaller than `background`.
///
/// The bounding box of the shape is split recursively into blocks of chunks. A block is only
/// sampled voxel by voxel once it is a single chunk that may cross the band, so blocks far
/// outside are skipped and blocks deep inside are filled at once.
pub fn voxelize_shape(
    shape: &CollisionShape,
    pose: &Isometry<Real>,
    voxel_size: Real,
    background: Real,
    exterior_band: Real,
    interior_band: Real,
) -> Result<SparseGrid, VolumeError> {
    if !(voxel_size.is_finite() && voxel_size > 0.0) {
        return Err(VolumeError::InvalidVoxelSize(voxel_size));
    }
    if !(exterior_band.is_finite() && exterior_band >= 0.0) || !(interior_band >= 0.0) {
        return Err(VolumeError::InvalidBand);
    }

    let sampler = ShapeSampler::new(shape, pose)?;
    let exterior_width = exterior_band * voxel_size;
    let interior_width = interior_band * voxel_size;

    let aabb = sampler
        .shape
        .compute_aabb(&sampler.pose)
        .loosened(exterior_width);
    let imins: Point<i32> = aabb.mins.map(|e| (e / voxel_size).ceil() as i32);
    let imaxs: Point<i32> = aabb.maxs.map(|e| (e / voxel_size).floor() as i32);

    let extents = (imaxs - imins).map(|e| (e.max(-1) + 1) as u64);
    let num_voxels = extents
        .x
        .saturating_mul(extents.y)
        .saturating_mul(extents.z);
    if num_voxels > MAX_VOXELS_PER_SHAPE {
        return Err(VolumeError::TooManyVoxels(num_voxels));
    }

    let mut grid = SparseGrid::new(background);
    if num_voxels == 0 {
        return Ok(grid);
    }

    let chunk_dim = GridChunk::VOXELS_PER_CHUNK_DIM as i32;
    let mut stack = vec![(
        SparseGrid::voxel_to_chunk_key(imins),
        SparseGrid::voxel_to_chunk_key(imaxs),
    )];

    while let Some((cmins, cmaxs)) = stack.pop() {
        let vmins = (cmins * chunk_dim).cast::<Real>();
        let vmaxs = (cmaxs * chunk_dim).cast::<Real>() + Vector::repeat((chunk_dim - 1) as Real);
        let center = na::center(&vmins, &vmaxs) * voxel_size;
        let radius = (vmaxs - vmins).norm() * 0.5 * voxel_size;
        let dist = sampler.signed_distance(&center);

        if dist - radius > exterior_width || dist - radius >= background {
            continue;
        }

        if sampler.signed && dist + radius < -interior_width {
            for k in cmins.z..=cmaxs.z {
                for j in cmins.y..=cmaxs.y {
                    for i in cmins.x..=cmaxs.x {
                        grid.insert_chunk(
                            Point::new(i, j, k),
                            GridChunk::filled(-interior_width),
                        );
                    }
                }
            }
            continue;
        }

        if cmins == cmaxs {
            let mut chunk = GridChunk::filled(background);
            let mut in_band = false;

            for (id, value) in chunk.values.iter_mut().enumerate() {
                let key = GridChunk::voxel_key_at_id(cmins, id);
                let dist = sampler.signed_distance(&(key.cast::<Real>() * voxel_size));

                if !dist.is_finite() || dist > exterior_width || dist >= background {
                    continue;
                }

                *value = dist.max(-interior_width);
                in_band = true;
            }

            if in_band {
                grid.insert_chunk(cmins, chunk);
            }
            continue;
        }

        let axis = (cmaxs - cmins).imax();
        let mid = cmins[axis] + (cmaxs[axis] - cmins[axis]) / 2;
        let mut lower_maxs = cmaxs;
        let mut upper_mins = cmins;
        lower_maxs[axis] = mid;
        upper_mins[axis] = mid + 1;
        stack.push((cmins, lower_maxs));
        stack.push((upper_mins, cmaxs));
    }

    Ok(grid)
}
