//! Approximation of the solid region of a distance field with a set of spheres.

use crate::math::{Point, Real};
use crate::volume::VolumetricField;
use ordered_float::OrderedFloat;
use parry3d::bounding_volume::BoundingSphere;

/// Parameters of a sphere packing.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct SpherePackingOptions {
    /// The maximum number of spheres to generate.
    pub max_spheres: usize,
    /// Can the generated spheres overlap each other?
    pub allow_overlap: bool,
    /// The smallest allowed sphere radius, in voxel units.
    pub min_radius: Real,
    /// The largest allowed sphere radius, in voxel units.
    pub max_radius: Real,
    /// The distance value at which the surface of the solid is located.
    pub iso_level: Real,
    /// The maximum number of interior voxels used as candidate sphere centers.
    pub sample_count: usize,
    /// The number of resolutions tried by the field builder before giving up on a part.
    ///
    /// Each new attempt halves the voxel size of the previous one.
    pub max_attempts: usize,
}

impl Default for SpherePackingOptions {
    fn default() -> Self {
        Self {
            max_spheres: 20,
            allow_overlap: true,
            min_radius: 1.0,
            max_radius: Real::MAX,
            iso_level: 0.0,
            sample_count: 100_000,
            max_attempts: 10,
        }
    }
}

/// An algorithm approximating the solid region of a field with spheres.
pub trait SpherePacker {
    /// Fits spheres inside of the region of `field` with a distance smaller than
    /// `options.iso_level`.
    ///
    /// The sphere centers are expressed in the local frame of the field, and their radii in
    /// world units. Returns an empty set if the field has no solid interior.
    fn pack(&self, field: &VolumetricField, options: &SpherePackingOptions) -> Vec<BoundingSphere>;
}

/// Greedy sphere packing seeded from the interior voxels of the field.
///
/// Every interior voxel center is a candidate sphere center whose radius is its distance to
/// the iso-surface. The largest candidate is selected repeatedly; after each selection the
/// remaining candidates are either discarded if their center is closer to the new sphere's
/// center than half its radius (overlapping mode) or shrunk so they do not intersect it.
#[derive(Copy, Clone, Debug, Default)]
pub struct VolumeSpherePacker;

// In overlapping mode, the smallest distance between two sphere centers, relative to the
// radius of the sphere selected first.
const MIN_CENTER_SEPARATION: Real = 0.5;

struct Candidate {
    center: Point<Real>,
    radius: Real,
}

impl SpherePacker for VolumeSpherePacker {
    fn pack(&self, field: &VolumetricField, options: &SpherePackingOptions) -> Vec<BoundingSphere> {
        let min_radius = options.min_radius * field.voxel_size();
        let max_radius = options.max_radius * field.voxel_size();

        let mut candidates: Vec<_> = field
            .grid()
            .active_voxels()
            .filter(|(_, value)| *value < options.iso_level)
            .map(|(key, value)| Candidate {
                center: field.index_to_world(&key),
                radius: (options.iso_level - value).min(max_radius),
            })
            .filter(|candidate| candidate.radius >= min_radius)
            .collect();

        if options.sample_count > 0 && candidates.len() > options.sample_count {
            let stride = candidates.len().div_ceil(options.sample_count);
            candidates = candidates.into_iter().step_by(stride).collect();
        }

        let mut spheres = Vec::new();

        while spheres.len() < options.max_spheres {
            let Some(best) = candidates
                .iter()
                .enumerate()
                .filter(|(_, candidate)| candidate.radius >= min_radius)
                .max_by_key(|(_, candidate)| OrderedFloat(candidate.radius))
                .map(|(id, _)| id)
            else {
                break;
            };

            let sphere = BoundingSphere::new(candidates[best].center, candidates[best].radius);
            spheres.push(sphere);

            for candidate in &mut candidates {
                let dist = na::distance(&candidate.center, &sphere.center);

                if options.allow_overlap {
                    if dist < sphere.radius * MIN_CENTER_SEPARATION {
                        candidate.radius = -1.0;
                    }
                } else {
                    candidate.radius = candidate.radius.min(dist - sphere.radius);
                }
            }
        }

        spheres
    }
}
