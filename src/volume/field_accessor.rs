use crate::math::{Point, Real, UnitVector, Vector};
use crate::volume::sparse_grid::GridChunk;
use crate::volume::{SparseGrid, VolumetricField};
use na::Unit;

/// A scoped accessor caching the last chunk visited on a [`VolumetricField`].
///
/// Consecutive lookups of nearby voxels (the six neighbors of a gradient stencil, or the
/// spheres of a single part) mostly hit the same chunk, which avoids a hash-map lookup per
/// voxel. The accessor holds mutable cache state: it belongs to a single caller for the
/// duration of one query. Concurrent callers must each create their own, or use the
/// re-entrant lookups of [`VolumetricField`] directly.
pub struct FieldAccessor<'a> {
    field: &'a VolumetricField,
    cached_key: Point<i32>,
    cached_chunk: Option<Option<&'a GridChunk>>,
}

impl<'a> FieldAccessor<'a> {
    /// Creates an accessor with an empty cache.
    pub fn new(field: &'a VolumetricField) -> Self {
        Self {
            field,
            cached_key: Point::origin(),
            cached_chunk: None,
        }
    }

    /// The field this accessor reads from.
    pub fn field(&self) -> &'a VolumetricField {
        self.field
    }

    /// The distance stored at the given voxel.
    pub fn distance_at(&mut self, voxel_key: Point<i32>) -> Real {
        let (chunk_key, id_in_chunk) = SparseGrid::chunk_key_and_id_in_chunk(voxel_key);

        let chunk = match self.cached_chunk {
            Some(chunk) if self.cached_key == chunk_key => chunk,
            _ => {
                let chunk = self.field.grid().chunk(&chunk_key);
                self.cached_key = chunk_key;
                self.cached_chunk = Some(chunk);
                chunk
            }
        };

        chunk
            .map(|chunk| chunk.values[id_in_chunk])
            .unwrap_or_else(|| self.field.background())
    }

    /// The signed distance at the voxel center closest to `pt` (expressed in the field frame).
    pub fn distance(&mut self, pt: &Point<Real>) -> Real {
        let key = self.field.world_to_index(pt);
        self.distance_at(key)
    }

    /// The raw second-order central-difference gradient at the given voxel, in distance
    /// units per voxel.
    pub fn index_gradient_at(&mut self, voxel_key: Point<i32>) -> Vector<Real> {
        let dx = Vector::x();
        let dy = Vector::y();
        let dz = Vector::z();

        Vector::new(
            self.distance_at(voxel_key + dx) - self.distance_at(voxel_key - dx),
            self.distance_at(voxel_key + dy) - self.distance_at(voxel_key - dy),
            self.distance_at(voxel_key + dz) - self.distance_at(voxel_key - dz),
        ) * 0.5
    }

    /// The normalized gradient at the voxel center closest to `pt`.
    ///
    /// Returns `None` if the gradient is zero.
    pub fn gradient(&mut self, pt: &Point<Real>) -> Option<UnitVector<Real>> {
        let key = self.field.world_to_index(pt);
        Unit::try_new(self.index_gradient_at(key), 0.0)
    }
}
