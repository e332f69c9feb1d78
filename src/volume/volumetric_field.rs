use crate::math::{Isometry, Point, Real, UnitVector, Vector};
use crate::shape::PartShape;
use crate::volume::{voxelize_shape, FieldAccessor, SparseGrid, VolumeError};
use na::Unit;

/// A truncated signed distance field sampled on a sparse voxel grid.
///
/// The field lives in its own local frame: the voxel with integer key `ijk` is centered at
/// `ijk * voxel_size`. Points are mapped to the nearest voxel center before being looked up.
/// Everything outside of the narrow band around the inserted shapes reads as the field's
/// `background` value, meaning "no information, assume far".
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VolumetricField {
    grid: SparseGrid,
    voxel_size: Real,
}

impl VolumetricField {
    /// Creates an empty field.
    pub fn new(voxel_size: Real, background: Real) -> Self {
        Self {
            grid: SparseGrid::new(background),
            voxel_size,
        }
    }

    /// The edge length of the voxels of this field.
    #[inline]
    pub fn voxel_size(&self) -> Real {
        self.voxel_size
    }

    /// The value returned for any point without distance information.
    #[inline]
    pub fn background(&self) -> Real {
        self.grid.background()
    }

    /// Is `value` this field's background value?
    #[inline]
    pub fn is_background(&self, value: Real) -> bool {
        relative_eq!(value, self.background())
    }

    /// Does this field contain any shape at all?
    ///
    /// An empty field behaves as if everything was infinitely far.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// The underlying sparse grid.
    pub fn grid(&self) -> &SparseGrid {
        &self.grid
    }

    /// The key of the voxel whose center is the closest to `pt`, expressed in the field frame.
    #[inline]
    pub fn world_to_index(&self, pt: &Point<Real>) -> Point<i32> {
        pt.map(|e| (e / self.voxel_size).round() as i32)
    }

    /// The center of the voxel with the given key, expressed in the field frame.
    #[inline]
    pub fn index_to_world(&self, voxel_key: &Point<i32>) -> Point<Real> {
        voxel_key.cast::<Real>() * self.voxel_size
    }

    /// Inserts a shape located at `pose` into this field.
    ///
    /// The shape is voxelized into a provisional field with the same voxel size and background,
    /// truncated at `exterior_band` voxels outside and `interior_band` voxels inside its
    /// surface. If this field already contains something, both are merged with a CSG union
    /// (the smallest distance is kept at each voxel). Otherwise the provisional field simply
    /// becomes the content of `self`.
    pub fn insert_shape(
        &mut self,
        shape: &PartShape,
        pose: &Isometry<Real>,
        exterior_band: Real,
        interior_band: Real,
    ) -> Result<(), VolumeError> {
        let shape_pose = pose * shape.pose;
        let grid = voxelize_shape(
            &shape.shape,
            &shape_pose,
            self.voxel_size,
            self.background(),
            exterior_band,
            interior_band,
        )?;

        if self.grid.is_empty() {
            self.grid = grid;
        } else {
            log::debug!(
                "Merging a {} with {} chunks into a field with {} chunks.",
                shape.shape.kind_name(),
                grid.num_chunks(),
                self.grid.num_chunks()
            );
            self.grid.union(&grid);
        }

        Ok(())
    }

    /// Inserts all the shapes of a part located at `pose` into this field.
    ///
    /// Shapes that fail to be voxelized are skipped and logged. Returns the number of
    /// shapes successfully inserted.
    pub fn insert_part_shapes(
        &mut self,
        part_name: &str,
        shapes: &[PartShape],
        pose: &Isometry<Real>,
        exterior_band: Real,
        interior_band: Real,
    ) -> usize {
        let mut num_inserted = 0;

        for shape in shapes {
            match self.insert_shape(shape, pose, exterior_band, interior_band) {
                Ok(()) => num_inserted += 1,
                Err(err) => log::error!(
                    "Skipping a {} of part {}: {}",
                    shape.shape.kind_name(),
                    part_name,
                    err
                ),
            }
        }

        num_inserted
    }

    /// Merges the content of `other` into `self` with a CSG union.
    pub fn union(&mut self, other: &VolumetricField) {
        self.grid.union(&other.grid);
    }

    /// The distance stored at the given voxel.
    ///
    /// This is a fresh re-entrant lookup, safe for concurrent callers.
    #[inline]
    pub fn distance_at(&self, voxel_key: Point<i32>) -> Real {
        self.grid.value(voxel_key)
    }

    /// The signed distance at the voxel center closest to `pt` (expressed in the field frame).
    ///
    /// This is a fresh re-entrant lookup, safe for concurrent callers. Use a
    /// [`FieldAccessor`] for many sequential lookups from a single thread.
    pub fn distance(&self, pt: &Point<Real>) -> Real {
        self.distance_at(self.world_to_index(pt))
    }

    /// The raw central-difference gradient at the given voxel, in distance units per voxel.
    pub fn index_gradient_at(&self, voxel_key: Point<i32>) -> Vector<Real> {
        let mut result = Vector::<Real>::zeros();

        for i in 0..3 {
            let mut shift = Vector::<i32>::zeros();
            shift[i] = 1;
            result[i] = (self.grid.value(voxel_key + shift) - self.grid.value(voxel_key - shift))
                * 0.5;
        }

        result
    }

    /// The normalized gradient of the distance at the given voxel.
    ///
    /// Returns `None` if the gradient is zero, i.e., if its direction is undefined.
    pub fn gradient_at(&self, voxel_key: Point<i32>) -> Option<UnitVector<Real>> {
        let gradient = self.index_gradient_at(voxel_key) / self.voxel_size;
        Unit::try_new(gradient, 0.0)
    }

    /// The normalized gradient of the distance at the voxel center closest to `pt`.
    ///
    /// This is computed with central differences and fresh lookups, so it is safe for
    /// concurrent callers. Returns `None` if the gradient is zero.
    pub fn gradient(&self, pt: &Point<Real>) -> Option<UnitVector<Real>> {
        self.gradient_at(self.world_to_index(pt))
    }

    /// A cached accessor for fast sequential lookups on this field.
    pub fn accessor(&self) -> FieldAccessor<'_> {
        FieldAccessor::new(self)
    }

    /// The centers of all the voxels with distance information, split between the ones inside
    /// (negative distance) and outside (non-negative distance) of the shapes.
    ///
    /// The points are transformed by `pose` if it is provided.
    pub fn inside_outside_points(
        &self,
        pose: Option<&Isometry<Real>>,
    ) -> (Vec<Point<Real>>, Vec<Point<Real>>) {
        let mut inside = Vec::new();
        let mut outside = Vec::new();

        for (key, value) in self.grid.active_voxels() {
            let local = self.index_to_world(&key);
            let pt = pose.map(|pose| pose * local).unwrap_or(local);

            if value < 0.0 {
                inside.push(pt);
            } else {
                outside.push(pt);
            }
        }

        (inside, outside)
    }

    /// An approximation of the memory usage (in bytes) of this field.
    pub fn memory_footprint(&self) -> usize {
        size_of::<Self>() + self.grid.heap_memory_size()
    }
}
