//! Sparse signed distance fields and their sphere approximations.

pub use self::field_accessor::FieldAccessor;
pub use self::sparse_grid::SparseGrid;
pub use self::sphere_packing::{SpherePacker, SpherePackingOptions, VolumeSpherePacker};
pub use self::volume_error::VolumeError;
pub use self::volumetric_field::VolumetricField;
pub use self::voxelization::{encloses_volume, voxelize_shape, MAX_VOXELS_PER_SHAPE};

mod field_accessor;
pub(crate) mod sparse_grid;
mod sphere_packing;
mod volume_error;
mod volumetric_field;
mod voxelization;
