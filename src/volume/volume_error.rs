use crate::math::Real;

/// Errors raised while inserting a shape into a [`VolumetricField`](crate::volume::VolumetricField).
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum VolumeError {
    /// The shape cannot be converted into a volume.
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),
    /// The truncation bands are negative, NaN, or the exterior band is infinite.
    #[error("the truncation bands must be non-negative and the exterior band finite")]
    InvalidBand,
    /// The voxel size is not a strictly positive finite number.
    #[error("invalid voxel size: {0}")]
    InvalidVoxelSize(Real),
    /// The shape would sweep more voxels than allowed.
    #[error("the shape would cover {0} voxels, which exceeds the voxelization limit")]
    TooManyVoxels(u64),
}
