use crate::math::Real;
use crate::self_distance::SelfDistanceError;

/// Nominal parameters of every field built by the self-distance engine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldParams {
    /// The nominal edge length of the voxels.
    pub voxel_size: Real,
    /// The distance reported where a field holds no information.
    pub background: Real,
    /// The truncation band outside of the shapes, in voxels.
    pub exterior_band: Real,
    /// The truncation band inside of the shapes, in voxels.
    pub interior_band: Real,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            voxel_size: 0.02,
            background: 0.5,
            exterior_band: 3.0,
            interior_band: 3.0,
        }
    }
}

impl FieldParams {
    /// Checks that these parameters can be used to build fields.
    pub fn validate(&self) -> Result<(), SelfDistanceError> {
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(SelfDistanceError::InvalidParams(format!(
                "the voxel size must be positive and finite, got {}",
                self.voxel_size
            )));
        }

        if !(self.background.is_finite() && self.background > 0.0) {
            return Err(SelfDistanceError::InvalidParams(format!(
                "the background distance must be positive and finite, got {}",
                self.background
            )));
        }

        if !(self.exterior_band.is_finite() && self.exterior_band >= 0.0)
            || !(self.interior_band >= 0.0)
        {
            return Err(SelfDistanceError::InvalidParams(format!(
                "invalid truncation bands ({}, {})",
                self.exterior_band, self.interior_band
            )));
        }

        Ok(())
    }
}

/// A self-distance request.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceRequest {
    /// The joint group the request is issued for. It must exist in the kinematic model.
    pub group_name: String,
    /// Should the avoidance gradients be computed?
    pub gradient: bool,
}

impl DistanceRequest {
    /// A request for the given group.
    pub fn new(group_name: impl Into<String>, gradient: bool) -> Self {
        Self {
            group_name: group_name.into(),
            gradient,
        }
    }
}
