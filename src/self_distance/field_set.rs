use crate::math::Real;
use crate::self_distance::{FieldParams, PartField};

/// The scalar parameters shared by all the fields of a [`FieldSet`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldMetadata {
    /// The nominal voxel size.
    pub voxel_size: Real,
    /// The background distance.
    pub background: Real,
    /// The nominal exterior truncation band, in voxels.
    pub exterior_band: Real,
    /// The nominal interior truncation band, in voxels.
    pub interior_band: Real,
}

impl From<FieldParams> for FieldMetadata {
    fn from(params: FieldParams) -> Self {
        Self {
            voxel_size: params.voxel_size,
            background: params.background,
            exterior_band: params.exterior_band,
            interior_band: params.interior_band,
        }
    }
}

impl From<FieldMetadata> for FieldParams {
    fn from(metadata: FieldMetadata) -> Self {
        Self {
            voxel_size: metadata.voxel_size,
            background: metadata.background,
            exterior_band: metadata.exterior_band,
            interior_band: metadata.interior_band,
        }
    }
}

/// Every field built by a self-distance engine, ready to be archived.
///
/// Reading and writing archives is left to the caller: with the `serde-serialize` feature
/// enabled, this can be serialized with any serde format.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSet {
    /// The parameters the fields were built with.
    pub metadata: FieldMetadata,
    /// The fields, with their part name, class and sphere set.
    pub fields: Vec<PartField>,
}

impl FieldSet {
    /// The field of the part named `name`.
    pub fn get(&self, name: &str) -> Option<&PartField> {
        self.fields.iter().find(|field| field.name == name)
    }
}
