//! Self-distance queries between the parts of an articulated body.

pub use self::distance_result::{DistanceResult, PartDistance};
pub use self::field_builder::{
    build_active_field, build_dynamic_field, build_static_field, PartField,
};
pub use self::field_params::{DistanceRequest, FieldParams};
pub use self::field_set::{FieldMetadata, FieldSet};
pub use self::link_classifier::{ClassifiedPart, MobilityClass, PartClassification};
pub use self::query_plan::{is_query_required, CandidateChild, DistanceQueryPlan};
pub use self::self_distance_engine::SelfDistanceEngine;
pub use self::self_distance_error::SelfDistanceError;

mod distance_result;
mod field_builder;
mod field_params;
mod field_set;
mod link_classifier;
mod query_plan;
mod self_distance_engine;
mod self_distance_error;
