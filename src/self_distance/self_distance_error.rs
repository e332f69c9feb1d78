use crate::self_distance::MobilityClass;

/// Errors raised while building or querying a [`SelfDistanceEngine`](crate::self_distance::SelfDistanceEngine).
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum SelfDistanceError {
    /// The requested joint group does not exist in the kinematic model.
    #[error("unknown joint group `{0}`")]
    UnknownJointGroup(String),
    /// The field parameters are invalid.
    #[error("invalid field parameters: {0}")]
    InvalidParams(String),
    /// A classified part has no matching field in a field set.
    #[error("no field found for part `{0}`")]
    MissingField(String),
    /// A field of a field set was built for a different mobility class than its part.
    #[error("the field of part `{part}` was built as {found:?} but the part is {expected:?}")]
    ClassMismatch {
        /// The name of the part.
        part: String,
        /// The class the part is classified as.
        expected: MobilityClass,
        /// The class recorded in the field set.
        found: MobilityClass,
    },
}
