use crate::math::{Real, Vector};

/// The closest part to an active part.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PartDistance {
    /// The name of the active part.
    pub part: String,
    /// The name of the closest candidate, or `None` if no candidate was within its field's
    /// truncation band.
    pub nearest_part: Option<String>,
    /// The smallest surface-to-surface distance estimate, or the background distance if
    /// `nearest_part` is `None`.
    pub distance: Real,
    /// The unit direction, in world frame, in which the part should move to increase its
    /// distance to the nearby parts. Zero if `has_gradient` is `false`.
    pub gradient: Vector<Real>,
    /// Was a gradient computed?
    pub has_gradient: bool,
}

impl PartDistance {
    /// A result for `part` without any nearby candidate.
    pub fn far(part: impl Into<String>, background: Real) -> Self {
        Self {
            part: part.into(),
            nearest_part: None,
            distance: background,
            gradient: Vector::zeros(),
            has_gradient: false,
        }
    }
}

/// The result of a self-distance query: one entry per queried active part.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceResult {
    /// The per-part results, in active part order.
    pub parts: Vec<PartDistance>,
}

impl DistanceResult {
    /// The per-part result with the smallest distance.
    ///
    /// Ties are won by the first part in active part order. Returns `None` if no part was
    /// queried.
    pub fn minimum(&self) -> Option<&PartDistance> {
        let mut best = self.parts.first()?;

        for part in &self.parts[1..] {
            if part.distance < best.distance {
                best = part;
            }
        }

        Some(best)
    }

    /// The result of the active part named `part`.
    pub fn get(&self, part: &str) -> Option<&PartDistance> {
        self.parts.iter().find(|result| result.part == part)
    }

    /// Does this result have no entry?
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
