use crate::kinematics::{AllowList, AllowedCollision};
use crate::self_distance::{MobilityClass, PartField};

/// Does the pair `(a, b)` need to be queried?
///
/// Only an explicit [`AllowedCollision::Always`] entry skips a pair. Missing entries, and a
/// missing allow-list, require the query.
pub fn is_query_required(a: &str, b: &str, allow_list: Option<&dyn AllowList>) -> bool {
    allow_list.and_then(|list| list.lookup(a, b)) != Some(AllowedCollision::Always)
}

/// A field an active part must be checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct CandidateChild {
    /// The name of the candidate part.
    pub name: String,
    /// The class of the candidate part.
    pub class: MobilityClass,
    /// The index of the candidate field among the fields of its class.
    pub index: usize,
}

/// The candidates an active part is checked against at each query.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceQueryPlan {
    /// The name of the active part.
    pub parent: String,
    /// The index of the active part among the active fields.
    pub parent_index: usize,
    /// The candidates, other active parts first, then dynamic and static parts.
    pub candidates: Vec<CandidateChild>,
}

impl DistanceQueryPlan {
    /// Builds the plan of the active part `parent_index`.
    ///
    /// The plan is left without candidates if the active part has no sphere: it cannot be
    /// queried at all.
    pub fn new(
        parent_index: usize,
        actives: &[PartField],
        dynamics: &[PartField],
        statics: &[PartField],
        allow_list: Option<&dyn AllowList>,
    ) -> Self {
        let parent = &actives[parent_index];
        let mut candidates = Vec::new();

        if !parent.spheres.is_empty() {
            let others = actives
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != parent_index)
                .chain(dynamics.iter().enumerate())
                .chain(statics.iter().enumerate());

            for (index, child) in others {
                if is_query_required(&child.name, &parent.name, allow_list) {
                    candidates.push(CandidateChild {
                        name: child.name.clone(),
                        class: child.class,
                        index,
                    });
                }
            }
        }

        Self {
            parent: parent.name.clone(),
            parent_index,
            candidates,
        }
    }

    /// Does this plan have no candidate at all?
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
