use crate::utils::SortedPair;
use hashbrown::HashMap;

/// The collision policy between two parts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum AllowedCollision {
    /// The pair must always be checked.
    Never,
    /// The pair may always be ignored.
    Always,
}

/// A symmetric pairwise collision policy, borrowed read-only by the self-distance engine.
pub trait AllowList {
    /// The policy registered for the unordered pair `(a, b)`, if any.
    ///
    /// Implementations must return the same answer for `(a, b)` and `(b, a)`.
    fn lookup(&self, a: &str, b: &str) -> Option<AllowedCollision>;
}

/// An allow-list stored as a symmetric matrix of part name pairs.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct AllowedCollisionMatrix {
    #[cfg_attr(
        feature = "serde-serialize",
        serde(with = "crate::utils::hashmap_entries")
    )]
    entries: HashMap<SortedPair<String>, AllowedCollision>,
}

impl AllowedCollisionMatrix {
    /// An empty matrix: every pair must be checked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the usual default policy of a model.
    ///
    /// Every pair of `parts` is set to [`AllowedCollision::Never`], then every pair of
    /// `disabled` is set to [`AllowedCollision::Always`].
    pub fn from_disabled_pairs<'a>(
        parts: impl IntoIterator<Item = &'a str>,
        disabled: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut result = Self::new();
        let parts: Vec<_> = parts.into_iter().collect();

        for (i, a) in parts.iter().enumerate() {
            for b in &parts[i + 1..] {
                result.set_entry(a, b, AllowedCollision::Never);
            }
        }

        for (a, b) in disabled {
            result.set_entry(a, b, AllowedCollision::Always);
        }

        result
    }

    /// Sets the policy of the pair `(a, b)`.
    pub fn set_entry(&mut self, a: &str, b: &str, allowed: AllowedCollision) {
        let _ = self
            .entries
            .insert(SortedPair::new(a.to_string(), b.to_string()), allowed);
    }

    /// Sets the policy of every pair made of `part` and one of `others`.
    pub fn set_entries<'a>(
        &mut self,
        part: &str,
        others: impl IntoIterator<Item = &'a str>,
        allowed: AllowedCollision,
    ) {
        for other in others {
            self.set_entry(part, other, allowed);
        }
    }

    /// Removes the policy of the pair `(a, b)`, returning it if it existed.
    pub fn remove_entry(&mut self, a: &str, b: &str) -> Option<AllowedCollision> {
        self.entries
            .remove(&SortedPair::new(a.to_string(), b.to_string()))
    }

    /// The number of pairs with an explicit policy.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Does this matrix have no entry at all?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AllowList for AllowedCollisionMatrix {
    fn lookup(&self, a: &str, b: &str) -> Option<AllowedCollision> {
        self.entries
            .get(&SortedPair::new(a.to_string(), b.to_string()))
            .copied()
    }
}
