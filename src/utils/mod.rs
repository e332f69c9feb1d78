//! Various unsorted logical operators.

pub use self::sorted_pair::SortedPair;

#[cfg(feature = "serde-serialize")]
pub(crate) mod hashmap_entries;
mod sorted_pair;
