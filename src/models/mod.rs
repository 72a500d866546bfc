use serde::{Deserialize, Deserializer};

pub mod completion;
pub mod habit;
pub mod mood;

/// Tells an explicit `null` apart from a missing field in partial updates.
/// Pair with `#[serde(default)]`: missing is `None`, `null` is `Some(None)`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
