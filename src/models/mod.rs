pub mod auth;
pub mod category;
pub mod project;
pub mod section;
pub mod tag;
pub mod task;
pub mod user;

use serde::{Deserialize, Deserializer};

/// Deserializer for patch fields where `null` and "absent" mean different things.
///
/// Use together with `#[serde(default)]`: a missing key stays `None`, an explicit
/// `null` becomes `Some(None)`, and a value becomes `Some(Some(v))`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a tri-state patch value onto a nullable column.
pub fn apply_nullable<T: Clone>(target: &mut Option<T>, patch: &Option<Option<T>>) {
    if let Some(value) = patch {
        *target = value.clone();
    }
}
