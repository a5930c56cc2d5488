use serde::{Deserialize, Deserializer};

pub mod lesson_class;
pub mod pairing;
pub mod player;
pub mod ranking;
pub mod round;
pub mod search;

/// Tells a present `null` apart from a missing field on update requests:
/// missing stays `None` through `#[serde(default)]`, `null` becomes
/// `Some(None)`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
