//! Entity structs (database rows) and DTOs (request payloads).
//!
//! Entities derive `FromRow` + `Serialize`; Create/Update DTOs derive
//! `Deserialize`. Update DTOs use `Option<Option<T>>` for nullable columns
//! so partial updates can distinguish "omitted" from "explicitly null".

pub mod attachment;
pub mod invitation;
pub mod member;
pub mod membership;
pub mod relationship;
pub mod tree;

/// Deserializer for `Option<Option<T>>` fields: a present-but-null value
/// becomes `Some(None)` (clear the column) while an omitted field stays
/// `None` (leave unchanged) via `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
