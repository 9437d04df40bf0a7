//! Small helpers shared by every crate in the COD workspace.
pub mod helpers;
mod secret;

pub use helpers::{clean_id, env_value_or, normalize_text, strip_accents};
pub use secret::Secret;
