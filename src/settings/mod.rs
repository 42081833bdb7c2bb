//! Layered settings loading and merging
//!
//! Implements the base-plus-overlays merge: `appsettings.json` is the base
//! layer, every `appsettings.*.json` in the project directory is an overlay
//! applied on top in lexicographic filename order.

mod effective;
mod merge;

pub use effective::{EffectiveSettings, SettingsError, SettingsOrigin, SettingsSource};
pub use merge::deep_merge;
