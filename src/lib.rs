//! optionsgen - typed option classes from layered settings files
//!
//! This crate implements a development-time generator that merges a base
//! `appsettings.json` with its environment overlays, infers a schema from
//! the merged document, and emits a C# source file of closed POCO option
//! classes, eliminating hand-written configuration-binding types.

pub mod codegen;
pub mod generate;
pub mod locate;
pub mod schema;
pub mod settings;
pub mod toolconfig;

pub use generate::{generate, merged_settings, GenerateError, GenerateRequest, GeneratedUnit};
pub use settings::EffectiveSettings;
pub use toolconfig::ToolConfig;
