//! Core data model: platform profiles, source sets, flag sets and
//! dependency probe outcomes.

pub mod dependency;
pub mod errors;
pub mod flags;
pub mod platform;
pub mod source_set;

pub use dependency::{DependencyReport, ProbeMethod, ProbeOutcome, Requirement};
pub use errors::ConfigureError;
pub use flags::{Flag, FlagSet, FlagVar, RenderedFlags, ToolchainDefaults};
pub use platform::{Platform, PlatformProfile};
pub use source_set::{SourceFileSet, SourceLists};
