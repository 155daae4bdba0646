//! High-level operations.
//!
//! This module contains the implementation of extconf commands.

pub mod clean;
pub mod configure;
pub mod doctor;
pub mod flags;

pub use clean::{clean, generated_files};
pub use configure::{configure, print_intro, ConfigureOptions, ConfigureOutcome};
pub use doctor::{doctor, format_report, CheckResult, DoctorReport};
pub use flags::{format_flags, resolve_project_flags, FlagsOptions};
