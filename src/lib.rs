//! extconf - build configurator for the Gosu native extension
//!
//! This crate detects the host platform, selects the sources to compile,
//! probes the system libraries and writes a makefile plus one shim
//! translation unit per source.

pub mod builder;
pub mod core;
pub mod ops;
pub mod probe;
pub mod util;

/// Test utilities and mocks for extconf unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a table-driven `SystemProbe` and fixture
/// source trees.
#[cfg(test)]
pub mod test_support;

pub use core::{
    errors::ConfigureError, flags::FlagSet, platform::Platform, platform::PlatformProfile,
    source_set::SourceFileSet,
};

pub use probe::{HostProbe, SystemProbe};
pub use util::context::GlobalContext;
