//! Build configuration steps.
//!
//! This module resolves compiler and linker flags, writes the shim
//! translation units and emits the makefile.

pub mod makefile;
pub mod resolve;
pub mod shim;

pub use makefile::{emit_build_descriptor, render_makefile, MAKEFILE_NAME};
pub use resolve::{resolve_flags, FlagResolver, ProbeMode, Resolution, ResolveOptions};
pub use shim::{
    materialize_shims, plan_shims, preview_shims, shim_name, MaterializedShim, ShimFile, ShimStatus,
};
