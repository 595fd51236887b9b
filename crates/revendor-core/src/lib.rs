//! Core logic for re-vendoring third-party dependency source trees.
//!
//! A re-vendoring run operates on two vendor roots (the plain "vendor" tree
//! and the locally "patched" tree): each is emptied, repopulated from a
//! pinned requirements list, has its internal imports rewritten to resolve
//! under a nested `.vendor` namespace, and finally gets license files
//! harvested from the source distributions of every pinned requirement.
//!
//! Everything here is synchronous and sequential; a failed stage aborts the
//! run and the operator re-runs after fixing the cause.

pub mod clean;
pub mod config;
pub mod detect;
pub mod git;
pub mod install;
pub mod licenses;
pub mod patch;
pub mod paths;
pub mod rewrite;
pub mod stubs;

pub use config::VendorConfig;
pub use paths::{RootKind, VendorRoot};
