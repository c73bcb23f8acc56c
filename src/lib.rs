//! packdata: bundled runtime data resources, resolved without registry scans.
//!
//! Data files ship inside the compiled artifact and resolve to real filesystem
//! paths on demand. Resolution introspects only the crate's own embedded
//! bundle; it never searches installed-package metadata, so it keeps working
//! in environments where no packaging registry exists at all. The [`lint`]
//! module provides the matching CI guard: a forbidden-import rule that keeps
//! legacy registry-scanning crates from creeping back into a source tree.

pub mod data;
pub mod lint;
pub mod reports;

mod error;

pub use error::AppError;
pub use lint::{ForbiddenImports, Offender};

use std::path::PathBuf;

/// Resolve a bundled resource name to an absolute path that exists on disk.
///
/// Convenience wrapper over [`data::load`]. Resolving a directory name (e.g.
/// `"reports"`) returns a directory path from which plain `join` lookups work:
///
/// ```no_run
/// let template = packdata::load_resource("reports")?.join("report.tpl");
/// # Ok::<(), packdata::AppError>(())
/// ```
pub fn load_resource(name: &str) -> Result<PathBuf, AppError> {
    data::load(name)
}
