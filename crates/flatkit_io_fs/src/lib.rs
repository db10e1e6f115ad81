//! `flatkit_io_fs` v1:
//! Rust-side folder flattening engine.
//!
//! Copies files from nested trees into one directory, encoding each file's
//! relative path into its new name (`dir__sub__file.txt`).
//!
//! - `flatten` : top-level orchestration (`flatten_copy`)
//! - `walk`    : source dispatch and recursive traversal
//! - `encode`  : relative path -> flat name
//! - `resolve` : collision-free name search
//! - `copy`    : staged, no-clobber file copy
//! - `spec`    : enums/options/errors
//! - `report`  : run-time report model
//! - `util`    : pattern matching, path and metadata helpers

mod copy;
pub mod encode;
pub mod flatten;
pub mod report;
pub mod resolve;
pub mod spec;
mod util;
mod walk;

pub use encode::encode_flat_name;
pub use flatten::{flatten_copy, spawn_flatten_copy};
pub use report::{ReportFlatten, ReportFlattenBuilder};
pub use resolve::derive_candidate_name;
pub use spec::{
    C_SEPARATOR_DEFAULT, EnumFlattenPatternMode, FlattenError, SpecFlattenError,
    SpecFlattenOptions, SpecFlattenRecord,
};
