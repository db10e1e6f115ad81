//! Flatten specification models and top-level error types.

use std::io;
use std::path::PathBuf;

/// Default separator joining relative path components into a flat name.
pub const C_SEPARATOR_DEFAULT: &str = "__";

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Pattern matching mode for include/exclude lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumFlattenPatternMode {
    /// Shell-like wildcards (`*`, `?`, character classes).
    #[default]
    Glob,
    /// Regular expression pattern.
    Regex,
    /// Substring match.
    Literal,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region StructsAndErrors

/// Input options for `flatten_copy`.
#[derive(Debug, Clone)]
pub struct SpecFlattenOptions {
    /// String joining relative path components into the flat file name.
    pub separator: String,
    /// Include patterns applied to file basename.
    pub patterns_include_files: Option<Vec<String>>,
    /// Exclude patterns applied to file basename.
    pub patterns_exclude_files: Option<Vec<String>>,
    /// Exclude patterns applied to directory basename; matching directories are not descended.
    pub patterns_exclude_dirs: Option<Vec<String>>,
    /// Pattern interpretation mode.
    pub rule_pattern: EnumFlattenPatternMode,
    /// Do not write files; record the mapping that would be produced.
    pub if_dry_run: bool,
}

impl Default for SpecFlattenOptions {
    fn default() -> Self {
        Self {
            separator: C_SEPARATOR_DEFAULT.to_string(),
            patterns_include_files: None,
            patterns_exclude_files: None,
            patterns_exclude_dirs: None,
            rule_pattern: EnumFlattenPatternMode::Glob,
            if_dry_run: false,
        }
    }
}

impl SpecFlattenOptions {
    /// Default options with a custom separator.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
            ..Self::default()
        }
    }
}

/// One per-file failure with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFlattenError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// One committed (or planned, in dry-run) `source -> destination` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecFlattenRecord {
    pub path_file_src: PathBuf,
    pub path_file_dst: PathBuf,
}

/// "Top-level call failed" errors. Everything else lands in the report.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// Empty source list or unusable separator.
    #[error("{0}")]
    InvalidArgument(String),
    /// Invalid include/exclude pattern.
    #[error("{0}")]
    InvalidPattern(String),
    /// Destination directory could not be created or is not a directory.
    #[error("Failed to initialize destination {}: {source}", .path.display())]
    DestinationUnwritable {
        /// Destination path that failed initialization.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
