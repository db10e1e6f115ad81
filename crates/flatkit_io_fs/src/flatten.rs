//! Top-level flatten orchestration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::encode::validate_separator;
use crate::report::{ReportFlatten, ReportFlattenBuilder};
use crate::resolve::SpecDestinationIndex;
use crate::spec::{FlattenError, SpecFlattenOptions};
use crate::util::{SpecFlattenPatterns, normalize_path};
use crate::walk::{SpecFlattenContext, walk_source};

/// Copy every file under `sources` into the single directory `destination`,
/// encoding each file's path relative to its source into the file name.
///
/// Sources are processed in order. A file source keeps its own name; a
/// directory source is walked recursively and nested files become
/// `dir{sep}sub{sep}name`. Names that already exist at the destination get a
/// `_1`, `_2`, ... suffix before the extension; nothing is overwritten.
///
/// Returns [`ReportFlatten`] once all sources are processed, including runs
/// where individual sources were skipped or files failed (those are recorded
/// in the report). Returns [`FlattenError`] only when:
/// - `sources` is empty or the separator is unusable (before any I/O),
/// - an include/exclude pattern does not compile,
/// - `destination` cannot be created as a directory.
pub fn flatten_copy<P, Q>(
    sources: &[P],
    destination: Q,
    spec_options: SpecFlattenOptions,
) -> Result<ReportFlatten, FlattenError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if sources.is_empty() {
        return Err(FlattenError::InvalidArgument(
            "No source paths provided".to_string(),
        ));
    }
    validate_separator(&spec_options.separator)?;

    let spec_pats = SpecFlattenPatterns::from_raw(
        spec_options.patterns_include_files.as_deref(),
        spec_options.patterns_exclude_files.as_deref(),
        spec_options.patterns_exclude_dirs.as_deref(),
        spec_options.rule_pattern,
    )?;

    let path_dir_dst = destination.as_ref().to_path_buf();
    fs::create_dir_all(&path_dir_dst).map_err(|e| FlattenError::DestinationUnwritable {
        path: path_dir_dst.clone(),
        source: e,
    })?;

    tracing::info!(
        n_sources = sources.len(),
        destination = %path_dir_dst.display(),
        separator = %spec_options.separator,
        if_dry_run = spec_options.if_dry_run,
        "Flatten started"
    );

    let mut spec_ctx = SpecFlattenContext {
        path_dir_dst_norm: normalize_path(&path_dir_dst),
        path_dir_dst,
        spec_options,
        spec_pats,
        spec_dst_index: SpecDestinationIndex::default(),
        builder_report: ReportFlattenBuilder::default(),
    };

    for source in sources {
        walk_source(source.as_ref(), &mut spec_ctx);
    }

    let report = spec_ctx.builder_report.build();
    tracing::info!("{report}");
    Ok(report)
}

/// Run [`flatten_copy`] on a dedicated thread and hand back its join handle.
///
/// For callers that must keep a foreground (UI loop, progress display)
/// responsive; the flatten itself stays sequential.
pub fn spawn_flatten_copy(
    sources: Vec<PathBuf>,
    destination: PathBuf,
    spec_options: SpecFlattenOptions,
) -> io::Result<JoinHandle<Result<ReportFlatten, FlattenError>>> {
    thread::Builder::new()
        .name("flatkit-flatten".to_string())
        .spawn(move || flatten_copy(&sources, &destination, spec_options))
}
