//! Source classification and recursive tree traversal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::copy::copy_file_to_unique;
use crate::encode::encode_flat_name;
use crate::report::ReportFlattenBuilder;
use crate::resolve::{SpecDestinationIndex, resolve_destination_path};
use crate::spec::{SpecFlattenOptions, SpecFlattenRecord};
use crate::util::{SpecFlattenPatterns, normalize_path};

/// Entry names are lossy UTF-8, used for pattern matching only; destination
/// names are encoded from the raw path.
#[derive(Debug, Clone)]
struct SpecDirEntry {
    path_dir_src_sub: PathBuf,
    name_dir: String,
}

#[derive(Debug, Clone)]
struct SpecFileEntry {
    path_file_src: PathBuf,
    name_file: String,
}

/// State shared by every source of one `flatten_copy` run.
#[derive(Debug)]
pub(crate) struct SpecFlattenContext {
    pub(crate) path_dir_dst: PathBuf,
    pub(crate) path_dir_dst_norm: PathBuf,
    pub(crate) spec_options: SpecFlattenOptions,
    pub(crate) spec_pats: SpecFlattenPatterns,
    pub(crate) spec_dst_index: SpecDestinationIndex,
    pub(crate) builder_report: ReportFlattenBuilder,
}

/// Dispatch one user-supplied source: a file is a one-item batch rooted at its
/// parent, a directory is walked recursively, anything else is skipped.
pub(crate) fn walk_source(path_source: &Path, spec_ctx: &mut SpecFlattenContext) {
    let meta_source = match fs::metadata(path_source) {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            spec_ctx.builder_report.add_skipped_with_warning(format!(
                "Source path '{}' does not exist, skipping...",
                path_source.display()
            ));
            return;
        }
        Err(e) => {
            spec_ctx.builder_report.add_skipped_with_warning(format!(
                "Failed to inspect source '{}' ({e}), skipping...",
                path_source.display()
            ));
            return;
        }
    };

    if meta_source.is_file() {
        let Some(name_file) = path_source.file_name() else {
            spec_ctx.builder_report.add_skipped_with_warning(format!(
                "Source path '{}' has no file name, skipping...",
                path_source.display()
            ));
            return;
        };
        let path_root = path_source.parent().unwrap_or(Path::new(""));
        handle_file_entry(
            SpecFileEntry {
                path_file_src: path_source.to_path_buf(),
                name_file: name_file.to_string_lossy().to_string(),
            },
            path_root,
            spec_ctx,
        );
    } else if meta_source.is_dir() {
        tracing::debug!("Walking source directory {}", path_source.display());
        walk_directory(path_source, path_source, spec_ctx);
    } else {
        spec_ctx.builder_report.add_skipped_with_warning(format!(
            "'{}' is neither a file nor directory, skipping...",
            path_source.display()
        ));
    }
}

fn walk_directory(path_root: &Path, path_dir: &Path, spec_ctx: &mut SpecFlattenContext) {
    if normalize_path(path_dir) == spec_ctx.path_dir_dst_norm {
        spec_ctx.builder_report.add_skipped_with_warning(format!(
            "Destination directory skipped inside source: {}",
            path_dir.display()
        ));
        return;
    }

    let iter_entries = match fs::read_dir(path_dir) {
        Ok(iter) => iter,
        Err(e) => {
            spec_ctx.builder_report.add_warning(format!(
                "Failed to read directory {} ({e})",
                path_dir.display()
            ));
            return;
        }
    };

    let mut l_dirs: Vec<SpecDirEntry> = Vec::new();
    let mut l_files: Vec<SpecFileEntry> = Vec::new();

    for _entry_res in iter_entries {
        let entry = match _entry_res {
            Ok(v) => v,
            Err(e) => {
                spec_ctx.builder_report.add_warning(format!(
                    "Failed to read directory entry under {} ({e})",
                    path_dir.display()
                ));
                continue;
            }
        };

        let path_entry = entry.path();
        let c_name = entry.file_name().to_string_lossy().to_string();
        let cfg_file_type = match entry.file_type() {
            Ok(v) => v,
            Err(e) => {
                spec_ctx
                    .builder_report
                    .add_warning(format!("Failed to inspect {} ({e})", path_entry.display()));
                continue;
            }
        };

        if cfg_file_type.is_dir() {
            l_dirs.push(SpecDirEntry {
                path_dir_src_sub: path_entry,
                name_dir: c_name,
            });
        } else if cfg_file_type.is_file() {
            l_files.push(SpecFileEntry {
                path_file_src: path_entry,
                name_file: c_name,
            });
        } else if cfg_file_type.is_symlink() {
            match fs::metadata(&path_entry) {
                Ok(meta_target) if meta_target.is_file() => l_files.push(SpecFileEntry {
                    path_file_src: path_entry,
                    name_file: c_name,
                }),
                Ok(meta_target) if meta_target.is_dir() => {
                    spec_ctx.builder_report.add_skipped_with_warning(format!(
                        "Symlinked directory not followed: {}",
                        path_entry.display()
                    ));
                }
                Ok(_) => {
                    spec_ctx.builder_report.add_skipped_with_warning(format!(
                        "Special file target skipped: {}",
                        path_entry.display()
                    ));
                }
                Err(e) => {
                    spec_ctx.builder_report.add_scanned();
                    spec_ctx.builder_report.add_error(
                        path_entry.clone(),
                        format!("Broken symlink: {} ({e})", path_entry.display()),
                    );
                }
            }
        } else {
            spec_ctx.builder_report.add_skipped_with_warning(format!(
                "Special file skipped: {}",
                path_entry.display()
            ));
        }
    }

    l_files.sort_by(|a, b| a.path_file_src.cmp(&b.path_file_src));
    l_dirs.sort_by(|a, b| a.path_dir_src_sub.cmp(&b.path_dir_src_sub));

    for _file_entry in l_files {
        handle_file_entry(_file_entry, path_root, spec_ctx);
    }

    for _dir_entry in l_dirs {
        if spec_ctx.spec_pats.should_exclude_dir(&_dir_entry.name_dir) {
            tracing::debug!(
                "Directory excluded by pattern: {}",
                _dir_entry.path_dir_src_sub.display()
            );
            continue;
        }
        walk_directory(path_root, &_dir_entry.path_dir_src_sub, spec_ctx);
    }
}

fn handle_file_entry(
    spec_file_entry: SpecFileEntry,
    path_root: &Path,
    spec_ctx: &mut SpecFlattenContext,
) {
    spec_ctx.builder_report.add_scanned();

    if spec_ctx
        .spec_pats
        .should_exclude_file(&spec_file_entry.name_file)
    {
        tracing::debug!(
            "File excluded by pattern: {}",
            spec_file_entry.path_file_src.display()
        );
        return;
    }
    spec_ctx.builder_report.add_matched();

    let path_file_src = spec_file_entry.path_file_src;
    let Ok(path_rel) = path_file_src.strip_prefix(path_root) else {
        spec_ctx.builder_report.add_error(
            path_file_src.clone(),
            format!(
                "File is outside its traversal root {}",
                path_root.display()
            ),
        );
        return;
    };
    let Some(name_flat) = encode_flat_name(path_rel, &spec_ctx.spec_options.separator) else {
        spec_ctx.builder_report.add_error(
            path_file_src.clone(),
            "Relative path has no file name component".to_string(),
        );
        return;
    };

    if spec_ctx.spec_options.if_dry_run {
        let (path_file_dst, if_renamed) =
            resolve_destination_path(&spec_ctx.path_dir_dst, &name_flat, &spec_ctx.spec_dst_index);
        if let Some(name_dst) = path_file_dst.file_name() {
            spec_ctx.spec_dst_index.reserve(name_dst.to_os_string());
        }
        spec_ctx.builder_report.add_copied(
            SpecFlattenRecord {
                path_file_src,
                path_file_dst,
            },
            if_renamed,
        );
        return;
    }

    match copy_file_to_unique(
        &path_file_src,
        &spec_ctx.path_dir_dst,
        &name_flat,
        &mut spec_ctx.spec_dst_index,
    ) {
        Ok((path_file_dst, if_renamed)) => spec_ctx.builder_report.add_copied(
            SpecFlattenRecord {
                path_file_src,
                path_file_dst,
            },
            if_renamed,
        ),
        Err(e) => spec_ctx
            .builder_report
            .add_error(path_file_src, e.to_string()),
    }
}
