use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{EnumFlattenPatternMode, FlattenError};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeFlattenPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypeFlattenPatternSeq {
    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SpecFlattenPatterns {
    pub(crate) patterns_include_files: Option<TypeFlattenPatternSeq>,
    pub(crate) patterns_exclude_files: Option<TypeFlattenPatternSeq>,
    pub(crate) patterns_exclude_dirs: Option<TypeFlattenPatternSeq>,
}

impl SpecFlattenPatterns {
    pub(crate) fn from_raw(
        patterns_include_files: Option<&[String]>,
        patterns_exclude_files: Option<&[String]>,
        patterns_exclude_dirs: Option<&[String]>,
        rule_pattern: EnumFlattenPatternMode,
    ) -> Result<Self, FlattenError> {
        Ok(Self {
            patterns_include_files: _compile(patterns_include_files, rule_pattern)?,
            patterns_exclude_files: _compile(patterns_exclude_files, rule_pattern)?,
            patterns_exclude_dirs: _compile(patterns_exclude_dirs, rule_pattern)?,
        })
    }

    /// `true` when a file basename is filtered out.
    pub(crate) fn should_exclude_file(&self, name_file: &str) -> bool {
        let b_included = self
            .patterns_include_files
            .as_ref()
            .is_none_or(|p| p.is_match(name_file));
        let b_excluded = self
            .patterns_exclude_files
            .as_ref()
            .is_some_and(|p| p.is_match(name_file));
        !b_included || b_excluded
    }

    /// `true` when a directory basename must not be descended.
    pub(crate) fn should_exclude_dir(&self, name_dir: &str) -> bool {
        self.patterns_exclude_dirs
            .as_ref()
            .is_some_and(|p| p.is_match(name_dir))
    }
}

fn _compile(
    patterns: Option<&[String]>,
    rule_pattern: EnumFlattenPatternMode,
) -> Result<Option<TypeFlattenPatternSeq>, FlattenError> {
    let Some(patterns) = patterns else {
        return Ok(None);
    };
    if patterns.is_empty() {
        return Ok(None);
    }

    match rule_pattern {
        EnumFlattenPatternMode::Literal => {
            Ok(Some(TypeFlattenPatternSeq::Literal(patterns.to_vec())))
        }
        EnumFlattenPatternMode::Glob => {
            let mut l_glob = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let matcher = Glob::new(pattern)
                    .map_err(|e| {
                        FlattenError::InvalidPattern(format!(
                            "Invalid pattern in include/exclude: {e}"
                        ))
                    })?
                    .compile_matcher();
                l_glob.push(matcher);
            }
            Ok(Some(TypeFlattenPatternSeq::Glob(l_glob)))
        }
        EnumFlattenPatternMode::Regex => {
            let mut l_regex = Vec::with_capacity(patterns.len());
            for pattern in patterns {
                let regex = Regex::new(pattern).map_err(|e| {
                    FlattenError::InvalidPattern(format!(
                        "Invalid pattern in include/exclude: {e}"
                    ))
                })?;
                l_regex.push(regex);
            }
            Ok(Some(TypeFlattenPatternSeq::Regex(l_regex)))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// `true` when anything (file, directory, dangling symlink) occupies `path`.
pub(crate) fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Metadata

/// Copy permission bits, access/modification times and (Linux) xattrs
/// from `path_file_src` onto `path_file_dst`.
pub(crate) fn apply_metadata(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;

    // xattrs first: a read-only mode would block user.* writes.
    #[cfg(target_os = "linux")]
    copy_xattrs_linux(path_file_src, path_file_dst);

    fs::set_permissions(path_file_dst, stat_src.permissions())?;

    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)?;
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            tracing::debug!(
                "Extended attribute {:?} not copied to {} ({e})",
                name,
                path_file_dst.display()
            );
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::SpecFlattenPatterns;
    use crate::spec::{EnumFlattenPatternMode, FlattenError};

    fn patterns(
        include: &[&str],
        exclude: &[&str],
        exclude_dirs: &[&str],
        rule_pattern: EnumFlattenPatternMode,
    ) -> Result<SpecFlattenPatterns, FlattenError> {
        let to_vec = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        SpecFlattenPatterns::from_raw(
            Some(&to_vec(include)),
            Some(&to_vec(exclude)),
            Some(&to_vec(exclude_dirs)),
            rule_pattern,
        )
    }

    #[test]
    fn empty_pattern_lists_match_everything() {
        let spec_pats = patterns(&[], &[], &[], EnumFlattenPatternMode::Glob).expect("compile");
        assert!(!spec_pats.should_exclude_file("anything.bin"));
        assert!(!spec_pats.should_exclude_dir("target"));
    }

    #[test]
    fn glob_include_and_exclude_combine() {
        let spec_pats = patterns(
            &["*.txt"],
            &["secret*"],
            &[".git"],
            EnumFlattenPatternMode::Glob,
        )
        .expect("compile");
        assert!(!spec_pats.should_exclude_file("notes.txt"));
        assert!(spec_pats.should_exclude_file("notes.md"));
        assert!(spec_pats.should_exclude_file("secret.txt"));
        assert!(spec_pats.should_exclude_dir(".git"));
        assert!(!spec_pats.should_exclude_dir("src"));
    }

    #[test]
    fn literal_mode_matches_substring() {
        let spec_pats =
            patterns(&["report"], &[], &[], EnumFlattenPatternMode::Literal).expect("compile");
        assert!(!spec_pats.should_exclude_file("q3_report_final.csv"));
        assert!(spec_pats.should_exclude_file("summary.csv"));
    }

    #[test]
    fn invalid_regex_and_glob_rejected() {
        let err = patterns(&["("], &[], &[], EnumFlattenPatternMode::Regex).expect_err("regex");
        assert!(matches!(err, FlattenError::InvalidPattern(_)));
        let err = patterns(&[], &["["], &[], EnumFlattenPatternMode::Glob).expect_err("glob");
        assert!(matches!(err, FlattenError::InvalidPattern(_)));
    }
}
