//! Collision-free destination name resolution.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::util::is_occupied;

/// Build the `n_counter`-th alternative for `name_flat`.
///
/// The name is split once at its last `.`: `a.tar.gz` gives `a.tar_1.gz`,
/// `.bashrc` gives `_1.bashrc`, and a name without a dot gets the suffix
/// appended. The counter always applies to the original name, never to a
/// previous candidate. Bytes around the dot are kept as-is.
pub fn derive_candidate_name(name_flat: &OsStr, n_counter: usize) -> OsString {
    let bytes_name = name_flat.as_encoded_bytes();
    let Some(n_dot) = bytes_name.iter().rposition(|b| *b == b'.') else {
        let mut name = name_flat.to_os_string();
        name.push(format!("_{n_counter}"));
        return name;
    };
    // SAFETY: both halves come from `as_encoded_bytes` split at an ASCII byte.
    let (stem, extension) = unsafe {
        (
            OsStr::from_encoded_bytes_unchecked(&bytes_name[..n_dot]),
            OsStr::from_encoded_bytes_unchecked(&bytes_name[n_dot..]),
        )
    };
    let mut name = stem.to_os_string();
    name.push(format!("_{n_counter}"));
    name.push(extension);
    name
}

/// Iterator over destination candidates: the original name, then
/// `name_1`, `name_2`, ... (suffix placed before the extension).
#[derive(Debug, Clone)]
pub(crate) struct IterCandidateNames<'a> {
    name_flat: &'a OsStr,
    n_counter: usize,
}

impl<'a> IterCandidateNames<'a> {
    pub(crate) fn new(name_flat: &'a OsStr) -> Self {
        Self {
            name_flat,
            n_counter: 0,
        }
    }
}

impl Iterator for IterCandidateNames<'_> {
    type Item = OsString;

    fn next(&mut self) -> Option<Self::Item> {
        let name = if self.n_counter == 0 {
            self.name_flat.to_os_string()
        } else {
            derive_candidate_name(self.name_flat, self.n_counter)
        };
        self.n_counter += 1;
        Some(name)
    }
}

/// Names handed out during the current run, on top of what is on disk.
///
/// In a real run the on-disk check alone is authoritative; the set matters for
/// dry-run, where nothing is written between two colliding files.
#[derive(Debug, Default)]
pub(crate) struct SpecDestinationIndex {
    set_names_reserved: HashSet<OsString>,
}

impl SpecDestinationIndex {
    pub(crate) fn is_taken(&self, path_dir_dst: &Path, name: &OsStr) -> bool {
        self.set_names_reserved.contains(name) || is_occupied(&path_dir_dst.join(name))
    }

    pub(crate) fn reserve(&mut self, name: OsString) {
        self.set_names_reserved.insert(name);
    }
}

/// First free destination path for `name_flat` in `path_dir_dst`.
///
/// Returns the path and whether a suffix was needed.
pub(crate) fn resolve_destination_path(
    path_dir_dst: &Path,
    name_flat: &OsStr,
    spec_dst_index: &SpecDestinationIndex,
) -> (PathBuf, bool) {
    for (n_idx, name) in IterCandidateNames::new(name_flat).enumerate() {
        if !spec_dst_index.is_taken(path_dir_dst, &name) {
            return (path_dir_dst.join(name), n_idx > 0);
        }
    }
    unreachable!("candidate iterator is unbounded")
}
