//! All-or-nothing file copy into a collision-free destination name.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek};
use std::path::{Path, PathBuf};

use crate::resolve::{IterCandidateNames, SpecDestinationIndex};
use crate::util::apply_metadata;

const C_STAGING_PREFIX: &str = ".flatkit-";
const C_STAGING_SUFFIX: &str = ".part";

/// Copy `path_file_src` into `path_dir_dst` under the first free variant of
/// `name_flat`.
///
/// Bytes and metadata land in a staging file inside `path_dir_dst` first. The
/// staging file is then renamed with no-clobber semantics, so a name taken
/// between the existence check and the rename moves the search to the next
/// counter instead of overwriting. On failure the staging file is removed and nothing
/// appears under a final name.
///
/// Filesystems that refuse the hard link behind the no-clobber rename (exFAT,
/// some FUSE mounts) get the staged bytes streamed into an exclusively
/// created final file instead.
///
/// Returns the committed path and whether a suffix was needed.
pub(crate) fn copy_file_to_unique(
    path_file_src: &Path,
    path_dir_dst: &Path,
    name_flat: &OsStr,
    spec_dst_index: &mut SpecDestinationIndex,
) -> Result<(PathBuf, bool), io::Error> {
    let mut file_src = File::open(path_file_src)?;
    let mut file_tmp = tempfile::Builder::new()
        .prefix(C_STAGING_PREFIX)
        .suffix(C_STAGING_SUFFIX)
        .tempfile_in(path_dir_dst)?;
    io::copy(&mut file_src, file_tmp.as_file_mut())?;
    apply_metadata(path_file_src, file_tmp.path())?;

    for (n_idx, name) in IterCandidateNames::new(name_flat).enumerate() {
        if spec_dst_index.is_taken(path_dir_dst, &name) {
            continue;
        }
        let path_file_dst = path_dir_dst.join(&name);
        match file_tmp.persist_noclobber(&path_file_dst) {
            Ok(_) => {
                spec_dst_index.reserve(name);
                return Ok((path_file_dst, n_idx > 0));
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(
                    "Destination claimed during copy, retrying: {}",
                    path_file_dst.display()
                );
                file_tmp = e.file;
            }
            Err(e) if is_link_refused(&e.error) => {
                tracing::debug!(
                    "No-clobber rename refused ({}), streaming into {}",
                    e.error,
                    path_file_dst.display()
                );
                file_tmp = e.file;
                let file_staged = file_tmp.as_file_mut();
                file_staged.rewind()?;
                match commit_by_stream(file_staged, path_file_src, &path_file_dst) {
                    Ok(()) => {
                        spec_dst_index.reserve(name);
                        return Ok((path_file_dst, n_idx > 0));
                    }
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e.error),
        }
    }
    unreachable!("candidate iterator is unbounded")
}

fn is_link_refused(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::Unsupported
    )
}

/// Create `path_file_dst` exclusively and fill it from the staged copy.
///
/// A partially written destination is removed before the error is returned.
fn commit_by_stream(
    file_staged: &mut File,
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    let file_dst = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path_file_dst)?;

    let res = write_all_from(file_staged, file_dst)
        .and_then(|_| apply_metadata(path_file_src, path_file_dst));
    if res.is_err() {
        let _ = fs::remove_file(path_file_dst);
    }
    res
}

fn write_all_from(file_staged: &mut File, mut file_dst: File) -> Result<(), io::Error> {
    io::copy(file_staged, &mut file_dst)?;
    file_dst.sync_all()
}
