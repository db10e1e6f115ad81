//! Relative path to flat file name encoding.

use std::ffi::OsString;
use std::path::{Component, Path};

use crate::spec::FlattenError;

/// Encode a path relative to its traversal root into one flat file name.
///
/// A single component is returned unchanged; deeper paths are joined with
/// `separator`, directories first. Component text is never escaped, so a
/// directory literally named `a__b` and nested `a/b` encode identically; the
/// collision resolver treats that like any other clash. Component bytes are
/// kept as-is, including names that are not valid UTF-8.
///
/// Returns `None` when the path holds no normal component (`""`, `.`, `/`).
///
/// # Examples
/// ```
/// use std::ffi::OsStr;
/// use std::path::Path;
/// use flatkit_io_fs::encode_flat_name;
///
/// assert_eq!(
///     encode_flat_name(Path::new("root.txt"), "__").as_deref(),
///     Some(OsStr::new("root.txt"))
/// );
/// assert_eq!(
///     encode_flat_name(Path::new("a/b/deep.txt"), "__").as_deref(),
///     Some(OsStr::new("a__b__deep.txt"))
/// );
/// ```
pub fn encode_flat_name(path_rel: &Path, separator: &str) -> Option<OsString> {
    let mut name_flat: Option<OsString> = None;
    for part in path_rel.components() {
        let Component::Normal(v) = part else {
            continue;
        };
        match name_flat.as_mut() {
            Some(name) => {
                name.push(separator);
                name.push(v);
            }
            None => name_flat = Some(v.to_os_string()),
        }
    }
    name_flat
}

/// Reject separators that would let a flat name escape its single path segment.
pub(crate) fn validate_separator(separator: &str) -> Result<(), FlattenError> {
    if separator.contains(['/', '\\', '\0']) {
        return Err(FlattenError::InvalidArgument(format!(
            "Separator must not contain path separators or NUL: `{separator}`"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{encode_flat_name, validate_separator};
    use crate::spec::FlattenError;

    fn encoded(path_rel: &str, separator: &str) -> Option<String> {
        encode_flat_name(Path::new(path_rel), separator)
            .map(|v| v.into_string().expect("utf-8 flat name"))
    }

    #[test]
    fn single_component_is_kept_verbatim() {
        assert_eq!(encoded("root_file.txt", "__").as_deref(), Some("root_file.txt"));
        assert_eq!(encoded("no_ext", "--").as_deref(), Some("no_ext"));
    }

    #[test]
    fn nested_components_join_in_order() {
        assert_eq!(
            encoded("subdir1/nested/deep_file.txt", "__").as_deref(),
            Some("subdir1__nested__deep_file.txt")
        );
        assert_eq!(
            encoded("subdir1/file1.txt", "--").as_deref(),
            Some("subdir1--file1.txt")
        );
        assert_eq!(encoded("a/b.txt", "").as_deref(), Some("ab.txt"));
    }

    #[test]
    fn separator_inside_components_is_not_escaped() {
        let name_literal = encoded("a__b/c.txt", "__");
        let name_nested = encoded("a/b/c.txt", "__");
        assert_eq!(name_literal.as_deref(), Some("a__b__c.txt"));
        assert_eq!(name_literal, name_nested);
    }

    #[test]
    fn non_normal_components_are_ignored() {
        assert_eq!(encoded("", "__"), None);
        assert_eq!(encoded(".", "__"), None);
        assert_eq!(encoded("./a/b.txt", "__").as_deref(), Some("a__b.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_components_keep_their_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let name_raw = OsStr::from_bytes(b"caf\xe9.txt");
        let name_flat = encode_flat_name(Path::new(name_raw), "__").expect("flat name");
        assert_eq!(name_flat.as_bytes(), b"caf\xe9.txt");

        let path_nested = Path::new(OsStr::from_bytes(b"d\xff")).join(name_raw);
        let name_flat = encode_flat_name(&path_nested, "__").expect("flat name");
        assert_eq!(name_flat.as_bytes(), b"d\xff__caf\xe9.txt");
    }

    #[test]
    fn separator_with_path_separator_rejected() {
        for separator in ["/", "a/b", "\\", "x\0"] {
            let err = validate_separator(separator).expect_err("must reject");
            assert!(matches!(err, FlattenError::InvalidArgument(_)));
        }
        for separator in ["__", "--", "", ".", "+"] {
            assert!(validate_separator(separator).is_ok());
        }
    }
}
