//! File name helpers.

use std::path::Path;

/// Last component of `name`, or `None` if nothing usable is left.
///
/// Names reported by a hub or suggested by a server are reduced to this
/// before they are joined onto a destination directory.
///
/// ```rust
/// use hubfetch::utils::safe_file_name;
///
/// assert_eq!(safe_file_name("../../S3A_LST.zip").as_deref(), Some("S3A_LST.zip"));
/// assert_eq!(safe_file_name(".."), None);
/// ```
pub fn safe_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}
