//! Listing path helpers: splitting, key normalization and display joining.

/// Split a `/`-delimited listing path into its segments.
///
/// Empty segments produced by leading, trailing or doubled slashes are
/// dropped, so `/`, `""` and `//` all yield no segments (the root).
///
/// # Example
///
/// ```
/// use listdu::path_utils::split_path;
///
/// assert_eq!(split_path("/Photos//2019/"), vec!["Photos", "2019"]);
/// assert!(split_path("/").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Lookup key for a segment. Listings are case-insensitive, so keys are
/// lower-cased while the original segment is kept for display.
pub fn segment_key(segment: &str) -> String {
    segment.to_lowercase()
}

/// Join display segments back into an absolute listing path.
///
/// # Example
///
/// ```
/// use listdu::path_utils::join_path;
///
/// assert_eq!(join_path(["a", "B"]), "/a/B");
/// assert_eq!(join_path(Vec::<&str>::new()), "/");
/// ```
pub fn join_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(segment.as_ref());
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// Path of a child given its parent's display path.
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_drops_empty_segments() {
        assert_eq!(split_path("a/b"), vec!["a", "b"]);
        assert_eq!(split_path("//a///b//"), vec!["a", "b"]);
        assert!(split_path("").is_empty());
        assert!(split_path("///").is_empty());
    }

    #[test]
    fn test_split_path_keeps_case() {
        assert_eq!(split_path("/Foo/BAR"), vec!["Foo", "BAR"]);
    }

    #[test]
    fn test_segment_key_lowercases() {
        assert_eq!(segment_key("ReadMe.MD"), "readme.md");
        assert_eq!(segment_key("ÄBC"), "äbc");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(["x"]), "/x");
        assert_eq!(join_path(["x", "y", "z"]), "/x/y/z");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "a"), "/a");
        assert_eq!(child_path("/a", "b"), "/a/b");
    }
}
