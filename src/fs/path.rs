//! Path Normalization
//!
//! Purely lexical path algebra over `/`-separated absolute paths.
//! Nothing here touches the filesystem, so none of it can fail.

/// Resolve `path` against `base` into a canonical absolute path.
///
/// - empty input returns `base` unchanged
/// - input starting with `/` ignores `base` entirely
/// - `.` and empty segments are skipped, `..` pops one retained segment
///   (popping past root is a no-op)
pub fn normalize(path: &str, base: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }

    let effective = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{}/{}", base, path)
    };

    let mut resolved: Vec<&str> = Vec::new();
    for part in effective.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            _ => resolved.push(part),
        }
    }

    format!("/{}", resolved.join("/"))
}

/// Parent directory of an absolute path. Root has no parent.
pub fn parent(path: &str) -> Option<String> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/".to_string()),
        Some(pos) => Some(path[..pos].to_string()),
        None => Some("/".to_string()),
    }
}

/// Last segment of an absolute path (empty for root).
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Join a directory path and a child entry name.
pub fn join(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", dir, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty_returns_base() {
        assert_eq!(normalize("", "/home/user"), "/home/user");
        assert_eq!(normalize("", "/"), "/");
    }

    #[test]
    fn test_normalize_absolute_ignores_base() {
        assert_eq!(normalize("/foo/bar", "/somewhere"), "/foo/bar");
        assert_eq!(normalize("/foo/bar/", "/somewhere"), "/foo/bar");
        assert_eq!(normalize("/", "/somewhere"), "/");
        assert_eq!(normalize("//a//b", "/x"), "/a/b");
    }

    #[test]
    fn test_normalize_relative() {
        assert_eq!(normalize("b", "/a"), "/a/b");
        assert_eq!(normalize("./b/./c", "/a"), "/a/b/c");
        assert_eq!(normalize("..", "/a/b"), "/a");
        assert_eq!(normalize("../c", "/a/b"), "/a/c");
        assert_eq!(normalize("x", "/"), "/x");
    }

    #[test]
    fn test_normalize_pops_past_root_silently() {
        assert_eq!(normalize("/../..", "/"), "/");
        assert_eq!(normalize("../../../x", "/a"), "/x");
        assert_eq!(normalize("..", "/"), "/");
    }

    #[test]
    fn test_normalize_output_is_canonical() {
        let segments = ["", ".", "..", "a", "b", "..", ".", "c", ""];
        // every combination of up to three segments, relative and absolute
        for a in segments {
            for b in segments {
                for c in segments {
                    for prefix in ["", "/"] {
                        let input = format!("{}{}/{}/{}", prefix, a, b, c);
                        let out = normalize(&input, "/base/dir");
                        assert!(out.starts_with('/'), "{} -> {}", input, out);
                        if out != "/" {
                            for seg in out[1..].split('/') {
                                assert!(!seg.is_empty(), "{} -> {}", input, out);
                                assert_ne!(seg, ".");
                                assert_ne!(seg, "..");
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("/"), None);
        assert_eq!(parent("/foo"), Some("/".to_string()));
        assert_eq!(parent("/foo/bar"), Some("/foo".to_string()));
        assert_eq!(parent("/foo/bar/baz"), Some("/foo/bar".to_string()));
    }

    #[test]
    fn test_basename_and_join() {
        assert_eq!(basename("/foo/bar.txt"), "bar.txt");
        assert_eq!(basename("/"), "");
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("/a", "b"), "/a/b");
    }
}
