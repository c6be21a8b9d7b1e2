// Unix-style path helpers for the simulated filesystem. Every path stored in
// the filesystem is absolute and normalized.

pub const ROOT: &str = "/";

/// Normalizes `path`, resolving `.` and `..` segments and collapsing repeated
/// separators. `..` at the root stays at the root. Relative paths are treated
/// as relative to the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Resolves a client-supplied path against the session's current directory.
pub fn resolve(current_dir: &str, arg: &str) -> String {
    if arg.starts_with('/') {
        normalize(arg)
    } else {
        normalize(&format!("{}/{}", current_dir, arg))
    }
}

/// Parent directory of `path`, or `None` for the root.
pub fn parent(path: &str) -> Option<String> {
    let normalized = normalize(path);
    if normalized == ROOT {
        return None;
    }
    match normalized.rfind('/') {
        Some(0) => Some(ROOT.to_string()),
        Some(index) => Some(normalized[..index].to_string()),
        None => None,
    }
}

/// Last component of `path`; empty for the root.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/home//alice/"), "/home/alice");
        assert_eq!(normalize("/home/./alice/../bob"), "/home/bob");
        assert_eq!(normalize("/../.."), "/");
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve("/home/alice", "docs"), "/home/alice/docs");
        assert_eq!(resolve("/home/alice", "/tmp"), "/tmp");
        assert_eq!(resolve("/home/alice", ".."), "/home");
        assert_eq!(resolve("/", "a/b/../c"), "/a/c");
    }

    #[test]
    fn test_parent() {
        assert_eq!(parent("/"), None);
        assert_eq!(parent("/home"), Some("/".to_string()));
        assert_eq!(parent("/home/alice/file.txt"), Some("/home/alice".to_string()));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/home/alice/file.txt"), "file.txt");
        assert_eq!(file_name("/"), "");
    }
}
