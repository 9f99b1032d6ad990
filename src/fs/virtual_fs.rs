//! Virtual File System
//!
//! A non-persistent, in-memory tree keyed by canonical absolute paths.
//! Every path that exists has exactly one `Entry`; directories hold the
//! ordered names of their direct children, which is the only listing source.

use std::collections::HashMap;

use log::trace;

use super::path::{basename, join, normalize, parent};
use super::types::{Entry, EntryKind, FsError};

/// Content of the seeded `/script.js`.
pub const SEED_SCRIPT: &str = "console.log(\"Hello from script.js\"); console.warn(\"This is a warning!\"); console.error(\"This is an error >:(\");";

/// Content of the seeded `/hello_world.txt`.
pub const SEED_HELLO: &str = "hi";

/// In-memory virtual file system plus the current-directory pointer.
#[derive(Debug, Clone)]
pub struct VirtualFs {
    entries: HashMap<String, Entry>,
    current_dir: String,
}

impl VirtualFs {
    /// Create a filesystem containing only the root directory.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert("/".to_string(), Entry::empty_directory());
        Self { entries, current_dir: "/".to_string() }
    }

    /// Create the fixed seed tree: `/hello_world.txt` and `/script.js`.
    pub fn seeded() -> Self {
        let mut fs = Self::new();
        for (name, content) in [("hello_world.txt", SEED_HELLO), ("script.js", SEED_SCRIPT)] {
            fs.entries.insert(join("/", name), Entry::file(content));
            fs.register_child("/", name);
        }
        fs
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    /// Normalize a raw path against the current directory.
    pub fn resolve(&self, path: &str) -> String {
        normalize(path, &self.current_dir)
    }

    pub fn kind(&self, path: &str) -> Option<EntryKind> {
        self.entries.get(path).map(Entry::kind)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.kind(path) == Some(EntryKind::Directory)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.kind(path) == Some(EntryKind::File)
    }

    /// Every existing path, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Ordered names of a directory's children.
    pub fn list_directory(&self, path: &str) -> Result<Vec<String>, FsError> {
        match self.entries.get(path) {
            Some(Entry::Directory { children }) => Ok(children.iter().cloned().collect()),
            Some(Entry::File { .. }) => Err(FsError::not_a_directory(path, "scandir")),
            None => Err(FsError::not_found(path, "scandir")),
        }
    }

    pub fn read_file(&self, path: &str) -> Result<&str, FsError> {
        match self.entries.get(path) {
            Some(Entry::File { content }) => Ok(content),
            Some(Entry::Directory { .. }) => Err(FsError::is_directory(path, "read")),
            None => Err(FsError::not_found(path, "open")),
        }
    }

    /// Create or overwrite a file. The parent directory must already exist.
    pub fn write_file(&mut self, path: &str, content: impl Into<String>) -> Result<(), FsError> {
        if self.is_dir(path) {
            return Err(FsError::is_directory(path, "write"));
        }
        let parent_dir = self.existing_parent(path, "open")?;
        trace!("write_file {}", path);
        self.entries.insert(path.to_string(), Entry::file(content));
        self.register_child(&parent_dir, basename(path));
        Ok(())
    }

    /// Create an empty directory under an existing parent.
    pub fn create_directory(&mut self, path: &str) -> Result<(), FsError> {
        if self.exists(path) {
            return Err(FsError::already_exists(path, "mkdir"));
        }
        let parent_dir = self.existing_parent(path, "mkdir")?;
        trace!("create_directory {}", path);
        self.entries.insert(path.to_string(), Entry::empty_directory());
        self.register_child(&parent_dir, basename(path));
        Ok(())
    }

    pub fn change_directory(&mut self, path: &str) -> Result<(), FsError> {
        match self.kind(path) {
            Some(EntryKind::Directory) => {
                self.current_dir = path.to_string();
                Ok(())
            }
            Some(EntryKind::File) => Err(FsError::not_a_directory(path, "chdir")),
            None => Err(FsError::not_found(path, "chdir")),
        }
    }

    /// Remove a file. With `force`, a missing path is a silent no-op.
    pub fn remove_file(&mut self, path: &str, force: bool) -> Result<(), FsError> {
        match self.kind(path) {
            Some(EntryKind::File) => {}
            Some(EntryKind::Directory) => return Err(FsError::is_directory(path, "unlink")),
            None if force => return Ok(()),
            None => return Err(FsError::not_found(path, "unlink")),
        }
        trace!("remove_file {}", path);
        self.entries.remove(path);
        self.unregister_child(path);
        Ok(())
    }

    /// Remove a directory and everything beneath it, depth first.
    ///
    /// `force` is passed through to every descendant removal.
    pub fn remove_directory_recursive(&mut self, path: &str, force: bool) -> Result<(), FsError> {
        if path == "/" {
            return Err(FsError::RootRemoval { path: path.to_string(), operation: "rmdir".to_string() });
        }
        let children: Vec<String> = match self.entries.get(path) {
            Some(Entry::Directory { children }) => children.iter().cloned().collect(),
            Some(Entry::File { .. }) => return Err(FsError::not_a_directory(path, "rmdir")),
            None => return Err(FsError::not_found(path, "rmdir")),
        };

        for name in children {
            let child = join(path, &name);
            match self.kind(&child) {
                Some(EntryKind::Directory) => self.remove_directory_recursive(&child, force)?,
                _ => self.remove_file(&child, force)?,
            }
        }

        trace!("remove_directory {}", path);
        self.entries.remove(path);
        self.unregister_child(path);
        self.repair_current_dir();
        Ok(())
    }

    /// Create an empty file if missing; an existing entry is left untouched.
    pub fn touch(&mut self, path: &str) -> Result<(), FsError> {
        if self.exists(path) {
            return Ok(());
        }
        self.write_file(path, String::new())
    }

    // ─── Internal helpers ────────────────────────────────────

    fn existing_parent(&self, path: &str, operation: &str) -> Result<String, FsError> {
        match parent(path) {
            Some(dir) if self.is_dir(&dir) => Ok(dir),
            _ => Err(FsError::parent_not_found(path, operation)),
        }
    }

    fn register_child(&mut self, dir: &str, name: &str) {
        if let Some(Entry::Directory { children }) = self.entries.get_mut(dir) {
            children.insert(name.to_string());
        }
    }

    fn unregister_child(&mut self, path: &str) {
        let Some(dir) = parent(path) else { return };
        if let Some(Entry::Directory { children }) = self.entries.get_mut(&dir) {
            children.shift_remove(basename(path));
        }
    }

    /// Walk `current_dir` up to the nearest directory that still exists.
    fn repair_current_dir(&mut self) {
        while !self.is_dir(&self.current_dir) {
            match parent(&self.current_dir) {
                Some(up) => self.current_dir = up,
                None => break,
            }
        }
    }
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check every structural invariant of the tree.
    fn assert_consistent(fs: &VirtualFs) {
        assert!(fs.is_dir("/"));
        assert!(fs.is_dir(fs.current_dir()));
        for path in fs.paths() {
            if path == "/" {
                continue;
            }
            let dir = parent(&path).unwrap();
            assert!(fs.is_dir(&dir), "parent of {} missing", path);
            let names = fs.list_directory(&dir).unwrap();
            assert_eq!(
                names.iter().filter(|n| n.as_str() == basename(&path)).count(),
                1,
                "{} not registered exactly once",
                path
            );
        }
    }

    #[test]
    fn test_seeded_tree() {
        let fs = VirtualFs::seeded();
        assert_eq!(fs.current_dir(), "/");
        assert_eq!(fs.list_directory("/").unwrap(), vec!["hello_world.txt", "script.js"]);
        assert_eq!(fs.read_file("/hello_world.txt").unwrap(), "hi");
        assert_eq!(fs.read_file("/script.js").unwrap(), SEED_SCRIPT);
        assert_consistent(&fs);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let mut fs = VirtualFs::new();
        fs.write_file("/a.txt", "first").unwrap();
        fs.write_file("/a.txt", "second").unwrap();
        assert_eq!(fs.read_file("/a.txt").unwrap(), "second");
        assert_eq!(fs.list_directory("/").unwrap(), vec!["a.txt"]);
        assert_consistent(&fs);
    }

    #[test]
    fn test_write_requires_parent() {
        let mut fs = VirtualFs::new();
        let err = fs.write_file("/missing/a.txt", "x").unwrap_err();
        assert!(matches!(err, FsError::ParentNotFound { .. }));
        assert!(!fs.exists("/missing/a.txt"));
        assert!(!fs.exists("/missing"));
    }

    #[test]
    fn test_write_over_directory_fails() {
        let mut fs = VirtualFs::new();
        fs.create_directory("/d").unwrap();
        assert!(matches!(fs.write_file("/d", "x"), Err(FsError::IsDirectory { .. })));
        assert!(fs.is_dir("/d"));
    }

    #[test]
    fn test_read_errors() {
        let mut fs = VirtualFs::new();
        fs.create_directory("/d").unwrap();
        assert!(matches!(fs.read_file("/nope"), Err(FsError::NotFound { .. })));
        assert!(matches!(fs.read_file("/d"), Err(FsError::IsDirectory { .. })));
    }

    #[test]
    fn test_create_directory_errors() {
        let mut fs = VirtualFs::seeded();
        fs.create_directory("/a").unwrap();
        assert!(matches!(fs.create_directory("/a"), Err(FsError::AlreadyExists { .. })));
        assert!(matches!(
            fs.create_directory("/hello_world.txt"),
            Err(FsError::AlreadyExists { .. })
        ));
        assert!(matches!(fs.create_directory("/x/y"), Err(FsError::ParentNotFound { .. })));
        assert_consistent(&fs);
    }

    #[test]
    fn test_create_then_change_directory() {
        let mut fs = VirtualFs::new();
        fs.create_directory("/a").unwrap();
        fs.create_directory("/a/b").unwrap();
        fs.change_directory("/a/b").unwrap();
        assert_eq!(fs.current_dir(), "/a/b");
        assert_eq!(fs.resolve(".."), "/a");
    }

    #[test]
    fn test_change_directory_errors_leave_cwd() {
        let mut fs = VirtualFs::seeded();
        assert!(matches!(fs.change_directory("/nope"), Err(FsError::NotFound { .. })));
        assert!(matches!(
            fs.change_directory("/hello_world.txt"),
            Err(FsError::NotADirectory { .. })
        ));
        assert_eq!(fs.current_dir(), "/");
    }

    #[test]
    fn test_list_directory_errors() {
        let fs = VirtualFs::seeded();
        assert!(matches!(fs.list_directory("/nope"), Err(FsError::NotFound { .. })));
        assert!(matches!(
            fs.list_directory("/hello_world.txt"),
            Err(FsError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_remove_file() {
        let mut fs = VirtualFs::seeded();
        fs.remove_file("/hello_world.txt", false).unwrap();
        assert!(!fs.exists("/hello_world.txt"));
        assert_eq!(fs.list_directory("/").unwrap(), vec!["script.js"]);
        assert!(matches!(fs.remove_file("/hello_world.txt", false), Err(FsError::NotFound { .. })));
        assert!(fs.remove_file("/hello_world.txt", true).is_ok());
        assert_consistent(&fs);
    }

    #[test]
    fn test_remove_file_refuses_directory() {
        let mut fs = VirtualFs::new();
        fs.create_directory("/d").unwrap();
        assert!(matches!(fs.remove_file("/d", true), Err(FsError::IsDirectory { .. })));
    }

    #[test]
    fn test_remove_directory_recursive_leaves_no_trace() {
        let mut fs = VirtualFs::seeded();
        fs.create_directory("/a").unwrap();
        fs.create_directory("/a/b").unwrap();
        fs.create_directory("/a/b/c").unwrap();
        fs.write_file("/a/one.txt", "1").unwrap();
        fs.write_file("/a/b/two.txt", "2").unwrap();
        fs.write_file("/a/b/c/three.txt", "3").unwrap();
        fs.create_directory("/ab").unwrap();

        fs.remove_directory_recursive("/a", false).unwrap();

        for path in fs.paths() {
            assert!(!path.starts_with("/a/") && path != "/a", "leftover {}", path);
        }
        assert!(fs.is_dir("/ab"));
        assert_eq!(fs.list_directory("/").unwrap(), vec!["hello_world.txt", "script.js", "ab"]);
        assert_consistent(&fs);
    }

    #[test]
    fn test_remove_directory_errors() {
        let mut fs = VirtualFs::seeded();
        assert!(matches!(
            fs.remove_directory_recursive("/nope", false),
            Err(FsError::NotFound { .. })
        ));
        assert!(matches!(
            fs.remove_directory_recursive("/script.js", false),
            Err(FsError::NotADirectory { .. })
        ));
        assert!(matches!(
            fs.remove_directory_recursive("/", true),
            Err(FsError::RootRemoval { .. })
        ));
        assert!(fs.is_dir("/"));
    }

    #[test]
    fn test_remove_current_directory_moves_cwd_up() {
        let mut fs = VirtualFs::new();
        fs.create_directory("/a").unwrap();
        fs.create_directory("/a/b").unwrap();
        fs.change_directory("/a/b").unwrap();
        fs.remove_directory_recursive("/a", false).unwrap();
        assert_eq!(fs.current_dir(), "/");
        assert_consistent(&fs);
    }

    #[test]
    fn test_touch_creates_and_preserves() {
        let mut fs = VirtualFs::seeded();
        fs.touch("/new.txt").unwrap();
        assert_eq!(fs.read_file("/new.txt").unwrap(), "");

        fs.touch("/hello_world.txt").unwrap();
        assert_eq!(fs.read_file("/hello_world.txt").unwrap(), "hi");

        assert!(matches!(fs.touch("/missing/x"), Err(FsError::ParentNotFound { .. })));
        assert_consistent(&fs);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut fs = VirtualFs::new();
        fs.write_file("/z", "").unwrap();
        fs.create_directory("/a").unwrap();
        fs.write_file("/m", "").unwrap();
        fs.write_file("/z", "again").unwrap();
        assert_eq!(fs.list_directory("/").unwrap(), vec!["z", "a", "m"]);
    }
}
