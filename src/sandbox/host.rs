//! Script Host
//!
//! The capabilities a sandboxed script may use. Scripts never touch the
//! real process or disk; every `fs` and `process` call goes through a
//! `ScriptHost`, normally a `VfsHost` over the session's virtual tree.

use crate::fs::{FsError, VirtualFs};

/// Fixed environment exposed as `process.env`.
pub const SCRIPT_ENV: [(&str, &str); 3] = [
    ("PATH", "/usr/local/bin:/usr/bin:/bin"),
    ("HOME", "/root"),
    ("USER", "user"),
];

/// Operations available to script code. Raw paths are resolved by the host.
pub trait ScriptHost: Send {
    fn cwd(&self) -> String;

    fn env(&self) -> Vec<(String, String)> {
        SCRIPT_ENV.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    /// File content, or `None` when `path` is not a file.
    fn read_file(&self, path: &str) -> Option<String>;
    fn write_file(&mut self, path: &str, data: &str) -> Result<(), FsError>;
    fn unlink(&mut self, path: &str) -> Result<(), FsError>;
    /// Create a directory; an existing directory is not an error.
    fn mkdir(&mut self, path: &str) -> Result<(), FsError>;
    fn exists(&self, path: &str) -> bool;
    fn read_dir(&self, path: &str) -> Result<Vec<String>, FsError>;
}

/// `ScriptHost` backed by the shell's virtual filesystem.
pub struct VfsHost<'a> {
    fs: &'a mut VirtualFs,
}

impl<'a> VfsHost<'a> {
    pub fn new(fs: &'a mut VirtualFs) -> Self {
        Self { fs }
    }
}

impl ScriptHost for VfsHost<'_> {
    fn cwd(&self) -> String {
        self.fs.current_dir().to_string()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        let path = self.fs.resolve(path);
        self.fs.read_file(&path).ok().map(str::to_string)
    }

    fn write_file(&mut self, path: &str, data: &str) -> Result<(), FsError> {
        let path = self.fs.resolve(path);
        self.fs.write_file(&path, data)
    }

    fn unlink(&mut self, path: &str) -> Result<(), FsError> {
        let path = self.fs.resolve(path);
        self.fs.remove_file(&path, false)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        let path = self.fs.resolve(path);
        if self.fs.is_dir(&path) {
            return Ok(());
        }
        self.fs.create_directory(&path)
    }

    fn exists(&self, path: &str) -> bool {
        self.fs.exists(&self.fs.resolve(path))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>, FsError> {
        self.fs.list_directory(&self.fs.resolve(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve_against_current_dir() {
        let mut fs = VirtualFs::seeded();
        fs.create_directory("/docs").unwrap();
        fs.change_directory("/docs").unwrap();

        let mut host = VfsHost::new(&mut fs);
        host.write_file("notes.txt", "abc").unwrap();
        assert_eq!(host.read_file("/docs/notes.txt").as_deref(), Some("abc"));
        assert_eq!(host.read_file("../hello_world.txt").as_deref(), Some("hi"));
        assert_eq!(host.cwd(), "/docs");
    }

    #[test]
    fn test_read_file_on_missing_or_directory() {
        let mut fs = VirtualFs::seeded();
        let host = VfsHost::new(&mut fs);
        assert_eq!(host.read_file("/missing"), None);
        assert_eq!(host.read_file("/"), None);
    }

    #[test]
    fn test_mkdir_is_idempotent() {
        let mut fs = VirtualFs::new();
        let mut host = VfsHost::new(&mut fs);
        host.mkdir("/a").unwrap();
        host.mkdir("/a").unwrap();
        assert!(host.mkdir("/x/y").is_err());
        assert_eq!(host.read_dir("/").unwrap(), vec!["a"]);
    }

    #[test]
    fn test_unlink() {
        let mut fs = VirtualFs::seeded();
        let mut host = VfsHost::new(&mut fs);
        host.unlink("hello_world.txt").unwrap();
        assert!(!host.exists("/hello_world.txt"));
        assert!(host.unlink("hello_world.txt").is_err());
    }

    #[test]
    fn test_fixed_env() {
        let mut fs = VirtualFs::new();
        let host = VfsHost::new(&mut fs);
        let env = host.env();
        assert!(env.contains(&("HOME".to_string(), "/root".to_string())));
        assert_eq!(env.len(), 3);
    }
}
