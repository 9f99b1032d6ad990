//! File System Types
//!
//! Core types for the virtual file system.

use indexmap::IndexSet;
use thiserror::Error;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound { path: String, operation: String },

    #[error("ENOTDIR: not a directory, {operation} '{path}'")]
    NotADirectory { path: String, operation: String },

    #[error("EISDIR: illegal operation on a directory, {operation} '{path}'")]
    IsDirectory { path: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{path}'")]
    AlreadyExists { path: String, operation: String },

    #[error("ENOENT: no such parent directory, {operation} '{path}'")]
    ParentNotFound { path: String, operation: String },

    #[error("EPERM: operation not permitted, {operation} '{path}'")]
    RootRemoval { path: String, operation: String },
}

impl FsError {
    pub(crate) fn not_found(path: &str, operation: &str) -> Self {
        FsError::NotFound { path: path.to_string(), operation: operation.to_string() }
    }

    pub(crate) fn not_a_directory(path: &str, operation: &str) -> Self {
        FsError::NotADirectory { path: path.to_string(), operation: operation.to_string() }
    }

    pub(crate) fn is_directory(path: &str, operation: &str) -> Self {
        FsError::IsDirectory { path: path.to_string(), operation: operation.to_string() }
    }

    pub(crate) fn already_exists(path: &str, operation: &str) -> Self {
        FsError::AlreadyExists { path: path.to_string(), operation: operation.to_string() }
    }

    pub(crate) fn parent_not_found(path: &str, operation: &str) -> Self {
        FsError::ParentNotFound { path: path.to_string(), operation: operation.to_string() }
    }

    /// Short human-readable reason, in the wording shell commands print.
    pub fn reason(&self) -> &'static str {
        match self {
            FsError::NotFound { .. } | FsError::ParentNotFound { .. } => "No such file or directory",
            FsError::NotADirectory { .. } => "Not a directory",
            FsError::IsDirectory { .. } => "Is a directory",
            FsError::AlreadyExists { .. } => "File exists",
            FsError::RootRemoval { .. } => "Operation not permitted",
        }
    }
}

/// The authoritative type of an existing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// A filesystem node. Directories own the ordered set of their children's names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File { content: String },
    Directory { children: IndexSet<String> },
}

impl Entry {
    pub fn file(content: impl Into<String>) -> Self {
        Entry::File { content: content.into() }
    }

    pub fn empty_directory() -> Self {
        Entry::Directory { children: IndexSet::new() }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::File { .. } => EntryKind::File,
            Entry::Directory { .. } => EntryKind::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entry::File { .. })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Entry::Directory { .. })
    }
}
