// src/commands/builtin.rs
use std::collections::HashMap;

use super::types::{CommandContext, CommandResult};
use super::{cat, cd_cmd, clear_cmd, curl, ls, man_cmd, mkdir, pwd, rm, touch};

/// The fixed set of shell built-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Ls,
    Cat,
    Cd,
    Mkdir,
    Clear,
    Pwd,
    Touch,
    Rm,
    Curl,
    Man,
}

lazy_static::lazy_static! {
    /// Case-exact command names
    static ref BUILTINS: HashMap<&'static str, Builtin> = {
        let mut m = HashMap::new();
        for builtin in Builtin::ALL {
            m.insert(builtin.name(), builtin);
        }
        m
    };
}

impl Builtin {
    pub const ALL: [Builtin; 10] = [
        Builtin::Ls,
        Builtin::Cat,
        Builtin::Cd,
        Builtin::Mkdir,
        Builtin::Clear,
        Builtin::Pwd,
        Builtin::Touch,
        Builtin::Rm,
        Builtin::Curl,
        Builtin::Man,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS.get(name).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Ls => "ls",
            Builtin::Cat => "cat",
            Builtin::Cd => "cd",
            Builtin::Mkdir => "mkdir",
            Builtin::Clear => "clear",
            Builtin::Pwd => "pwd",
            Builtin::Touch => "touch",
            Builtin::Rm => "rm",
            Builtin::Curl => "curl",
            Builtin::Man => "man",
        }
    }

    /// Static manual page shown by `man`.
    pub fn manual(self) -> &'static str {
        match self {
            Builtin::Ls => "Usage: ls\nList directory contents",
            Builtin::Cat => "Usage: cat <filename> [<content>]\nConcatenate and display file content",
            Builtin::Cd => "Usage: cd <directory>\nChange the current directory",
            Builtin::Mkdir => "Usage: mkdir <directory>\nCreate a new directory",
            Builtin::Clear => "Usage: clear\nClear the terminal screen",
            Builtin::Pwd => "Usage: pwd\nPrint the current working directory",
            Builtin::Touch => "Usage: touch <filename>\nCreate an empty file or update the timestamp",
            Builtin::Rm => {
                "Usage: rm [options] <file|directory>\nRemove files or directories\nOptions:\n  \
                 -r  Recursively remove directories\n  -f  Force remove files and directories"
            }
            Builtin::Curl => {
                "Usage: curl [options] <url>\nRetrieve data from a URL\nOptions:\n  \
                 -X <method>  Specify request method (GET, POST, etc.)\n  \
                 -d <data>    Send data in a POST request\n  \
                 -H <header>  Include a header in the request\n  \
                 -i           Include response headers in the output\n\n\
                 hint: if it fails, try switching to a different browser"
            }
            Builtin::Man => "Usage: man <command>\nDisplay the manual page for a command",
        }
    }

    pub fn run(self, ctx: &mut CommandContext<'_>) -> CommandResult {
        match self {
            Builtin::Ls => ls::execute(ctx),
            Builtin::Cat => cat::execute(ctx),
            Builtin::Cd => cd_cmd::execute(ctx),
            Builtin::Mkdir => mkdir::execute(ctx),
            Builtin::Clear => clear_cmd::execute(ctx),
            Builtin::Pwd => pwd::execute(ctx),
            Builtin::Touch => touch::execute(ctx),
            Builtin::Rm => rm::execute(ctx),
            Builtin::Curl => curl::execute(ctx),
            Builtin::Man => man_cmd::execute(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_exact() {
        assert_eq!(Builtin::from_name("ls"), Some(Builtin::Ls));
        assert_eq!(Builtin::from_name("man"), Some(Builtin::Man));
        assert_eq!(Builtin::from_name("LS"), None);
        assert_eq!(Builtin::from_name("echo"), None);
    }

    #[test]
    fn test_names_round_trip() {
        for builtin in Builtin::ALL {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
    }

    #[test]
    fn test_manual_pages_start_with_usage() {
        for builtin in Builtin::ALL {
            assert!(builtin.manual().starts_with("Usage: "), "{:?}", builtin);
        }
        assert!(Builtin::Rm.manual().contains("\n  -r  Recursively remove directories\n"));
        assert!(Builtin::Curl.manual().ends_with("\n\nhint: if it fails, try switching to a different browser"));
    }
}
