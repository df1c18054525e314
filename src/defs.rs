//! Library definitions file (`lib.defs`) model.
//!
//! A `lib.defs` file is a line-oriented registry. The linker only cares about
//! three statements:
//! - `INCLUDE <path>`: pulls in another definitions file.
//! - `DEFINE <name> <path>`: binds a symbolic library name to a directory.
//! - `ASSIGN <name> <key> <value>`: sets an attribute on a defined library.
//!
//! Everything else (comments, blank lines, statements we do not know) is kept
//! verbatim as [`DefsLine::Other`]. The file itself is never rewritten from
//! the parsed form; rendering is only used for lines being appended.

use std::fmt;
use std::path::Path;

/// File name of the definitions file inside a workspace.
pub const LIB_DEFS: &str = "lib.defs";

/// Linkage attribute written for every library this tool registers.
pub const LIB_MODE_KEY: &str = "libMode";
pub const LIB_MODE_SHARED: &str = "shared";

/// Base analog/RF definitions file, relative to the ADS install root.
pub const BASE_DEFS_SUBPATH: &str = "oalibs/analog_rf.defs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefsLine {
    Include { path: String },
    Define { name: String, path: String },
    Assign { name: String, key: String, value: String },
    Other(String),
}

impl DefsLine {
    /// Parses a single line. Statements are recognised by their leading
    /// keyword; the last field of a statement runs to the end of the line so
    /// paths containing spaces survive. A statement with missing fields is
    /// treated as `Other`, except that a `DEFINE` only needs its name
    /// followed by whitespace.
    pub fn parse(line: &str) -> Self {
        let parsed = split_word(line).and_then(|(keyword, rest)| match keyword {
            "INCLUDE" => last_field(rest).map(|path| DefsLine::Include {
                path: path.to_string(),
            }),
            // `DEFINE <name> ` with nothing after the separator still
            // claims the name, so the path may be empty.
            "DEFINE" => {
                let (name, rest) = split_word(rest)?;
                if rest.is_empty() {
                    return None;
                }
                Some(DefsLine::Define {
                    name: name.to_string(),
                    path: rest.trim().to_string(),
                })
            }
            "ASSIGN" => {
                let (name, rest) = split_word(rest)?;
                let (key, rest) = split_word(rest)?;
                last_field(rest).map(|value| DefsLine::Assign {
                    name: name.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            _ => None,
        });
        parsed.unwrap_or_else(|| DefsLine::Other(line.to_string()))
    }

    pub fn include(path: &Path) -> Self {
        DefsLine::Include {
            path: path.display().to_string(),
        }
    }

    pub fn define(name: &str, path: &Path) -> Self {
        DefsLine::Define {
            name: name.to_string(),
            path: path.display().to_string(),
        }
    }

    pub fn shared_mode(name: &str) -> Self {
        DefsLine::Assign {
            name: name.to_string(),
            key: LIB_MODE_KEY.to_string(),
            value: LIB_MODE_SHARED.to_string(),
        }
    }
}

impl fmt::Display for DefsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefsLine::Include { path } => write!(f, "INCLUDE {}", path),
            DefsLine::Define { name, path } => write!(f, "DEFINE {} {}", name, path),
            DefsLine::Assign { name, key, value } => write!(f, "ASSIGN {} {} {}", name, key, value),
            DefsLine::Other(raw) => f.write_str(raw),
        }
    }
}

/// Splits off the first whitespace-delimited word.
fn split_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

fn last_field(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|field| !field.is_empty())
}

/// A parsed `lib.defs` file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibDefs {
    lines: Vec<DefsLine>,
}

impl LibDefs {
    pub fn parse(contents: &str) -> Self {
        Self {
            lines: contents.lines().map(DefsLine::parse).collect(),
        }
    }

    pub fn lines(&self) -> &[DefsLine] {
        &self.lines
    }

    /// Returns the path of the first `DEFINE` for `name`, if any.
    pub fn find_define(&self, name: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            DefsLine::Define { name: n, path } if n == name => Some(path.as_str()),
            _ => None,
        })
    }

    /// Number of `DEFINE` statements for `name`.
    pub fn defines(&self, name: &str) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(line, DefsLine::Define { name: n, .. } if n == name))
            .count()
    }

    pub fn has_include(&self) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line, DefsLine::Include { .. }))
    }
}
