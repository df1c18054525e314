//! Utility functions.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

/// Returns the final path segment as a library name.
/// `None` for paths like `/` or `..` that have no usable name.
pub fn library_name(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
}

/// Makes `path` absolute against the current directory and drops `.`/`..`
/// components lexically. Symlinks are left as given.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// True if `name` is a single, non-empty path segment (no separators, not
/// `.` or `..`).
pub fn is_bare_name(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name)
}

/// Appends `lines` to `file`, first terminating the last line if the file
/// does not already end with a newline.
///
/// The file must have been opened with both read and append access.
pub fn append_lines(file: &mut File, lines: &[String]) -> io::Result<()> {
    let mut buf = String::new();
    let len = file.seek(SeekFrom::End(0))?;
    if len > 0 {
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        if last[0] != b'\n' {
            buf.push('\n');
        }
    }
    for line in lines {
        buf.push_str(line);
        buf.push('\n');
    }
    file.write_all(buf.as_bytes())?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, OpenOptions};
    use tempfile::TempDir;

    #[test]
    fn library_name_is_the_last_segment() {
        assert_eq!(library_name(Path::new("/libs/myrf")), Some("myrf"));
        assert_eq!(library_name(Path::new("/libs/myrf/")), Some("myrf"));
        assert_eq!(library_name(Path::new("/")), None);
    }

    #[test]
    fn absolute_path_drops_dot_segments_without_resolving() {
        assert_eq!(
            absolute_path(Path::new("/libs/./rf/../myrf/")).unwrap(),
            PathBuf::from("/libs/myrf")
        );
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute_path(Path::new("myrf")).unwrap(), cwd.join("myrf"));
    }

    #[test]
    fn bare_names() {
        assert!(is_bare_name("balun"));
        assert!(is_bare_name("subC.subst"));
        for bad in ["", ".", "..", "../x", "a/b", "/abs"] {
            assert!(!is_bare_name(bad), "{bad:?} should not be bare");
        }
    }

    #[test]
    fn append_terminates_dangling_last_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lib.defs");
        fs::write(&path, "DEFINE otherlib /x").unwrap();

        let mut file = OpenOptions::new().read(true).append(true).open(&path).unwrap();
        append_lines(&mut file, &["ASSIGN otherlib libMode shared".to_string()]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "DEFINE otherlib /x\nASSIGN otherlib libMode shared\n"
        );
    }

    #[test]
    fn append_to_empty_file_adds_no_blank_line() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lib.defs");
        fs::write(&path, "").unwrap();

        let mut file = OpenOptions::new().read(true).append(true).open(&path).unwrap();
        append_lines(&mut file, &["INCLUDE /ads/oalibs/analog_rf.defs".to_string()]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "INCLUDE /ads/oalibs/analog_rf.defs\n"
        );
    }
}
