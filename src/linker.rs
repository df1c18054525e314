//! Core Linker logic.
//!
//! This module contains the `Linker` struct which links an open-access design
//! library into an ADS workspace:
//! 1. Validation: checks arguments and that every input exists.
//! 2. Technology file installation: copies the substrate file into the library.
//! 3. Definitions bootstrap: creates `lib.defs` with the base `INCLUDE` line.
//! 4. Registration: appends the `DEFINE`/`ASSIGN` pair for the library.
//!
//! Steps 3 and 4 run while holding an exclusive lock on `lib.defs`. Every step
//! is idempotent, so a failed run can simply be repeated.

use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::defs::{DefsLine, LibDefs, LIB_DEFS};
use crate::error::{LinkError, Result};
use crate::utils::{absolute_path, append_lines, is_bare_name, library_name};

/// Everything needed for one link run.
#[derive(Debug, Clone)]
pub struct LinkRequest {
    /// Source open-access library directory.
    pub library: PathBuf,
    /// Technology/substrate file to install into the library.
    pub tech_file: PathBuf,
    /// Workspace holding `lib.defs`.
    pub workspace: PathBuf,
    /// File name the technology file gets inside the library.
    pub tech_dest: String,
    /// Base definitions file for the bootstrap `INCLUDE`. Only needed when
    /// `lib.defs` does not exist yet.
    pub base_defs: Option<PathBuf>,
}

/// What a link run changed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub library_name: String,
    pub defs_path: PathBuf,
    pub tech_copied: bool,
    pub defs_created: bool,
    pub library_registered: bool,
}

pub struct Linker {
    /// Absolute library path as given, symlinks kept. This is what gets
    /// registered.
    library: PathBuf,
    /// Fully resolved library path, only used to recognise an existing entry.
    canonical: PathBuf,
    library_name: String,
    tech_file: PathBuf,
    tech_dest: PathBuf,
    workspace: PathBuf,
    base_defs: Option<PathBuf>,
}

impl Linker {
    /// Validates `request` and makes the library path absolute. The library
    /// name is the last segment of that path; symlinks are not followed.
    /// Nothing on disk is touched.
    pub fn new(request: &LinkRequest) -> Result<Self> {
        if request.library.as_os_str().is_empty() {
            return Err(LinkError::MissingArgument("--library"));
        }
        if request.tech_file.as_os_str().is_empty() {
            return Err(LinkError::MissingArgument("--tech"));
        }
        validate_dest_name(&request.tech_dest)?;

        if !request.library.is_dir() {
            return Err(LinkError::MissingInput {
                what: "source library",
                path: request.library.clone(),
            });
        }
        if !request.tech_file.is_file() {
            return Err(LinkError::MissingInput {
                what: "technology file",
                path: request.tech_file.clone(),
            });
        }
        if !request.workspace.is_dir() {
            return Err(LinkError::MissingInput {
                what: "workspace",
                path: request.workspace.clone(),
            });
        }

        let library = absolute_path(&request.library)
            .map_err(|e| LinkError::io("resolve", &request.library, e))?;
        let canonical = request
            .library
            .canonicalize()
            .map_err(|e| LinkError::io("resolve", &request.library, e))?;
        let library_name = library_name(&library)
            .ok_or_else(|| LinkError::InvalidLibraryName(library.clone()))?
            .to_string();
        let workspace = request
            .workspace
            .canonicalize()
            .map_err(|e| LinkError::io("resolve", &request.workspace, e))?;

        Ok(Self {
            tech_dest: library.join(&request.tech_dest),
            library,
            canonical,
            library_name,
            tech_file: request.tech_file.clone(),
            workspace,
            base_defs: request.base_defs.clone(),
        })
    }

    pub fn library(&self) -> &Path {
        &self.library
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    pub fn defs_path(&self) -> PathBuf {
        self.workspace.join(LIB_DEFS)
    }

    /// Runs the whole procedure.
    pub fn link(&self) -> Result<LinkReport> {
        let tech_copied = self.install_tech_file()?;
        let (defs_created, library_registered) = self.register()?;
        Ok(LinkReport {
            library_name: self.library_name.clone(),
            defs_path: self.defs_path(),
            tech_copied,
            defs_created,
            library_registered,
        })
    }

    /// Copies the technology file into the library unless the destination
    /// already exists. Returns whether a copy happened.
    pub fn install_tech_file(&self) -> Result<bool> {
        if self.tech_dest.exists() {
            tracing::debug!(
                "Technology file {} already present, not copying",
                self.tech_dest.display()
            );
            return Ok(false);
        }

        tracing::info!(
            "Copying {} to {}",
            self.tech_file.display(),
            self.tech_dest.display()
        );
        fs::copy(&self.tech_file, &self.tech_dest)
            .map_err(|e| LinkError::io("copy technology file to", &self.tech_dest, e))?;
        Ok(true)
    }

    /// Bootstraps `lib.defs` if absent and registers the library in it.
    /// Returns `(created, registered)`.
    pub fn register(&self) -> Result<(bool, bool)> {
        let defs_path = self.defs_path();
        let (mut file, created) = self.open_defs(&defs_path)?;

        file.lock_exclusive()
            .map_err(|e| LinkError::io("lock", &defs_path, e))?;

        if created {
            // `open_defs` only creates the file when a base path is known.
            if let Some(base) = &self.base_defs {
                append_lines(&mut file, &[DefsLine::include(base).to_string()])
                    .map_err(|e| LinkError::io("write", &defs_path, e))?;
            }
        }

        let defs = read_defs(&mut file).map_err(|e| LinkError::io("read", &defs_path, e))?;
        if let Some(existing) = defs.find_define(&self.library_name) {
            if !self.is_same_library(existing) {
                tracing::warn!(
                    "{} already defines {} as {}; leaving it in place of {}",
                    defs_path.display(),
                    self.library_name,
                    existing,
                    self.library.display()
                );
            } else {
                tracing::debug!(
                    "{} already registered in {}",
                    self.library_name,
                    defs_path.display()
                );
            }
            return Ok((created, false));
        }

        tracing::info!(
            "Registering {} in {}",
            self.library_name,
            defs_path.display()
        );
        let lines = [
            DefsLine::define(&self.library_name, &self.library).to_string(),
            DefsLine::shared_mode(&self.library_name).to_string(),
        ];
        append_lines(&mut file, &lines).map_err(|e| LinkError::io("append to", &defs_path, e))?;
        Ok((created, true))
    }

    /// Whether a path already registered in `lib.defs` names this library,
    /// either literally or after resolving symlinks and trailing slashes.
    fn is_same_library(&self, existing: &str) -> bool {
        let existing = Path::new(existing);
        existing == self.library.as_path()
            || existing
                .canonicalize()
                .map(|resolved| resolved == self.canonical)
                .unwrap_or(false)
    }

    /// Opens `lib.defs` for read/append, creating it when absent.
    /// Creation requires a base definitions path, checked before anything is
    /// written.
    fn open_defs(&self, defs_path: &Path) -> Result<(File, bool)> {
        if !defs_path.exists() {
            if self.base_defs.is_none() {
                return Err(LinkError::Environment(format!(
                    "{} does not exist and no base definitions file is configured \
                     (set HPEESOF_DIR or pass --base-defs)",
                    defs_path.display()
                )));
            }

            tracing::info!("Creating {}", defs_path.display());
            match OpenOptions::new()
                .read(true)
                .append(true)
                .create_new(true)
                .open(defs_path)
            {
                Ok(file) => return Ok((file, true)),
                // Another invocation created it first; treat it as pre-existing.
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(LinkError::io("create", defs_path, e)),
            }
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(defs_path)
            .map_err(|e| LinkError::io("open", defs_path, e))?;
        Ok((file, false))
    }
}

/// Reads the whole file. Bytes that are not UTF-8 (legacy comments) are
/// replaced for lookup only; the file is never written back.
fn read_defs(file: &mut File) -> std::io::Result<LibDefs> {
    let mut contents = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut contents)?;
    Ok(LibDefs::parse(&String::from_utf8_lossy(&contents)))
}

fn validate_dest_name(name: &str) -> Result<()> {
    if !is_bare_name(name) {
        return Err(LinkError::InvalidDestination(name.to_string()));
    }
    Ok(())
}
