//! EM setup preparation.
//!
//! After a library is linked, Momentum still needs an `emSetup` view for the
//! cell being simulated and an AEL script that makes ADS write the simulation
//! input files. This module lays those out:
//!
//! ```text
//! <library>/<cell>/emSetup/master.tag
//! <library>/<cell>/emSetup/eesof_em_setup.file
//! <library>/<cell>/emSetup/emStateFile.xml   (state file, placeholders filled)
//! <workspace>/data/
//! <workspace>/init.ael
//! ```
//!
//! Everything except `emStateFile.xml` is created only when absent. The state
//! file is refreshed on every run so edits to the source take effect.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LinkError, Result};
use crate::utils::{is_bare_name, library_name};

pub const EM_SETUP_DIR: &str = "emSetup";
pub const EM_STATE_FILE: &str = "emStateFile.xml";
pub const AEL_SCRIPT: &str = "init.ael";

const CELL_PLACEHOLDER: &str = "CELL_placeholder";
const LIBRARY_PLACEHOLDER: &str = "WORKSPACE_placeholder_lib";
const WORKSPACE_PLACEHOLDER: &str = "WORKSPACE_placeholder";

const MASTER_TAG: &str = "master.tag";
const MASTER_TAG_CONTENTS: &str = "-- Master.tag File, Rev:1.0\neesof_em_setup.file";
const EESOF_EM_SETUP: &str = "eesof_em_setup.file";
const EESOF_EM_SETUP_CONTENTS: &str = "\
# Ensuring Version Control does not get an empty file. #\n\
# My magic number is 156.                              #";

#[derive(Debug, Clone)]
pub struct EmSetup {
    /// Linked library directory.
    pub library: PathBuf,
    /// Cell inside the library to simulate.
    pub cell: String,
    /// ADS workspace the library was linked into.
    pub workspace: PathBuf,
    /// Simulation-state XML exported from the ADS GUI.
    pub state_file: PathBuf,
}

impl EmSetup {
    pub fn em_setup_dir(&self) -> PathBuf {
        self.library.join(&self.cell).join(EM_SETUP_DIR)
    }

    pub fn ael_path(&self) -> PathBuf {
        self.workspace.join(AEL_SCRIPT)
    }

    /// Creates the missing EM setup files and installs the state file.
    pub fn prepare(&self) -> Result<()> {
        if self.cell.is_empty() {
            return Err(LinkError::MissingArgument("--cell"));
        }
        if !is_bare_name(&self.cell) {
            return Err(LinkError::InvalidCellName(self.cell.clone()));
        }
        if !self.state_file.is_file() {
            return Err(LinkError::MissingInput {
                what: "EM state file",
                path: self.state_file.clone(),
            });
        }
        let lib_name = library_name(&self.library)
            .ok_or_else(|| LinkError::InvalidLibraryName(self.library.clone()))?;

        let setup_dir = self.em_setup_dir();
        if !setup_dir.is_dir() {
            tracing::info!("Creating {} directory", setup_dir.display());
            fs::create_dir_all(&setup_dir)
                .map_err(|e| LinkError::io("create directory", &setup_dir, e))?;
        }

        write_if_absent(&setup_dir.join(MASTER_TAG), MASTER_TAG_CONTENTS)?;
        write_if_absent(&setup_dir.join(EESOF_EM_SETUP), EESOF_EM_SETUP_CONTENTS)?;

        let state = fs::read(&self.state_file)
            .map_err(|e| LinkError::io("read", &self.state_file, e))?;
        let state_dest = setup_dir.join(EM_STATE_FILE);
        tracing::info!(
            "Installing {} as {}",
            self.state_file.display(),
            state_dest.display()
        );
        fs::write(&state_dest, self.fill_placeholders(&String::from_utf8_lossy(&state), lib_name))
            .map_err(|e| LinkError::io("write", &state_dest, e))?;

        let data_dir = self.workspace.join("data");
        if !data_dir.is_dir() {
            tracing::info!("Creating {} directory", data_dir.display());
            fs::create_dir(&data_dir).map_err(|e| LinkError::io("create directory", &data_dir, e))?;
        }

        write_if_absent(&self.ael_path(), &self.ael_script(lib_name))?;
        Ok(())
    }

    /// Points an exported state file at this cell, library and workspace.
    /// The library placeholder shares a prefix with the workspace one, so it
    /// is replaced first.
    fn fill_placeholders(&self, state: &str, lib_name: &str) -> String {
        state
            .replace(CELL_PLACEHOLDER, &self.cell)
            .replace(LIBRARY_PLACEHOLDER, lib_name)
            .replace(WORKSPACE_PLACEHOLDER, &self.workspace.display().to_string())
    }

    fn ael_script(&self, lib_name: &str) -> String {
        format!(
            "de_open_workspace(\"{}\"); // Open correct folder\n\
             dex_em_writeSimulationFiles(\"{}\",\"{}\",\"{}\",\"simulation\"); // Generate simulation input files\n\
             de_exit(); // Close ADS\n",
            self.workspace.display(),
            lib_name,
            self.cell,
            EM_SETUP_DIR
        )
    }
}

fn write_if_absent(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        tracing::debug!("{} already exists", path.display());
        return Ok(());
    }
    tracing::info!("Creating {}", path.display());
    fs::write(path, contents).map_err(|e| LinkError::io("write", path, e))
}
