//! Configuration module.
//!
//! This module defines the command-line interface (CLI) using `clap` and turns
//! the parsed flags into a [`LinkRequest`] and an optional [`EmSetup`],
//! resolving every default in one place.

use clap::Parser;
use std::path::{Path, PathBuf};

use crate::defs::BASE_DEFS_SUBPATH;
use crate::emsetup::EmSetup;
use crate::error::{LinkError, Result};
use crate::linker::LinkRequest;

/// Link an open-access design library into an ADS workspace.
///
/// Copies the technology (substrate) file into the library and registers the
/// library in the workspace's lib.defs with shared linkage. Safe to re-run.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Source open-access library directory
    #[arg(short, long, value_name = "PATH")]
    pub library: PathBuf,

    /// Technology/substrate definition file
    #[arg(short, long, value_name = "PATH")]
    pub tech: PathBuf,

    /// Workspace directory [default: current directory]
    #[arg(short, long, value_name = "PATH")]
    pub workspace: Option<PathBuf>,

    /// File name for the technology file inside the library [default: the
    /// technology file's own name]
    #[arg(short, long, env = "OALINK_TECH_DEST", value_name = "NAME")]
    pub dest_name: Option<String>,

    /// ADS installation root, used to locate the base analog/RF definitions
    #[arg(long, env = "HPEESOF_DIR", value_name = "PATH")]
    pub hpeesof_dir: Option<PathBuf>,

    /// Base definitions file to INCLUDE when creating lib.defs
    #[arg(long, value_name = "PATH")]
    pub base_defs: Option<PathBuf>,

    /// Also prepare the emSetup view of this cell
    #[arg(long, value_name = "NAME", requires = "em_state_file")]
    pub cell: Option<String>,

    /// Simulation-state XML installed into the cell's emSetup
    #[arg(long, env = "EMSTATEFILE", value_name = "PATH")]
    pub em_state_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: String,
}

impl Config {
    pub fn workspace(&self) -> Result<PathBuf> {
        match &self.workspace {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir()
                .map_err(|e| LinkError::io("determine", "current directory", e)),
        }
    }

    /// Explicit destination name, else the technology file's own name.
    pub fn tech_dest(&self) -> Result<String> {
        if let Some(name) = &self.dest_name {
            return Ok(name.clone());
        }
        self.tech
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| LinkError::InvalidDestination(self.tech.display().to_string()))
    }

    /// `--base-defs` wins over `HPEESOF_DIR/oalibs/analog_rf.defs`.
    pub fn base_defs(&self) -> Option<PathBuf> {
        self.base_defs.clone().or_else(|| {
            self.hpeesof_dir
                .as_ref()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| dir.join(BASE_DEFS_SUBPATH))
        })
    }

    pub fn link_request(&self) -> Result<LinkRequest> {
        Ok(LinkRequest {
            library: self.library.clone(),
            tech_file: self.tech.clone(),
            workspace: self.workspace()?,
            tech_dest: self.tech_dest()?,
            base_defs: self.base_defs(),
        })
    }

    /// `None` unless `--cell` was given. `library` and `workspace` should be
    /// the resolved paths the link ran against.
    pub fn em_setup(&self, library: &Path, workspace: &Path) -> Result<Option<EmSetup>> {
        let Some(cell) = &self.cell else {
            return Ok(None);
        };
        let state_file = self
            .em_state_file
            .clone()
            .ok_or(LinkError::MissingArgument("--em-state-file"))?;
        Ok(Some(EmSetup {
            library: library.to_path_buf(),
            cell: cell.clone(),
            workspace: workspace.to_path_buf(),
            state_file,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["oalink"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Config::command().debug_assert();
    }

    #[test]
    fn short_flags_match_the_script_interface() {
        let config = parse(&["-l", "/libs/myrf", "-t", "/tech/subC.tech", "-w", "/ws"]);
        assert_eq!(config.library, PathBuf::from("/libs/myrf"));
        assert_eq!(config.tech, PathBuf::from("/tech/subC.tech"));
        assert_eq!(config.workspace().unwrap(), PathBuf::from("/ws"));
    }

    #[test]
    fn destination_defaults_to_tech_file_name() {
        let config = parse(&["-l", "/libs/myrf", "-t", "/tech/subC.tech", "-d", "custom.subst"]);
        assert_eq!(config.tech_dest().unwrap(), "custom.subst");

        let mut config = parse(&["-l", "/libs/myrf", "-t", "/tech/subC.tech"]);
        config.dest_name = None;
        assert_eq!(config.tech_dest().unwrap(), "subC.tech");
    }

    #[test]
    fn base_defs_prefers_explicit_path() {
        let mut config = parse(&["-l", "/libs/myrf", "-t", "/tech/subC.tech"]);
        config.hpeesof_dir = Some(PathBuf::from("/opt/ads"));
        config.base_defs = None;
        assert_eq!(
            config.base_defs(),
            Some(PathBuf::from("/opt/ads/oalibs/analog_rf.defs"))
        );

        config.base_defs = Some(PathBuf::from("/site/base.defs"));
        assert_eq!(config.base_defs(), Some(PathBuf::from("/site/base.defs")));

        config.base_defs = None;
        config.hpeesof_dir = Some(PathBuf::new());
        assert_eq!(config.base_defs(), None);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        let err = Config::try_parse_from(["oalink", "-l", "/l", "-t", "/t", "-x"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn cell_requires_state_file() {
        let mut config = parse(&["-l", "/libs/myrf", "-t", "/tech/subC.tech", "-w", "/ws"]);
        config.cell = Some("balun".into());
        config.em_state_file = None;
        let (library, workspace) = (Path::new("/libs/myrf"), Path::new("/ws"));
        assert!(matches!(
            config.em_setup(library, workspace),
            Err(LinkError::MissingArgument("--em-state-file"))
        ));

        config.em_state_file = Some(PathBuf::from("/em/state.xml"));
        let em = config.em_setup(library, workspace).unwrap().unwrap();
        assert_eq!(em.cell, "balun");
        assert_eq!(em.library, PathBuf::from("/libs/myrf"));
    }
}
