//! Open-access library linker for ADS workspaces.
//!
//! This library provides the core components for the `oalink` tool.
//! It is organized into several modules:
//! - `config`: CLI configuration.
//! - `defs`: The `lib.defs` line model.
//! - `linker`: The link procedure (technology file install and registration).
//! - `emsetup`: Optional EM setup preparation for a cell.
//! - `error`: Error types and exit codes.

pub mod config;
pub mod defs;
pub mod emsetup;
pub mod error;
pub mod linker;
pub mod utils;
