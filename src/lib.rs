//! pacrepo library exports.
//!
//! The binary is a thin wrapper over [`pipeline::run`]; everything is
//! exposed here so the pipeline can be driven from integration tests with a
//! fake [`process::CommandRunner`].

pub mod build;
pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod repo;
pub mod timing;
pub mod ui;
