//! tfsync CLI
//!
//! Configuration, project manifest loading and result rendering for the
//! `tfsync` binary.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod logging;
pub mod output;
pub mod project;

pub use config::Config;
pub use project::{build_graph, load_project, Manifest};
