// src/env/mod.rs

//! Named environments managed by an external tool.
//!
//! - [`manager`] turns the `[manager]` templates into concrete commands.
//! - [`query`] parses existence and info query output.
//! - [`registry`] runs the check-and-provision protocol and resolves
//!   environment-scoped paths.

pub mod manager;
pub mod query;
pub mod registry;

pub use manager::ManagerCommands;
pub use query::{EnvInfo, Existence};
pub use registry::{join_paths, EnvState, EnvironmentRegistry};
