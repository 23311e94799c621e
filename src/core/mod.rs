//! core
//!
//! Domain types, naming helpers, and configuration shared by all workflows.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, BranchMenu, ProtectedBranches, HostPort
//! - [`naming`] - Generated branch names and commit messages
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Lookup tables are immutable values built once at process start
//! - Invalid branch names and menu selections cannot be represented

pub mod config;
pub mod naming;
pub mod types;
