//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Line-based prompts on stdin
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing text goes through this module so the quiet flag and the
//! `error:`/`hint:` layout are applied consistently. Diagnostics for
//! developers go through `tracing` instead.

pub mod output;
pub mod prompts;
