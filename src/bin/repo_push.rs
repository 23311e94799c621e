//! repo-push - Commit everything and push it to the shared remote

use std::process::ExitCode;

fn main() -> ExitCode {
    devkit::cli::finish(devkit::cli::run_push())
}
