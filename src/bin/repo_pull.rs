//! repo-pull - Bring a working copy up to date with a team branch

use std::process::ExitCode;

fn main() -> ExitCode {
    devkit::cli::finish(devkit::cli::run_pull())
}
