//! devenv - Start and stop the local application stack

use std::process::ExitCode;

fn main() -> ExitCode {
    devkit::cli::finish(devkit::cli::run_devenv())
}
