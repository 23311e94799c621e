//! pull command - Bring a working copy up to date with a team branch

use std::io;

use anyhow::Result;

use crate::cli::Context;
use crate::process::SystemRunner;
use crate::sync::{Puller, SyncSettings};
use crate::ui::output;

/// Run the pull workflow in the working directory.
///
/// Without `choice` the branch menu is shown and one line is read from stdin.
pub fn pull(ctx: &Context, choice: Option<&str>) -> Result<()> {
    let root = ctx.workdir()?;
    let config = ctx.load_config(&root)?;
    let settings = SyncSettings::from_config(&config);
    let runner = SystemRunner;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();

    let report = Puller::new(&runner, settings)
        .with_verbosity(ctx.verbosity())
        .run(&root, choice, &mut reader, &mut writer)?;

    if report.repo_dir != root {
        output::info(
            format!("Working copy is in {}", report.repo_dir.display()),
            ctx.verbosity(),
        );
    }
    Ok(())
}
