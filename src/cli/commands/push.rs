//! push command - Commit everything and push it to the shared remote

use std::io;

use anyhow::Result;

use crate::cli::args::PushCli;
use crate::cli::Context;
use crate::process::SystemRunner;
use crate::sync::{BranchRequest, Pusher, PushRequest, SyncSettings};

/// Translate parsed flags into a workflow request.
pub(super) fn request_from(cli: &PushCli) -> PushRequest {
    PushRequest {
        message: cli.message.clone(),
        target: BranchRequest {
            branch: cli.branch.clone(),
            prompt: cli.prompt,
        },
        allow_protected: cli.allow_protected,
        pull: cli.pull,
    }
}

/// Run the push workflow in the working directory.
pub fn push(ctx: &Context, request: PushRequest) -> Result<()> {
    let root = ctx.workdir()?;
    let config = ctx.load_config(&root)?;
    let settings = SyncSettings::from_config(&config);
    let runner = SystemRunner;

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();

    let report = Pusher::new(&runner, settings)
        .with_verbosity(ctx.verbosity())
        .run(&root, &request, &mut reader, &mut writer)?;

    tracing::debug!(
        branch = %report.branch,
        rebase = ?report.rebase,
        set_upstream = report.set_upstream,
        "push finished"
    );
    Ok(())
}
