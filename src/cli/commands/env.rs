//! env commands - Start, stop and inspect the compose project

use anyhow::{Context as _, Result};

use crate::cli::Context;
use crate::environment::{Controller, EnvSettings, HttpReadyCheck, SystemOpener};
use crate::process::SystemRunner;

fn controller_parts(ctx: &Context) -> Result<(EnvSettings, bool)> {
    let root = ctx.workdir()?;
    let config = ctx.load_config(&root)?;
    Ok((EnvSettings::from_config(&config, &root), config.open_browser()))
}

/// Build and start the stack, wait for it and open the browser.
pub fn start(ctx: &Context, no_browser: bool) -> Result<()> {
    let (settings, open_browser) = controller_parts(ctx)?;
    let ready = HttpReadyCheck::new().context("failed to build the HTTP client")?;
    let runner = SystemRunner;
    let opener = SystemOpener;

    let report = Controller::new(&runner, &opener, settings)
        .with_verbosity(ctx.verbosity())
        .start(&ready, open_browser && !no_browser)?;

    tracing::debug!(
        url = %report.url,
        escalated = report.escalated,
        ready = report.readiness.is_ready(),
        "start finished"
    );
    Ok(())
}

/// Stop and remove the stack's containers.
pub fn stop(ctx: &Context) -> Result<()> {
    let (settings, _) = controller_parts(ctx)?;
    let runner = SystemRunner;

    Controller::new(&runner, &SystemOpener, settings)
        .with_verbosity(ctx.verbosity())
        .stop()?;
    Ok(())
}

/// Show the stack's containers.
pub fn status(ctx: &Context) -> Result<()> {
    let (settings, _) = controller_parts(ctx)?;
    let runner = SystemRunner;

    Controller::new(&runner, &SystemOpener, settings)
        .with_verbosity(ctx.verbosity())
        .status()?;
    Ok(())
}
