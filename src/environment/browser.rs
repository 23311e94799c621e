//! environment::browser
//!
//! Best-effort browser launch.

use std::io;

/// Opens a URL in the user's browser.
pub trait Opener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Uses the platform's default handler via the `open` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        open::that(url)
    }
}

/// Open `url`, discarding any failure.
pub fn open_best_effort(opener: &dyn Opener, url: &str) {
    match opener.open(url) {
        Ok(()) => tracing::debug!(url, "opened browser"),
        Err(err) => tracing::debug!(url, error = %err, "could not open browser"),
    }
}
