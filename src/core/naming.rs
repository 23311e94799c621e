//! core::naming
//!
//! Generated names: personal branches and default commit messages.

use chrono::{DateTime, Local, TimeZone};

use super::types::{BranchName, TypeError};

/// Reduce a free-form user name to something safe inside a branch name.
///
/// Keeps ASCII alphanumerics and `_`, lowercased; every other run of
/// characters becomes a single `-`. Falls back to `user` when nothing is left.
///
/// # Example
///
/// ```
/// use devkit::core::naming::slugify;
///
/// assert_eq!(slugify("Alice Smith"), "alice-smith");
/// assert_eq!(slugify("DOMAIN\\bob"), "domain-bob");
/// assert_eq!(slugify("   "), "user");
/// ```
pub fn slugify(name: &str) -> String {
    let slug = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "user".to_string()
    } else {
        slug
    }
}

/// Best-effort login name of the invoking user.
pub fn current_user() -> String {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| "user".to_string())
}

/// Branch created when pushing from a detached HEAD: `<user>/<YYYY-MM-DD-HHMM>`.
pub fn personal_branch<Tz: TimeZone>(
    user: &str,
    now: &DateTime<Tz>,
) -> Result<BranchName, TypeError>
where
    Tz::Offset: std::fmt::Display,
{
    BranchName::new(format!("{}/{}", slugify(user), now.format("%Y-%m-%d-%H%M")))
}

/// Commit message used when none was given on the command line.
pub fn auto_commit_message(now: &DateTime<Local>) -> String {
    format!("Auto-commit {}", now.format("%Y-%m-%dT%H:%M:%S"))
}

/// Join positional words into a commit message, or `None` when there are none.
pub fn message_from_words(words: &[String]) -> Option<String> {
    let joined = words.join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
