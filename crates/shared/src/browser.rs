//! Opening files and URLs in the user's browser.

use anyhow::{Context, Result};
use std::process::Command;

/// Open a file path or URL with the platform's default handler.
///
/// The process is spawned detached; failures to launch are reported but the
/// opened program's own exit status is not tracked.
pub fn open(target: &str) -> Result<()> {
    tracing::debug!(target_path = %target, "Opening in browser");

    #[cfg(target_os = "windows")]
    let child = Command::new("cmd").args(["/C", "start", "", target]).spawn();

    #[cfg(target_os = "macos")]
    let child = Command::new("open").arg(target).spawn();

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let child = Command::new("xdg-open").arg(target).spawn();

    child
        .map(|_| ())
        .with_context(|| format!("Failed to open: {}", target))
}
