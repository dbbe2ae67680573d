// shell.rs - Runs the owner's update script and captures what it printed

use crate::error::ShellError;
use std::path::Path;
use tokio::process::Command;

/// Discord embed descriptions are capped at 4096 characters.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

const CUT_MARKER: &str = "\n…(output truncated)";

/// Run `script` with bash, returning stdout followed by stderr.
/// A non-zero exit is not an error: the output is what the owner wants to see.
pub async fn run_script(script: &Path) -> Result<String, ShellError> {
    if !tokio::fs::try_exists(script).await.unwrap_or(false) {
        return Err(ShellError::ScriptMissing(script.to_path_buf()));
    }

    log::info!("🔧 Running update script {}", script.display());
    let output = Command::new("bash").arg(script).output().await?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }

    log::info!(
        "🔧 Update script finished with {} ({} bytes of output)",
        output.status,
        text.len()
    );

    if text.trim().is_empty() {
        text = format!("(no output, {})", output.status);
    }
    Ok(text)
}

/// Cut `text` to at most `limit` characters, marking the cut.
pub fn truncate_output(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }

    let keep = limit.saturating_sub(CUT_MARKER.chars().count());
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(CUT_MARKER);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn short_output_is_untouched() {
        assert_eq!(truncate_output("done", 10), "done");
    }

    #[test]
    fn long_output_is_cut_on_char_boundary() {
        let text = "é".repeat(5000);
        let cut = truncate_output(&text, EMBED_DESCRIPTION_LIMIT);
        assert_eq!(cut.chars().count(), EMBED_DESCRIPTION_LIMIT);
        assert!(cut.ends_with(CUT_MARKER));
    }

    #[tokio::test]
    async fn missing_script() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("update.bash");

        assert!(matches!(
            run_script(&script).await,
            Err(ShellError::ScriptMissing(p)) if p == script
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("update.bash");
        std::fs::write(&script, "echo pulled\necho warning >&2\n").unwrap();

        let output = run_script(&script).await.unwrap();
        assert!(output.contains("pulled"));
        assert!(output.contains("warning"));
    }
}
