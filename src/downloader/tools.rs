// yt-dlp binary discovery and version probing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::utils::run_output_with_timeout;

const YTDLP_BIN: &str = "yt-dlp";
const VERSION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
    pub is_available: bool,
}

/// Find the yt-dlp executable.
///
/// Order: explicit override, common install paths, the user's local bin dir,
/// then `PATH`. Falls back to the bare name so the spawn error surfaces later.
pub fn locate_ytdlp(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }

    let mut candidates = vec![
        PathBuf::from("/opt/homebrew/bin/yt-dlp"), // Homebrew on Apple Silicon
        PathBuf::from("/usr/local/bin/yt-dlp"),    // Homebrew on Intel Mac
        PathBuf::from("/usr/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join(YTDLP_BIN));
    }

    if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
        return found;
    }

    find_in_path(YTDLP_BIN).unwrap_or_else(|| PathBuf::from(YTDLP_BIN))
}

fn find_in_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

/// Run `--version` against the binary
pub async fn probe_ytdlp(path: &Path) -> ToolInfo {
    let version = match run_output_with_timeout(path, &["--version"], VERSION_TIMEOUT_SECS).await {
        Ok(output) if output.status.success() => {
            let out = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!out.is_empty()).then_some(out)
        }
        Ok(output) => {
            tracing::warn!(
                path = %path.display(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "yt-dlp --version failed"
            );
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "yt-dlp not usable: {}", e);
            None
        }
    };

    ToolInfo {
        name: YTDLP_BIN.to_string(),
        is_available: version.is_some(),
        path: version.as_ref().map(|_| path.to_path_buf()),
        version,
    }
}
