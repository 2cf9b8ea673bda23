// ABOUTME: XDG Base Directory paths for the config file and recorded transcripts
// ABOUTME: Falls back to the current directory when no home directory is known

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application identifier for XDG directories
const QUALIFIER: &str = "com";
const ORGANIZATION: &str = "2389";
const APPLICATION: &str = "jake";

/// Get XDG-compliant directories for the application
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the config directory path (e.g., ~/.config/jake/)
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the default config file path
/// e.g., ~/.config/jake/config.toml
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Expand a leading `~` to the home directory. Paths without one, or with no
/// known home directory, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = || directories::BaseDirs::new().map(|b| b.home_dir().to_path_buf());
    if path == "~" {
        if let Some(home) = home() {
            return home;
        }
        tracing::warn!("Failed to expand tilde: could not determine home directory");
    } else if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = home() {
            return home.join(stripped);
        }
        tracing::warn!(
            path = %path,
            "Failed to expand tilde in path: could not determine home directory"
        );
    }
    PathBuf::from(path)
}
