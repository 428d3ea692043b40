mod dairy;

pub use dairy::{Config, Dairy, InvoiceSettings, NotifySettings, PdfSettings, StoreSettings};

use crate::error::{DairyError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.dairy/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "dairy") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.dairy/
    let home = dirs_home().ok_or_else(|| {
        DairyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".dairy"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand `path` and anchor it at the config directory when relative.
pub fn resolve_path(path: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(path);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(cfg_dir: &Path) -> Result<Config> {
    if !cfg_dir.exists() {
        return Err(DairyError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    let path = cfg_dir.join("config.toml");
    if !path.exists() {
        return Err(DairyError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DairyError::ConfigParse { path, source: e })
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[dairy]
name = "Your Dairy Name"
address = "Town - 000000"
phone = "+91-0000000000"
# gst = "09AAAAA0000A1Z5"    # optional

[invoice]
currency_symbol = "₹"
words_suffix = "Rupees Only"

[notify]
base_url = "http://localhost:4000"   # used in reminder invoice links

[store]
path = "ledger.toml"   # relative to this directory

[pdf]
output_dir = "output"  # relative to this directory, or absolute / ~/...
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_parses_with_defaults() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.invoice.currency_symbol, "₹");
        assert_eq!(config.invoice.words_suffix, "Rupees Only");
        assert_eq!(config.store.path, "ledger.toml");
        assert!(config.dairy.gst.is_none());
    }

    #[test]
    fn optional_sections_fall_back() {
        let config: Config = toml::from_str(
            r#"[dairy]
name = "D"
address = "A"
phone = "P"

[pdf]
output_dir = "out"
"#,
        )
        .unwrap();
        assert_eq!(config.notify.base_url, "http://localhost:4000");
        assert_eq!(config.store.path, "ledger.toml");
    }

    #[test]
    fn relative_paths_anchor_at_config_dir() {
        let dir = Path::new("/srv/dairy");
        assert_eq!(resolve_path("ledger.toml", dir), dir.join("ledger.toml"));
        assert_eq!(resolve_path("/tmp/x.toml", dir), PathBuf::from("/tmp/x.toml"));
    }
}
