use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_CARET_DELAY_MS: u64 = 400;
pub const DEFAULT_RELOAD_DELAY_MS: u64 = 800;
pub const DEFAULT_TOLERANCE: i32 = 5;

/// Defaults that can live in the rc files as well as on the command line.
///
/// The image path is per document and deliberately absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub caret_delay_ms: Option<u64>,
    pub reload_delay_ms: Option<u64>,
    pub tolerance: Option<i32>,
    pub scale_exp: Option<i32>,
    pub side_handles: bool,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: options from `other` win, booleans are OR-ed.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            caret_delay_ms: other.caret_delay_ms.or(self.caret_delay_ms),
            reload_delay_ms: other.reload_delay_ms.or(self.reload_delay_ms),
            tolerance: other.tolerance.or(self.tolerance),
            scale_exp: other.scale_exp.or(self.scale_exp),
            side_handles: self.side_handles || other.side_handles,
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }

    pub fn caret_delay(&self) -> u64 {
        self.caret_delay_ms.unwrap_or(DEFAULT_CARET_DELAY_MS)
    }

    pub fn reload_delay(&self) -> u64 {
        self.reload_delay_ms.unwrap_or(DEFAULT_RELOAD_DELAY_MS)
    }

    /// Handle hit tolerance in view units, at least one.
    pub fn tolerance(&self) -> i32 {
        self.tolerance.unwrap_or(DEFAULT_TOLERANCE).max(1)
    }

    pub fn scale_exp(&self) -> i32 {
        self.scale_exp.unwrap_or(0)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("zonemark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("zonemark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("zonemark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("zonemark")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".zonemarkrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# zonemark defaults (saved with --save)".to_string()];
    if let Some(ms) = flags.caret_delay_ms {
        lines.push(format!("--caret-delay {ms}"));
    }
    if let Some(ms) = flags.reload_delay_ms {
        lines.push(format!("--reload-delay {ms}"));
    }
    if let Some(n) = flags.tolerance {
        lines.push(format!("--tolerance {n}"));
    }
    if let Some(n) = flags.scale_exp {
        lines.push(format!("--scale-exp={n}"));
    }
    if flags.side_handles {
        lines.push("--side-handles".to_string());
    }
    if let Some(path) = &flags.log_file {
        lines.push(format!("--log-file {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list. Unknown tokens and values that
/// do not parse are ignored so a stale rc file never blocks startup.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--side-handles" {
            flags.side_handles = true;
            i += 1;
            continue;
        }
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        let takes_value = matches!(
            name,
            "--caret-delay" | "--reload-delay" | "--tolerance" | "--scale-exp" | "--log-file"
        );
        if !takes_value {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                i += 1;
                tokens.get(i).map(String::as_str)
            }
        };
        if let Some(value) = value {
            match name {
                "--caret-delay" => flags.caret_delay_ms = value.parse().ok(),
                "--reload-delay" => flags.reload_delay_ms = value.parse().ok(),
                "--tolerance" => flags.tolerance = value.parse().ok(),
                "--scale-exp" => flags.scale_exp = value.parse().ok(),
                _ => flags.log_file = Some(PathBuf::from(value)),
            }
        }
        i += 1;
    }
    flags
}
