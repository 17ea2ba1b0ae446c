//! File configuration for CLI defaults.
//!
//! The file is a flat list of `key = value` lines (a TOML subset): strings
//! double-quoted, integers bare, booleans `true`/`false`, `#` comments.
//! Every value is optional and CLI flags take precedence.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use gdown_core::OverwritePolicy;

/// Defaults loaded from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FileConfig {
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) page_size: Option<u32>,
    pub(crate) max_depth: Option<u8>,
    pub(crate) on_conflict: Option<OverwritePolicy>,
    pub(crate) connect_timeout_secs: Option<u64>,
    pub(crate) read_timeout_secs: Option<u64>,
    /// Draw progress bars (`false` falls back to log lines).
    pub(crate) progress: Option<bool>,
}

impl FileConfig {
    /// Validates values against the same ranges the CLI enforces.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(page_size) = self.page_size
            && !(1..=1000).contains(&page_size)
        {
            bail!("Invalid config value for `page_size`: {page_size}. Expected range: 1..=1000");
        }
        if let Some(max_depth) = self.max_depth
            && !(1..=32).contains(&max_depth)
        {
            bail!("Invalid config value for `max_depth`: {max_depth}. Expected range: 1..=32");
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Resolves the config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/gdown/config.toml`
/// 2. `$HOME/.config/gdown/config.toml`
pub(crate) fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config_home).join("gdown").join("config.toml"));
    }
    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("gdown")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config from the default path; a missing file is not an error.
pub(crate) fn load_default_file_config() -> Result<Option<FileConfig>> {
    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

pub(crate) fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "page_size" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                cfg.page_size = Some(
                    u32::try_from(parsed)
                        .map_err(|_| anyhow::anyhow!("page_size out of range for u32"))?,
                );
            }
            "max_depth" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                cfg.max_depth = Some(
                    u8::try_from(parsed)
                        .map_err(|_| anyhow::anyhow!("max_depth out of range for u8"))?,
                );
            }
            "on_conflict" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                let policy = parsed
                    .parse::<OverwritePolicy>()
                    .map_err(anyhow::Error::msg)
                    .with_context(invalid)?;
                cfg.on_conflict = Some(policy);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "read_timeout_secs" => {
                cfg.read_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "progress" => {
                cfg.progress = Some(parse_boolean(value).with_context(invalid)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    if token.starts_with('-') {
        bail!("Expected non-negative integer");
    }
    Ok(token.parse::<u64>()?)
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => bail!("Expected true or false, got '{other}'"),
    }
}
