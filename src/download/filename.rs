//! Local file names and destination paths for downloaded entries.
//!
//! Remote names are used verbatim when they already form one safe path
//! component. Anything else (separators, reserved characters, `.`/`..`) is
//! rewritten so the destination always stays inside the output directory.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Truncate and rewrite the existing file.
    #[default]
    Overwrite,
    /// Leave the existing file alone and report the entry as skipped.
    Skip,
    /// Write to `name_1.ext`, `name_2.ext`, ... instead.
    Rename,
}

impl OverwritePolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::Skip => "skip",
            Self::Rename => "rename",
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "skip" => Ok(Self::Skip),
            "rename" => Ok(Self::Rename),
            other => Err(format!(
                "unknown conflict policy '{other}' (expected overwrite, skip or rename)"
            )),
        }
    }
}

/// Returns the local file name for a remote name.
#[must_use]
pub fn destination_file_name(name: &str) -> String {
    if is_plain_file_name(name) {
        name.to_string()
    } else {
        sanitize_filename(name)
    }
}

/// Chooses the destination for `name` inside `dir` under `policy`.
///
/// `None` means the file exists and the policy is [`OverwritePolicy::Skip`].
#[must_use]
pub fn resolve_destination(dir: &Path, name: &str, policy: OverwritePolicy) -> Option<PathBuf> {
    match policy {
        OverwritePolicy::Overwrite => Some(dir.join(destination_file_name(name))),
        OverwritePolicy::Skip => {
            let path = dir.join(destination_file_name(name));
            (!path.exists()).then_some(path)
        }
        OverwritePolicy::Rename => Some(resolve_unique_path(dir, name)),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '\0') || c.is_control())
        && is_safe_filename_segment(name)
}

pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        return "download.bin".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Resolves a free path for `filename`, adding `_N` before the extension.
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str) -> PathBuf {
    let filename = destination_file_name(filename);
    let base_path = dir.join(&filename);
    if !base_path.exists() {
        return base_path;
    }

    let (stem, ext) = match filename.rfind('.') {
        Some(pos) if pos > 0 => (&filename[..pos], &filename[pos..]),
        _ => (filename.as_str(), ""),
    };

    for i in 1..1000 {
        let candidate = dir.join(format!("{stem}_{i}{ext}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    dir.join(format!("{stem}_{timestamp}{ext}"))
}

fn is_safe_filename_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
