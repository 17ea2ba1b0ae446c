//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use gdown_core::OverwritePolicy;

/// Mirror Google Drive folders and files to local storage.
///
/// gdown lists a folder through the Drive v3 API, follows "can't scan for
/// viruses" confirmation pages, and streams each file to disk with progress.
#[derive(Parser, Debug)]
#[command(name = "gdown")]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download the files of a folder
    Folder(FolderArgs),
    /// Download a single file
    File(FileArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FolderArgs {
    /// Drive folder identifier
    pub folder_id: String,

    /// Keep subfolders in the listing (each becomes a local subdirectory)
    #[arg(long)]
    pub include_folders: bool,

    /// Expand subfolders (requires --include-folders)
    #[arg(short, long, requires = "include_folders")]
    pub recursive: bool,

    /// Folder levels expanded below the requested folder (1-32)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub max_depth: Option<u8>,

    /// Page size requested from the listing API (1-1000)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub page_size: Option<u32>,

    /// Print the resolved tree instead of downloading
    #[arg(long)]
    pub list_only: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FileArgs {
    /// Drive file identifier
    pub file_id: String,

    /// Print the resolved entry instead of downloading
    #[arg(long)]
    pub list_only: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by both subcommands.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Directory to write downloads to, created on demand (default: ./downloads)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// What to do when a destination file already exists
    #[arg(long, value_enum)]
    pub on_conflict: Option<ConflictArg>,

    /// OAuth access token sent as a bearer header
    #[arg(long, env = "GDOWN_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// API key sent as the `key` query parameter (ignored when a token is set)
    #[arg(long, env = "GDOWN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Override the Drive API base URL
    #[arg(long, hide = true)]
    pub api_base_url: Option<String>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Read timeout in seconds (1-3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    /// Log progress lines instead of drawing progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// CLI spelling of [`OverwritePolicy`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictArg {
    Overwrite,
    Skip,
    Rename,
}

impl From<ConflictArg> for OverwritePolicy {
    fn from(value: ConflictArg) -> Self {
        match value {
            ConflictArg::Overwrite => Self::Overwrite,
            ConflictArg::Skip => Self::Skip,
            ConflictArg::Rename => Self::Rename,
        }
    }
}

impl Command {
    #[must_use]
    pub fn common(&self) -> &CommonArgs {
        match self {
            Self::Folder(args) => &args.common,
            Self::File(args) => &args.common,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(args: &Args) -> &FolderArgs {
        match &args.command {
            Command::Folder(folder) => folder,
            Command::File(_) => panic!("expected folder subcommand"),
        }
    }

    #[test]
    fn test_cli_folder_defaults() {
        let args = Args::try_parse_from(["gdown", "folder", "abc"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        let folder = folder(&args);
        assert_eq!(folder.folder_id, "abc");
        assert!(!folder.include_folders);
        assert!(!folder.recursive);
        assert!(folder.max_depth.is_none());
        assert!(folder.common.on_conflict.is_none());
    }

    #[test]
    fn test_cli_file_subcommand() {
        let args = Args::try_parse_from(["gdown", "file", "xyz", "-o", "out"]).unwrap();
        match args.command {
            Command::File(file) => {
                assert_eq!(file.file_id, "xyz");
                assert_eq!(file.common.output_dir, Some(PathBuf::from("out")));
            }
            Command::Folder(_) => panic!("expected file subcommand"),
        }
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["gdown", "-vv", "folder", "abc"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["gdown", "folder", "abc", "--verbose"]).unwrap();
        assert_eq!(args.verbose, 1);
    }

    #[test]
    fn test_cli_recursive_requires_include_folders() {
        let result = Args::try_parse_from(["gdown", "folder", "abc", "--recursive"]);
        assert!(result.is_err());

        let args = Args::try_parse_from([
            "gdown",
            "folder",
            "abc",
            "--include-folders",
            "--recursive",
            "--max-depth",
            "3",
        ])
        .unwrap();
        let folder = folder(&args);
        assert!(folder.recursive);
        assert_eq!(folder.max_depth, Some(3));
    }

    #[test]
    fn test_cli_on_conflict_values() {
        let args =
            Args::try_parse_from(["gdown", "folder", "abc", "--on-conflict", "rename"]).unwrap();
        assert_eq!(folder(&args).common.on_conflict, Some(ConflictArg::Rename));
        assert_eq!(OverwritePolicy::from(ConflictArg::Skip), OverwritePolicy::Skip);

        let result = Args::try_parse_from(["gdown", "folder", "abc", "--on-conflict", "merge"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_cli_page_size_range() {
        let result = Args::try_parse_from(["gdown", "folder", "abc", "--page-size", "0"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
        let args = Args::try_parse_from(["gdown", "folder", "abc", "--page-size", "1000"]).unwrap();
        assert_eq!(folder(&args).page_size, Some(1000));
    }

    #[test]
    fn test_cli_accepts_token_and_key_together() {
        let args = Args::try_parse_from([
            "gdown",
            "file",
            "x",
            "--access-token",
            "t",
            "--api-key",
            "k",
        ])
        .unwrap();
        let common = args.command.common();
        assert_eq!(common.access_token.as_deref(), Some("t"));
        assert_eq!(common.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["gdown"]).is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["gdown", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["gdown", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
