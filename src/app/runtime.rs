//! Runs one CLI invocation: resolve settings, list or resolve, download.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use gdown_core::{
    ClientOptions, ContentFetcher, Credentials, DEFAULT_MAX_DEPTH, DownloadReport, Downloader,
    DriveService, Entry, EntryResolver, ListOptions, LogProgress, OverwritePolicy,
    ProgressObserver, StreamWriter, TreeWalker, build_http_client,
};
use tracing::{debug, info, warn};

use crate::app::config::{FileConfig, load_default_file_config};
use crate::app::progress::BarProgress;
use crate::cli::{Command, CommonArgs, FolderArgs};

const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// CLI flags merged over file config over built-in defaults.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) output_dir: PathBuf,
    pub(crate) page_size: Option<u32>,
    pub(crate) max_depth: usize,
    pub(crate) overwrite: OverwritePolicy,
    pub(crate) client_options: ClientOptions,
    pub(crate) progress_bars: bool,
    pub(crate) credentials: Credentials,
    pub(crate) api_base_url: Option<String>,
}

impl Settings {
    pub(crate) fn resolve(command: &Command, file: Option<&FileConfig>) -> Self {
        let common = command.common();
        let defaults = FileConfig::default();
        let file = file.unwrap_or(&defaults);
        let (max_depth, page_size) = match command {
            Command::Folder(args) => (args.max_depth, args.page_size),
            Command::File(_) => (None, None),
        };

        Self {
            output_dir: common
                .output_dir
                .clone()
                .or_else(|| file.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            page_size: page_size.or(file.page_size),
            max_depth: max_depth
                .or(file.max_depth)
                .map_or(DEFAULT_MAX_DEPTH, usize::from),
            overwrite: common
                .on_conflict
                .map(OverwritePolicy::from)
                .or(file.on_conflict)
                .unwrap_or_default(),
            client_options: ClientOptions::from_secs(
                common.connect_timeout.or(file.connect_timeout_secs),
                common.read_timeout.or(file.read_timeout_secs),
            ),
            progress_bars: !common.no_progress && file.progress.unwrap_or(true),
            credentials: credentials_from(common),
            api_base_url: common.api_base_url.clone(),
        }
    }

    fn list_options(&self, args: &FolderArgs) -> ListOptions {
        ListOptions {
            files_only: !args.include_folders,
            recursive: args.recursive,
            page_size: self.page_size,
            max_depth: self.max_depth,
        }
    }
}

fn credentials_from(common: &CommonArgs) -> Credentials {
    match (&common.access_token, &common.api_key) {
        (Some(token), _) if !token.is_empty() => Credentials::AccessToken(token.clone()),
        (_, Some(key)) if !key.is_empty() => Credentials::ApiKey(key.clone()),
        _ => Credentials::Anonymous,
    }
}

/// Executes `command` and fails if any download failed.
pub(crate) async fn run(command: Command, quiet: bool) -> Result<()> {
    let file_config = load_default_file_config()?;
    let settings = Settings::resolve(&command, file_config.as_ref());
    debug!(?settings, "settings resolved");

    if matches!(settings.credentials, Credentials::Anonymous) {
        warn!("no access token or API key; the Drive API will likely reject requests");
    }

    let api_client = build_http_client(settings.client_options, true)
        .context("Failed to build API HTTP client")?;
    let service = match &settings.api_base_url {
        Some(base_url) => {
            DriveService::with_base_url(api_client, base_url, settings.credentials.clone())?
        }
        None => DriveService::new(api_client, settings.credentials.clone())?,
    };

    let (entries, list_only) = match &command {
        Command::Folder(args) => {
            let options = settings.list_options(args);
            let entries = TreeWalker::new(&service)
                .expand(&args.folder_id, &options)
                .await
                .with_context(|| format!("Failed to list folder '{}'", args.folder_id))?;
            (entries, args.list_only)
        }
        Command::File(args) => {
            let entry = EntryResolver::new(&service)
                .resolve(&args.file_id)
                .await
                .with_context(|| format!("Failed to look up file '{}'", args.file_id))?;
            let Some(entry) = entry else {
                bail!("File '{}' has no downloadable content", args.file_id);
            };
            (vec![entry], args.list_only)
        }
    };

    if list_only {
        print_tree(&mut io::stdout().lock(), &entries, 0)?;
        return Ok(());
    }
    if entries.is_empty() {
        info!("nothing to download");
        return Ok(());
    }

    let content_client = build_http_client(settings.client_options, false)
        .context("Failed to build content HTTP client")?;
    let downloader = Downloader::new(
        ContentFetcher::new(content_client),
        StreamWriter::new(&settings.output_dir),
        settings.overwrite,
    );

    let use_bars = settings.progress_bars && !quiet && io::stderr().is_terminal();
    let observer: Box<dyn ProgressObserver> = if use_bars {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress::default())
    };
    let report = downloader.download_all(&entries, observer.as_ref()).await;

    summarize(&report)
}

fn summarize(report: &DownloadReport) -> Result<()> {
    info!(
        completed = report.completed(),
        failed = report.failed(),
        skipped = report.skipped(),
        bytes = report.bytes_written(),
        "Download complete"
    );
    if report.has_failures() {
        bail!(
            "{} of {} downloads failed",
            report.failed(),
            report.outcomes().len()
        );
    }
    Ok(())
}

fn print_tree(out: &mut impl Write, entries: &[Entry], depth: usize) -> io::Result<()> {
    for entry in entries {
        let indent = "  ".repeat(depth);
        if entry.is_folder() {
            writeln!(out, "{indent}{}/  [{}]", entry.name(), entry.id())?;
            if let Some(children) = entry.children() {
                print_tree(out, children, depth + 1)?;
            }
        } else {
            writeln!(
                out,
                "{indent}{}  [{}] {}",
                entry.name(),
                entry.id(),
                entry.mime_type()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Args;

    fn parse(argv: &[&str]) -> Command {
        Args::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn test_settings_defaults_without_file_config() {
        let command = parse(&["gdown", "folder", "abc"]);
        let settings = Settings::resolve(&command, None);
        assert_eq!(settings.output_dir, PathBuf::from("downloads"));
        assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.overwrite, OverwritePolicy::Overwrite);
        assert_eq!(settings.client_options, ClientOptions::default());
        assert!(settings.progress_bars);
    }

    #[test]
    fn test_settings_cli_overrides_file_config() {
        let file = FileConfig {
            output_dir: Some(PathBuf::from("/from/file")),
            page_size: Some(50),
            max_depth: Some(4),
            on_conflict: Some(OverwritePolicy::Rename),
            connect_timeout_secs: Some(10),
            read_timeout_secs: None,
            progress: Some(false),
        };
        let command = parse(&[
            "gdown",
            "folder",
            "abc",
            "-o",
            "/from/cli",
            "--on-conflict",
            "skip",
            "--max-depth",
            "2",
        ]);
        let settings = Settings::resolve(&command, Some(&file));

        assert_eq!(settings.output_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.page_size, Some(50));
        assert_eq!(settings.max_depth, 2);
        assert_eq!(settings.overwrite, OverwritePolicy::Skip);
        assert_eq!(
            settings.client_options,
            ClientOptions::from_secs(Some(10), None)
        );
        assert!(!settings.progress_bars);
    }

    #[test]
    fn test_list_options_follow_folder_flags() {
        let command = parse(&[
            "gdown",
            "folder",
            "abc",
            "--include-folders",
            "--recursive",
            "--page-size",
            "25",
        ]);
        let settings = Settings::resolve(&command, None);
        let Command::Folder(args) = &command else {
            panic!("expected folder subcommand");
        };
        let options = settings.list_options(args);
        assert!(!options.files_only);
        assert!(options.recursive);
        assert_eq!(options.page_size, Some(25));
    }

    #[test]
    fn test_credentials_prefer_access_token() {
        let common = CommonArgs {
            access_token: Some("tok".into()),
            ..CommonArgs::default()
        };
        assert!(matches!(
            credentials_from(&common),
            Credentials::AccessToken(t) if t == "tok"
        ));

        let common = CommonArgs {
            api_key: Some("key".into()),
            ..CommonArgs::default()
        };
        assert!(matches!(credentials_from(&common), Credentials::ApiKey(k) if k == "key"));
        assert!(matches!(
            credentials_from(&CommonArgs::default()),
            Credentials::Anonymous
        ));
    }

    #[test]
    fn test_credentials_token_wins_over_key() {
        let command = parse(&["gdown", "file", "x", "--access-token", "tok", "--api-key", "key"]);
        assert!(matches!(
            credentials_from(command.common()),
            Credentials::AccessToken(t) if t == "tok"
        ));
    }

    #[test]
    fn test_print_tree_indents_children() {
        let entries = vec![
            Entry::file("a", "a.txt", "text/plain", None),
            Entry::folder(
                "s",
                "Sub",
                Some(vec![Entry::file("b", "b.txt", "text/plain", None)]),
            ),
        ];
        let mut out = Vec::new();
        print_tree(&mut out, &entries, 0).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "a.txt  [a] text/plain\nSub/  [s]\n  b.txt  [b] text/plain\n"
        );
    }

    #[test]
    fn test_summarize_empty_report_is_ok() {
        assert!(summarize(&DownloadReport::default()).is_ok());
    }
}
