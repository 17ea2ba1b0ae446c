//! Streams byte chunks into a destination file.
//!
//! The writer never buffers a whole file: each chunk is written as it
//! arrives and progress is reported after every chunk. A failed stream leaves
//! the bytes received so far on disk.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::pin::pin;

use futures_util::{Stream, StreamExt};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};

use super::error::DownloadError;
use super::filename::destination_file_name;
use super::progress::ProgressObserver;

/// A file the writer finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Writes streams into files under one output directory.
#[derive(Debug, Clone)]
pub struct StreamWriter {
    output_dir: PathBuf,
}

impl StreamWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes `stream` to `<output_dir>/<destination_name>`, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// See [`StreamWriter::write_to_path`].
    pub async fn write_to_file<S, B, E>(
        &self,
        stream: S,
        total_length: u64,
        destination_name: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<WrittenFile, DownloadError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let path = self
            .output_dir
            .join(destination_file_name(destination_name));
        self.write_to_path(stream, total_length, &path, observer)
            .await
    }

    /// Writes `stream` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Io`] if the directory or file cannot be created or written
    /// - [`DownloadError::Stream`] if the source stream fails; the bytes written
    ///   before the failure stay in the file
    /// - [`DownloadError::LengthExceeded`] if the stream yields more than
    ///   `total_length` bytes; the overflowing chunk is not written
    /// - [`DownloadError::Truncated`] if the stream ends before `total_length`
    ///   bytes; the bytes received stay in the file
    #[instrument(skip(self, stream, observer), fields(path = %path.display(), total = total_length))]
    pub async fn write_to_path<S, B, E>(
        &self,
        stream: S,
        total_length: u64,
        path: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<WrittenFile, DownloadError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let file = File::create(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        let mut stream = pin!(stream);
        let name = display_name(path);
        let mut transferred: u64 = 0;

        observer.on_start(&name, total_length);

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(source) => {
                    flush_partial(&mut writer, path).await;
                    warn!(bytes = transferred, "source stream failed; keeping partial file");
                    return Err(DownloadError::stream(
                        path,
                        std::io::Error::other(source),
                    ));
                }
            };
            let bytes = chunk.as_ref();
            let next = transferred + bytes.len() as u64;
            if next > total_length {
                flush_partial(&mut writer, path).await;
                return Err(DownloadError::length_exceeded(path, total_length, next));
            }

            writer
                .write_all(bytes)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            transferred = next;
            observer.on_progress(&name, transferred, total_length);
        }

        writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        if transferred < total_length {
            warn!(
                bytes = transferred,
                expected = total_length,
                "stream ended before declared length; keeping partial file"
            );
            return Err(DownloadError::truncated(path, total_length, transferred));
        }
        debug!(bytes = transferred, "file written");

        Ok(WrittenFile {
            path: path.to_path_buf(),
            bytes: transferred,
        })
    }
}

/// Pushes buffered bytes to disk before an error return.
async fn flush_partial(writer: &mut BufWriter<File>, path: &Path) {
    if let Err(error) = writer.flush().await {
        warn!(path = %path.display(), error = %error, "failed to flush partial file");
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
