//! Streaming a response body to disk

use bgdl_errors::{Error, NetworkError};
use bgdl_events::ProgressSnapshot;
use futures::StreamExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use super::config::TransferConfig;

const TEMP_SUFFIX: &str = ".download";

/// Sibling path the body is written to before it replaces the destination
pub(super) fn temp_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(dest.as_os_str());
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn should_report_progress(first_chunk: bool, last_update: &Instant, interval: Duration) -> bool {
    first_chunk || last_update.elapsed() >= interval
}

/// Stream `response` into `temp`, calling `report` with throttled progress
///
/// The final byte count is always reported before returning. Returns the
/// number of bytes written.
pub(super) async fn stream_to_file<F>(
    response: reqwest::Response,
    temp: &Path,
    config: &TransferConfig,
    url: &str,
    mut report: F,
) -> Result<u64, Error>
where
    F: FnMut(ProgressSnapshot),
{
    let total = response.content_length();
    let mut file = File::create(temp)
        .await
        .map_err(|e| Error::io_with_path(&e, temp))?;

    let mut downloaded = 0u64;
    let mut last_progress_update = Instant::now();
    let mut first_chunk = true;
    let mut stream = response.bytes_stream();

    loop {
        match tokio::time::timeout(config.chunk_timeout, stream.next()).await {
            Ok(Some(chunk_result)) => {
                let chunk =
                    chunk_result.map_err(|e| NetworkError::DownloadFailed(e.to_string()))?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| Error::io_with_path(&e, temp))?;
                downloaded += chunk.len() as u64;

                if should_report_progress(
                    first_chunk,
                    &last_progress_update,
                    config.progress_interval,
                ) {
                    report(ProgressSnapshot::new(downloaded, total));
                    last_progress_update = Instant::now();
                    first_chunk = false;
                }
            }
            Ok(None) => break,
            Err(_) => {
                return Err(NetworkError::Timeout {
                    url: url.to_string(),
                }
                .into());
            }
        }
    }

    file.flush()
        .await
        .map_err(|e| Error::io_with_path(&e, temp))?;
    drop(file);

    report(ProgressSnapshot::new(downloaded, total));
    Ok(downloaded)
}
