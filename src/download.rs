use std::io::Write as _;
use std::path::Path;

use futures_util::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::error::{Result, RunnerError};
use crate::status;

const BAR_SLOTS: usize = 25;

/// Downloads `url` to `dest`, skipping the download entirely if `dest`
/// already exists.
///
/// The presence check is deliberate and checksum-free: a file on disk is
/// trusted as-is. Interrupted transfers never leave a file behind (see
/// `fetch_stream`), so a present file is always a completed one.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    display_name: &str,
) -> Result<()> {
    if dest.exists() {
        status::success(&format!("Artifact already exists at: {}", dest.display()));
        return Ok(());
    }

    status::step(&format!("Downloading {display_name}..."));

    let response = client.get(url).send().await?.error_for_status()?;
    let total = response.content_length().unwrap_or(0);

    if total > 0 {
        // Ctrl-C mid-transfer must also leave no truncated file behind.
        tokio::select! {
            result = fetch_stream(response.bytes_stream(), dest, total) => result?,
            _ = tokio::signal::ctrl_c() => {
                let _ = tokio::fs::remove_file(dest).await;
                return Err(RunnerError::DownloadFailed("interrupted by operator".into()));
            }
        }
    } else {
        // No declared length: buffer the whole body and write it in one
        // operation, with no progress reporting.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RunnerError::DownloadFailed(e.to_string()))?;
        tokio::fs::write(dest, &bytes).await?;
    }

    status::success(&format!("Downloaded artifact to: {}", dest.display()));
    Ok(())
}

/// Streams a response body to `dest` in chunks, rendering a fixed-width
/// progress bar from the declared total.
///
/// Any failure mid-stream removes the partial file before the error
/// propagates, so the destination is never left in a truncated state that a
/// later run's presence check would wrongly trust.
async fn fetch_stream<S, B, E>(stream: S, dest: &Path, total: u64) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    if let Err(e) = write_chunks(stream, dest, total).await {
        let _ = tokio::fs::remove_file(dest).await;
        return Err(RunnerError::DownloadFailed(e.to_string()));
    }
    Ok(())
}

async fn write_chunks<S, B, E>(mut stream: S, dest: &Path, total: u64) -> Result<()>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut file = tokio::fs::File::create(dest).await?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RunnerError::DownloadFailed(e.to_string()))?;
        file.write_all(chunk.as_ref()).await?;
        downloaded += chunk.as_ref().len() as u64;

        print!("\r    {}", render_bar(downloaded as f64 / total as f64));
        let _ = std::io::stdout().flush();
    }

    file.flush().await?;
    println!();
    Ok(())
}

/// Renders a fixed-width progress bar, e.g. `[████████            ]  42.0%`.
fn render_bar(progress: f64) -> String {
    let progress = progress.clamp(0.0, 1.0);
    let filled = (progress * BAR_SLOTS as f64) as usize;
    format!(
        "[{}{}] {:5.1}%",
        "█".repeat(filled),
        " ".repeat(BAR_SLOTS - filled),
        progress * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn chunks(parts: Vec<std::result::Result<Vec<u8>, std::io::Error>>) -> impl Stream<Item = std::result::Result<Vec<u8>, std::io::Error>> + Unpin {
        stream::iter(parts)
    }

    #[tokio::test]
    async fn existing_destination_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("server.jar");
        std::fs::write(&dest, b"already here").unwrap();

        // The URL is unroutable: a network request here would fail the test.
        let client = reqwest::Client::new();
        fetch(&client, "http://127.0.0.1:1/never", &dest, "server.jar")
            .await
            .unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"already here");
    }

    #[tokio::test]
    async fn interrupted_stream_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("server.jar");

        let stream = chunks(vec![
            Ok(vec![1, 2, 3]),
            Err(std::io::Error::other("connection reset")),
        ]);
        let err = fetch_stream(stream, &dest, 6).await.unwrap_err();

        assert!(matches!(err, RunnerError::DownloadFailed(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn complete_stream_writes_all_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("server.jar");

        let stream = chunks(vec![Ok(vec![1, 2, 3]), Ok(vec![4, 5, 6])]);
        fetch_stream(stream, &dest, 6).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn bar_is_empty_at_zero_and_full_at_one() {
        assert_eq!(render_bar(0.0), format!("[{}]   0.0%", " ".repeat(25)));
        assert_eq!(render_bar(1.0), format!("[{}] 100.0%", "█".repeat(25)));
    }

    #[test]
    fn bar_clamps_out_of_range_progress() {
        assert_eq!(render_bar(1.5), render_bar(1.0));
        assert_eq!(render_bar(-0.5), render_bar(0.0));
    }
}
