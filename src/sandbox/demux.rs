//! Output stream demultiplexing
//!
//! An attached exec delivers stdout and stderr over one connection as
//! frames with an 8-byte header whose first byte tags the stream (1 =
//! stdout, 2 = stderr). bollard decodes those headers; the engine adapter
//! maps its output variants onto [`OutputFrame`]s. This module sorts them
//! into separate buffers and races end-of-stream against a liveness
//! timeout that is independent of any limit enforced inside the
//! environment.

use std::time::Duration;

use futures::{stream::BoxStream, Stream, StreamExt};

use crate::{constants::sandbox::TIMEOUT_MESSAGE, error::AppResult};

/// Stream a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One payload from the multiplexed channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFrame {
    pub kind: StreamKind,
    pub payload: Vec<u8>,
}

impl OutputFrame {
    pub fn new(kind: StreamKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    pub fn stdout(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(StreamKind::Stdout, payload)
    }

    pub fn stderr(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(StreamKind::Stderr, payload)
    }
}

/// Frames of one running command
pub type FrameStream = BoxStream<'static, AppResult<OutputFrame>>;

/// Separated output of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemuxedOutput {
    pub stdout: String,
    /// Absent when nothing was written to stderr
    pub stderr: Option<String>,
    /// The liveness timeout fired before end-of-stream
    pub timed_out: bool,
}

/// Drain `frames` until end-of-stream or until `timeout` elapses
///
/// On timeout whatever has accumulated is returned. If stdout is still
/// empty at that point and stderr is too, stderr reports a timeout;
/// partial stdout is kept as-is.
pub async fn read_output<S>(mut frames: S, timeout: Duration) -> DemuxedOutput
where
    S: Stream<Item = AppResult<OutputFrame>> + Unpin,
{
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut timed_out = false;

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(frame)) => match frame.kind {
                    StreamKind::Stdout => stdout.extend_from_slice(&frame.payload),
                    StreamKind::Stderr => stderr.extend_from_slice(&frame.payload),
                },
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Output stream failed");
                    if !stderr.is_empty() && !stderr.ends_with(b"\n") {
                        stderr.push(b'\n');
                    }
                    stderr.extend_from_slice(format!("Output stream failed: {}", e).as_bytes());
                    break;
                }
                None => break,
            },
            _ = &mut deadline => {
                tracing::debug!(timeout_ms = timeout.as_millis() as u64, "Output stream timed out");
                timed_out = true;
                break;
            }
        }
    }

    let stdout = String::from_utf8_lossy(&stdout).into_owned();
    let stderr = if !stderr.is_empty() {
        Some(String::from_utf8_lossy(&stderr).into_owned())
    } else if timed_out && stdout.is_empty() {
        Some(TIMEOUT_MESSAGE.to_string())
    } else {
        None
    };

    DemuxedOutput {
        stdout,
        stderr,
        timed_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use futures::stream;

    const SHORT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn test_frames_are_split_by_kind() {
        let frames = stream::iter(vec![
            Ok::<_, AppError>(OutputFrame::stdout("hel")),
            Ok(OutputFrame::stderr("warn")),
            Ok(OutputFrame::new(StreamKind::Stdout, "lo")),
        ]);

        let output = read_output(frames, Duration::from_secs(5)).await;

        assert_eq!(output.stdout, "hello");
        assert_eq!(output.stderr.as_deref(), Some("warn"));
        assert!(!output.timed_out);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        let output = read_output(stream::empty::<AppResult<OutputFrame>>(), Duration::from_secs(5)).await;
        assert_eq!(output, DemuxedOutput::default());
    }

    #[tokio::test]
    async fn test_multibyte_characters_across_frames() {
        let bytes = "héllo".as_bytes();
        let frames = stream::iter(vec![
            Ok::<_, AppError>(OutputFrame::stdout(&bytes[..2])),
            Ok(OutputFrame::stdout(&bytes[2..])),
        ]);

        let output = read_output(frames, Duration::from_secs(5)).await;
        assert_eq!(output.stdout, "héllo");
    }

    #[tokio::test]
    async fn test_hung_stream_reports_timeout() {
        let output = read_output(stream::pending::<AppResult<OutputFrame>>(), SHORT).await;

        assert!(output.timed_out);
        assert_eq!(output.stdout, "");
        assert_eq!(output.stderr.as_deref(), Some(TIMEOUT_MESSAGE));
    }

    #[tokio::test]
    async fn test_partial_stdout_survives_timeout() {
        let frames = stream::iter(vec![Ok::<_, AppError>(OutputFrame::stdout("1\n2\n"))])
            .chain(stream::pending());

        let output = read_output(frames, SHORT).await;

        assert!(output.timed_out);
        assert_eq!(output.stdout, "1\n2\n");
        assert_eq!(output.stderr, None);
    }

    #[tokio::test]
    async fn test_stderr_wins_over_timeout_message() {
        let frames = stream::iter(vec![Ok::<_, AppError>(OutputFrame::stderr("Segmentation fault"))])
            .chain(stream::pending());

        let output = read_output(frames, SHORT).await;
        assert_eq!(output.stderr.as_deref(), Some("Segmentation fault"));
    }

    #[tokio::test]
    async fn test_transport_error_ends_read() {
        let frames = stream::iter(vec![
            Ok(OutputFrame::stdout("ok")),
            Err(AppError::Docker("connection reset".to_string())),
            Ok(OutputFrame::stdout("never read")),
        ]);

        let output = read_output(frames, Duration::from_secs(5)).await;

        assert_eq!(output.stdout, "ok");
        assert_eq!(
            output.stderr.as_deref(),
            Some("Output stream failed: Docker error: connection reset")
        );
        assert!(!output.timed_out);
    }
}
