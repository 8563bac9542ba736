//! Helper to handle child process stdout/stderr output
//!
//! Both streams are always piped and drained by background tasks into the
//! configured sinks, so the child never blocks on a full pipe while the
//! caller is busy polling for readiness.

use std::process::Stdio;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::config::OutputSink;

const PUMP_BUFFER_SIZE: usize = 8 * 1024;

/// Pipe stdout/stderr and detach stdin
pub fn configure_child_stdio(cmd: &mut Command) {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).stdin(Stdio::null());
}

/// Spawn one pump task per piped stream of the child
pub fn spawn_output_pumps(child: &mut Child, stdout: &OutputSink, stderr: &OutputSink) -> Vec<JoinHandle<()>> {
    let mut pumps = Vec::with_capacity(2);

    if let Some(out) = child.stdout.take() {
        pumps.push(tokio::spawn(pump(out, stdout.clone(), "stdout")));
    }

    if let Some(err) = child.stderr.take() {
        pumps.push(tokio::spawn(pump(err, stderr.clone(), "stderr")));
    }

    pumps
}

/// Copy a stream into a sink until EOF; sink failures only stop forwarding, never reading
async fn pump<R>(mut reader: R, sink: OutputSink, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut writer = match open_writer(&sink).await {
        Ok(writer) => writer,
        Err(e) => {
            tracing::warn!(stream, error = %e, "Cannot open output sink, discarding child {}", stream);
            SinkWriter::Discard
        }
    };

    let mut buf = vec![0u8; PUMP_BUFFER_SIZE];
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(stream, error = %e, "Child output stream closed");
                break;
            }
        };

        if let Err(e) = writer.write(&buf[..n]).await {
            tracing::warn!(stream, error = %e, "Failed to forward child output, discarding the rest");
            writer = SinkWriter::Discard;
        }
    }

    let _ = writer.flush().await;
}

enum SinkWriter {
    Stream(Box<dyn AsyncWrite + Send + Unpin>),
    Buffer(crate::config::OutputBuffer),
    Discard,
}

impl SinkWriter {
    async fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            SinkWriter::Stream(stream) => {
                stream.write_all(bytes).await?;
                stream.flush().await
            }
            SinkWriter::Buffer(buffer) => {
                buffer.append(bytes);
                Ok(())
            }
            SinkWriter::Discard => Ok(()),
        }
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        match self {
            SinkWriter::Stream(stream) => stream.flush().await,
            _ => Ok(()),
        }
    }
}

async fn open_writer(sink: &OutputSink) -> std::io::Result<SinkWriter> {
    Ok(match sink {
        OutputSink::Stdout => SinkWriter::Stream(Box::new(tokio::io::stdout())),
        OutputSink::Stderr => SinkWriter::Stream(Box::new(tokio::io::stderr())),
        OutputSink::Discard => SinkWriter::Discard,
        OutputSink::Buffer(buffer) => SinkWriter::Buffer(buffer.clone()),
        OutputSink::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path).await?;
            SinkWriter::Stream(Box::new(file))
        }
    })
}
