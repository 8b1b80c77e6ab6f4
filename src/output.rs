// * match lines go through a single writer task so concurrent workers never tear a line
use anyhow::Context;
use std::fmt;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

pub type Output = Box<dyn AsyncWrite + Unpin + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLine {
    pub ip: String,
    pub hostname: String,
}

impl fmt::Display for MatchLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.ip, self.hostname)
    }
}

/// Create (or truncate) the output file, or fall back to stdout.
pub async fn open_output(path: Option<&Path>) -> anyhow::Result<Output> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .context("Error reading output file")?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

/// Drain `rx` into `out` one whole line at a time, returning how many lines were written.
/// Finishes once every sender has been dropped.
pub async fn write_matches<W>(mut rx: mpsc::Receiver<MatchLine>, mut out: W) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut n_written = 0;
    while let Some(line) = rx.recv().await {
        out.write_all(format!("{line}\n").as_bytes())
            .await
            .context("Error writing output")?;
        // flush per line, stdout may be shared with the progress reporter
        out.flush().await.context("Error writing output")?;
        n_written += 1;
    }
    out.shutdown().await.context("Error writing output")?;
    Ok(n_written)
}
