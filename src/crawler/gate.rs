//! Human gate: the one manual step before crawling starts
//!
//! Some directories put a consent form or login wall in front of the listing.
//! The crawl opens the start page, then waits here until a person confirms
//! the session is usable.
//!
//! The confirmation line is read on a plain OS thread. A blocking read cannot
//! be cancelled, and the runtime must be able to shut down after Ctrl-C while
//! nobody has pressed ENTER.

use crate::CrawlError;
use async_trait::async_trait;
use std::io::BufRead;
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;

#[async_trait]
pub trait HumanGate: Send {
    /// Returns once the session may proceed
    async fn wait_ready(&mut self) -> crate::Result<()>;
}

type LineSource = Box<dyn BufRead + Send>;

/// Asks on the terminal and waits for ENTER
pub struct PromptGate {
    message: String,
    input: Option<LineSource>,
}

impl PromptGate {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_input(message, std::io::BufReader::new(std::io::stdin()))
    }

    /// Gate reading its confirmation from `input` instead of stdin
    pub fn with_input(message: impl Into<String>, input: impl BufRead + Send + 'static) -> Self {
        Self {
            message: message.into(),
            input: Some(Box::new(input)),
        }
    }
}

/// Reads one line on a dedicated thread
///
/// Dropping the returned receiver abandons the read; the thread stays parked
/// on its input and never holds up runtime shutdown.
fn read_line_detached(
    mut input: LineSource,
) -> std::io::Result<oneshot::Receiver<std::io::Result<usize>>> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("human-gate".to_string())
        .spawn(move || {
            let mut line = String::new();
            let _ = tx.send(input.read_line(&mut line));
        })?;
    Ok(rx)
}

impl Default for PromptGate {
    fn default() -> Self {
        Self::new("Complete any consent or login step in the session, then press ENTER to start...")
    }
}

#[async_trait]
impl HumanGate for PromptGate {
    async fn wait_ready(&mut self) -> crate::Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(self.message.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;

        let input = self
            .input
            .take()
            .ok_or_else(|| CrawlError::Gate("input already consumed".to_string()))?;
        let read = read_line_detached(input)?
            .await
            .map_err(|_| CrawlError::Gate("input reader stopped".to_string()))??;
        if read == 0 {
            return Err(CrawlError::Gate("input closed before confirmation".to_string()));
        }
        tracing::info!("Human gate confirmed");
        Ok(())
    }
}

/// Gate for directories without a manual step
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenGate;

#[async_trait]
impl HumanGate for OpenGate {
    async fn wait_ready(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<G: HumanGate + ?Sized> HumanGate for Box<G> {
    async fn wait_ready(&mut self) -> crate::Result<()> {
        (**self).wait_ready().await
    }
}
