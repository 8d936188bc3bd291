//! Spoken narration through an external command (`say` on macOS).
//!
//! A narration is a future that resolves when the process exits on its
//! own. Dropping it kills the process, which is how interrupts work.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::provider::BoxFuture;

pub type Narration = BoxFuture<'static, ()>;

/// Starts narrating `text` with the given voice.
pub trait Speaker: Send + Sync {
    fn launch(&self, text: &str, voice: &str) -> Result<Narration, SpeechError>;
}

pub struct CommandSpeaker {
    command: String,
}

impl CommandSpeaker {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            command: config.command.clone(),
        }
    }
}

impl Speaker for CommandSpeaker {
    fn launch(&self, text: &str, voice: &str) -> Result<Narration, SpeechError> {
        let mut child = Command::new(&self.command)
            .arg(format!("--voice={voice}"))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpeechError::Launch {
                command: self.command.clone(),
                source,
            })?;

        info!("Narrating with `{}` (voice: {voice}, pid: {:?})", self.command, child.id());

        Ok(Box::pin(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Narration finished"),
                Ok(status) => warn!("Narration exited with {status}"),
                Err(e) => warn!("Failed to wait on narration: {e}"),
            }
        }))
    }
}
