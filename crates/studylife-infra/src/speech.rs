//! Terminal speech adapters.
//!
//! Synthesis shells out to a local text-to-speech binary (`espeak`,
//! `espeak-ng` or macOS `say`). There is no terminal recognizer, so
//! [`UnsupportedRecognizer`] always reports unavailable and the voice
//! controller disables voice input for the session.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use studylife_core::speech::{SpeechToText, TextToSpeech};
use studylife_types::error::SpeechError;
use tokio::process::Command;
use tokio::sync::oneshot;

const CANDIDATES: [&str; 3] = ["espeak-ng", "espeak", "say"];

/// Find the first synthesizer binary on `PATH`.
pub fn find_synthesizer() -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_in(std::env::split_paths(&path))
}

fn find_in(dirs: impl Iterator<Item = PathBuf>) -> Option<PathBuf> {
    let dirs: Vec<PathBuf> = dirs.collect();
    CANDIDATES.iter().find_map(|name| {
        dirs.iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Speaks through an external command. One utterance at a time.
pub struct CommandSynthesizer {
    program: Option<PathBuf>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
}

impl CommandSynthesizer {
    /// Use the first synthesizer found on `PATH`, if any.
    pub fn detect() -> Self {
        Self::with_program(find_synthesizer())
    }

    pub fn with_program(program: Option<PathBuf>) -> Self {
        if let Some(program) = &program {
            tracing::debug!(program = %program.display(), "Using speech synthesizer");
        }
        Self {
            program,
            stop: Mutex::new(None),
        }
    }

    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }
}

impl TextToSpeech for CommandSynthesizer {
    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        let program = self.program.as_ref().ok_or(SpeechError::Unavailable)?;

        let mut child = Command::new(program)
            .arg(text)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SpeechError::StartFailed(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        // Replacing the sender cancels any previous utterance.
        *self.stop.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| SpeechError::Synthesis(e.to_string()))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(SpeechError::Synthesis(format!("synthesizer exited with {status}")))
                }
            }
            _ = rx => {
                let _ = child.kill().await;
                Ok(())
            }
        }
    }

    fn cancel(&self) {
        if let Some(tx) = self.stop.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = tx.send(());
        }
    }
}

/// Recognizer for environments without speech input.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRecognizer;

impl SpeechToText for UnsupportedRecognizer {
    fn is_available(&self) -> bool {
        false
    }

    async fn listen(&self) -> Result<String, SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn stop(&self) {}
}
