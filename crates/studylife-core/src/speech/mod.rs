//! Speech ports and the voice controller.
//!
//! `SpeechToText` and `TextToSpeech` are implemented in studylife-infra.
//! `VoiceController` owns the session-level voice state: whether the
//! services are available, whether replies are spoken, and whether the
//! microphone is currently listening.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use studylife_types::error::SpeechError;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::notice::bus::NoticeBus;

pub const RECOGNITION_UNSUPPORTED_NOTICE: &str = "Speech recognition not supported on this device.";
pub const RECOGNITION_ERROR_NOTICE: &str = "Voice recognition error. Please try again.";
pub const RECOGNITION_START_NOTICE: &str = "Could not start voice recognition.";

/// Speech recognition backend.
pub trait SpeechToText: Send + Sync {
    fn is_available(&self) -> bool;

    /// Capture one utterance and return its transcript.
    fn listen(&self) -> impl std::future::Future<Output = Result<String, SpeechError>> + Send;

    /// Stop an ongoing capture.
    fn stop(&self);
}

/// Speech synthesis backend.
pub trait TextToSpeech: Send + Sync {
    fn is_available(&self) -> bool;

    /// Speak `text`, resolving when playback ends.
    fn speak(&self, text: &str) -> impl std::future::Future<Output = Result<(), SpeechError>> + Send;

    /// Stop any ongoing playback.
    fn cancel(&self);
}

/// Playback lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started,
    Ended,
    Error(String),
}

/// Session-level voice input/output state.
pub struct VoiceController<R: SpeechToText, T: TextToSpeech> {
    recognizer: R,
    synthesizer: T,
    notices: NoticeBus,
    /// Recognition availability, probed on first use.
    recognition_available: OnceLock<bool>,
    tts_enabled: AtomicBool,
    listening: Arc<AtomicBool>,
    speaking: Arc<AtomicBool>,
    events: broadcast::Sender<SpeechEvent>,
}

impl<R: SpeechToText, T: TextToSpeech> VoiceController<R, T> {
    pub fn new(recognizer: R, synthesizer: T, notices: NoticeBus) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            recognizer,
            synthesizer,
            notices,
            recognition_available: OnceLock::new(),
            tts_enabled: AtomicBool::new(true),
            listening: Arc::new(AtomicBool::new(false)),
            speaking: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SpeechEvent> {
        self.events.subscribe()
    }

    pub fn is_tts_enabled(&self) -> bool {
        self.tts_enabled.load(Ordering::Relaxed)
    }

    /// Flip spoken replies on or off. Returns the new state.
    pub fn toggle_tts(&self) -> bool {
        let enabled = !self.tts_enabled.fetch_xor(true, Ordering::Relaxed);
        if !enabled {
            self.synthesizer.cancel();
        }
        enabled
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Relaxed)
    }

    /// Speak a reply when spoken replies are enabled.
    ///
    /// Any ongoing playback is cancelled first. Failures are reported as
    /// events only.
    pub async fn speak(&self, text: &str) {
        if !self.is_tts_enabled() || !self.synthesizer.is_available() {
            return;
        }
        self.synthesizer.cancel();
        self.speaking.store(true, Ordering::Relaxed);
        let _ = self.events.send(SpeechEvent::Started);

        let result = self.synthesizer.speak(text).await;

        self.speaking.store(false, Ordering::Relaxed);
        let event = match result {
            Ok(()) => SpeechEvent::Ended,
            Err(e) => {
                debug!(error = %e, "Speech synthesis failed");
                SpeechEvent::Error(e.to_string())
            }
        };
        let _ = self.events.send(event);
    }

    /// Start listening, or stop if already listening.
    ///
    /// Returns the transcript of a completed capture. Availability is
    /// probed on the first call only; while unavailable every call
    /// publishes a notice and fails.
    pub async fn toggle_listening(&self) -> Result<Option<String>, SpeechError> {
        let available = *self
            .recognition_available
            .get_or_init(|| self.recognizer.is_available());
        if !available {
            self.notices.error(RECOGNITION_UNSUPPORTED_NOTICE);
            return Err(SpeechError::Unavailable);
        }

        if self.listening.swap(false, Ordering::SeqCst) {
            self.recognizer.stop();
            return Ok(None);
        }

        self.synthesizer.cancel();
        self.speaking.store(false, Ordering::Relaxed);
        self.listening.store(true, Ordering::SeqCst);
        let result = self.recognizer.listen().await;
        self.listening.store(false, Ordering::SeqCst);

        match result {
            Ok(transcript) => {
                let transcript = transcript.trim().to_string();
                Ok((!transcript.is_empty()).then_some(transcript))
            }
            Err(SpeechError::StartFailed(reason)) => {
                warn!(reason = %reason, "Could not start voice recognition");
                self.notices.error(RECOGNITION_START_NOTICE);
                Err(SpeechError::StartFailed(reason))
            }
            Err(e) => {
                warn!(error = %e, "Voice recognition failed");
                self.notices.error(RECOGNITION_ERROR_NOTICE);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    struct FakeRecognizer {
        available: bool,
        result: Result<String, SpeechError>,
        probes: Arc<AtomicUsize>,
    }

    impl SpeechToText for FakeRecognizer {
        fn is_available(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.available
        }

        async fn listen(&self) -> Result<String, SpeechError> {
            self.result.clone()
        }

        fn stop(&self) {}
    }

    #[derive(Default, Clone)]
    struct FakeSynth {
        spoken: Arc<Mutex<Vec<String>>>,
        cancels: Arc<AtomicUsize>,
    }

    impl TextToSpeech for FakeSynth {
        fn is_available(&self) -> bool {
            true
        }

        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn recognizer(available: bool, result: Result<String, SpeechError>) -> FakeRecognizer {
        FakeRecognizer {
            available,
            result,
            probes: Arc::default(),
        }
    }

    #[tokio::test]
    async fn unavailable_recognition_is_probed_once_and_notified() {
        let notices = NoticeBus::default();
        let rec = recognizer(false, Ok(String::new()));
        let probes = Arc::clone(&rec.probes);
        let voice = VoiceController::new(rec, FakeSynth::default(), notices.clone());

        assert_eq!(voice.toggle_listening().await, Err(SpeechError::Unavailable));
        assert_eq!(voice.toggle_listening().await, Err(SpeechError::Unavailable));

        assert_eq!(probes.load(Ordering::SeqCst), 1);
        let active = notices.active(chrono::Utc::now());
        assert_eq!(active[0].message, RECOGNITION_UNSUPPORTED_NOTICE);
    }

    #[tokio::test]
    async fn listening_returns_trimmed_transcript_and_cancels_speech() {
        let synth = FakeSynth::default();
        let voice = VoiceController::new(
            recognizer(true, Ok("  plan my week ".into())),
            synth.clone(),
            NoticeBus::default(),
        );
        let transcript = voice.toggle_listening().await.unwrap();
        assert_eq!(transcript.as_deref(), Some("plan my week"));
        assert_eq!(synth.cancels.load(Ordering::SeqCst), 1);
        assert!(!voice.is_listening());
    }

    #[tokio::test]
    async fn recognition_error_publishes_notice() {
        let notices = NoticeBus::default();
        let voice = VoiceController::new(
            recognizer(true, Err(SpeechError::Recognition("no-speech".into()))),
            FakeSynth::default(),
            notices.clone(),
        );
        assert!(voice.toggle_listening().await.is_err());
        assert_eq!(
            notices.active(chrono::Utc::now())[0].message,
            RECOGNITION_ERROR_NOTICE
        );
    }

    #[tokio::test]
    async fn speak_emits_lifecycle_events() {
        let synth = FakeSynth::default();
        let voice = VoiceController::new(
            recognizer(true, Ok(String::new())),
            synth.clone(),
            NoticeBus::default(),
        );
        let mut events = voice.subscribe();

        voice.speak("Good luck!").await;

        assert_eq!(events.recv().await.unwrap(), SpeechEvent::Started);
        assert_eq!(events.recv().await.unwrap(), SpeechEvent::Ended);
        assert_eq!(*synth.spoken.lock().unwrap(), vec!["Good luck!".to_string()]);
        assert!(!voice.is_speaking());
    }

    #[tokio::test]
    async fn disabled_tts_stays_silent() {
        let synth = FakeSynth::default();
        let voice = VoiceController::new(
            recognizer(true, Ok(String::new())),
            synth.clone(),
            NoticeBus::default(),
        );
        assert!(!voice.toggle_tts());
        voice.speak("hello").await;
        assert!(synth.spoken.lock().unwrap().is_empty());
        assert!(voice.toggle_tts());
    }
}
