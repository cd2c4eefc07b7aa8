//! Voice I/O capability seam.
//!
//! Speech recognition and synthesis are platform features the service
//! itself does not implement. Hosts that have them expose the capability
//! through this trait; everywhere else the no-op fallback reports voice as
//! unavailable and the helper degrades to text only.

use tracing::debug;

/// Capability interface for voice input/output.
pub trait SpeechCapability: Send + Sync + std::fmt::Debug {
    /// Whether speech input is available on this host.
    fn supports_speech_input(&self) -> bool;

    /// Begin capturing speech. Returns `false` when unsupported.
    fn start_listening(&self) -> bool;

    /// Stop capturing speech. A no-op when nothing is listening.
    fn stop_listening(&self);

    /// Speak a line of text aloud, if synthesis is available.
    fn speak(&self, text: &str);
}

/// Fallback implementation for hosts without any speech support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpeech;

impl SpeechCapability for NullSpeech {
    fn supports_speech_input(&self) -> bool {
        false
    }

    fn start_listening(&self) -> bool {
        false
    }

    fn stop_listening(&self) {}

    fn speak(&self, text: &str) {
        debug!(chars = text.len(), "speech synthesis unavailable, dropping utterance");
    }
}
