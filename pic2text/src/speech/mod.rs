//! Reading text aloud.
//!
//! [`SpeechAdapter`] owns the policy: empty text is ignored, language codes
//! map to locales, the closest voice is chosen and any utterance already
//! playing is cut off first. Engines only know how to list voices, stop
//! and start playback.

mod command;

pub use command::CommandSpeechEngine;

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::models::speech_locale_for;

/// A voice offered by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub locale: String,
}

/// What to say, in which locale, and with which voice (platform default when
/// `voice` is `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub voice: Option<Voice>,
}

pub trait SpeechEngine: Send + Sync {
    fn voices(&self) -> Vec<Voice>;

    /// Stops whatever is playing. A no-op when idle.
    fn cancel(&self);

    /// Starts playback and returns without waiting for it to finish.
    fn speak(&self, utterance: Utterance) -> Result<()>;
}

#[derive(Clone)]
pub struct SpeechAdapter {
    engine: Arc<dyn SpeechEngine>,
}

impl SpeechAdapter {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self { engine }
    }

    /// Speaks `text` in the locale for `language_code`, replacing anything
    /// currently being spoken.
    pub fn speak(&self, text: &str, language_code: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        let locale = speech_locale_for(language_code);
        let voice = best_voice(&self.engine.voices(), locale);
        debug!(%locale, voice = ?voice.as_ref().map(|v| &v.name), "Speaking text");

        self.engine.cancel();
        self.engine.speak(Utterance {
            text: text.to_string(),
            locale: locale.to_string(),
            voice,
        })
    }
}

fn normalize_locale(locale: &str) -> String {
    locale.trim().replace('_', "-").to_lowercase()
}

/// Exact locale match first, then a voice for the same base language.
pub fn best_voice(voices: &[Voice], locale: &str) -> Option<Voice> {
    let wanted = normalize_locale(locale);
    let wanted_base = wanted.split('-').next().unwrap_or_default();

    voices
        .iter()
        .find(|voice| normalize_locale(&voice.locale) == wanted)
        .or_else(|| {
            voices.iter().find(|voice| {
                normalize_locale(&voice.locale).split('-').next() == Some(wanted_base)
            })
        })
        .cloned()
}
