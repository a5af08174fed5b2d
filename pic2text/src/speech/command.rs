use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, OnceLock, PoisonError};

use tracing::{debug, warn};

use super::{SpeechEngine, Utterance, Voice};
use crate::config::SpeechConfig;
use crate::error::{Pic2TextError, Result};

/// Speech through an espeak-ng compatible command line synthesizer.
///
/// At most one synthesizer process is alive at a time; `cancel` kills it.
pub struct CommandSpeechEngine {
    program: String,
    current: Mutex<Option<Child>>,
    voices: OnceLock<Vec<Voice>>,
}

impl CommandSpeechEngine {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            program: config.command.clone(),
            current: Mutex::new(None),
            voices: OnceLock::new(),
        }
    }

    fn list_voices(&self) -> Vec<Voice> {
        match Command::new(&self.program).arg("--voices").output() {
            Ok(output) if output.status.success() => {
                parse_voice_listing(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                warn!(program = %self.program, status = %output.status, "Voice listing failed");
                Vec::new()
            }
            Err(e) => {
                warn!(program = %self.program, error = %e, "Speech synthesizer not available");
                Vec::new()
            }
        }
    }
}

/// Parses `--voices` output:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US
/// ```
///
/// The language column doubles as the voice name passed to `-v`.
fn parse_voice_listing(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let language = columns.next()?;
            Some(Voice {
                name: language.to_string(),
                locale: language.to_string(),
            })
        })
        .collect()
}

impl SpeechEngine for CommandSpeechEngine {
    fn voices(&self) -> Vec<Voice> {
        self.voices.get_or_init(|| self.list_voices()).clone()
    }

    fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut child) = current.take() {
            if let Ok(None) = child.try_wait() {
                debug!(pid = child.id(), "Cancelling utterance");
                if let Err(e) = child.kill() {
                    warn!(error = %e, "Failed to stop synthesizer");
                }
            }
            let _ = child.wait();
        }
    }

    fn speak(&self, utterance: Utterance) -> Result<()> {
        let mut command = Command::new(&self.program);
        if let Some(voice) = &utterance.voice {
            command.arg("-v").arg(&voice.name);
        }
        command
            .arg("--")
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = command.spawn().map_err(|e| {
            Pic2TextError::Speech(format!("Failed to start '{}': {e}", self.program))
        })?;

        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut previous) = current.replace(child) {
            let _ = previous.kill();
            let _ = previous.wait();
        }
        Ok(())
    }
}
