use std::path::Path;

use tokio::process::Command;

use crate::app::BackendEvent;
use crate::reader::{SpeechEngine, Utterance};

/// Words per minute at rate 1.0 for both espeak-ng and say.
const BASE_WORDS_PER_MINUTE: f64 = 175.0;

#[cfg(target_os = "macos")]
const DEFAULT_PROGRAM: &str = "say";
#[cfg(not(target_os = "macos"))]
const DEFAULT_PROGRAM: &str = "espeak-ng";

/// Speaks each utterance by running a system TTS program to completion.
/// The process exit is the completion notification.
pub struct ProcessSpeech {
    program: String,
    runtime: tokio::runtime::Handle,
    sender: async_channel::Sender<BackendEvent>,
    /// Signals the task owning the running process to kill it.
    current: Option<async_channel::Sender<()>>,
}

impl ProcessSpeech {
    pub fn new(
        program: Option<&str>,
        runtime: tokio::runtime::Handle,
        sender: async_channel::Sender<BackendEvent>,
    ) -> Self {
        let program = program.unwrap_or(DEFAULT_PROGRAM).to_string();
        log::info!("Read aloud uses {program}");
        Self {
            program,
            runtime,
            sender,
            current: None,
        }
    }
}

impl SpeechEngine for ProcessSpeech {
    fn speak(&mut self, utterance: Utterance) {
        self.cancel();

        let (cancel_tx, cancel_rx) = async_channel::bounded::<()>(1);
        self.current = Some(cancel_tx);

        let mut command = Command::new(&self.program);
        command
            .args(speech_args(&self.program, &utterance.text, utterance.rate))
            .kill_on_drop(true);
        let sender = self.sender.clone();
        let program = self.program.clone();

        self.runtime.spawn(async move {
            let mut child = match command.spawn() {
                Ok(child) => child,
                Err(e) => {
                    // No completion is sent: playback stays on this sentence
                    // until the user stops it.
                    log::warn!("Failed to spawn {program}: {e}");
                    return;
                }
            };

            tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) if !status.success() => {
                            log::warn!("{program} exited with status {status}");
                        }
                        Err(e) => log::warn!("Waiting on {program} failed: {e}"),
                        Ok(_) => {}
                    }
                    let _ = sender.send(BackendEvent::UtteranceFinished(utterance.id)).await;
                }
                _ = cancel_rx.recv() => {
                    if let Err(e) = child.kill().await {
                        log::debug!("Could not kill {program}: {e}");
                    }
                }
            }
        });
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.current.take() {
            let _ = cancel.try_send(());
        }
    }
}

/// Command-line arguments for one sentence. `say` takes `-r`, everything
/// else is treated as espeak compatible and takes `-s`. The text follows
/// `--` so a sentence starting with `-` is never read as an option.
fn speech_args(program: &str, text: &str, rate: f64) -> Vec<String> {
    let wpm = (BASE_WORDS_PER_MINUTE * rate).round() as u32;
    let is_say = Path::new(program)
        .file_name()
        .is_some_and(|name| name == "say");
    let flag = if is_say { "-r" } else { "-s" };
    vec![
        flag.to_string(),
        wpm.to_string(),
        "--".to_string(),
        text.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn espeak_args_scale_rate() {
        assert_eq!(
            speech_args("espeak-ng", "Hello there.", 1.2),
            vec!["-s", "210", "--", "Hello there."]
        );
    }

    #[test]
    fn say_uses_rate_flag() {
        assert_eq!(
            speech_args("/usr/bin/say", "Go now!", 1.0),
            vec!["-r", "175", "--", "Go now!"]
        );
    }

    #[test]
    fn leading_dash_text_is_not_an_option() {
        assert_eq!(
            speech_args("espeak-ng", "-5 degrees.", 1.0),
            vec!["-s", "175", "--", "-5 degrees."]
        );
        assert_eq!(
            speech_args("espeak-ng", "-- and then.", 1.0),
            vec!["-s", "175", "--", "-- and then."]
        );
    }
}
