/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `chat`: Interactive conversation with proactive engagement
- `ask`: Send one message and print the reply

Both handlers only wire library components together: the session, the
completion provider, speech collaborators, and the engagement monitor.
*/

use crate::agent::{Companion, Session, SessionEvent};
use crate::config::Config;
use crate::error::{Result, TeddyError};
use crate::providers::{create_provider, Message, Origin};
use crate::speech::create_synthesizer;
use std::sync::Arc;

// Special commands parser for the interactive loop
pub mod special_commands;

/// Render a transcript entry for the terminal
pub fn format_message(message: &Message) -> String {
    use colored::Colorize;

    match message.origin {
        Origin::User => format!("{} {}", "you:".green().bold(), message.text),
        Origin::Assistant => format!("{} {}", "teddy:".yellow().bold(), message.text),
        Origin::System => format!("{} {}", "system:".dimmed(), message.text.dimmed()),
    }
}

fn build_companion(config: &Config, session: Session) -> Result<Companion> {
    let provider = create_provider(&config.provider)?;
    let synthesizer = create_synthesizer(&config.speech);
    Ok(Companion::new(session, provider, synthesizer, config))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Reads lines with rustyline on a blocking thread, renders the
    //! transcript from session events, and runs the engagement monitor in
    //! the background so proactive messages appear while the prompt waits.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use crate::agent::EngagementMonitor;
    use crate::camera::{acquire_preview, CameraConstraints, DeviceCamera};
    use crate::speech::{create_recognizer, VoiceInput};
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use tokio::sync::{broadcast, mpsc, oneshot};
    use std::time::Duration;
    use tokio::task::JoinSet;

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error if the provider or the line editor cannot be created
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let session = Session::new();
        let companion = Arc::new(build_companion(&config, session.clone())?);
        let voice = create_recognizer(&config.speech)
            .map(|recognizer| Arc::new(VoiceInput::new(recognizer, config.speech.locale.clone())));

        let camera = if config.camera.enabled {
            acquire_preview(&DeviceCamera, &CameraConstraints::from(&config.camera)).await
        } else {
            None
        };

        let renderer = tokio::spawn(render_transcript(session.subscribe()));
        let monitor = EngagementMonitor::new(session.clone(), &config.session).spawn();

        print_welcome_banner(&config, camera.is_some(), voice.is_some());

        let mut lines = spawn_line_reader().await?;
        let mut turns = JoinSet::new();

        while let Some(line) = lines.recv().await {
            match parse_special_command(&line) {
                Ok(SpecialCommand::Exit) => break,
                Ok(SpecialCommand::Help) => print_help(),
                Ok(SpecialCommand::ShowStatus) => {
                    print_status(&session, &config, camera.is_some(), monitor.is_running())
                }
                Ok(SpecialCommand::Voice) => match &voice {
                    Some(voice) if voice.is_listening() => println!("Already listening..."),
                    Some(voice) => {
                        println!("Listening...");
                        let companion = Arc::clone(&companion);
                        let voice = Arc::clone(voice);
                        turns.spawn(async move {
                            if let Err(e) = companion.send_voice(&voice).await {
                                tracing::warn!("Voice input failed: {}", e);
                            }
                        });
                    }
                    None => println!("Voice input is not configured (speech.stt_command)"),
                },
                Ok(SpecialCommand::None) => {
                    let companion = Arc::clone(&companion);
                    turns.spawn(async move {
                        companion.send(&line).await;
                    });
                }
                Err(e) => println!("{}", e),
            }

            // Reap finished turns so the set does not grow for the whole session
            while turns.try_join_next().is_some() {}
        }

        tracing::info!("Ending chat session");
        if !turns.is_empty() {
            println!("Waiting for teddy to finish...");
        }
        if !drain_turns(&mut turns, TURN_DRAIN_TIMEOUT).await {
            tracing::warn!(
                "Abandoning {} unfinished turns after {}s",
                turns.len(),
                TURN_DRAIN_TIMEOUT.as_secs()
            );
        }
        turns.shutdown().await;
        monitor.shutdown().await;
        renderer.abort();
        drop(camera);

        Ok(())
    }

    /// How long in-flight turns may keep running after the user quits
    pub(crate) const TURN_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

    /// Wait up to `limit` for in-flight turns; returns whether all finished
    pub(crate) async fn drain_turns(turns: &mut JoinSet<()>, limit: Duration) -> bool {
        tokio::time::timeout(limit, async {
            while let Some(joined) = turns.join_next().await {
                if let Err(e) = joined {
                    tracing::warn!("Chat turn failed: {}", e);
                }
            }
        })
        .await
        .is_ok()
    }

    /// Read lines on a blocking thread and forward them to the async loop
    ///
    /// The editor lives on the reader thread. The reader stops after
    /// forwarding an exit command, or on Ctrl-C/Ctrl-D.
    async fn spawn_line_reader() -> Result<mpsc::Receiver<String>> {
        let (tx, rx) = mpsc::channel(16);
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::task::spawn_blocking(move || {
            let mut rl = match DefaultEditor::new() {
                Ok(rl) => {
                    let _ = ready_tx.send(Ok(()));
                    rl
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            loop {
                match rl.readline("> ") {
                    Ok(line) => {
                        let trimmed = line.trim().to_string();
                        if trimmed.is_empty() {
                            continue;
                        }
                        let _ = rl.add_history_entry(trimmed.as_str());
                        let exit = matches!(
                            parse_special_command(&trimmed),
                            Ok(SpecialCommand::Exit)
                        );
                        if tx.blocking_send(trimmed).is_err() || exit {
                            break;
                        }
                    }
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                    Err(e) => {
                        tracing::error!("Readline error: {}", e);
                        break;
                    }
                }
            }
        });

        ready_rx
            .await
            .map_err(|_| anyhow::anyhow!("Line reader stopped before starting"))?
            .map_err(TeddyError::from)?;

        Ok(rx)
    }

    async fn render_transcript(mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(SessionEvent::Appended { message, .. }) => {
                    // The line editor already echoed the user's input
                    if message.origin != Origin::User {
                        println!("{}", format_message(&message));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Transcript renderer skipped {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn print_welcome_banner(config: &Config, camera: bool, voice: bool) {
        use colored::Colorize;

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                TeddyAI - Teddy Bear Companion                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model:  {}", config.provider.model.cyan());
        println!(
            "Camera: {}   Voice input: {}   Speech output: {}",
            on_off(camera),
            on_off(voice),
            on_off(config.speech.output_enabled)
        );
        println!("Type '/help' for available commands, 'quit' to leave\n");
    }

    fn print_status(session: &Session, config: &Config, camera: bool, monitor_running: bool) {
        println!("\nMessages:        {}", session.len());
        println!(
            "Idle window:     {}s",
            config.session.idle_window_seconds
        );
        println!("Monitor running: {}", on_off(monitor_running));
        println!("Camera:          {}\n", on_off(camera));
    }

    fn on_off(value: bool) -> colored::ColoredString {
        use colored::Colorize;

        if value {
            "on".green()
        } else {
            "off".dimmed()
        }
    }
}

// Single-message command handler
pub mod ask {
    //! One-shot mode: send a single message and print the reply.

    use super::*;

    /// Send `prompt` and print the assistant's answer
    ///
    /// Conversation failures are printed like any other reply.
    ///
    /// # Errors
    ///
    /// Returns error if the prompt is blank or the provider cannot be created
    pub async fn run_ask(config: Config, prompt: String) -> Result<()> {
        if prompt.trim().is_empty() {
            anyhow::bail!("Prompt cannot be empty");
        }

        let session = Session::new();
        let companion = build_companion(&config, session.clone())?;

        if let Some(result) = companion.send(&prompt).await {
            tracing::debug!(success = result.is_success(), "Ask completed");
        }

        if let Some(reply) = session
            .snapshot()
            .into_iter()
            .rev()
            .find(|m| m.origin == Origin::Assistant)
        {
            println!("{}", format_message(&reply));
        }

        Ok(())
    }
}
