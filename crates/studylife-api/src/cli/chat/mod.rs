//! Interactive chat with the study assistant.
//!
//! Reads lines with rustyline-async, handles slash commands, forwards
//! everything else to the workspace and prints notices as they arrive.
//! Replies can be read aloud through the local speech synthesizer.

pub mod attachment;
pub mod commands;
pub mod input;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use rustyline_async::SharedWriter;
use tokio::sync::broadcast;

use studylife_core::speech::VoiceController;
use studylife_core::workspace::StudentWorkspace;
use studylife_infra::speech::{CommandSynthesizer, UnsupportedRecognizer};
use studylife_types::chat::{Attachment, ChatMessage, ChatRole};
use studylife_types::notice::{Notice, NoticeLevel};

use commands::ChatCommand;
use input::{ChatInput, InputEvent};

type Voice = VoiceController<UnsupportedRecognizer, CommandSynthesizer>;

/// Messages of history shown when the chat opens.
const RECENT_ON_OPEN: usize = 6;

pub async fn run_chat(ws: &mut StudentWorkspace) -> Result<()> {
    let voice = Arc::new(VoiceController::new(
        UnsupportedRecognizer,
        CommandSynthesizer::detect(),
        ws.notices().clone(),
    ));
    // Spoken replies start off in the terminal.
    voice.toggle_tts();

    let mut notices = ws.notices().subscribe();
    let (mut chat_input, mut out) = ChatInput::new(format!("{} ", style("you ›").green().bold()))?;

    print_banner(&mut out, ws);

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                let _ = writeln!(out, "\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                let _ = writeln!(out, "\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }
                match commands::parse(&text) {
                    None => send(ws, &mut out, &voice, &text, None).await,
                    Some(ChatCommand::Help) => commands::print_help(&mut out),
                    Some(ChatCommand::Clear) => chat_input.clear(),
                    Some(ChatCommand::Exit) => {
                        let _ = writeln!(out, "\n  {}", style("Session ended.").dim());
                        break;
                    }
                    Some(ChatCommand::History) => {
                        for message in ws.chat_history() {
                            print_message(&mut out, message);
                        }
                    }
                    Some(ChatCommand::Attach { path, text }) => {
                        match attachment::load_attachment(&path).await {
                            Ok(file) => send(ws, &mut out, &voice, &text, Some(file)).await,
                            Err(e) => {
                                let _ = writeln!(out, "  {} {e:#}", style("✗").red().bold());
                            }
                        }
                    }
                    Some(ChatCommand::Voice) => {
                        let on = voice.toggle_tts();
                        let _ = writeln!(
                            out,
                            "  {} Spoken replies {}",
                            style("🔊").bold(),
                            if on { "on" } else { "off" }
                        );
                    }
                    Some(ChatCommand::Listen) => {
                        if let Ok(Some(transcript)) = voice.toggle_listening().await {
                            print_message(&mut out, &ChatMessage::user(transcript.clone()));
                            send(ws, &mut out, &voice, &transcript, None).await;
                        }
                    }
                    Some(ChatCommand::Unknown(cmd)) => {
                        let _ = writeln!(
                            out,
                            "  {} Unknown command: {cmd}. Type /help.",
                            style("!").yellow().bold()
                        );
                    }
                }
            }
        }
        drain_notices(&mut notices, &mut out);
    }

    chat_input.flush();
    Ok(())
}

async fn send(
    ws: &mut StudentWorkspace,
    out: &mut SharedWriter,
    voice: &Arc<Voice>,
    text: &str,
    attachment: Option<Attachment>,
) {
    let was_sos = ws.is_sos_active();
    let Some(reply) = ws.send_message(text, attachment).await else {
        return;
    };

    if ws.is_sos_active() && !was_sos {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {}", style("🚨 EMERGENCY MODE").red().bold());
        for contact in ws.emergency_contacts() {
            let _ = writeln!(out, "  {:<18} {}", contact.label, style(&contact.phone).bold());
        }
    }
    print_message(out, &reply);

    if voice.is_tts_enabled() {
        let voice = Arc::clone(voice);
        tokio::spawn(async move { voice.speak(&reply.text).await });
    }
}

fn print_banner(out: &mut SharedWriter, ws: &StudentWorkspace) {
    let _ = writeln!(out);
    let _ = writeln!(out, "  {} {}", style("📚").bold(), style("StudyLife Assistant").cyan().bold());
    let _ = writeln!(out, "  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    let _ = writeln!(out, "  {}", style("---").dim());
    let history = ws.chat_history();
    for message in &history[history.len().saturating_sub(RECENT_ON_OPEN)..] {
        print_message(out, message);
    }
}

fn print_message(out: &mut impl Write, message: &ChatMessage) {
    let _ = match message.role {
        ChatRole::User => writeln!(out, "  {} {}", style("you ›").green().bold(), message.text),
        ChatRole::Model => writeln!(out, "  {} {}", style("ai  ›").cyan().bold(), message.text),
    };
}

fn drain_notices(rx: &mut broadcast::Receiver<Notice>, out: &mut impl Write) {
    loop {
        match rx.try_recv() {
            Ok(notice) => {
                let marker = match notice.level {
                    NoticeLevel::Success => style("✓").green(),
                    NoticeLevel::Info => style("ℹ").cyan(),
                    NoticeLevel::Error => style("✗").red(),
                };
                let _ = writeln!(out, "  {marker} {}", style(&notice.message).dim());
            }
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
}
