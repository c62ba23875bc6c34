//! `studylife pomodoro`: a focus timer in the terminal.
//!
//! One progress bar per phase, advanced once a second. Ctrl+C stops.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use studylife_core::notice::bus::NoticeBus;
use studylife_core::pomodoro::{
    FOCUS, LONG_BREAK, PhaseTransition, PomodoroPhase, PomodoroTimer, SHORT_BREAK,
};

const TICK: Duration = Duration::from_secs(1);

pub async fn run(notices: &NoticeBus, max_sessions: Option<u32>, json: bool) -> Result<()> {
    let mut timer = PomodoroTimer::new();
    timer.toggle();

    let mut bar = phase_bar(&timer, json);
    let mut interval = tokio::time::interval(TICK);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        for transition in timer.tick(TICK) {
            bar.finish_and_clear();
            let message = transition_message(&transition);
            if transition.to.is_break() {
                notices.success(message.clone());
            } else {
                notices.info(message.clone());
            }
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "phase": transition.to.to_string(),
                        "sessions": transition.sessions,
                    })
                );
            } else {
                println!("  {} {message}", style("⏰").bold());
            }
            bar = phase_bar(&timer, json);
        }

        if max_sessions.is_some_and(|max| timer.sessions() >= max) {
            break;
        }
        bar.set_position(elapsed_in_phase(&timer).as_secs());
        bar.set_message(timer.display());
    }

    bar.finish_and_clear();
    if !json {
        println!(
            "  {} {} sessions completed",
            style("✓").green().bold(),
            timer.sessions()
        );
    }
    Ok(())
}

fn phase_length(phase: PomodoroPhase) -> Duration {
    match phase {
        PomodoroPhase::Focus => FOCUS,
        PomodoroPhase::ShortBreak => SHORT_BREAK,
        PomodoroPhase::LongBreak => LONG_BREAK,
    }
}

fn elapsed_in_phase(timer: &PomodoroTimer) -> Duration {
    phase_length(timer.phase()).saturating_sub(timer.remaining())
}

fn transition_message(transition: &PhaseTransition) -> String {
    match transition.to {
        PomodoroPhase::Focus => format!(
            "Break over. Session {} starts now.",
            transition.sessions + 1
        ),
        PomodoroPhase::ShortBreak => "Focus done! Take a 5 minute break.".to_string(),
        PomodoroPhase::LongBreak => "Great work! Take a 15 minute break.".to_string(),
    }
}

fn phase_bar(timer: &PomodoroTimer, json: bool) -> ProgressBar {
    if json {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(phase_length(timer.phase()).as_secs());
    let color = if timer.phase().is_break() { "green" } else { "cyan" };
    let template = format!("  {} {{bar:30.{color}}} {{msg}}", timer.phase());
    if let Ok(bar_style) = ProgressStyle::default_bar().template(&template) {
        bar.set_style(bar_style.progress_chars("█▓░"));
    }
    bar.set_message(timer.display());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourth_focus_announces_long_break() {
        let transition = PhaseTransition {
            from: PomodoroPhase::Focus,
            to: PomodoroPhase::LongBreak,
            sessions: 3,
        };
        assert!(transition_message(&transition).contains("15 minute"));
    }

    #[test]
    fn focus_message_names_next_session() {
        let transition = PhaseTransition {
            from: PomodoroPhase::ShortBreak,
            to: PomodoroPhase::Focus,
            sessions: 1,
        };
        assert_eq!(
            transition_message(&transition),
            "Break over. Session 2 starts now."
        );
    }

    #[test]
    fn elapsed_tracks_ticks() {
        let mut timer = PomodoroTimer::new();
        timer.toggle();
        timer.tick(Duration::from_secs(90));
        assert_eq!(elapsed_in_phase(&timer), Duration::from_secs(90));
    }
}
