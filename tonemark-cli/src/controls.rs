use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use log::{info, warn};

use tonemark_lib::playback::{Player, RATE_STEP, SEEK_STEP_MS};
use tonemark_lib::session::{AnnotationSession, GestureOutcome};
use tonemark_lib::timing::DELAY_STEP_MS;
use tonemark_lib::todi::KeyRole;

pub enum KeyAction {
    Continue,
    Quit,
    Load(usize),
    /// Restart the current recording from the top, keeping its timeline.
    Replay,
}

/// The tone key a physical key maps to, if any.
fn key_role(key: &KeyEvent) -> Option<KeyRole> {
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Up => Some(KeyRole::High),
        KeyCode::Down => Some(KeyRole::Low),
        KeyCode::Left => Some(KeyRole::LeftBoundary),
        KeyCode::Right => Some(KeyRole::RightBoundary),
        KeyCode::Modifier(ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl) => {
            Some(KeyRole::Downstep)
        }
        _ => None,
    }
}

pub fn handle_key_event(
    key: KeyEvent,
    player: &mut Player,
    session: &mut AnnotationSession,
    current: usize,
    file_count: usize,
    keys_enhanced: bool,
) -> KeyAction {
    if let Some(role) = key_role(&key) {
        // Without release reporting a chord could never finalize, so the
        // tone keys stay inert on terminals lacking the protocol.
        if !keys_enhanced {
            return KeyAction::Continue;
        }
        match key.kind {
            KeyEventKind::Press => session.key_pressed(role, Instant::now()),
            KeyEventKind::Release => match session.key_released(role) {
                GestureOutcome::Annotated(entry) => {
                    info!("{} at {:.0} ms", entry.label, entry.time_ms)
                }
                GestureOutcome::Rejected(invalid) => warn!("{}", invalid),
                GestureOutcome::Pending | GestureOutcome::Abandoned => {}
            },
            // Auto-repeat is not a new press.
            KeyEventKind::Repeat => {}
        }
        return KeyAction::Continue;
    }

    if key.kind == KeyEventKind::Release {
        return KeyAction::Continue;
    }

    if key.kind == KeyEventKind::Press {
        // Held tone keys were not a gesture after all.
        session.interrupt_chord();
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char(' ') => {
            if player.is_finished() {
                return KeyAction::Replay;
            }
            player.toggle_play_pause();
            refresh_estimate(player, session);
        }
        KeyCode::Char('.') | KeyCode::Char('>') => seek(player, session, SEEK_STEP_MS),
        KeyCode::Char(',') | KeyCode::Char('<') => seek(player, session, -SEEK_STEP_MS),
        KeyCode::Char('-') => adjust_rate(player, session, -RATE_STEP),
        KeyCode::Char('+') | KeyCode::Char('=') => adjust_rate(player, session, RATE_STEP),
        KeyCode::Char('z') | KeyCode::Char('Z')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                session.clear_annotations();
                info!("cleared annotations");
            } else if let Some(entry) = session.undo_last() {
                info!("removed {} at {:.0} ms", entry.label, entry.time_ms);
            }
        }
        KeyCode::Char('d') => session.adjust_delay(-(DELAY_STEP_MS as i64)),
        KeyCode::Char('D') => session.adjust_delay(DELAY_STEP_MS as i64),
        KeyCode::Char(']') | KeyCode::PageDown => {
            return KeyAction::Load((current + 1) % file_count)
        }
        KeyCode::Char('[') | KeyCode::PageUp => {
            return KeyAction::Load((current + file_count - 1) % file_count)
        }
        KeyCode::Home => return KeyAction::Load(0),
        KeyCode::End => return KeyAction::Load(file_count.saturating_sub(1)),
        _ => {}
    }

    KeyAction::Continue
}

/// Seek and re-anchor the estimate so no extrapolation crosses the jump.
fn seek(player: &mut Player, session: &mut AnnotationSession, delta_ms: f64) {
    player.seek_relative(delta_ms);
    session.position_invalidated();
    refresh_estimate(player, session);
}

fn adjust_rate(player: &mut Player, session: &mut AnnotationSession, delta: f64) {
    // Anchor a fresh sample first; the new rate must not be applied to the
    // span already covered at the old rate.
    refresh_estimate(player, session);
    player.adjust_rate(delta);
    session.record_playback_state(player.is_playing(), player.rate());
}

fn refresh_estimate(player: &Player, session: &mut AnnotationSession) {
    let now = Instant::now();
    session.record_position(player.position_ms(), now);
    session.record_playback_state(player.is_playing(), player.rate());
}

pub struct StatusSnapshot {
    pub text: String,
}

pub struct StatusArgs {
    pub file_index: usize,
    pub file_count: usize,
    pub path: String,
    pub time_ms: f64,
    pub duration_ms: Option<f64>,
    pub playing: bool,
    pub finished: bool,
    pub rate: f64,
    pub configured_delay_ms: u64,
    pub effective_delay_ms: u64,
    pub annotation_count: usize,
}

pub fn status_text(args: StatusArgs) -> StatusSnapshot {
    let state = if args.playing {
        "▶ Playing"
    } else if args.finished {
        "⏹ Finished"
    } else {
        "⏸ Paused"
    };
    let current = format_time(args.time_ms);
    let (total, percent) = match args.duration_ms {
        Some(duration_ms) if duration_ms > 0.0 => (
            format_time(duration_ms),
            (args.time_ms / duration_ms * 100.0).min(100.0),
        ),
        _ => ("??:??:??".to_string(), 0.0),
    };
    let text = format!(
        "File {}/{}: {}\n{}   {} / {}   ({:>5.1}%)   rate {:.1}x\nDelay: {} ms (effective {} ms)   Annotations: {}",
        args.file_index + 1,
        args.file_count,
        args.path,
        state,
        current,
        total,
        percent,
        args.rate,
        args.configured_delay_ms,
        args.effective_delay_ms,
        args.annotation_count
    );

    StatusSnapshot { text }
}

/// Everything the track strip needs, independent of the frame width.
pub struct TrackState {
    pub duration_ms: Option<f64>,
    pub live_ms: f64,
    pub delayed_ms: f64,
    pub entries: Vec<(f64, String)>,
}

/// Render the track strip: a cursor row with the live and lagged cursors,
/// and a label row with each annotation at its relative position.
pub fn track_text(width: usize, state: &TrackState) -> String {
    let width = width.max(1);
    let Some(duration_ms) = state.duration_ms.filter(|duration| *duration > 0.0) else {
        return format!("{}\n{}", " ".repeat(width), " ".repeat(width));
    };

    let column = |time_ms: f64| -> usize {
        let fraction = (time_ms / duration_ms).clamp(0.0, 1.0);
        (fraction * (width - 1) as f64).round() as usize
    };

    let mut cursor_row = vec!['─'; width];
    cursor_row[column(state.delayed_ms)] = '▒';
    // Drawn second so the live cursor wins when the two coincide.
    cursor_row[column(state.live_ms)] = '█';

    let mut label_row = vec![' '; width];
    for (time_ms, label) in &state.entries {
        let start = column(*time_ms);
        if label_row[start] != ' ' {
            continue;
        }
        for (offset, ch) in label.chars().enumerate() {
            match label_row.get_mut(start + offset) {
                Some(cell) => *cell = ch,
                None => break,
            }
        }
    }

    format!(
        "{}\n{}",
        cursor_row.into_iter().collect::<String>(),
        label_row.into_iter().collect::<String>()
    )
}

fn format_time(time_ms: f64) -> String {
    let seconds = (time_ms / 1000.0).ceil() as u32;
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_strip_places_cursors_and_labels() {
        let state = TrackState {
            duration_ms: Some(1_000.0),
            live_ms: 1_000.0,
            delayed_ms: 0.0,
            entries: vec![(500.0, "H*".to_string())],
        };
        let text = track_text(11, &state);
        let lines: Vec<&str> = text.lines().collect();

        let cursors: Vec<char> = lines[0].chars().collect();
        assert_eq!(cursors[0], '▒');
        assert_eq!(cursors[10], '█');

        let labels: Vec<char> = lines[1].chars().collect();
        assert_eq!(labels[5], 'H');
        assert_eq!(labels[6], '*');
    }

    #[test]
    fn track_strip_is_blank_without_a_duration() {
        let state = TrackState {
            duration_ms: None,
            live_ms: 0.0,
            delayed_ms: 0.0,
            entries: vec![],
        };
        let text = track_text(8, &state);
        assert_eq!(text, format!("{}\n{}", " ".repeat(8), " ".repeat(8)));
    }

    #[test]
    fn colliding_labels_keep_the_first_one() {
        let state = TrackState {
            duration_ms: Some(1_000.0),
            live_ms: 0.0,
            delayed_ms: 0.0,
            entries: vec![(500.0, "H*".to_string()), (500.0, "L*".to_string())],
        };
        let text = track_text(11, &state);
        let labels = text.lines().nth(1).unwrap();
        assert!(labels.contains("H*"));
        assert!(!labels.contains("L*"));
    }
}
