use std::{
    collections::VecDeque,
    error::Error,
    io,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use clap::ArgMatches;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use tonemark_lib::playback::Player;
use tonemark_lib::session::AnnotationSession;
use tonemark_lib::timeline::AnnotationTimeline;

use crate::{
    annotations::{self, Store},
    cli, controls, logging, ui,
};

const POLL_TIMEOUT_MS: u64 = 3;
const DRAW_EVERY: Duration = Duration::from_millis(30);
const SAMPLE_EVERY: Duration = Duration::from_millis(80);

pub fn run(args: &ArgMatches, log_buffer: Arc<Mutex<VecDeque<String>>>) -> Result<i32, Box<dyn Error>> {
    // Headless inspection first; it must not touch the audio device.
    if let Some(code) = cli::dump::maybe_run_dump(args)? {
        return Ok(code);
    }

    info!("Starting Tonemark");

    let files: Vec<String> = args
        .get_many::<String>("FILES")
        .unwrap()
        .cloned()
        .collect();
    let store = Store::from_args(
        args.get_one::<String>("json").map(String::as_str),
        args.get_one::<String>("textgrid").map(String::as_str),
    );
    let delay_ms = args
        .get_one::<String>("delay-ms")
        .unwrap()
        .parse::<u64>()
        .unwrap_or(0);
    let gain = args
        .get_one::<String>("GAIN")
        .unwrap()
        .parse::<f32>()
        .unwrap_or(70.0);
    let quiet = args.get_flag("quiet");

    let map = annotations::load_map(&files, &store);
    let mut timelines = annotations::timelines_from_map(&files, &map);
    let mut durations_ms: Vec<Option<f64>> = vec![None; files.len()];

    // Driver probing writes straight to stderr; route it into the log panel.
    let _stderr_capture = logging::capture_stderr(log_buffer.clone());

    let mut player = Player::new()?;
    player.set_volume(gain / 100.0);

    let mut session = AnnotationSession::new();
    let mut current = 0usize;
    load_recording(
        &files,
        &mut player,
        &mut session,
        &mut timelines,
        &mut durations_ms,
        current,
        current,
    )?;
    session.configure_delay(delay_ms);

    let _raw_mode = RawModeGuard::enable().ok();
    let keys_enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
    if keys_enhanced {
        let _ = execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        );
    } else {
        warn!("terminal does not report key releases; tone keys are disabled");
    }

    let mut terminal = if !quiet {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, EnterAlternateScreen, cursor::Hide);
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).ok()
    } else {
        None
    };

    let mut last_tick = Instant::now();
    let mut last_sample = last_tick;
    let mut last_draw = last_tick;

    // UI / input loop.
    loop {
        if event::poll(Duration::from_millis(POLL_TIMEOUT_MS)).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                match controls::handle_key_event(
                    key,
                    &mut player,
                    &mut session,
                    current,
                    files.len(),
                    keys_enhanced,
                ) {
                    controls::KeyAction::Continue => {}
                    controls::KeyAction::Quit => break,
                    controls::KeyAction::Replay => {
                        if let Err(err) = player.load(&files[current]) {
                            error!("could not reload {}: {}", files[current], err);
                        }
                        session.abandon_chord();
                        session.position_invalidated();
                    }
                    // Wrap-around can land on the recording already loaded.
                    controls::KeyAction::Load(target) if target == current => {}
                    controls::KeyAction::Load(target) => {
                        match load_recording(
                            &files,
                            &mut player,
                            &mut session,
                            &mut timelines,
                            &mut durations_ms,
                            current,
                            target,
                        ) {
                            Ok(()) => current = target,
                            Err(err) => error!("could not load {}: {}", files[target], err),
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        session.tick(player.is_playing(), now.duration_since(last_tick));
        last_tick = now;

        if now.duration_since(last_sample) >= SAMPLE_EVERY {
            session.record_playback_state(player.is_playing(), player.rate());
            session.record_position(player.position_ms(), now);
            last_sample = now;
        }

        if let Some(term) = terminal.as_mut() {
            if now.duration_since(last_draw) >= DRAW_EVERY {
                let status = controls::status_text(controls::StatusArgs {
                    file_index: current,
                    file_count: files.len(),
                    path: files[current].clone(),
                    time_ms: session.estimate(now),
                    duration_ms: player.duration_ms(),
                    playing: player.is_playing(),
                    finished: player.is_finished(),
                    rate: player.rate(),
                    configured_delay_ms: session.configured_delay(),
                    effective_delay_ms: session.current_delay(),
                    annotation_count: session.timeline().len(),
                });
                let track = controls::TrackState {
                    duration_ms: player.duration_ms(),
                    live_ms: session.estimate(now),
                    delayed_ms: session.delayed_estimate(now),
                    entries: session.timeline().to_pairs(),
                };
                let log_lines = logging::snapshot(&log_buffer);
                ui::draw_status(term, &status, &track, &log_lines);
                last_draw = now;
            }
        }
    }

    // Restore the terminal state before exiting.
    if let Some(mut term) = terminal {
        let _ = term.show_cursor();
        let stdout = term.backend_mut();
        let _ = execute!(stdout, LeaveAlternateScreen, cursor::Show);
    }
    if keys_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }

    timelines[current] = session.timeline().clone();
    if let Err(err) = annotations::save(&files, &timelines, &durations_ms, &store) {
        error!("could not save annotations: {}", err);
        return Err(Box::new(err));
    }

    Ok(0)
}

/// Switch the player and the session over to another recording.
///
/// The outgoing recording's timeline is parked back in `timelines[from]`;
/// any in-progress chord is abandoned by the session, and the estimator is
/// invalidated so no estimate leaks across the load.
fn load_recording(
    files: &[String],
    player: &mut Player,
    session: &mut AnnotationSession,
    timelines: &mut [AnnotationTimeline],
    durations_ms: &mut [Option<f64>],
    from: usize,
    to: usize,
) -> Result<(), Box<dyn Error>> {
    player.load(&files[to])?;
    durations_ms[to] = player.duration_ms();

    let incoming = std::mem::take(&mut timelines[to]);
    let outgoing = session.begin_recording(incoming, durations_ms[to]);
    timelines[from] = outgoing;

    info!("File {}/{}: {}", to + 1, files.len(), files[to]);
    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
