//! quadfall terminal host
//!
//! Owns the clock and the terminal: decodes input, steps the session with
//! measured frame deltas and redraws every frame. The engine itself never
//! touches timers or the terminal.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use quadfall::animate::VisualPiece;
use quadfall::input::{HostAction, IntentQueue, KeyMap};
use quadfall::settings::Settings;
use quadfall::ui;
use quadfall::{EventSink, GameEvent, Session, SessionState, ShapeKind};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Logs the audio-collaborator signals; volume policy lives outside the
/// engine, and this host has no speakers at all
struct LogSink;

impl EventSink for LogSink {
    fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::PieceLanded => tracing::debug!("piece landed"),
            GameEvent::RowsCleared(rows) => tracing::info!(rows, "rows cleared"),
            GameEvent::GameOver { score } => tracing::info!(score, "game over"),
        }
    }
}

/// Last observed logical pose of the active piece, for visual retargeting
#[derive(Clone, Copy, PartialEq)]
struct PiecePose {
    kind: ShapeKind,
    row: i32,
    col: i32,
    rotation: u16,
}

fn main() -> io::Result<()> {
    let session_id: u32 = rand::random();

    let log_dir = std::env::temp_dir().join("quadfall");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quadfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        session = format!("{:08x}", session_id),
        log = %log_dir.join(&log_file).display(),
        "quadfall starting up"
    );

    let settings = Settings::load();
    let keymap = KeyMap::from_settings(&settings);

    let mut session = Session::new(settings.session_config()).map_err(io::Error::other)?;
    session.set_event_sink(Box::new(LogSink));
    let queue = IntentQueue::new();
    session.attach(Box::new(queue.clone()));

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run(&mut terminal, &mut session, &queue, &keymap);

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: could not save settings: {}", e);
    }

    if result.is_ok() {
        println!("Final score: {} (level {})", session.score(), session.level());
    }
    result
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    queue: &IntentQueue,
    keymap: &KeyMap,
) -> io::Result<()> {
    session.start();

    let mut visual: Option<VisualPiece> = None;
    let mut last_pose: Option<PiecePose> = None;
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        // Drain terminal events until the frame budget is spent
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if session.state() == SessionState::GameOver {
                        match key.code {
                            KeyCode::Enter => {
                                queue.clear();
                                session.start();
                            }
                            KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                            _ => {}
                        }
                        continue;
                    }
                    match keymap.decode(key) {
                        Some(HostAction::Intent(intent)) => queue.push(intent),
                        Some(HostAction::Pause) => {
                            if session.state() == SessionState::Paused {
                                session.resume();
                            } else {
                                queue.clear();
                                session.pause();
                            }
                        }
                        Some(HostAction::Quit) => return Ok(()),
                        None => {}
                    }
                }
                Event::Mouse(mouse) => {
                    let area = terminal.size().map(|s| Rect::new(0, 0, s.width, s.height))?;
                    let inner = ui::playfield_rect(area, session);
                    let cell = session.cell_px();
                    let col = mouse.column.saturating_sub(inner.x) as f32 / 2.0;
                    let row = mouse.row.saturating_sub(inner.y) as f32;
                    let x = col * cell + cell / 2.0;
                    let y = row * cell + session.offset_y() + cell / 2.0;
                    match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            session.on_pointer_down(x, y);
                        }
                        MouseEventKind::Drag(MouseButton::Left) => {
                            session.on_pointer_move(x, y);
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        let delta = last_frame.elapsed();
        last_frame = Instant::now();
        session.advance(delta);

        track_visual(session, &mut visual, &mut last_pose, delta);

        terminal.draw(|frame| ui::render_game(frame, session, visual.as_ref()))?;

        let spent = frame_start.elapsed();
        if spent < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - spent);
        }
    }
}

/// Keep the interpolated draw position chasing the logical piece: snap on
/// respawn, retarget on movement, ease every frame
fn track_visual(
    session: &Session,
    visual: &mut Option<VisualPiece>,
    last_pose: &mut Option<PiecePose>,
    delta: Duration,
) {
    let Some(piece) = session.current_piece() else {
        *visual = None;
        *last_pose = None;
        return;
    };
    let pose = PiecePose {
        kind: piece.kind,
        row: piece.row,
        col: piece.col,
        rotation: piece.rotation(),
    };

    let respawned = match *last_pose {
        Some(last) => last.kind != pose.kind || pose.row < last.row - 2,
        None => true,
    };
    if respawned {
        *visual = Some(VisualPiece::new(piece, session.cell_px()));
    } else if *last_pose != Some(pose) {
        if let Some(v) = visual.as_mut() {
            v.retarget(piece, session.fall_interval());
        }
    }
    *last_pose = Some(pose);

    if let Some(v) = visual.as_mut() {
        v.update(delta);
    }
}
