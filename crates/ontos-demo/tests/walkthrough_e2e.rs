#![forbid(unsafe_code)]

//! End-to-end walkthrough scenarios on the deterministic simulator.
//!
//! Every scenario drives the real [`App`] through [`ProgramSimulator`]:
//! events go in through `From<Event>`, timers and subscriptions run on the
//! virtual clock, and assertions read rendered text or model state.
//!
//! Run: `cargo test -p ontos-demo --test walkthrough_e2e`

use std::time::Duration;

use ontos_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ontos_core::playback::PlaybackStatus;
use ontos_demo::app::{App, AppConfig, SPLASH_DURATION};
use ontos_demo::chrome::SPLASH_TEXT;
use ontos_demo::fixtures::{CHAT, PAGE_TITLE, PROBLEM_COUNTERS, TICK1, TICK2};
use ontos_demo::phases::deterministic_ai::CopyTarget;
use ontos_demo::phases::live_tick::Stage;
use ontos_demo::ui::ViewCtx;
use ontos_render::export::{buffer_to_text, find_text};
use ontos_render::frame::Frame;
use ontos_runtime::ProgramSimulator;

const W: u16 = 120;
const H: u16 = 40;
const STEP: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Emit a JSONL log entry to stderr.
fn log_jsonl(step: &str, data: serde_json::Value) {
    let entry = serde_json::json!({ "step": step, "data": data });
    eprintln!("{entry}");
}

fn boot(phase: usize, auto_advance: bool) -> ProgramSimulator<App> {
    let mut sim = ProgramSimulator::new(App::new(AppConfig {
        start_phase: phase,
        auto_advance,
        seed: Some(0x0A7E_5EED),
    }));
    sim.init();
    sim.inject_event(Event::Resize {
        width: W,
        height: H,
    });
    sim
}

fn loaded(phase: usize) -> ProgramSimulator<App> {
    let mut sim = boot(phase, false);
    sim.advance(SPLASH_DURATION);
    assert!(sim.model().is_loaded());
    sim
}

fn press(sim: &mut ProgramSimulator<App>, code: KeyCode) {
    sim.inject_event(Event::Key(KeyEvent::new(code)));
}

fn mouse(sim: &mut ProgramSimulator<App>, kind: MouseEventKind, x: u16, y: u16) {
    sim.inject_event(Event::Mouse(MouseEvent::new(kind, x, y)));
}

/// Press and release over the first occurrence of `label`.
fn click_text(sim: &mut ProgramSimulator<App>, label: &str) {
    let frame = sim.render(W, H);
    let Some((x, y)) = find_text(&frame.buffer, label) else {
        panic!("{label:?} not on screen:\n{}", buffer_to_text(&frame.buffer));
    };
    mouse(sim, MouseEventKind::Down(MouseButton::Left), x + 1, y);
    mouse(sim, MouseEventKind::Up(MouseButton::Left), x + 1, y);
}

/// The mounted phase drawn on a tall canvas, so nothing is scrolled away.
fn phase_text(sim: &ProgramSimulator<App>) -> String {
    let mut frame = Frame::new(116, 600);
    sim.model().phase().view(&mut frame, ViewCtx::default());
    buffer_to_text(&frame.buffer)
}

fn live_stage(sim: &ProgramSimulator<App>) -> Option<Stage> {
    sim.model().phase().as_live_tick().map(|p| p.stage())
}

fn chat_step(sim: &ProgramSimulator<App>) -> usize {
    sim.model().phase().as_chat().map_or(0, |c| c.step())
}

// ===========================================================================
// Startup and chrome
// ===========================================================================

#[test]
fn e2e_splash_then_first_phase() {
    let mut sim = boot(0, false);
    assert!(sim.capture_text(W, H).contains(SPLASH_TEXT));
    assert_eq!(sim.title(), Some(PAGE_TITLE));

    sim.advance(SPLASH_DURATION);
    let text = sim.capture_text(W, H);
    assert!(!text.contains(SPLASH_TEXT));
    assert!(text.contains("1. The Problem"));
    assert!(text.contains("The Mathematical Nightmare"));
    log_jsonl("loaded", serde_json::json!({ "now_ms": sim.now().as_millis() as u64 }));
}

#[test]
fn e2e_problem_counters_settle() {
    let mut sim = loaded(0);
    sim.advance(Duration::from_secs(4));
    let Some(values) = sim.model().phase().as_problem().map(|p| p.counter_values()) else {
        panic!("problem phase not mounted");
    };
    let targets = PROBLEM_COUNTERS.map(|c| c.target);
    assert_eq!(values, targets);
    assert!(phase_text(&sim).contains("3,100"));
}

#[test]
fn e2e_keyboard_navigation() {
    let mut sim = loaded(0);
    press(&mut sim, KeyCode::Right);
    assert_eq!(sim.model().controller().index(), 1);
    press(&mut sim, KeyCode::Char('4'));
    assert_eq!(sim.model().controller().index(), 3);
    press(&mut sim, KeyCode::Right);
    assert_eq!(sim.model().controller().index(), 3);
    press(&mut sim, KeyCode::Home);
    assert_eq!(sim.model().controller().index(), 0);
    press(&mut sim, KeyCode::Char('q'));
    assert!(!sim.is_running());
}

#[test]
fn e2e_footer_and_tab_clicks() {
    let mut sim = loaded(0);
    click_text(&mut sim, "Next: The .onto Engine");
    assert_eq!(sim.model().controller().index(), 1);
    click_text(&mut sim, "3. Live Tick");
    assert_eq!(sim.model().controller().index(), 2);
    click_text(&mut sim, "↺ Restart Demo");
    assert_eq!(sim.model().controller().index(), 0);
}

#[test]
fn e2e_swipe_changes_phase() {
    let mut sim = loaded(1);
    mouse(&mut sim, MouseEventKind::Down(MouseButton::Left), 80, 20);
    mouse(&mut sim, MouseEventKind::Up(MouseButton::Left), 60, 21);
    assert_eq!(sim.model().controller().index(), 2);

    mouse(&mut sim, MouseEventKind::Down(MouseButton::Left), 40, 20);
    mouse(&mut sim, MouseEventKind::Up(MouseButton::Left), 70, 20);
    assert_eq!(sim.model().controller().index(), 1);

    // Mostly vertical: not a swipe.
    mouse(&mut sim, MouseEventKind::Down(MouseButton::Left), 40, 10);
    mouse(&mut sim, MouseEventKind::Up(MouseButton::Left), 47, 30);
    assert_eq!(sim.model().controller().index(), 1);
}

#[test]
fn e2e_auto_advance_walks_to_the_end() {
    let mut sim = boot(0, true);
    sim.advance(SPLASH_DURATION);
    assert!(sim.capture_text(W, H).contains("▶ AUTO"));

    sim.advance(Duration::from_secs(14));
    assert_eq!(sim.model().controller().index(), 0);
    sim.advance(Duration::from_secs(1));
    assert_eq!(sim.model().controller().index(), 1);

    // A manual move restarts the interval.
    sim.advance(Duration::from_secs(10));
    press(&mut sim, KeyCode::Right);
    sim.advance(Duration::from_secs(10));
    assert_eq!(sim.model().controller().index(), 2);
    sim.advance(Duration::from_secs(5));
    assert_eq!(sim.model().controller().index(), 3);

    sim.advance(Duration::from_secs(15));
    assert_eq!(sim.model().controller().index(), 3);
    assert!(!sim.model().controller().auto_advance());
    assert!(sim.capture_text(W, H).contains("⏸ AUTO"));
}

#[test]
fn e2e_compact_layout() {
    let mut sim = loaded(0);
    sim.inject_event(Event::Resize {
        width: 80,
        height: H,
    });
    assert!(sim.model().is_compact());
    let text = sim.capture_text(80, H);
    assert!(!text.contains("1. The Problem"));
    assert!(!text.contains("AETHER / SENTIMENTRADER"));
    assert!(text.contains("Next: The .onto Engine"));
}

#[test]
fn e2e_scrolling_is_bounded() {
    let mut sim = loaded(1);
    sim.advance(Duration::from_secs(20));
    sim.capture_text(W, H);
    press(&mut sim, KeyCode::PageDown);
    let first = sim.model().scroll();
    assert!(first > 0);
    for _ in 0..100 {
        mouse(&mut sim, MouseEventKind::ScrollDown, 10, 10);
    }
    let bottom = sim.model().scroll();
    assert!(bottom >= first);
    mouse(&mut sim, MouseEventKind::ScrollDown, 10, 10);
    assert_eq!(sim.model().scroll(), bottom);

    press(&mut sim, KeyCode::Left);
    assert_eq!(sim.model().scroll(), 0);
}

// ===========================================================================
// Phase 2: the .onto engine
// ===========================================================================

#[test]
fn e2e_engine_compiles_and_folds() {
    let mut sim = loaded(1);
    let compiled = sim.advance_until(STEP, Duration::from_secs(30), |app| {
        app.phase().as_engine().is_some_and(|e| e.is_compiled())
    });
    assert!(compiled);
    let text = phase_text(&sim);
    assert!(text.contains("sentimentrader-contagion.onto"));

    press(&mut sim, KeyCode::Char('f'));
    let Some(engine) = sim.model().phase().as_engine() else {
        panic!("engine not mounted");
    };
    assert!((0..engine.sections().len()).all(|i| engine.is_collapsed(i)));
    press(&mut sim, KeyCode::Char('f'));
    let Some(engine) = sim.model().phase().as_engine() else {
        panic!("engine not mounted");
    };
    assert!((0..engine.sections().len()).all(|i| !engine.is_collapsed(i)));
}

// ===========================================================================
// Phase 3: live tick
// ===========================================================================

#[test]
fn e2e_tick_one_is_quiet() {
    let mut sim = loaded(2);
    assert_eq!(live_stage(&sim), Some(Stage::Ready));
    press(&mut sim, KeyCode::Enter);
    assert_eq!(live_stage(&sim), Some(Stage::Tick1));

    let paused = sim.advance_until(STEP, Duration::from_secs(10), |app| {
        app.phase()
            .as_live_tick()
            .is_some_and(|p| p.status() == PlaybackStatus::PausedBetween)
    });
    assert!(paused);
    let Some(live) = sim.model().phase().as_live_tick() else {
        panic!("live tick not mounted");
    };
    assert_eq!(live.revealed(), (TICK1.len(), 0));
    let text = phase_text(&sim);
    assert!(!text.contains("RULE FIRED"));
    assert!(text.contains("tick 1 clean — waiting"));
    log_jsonl("tick1", serde_json::json!({ "lines": TICK1.len() }));
}

#[test]
fn e2e_tick_two_fires_the_rule() {
    let mut sim = loaded(2);
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_secs(10));
    assert_eq!(live_stage(&sim), Some(Stage::Between));

    press(&mut sim, KeyCode::Enter);
    assert_eq!(live_stage(&sim), Some(Stage::Tick2));
    let done = sim.advance_until(STEP, Duration::from_secs(20), |app| {
        app.phase()
            .as_live_tick()
            .is_some_and(|p| p.status() == PlaybackStatus::Complete)
    });
    assert!(done);
    let Some(live) = sim.model().phase().as_live_tick() else {
        panic!("live tick not mounted");
    };
    assert_eq!(live.revealed(), (TICK1.len(), TICK2.len()));
    let text = phase_text(&sim);
    assert!(text.contains("🔥 RULE FIRED: systemic_carry_unwind"));
    assert!(text.contains("ALERT — 0.42ms"));
}

#[test]
fn e2e_replay_resets_to_ready() {
    let mut sim = loaded(2);
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_millis(700));
    press(&mut sim, KeyCode::Char('r'));
    assert_eq!(live_stage(&sim), Some(Stage::Ready));
    sim.advance(Duration::from_secs(10));
    let Some(live) = sim.model().phase().as_live_tick() else {
        panic!("live tick not mounted");
    };
    assert_eq!(live.revealed(), (0, 0));
}

#[test]
fn e2e_stale_wakes_after_phase_change() {
    let mut sim = loaded(2);
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_millis(400));
    assert!(sim.pending_timers() > 0);

    press(&mut sim, KeyCode::Right);
    press(&mut sim, KeyCode::Left);
    assert_eq!(live_stage(&sim), Some(Stage::Ready));
    sim.advance(Duration::from_secs(10));
    assert_eq!(live_stage(&sim), Some(Stage::Ready));
    let Some(live) = sim.model().phase().as_live_tick() else {
        panic!("live tick not mounted");
    };
    assert_eq!(live.revealed(), (0, 0));
}

// ===========================================================================
// Phase 4: deterministic AI
// ===========================================================================

fn answer_first(sim: &mut ProgramSimulator<App>) {
    press(sim, KeyCode::Enter);
    assert_eq!(chat_step(sim), 1);
    let typed = sim.advance_until(STEP, Duration::from_secs(60), |app| {
        app.phase().as_chat().is_some_and(|c| c.step() == 2)
    });
    assert!(typed);
}

#[test]
fn e2e_chat_answer_types_out() {
    let mut sim = loaded(3);
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_millis(100));
    assert!(sim.model().phase().as_chat().is_some_and(|c| c.is_thinking()));

    let typed = sim.advance_until(STEP, Duration::from_secs(60), |app| {
        app.phase().as_chat().is_some_and(|c| c.step() == 2)
    });
    assert!(typed);
    let Some(chat) = sim.model().phase().as_chat() else {
        panic!("chat not mounted");
    };
    assert!(chat.transcript().iter().any(|t| t.contains("Confidence: **0.94**")));
    let text = phase_text(&sim);
    assert!(text.contains("0.94"));
    assert!(!text.contains("**"));
}

#[test]
fn e2e_chat_follow_up() {
    let mut sim = loaded(3);
    answer_first(&mut sim);
    press(&mut sim, KeyCode::Enter);
    let typed = sim.advance_until(STEP, Duration::from_secs(60), |app| {
        app.phase().as_chat().is_some_and(|c| c.step() == 4)
    });
    assert!(typed);
    let Some(chat) = sim.model().phase().as_chat() else {
        panic!("chat not mounted");
    };
    assert_eq!(chat.transcript(), CHAT.map(|t| t.text).to_vec());
}

#[test]
fn e2e_copy_confirms_then_expires() {
    let mut sim = loaded(3);
    answer_first(&mut sim);
    press(&mut sim, KeyCode::Char('c'));
    assert_eq!(sim.clipboard(), &[CHAT[1].text.to_owned()]);
    assert_eq!(
        sim.model().phase().as_chat().and_then(|c| c.copied()),
        Some(CopyTarget::Answer(1))
    );
    assert!(phase_text(&sim).contains("✓ Copied"));

    sim.advance(Duration::from_secs(2));
    assert_eq!(sim.model().phase().as_chat().and_then(|c| c.copied()), None);
}

#[test]
fn e2e_copy_failure_is_silent() {
    let mut sim = loaded(3);
    answer_first(&mut sim);
    sim.set_clipboard_available(false);
    press(&mut sim, KeyCode::Char('c'));
    assert!(sim.clipboard().is_empty());
    assert_eq!(sim.model().phase().as_chat().and_then(|c| c.copied()), None);
    assert!(!phase_text(&sim).contains("✓ Copied"));
}

#[test]
fn e2e_chat_reset_on_return() {
    let mut sim = loaded(3);
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_secs(2));
    press(&mut sim, KeyCode::Left);
    press(&mut sim, KeyCode::Right);
    sim.advance(Duration::from_secs(30));
    assert_eq!(chat_step(&sim), 0);
}

// ===========================================================================
// Error boundary
// ===========================================================================

#[test]
fn e2e_failed_view_shows_fallback_and_retries() {
    let mut sim = loaded(2);
    sim.model().boundary().record("sparkline overflow");
    let text = sim.capture_text(W, H);
    assert!(text.contains("RENDERING ERROR — Live Tick"));
    assert!(text.contains("sparkline overflow"));
    // Chrome still works around the fallback.
    assert!(text.contains("3. Live Tick"));

    click_text(&mut sim, "Retry");
    assert!(!sim.model().boundary().is_failed());
    assert!(phase_text(&sim).contains("S&P 500"));
}
