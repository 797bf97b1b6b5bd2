#![forbid(unsafe_code)]

//! The walkthrough reports its milestones through `tracing`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ontos_core::event::{Event, KeyCode, KeyEvent};
use ontos_demo::app::{App, AppConfig, SPLASH_DURATION};
use ontos_runtime::ProgramSimulator;
use tracing::field::{Field, Visit};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Captured {
    message: String,
    rule: Option<String>,
    phase: Option<String>,
}

#[derive(Clone, Default)]
struct EventLog {
    events: Arc<Mutex<Vec<Captured>>>,
}

#[derive(Default)]
struct CapturedVisitor(Captured);

impl Visit for CapturedVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "rule" => self.0.rule = Some(value.to_string()),
            "phase" => self.0.phase = Some(value.to_string()),
            "message" => self.0.message = value.to_string(),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{value:?}").trim_matches('"').to_string();
        match field.name() {
            "message" => self.0.message = text,
            "rule" => self.0.rule = Some(text),
            "phase" => self.0.phase = Some(text),
            _ => {}
        }
    }
}

impl<S> Layer<S> for EventLog
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = CapturedVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(visitor.0);
    }
}

fn capture() -> (tracing::dispatcher::DefaultGuard, Arc<Mutex<Vec<Captured>>>) {
    let log = EventLog::default();
    let events = log.events.clone();
    let subscriber = tracing_subscriber::registry().with(log);
    let guard = tracing::subscriber::set_default(subscriber);
    (guard, events)
}

fn press(sim: &mut ProgramSimulator<App>, code: KeyCode) {
    sim.inject_event(Event::Key(KeyEvent::new(code)));
}

#[test]
fn rule_firing_is_logged_once() {
    let (_guard, events) = capture();
    let mut sim = ProgramSimulator::new(App::new(AppConfig {
        start_phase: 2,
        auto_advance: false,
        seed: Some(1),
    }));
    sim.init();
    sim.advance(SPLASH_DURATION);
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_secs(10));
    press(&mut sim, KeyCode::Enter);
    sim.advance(Duration::from_secs(10));

    let events = events.lock().unwrap();
    let fired: Vec<&Captured> = events
        .iter()
        .filter(|e| e.rule.as_deref() == Some("systemic_carry_unwind"))
        .collect();
    assert_eq!(fired.len(), 1);
    assert!(fired[0].message.contains("rule fired"));
    assert!(events.iter().any(|e| e.message.contains("no alert")));
}

#[test]
fn phase_mounts_are_logged() {
    let (_guard, events) = capture();
    let mut sim = ProgramSimulator::new(App::new(AppConfig {
        seed: Some(1),
        ..AppConfig::default()
    }));
    sim.init();
    sim.advance(SPLASH_DURATION);
    press(&mut sim, KeyCode::Right);
    press(&mut sim, KeyCode::Char('4'));

    let events = events.lock().unwrap();
    let mounted: Vec<&str> = events
        .iter()
        .filter(|e| e.message == "phase view mounted")
        .filter_map(|e| e.phase.as_deref())
        .collect();
    assert_eq!(mounted, ["The .onto Engine", "Deterministic AI"]);
}
