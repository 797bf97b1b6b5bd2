#![forbid(unsafe_code)]

//! Headless runtime on a virtual clock.
//!
//! [`ProgramSimulator`] drives a [`Model`] exactly like
//! [`Program`](crate::Program) does, minus the terminal. Nothing fires until
//! [`advance`](ProgramSimulator::advance) moves the clock; timers and
//! subscription ticks then arrive in deadline order.
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(App::new(AppConfig::default()));
//! sim.init();
//! sim.advance_ms(800);
//! assert!(sim.capture_text(120, 40).contains("The Problem"));
//! ```

use std::time::Duration;

use ontos_core::event::Event;
use ontos_render::export::buffer_to_text;
use ontos_render::frame::Frame;

use crate::clipboard::ClipboardError;
use crate::program::{Cmd, Model};
use crate::scheduler::TimerQueue;
use crate::subscription::SubscriptionSet;

/// Runs a model against virtual time.
pub struct ProgramSimulator<M: Model> {
    model: M,
    now: Duration,
    timers: TimerQueue<M::Message>,
    subscriptions: SubscriptionSet<M::Message>,
    running: bool,
    title: Option<String>,
    clipboard_available: bool,
    clipboard: Vec<String>,
}

impl<M: Model> ProgramSimulator<M> {
    /// Wrap `model`; call [`init`](Self::init) before sending anything.
    pub fn new(model: M) -> Self {
        Self {
            model,
            now: Duration::ZERO,
            timers: TimerQueue::new(),
            subscriptions: SubscriptionSet::new(),
            running: true,
            title: None,
            clipboard_available: true,
            clipboard: Vec::new(),
        }
    }

    /// Run `Model::init` and its commands at time zero.
    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
        self.reconcile();
    }

    /// Deliver a terminal event as the real loop would.
    pub fn inject_event(&mut self, event: Event) {
        self.send(M::Message::from(event));
    }

    /// Deliver a message directly. Ignored after quit.
    pub fn send(&mut self, msg: M::Message) {
        if self.running {
            self.dispatch(msg);
        }
    }

    /// Move the virtual clock forward by `by`, delivering every timer and
    /// subscription tick that falls due on the way, in deadline order.
    pub fn advance(&mut self, by: Duration) {
        let target = self.now + by;
        while self.running {
            let next = match (self.timers.next_deadline(), self.subscriptions.next_deadline()) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => break,
            };
            if next > target {
                break;
            }
            self.now = self.now.max(next);
            self.fire_due();
        }
        self.now = target;
    }

    /// [`advance`](Self::advance) by whole milliseconds.
    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Advance in `step` increments until `done` holds or `limit` elapses.
    ///
    /// Returns whether the condition was met.
    pub fn advance_until(
        &mut self,
        step: Duration,
        limit: Duration,
        mut done: impl FnMut(&M) -> bool,
    ) -> bool {
        let deadline = self.now + limit;
        while !done(&self.model) {
            if self.now >= deadline || !self.running {
                return false;
            }
            self.advance(step.min(deadline - self.now));
        }
        true
    }

    fn fire_due(&mut self) {
        let now = self.now;
        while self.running {
            let Some(msg) = self.timers.pop_due(now) else {
                break;
            };
            self.dispatch(msg);
        }
        for msg in self.subscriptions.collect_due(now) {
            if !self.running {
                break;
            }
            self.dispatch(msg);
        }
    }

    /// Virtual time since start.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// One-shot timers waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Interval subscriptions currently running.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Make subsequent clipboard writes fail (or succeed again).
    pub fn set_clipboard_available(&mut self, available: bool) {
        self.clipboard_available = available;
    }

    /// Text successfully copied to the clipboard, oldest first.
    pub fn clipboard(&self) -> &[String] {
        &self.clipboard
    }

    /// The last window title set by the model.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Render at `width` x `height`, hit regions included.
    pub fn render(&self, width: u16, height: u16) -> Frame {
        let mut frame = Frame::new(width, height);
        self.model.view(&mut frame);
        frame
    }

    /// Render and return the screen as plain text, one line per row.
    pub fn capture_text(&self, width: u16, height: u16) -> String {
        buffer_to_text(&self.render(width, height).buffer)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// False once a `Cmd::Quit` has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    fn dispatch(&mut self, msg: M::Message) {
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
        self.reconcile();
    }

    fn reconcile(&mut self) {
        let declared = self.model.subscriptions();
        self.subscriptions.reconcile(declared, self.now);
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => self.running = false,
            Cmd::Msg(m) => self.dispatch(m),
            Cmd::Batch(cmds) => {
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::After(delay, m) => self.timers.schedule(self.now + delay, m),
            Cmd::SetTitle(title) => self.title = Some(title),
            Cmd::SetClipboard(text, done) => {
                let result = if self.clipboard_available {
                    self.clipboard.push(text);
                    Ok(())
                } else {
                    Err(ClipboardError::NotAvailable)
                };
                self.dispatch(done(result));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{Every, Subscription};
    use ontos_core::event::{KeyCode, KeyEvent};
    use ontos_render::style::Style;

    #[derive(Default)]
    struct Ticker {
        fired: Vec<&'static str>,
        frames: u32,
        animating: bool,
        copied: Option<bool>,
    }

    #[derive(Debug)]
    enum TickerMsg {
        Timer(&'static str),
        Frame(Duration),
        Animate(bool),
        Copy,
        Copied(bool),
        Key(KeyEvent),
        Other,
    }

    impl From<Event> for TickerMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) => Self::Key(k),
                _ => Self::Other,
            }
        }
    }

    impl Model for Ticker {
        type Message = TickerMsg;

        fn init(&mut self) -> Cmd<TickerMsg> {
            Cmd::batch(vec![
                Cmd::after(Duration::from_millis(60), TickerMsg::Timer("b")),
                Cmd::after(Duration::from_millis(20), TickerMsg::Timer("a")),
                Cmd::set_title("ticker"),
            ])
        }

        fn update(&mut self, msg: TickerMsg) -> Cmd<TickerMsg> {
            match msg {
                TickerMsg::Timer(name) => {
                    self.fired.push(name);
                    if name == "a" {
                        return Cmd::after(Duration::ZERO, TickerMsg::Timer("a-chained"));
                    }
                }
                TickerMsg::Frame(_) => self.frames += 1,
                TickerMsg::Animate(on) => self.animating = on,
                TickerMsg::Copy => {
                    return Cmd::clipboard("hello", |r| TickerMsg::Copied(r.is_ok()));
                }
                TickerMsg::Copied(ok) => self.copied = Some(ok),
                TickerMsg::Key(k) if k.is_char('q') => return Cmd::quit(),
                TickerMsg::Key(_) | TickerMsg::Other => {}
            }
            Cmd::none()
        }

        fn view(&self, frame: &mut Frame) {
            let text = format!("frames={}", self.frames);
            frame.buffer.set_string(0, 0, &text, Style::new());
        }

        fn subscriptions(&self) -> Vec<Box<dyn Subscription<TickerMsg>>> {
            if self.animating {
                vec![Box::new(Every::new(Duration::from_millis(16), TickerMsg::Frame))]
            } else {
                vec![]
            }
        }
    }

    fn names(sim: &ProgramSimulator<Ticker>) -> Vec<&'static str> {
        sim.model().fired.clone()
    }

    #[test]
    fn nothing_fires_without_advancing() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.init();
        assert!(names(&sim).is_empty());
        assert_eq!(sim.pending_timers(), 2);
        assert_eq!(sim.title(), Some("ticker"));
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.init();
        sim.advance_ms(19);
        assert!(names(&sim).is_empty());
        sim.advance_ms(1);
        assert_eq!(names(&sim), ["a", "a-chained"]);
        sim.advance_ms(100);
        assert_eq!(names(&sim), ["a", "a-chained", "b"]);
        assert_eq!(sim.now(), Duration::from_millis(120));
    }

    #[test]
    fn subscription_runs_only_while_declared() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.send(TickerMsg::Animate(true));
        assert_eq!(sim.active_subscriptions(), 1);
        sim.advance_ms(160);
        assert_eq!(sim.model().frames, 10);
        sim.send(TickerMsg::Animate(false));
        assert_eq!(sim.active_subscriptions(), 0);
        sim.advance_ms(160);
        assert_eq!(sim.model().frames, 10);
    }

    #[test]
    fn clipboard_outcome_is_reported() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.send(TickerMsg::Copy);
        assert_eq!(sim.model().copied, Some(true));
        assert_eq!(sim.clipboard(), ["hello"]);

        sim.set_clipboard_available(false);
        sim.send(TickerMsg::Copy);
        assert_eq!(sim.model().copied, Some(false));
        assert_eq!(sim.clipboard().len(), 1);
    }

    #[test]
    fn quit_stops_delivery() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.init();
        sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Char('q'))));
        assert!(!sim.is_running());
        sim.advance_ms(100);
        assert!(names(&sim).is_empty());
    }

    #[test]
    fn capture_text_renders_view() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.send(TickerMsg::Animate(true));
        sim.advance_ms(32);
        assert_eq!(sim.capture_text(12, 1), "frames=2");
    }

    #[test]
    fn advance_until_stops_when_condition_holds() {
        let mut sim = ProgramSimulator::new(Ticker::default());
        sim.send(TickerMsg::Animate(true));
        let met = sim.advance_until(
            Duration::from_millis(16),
            Duration::from_secs(1),
            |m| m.frames >= 3,
        );
        assert!(met);
        assert_eq!(sim.now(), Duration::from_millis(48));
    }
}
