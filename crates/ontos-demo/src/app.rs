#![forbid(unsafe_code)]

//! Top-level application model.
//!
//! `App` owns the [`PhaseController`], the mounted [`ActivePhase`] and the
//! page chrome. Phase messages travel wrapped in [`AppMsg::Phase`] together
//! with the mount id they were issued under; anything addressed to an
//! earlier mount is dropped before it reaches a view.

use std::cell::Cell;
use std::time::Duration;

use ontos_core::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ontos_core::geometry::Rect;
use ontos_core::gesture::{Swipe, SwipeDetector};
use ontos_core::playback::Jitter;
use ontos_core::viewport::{MediaQuery, ViewportWatcher};
use ontos_render::frame::{Frame, HitData, HitId};
use ontos_runtime::{Cmd, Every, Model, Subscription};
use tracing::{debug, info};

use crate::chrome::{self, ChromeState, FOOTER_ROWS, HEADER_ROWS};
use crate::controller::{AUTO_ADVANCE_INTERVAL, PhaseController};
use crate::error_boundary::ErrorBoundary;
use crate::fixtures::PAGE_TITLE;
use crate::phases::{ActivePhase, CANVAS_ROWS, PhaseMsg};
use crate::theme;
use crate::ui::{ViewCtx, hit};

/// How long the loading splash stays up.
pub const SPLASH_DURATION: Duration = Duration::from_millis(800);
/// Terminal size assumed until the first resize.
pub const DEFAULT_SIZE: (u16, u16) = (120, 40);
/// Rows moved per wheel notch.
const WHEEL_STEP: u16 = 3;
/// Auto-advance subscription ids are this base plus the mount id, so each
/// mount starts a fresh interval.
const AUTO_ADVANCE_SUB: u64 = 0x4155_544F_0000_0000;

/// Startup options.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Zero-based phase to open on.
    pub start_phase: usize,
    pub auto_advance: bool,
    /// Fixed jitter seed; entropy when `None`.
    pub seed: Option<u64>,
}

/// Application messages.
#[derive(Debug)]
pub enum AppMsg {
    Event(Event),
    /// Splash finished.
    Loaded,
    /// Animation frame for the mounted phase.
    Frame(Duration),
    /// One auto-advance interval elapsed.
    AutoAdvance,
    /// A phase message stamped with the mount it belongs to.
    Phase { mount: u64, msg: PhaseMsg },
}

impl From<Event> for AppMsg {
    fn from(event: Event) -> Self {
        Self::Event(event)
    }
}

/// The whole walkthrough.
pub struct App {
    controller: PhaseController,
    phase: ActivePhase,
    jitter: Jitter,
    loaded: bool,
    size: (u16, u16),
    viewport: ViewportWatcher,
    swipe: SwipeDetector,
    pressed: Option<(HitId, HitData)>,
    scroll: u16,
    content_height: Cell<u16>,
    boundary: ErrorBoundary,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let mut jitter = config.seed.map_or_else(Jitter::from_entropy, Jitter::with_seed);
        let mut controller = PhaseController::new(config.start_phase);
        controller.set_auto_advance(config.auto_advance);
        let phase = ActivePhase::for_index(controller.index(), Jitter::with_seed(jitter.next_u64()));
        let (width, height) = DEFAULT_SIZE;
        Self {
            controller,
            phase,
            jitter,
            loaded: false,
            size: DEFAULT_SIZE,
            viewport: ViewportWatcher::new(
                MediaQuery::max_width(theme::COMPACT_BREAKPOINT - 1),
                width,
                height,
            ),
            swipe: SwipeDetector::new(),
            pressed: None,
            scroll: 0,
            content_height: Cell::new(0),
            boundary: ErrorBoundary::new(),
        }
    }

    pub fn controller(&self) -> &PhaseController {
        &self.controller
    }

    pub fn phase(&self) -> &ActivePhase {
        &self.phase
    }

    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_compact(&self) -> bool {
        self.viewport.matches()
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn chrome_state(&self) -> ChromeState {
        ChromeState {
            index: self.controller.index(),
            auto_advance: self.controller.auto_advance(),
            compact: self.is_compact(),
        }
    }

    /// Rows available to phase content.
    fn body_rows(&self) -> u16 {
        self.size
            .1
            .saturating_sub(HEADER_ROWS + FOOTER_ROWS + 1)
    }

    fn max_scroll(&self) -> u16 {
        self.content_height.get().saturating_sub(self.body_rows())
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = u16::try_from(next).unwrap_or(0);
    }

    fn lift(&self, cmd: Cmd<PhaseMsg>) -> Cmd<AppMsg> {
        let mount = self.controller.mount_id();
        cmd.map(move |msg| AppMsg::Phase { mount, msg })
    }

    /// Apply a controller move; mounts a fresh view if it changed phase.
    fn navigate(&mut self, step: impl FnOnce(&mut PhaseController) -> bool) -> Cmd<AppMsg> {
        if !step(&mut self.controller) {
            return Cmd::none();
        }
        self.remount()
    }

    fn remount(&mut self) -> Cmd<AppMsg> {
        let index = self.controller.index();
        self.phase = ActivePhase::for_index(index, Jitter::with_seed(self.jitter.next_u64()));
        self.scroll = 0;
        self.content_height.set(0);
        self.pressed = None;
        self.swipe.reset();
        self.boundary.clear();
        info!(
            phase = self.controller.name(),
            mount_id = self.controller.mount_id(),
            "phase view mounted"
        );
        let cmd = self.phase.mount();
        self.lift(cmd)
    }

    fn jump(&mut self, index: usize) -> Cmd<AppMsg> {
        match self.controller.jump_to(index) {
            Ok(true) => self.remount(),
            Ok(false) => Cmd::none(),
            Err(err) => {
                debug!(%err, "ignored jump");
                Cmd::none()
            }
        }
    }

    fn restart(&mut self) -> Cmd<AppMsg> {
        self.controller.restart();
        self.remount()
    }

    fn update_phase(&mut self, msg: PhaseMsg) -> Cmd<AppMsg> {
        let cmd = self.phase.update(msg);
        self.lift(cmd)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Cmd<AppMsg> {
        if key.is_char('q') || (key.ctrl() && key.is_char('c')) {
            info!("quit requested");
            return Cmd::quit();
        }
        if !self.loaded {
            return Cmd::none();
        }
        if self.boundary.is_failed() && (key.is_char('r') || key.is_char('R')) {
            self.boundary.clear();
            return Cmd::none();
        }
        match key.code {
            KeyCode::Right | KeyCode::Down => self.navigate(PhaseController::next),
            KeyCode::Left | KeyCode::Up => self.navigate(PhaseController::prev),
            KeyCode::Char(c @ '1'..='4') => self.jump(usize::from(c as u8 - b'1')),
            KeyCode::Char('a') => {
                self.controller.toggle_auto_advance();
                Cmd::none()
            }
            KeyCode::Home => self.restart(),
            KeyCode::PageDown => {
                self.scroll_by(i32::from(self.body_rows().saturating_sub(2)));
                Cmd::none()
            }
            KeyCode::PageUp => {
                self.scroll_by(-i32::from(self.body_rows().saturating_sub(2)));
                Cmd::none()
            }
            _ => match self.phase.key(&key) {
                Some(msg) => self.update_phase(msg),
                None => Cmd::none(),
            },
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Cmd<AppMsg> {
        if !self.loaded {
            return Cmd::none();
        }
        match mouse.kind {
            MouseEventKind::ScrollDown => {
                self.scroll_by(i32::from(WHEEL_STEP));
                return Cmd::none();
            }
            MouseEventKind::ScrollUp => {
                self.scroll_by(-i32::from(WHEEL_STEP));
                return Cmd::none();
            }
            _ => {}
        }
        if let Some(swipe) = self.swipe.handle(&mouse) {
            self.pressed = None;
            debug!(?swipe, "swipe");
            return match swipe {
                Swipe::Left => self.navigate(PhaseController::next),
                Swipe::Right => self.navigate(PhaseController::prev),
            };
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pressed = self.hit_at(mouse.x, mouse.y);
                Cmd::none()
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let pressed = self.pressed.take();
                match self.hit_at(mouse.x, mouse.y) {
                    Some(target) if Some(target) == pressed => self.click(target),
                    _ => Cmd::none(),
                }
            }
            _ => Cmd::none(),
        }
    }

    fn click(&mut self, (id, data): (HitId, HitData)) -> Cmd<AppMsg> {
        match id {
            hit::TAB | hit::DOT => self.jump(usize::try_from(data).unwrap_or(usize::MAX)),
            hit::AUTO => {
                self.controller.toggle_auto_advance();
                Cmd::none()
            }
            hit::RESTART => self.restart(),
            hit::NEXT => self.navigate(PhaseController::next),
            hit::RETRY => {
                self.boundary.clear();
                Cmd::none()
            }
            hit::PHASE => match self.phase.click(data) {
                Some(msg) => self.update_phase(msg),
                None => Cmd::none(),
            },
            _ => Cmd::none(),
        }
    }

    /// Hit region under a screen position, from a fresh render.
    fn hit_at(&self, x: u16, y: u16) -> Option<(HitId, HitData)> {
        let (width, height) = self.size;
        let mut frame = Frame::new(width, height);
        self.draw(&mut frame);
        frame.hit_test(x, y)
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.bounds();
        frame.fill_bg(area, theme::page());
        if !self.loaded {
            chrome::splash(frame);
            return;
        }
        let state = self.chrome_state();
        let compact = state.compact;
        let (header, rest) = area.split_top(HEADER_ROWS);
        let (body, footer) = rest.split_bottom(FOOTER_ROWS);

        let pad = if compact { theme::SM } else { theme::LG };
        let width = area
            .width
            .saturating_sub(2 * pad)
            .min(theme::CONTENT_MAX_WIDTH);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let view = Rect::new(x, body.y + 1, width, body.height.saturating_sub(1));

        let mut canvas = Frame::new(width, CANVAS_ROWS);
        let canvas_area = canvas.bounds();
        canvas.fill_bg(canvas_area, theme::page());
        let used = self.boundary.render(&mut canvas, self.controller.name(), |c| {
            self.phase.view(c, ViewCtx { compact })
        });
        let content = used.saturating_add(1).min(CANVAS_ROWS);
        self.content_height.set(content);
        let scroll = self.scroll.min(content.saturating_sub(view.height));
        frame.blit_rows(&canvas, scroll, view);
        scrollbar(frame, Rect::new(area.right().saturating_sub(1), view.y, 1, view.height), scroll, content);

        chrome::header(frame, header, state);
        chrome::footer(frame, footer, state);
    }
}

/// Thin scrollbar in a one-column `track` when content overflows.
fn scrollbar(frame: &mut Frame, track: Rect, scroll: u16, content: u16) {
    let rows = track.height;
    if rows == 0 || content <= rows {
        return;
    }
    let thumb = (u32::from(rows) * u32::from(rows) / u32::from(content)).max(1);
    let max_scroll = u32::from(content - rows);
    let travel = u32::from(rows).saturating_sub(thumb);
    let top = u32::from(scroll) * travel / max_scroll.max(1);
    for row in 0..rows {
        let on = (top..top + thumb).contains(&u32::from(row));
        let (glyph, color) = if on { ("┃", theme::ACCENT) } else { ("│", theme::BORDER) };
        frame
            .buffer
            .set_string(track.x, track.y + row, glyph, theme::fg(color));
    }
}

impl Model for App {
    type Message = AppMsg;

    fn init(&mut self) -> Cmd<AppMsg> {
        info!(
            phase = self.controller.name(),
            auto_advance = self.controller.auto_advance(),
            "starting walkthrough"
        );
        let mount = self.phase.mount();
        Cmd::batch(vec![
            Cmd::set_title(PAGE_TITLE),
            Cmd::after(SPLASH_DURATION, AppMsg::Loaded),
            self.lift(mount),
        ])
    }

    fn update(&mut self, msg: AppMsg) -> Cmd<AppMsg> {
        match msg {
            AppMsg::Event(Event::Key(key)) => self.handle_key(key),
            AppMsg::Event(Event::Mouse(mouse)) => self.handle_mouse(mouse),
            AppMsg::Event(Event::Resize { width, height }) => {
                self.size = (width, height);
                if let Some(compact) = self.viewport.resize(width, height) {
                    info!(compact, width, "layout breakpoint crossed");
                }
                self.scroll = self.scroll.min(self.max_scroll());
                Cmd::none()
            }
            AppMsg::Loaded => {
                self.loaded = true;
                debug!("splash finished");
                Cmd::none()
            }
            AppMsg::Frame(dt) => {
                self.phase.tick(dt);
                Cmd::none()
            }
            AppMsg::AutoAdvance => {
                if self.controller.auto_tick() {
                    self.remount()
                } else {
                    Cmd::none()
                }
            }
            AppMsg::Phase { mount, msg } => {
                if mount != self.controller.mount_id() {
                    debug!(mount, current = self.controller.mount_id(), "dropped stale phase message");
                    return Cmd::none();
                }
                self.update_phase(msg)
            }
        }
    }

    fn view(&self, frame: &mut Frame) {
        self.draw(frame);
    }

    fn subscriptions(&self) -> Vec<Box<dyn Subscription<AppMsg>>> {
        let mut subs: Vec<Box<dyn Subscription<AppMsg>>> = Vec::new();
        if !self.loaded {
            return subs;
        }
        if let Some(interval) = self.phase.frame_interval() {
            subs.push(Box::new(Every::new(interval, AppMsg::Frame)));
        }
        if self.controller.auto_advance() {
            let id = AUTO_ADVANCE_SUB.wrapping_add(self.controller.mount_id());
            subs.push(Box::new(Every::with_id(id, AUTO_ADVANCE_INTERVAL, |_| {
                AppMsg::AutoAdvance
            })));
        }
        subs
    }
}
