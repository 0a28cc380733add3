use super::display::DisplayMetrics;
use super::placement::{
    clamp_to_screen, is_widget_size, place, settings_panel_bounds, widget_size, COMPACT_SIZE,
    EXPANDED_SIZE,
};
use super::settings_store::SettingsStore;
use super::sound_files::SoundKind;
use crate::models::{Corner, Point, Rect, Settings, Size};
use serde::Serialize;
use serde_json::{json, Value};

/// All geometry is in logical pixels.
pub trait WidgetWindow {
    /// `None` once the window has been destroyed.
    fn bounds(&self) -> Option<Rect>;
    fn is_visible(&self) -> bool;
    fn primary_display(&self) -> Option<DisplayMetrics>;
    fn set_bounds(&self, bounds: Rect) -> Result<(), String>;
    fn set_position(&self, position: Point) -> Result<(), String>;
    fn set_always_on_top(&self, always_on_top: bool) -> Result<(), String>;
    fn show(&self) -> Result<(), String>;
    fn hide(&self) -> Result<(), String>;
    fn focus(&self) -> Result<(), String>;
    fn emit(&self, event: &WidgetEvent) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitState {
    pub is_expanded: bool,
    pub widget_settings: Value,
    pub corner: Corner,
    pub auto_start: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    InitState(InitState),
    ExpandedChanged(bool),
    SettingsOpened,
    SettingsClosed,
    StopAdhan,
    SoundSelected { kind: SoundKind, path: String },
}

impl WidgetEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitState(_) => "init-state",
            Self::ExpandedChanged(_) => "expanded-changed",
            Self::SettingsOpened => "settings-opened",
            Self::SettingsClosed => "settings-closed",
            Self::StopAdhan => "stop-adhan",
            Self::SoundSelected { kind, .. } => kind.event_name(),
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::InitState(state) => serde_json::to_value(state).unwrap_or(Value::Null),
            Self::ExpandedChanged(expanded) => json!(expanded),
            Self::SoundSelected { path, .. } => json!(path),
            Self::SettingsOpened | Self::SettingsClosed | Self::StopAdhan => Value::Null,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Hidden,
    VisibleCompact,
    VisibleExpanded,
    VisibleSettingsPanel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    pointer: Pointer,
    window: Rect,
}

#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct PendingNudge(());

pub fn initial_bounds(settings: &Settings, metrics: &DisplayMetrics) -> Rect {
    let size = widget_size(settings.is_expanded);
    let snap = settings.snap_to_taskbar();
    let position = match settings.position {
        Some(stored) if !snap => stored,
        _ => place(metrics, settings.corner, size, snap),
    };
    Rect::from_parts(clamp_to_screen(position, size, metrics), size)
}

pub struct WidgetController<W> {
    window: W,
    store: SettingsStore,
    expanded: bool,
    panel_open: bool,
    revealed: bool,
    drag: Option<DragAnchor>,
}

impl<W: WidgetWindow> WidgetController<W> {
    pub fn new(window: W, mut store: SettingsStore) -> Self {
        let expanded = store.settings().is_expanded;
        if store.settings().snap_to_taskbar() {
            store.settings_mut().always_on_top = true;
        }
        Self {
            window,
            store,
            expanded,
            panel_open: false,
            revealed: false,
            drag: None,
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn snap_to_taskbar(&self) -> bool {
        self.store.settings().snap_to_taskbar()
    }

    pub fn state(&self) -> WidgetState {
        if !self.window.is_visible() {
            WidgetState::Hidden
        } else if self.panel_open {
            WidgetState::VisibleSettingsPanel
        } else if self.expanded {
            WidgetState::VisibleExpanded
        } else {
            WidgetState::VisibleCompact
        }
    }

    fn display(&self) -> Result<DisplayMetrics, String> {
        self.window
            .primary_display()
            .ok_or_else(|| "Primary display not available".to_string())
    }

    fn current_bounds(&self) -> Result<Rect, String> {
        self.window
            .bounds()
            .ok_or_else(|| "Widget window not available".to_string())
    }

    fn corner_point(&self, size: Size, snap: bool) -> Result<Point, String> {
        let metrics = self.display()?;
        Ok(place(&metrics, self.store.settings().corner, size, snap))
    }

    pub fn init_state(&self, auto_start: bool) -> InitState {
        let settings = self.store.settings();
        InitState {
            is_expanded: self.expanded,
            widget_settings: settings.widget_settings.clone(),
            corner: settings.corner,
            auto_start,
        }
    }

    pub fn notify(&self, event: &WidgetEvent) {
        let _ = self.window.emit(event);
    }

    /// Reveals the window on the first load only.
    pub fn page_loaded(&mut self, auto_start: bool) {
        self.notify(&WidgetEvent::InitState(self.init_state(auto_start)));
        if !self.revealed {
            self.revealed = true;
            let _ = self.window.show();
        }
    }

    pub fn toggle_expand(&mut self) -> Result<Option<PendingNudge>, String> {
        match self.state() {
            WidgetState::VisibleCompact | WidgetState::VisibleExpanded => {}
            WidgetState::VisibleSettingsPanel => {
                return Err("Cannot resize the widget while settings are open".to_string())
            }
            WidgetState::Hidden => {
                return Err("Cannot resize the widget while it is hidden".to_string())
            }
        }

        let metrics = self.display()?;
        let current = self.current_bounds()?;
        let expanded = !self.expanded;
        let size = widget_size(expanded);
        let snap = self.snap_to_taskbar();

        let target = if snap {
            place(&metrics, self.store.settings().corner, size, true)
        } else {
            let delta = EXPANDED_SIZE.height - COMPACT_SIZE.height;
            let y = if expanded {
                (current.y - delta).max(0)
            } else {
                current.y + delta
            };
            clamp_to_screen(Point::new(current.x, y), size, &metrics)
        };

        self.window.set_bounds(Rect::from_parts(target, size))?;
        self.expanded = expanded;
        self.notify(&WidgetEvent::ExpandedChanged(expanded));

        let settings = self.store.settings_mut();
        settings.is_expanded = expanded;
        settings.position = Some(target);
        self.store.save();

        Ok(self.begin_nudge())
    }

    pub fn open_settings(&mut self) -> Result<(), String> {
        match self.state() {
            WidgetState::VisibleSettingsPanel => return Ok(()),
            WidgetState::Hidden => {
                return Err("Cannot open settings while the widget is hidden".to_string())
            }
            WidgetState::VisibleCompact | WidgetState::VisibleExpanded => {}
        }

        let metrics = self.display()?;
        let current = self.current_bounds()?;
        let bounds = settings_panel_bounds(&metrics, current.x);

        self.drag = None;
        self.window.set_bounds(bounds)?;
        self.panel_open = true;
        self.notify(&WidgetEvent::SettingsOpened);
        Ok(())
    }

    pub fn close_settings(&mut self) -> Result<Option<PendingNudge>, String> {
        if !self.panel_open {
            return Ok(None);
        }

        let metrics = self.display()?;
        let current = self.current_bounds()?;
        let size = widget_size(self.expanded);
        let y = place(&metrics, self.store.settings().corner, size, self.snap_to_taskbar()).y;
        let target = clamp_to_screen(Point::new(current.x, y), size, &metrics);

        self.window.set_bounds(Rect::from_parts(target, size))?;
        self.panel_open = false;
        self.notify(&WidgetEvent::SettingsClosed);
        Ok(self.begin_nudge())
    }

    pub fn save_widget_settings(&mut self, widget_settings: Value) -> Result<(), String> {
        if !widget_settings.is_object() {
            return Err("widgetSettings must be a JSON object".to_string());
        }
        self.store.settings_mut().widget_settings = widget_settings;
        self.store.save();
        Ok(())
    }

    pub fn hide(&mut self) -> Result<(), String> {
        self.drag = None;
        self.window.hide()
    }

    pub fn show_and_focus(&mut self) -> Result<Option<PendingNudge>, String> {
        if self.snap_to_taskbar() && !self.panel_open {
            let _ = self.window.set_always_on_top(false);
            let point = self.corner_point(widget_size(self.expanded), true)?;
            self.window.set_position(point)?;
        }
        self.revealed = true;
        self.window.show()?;
        let _ = self.window.focus();
        Ok(self.begin_nudge())
    }

    pub fn toggle_visibility(&mut self) -> Result<Option<PendingNudge>, String> {
        if self.window.is_visible() {
            self.hide()?;
            return Ok(None);
        }
        self.show_and_focus()
    }

    pub fn snap_corner(&mut self, corner: Corner) -> Result<Option<PendingNudge>, String> {
        let snap = self.snap_to_taskbar();
        self.store.settings_mut().corner = corner;
        let point = self.corner_point(widget_size(self.expanded), snap)?;
        self.window.set_position(point)?;

        let settings = self.store.settings_mut();
        settings.position = Some(point);
        if snap {
            let _ = self.window.set_always_on_top(true);
            settings.always_on_top = true;
        }
        self.store.save();
        Ok(self.begin_nudge())
    }

    pub fn reposition(&mut self) -> Result<(), String> {
        let point = self.corner_point(widget_size(self.expanded), self.snap_to_taskbar())?;
        self.window.set_position(point)?;
        self.store.settings_mut().position = Some(point);
        self.store.save();
        Ok(())
    }

    pub fn toggle_always_on_top(&mut self) -> Result<bool, String> {
        let always_on_top = !self.store.settings().always_on_top;
        self.window.set_always_on_top(always_on_top)?;
        self.store.settings_mut().always_on_top = always_on_top;
        self.store.save();
        Ok(always_on_top)
    }

    pub fn stop_adhan(&self) {
        if self.window.bounds().is_some() {
            self.notify(&WidgetEvent::StopAdhan);
        }
    }

    pub fn drag_start(&mut self, pointer: Pointer) {
        let Some(window) = self.window.bounds() else {
            return;
        };
        self.drag = Some(DragAnchor { pointer, window });
    }

    pub fn move_window(&mut self, pointer: Pointer) -> Result<(), String> {
        let Some(anchor) = self.drag else {
            return Ok(());
        };
        if self.window.bounds().is_none() {
            return Ok(());
        }
        let x = (anchor.window.x as f64 + pointer.x - anchor.pointer.x).round() as i32;
        let y = (anchor.window.y as f64 + pointer.y - anchor.pointer.y).round() as i32;
        self.window
            .set_bounds(Rect::from_parts(Point::new(x, y), anchor.window.size()))
    }

    pub fn drag_end(&mut self) -> Option<PendingNudge> {
        self.drag = None;
        self.begin_nudge()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn clear_drag_anchor(&mut self) {
        self.drag = None;
    }

    // Snapped and settings-panel positions are never written.
    pub fn capture_position(&mut self) {
        if self.snap_to_taskbar() {
            return;
        }
        let Some(bounds) = self.window.bounds() else {
            return;
        };
        if !is_widget_size(bounds.size()) {
            return;
        }
        let position = bounds.origin();
        if self.store.settings().position == Some(position) {
            return;
        }
        self.store.settings_mut().position = Some(position);
        self.store.save();
    }

    /// Re-snaps a widget-sized window and drops always-on-top; the second half
    /// is [`Self::finish_nudge`]. No-op unless snapped.
    pub fn begin_nudge(&mut self) -> Option<PendingNudge> {
        if !self.snap_to_taskbar() {
            return None;
        }
        let bounds = self.window.bounds()?;
        if is_widget_size(bounds.size()) {
            if let Some(metrics) = self.window.primary_display() {
                let point = place(&metrics, self.store.settings().corner, bounds.size(), true);
                let _ = self.window.set_position(point);
            }
        }
        let _ = self.window.set_always_on_top(false);
        Some(PendingNudge(()))
    }

    pub fn finish_nudge(&mut self, _pending: PendingNudge) {
        if self.window.bounds().is_none() {
            return;
        }
        let _ = self.window.set_always_on_top(true);
        let _ = self.window.focus();
    }

    pub fn periodic_nudge(&mut self) -> Option<PendingNudge> {
        let bounds = self.window.bounds()?;
        if !self.window.is_visible() || !self.snap_to_taskbar() {
            return None;
        }
        if !is_widget_size(bounds.size()) {
            return None;
        }
        self.begin_nudge()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::models::Size;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        SetBounds(Rect),
        SetPosition(Point),
        AlwaysOnTop(bool),
        Show,
        Hide,
        Focus,
        Emit(&'static str, Value),
    }

    #[derive(Debug)]
    pub struct FakeState {
        pub bounds: Option<Rect>,
        pub visible: bool,
        pub display: Option<DisplayMetrics>,
        pub calls: Vec<Call>,
    }

    #[derive(Debug, Clone)]
    pub struct FakeWindow(pub Rc<RefCell<FakeState>>);

    impl FakeWindow {
        pub fn new(bounds: Rect, display: DisplayMetrics) -> Self {
            Self(Rc::new(RefCell::new(FakeState {
                bounds: Some(bounds),
                visible: true,
                display: Some(display),
                calls: Vec::new(),
            })))
        }

        pub fn bounds_now(&self) -> Rect {
            self.0.borrow().bounds.expect("window alive")
        }

        pub fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut self.0.borrow_mut().calls)
        }

        pub fn destroy(&self) {
            self.0.borrow_mut().bounds = None;
        }

        pub fn set_display(&self, display: DisplayMetrics) {
            self.0.borrow_mut().display = Some(display);
        }

        fn record(&self, call: Call) {
            self.0.borrow_mut().calls.push(call);
        }
    }

    impl WidgetWindow for FakeWindow {
        fn bounds(&self) -> Option<Rect> {
            self.0.borrow().bounds
        }

        fn is_visible(&self) -> bool {
            let s = self.0.borrow();
            s.bounds.is_some() && s.visible
        }

        fn primary_display(&self) -> Option<DisplayMetrics> {
            self.0.borrow().display
        }

        fn set_bounds(&self, bounds: Rect) -> Result<(), String> {
            self.record(Call::SetBounds(bounds));
            let mut s = self.0.borrow_mut();
            let current = s.bounds.as_mut().ok_or("destroyed")?;
            *current = bounds;
            Ok(())
        }

        fn set_position(&self, position: Point) -> Result<(), String> {
            self.record(Call::SetPosition(position));
            let mut s = self.0.borrow_mut();
            let current = s.bounds.as_mut().ok_or("destroyed")?;
            *current = Rect::from_parts(position, Size::new(current.width, current.height));
            Ok(())
        }

        fn set_always_on_top(&self, always_on_top: bool) -> Result<(), String> {
            self.record(Call::AlwaysOnTop(always_on_top));
            Ok(())
        }

        fn show(&self) -> Result<(), String> {
            self.record(Call::Show);
            self.0.borrow_mut().visible = true;
            Ok(())
        }

        fn hide(&self) -> Result<(), String> {
            self.record(Call::Hide);
            self.0.borrow_mut().visible = false;
            Ok(())
        }

        fn focus(&self) -> Result<(), String> {
            self.record(Call::Focus);
            Ok(())
        }

        fn emit(&self, event: &WidgetEvent) -> Result<(), String> {
            self.record(Call::Emit(event.name(), event.payload()));
            Ok(())
        }
    }
}
