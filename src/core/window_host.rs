use super::display::DisplayMetrics;
use super::widget_controller::{initial_bounds, WidgetController, WidgetEvent, WidgetWindow};
use crate::models::{Point, Rect, Settings, Size};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tauri::utils::config::BackgroundThrottlingPolicy;
use tauri::{
    AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, Monitor, Position, WebviewUrl,
    WebviewWindow, WebviewWindowBuilder,
};

pub const MAIN_WINDOW_LABEL: &str = "main";

// Setting browser args replaces WebView2's defaults, so they are repeated here.
#[cfg_attr(not(windows), allow(dead_code))]
const WEBVIEW2_ARGS: &str = "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection \
     --autoplay-policy=no-user-gesture-required";

const CAPTURE_SETTLE: Duration = Duration::from_millis(450);

static CAPTURE_TOKEN: AtomicU64 = AtomicU64::new(0);

const FALLBACK_METRICS: DisplayMetrics =
    DisplayMetrics::new(Size::new(1920, 1080), Rect::new(0, 0, 1920, 1040));

pub fn metrics_from_monitor(monitor: &Monitor) -> DisplayMetrics {
    let size = monitor.size();
    let work = monitor.work_area();
    DisplayMetrics::from_physical(
        (size.width, size.height),
        (work.position.x, work.position.y),
        (work.size.width, work.size.height),
        monitor.scale_factor(),
    )
}

pub struct TauriWidgetWindow {
    window: WebviewWindow,
}

impl TauriWidgetWindow {
    pub fn new(window: WebviewWindow) -> Self {
        Self { window }
    }

    fn scale_factor(&self) -> f64 {
        self.window
            .scale_factor()
            .ok()
            .filter(|sf| sf.is_finite() && *sf > 0.0)
            .unwrap_or(1.0)
    }
}

impl WidgetWindow for TauriWidgetWindow {
    fn bounds(&self) -> Option<Rect> {
        let position = self.window.outer_position().ok()?;
        let size = self.window.outer_size().ok()?;
        let sf = self.scale_factor();
        let logical = |v: f64| (v / sf).round() as i32;
        Some(Rect::new(
            logical(position.x as f64),
            logical(position.y as f64),
            logical(size.width as f64),
            logical(size.height as f64),
        ))
    }

    fn is_visible(&self) -> bool {
        self.window.is_visible().unwrap_or(false)
    }

    fn primary_display(&self) -> Option<DisplayMetrics> {
        self.window
            .primary_monitor()
            .ok()
            .flatten()
            .map(|m| metrics_from_monitor(&m))
    }

    fn set_bounds(&self, bounds: Rect) -> Result<(), String> {
        self.window
            .set_size(LogicalSize::new(bounds.width as f64, bounds.height as f64))
            .map_err(|e| format!("Failed to resize window: {}", e))?;
        self.set_position(bounds.origin())
    }

    fn set_position(&self, position: Point) -> Result<(), String> {
        self.window
            .set_position(Position::Logical(LogicalPosition::new(
                position.x as f64,
                position.y as f64,
            )))
            .map_err(|e| format!("Failed to move window: {}", e))
    }

    fn set_always_on_top(&self, always_on_top: bool) -> Result<(), String> {
        self.window
            .set_always_on_top(always_on_top)
            .map_err(|e| format!("Failed to set always on top: {}", e))
    }

    fn show(&self) -> Result<(), String> {
        self.window
            .show()
            .map_err(|e| format!("Failed to show window: {}", e))
    }

    fn hide(&self) -> Result<(), String> {
        self.window
            .hide()
            .map_err(|e| format!("Failed to hide window: {}", e))
    }

    fn focus(&self) -> Result<(), String> {
        self.window
            .set_focus()
            .map_err(|e| format!("Failed to focus window: {}", e))
    }

    fn emit(&self, event: &WidgetEvent) -> Result<(), String> {
        self.window
            .emit(event.name(), event.payload())
            .map_err(|e| format!("Failed to emit {}: {}", event.name(), e))
    }
}

pub struct Widget(Mutex<WidgetController<TauriWidgetWindow>>);

impl Widget {
    pub fn new(controller: WidgetController<TauriWidgetWindow>) -> Self {
        Self(Mutex::new(controller))
    }

    /// Never hold the guard across an `.await`.
    pub fn lock(&self) -> MutexGuard<'_, WidgetController<TauriWidgetWindow>> {
        self.0.lock()
    }
}

/// Built hidden; the first finished page load reveals it.
pub fn create_main_window(app: &AppHandle, settings: &Settings) -> tauri::Result<WebviewWindow> {
    let metrics = app
        .primary_monitor()
        .ok()
        .flatten()
        .map(|m| metrics_from_monitor(&m))
        .unwrap_or(FALLBACK_METRICS);
    let bounds = initial_bounds(settings, &metrics);
    let always_on_top = settings.always_on_top || settings.snap_to_taskbar();

    let builder =
        WebviewWindowBuilder::new(app, MAIN_WINDOW_LABEL, WebviewUrl::App("index.html".into()))
            .title("Salaat Widget")
            .inner_size(bounds.width as f64, bounds.height as f64)
            .position(bounds.x as f64, bounds.y as f64)
            .decorations(false)
            .transparent(true)
            .resizable(false)
            .skip_taskbar(true)
            .always_on_top(always_on_top)
            .shadow(false)
            .visible(false)
            // Prayer timers and the adhan must keep running while hidden.
            .background_throttling(BackgroundThrottlingPolicy::Disabled);

    #[cfg(windows)]
    let builder = builder.additional_browser_args(WEBVIEW2_ARGS);

    builder.build()
}

pub fn schedule_capture(app: &AppHandle) {
    let token = CAPTURE_TOKEN.fetch_add(1, Ordering::SeqCst) + 1;
    let app = app.clone();

    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(CAPTURE_SETTLE).await;
        if CAPTURE_TOKEN.load(Ordering::SeqCst) != token {
            return;
        }
        let Some(widget) = app.try_state::<Widget>() else {
            return;
        };
        widget.lock().capture_position();
    });
}
