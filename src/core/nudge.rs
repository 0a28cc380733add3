use super::widget_controller::PendingNudge;
use super::window_host::Widget;
use std::time::Duration;
use tauri::{AppHandle, Manager};

pub const NUDGE_DELAY: Duration = Duration::from_millis(50);
pub const NUDGE_INTERVAL: Duration = Duration::from_secs(90);

/// Completes a nudge after [`NUDGE_DELAY`] on the async runtime.
pub fn follow_up(app: &AppHandle, pending: Option<PendingNudge>) {
    let Some(pending) = pending else {
        return;
    };
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(NUDGE_DELAY).await;
        let Some(widget) = app.try_state::<Widget>() else {
            return;
        };
        widget.lock().finish_nudge(pending);
    });
}

pub fn start_periodic(app: &AppHandle) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let mut ticker = tokio::time::interval(NUDGE_INTERVAL);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(widget) = app.try_state::<Widget>() else {
                continue;
            };
            let pending = widget.lock().periodic_nudge();
            follow_up(&app, pending);
        }
    });
}
