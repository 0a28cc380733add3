use crate::core::autostart::Autostart;
use crate::core::nudge;
use crate::core::widget_controller::{InitState, Pointer, WidgetController};
use crate::core::window_host::{TauriWidgetWindow, Widget};
use crate::models::Corner;
use serde_json::Value;
use tauri::{AppHandle, Manager};

fn with_widget<T>(
    app_handle: &AppHandle,
    f: impl FnOnce(&mut WidgetController<TauriWidgetWindow>) -> T,
) -> T {
    let widget = app_handle.state::<Widget>();
    let mut controller = widget.lock();
    f(&mut controller)
}

fn auto_start_enabled(app_handle: &AppHandle) -> bool {
    app_handle.state::<Autostart>().is_enabled()
}

#[tauri::command]
pub async fn toggle_expand(app_handle: AppHandle) -> Result<(), String> {
    let pending = with_widget(&app_handle, |c| c.toggle_expand())?;
    nudge::follow_up(&app_handle, pending);
    Ok(())
}

#[tauri::command]
pub async fn open_settings(app_handle: AppHandle) -> Result<(), String> {
    with_widget(&app_handle, |c| c.open_settings())
}

#[tauri::command]
pub async fn close_settings(app_handle: AppHandle) -> Result<(), String> {
    let pending = with_widget(&app_handle, |c| c.close_settings())?;
    nudge::follow_up(&app_handle, pending);
    Ok(())
}

#[tauri::command]
pub async fn save_widget_settings(
    app_handle: AppHandle,
    widget_settings: Value,
) -> Result<(), String> {
    with_widget(&app_handle, |c| c.save_widget_settings(widget_settings))?;
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(())
}

#[tauri::command]
pub async fn close_app(app_handle: AppHandle) -> Result<(), String> {
    hide_widget(app_handle).await
}

#[tauri::command]
pub async fn snap_corner(app_handle: AppHandle, corner: String) -> Result<(), String> {
    let corner = Corner::from(corner);
    let pending = with_widget(&app_handle, |c| c.snap_corner(corner))?;
    nudge::follow_up(&app_handle, pending);
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(())
}

#[tauri::command]
pub async fn drag_start(app_handle: AppHandle, screen_x: f64, screen_y: f64) -> Result<(), String> {
    with_widget(&app_handle, |c| c.drag_start(Pointer::new(screen_x, screen_y)));
    Ok(())
}

#[tauri::command]
pub async fn move_window(app_handle: AppHandle, screen_x: f64, screen_y: f64) -> Result<(), String> {
    with_widget(&app_handle, |c| c.move_window(Pointer::new(screen_x, screen_y)))
}

#[tauri::command]
pub async fn drag_end(app_handle: AppHandle) -> Result<(), String> {
    let pending = with_widget(&app_handle, |c| c.drag_end());
    nudge::follow_up(&app_handle, pending);
    Ok(())
}

#[tauri::command]
pub async fn reposition(app_handle: AppHandle) -> Result<(), String> {
    with_widget(&app_handle, |c| c.reposition())
}

#[tauri::command]
pub async fn get_init_state(app_handle: AppHandle) -> Result<InitState, String> {
    let auto_start = auto_start_enabled(&app_handle);
    Ok(with_widget(&app_handle, |c| c.init_state(auto_start)))
}

pub async fn page_loaded(app_handle: AppHandle) {
    let auto_start = auto_start_enabled(&app_handle);
    with_widget(&app_handle, |c| c.page_loaded(auto_start));
}

pub async fn show_and_focus(app_handle: AppHandle) -> Result<(), String> {
    let pending = with_widget(&app_handle, |c| c.show_and_focus())?;
    nudge::follow_up(&app_handle, pending);
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(())
}

pub async fn hide_widget(app_handle: AppHandle) -> Result<(), String> {
    with_widget(&app_handle, |c| c.hide())?;
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(())
}

pub async fn toggle_visibility(app_handle: AppHandle) -> Result<(), String> {
    let pending = with_widget(&app_handle, |c| c.toggle_visibility())?;
    nudge::follow_up(&app_handle, pending);
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(())
}

pub async fn toggle_always_on_top(app_handle: AppHandle) -> Result<(), String> {
    with_widget(&app_handle, |c| c.toggle_always_on_top())?;
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(())
}

pub async fn stop_adhan(app_handle: AppHandle) {
    with_widget(&app_handle, |c| c.stop_adhan());
}

pub async fn window_blurred(app_handle: AppHandle) {
    with_widget(&app_handle, |c| c.clear_drag_anchor());
}
