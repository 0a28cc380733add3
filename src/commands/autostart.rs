use crate::core::autostart::Autostart;
use tauri::{AppHandle, Manager};

#[tauri::command]
pub async fn autostart_is_enabled(app_handle: AppHandle) -> Result<bool, String> {
    Ok(app_handle.state::<Autostart>().is_enabled())
}

#[tauri::command]
pub async fn set_auto_start(app_handle: AppHandle, enabled: bool) -> Result<(), String> {
    app_handle.state::<Autostart>().set_enabled(enabled)
}
