use crate::core::app_log::AppLog;
use crate::core::sound_files::{import_sound, SoundKind, AUDIO_EXTENSIONS};
use crate::core::widget_controller::WidgetEvent;
use crate::core::window_host::Widget;
use serde_json::json;
use std::path::PathBuf;
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::DialogExt;

async fn pick_audio_file(app_handle: &AppHandle) -> Result<Option<PathBuf>, String> {
    let app = app_handle.clone();
    let picked = tauri::async_runtime::spawn_blocking(move || {
        app.dialog()
            .file()
            .add_filter("Audio", &AUDIO_EXTENSIONS)
            .blocking_pick_file()
    })
    .await
    .map_err(|e| format!("File picker failed: {}", e))?;

    match picked {
        Some(path) => path
            .into_path()
            .map(Some)
            .map_err(|e| format!("Unsupported file path: {}", e)),
        None => Ok(None),
    }
}

/// `None` when the picker was cancelled.
async fn select_sound(app_handle: AppHandle, kind: SoundKind) -> Result<Option<String>, String> {
    let Some(source) = pick_audio_file(&app_handle).await? else {
        return Ok(None);
    };

    let data_dir = app_handle
        .path()
        .app_data_dir()
        .map_err(|e| format!("Failed to resolve data dir: {}", e))?;

    let log = app_handle.state::<AppLog>();
    let dest = match import_sound(&source, &data_dir, kind) {
        Ok(dest) => dest,
        Err(e) => {
            log.error(
                "sounds",
                "import_failed",
                Some(json!({ "kind": kind.as_str(), "error": format!("{e:#}") })),
            );
            return Err(format!("Failed to import {} sound: {:#}", kind.as_str(), e));
        }
    };

    let path = dest.to_string_lossy().to_string();
    log.info(
        "sounds",
        "imported",
        Some(json!({ "kind": kind.as_str(), "path": path })),
    );

    let event = WidgetEvent::SoundSelected {
        kind,
        path: path.clone(),
    };
    app_handle.state::<Widget>().lock().notify(&event);
    Ok(Some(path))
}

#[tauri::command]
pub async fn select_adhan_file(app_handle: AppHandle) -> Result<Option<String>, String> {
    select_sound(app_handle, SoundKind::Adhan).await
}

#[tauri::command]
pub async fn select_reminder_file(app_handle: AppHandle) -> Result<Option<String>, String> {
    select_sound(app_handle, SoundKind::Reminder).await
}

#[tauri::command]
pub async fn select_elapsed_file(app_handle: AppHandle) -> Result<Option<String>, String> {
    select_sound(app_handle, SoundKind::Elapsed).await
}
