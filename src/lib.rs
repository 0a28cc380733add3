mod commands;
mod core;
mod models;
mod tray_menu;

use crate::core::app_log::{self, AppLog};
use crate::core::autostart::Autostart;
use crate::core::display::taskbar_position;
use crate::core::settings_store::{SettingsStore, SETTINGS_FILE_NAME};
use crate::core::widget_controller::WidgetController;
use crate::core::window_host::{self, TauriWidgetWindow, Widget, MAIN_WINDOW_LABEL};
use crate::core::widget_controller::WidgetWindow;
use serde_json::json;
use tauri::{webview::PageLoadEvent, Manager, WindowEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::window::show_and_focus(app).await;
            });
        }))
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let app_handle = app.handle().clone();
            let log = AppLog::for_app(&app_handle)?;
            app_log::install_panic_hook(log.clone());
            log.info("app", "startup", None);

            let settings_path = app_handle.path().app_data_dir()?.join(SETTINGS_FILE_NAME);
            let store = SettingsStore::load(settings_path, log.clone());
            let window = window_host::create_main_window(&app_handle, store.settings())?;
            let controller = WidgetController::new(TauriWidgetWindow::new(window), store);
            if let Some(metrics) = controller.window().primary_display() {
                let taskbar = taskbar_position(&metrics);
                log.info(
                    "display",
                    "primary_display",
                    Some(json!({
                        "screen": [metrics.screen.width, metrics.screen.height],
                        "taskbarEdge": taskbar.edge.as_str(),
                        "taskbarThickness": taskbar.thickness,
                    })),
                );
            }
            let tray_state = tray_menu::TrayState {
                always_on_top: controller.settings().always_on_top,
                corner: controller.settings().corner,
            };

            app.manage(Autostart::for_current_platform(&app_handle, log.clone()));
            app.manage(Widget::new(controller));
            app.manage(log);

            tray_menu::create_tray(&app_handle, tray_state)?;
            core::nudge::start_periodic(&app_handle);

            Ok(())
        })
        .on_page_load(|webview, payload| {
            if webview.label() != MAIN_WINDOW_LABEL
                || !matches!(payload.event(), PageLoadEvent::Finished)
            {
                return;
            }
            let app = webview.app_handle().clone();
            tauri::async_runtime::spawn(commands::window::page_loaded(app));
        })
        .invoke_handler(tauri::generate_handler![
            commands::window::toggle_expand,
            commands::window::open_settings,
            commands::window::close_settings,
            commands::window::save_widget_settings,
            commands::window::close_app,
            commands::window::snap_corner,
            commands::window::drag_start,
            commands::window::move_window,
            commands::window::drag_end,
            commands::window::reposition,
            commands::window::get_init_state,
            commands::autostart::set_auto_start,
            commands::autostart::autostart_is_enabled,
            commands::sounds::select_adhan_file,
            commands::sounds::select_reminder_file,
            commands::sounds::select_elapsed_file,
            commands::logs::append_log,
            commands::logs::read_logs,
            commands::logs::clear_logs,
        ])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }
            // These run on the main thread, which window calls made under the
            // controller lock wait on. Never lock here; hand off instead.
            let app = window.app_handle().clone();
            match event {
                WindowEvent::Focused(false) => {
                    tauri::async_runtime::spawn(commands::window::window_blurred(app));
                }
                WindowEvent::Moved(_) => window_host::schedule_capture(&app),
                WindowEvent::CloseRequested { api, .. } => {
                    api.prevent_close();
                    tauri::async_runtime::spawn(commands::window::hide_widget(app));
                }
                _ => {}
            }
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
