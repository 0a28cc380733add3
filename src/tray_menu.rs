use crate::{commands, core::window_host::Widget, models::Corner};
use tauri::{
    menu::{CheckMenuItemBuilder, MenuBuilder, MenuItemBuilder, SubmenuBuilder},
    tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent},
    AppHandle, Manager, Wry,
};

const TRAY_ID: &str = "main";
const TOOLTIP: &str = "Salaat Widget";
const SNAP_PREFIX: &str = "snap:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrayState {
    pub always_on_top: bool,
    pub corner: Corner,
}

fn corner_items(current: Corner) -> Vec<(String, &'static str, bool)> {
    Corner::ALL
        .iter()
        .map(|corner| {
            (
                format!("{}{}", SNAP_PREFIX, corner.as_str()),
                corner.label(),
                *corner == current,
            )
        })
        .collect()
}

/// Locks the controller; call off the main thread only.
fn current_state(app: &AppHandle) -> Option<TrayState> {
    let widget = app.try_state::<Widget>()?;
    let controller = widget.lock();
    let settings = controller.settings();
    Some(TrayState {
        always_on_top: settings.always_on_top,
        corner: settings.corner,
    })
}

fn build_tray_menu(
    app: &AppHandle<Wry>,
    state: TrayState,
) -> tauri::Result<tauri::menu::Menu<Wry>> {
    let toggle_main = MenuItemBuilder::with_id("toggle_main", "Show/Hide").build(app)?;
    let stop_adhan = MenuItemBuilder::with_id("stop_adhan", "Stop Adhan").build(app)?;
    let always_on_top = CheckMenuItemBuilder::with_id("always_on_top", "Always on Top")
        .checked(state.always_on_top)
        .build(app)?;

    let mut snap = SubmenuBuilder::with_id(app, "snap", "Snap to Corner");
    for (id, label, checked) in corner_items(state.corner) {
        let item = CheckMenuItemBuilder::with_id(id, label)
            .checked(checked)
            .build(app)?;
        snap = snap.item(&item);
    }
    let snap = snap.build()?;

    let quit = MenuItemBuilder::with_id("quit", "Quit").build(app)?;

    MenuBuilder::new(app)
        .item(&toggle_main)
        .item(&stop_adhan)
        .item(&always_on_top)
        .separator()
        .item(&snap)
        .separator()
        .item(&quit)
        .build()
}

pub fn refresh_tray_menu(app: &AppHandle<Wry>) -> tauri::Result<()> {
    let Some(tray) = app.tray_by_id(TRAY_ID) else {
        return Ok(());
    };
    let Some(state) = current_state(app) else {
        return Ok(());
    };
    let menu = build_tray_menu(app, state)?;
    tray.set_menu(Some(menu))?;
    Ok(())
}

pub fn create_tray(app: &AppHandle<Wry>, state: TrayState) -> tauri::Result<()> {
    let menu = build_tray_menu(app, state)?;
    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip(TOOLTIP)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_menu_event(handle_menu_event)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                let app = tray.app_handle().clone();
                tauri::async_runtime::spawn(async move {
                    let _ = commands::window::toggle_visibility(app).await;
                });
            }
        });
    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone());
    }
    builder.build(app)?;
    Ok(())
}

fn handle_menu_event(app: &AppHandle<Wry>, event: tauri::menu::MenuEvent) {
    let id = event.id().as_ref();
    match id {
        "toggle_main" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::window::toggle_visibility(app).await;
            });
        }
        "stop_adhan" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                commands::window::stop_adhan(app).await;
            });
        }
        "always_on_top" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::window::toggle_always_on_top(app).await;
            });
        }
        "quit" => app.exit(0),
        _ => {
            if let Some(corner) = id.strip_prefix(SNAP_PREFIX) {
                let app = app.clone();
                let corner = corner.to_string();
                tauri::async_runtime::spawn(async move {
                    let _ = commands::window::snap_corner(app, corner).await;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_the_current_corner_is_checked() {
        let items = corner_items(Corner::TopRight);
        let labels: Vec<_> = items.iter().map(|(_, label, _)| *label).collect();
        assert_eq!(
            labels,
            vec!["Bottom Left", "Bottom Right", "Top Left", "Top Right"]
        );

        let checked: Vec<_> = items
            .iter()
            .filter(|(_, _, checked)| *checked)
            .map(|(id, _, _)| id.as_str())
            .collect();
        assert_eq!(checked, vec!["snap:top-right"]);
    }

    #[test]
    fn menu_ids_parse_back_to_corners() {
        for corner in Corner::ALL {
            let (id, _, _) = corner_items(corner)
                .into_iter()
                .find(|(_, _, checked)| *checked)
                .expect("checked item");
            let parsed = id.strip_prefix(SNAP_PREFIX).and_then(Corner::parse);
            assert_eq!(parsed, Some(corner));
        }
    }
}
