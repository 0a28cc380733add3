use super::StartupRegistration;
use std::fs;
use std::path::{Path, PathBuf};

pub struct XdgAutostart {
    desktop_path: PathBuf,
    exec: PathBuf,
}

impl XdgAutostart {
    pub fn new(identifier: &str, config_dir: &Path, exec: PathBuf) -> Self {
        Self {
            desktop_path: config_dir
                .join("autostart")
                .join(format!("{}.desktop", identifier)),
            exec,
        }
    }

    #[cfg(target_os = "linux")]
    pub fn for_app(app: &tauri::AppHandle) -> Result<Self, String> {
        use tauri::Manager;

        let config_dir = app
            .path()
            .config_dir()
            .map_err(|e| format!("Failed to resolve config dir: {}", e))?;
        let exec =
            std::env::current_exe().map_err(|e| format!("Failed to resolve current_exe: {}", e))?;
        Ok(Self::new(&app.config().identifier, &config_dir, exec))
    }

    fn entry(&self) -> String {
        let exec = self.exec.to_string_lossy().replace('"', "\\\"");
        format!(
            "[Desktop Entry]\nType=Application\nName=Salaat Widget\nExec=\"{}\"\nTerminal=false\nX-GNOME-Autostart-enabled=true\n",
            exec
        )
    }
}

impl StartupRegistration for XdgAutostart {
    fn is_enabled(&self) -> bool {
        self.desktop_path.exists()
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), String> {
        if !enabled {
            if self.desktop_path.exists() {
                fs::remove_file(&self.desktop_path)
                    .map_err(|e| format!("Failed to remove autostart entry: {}", e))?;
            }
            return Ok(());
        }

        if let Some(parent) = self.desktop_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create autostart directory: {}", e))?;
        }
        fs::write(&self.desktop_path, self.entry())
            .map_err(|e| format!("Failed to write autostart entry: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desktop_entry_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let entry = XdgAutostart::new(
            "com.salaat.widget",
            dir.path(),
            PathBuf::from("/opt/salaat widget/salaat-widget"),
        );
        assert!(!entry.is_enabled());

        entry.set_enabled(true).expect("enable");
        let text = fs::read_to_string(dir.path().join("autostart/com.salaat.widget.desktop"))
            .expect("entry");
        assert!(text.contains("Exec=\"/opt/salaat widget/salaat-widget\""));
        assert!(entry.is_enabled());

        entry.set_enabled(false).expect("disable");
        assert!(!entry.is_enabled());
    }
}
