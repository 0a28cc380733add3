use super::startup_folder::{RunEntries, ShortcutWriter, StartupFolderRegistration};
use std::io;
use std::os::windows::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tauri::AppHandle;
use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE};
use winreg::RegKey;

const RUN_KEY: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Run";
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

pub struct RegistryRun;

impl RegistryRun {
    fn open(&self) -> io::Result<RegKey> {
        RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(RUN_KEY, KEY_SET_VALUE | KEY_QUERY_VALUE)
    }
}

impl RunEntries for RegistryRun {
    fn contains(&self, name: &str) -> bool {
        self.open()
            .and_then(|key| key.get_value::<String, _>(name))
            .is_ok()
    }

    fn set(&self, name: &str, command: &str) -> Result<(), String> {
        let (key, _) = RegKey::predef(HKEY_CURRENT_USER)
            .create_subkey(RUN_KEY)
            .map_err(|e| format!("Failed to open Run key: {}", e))?;
        key.set_value(name, &command.to_string())
            .map_err(|e| format!("Failed to add Run value {}: {}", name, e))
    }

    fn remove(&self, name: &str) -> Result<(), String> {
        let key = match self.open() {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(format!("Failed to open Run key: {}", e)),
        };
        match key.delete_value(name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("Failed to remove Run value {}: {}", name, e)),
        }
    }
}

pub struct PowerShellShortcut;

fn ps_quote(value: &Path) -> String {
    value.to_string_lossy().replace('\'', "''")
}

impl ShortcutWriter for PowerShellShortcut {
    fn write(&self, link: &Path, target: &Path) -> Result<(), String> {
        let working_dir = target.parent().unwrap_or(target);
        let script = format!(
            "$WshShell = New-Object -ComObject WScript.Shell\n\
             $Shortcut = $WshShell.CreateShortcut('{link}')\n\
             $Shortcut.TargetPath = '{target}'\n\
             $Shortcut.WorkingDirectory = '{dir}'\n\
             $Shortcut.Description = 'Salaat Widget'\n\
             $Shortcut.Save()\n\
             [System.Runtime.Interopservices.Marshal]::ReleaseComObject($WshShell) | Out-Null",
            link = ps_quote(link),
            target = ps_quote(target),
            dir = ps_quote(working_dir),
        );

        let output = Command::new("powershell")
            .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", &script])
            .creation_flags(CREATE_NO_WINDOW)
            .output()
            .map_err(|e| format!("Failed to run powershell: {}", e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!(
                "Failed to create startup shortcut: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

pub fn registration(
    _app: &AppHandle,
) -> Result<StartupFolderRegistration<RegistryRun, PowerShellShortcut>, String> {
    let appdata = std::env::var("APPDATA").map_err(|_| "Failed to resolve APPDATA".to_string())?;
    let startup_dir = PathBuf::from(appdata)
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("Startup");
    let exe =
        std::env::current_exe().map_err(|e| format!("Failed to resolve current_exe: {}", e))?;

    Ok(StartupFolderRegistration::new(
        startup_dir,
        exe,
        RegistryRun,
        PowerShellShortcut,
    ))
}
