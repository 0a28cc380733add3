//! Startup-folder shortcut plus a `Run` value, the pair Windows shows under
//! Task Manager's startup apps.

use super::StartupRegistration;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SHORTCUT_NAME: &str = "Salaat Widget.lnk";
pub const RUN_VALUE_NAME: &str = "Salaat Widget";

/// Every shortcut an earlier build (or the old Electron shell) may have left.
pub const KNOWN_SHORTCUTS: [&str; 2] = [SHORTCUT_NAME, "Electron.lnk"];
pub const KNOWN_RUN_VALUES: [&str; 3] = [RUN_VALUE_NAME, "Electron", "Salaat"];

pub trait RunEntries: Send + Sync {
    fn contains(&self, name: &str) -> bool;
    fn set(&self, name: &str, command: &str) -> Result<(), String>;
    fn remove(&self, name: &str) -> Result<(), String>;
}

pub trait ShortcutWriter: Send + Sync {
    fn write(&self, link: &Path, target: &Path) -> Result<(), String>;
}

pub struct StartupFolderRegistration<R, S> {
    startup_dir: PathBuf,
    exe: PathBuf,
    run: R,
    shortcuts: S,
}

impl<R: RunEntries, S: ShortcutWriter> StartupFolderRegistration<R, S> {
    pub fn new(startup_dir: PathBuf, exe: PathBuf, run: R, shortcuts: S) -> Self {
        Self {
            startup_dir,
            exe,
            run,
            shortcuts,
        }
    }

    fn shortcut_path(&self) -> PathBuf {
        self.startup_dir.join(SHORTCUT_NAME)
    }

    fn run_command(&self) -> String {
        let exe = self.exe.to_string_lossy();
        if exe.contains(' ') {
            format!("\"{}\"", exe)
        } else {
            exe.to_string()
        }
    }

    fn remove_all(&self, failures: &mut Vec<String>) {
        for name in KNOWN_SHORTCUTS {
            let path = self.startup_dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => failures.push(format!("Failed to remove {}: {}", path.display(), e)),
            }
        }
        for name in KNOWN_RUN_VALUES {
            if let Err(e) = self.run.remove(name) {
                failures.push(e);
            }
        }
    }
}

impl<R: RunEntries, S: ShortcutWriter> StartupRegistration for StartupFolderRegistration<R, S> {
    fn is_enabled(&self) -> bool {
        self.shortcut_path().exists() || self.run.contains(RUN_VALUE_NAME)
    }

    /// Every step is attempted; failures are reported together.
    fn set_enabled(&self, enabled: bool) -> Result<(), String> {
        let mut failures = Vec::new();
        self.remove_all(&mut failures);

        if enabled {
            if let Err(e) = fs::create_dir_all(&self.startup_dir) {
                failures.push(format!("Failed to create startup folder: {}", e));
            }
            if let Err(e) = self.shortcuts.write(&self.shortcut_path(), &self.exe) {
                failures.push(e);
            }
            if let Err(e) = self.run.set(RUN_VALUE_NAME, &self.run_command()) {
                failures.push(e);
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }
}
