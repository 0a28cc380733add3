//! Launch-at-login registration, one implementation per platform.

#[cfg(any(target_os = "macos", test))]
mod launch_agent;
#[cfg(any(target_os = "windows", test))]
mod startup_folder;
#[cfg(target_os = "windows")]
mod windows;
#[cfg(any(target_os = "linux", test))]
mod xdg;

use super::app_log::AppLog;
use serde_json::json;
use tauri::AppHandle;

const LOG_SCOPE: &str = "autostart";

pub trait StartupRegistration: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool) -> Result<(), String>;
}

struct Unsupported;

impl StartupRegistration for Unsupported {
    fn is_enabled(&self) -> bool {
        false
    }

    fn set_enabled(&self, _enabled: bool) -> Result<(), String> {
        Err("Autostart is not supported on this platform.".to_string())
    }
}

pub struct Autostart {
    inner: Box<dyn StartupRegistration>,
    log: AppLog,
}

impl Autostart {
    pub fn new(inner: Box<dyn StartupRegistration>, log: AppLog) -> Self {
        Self { inner, log }
    }

    pub fn for_current_platform(app: &AppHandle, log: AppLog) -> Self {
        match platform_registration(app) {
            Ok(inner) => Self::new(inner, log),
            Err(e) => {
                log.warn(LOG_SCOPE, "unavailable", Some(json!({ "error": e })));
                Self::new(Box::new(Unsupported), log)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<(), String> {
        match self.inner.set_enabled(enabled) {
            Ok(()) => {
                self.log
                    .info(LOG_SCOPE, "updated", Some(json!({ "enabled": enabled })));
                Ok(())
            }
            Err(e) => {
                self.log.warn(
                    LOG_SCOPE,
                    "set_enabled_failed",
                    Some(json!({ "enabled": enabled, "error": e })),
                );
                Err(e)
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn platform_registration(app: &AppHandle) -> Result<Box<dyn StartupRegistration>, String> {
    Ok(Box::new(launch_agent::LaunchAgent::for_app(app)?))
}

#[cfg(target_os = "windows")]
fn platform_registration(app: &AppHandle) -> Result<Box<dyn StartupRegistration>, String> {
    Ok(Box::new(windows::registration(app)?))
}

#[cfg(target_os = "linux")]
fn platform_registration(app: &AppHandle) -> Result<Box<dyn StartupRegistration>, String> {
    Ok(Box::new(xdg::XdgAutostart::for_app(app)?))
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
fn platform_registration(_app: &AppHandle) -> Result<Box<dyn StartupRegistration>, String> {
    Ok(Box::new(Unsupported))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_logged_and_returned() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AppLog::new(dir.path());
        let autostart = Autostart::new(Box::new(Unsupported), log.clone());

        assert!(!autostart.is_enabled());
        assert!(autostart.set_enabled(true).is_err());

        let records = log.read(10, None, None).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, "warn");
        assert_eq!(records[0].message, "set_enabled_failed");
    }
}
