use super::StartupRegistration;
use std::fs;
use std::path::{Path, PathBuf};

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&apos;")
}

fn find_app_bundle_path(current_exe: &Path) -> Option<PathBuf> {
    current_exe
        .ancestors()
        .find(|ancestor| {
            ancestor
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|name| name.ends_with(".app"))
        })
        .map(Path::to_path_buf)
}

/// Launch arguments for `current_exe`: `open -a <bundle>` inside an app
/// bundle, the bare executable otherwise.
fn program_arguments(current_exe: &Path) -> Vec<String> {
    match find_app_bundle_path(current_exe) {
        Some(bundle) => vec![
            "/usr/bin/open".to_string(),
            "-a".to_string(),
            bundle.to_string_lossy().to_string(),
        ],
        None => vec![current_exe.to_string_lossy().to_string()],
    }
}

pub struct LaunchAgent {
    label: String,
    plist_path: PathBuf,
    program_arguments: Vec<String>,
}

impl LaunchAgent {
    pub fn new(identifier: &str, launch_agents_dir: &Path, current_exe: &Path) -> Self {
        let label = format!("{}.autostart", identifier);
        Self {
            plist_path: launch_agents_dir.join(format!("{}.plist", label)),
            label,
            program_arguments: program_arguments(current_exe),
        }
    }

    #[cfg(target_os = "macos")]
    pub fn for_app(app: &tauri::AppHandle) -> Result<Self, String> {
        let home = std::env::var("HOME").map_err(|_| "Failed to resolve HOME".to_string())?;
        let current_exe =
            std::env::current_exe().map_err(|e| format!("Failed to resolve current_exe: {}", e))?;
        let dir = PathBuf::from(home).join("Library").join("LaunchAgents");
        Ok(Self::new(&app.config().identifier, &dir, &current_exe))
    }

    fn plist_contents(&self) -> String {
        let args_xml = self
            .program_arguments
            .iter()
            .map(|arg| format!("    <string>{}</string>", xml_escape(arg)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
  <key>Label</key>
  <string>{label}</string>
  <key>ProgramArguments</key>
  <array>
{args_xml}
  </array>
  <key>RunAtLoad</key>
  <true/>
  <key>KeepAlive</key>
  <false/>
</dict>
</plist>
"#,
            label = xml_escape(&self.label),
            args_xml = args_xml
        )
    }
}

impl StartupRegistration for LaunchAgent {
    fn is_enabled(&self) -> bool {
        self.plist_path.exists()
    }

    fn set_enabled(&self, enabled: bool) -> Result<(), String> {
        if !enabled {
            if self.plist_path.exists() {
                fs::remove_file(&self.plist_path)
                    .map_err(|e| format!("Failed to remove plist: {}", e))?;
            }
            return Ok(());
        }

        if let Some(parent) = self.plist_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create LaunchAgents directory: {}", e))?;
        }
        fs::write(&self.plist_path, self.plist_contents())
            .map_err(|e| format!("Failed to write plist: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_is_launched_through_open() {
        let args = program_arguments(Path::new(
            "/Applications/Salaat Widget.app/Contents/MacOS/salaat-widget",
        ));
        assert_eq!(
            args,
            vec!["/usr/bin/open", "-a", "/Applications/Salaat Widget.app"]
        );
        assert_eq!(
            program_arguments(Path::new("/usr/local/bin/salaat-widget")),
            vec!["/usr/local/bin/salaat-widget"]
        );
    }

    #[test]
    fn enable_then_disable_leaves_no_plist() {
        let dir = tempfile::tempdir().expect("tempdir");
        let agents = dir.path().join("LaunchAgents");
        let agent = LaunchAgent::new("com.salaat.widget", &agents, Path::new("/bin/a&b"));

        agent.set_enabled(true).expect("enable");
        assert!(agent.is_enabled());
        let plist = fs::read_to_string(agents.join("com.salaat.widget.autostart.plist"))
            .expect("plist");
        assert!(plist.contains("<string>com.salaat.widget.autostart</string>"));
        assert!(plist.contains("<string>/bin/a&amp;b</string>"));

        agent.set_enabled(false).expect("disable");
        assert!(!agent.is_enabled());
        assert_eq!(fs::read_dir(&agents).expect("dir").count(), 0);

        agent.set_enabled(false).expect("disable twice");
    }
}
