use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};
use tauri::{AppHandle, Manager};

const LOG_FILE_NAME: &str = "app.log.jsonl";
const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
const MAX_ROTATIONS: usize = 3;
const DEFAULT_TAIL_BYTES: u64 = 2 * 1024 * 1024;

static LOG_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppLogRecord {
    pub ts_ms: i64,
    pub level: String,
    pub scope: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl AppLogRecord {
    pub fn now(level: &str, scope: &str, message: &str, data: Option<Value>) -> Self {
        Self {
            ts_ms: Utc::now().timestamp_millis(),
            level: level.to_string(),
            scope: scope.to_string(),
            message: message.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppLog {
    dir: PathBuf,
}

impl AppLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_app(app: &AppHandle) -> Result<Self, String> {
        let dir = app
            .path()
            .app_log_dir()
            .map_err(|e| format!("Failed to resolve log dir: {}", e))?;
        Ok(Self::new(dir))
    }

    fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.dir).map_err(|e| format!("Failed to create log dir: {}", e))
    }

    pub fn append(&self, record: AppLogRecord) -> Result<(), String> {
        let _guard = LOG_LOCK.lock();
        self.ensure_dir()?;
        rotate_if_needed(&self.dir)?;
        let path = log_path(&self.dir);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let line = serde_json::to_string(&record)
            .map_err(|e| format!("Failed to serialize log record: {}", e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|e| format!("Failed to write log record: {}", e))?;
        Ok(())
    }

    fn log(&self, level: &str, scope: &str, message: &str, data: Option<Value>) {
        #[cfg(debug_assertions)]
        if level != "info" {
            eprintln!("[{}] {}: {} {:?}", level, scope, message, data);
        }
        let _ = self.append(AppLogRecord::now(level, scope, message, data));
    }

    pub fn info(&self, scope: &str, message: &str, data: Option<Value>) {
        self.log("info", scope, message, data);
    }

    pub fn warn(&self, scope: &str, message: &str, data: Option<Value>) {
        self.log("warn", scope, message, data);
    }

    pub fn error(&self, scope: &str, message: &str, data: Option<Value>) {
        self.log("error", scope, message, data);
    }

    pub fn read(
        &self,
        limit: usize,
        query: Option<String>,
        tail_bytes: Option<u64>,
    ) -> Result<Vec<AppLogRecord>, String> {
        let _guard = LOG_LOCK.lock();
        let q = query
            .map(|s| s.to_lowercase())
            .filter(|s| !s.trim().is_empty());
        let mut records = Vec::new();

        let mut paths: Vec<PathBuf> = (1..=MAX_ROTATIONS)
            .rev()
            .map(|i| rotated_path(&self.dir, i))
            .collect();
        paths.push(log_path(&self.dir));

        for path in paths {
            if !path.exists() {
                continue;
            }
            let content = read_tail(&path, tail_bytes.unwrap_or(DEFAULT_TAIL_BYTES))?;
            for line in content.lines() {
                let Ok(rec) = serde_json::from_str::<AppLogRecord>(line) else {
                    continue;
                };
                if let Some(q) = &q {
                    let hay = format!("{} {} {}", rec.level, rec.scope, rec.message).to_lowercase();
                    if !hay.contains(q) {
                        continue;
                    }
                }
                records.push(rec);
            }
        }

        if records.len() > limit {
            records.drain(0..records.len().saturating_sub(limit));
        }
        Ok(records)
    }

    pub fn clear(&self) -> Result<(), String> {
        let _guard = LOG_LOCK.lock();

        let mut paths = vec![log_path(&self.dir)];
        for i in 1..=MAX_ROTATIONS {
            paths.push(rotated_path(&self.dir, i));
        }

        for p in paths {
            if p.exists() {
                fs::remove_file(&p)
                    .map_err(|e| format!("Failed to remove log file {}: {}", p.display(), e))?;
            }
        }
        Ok(())
    }
}

fn log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE_NAME)
}

fn rotated_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("app.log.{}.jsonl", index))
}

fn rotate_if_needed(dir: &Path) -> Result<(), String> {
    rotate_at(dir, MAX_LOG_BYTES)
}

fn rotate_at(dir: &Path, max_bytes: u64) -> Result<(), String> {
    let path = log_path(dir);
    let Ok(meta) = fs::metadata(&path) else {
        return Ok(());
    };
    if meta.len() < max_bytes {
        return Ok(());
    }

    let oldest = rotated_path(dir, MAX_ROTATIONS);
    if oldest.exists() {
        fs::remove_file(&oldest)
            .map_err(|e| format!("Failed to remove old log {}: {}", oldest.display(), e))?;
    }

    for i in (1..MAX_ROTATIONS).rev() {
        let src = rotated_path(dir, i);
        let dst = rotated_path(dir, i + 1);
        if src.exists() {
            fs::rename(&src, &dst).map_err(|e| {
                format!(
                    "Failed to rotate log ({} -> {}): {}",
                    src.display(),
                    dst.display(),
                    e
                )
            })?;
        }
    }

    let first = rotated_path(dir, 1);
    fs::rename(&path, &first).map_err(|e| {
        format!(
            "Failed to rotate log ({} -> {}): {}",
            path.display(),
            first.display(),
            e
        )
    })?;
    Ok(())
}

fn read_tail(path: &Path, max_bytes: u64) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| format!("Failed to open log file: {}", e))?;
    let size = file
        .metadata()
        .map_err(|e| format!("Failed to read log metadata: {}", e))?
        .len();

    let start = size.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))
        .map_err(|e| format!("Failed to seek log file: {}", e))?;

    let mut buf = String::new();
    file.read_to_string(&mut buf)
        .map_err(|e| format!("Failed to read log file: {}", e))?;

    if start > 0 {
        if let Some(idx) = buf.find('\n') {
            return Ok(buf[idx + 1..].to_string());
        }
        return Ok(String::new());
    }

    Ok(buf)
}

pub fn install_panic_hook(log: AppLog) {
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "panic".to_string()
        };
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let _ = log.append(AppLogRecord::now(
            "error",
            "panic",
            &format!("{} ({})", payload, location),
            None,
        ));

        prev(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn append_then_read_filters_by_query() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AppLog::new(dir.path().join("logs"));

        log.info("settings", "loaded", None);
        log.warn("autostart", "shortcut_failed", Some(json!({ "error": "denied" })));
        log.info("tray", "rebuilt", None);

        let all = log.read(100, None, None).expect("read");
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].level, "warn");
        assert_eq!(all[1].data, Some(json!({ "error": "denied" })));

        let filtered = log.read(100, Some("AUTOSTART".into()), None).expect("read");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].message, "shortcut_failed");

        let limited = log.read(2, None, None).expect("read");
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].scope, "tray");
    }

    #[test]
    fn rotation_moves_full_log_aside() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = AppLog::new(dir.path());
        log.info("a", "first", None);

        rotate_at(dir.path(), 1).expect("rotate");
        assert!(!log_path(dir.path()).exists());
        assert!(rotated_path(dir.path(), 1).exists());

        log.info("a", "second", None);
        let records = log.read(10, None, None).expect("read");
        let messages: Vec<_> = records.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);

        log.clear().expect("clear");
        assert!(log.read(10, None, None).expect("read").is_empty());
    }
}
