use crate::core::app_log::{AppLog, AppLogRecord};
use serde_json::Value;
use tauri::State;

#[tauri::command]
pub async fn append_log(
    log: State<'_, AppLog>,
    level: String,
    scope: String,
    message: String,
    data: Option<Value>,
) -> Result<(), String> {
    log.append(AppLogRecord::now(&level, &scope, &message, data))
}

#[tauri::command]
pub async fn read_logs(
    log: State<'_, AppLog>,
    limit: Option<u32>,
    query: Option<String>,
    tail_bytes: Option<u64>,
) -> Result<Vec<AppLogRecord>, String> {
    let limit = limit.unwrap_or(500).clamp(1, 5000) as usize;
    log.read(limit, query, tail_bytes)
}

#[tauri::command]
pub async fn clear_logs(log: State<'_, AppLog>) -> Result<(), String> {
    log.clear()
}
