pub mod app_log;
pub mod autostart;
pub mod display;
pub mod nudge;
pub mod placement;
pub mod settings_store;
pub mod sound_files;
pub mod widget_controller;
pub mod window_host;
