pub mod autostart;
pub mod logs;
pub mod sounds;
pub mod window;
