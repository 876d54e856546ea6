pub mod banner;
pub mod cli;
pub mod cli_ui;
pub mod config;
pub mod console_ui;
pub mod error;
pub mod file_ops;
pub mod installer;
pub mod logging;
pub mod manifest;
pub mod playback;
pub mod probe;
pub mod shell;
pub mod shutdown;
pub mod staging;
pub mod temp_dir;
pub mod ui;
pub mod uninstaller;
pub mod worker;
