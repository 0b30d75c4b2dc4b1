use chrono::{DateTime, Local};
use directories::ProjectDirs;
use fern::Dispatch;
use log::LevelFilter;
use once_cell::sync::OnceCell;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{SendError, Sender};

use crate::app_settings::LogSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn color(&self) -> egui::Color32 {
        match self {
            LogLevel::Debug => egui::Color32::from_rgb(150, 150, 150),
            LogLevel::Info => egui::Color32::from_rgb(100, 180, 255),
            LogLevel::Warn => egui::Color32::from_rgb(255, 200, 0),
            LogLevel::Error => egui::Color32::from_rgb(255, 100, 100),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

static UI_LOG_SENDER: OnceCell<Sender<LogEntry>> = OnceCell::new();

/// 这些依赖库在 Info 级别也会输出大量日志
const NOISY_TARGETS: [&str; 5] = ["eframe", "egui_glow", "egui_winit", "winit", "arboard"];

fn get_log_file_path() -> Result<PathBuf, String> {
    if let Some(proj_dirs) = ProjectDirs::from("com", "EasySyncAAF", "EasySyncAAF") {
        let log_dir = proj_dirs.data_local_dir();
        if !log_dir.exists() {
            fs::create_dir_all(log_dir)
                .map_err(|e| format!("Could not create log directory {log_dir:?}: {e}"))?;
        }
        Ok(log_dir.join("easy_sync_aaf.log"))
    } else {
        let current_dir_log_path = PathBuf::from("easy_sync_aaf.log");
        eprintln!(
            "No project log directory available, logging to the working directory: {current_dir_log_path:?}"
        );
        Ok(current_dir_log_path)
    }
}

pub fn init_global_logger(ui_sender: Sender<LogEntry>, log_settings: &LogSettings) {
    if UI_LOG_SENDER.set(ui_sender).is_err() {
        eprintln!("UI log sender was already initialized.");
    }

    let console_level = log_settings.console_log_level;
    let file_level = if log_settings.enable_file_log {
        log_settings.file_log_level
    } else {
        LevelFilter::Off
    };

    let mut base_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
                record.level(),
                message
            ))
        })
        .level(console_level.max(file_level));
    for target in NOISY_TARGETS {
        base_dispatch = base_dispatch.level_for(target, LevelFilter::Warn);
    }

    let console_dispatch = Dispatch::new()
        .level(console_level)
        .chain(std::io::stdout());

    let ui_dispatch = Dispatch::new()
        .level(console_level)
        .chain(fern::Output::call(|record| {
            if let Some(sender) = UI_LOG_SENDER.get() {
                let entry = LogEntry {
                    level: LogLevel::from(record.level()),
                    message: format!("{}", record.args()),
                    timestamp: Local::now(),
                };
                if let Err(SendError(failed_entry)) = sender.send(entry) {
                    eprintln!("[{}] {}", failed_entry.level.as_str(), failed_entry.message);
                }
            }
        }))
        .into_shared();

    let mut final_dispatch = base_dispatch.chain(console_dispatch).chain(ui_dispatch);

    let mut log_file_path = None;
    if log_settings.enable_file_log {
        match get_log_file_path().and_then(|path| {
            fern::log_file(&path)
                .map(|file| (path.clone(), file))
                .map_err(|e| format!("Could not open log file {path:?}: {e}"))
        }) {
            Ok((path, log_file)) => {
                final_dispatch =
                    final_dispatch.chain(Dispatch::new().level(file_level).chain(log_file));
                log_file_path = Some(path);
            }
            Err(e) => {
                eprintln!("{e}. File logging is disabled.");
            }
        }
    }

    if let Err(e) = final_dispatch.apply() {
        eprintln!("Failed to install the logger: {e}");
    } else if let Some(path) = log_file_path {
        log::info!("Logger initialized, writing to {path:?}.");
    } else {
        log::info!("Logger initialized, file logging disabled.");
    }
}
