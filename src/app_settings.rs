use directories::ProjectDirs;
use ini::Ini;
use log::LevelFilter;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use crate::converter::ConversionOptions;
use crate::edl_generator::{DEFAULT_TAPE_WIDTH, EventLineLayout};
use crate::types::DuplicateTapePolicy;

const LOGGING_SECTION: &str = "Logging";
const CONVERSION_SECTION: &str = "Conversion";
const CONFIG_FILE_NAME: &str = "easy_sync_aaf.ini";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub enable_file_log: bool,
    pub file_log_level: LevelFilter,
    pub console_log_level: LevelFilter,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            enable_file_log: false,
            file_log_level: LevelFilter::Info,
            console_log_level: LevelFilter::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSettings {
    pub duplicate_tape_policy: DuplicateTapePolicy,
    pub tape_field_width: usize, // 输出事件行中磁带列的宽度
}

impl Default for ConversionSettings {
    fn default() -> Self {
        ConversionSettings {
            duplicate_tape_policy: DuplicateTapePolicy::default(),
            tape_field_width: DEFAULT_TAPE_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub log_settings: LogSettings,
    pub conversion_settings: ConversionSettings,
}

impl AppSettings {
    fn config_path() -> Option<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("com", "EasySyncAAF", "EasySyncAAF") {
            let config_dir = proj_dirs.data_local_dir();
            if !config_dir.exists()
                && let Err(e) = fs::create_dir_all(config_dir)
            {
                log::error!("Failed to create config directory {config_dir:?}: {e}");
                return None;
            }
            Some(config_dir.join(CONFIG_FILE_NAME))
        } else {
            log::error!("Could not determine the config directory.");
            None
        }
    }

    /// 从 INI 内容读取设置，缺失或无法解析的键使用默认值。
    pub fn from_ini(conf: &Ini) -> Self {
        let defaults = AppSettings::default();

        let log_section = conf.section(Some(LOGGING_SECTION));
        let log_settings = LogSettings {
            enable_file_log: log_section
                .and_then(|s| s.get("EnableFileLog"))
                .and_then(|s| s.parse::<bool>().ok())
                .unwrap_or(defaults.log_settings.enable_file_log),
            file_log_level: log_section
                .and_then(|s| s.get("FileLogLevel"))
                .and_then(|s| LevelFilter::from_str(s).ok())
                .unwrap_or(defaults.log_settings.file_log_level),
            console_log_level: log_section
                .and_then(|s| s.get("ConsoleLogLevel"))
                .and_then(|s| LevelFilter::from_str(s).ok())
                .unwrap_or(defaults.log_settings.console_log_level),
        };

        let conversion_section = conf.section(Some(CONVERSION_SECTION));
        let conversion_settings = ConversionSettings {
            duplicate_tape_policy: conversion_section
                .and_then(|s| s.get("DuplicateTapePolicy"))
                .and_then(|s| DuplicateTapePolicy::from_str(s).ok())
                .unwrap_or(defaults.conversion_settings.duplicate_tape_policy),
            tape_field_width: conversion_section
                .and_then(|s| s.get("TapeFieldWidth"))
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|width| *width > 0)
                .unwrap_or(defaults.conversion_settings.tape_field_width),
        };

        AppSettings {
            log_settings,
            conversion_settings,
        }
    }

    pub fn to_ini(&self) -> Ini {
        let mut conf = Ini::new();
        conf.with_section(Some(LOGGING_SECTION))
            .set(
                "EnableFileLog",
                self.log_settings.enable_file_log.to_string(),
            )
            .set("FileLogLevel", self.log_settings.file_log_level.to_string())
            .set(
                "ConsoleLogLevel",
                self.log_settings.console_log_level.to_string(),
            );
        conf.with_section(Some(CONVERSION_SECTION))
            .set(
                "DuplicateTapePolicy",
                self.conversion_settings.duplicate_tape_policy.to_string(),
            )
            .set(
                "TapeFieldWidth",
                self.conversion_settings.tape_field_width.to_string(),
            );
        conf
    }

    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match Ini::load_from_file(&path) {
                    Ok(conf) => {
                        log::info!("Loaded settings from {path:?}.");
                        return Self::from_ini(&conf);
                    }
                    Err(e) => {
                        log::error!("Failed to load settings from {path:?}: {e}. Using defaults.");
                    }
                }
            } else {
                log::info!("Settings file {path:?} not found, creating it with defaults.");
                let default_settings = AppSettings::default();
                if default_settings.save().is_err() {
                    log::error!("Failed to write the default settings to {path:?}.");
                }
                return default_settings;
            }
        }
        log::warn!("No settings path available, using runtime defaults.");
        AppSettings::default()
    }

    pub fn save(&self) -> Result<(), ini::Error> {
        if let Some(path) = Self::config_path() {
            match self.to_ini().write_to_file(&path) {
                Ok(_) => {
                    log::info!("Settings saved to {path:?}.");
                    Ok(())
                }
                Err(write_error) => {
                    log::error!("Failed to save settings to {path:?}: {write_error}");
                    Err(ini::Error::Io(write_error))
                }
            }
        } else {
            let err_msg = "Could not determine the settings path, nothing saved.".to_string();
            log::error!("{err_msg}");
            Err(ini::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                err_msg,
            )))
        }
    }

    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            duplicate_policy: self.conversion_settings.duplicate_tape_policy,
            layout: EventLineLayout::with_tape_width(self.conversion_settings.tape_field_width),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ini_gives_defaults() {
        assert_eq!(AppSettings::from_ini(&Ini::new()), AppSettings::default());
        assert_eq!(
            AppSettings::default().conversion_options(),
            ConversionOptions::default()
        );
    }

    #[test]
    fn test_reads_values() {
        let conf = Ini::load_from_str(
            "[Logging]\nEnableFileLog=true\nConsoleLogLevel=Debug\n\
[Conversion]\nDuplicateTapePolicy=FirstWins\nTapeFieldWidth=64\n",
        )
        .unwrap();
        let settings = AppSettings::from_ini(&conf);
        assert!(settings.log_settings.enable_file_log);
        assert_eq!(settings.log_settings.console_log_level, LevelFilter::Debug);
        assert_eq!(settings.log_settings.file_log_level, LevelFilter::Info);
        assert_eq!(
            settings.conversion_settings.duplicate_tape_policy,
            DuplicateTapePolicy::FirstWins
        );
        assert_eq!(settings.conversion_options().layout.tape_width, 64);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let conf = Ini::load_from_str(
            "[Conversion]\nDuplicateTapePolicy=Sometimes\nTapeFieldWidth=0\n",
        )
        .unwrap();
        let settings = AppSettings::from_ini(&conf);
        assert_eq!(settings.conversion_settings, ConversionSettings::default());
    }

    #[test]
    fn test_ini_roundtrip() {
        let settings = AppSettings {
            log_settings: LogSettings {
                enable_file_log: true,
                file_log_level: LevelFilter::Warn,
                console_log_level: LevelFilter::Debug,
            },
            conversion_settings: ConversionSettings {
                duplicate_tape_policy: DuplicateTapePolicy::Error,
                tape_field_width: 32,
            },
        };
        assert_eq!(AppSettings::from_ini(&settings.to_ini()), settings);
    }
}
