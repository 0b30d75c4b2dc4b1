use std::path::PathBuf;
use std::sync::mpsc::Receiver as StdReceiver;

use egui_toast::Toasts;

use crate::app_settings::AppSettings;
use crate::logger::LogEntry;
use crate::types::ConversionReport;
use crate::utils;

pub(super) const LOG_BUFFER_CAPACITY: usize = 200;

/// 界面上可以加载的两种输入文件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Ale,
    Edl,
}

impl InputKind {
    pub fn extension(&self) -> &'static str {
        match self {
            InputKind::Ale => "ale",
            InputKind::Edl => "edl",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InputKind::Ale => "ALE",
            InputKind::Edl => "EDL",
        }
    }

    /// 按扩展名（不区分大小写）判断文件类型。
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        [InputKind::Ale, InputKind::Edl]
            .into_iter()
            .find(|kind| ext.eq_ignore_ascii_case(kind.extension()))
    }
}

/// 已读入内存的输入文件，解码推迟到转换时进行。
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub path: Option<PathBuf>,
    pub display_name: String,
    pub bytes: Vec<u8>,
}

impl LoadedInput {
    pub fn from_path(path: PathBuf, bytes: Vec<u8>) -> Self {
        Self {
            display_name: utils::display_file_name(&path),
            path: Some(path),
            bytes,
        }
    }
}

pub(super) struct UiState {
    pub(super) show_bottom_log_panel: bool,
    pub(super) new_trigger_log_exists: bool,
    pub(super) show_settings_window: bool,
    pub(super) wrap_text: bool,
    pub(super) log_display_buffer: Vec<LogEntry>,
    pub(super) temp_edit_settings: AppSettings,
    pub(super) toasts: Toasts,
}

impl UiState {
    fn new(settings: &AppSettings) -> Self {
        let toasts = Toasts::new()
            .anchor(egui::Align2::LEFT_TOP, (10.0, 10.0))
            .direction(egui::Direction::TopDown);

        Self {
            toasts,
            temp_edit_settings: settings.clone(),
            show_bottom_log_panel: false,
            new_trigger_log_exists: false,
            show_settings_window: false,
            wrap_text: false,
            log_display_buffer: Vec::with_capacity(LOG_BUFFER_CAPACITY),
        }
    }
}

#[derive(Default)]
pub(super) struct ConversionState {
    pub(super) ale_input: Option<LoadedInput>,
    pub(super) edl_input: Option<LoadedInput>,
    pub(super) output_text: String,
    pub(super) last_report: Option<ConversionReport>,
    pub(super) last_error: Option<String>,
    pub(super) last_opened_file_path: Option<PathBuf>,
    pub(super) last_saved_file_path: Option<PathBuf>,
}

impl ConversionState {
    pub(super) fn input(&self, kind: InputKind) -> Option<&LoadedInput> {
        match kind {
            InputKind::Ale => self.ale_input.as_ref(),
            InputKind::Edl => self.edl_input.as_ref(),
        }
    }

    pub(super) fn input_slot(&mut self, kind: InputKind) -> &mut Option<LoadedInput> {
        match kind {
            InputKind::Ale => &mut self.ale_input,
            InputKind::Edl => &mut self.edl_input,
        }
    }

    pub(super) fn both_loaded(&self) -> bool {
        self.ale_input.is_some() && self.edl_input.is_some()
    }

    pub(super) fn clear_output(&mut self) {
        self.output_text.clear();
        self.last_report = None;
        self.last_error = None;
    }
}

pub struct EasySyncApp {
    pub(super) ui: UiState,
    pub(super) conversion: ConversionState,
    pub(super) app_settings: AppSettings,
    pub(super) ui_log_receiver: StdReceiver<LogEntry>,
}

impl EasySyncApp {
    pub(super) fn new(
        _cc: &eframe::CreationContext,
        settings: AppSettings,
        ui_log_receiver: StdReceiver<LogEntry>,
    ) -> Self {
        Self {
            ui: UiState::new(&settings),
            conversion: ConversionState::default(),
            app_settings: settings,
            ui_log_receiver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_input_kind_from_path() {
        assert_eq!(InputKind::from_path(Path::new("a/b.ale")), Some(InputKind::Ale));
        assert_eq!(InputKind::from_path(Path::new("REEL1.EDL")), Some(InputKind::Edl));
        assert_eq!(InputKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(InputKind::from_path(Path::new("edl")), None);
    }

    #[test]
    fn test_conversion_state_slots() {
        let mut state = ConversionState::default();
        assert!(!state.both_loaded());
        *state.input_slot(InputKind::Ale) =
            Some(LoadedInput::from_path(PathBuf::from("x/clips.ale"), b"Data".to_vec()));
        assert_eq!(state.input(InputKind::Ale).unwrap().display_name, "clips.ale");
        assert!(state.input(InputKind::Edl).is_none());
        *state.input_slot(InputKind::Edl) =
            Some(LoadedInput::from_path(PathBuf::from("seq.edl"), Vec::new()));
        assert!(state.both_loaded());
    }
}
