use crate::app_definition::{EasySyncApp, InputKind, LoadedInput};
use crate::app_update;
use crate::converter;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions};
use log::{error, info};
use std::time::Duration;

impl EasySyncApp {
    /// 两个输入都已加载时执行转换，结果或错误写回界面状态。
    pub fn handle_convert(&mut self) {
        let (Some(ale), Some(edl)) = (&self.conversion.ale_input, &self.conversion.edl_input)
        else {
            return;
        };

        let options = self.app_settings.conversion_options();
        match converter::convert(&ale.bytes, &edl.bytes, &options) {
            Ok(output) => {
                let report = output.report;
                let message = format!(
                    "Converted: {} events from {} of {} blocks.",
                    report.events_emitted,
                    report.blocks_expanded,
                    report.blocks_total()
                );
                info!("[Convert] {message}");
                self.conversion.output_text = output.edl_text;
                self.conversion.last_report = Some(report);
                self.conversion.last_error = None;
                self.add_toast(ToastKind::Success, message);
            }
            Err(e) => {
                let message =
                    format!("{e}. Please make sure the ALE and EDL files are in the correct format.");
                error!("[Convert] {message}");
                self.conversion.output_text.clear();
                self.conversion.last_report = None;
                self.conversion.last_error = Some(message);
            }
        }
    }

    /// 替换一个输入，之前的输出随之失效。
    pub fn set_input(&mut self, kind: InputKind, input: LoadedInput) {
        info!(
            "[Convert] Loaded {} file '{}' ({} bytes).",
            kind.label(),
            input.display_name,
            input.bytes.len()
        );
        if input.path.is_some() {
            self.conversion.last_opened_file_path = input.path.clone();
        }
        *self.conversion.input_slot(kind) = Some(input);
        self.conversion.clear_output();

        if self.conversion.both_loaded() {
            self.handle_convert();
        }
    }

    pub fn clear_all_data(&mut self) {
        self.conversion.ale_input = None;
        self.conversion.edl_input = None;
        self.conversion.clear_output();
    }

    pub fn copy_output_to_clipboard(&mut self) {
        if self.conversion.output_text.is_empty() {
            return;
        }
        match arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(self.conversion.output_text.clone()))
        {
            Ok(()) => self.add_toast(ToastKind::Success, "Output copied to clipboard."),
            Err(e) => error!("Could not access the clipboard: {e}"),
        }
    }

    pub(super) fn add_toast(&mut self, kind: ToastKind, text: impl Into<String>) {
        let text: String = text.into();
        self.ui.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default()
                .duration_in_seconds(3.0)
                .show_progress(true)
                .show_icon(true),
            style: Default::default(),
        });
    }
}

impl eframe::App for EasySyncApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        app_update::process_log_messages(self);

        ctx.request_repaint_after(Duration::from_millis(500));

        app_update::draw_ui_elements(self, ctx);
        app_update::handle_file_drops(self, ctx);

        self.ui.toasts.show(ctx);
    }
}
