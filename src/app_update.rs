use eframe::egui;
use log::warn;

use crate::app_definition::{EasySyncApp, InputKind, LOG_BUFFER_CAPACITY, LoadedInput};
use crate::logger::LogLevel;
use egui_toast::{Toast, ToastKind, ToastOptions};

/// Handles processing of log messages received by the UI.
pub(crate) fn process_log_messages(app: &mut EasySyncApp) {
    let mut has_warn_or_higher_this_frame = false;
    let mut first_warn_or_higher_message: Option<String> = None;
    let mut highest_level = LogLevel::Warn;

    while let Ok(log_entry) = app.ui_log_receiver.try_recv() {
        if app.ui.log_display_buffer.len() >= LOG_BUFFER_CAPACITY {
            app.ui.log_display_buffer.remove(0);
        }
        if log_entry.level >= LogLevel::Warn {
            if !has_warn_or_higher_this_frame {
                first_warn_or_higher_message = Some(log_entry.message.clone());
            }
            has_warn_or_higher_this_frame = true;
            highest_level = highest_level.max(log_entry.level);
        }
        app.ui.log_display_buffer.push(log_entry);
    }

    if has_warn_or_higher_this_frame {
        let toast_message = first_warn_or_higher_message
            .unwrap_or_else(|| "New warnings or errors were logged.".to_string());
        app.ui.toasts.add(Toast {
            text: toast_message.into(),
            kind: if highest_level == LogLevel::Error {
                ToastKind::Error
            } else {
                ToastKind::Warning
            },
            options: ToastOptions::default()
                .duration_in_seconds(5.0)
                .show_progress(true)
                .show_icon(true),
            style: Default::default(),
        });
        if !app.ui.show_bottom_log_panel {
            app.ui.new_trigger_log_exists = true;
        }
    }
}

pub(crate) fn draw_ui_elements(app: &mut EasySyncApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
        app.draw_toolbar(ui);
    });
    app.draw_log_panel(ctx);

    let available_width = ctx.screen_rect().width();
    let summary_panel_width = (available_width * 0.28).clamp(240.0, 420.0);

    egui::SidePanel::left("summary_panel")
        .default_width(summary_panel_width)
        .show(ctx, |ui| {
            app.draw_summary_panel_contents(ui);
        });

    egui::CentralPanel::default().show(ctx, |ui| {
        app.draw_output_panel_contents(ui);
    });

    if app.ui.show_settings_window {
        app.draw_settings_window(ctx);
    }
}

/// 拖放的文件按扩展名分到 ALE 或 EDL 输入。
pub(crate) fn handle_file_drops(app: &mut EasySyncApp, ctx: &egui::Context) {
    if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
        let files = ctx.input(|i| i.raw.dropped_files.clone());
        for file in files {
            let path = file.path.clone();
            let name_hint = path
                .clone()
                .unwrap_or_else(|| std::path::PathBuf::from(&file.name));

            let Some(kind) = InputKind::from_path(&name_hint) else {
                warn!(
                    "Ignored dropped file '{}': expected a .ale or .edl file.",
                    name_hint.display()
                );
                continue;
            };

            if let Some(path) = path {
                crate::io::load_input_from_path(app, kind, path);
            } else if let Some(bytes) = &file.bytes {
                let input = LoadedInput {
                    path: None,
                    display_name: file.name.clone(),
                    bytes: bytes.to_vec(),
                };
                app.set_input(kind, input);
            }
        }
    } else if !ctx.input(|i| i.raw.hovered_files.is_empty()) {
        egui::Area::new("drag_drop_overlay_area".into())
            .fixed_pos(egui::Pos2::ZERO)
            .order(egui::Order::Foreground)
            .show(ctx, |ui_overlay| {
                let screen_rect = ui_overlay.ctx().screen_rect();
                ui_overlay.painter().rect_filled(
                    screen_rect,
                    0.0,
                    egui::Color32::from_rgba_unmultiplied(20, 20, 20, 190),
                );
                ui_overlay.painter().text(
                    screen_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Drop .ale / .edl files here",
                    egui::FontId::proportional(40.0),
                    egui::Color32::WHITE,
                );
            });
    }
}
