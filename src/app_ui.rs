use crate::app_definition::{EasySyncApp, InputKind};
use crate::types::DuplicateTapePolicy;

use eframe::egui::{self, Button, Color32, ComboBox, ScrollArea};
use log::LevelFilter;

const TITLE_ALIGNMENT_OFFSET: f32 = 6.0;
const BUTTON_STRIP_SPACING: f32 = 4.0;
const LEVEL_FILTERS: [LevelFilter; 6] = [
    LevelFilter::Off,
    LevelFilter::Error,
    LevelFilter::Warn,
    LevelFilter::Info,
    LevelFilter::Debug,
    LevelFilter::Trace,
];

fn level_filter_combo(ui: &mut egui::Ui, id: &str, value: &mut LevelFilter) {
    ComboBox::from_id_salt(id)
        .selected_text(format!("{value:?}"))
        .show_ui(ui, |ui_combo| {
            for level in LEVEL_FILTERS {
                ui_combo.selectable_value(value, level, format!("{level:?}"));
            }
        });
}

impl EasySyncApp {
    /// 顶部工具栏：打开两种输入、转换、保存与复制输出。
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        egui::menu::bar(ui, |ui_bar| {
            ui_bar.menu_button("File", |file_menu| {
                if file_menu.button("Open ALE...").clicked() {
                    file_menu.close_menu();
                    crate::io::handle_open_file(self, InputKind::Ale);
                }
                if file_menu.button("Open EDL...").clicked() {
                    file_menu.close_menu();
                    crate::io::handle_open_file(self, InputKind::Edl);
                }
                file_menu.separator();
                if file_menu
                    .add_enabled(
                        !self.conversion.output_text.is_empty(),
                        Button::new("Save EDL..."),
                    )
                    .clicked()
                {
                    file_menu.close_menu();
                    crate::io::handle_save_file(self);
                }
                file_menu.separator();
                if file_menu.button("Clear").clicked() {
                    file_menu.close_menu();
                    self.clear_all_data();
                }
            });

            if ui_bar.button("Settings").clicked() {
                self.ui.temp_edit_settings = self.app_settings.clone();
                self.ui.show_settings_window = true;
            }

            ui_bar.separator();

            if ui_bar.button("Open ALE...").clicked() {
                crate::io::handle_open_file(self, InputKind::Ale);
            }
            if ui_bar.button("Open EDL...").clicked() {
                crate::io::handle_open_file(self, InputKind::Edl);
            }
            if ui_bar
                .add_enabled(self.conversion.both_loaded(), Button::new("Convert"))
                .on_disabled_hover_text("Load an ALE file and an EDL file first")
                .clicked()
            {
                self.handle_convert();
            }
            let has_output = !self.conversion.output_text.is_empty();
            if ui_bar
                .add_enabled(has_output, Button::new("Save EDL..."))
                .clicked()
            {
                crate::io::handle_save_file(self);
            }
            if ui_bar
                .add_enabled(has_output, Button::new("Copy output"))
                .clicked()
            {
                self.copy_output_to_clipboard();
            }

            ui_bar.with_layout(egui::Layout::right_to_left(egui::Align::Center), |btn_ui| {
                let log_button_text = if self.ui.new_trigger_log_exists {
                    egui::RichText::new("Log •").color(Color32::from_rgb(255, 200, 0))
                } else {
                    egui::RichText::new("Log")
                };
                if btn_ui
                    .selectable_label(self.ui.show_bottom_log_panel, log_button_text)
                    .clicked()
                {
                    self.ui.show_bottom_log_panel = !self.ui.show_bottom_log_panel;
                    if self.ui.show_bottom_log_panel {
                        self.ui.new_trigger_log_exists = false;
                    }
                }
                btn_ui.add_space(BUTTON_STRIP_SPACING);
                btn_ui.checkbox(&mut self.ui.wrap_text, "Wrap");
            });
        });
    }

    pub fn draw_settings_window(&mut self, ctx: &egui::Context) {
        let mut is_settings_window_open = self.ui.show_settings_window;

        egui::Window::new("Settings")
            .open(&mut is_settings_window_open)
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                let temp = &mut self.ui.temp_edit_settings;
                egui::Grid::new("log_settings_grid")
                    .num_columns(2)
                    .spacing([40.0, 4.0])
                    .striped(true)
                    .show(ui, |grid_ui| {
                        grid_ui.heading("Logging");
                        grid_ui.end_row();

                        grid_ui.label("Enable file log:");
                        grid_ui.checkbox(&mut temp.log_settings.enable_file_log, "");
                        grid_ui.end_row();

                        grid_ui.label("File log level:");
                        level_filter_combo(
                            grid_ui,
                            "file_log_level_combo_settings",
                            &mut temp.log_settings.file_log_level,
                        );
                        grid_ui.end_row();

                        grid_ui.label("Console log level:");
                        level_filter_combo(
                            grid_ui,
                            "console_log_level_combo_settings",
                            &mut temp.log_settings.console_log_level,
                        );
                        grid_ui.end_row();
                    });
                ui.add_space(10.0);

                egui::Grid::new("conversion_settings_grid")
                    .num_columns(2)
                    .spacing([40.0, 4.0])
                    .striped(true)
                    .show(ui, |grid_ui| {
                        grid_ui.heading("Conversion");
                        grid_ui.end_row();

                        grid_ui.label("Duplicate tapes in ALE:");
                        let policy = &mut temp.conversion_settings.duplicate_tape_policy;
                        ComboBox::from_id_salt("duplicate_policy_combo_settings")
                            .selected_text(policy.as_str())
                            .show_ui(grid_ui, |ui_combo| {
                                for option in DuplicateTapePolicy::ALL {
                                    ui_combo
                                        .selectable_value(policy, option, option.as_str())
                                        .on_hover_text(option.description());
                                }
                            });
                        grid_ui.end_row();

                        grid_ui.label("Tape column width:");
                        grid_ui.add(
                            egui::DragValue::new(&mut temp.conversion_settings.tape_field_width)
                                .range(1..=512),
                        );
                        grid_ui.end_row();
                    });

                ui.separator();
                ui.add_space(10.0);

                ui.horizontal(|bottom_buttons_ui| {
                    if bottom_buttons_ui
                        .button("Save and apply")
                        .on_hover_text("Log settings take effect on the next start")
                        .clicked()
                    {
                        if self.ui.temp_edit_settings.save().is_ok() {
                            let conversion_changed = self.app_settings.conversion_settings
                                != self.ui.temp_edit_settings.conversion_settings;
                            self.app_settings = self.ui.temp_edit_settings.clone();
                            if conversion_changed && self.conversion.both_loaded() {
                                self.handle_convert();
                            }
                        } else {
                            log::error!("Failed to save settings.");
                        }
                        self.ui.show_settings_window = false;
                    }
                    if bottom_buttons_ui.button("Cancel").clicked() {
                        self.ui.show_settings_window = false;
                    }
                });
            });

        if !is_settings_window_open {
            self.ui.show_settings_window = false;
        }
    }

    pub fn draw_log_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("log_panel_id")
            .resizable(true)
            .default_height(150.0)
            .min_height(60.0)
            .max_height(ctx.available_rect().height() * 0.7)
            .show_animated(ctx, self.ui.show_bottom_log_panel, |ui| {
                ui.vertical_centered_justified(|ui_header| {
                    ui_header.horizontal(|h_ui| {
                        h_ui.label(egui::RichText::new("Log").strong());
                        h_ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |btn_ui| {
                                if btn_ui.button("Close").clicked() {
                                    self.ui.show_bottom_log_panel = false;
                                    self.ui.new_trigger_log_exists = false;
                                }
                                if btn_ui.button("Clear").clicked() {
                                    self.ui.log_display_buffer.clear();
                                }
                            },
                        );
                    });
                });
                ui.separator();

                ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |scroll_ui| {
                        if self.ui.log_display_buffer.is_empty() {
                            scroll_ui.add_space(5.0);
                            scroll_ui.label(egui::RichText::new("No log entries.").weak().italics());
                            scroll_ui.add_space(5.0);
                        } else {
                            for entry in &self.ui.log_display_buffer {
                                scroll_ui.horizontal_wrapped(|line_ui| {
                                    line_ui.label(
                                        egui::RichText::new(
                                            entry.timestamp.format("[%H:%M:%S.%3f]").to_string(),
                                        )
                                        .monospace()
                                        .color(Color32::DARK_GRAY),
                                    );
                                    line_ui.add_space(4.0);
                                    line_ui.label(
                                        egui::RichText::new(format!("[{}]", entry.level.as_str()))
                                            .monospace()
                                            .color(entry.level.color())
                                            .strong(),
                                    );
                                    line_ui.add_space(4.0);
                                    line_ui.label(
                                        egui::RichText::new(&entry.message).monospace().weak(),
                                    );
                                });
                            }
                        }
                        scroll_ui.allocate_space(scroll_ui.available_size_before_wrap());
                    });
            });
    }

    /// 左侧摘要：已加载的文件、ALE 头部信息和上次转换的统计。
    pub fn draw_summary_panel_contents(&mut self, ui: &mut egui::Ui) {
        ui.add_space(TITLE_ALIGNMENT_OFFSET);
        ui.heading("Inputs");
        ui.separator();

        for kind in [InputKind::Ale, InputKind::Edl] {
            ui.horizontal(|row_ui| {
                row_ui.strong(format!("{}:", kind.label()));
                match self.conversion.input(kind) {
                    Some(input) => {
                        row_ui
                            .label(&input.display_name)
                            .on_hover_text(format!("{} bytes", input.bytes.len()));
                    }
                    None => {
                        row_ui.label(egui::RichText::new("not loaded").weak().italics());
                    }
                }
            });
        }

        ui.add_space(8.0);
        ScrollArea::vertical()
            .id_salt("summary_scroll")
            .auto_shrink([false, false])
            .show(ui, |s_ui| {
                if let Some(error) = &self.conversion.last_error {
                    s_ui.label(egui::RichText::new(error).color(Color32::from_rgb(255, 100, 100)));
                    return;
                }

                let Some(report) = &self.conversion.last_report else {
                    s_ui.label(
                        egui::RichText::new("Load an ALE file and an EDL file to convert.")
                            .weak(),
                    );
                    return;
                };

                s_ui.heading("Result");
                egui::Grid::new("report_grid")
                    .num_columns(2)
                    .spacing([20.0, 2.0])
                    .show(s_ui, |grid_ui| {
                        let rows = [
                            ("Tapes mapped", report.tapes_mapped),
                            ("ALE rows used", report.rows_kept),
                            ("ALE rows skipped", report.rows_skipped),
                            ("EDL events", report.blocks_total()),
                            ("Events expanded", report.blocks_expanded),
                            ("Events skipped", report.skipped_blocks.len()),
                            ("Events written", report.events_emitted),
                        ];
                        for (label, value) in rows {
                            grid_ui.label(label);
                            grid_ui.monospace(value.to_string());
                            grid_ui.end_row();
                        }
                    });

                if !report.skipped_blocks.is_empty() {
                    s_ui.add_space(6.0);
                    s_ui.collapsing("Skipped events", |c_ui| {
                        for (line_num, reason) in &report.skipped_blocks {
                            c_ui.label(format!("line {line_num}: {reason}"));
                        }
                    });
                }

                if !report.heading.is_empty() {
                    s_ui.add_space(6.0);
                    egui::CollapsingHeader::new("ALE heading")
                        .default_open(true)
                        .show(s_ui, |c_ui| {
                            egui::Grid::new("ale_heading_grid")
                                .num_columns(2)
                                .striped(true)
                                .show(c_ui, |grid_ui| {
                                    for entry in &report.heading {
                                        grid_ui.label(&entry.key);
                                        grid_ui.monospace(&entry.value);
                                        grid_ui.end_row();
                                    }
                                });
                        });
                }
            });
    }

    pub fn draw_output_panel_contents(&mut self, ui: &mut egui::Ui) {
        ui.add_space(TITLE_ALIGNMENT_OFFSET);
        ui.horizontal(|title_ui| {
            title_ui.heading("Output EDL");
            title_ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |btn_ui| {
                let has_output = !self.conversion.output_text.is_empty();
                if btn_ui
                    .add_enabled(has_output, Button::new("Save EDL..."))
                    .clicked()
                {
                    crate::io::handle_save_file(self);
                }
                btn_ui.add_space(BUTTON_STRIP_SPACING);
                if btn_ui
                    .add_enabled(has_output, Button::new("Copy output"))
                    .clicked()
                {
                    self.copy_output_to_clipboard();
                }
            });
        });
        ui.separator();

        let scroll_area = if self.ui.wrap_text {
            ScrollArea::vertical().id_salt("output_scroll_vertical_label")
        } else {
            ScrollArea::both().id_salt("output_scroll_both_label")
        };

        scroll_area.auto_shrink([false, false]).show(ui, |s_ui| {
            let mut label_widget = egui::Label::new(
                egui::RichText::new(&self.conversion.output_text)
                    .monospace()
                    .size(13.0),
            )
            .selectable(true);

            if self.ui.wrap_text {
                label_widget = label_widget.wrap();
            } else {
                label_widget = label_widget.extend();
            }
            s_ui.add(label_widget);
        });
    }
}
