#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod types;
mod utils;
mod ale_parser;
mod app;
mod app_definition;
mod app_settings;
mod app_ui;
mod app_update;
mod converter;
mod edl_generator;
mod edl_parser;
mod io;
mod logger;
mod track_expander;

use app_settings::AppSettings;
use std::sync::mpsc;

fn main() {
    let app_settings = AppSettings::load();

    // 日志条目通过通道送到 UI 线程显示
    let (ui_log_sender, ui_log_receiver): (
        mpsc::Sender<logger::LogEntry>,
        mpsc::Receiver<logger::LogEntry>,
    ) = mpsc::channel();

    logger::init_global_logger(ui_log_sender, &app_settings.log_settings);

    log::info!(target: "easy_sync_aaf_main", "Application started.");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([800.0, 500.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "Easy Sync AAF",
        native_options,
        Box::new(move |cc| {
            let app_instance =
                crate::app_definition::EasySyncApp::new(cc, app_settings, ui_log_receiver);
            Ok(Box::new(app_instance))
        }),
    ) {
        log::error!(target: "easy_sync_aaf_main", "eframe error: {e}");
    }
}
