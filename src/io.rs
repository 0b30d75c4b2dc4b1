use crate::app_definition::{EasySyncApp, InputKind, LoadedInput};
use crate::converter::{self, OUTPUT_EXTENSION};
use std::path::{Path, PathBuf};

pub fn load_input_from_path(app: &mut EasySyncApp, kind: InputKind, path: PathBuf) {
    match std::fs::read(&path) {
        Ok(bytes) => app.set_input(kind, LoadedInput::from_path(path, bytes)),
        Err(e) => {
            log::error!(
                "Failed to read {} file '{}': {}",
                kind.label(),
                path.display(),
                e
            );
        }
    }
}

pub fn handle_open_file(app: &mut EasySyncApp, kind: InputKind) {
    let dialog = rfd::FileDialog::new()
        .add_filter(
            format!("{} files (*.{})", kind.label(), kind.extension()).as_str(),
            &[kind.extension()],
        )
        .add_filter("All files", &["*"])
        .set_title(format!("Open {} file...", kind.label()));

    let initial_dir = app
        .conversion
        .last_opened_file_path
        .as_ref()
        .and_then(|p| p.parent())
        .unwrap_or_else(|| Path::new("."));

    if let Some(path) = dialog.set_directory(initial_dir).pick_file() {
        load_input_from_path(app, kind, path);
    }
}

pub fn handle_save_file(app: &mut EasySyncApp) {
    if app.conversion.output_text.is_empty() {
        log::error!("There is no output to save.");
        return;
    }

    let edl_path = app
        .conversion
        .edl_input
        .as_ref()
        .and_then(|input| input.path.as_deref());
    let default_filename = converter::suggest_output_file_name(edl_path);

    let dialog = rfd::FileDialog::new()
        .add_filter("EDL files (*.edl)", &[OUTPUT_EXTENSION])
        .set_file_name(&default_filename)
        .set_title("Save EDL as...");

    let initial_dir = app
        .conversion
        .last_saved_file_path
        .as_ref()
        .and_then(|p| p.parent())
        .or_else(|| edl_path.and_then(|p| p.parent()))
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();

    if let Some(path) = dialog.set_directory(initial_dir).save_file() {
        let final_path = if path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION))
        {
            path
        } else {
            path.with_extension(OUTPUT_EXTENSION)
        };

        app.conversion.last_saved_file_path = Some(final_path.clone());

        if let Err(e) = std::fs::write(&final_path, &app.conversion.output_text) {
            log::error!("Failed to write '{}': {}", final_path.display(), e);
        } else {
            log::info!("Saved output to {}", final_path.display());
        }
    }
}
