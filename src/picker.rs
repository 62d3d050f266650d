use std::path::PathBuf;

/// Something that can ask the user for a directory.
///
/// The app uses the native dialog; tests hand in a canned answer.
pub trait DirectoryPicker {
    /// `None` when the user cancels.
    fn pick_directory(&self) -> Option<PathBuf>;
}

/// Native folder dialog (macOS, Windows, Linux).
#[derive(Debug, Default, Clone, Copy)]
pub struct NativePicker;

impl DirectoryPicker for NativePicker {
    fn pick_directory(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select Data Directory")
            .pick_folder()
    }
}
