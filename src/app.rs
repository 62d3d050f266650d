use eframe::egui;

use crate::config::ViewerConfig;
use crate::picker::{DirectoryPicker, NativePicker};
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PhaseVizApp {
    pub state: AppState,
    picker: Box<dyn DirectoryPicker>,
}

impl PhaseVizApp {
    pub fn new(config: &ViewerConfig) -> Self {
        Self::with_picker(config, Box::new(NativePicker))
    }

    pub fn with_picker(config: &ViewerConfig, picker: Box<dyn DirectoryPicker>) -> Self {
        Self {
            state: AppState::new(config.data_dir.clone(), config.line_width),
            picker,
        }
    }
}

impl eframe::App for PhaseVizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, self.picker.as_ref());
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, self.picker.as_ref());
            });

        // ---- Central panel: chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::time_series_plot(ui, &self.state);
        });
    }
}
