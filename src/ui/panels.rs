use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::DateRange;
use crate::picker::DirectoryPicker;
use crate::state::{AppState, Selection};

const WARNING: Color32 = Color32::from_rgb(230, 160, 40);

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
///
/// Widgets only propose a new [`Selection`]; it is applied once, after the
/// panel is drawn.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, picker: &dyn DirectoryPicker) {
    ui.heading("Data Directory");
    ui.separator();

    if ui.button("Browse for Folder…").clicked() {
        state.browse(picker);
    }
    ui.label("Or enter path manually");
    if ui.text_edit_singleline(&mut state.path_input).changed() {
        state.commit_path_input();
    }
    ui.add_space(6.0);

    if !state.view.directory_valid {
        ui.label(RichText::new("Please select a valid data directory.").color(WARNING));
        return;
    }
    if let Some(err) = &state.view.error {
        ui.label(RichText::new(err).color(Color32::RED));
        return;
    }

    let mut next: Option<Selection> = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            transformer_select(ui, state, &mut next);
            category_select(ui, state, &mut next);
            customer_select(ui, state, &mut next);
            range_select(ui, state, &mut next);
        });

    if let Some(selection) = next {
        state.apply(selection);
    }
}

fn transformer_select(ui: &mut Ui, state: &AppState, next: &mut Option<Selection>) {
    ui.strong("Select Transformer");
    if state.view.transformers.is_empty() {
        ui.label("No transformer directories found.");
        return;
    }

    let current = state.selection.transformer.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("transformer")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for name in &state.view.transformers {
                if ui.selectable_label(current == *name, name).clicked() && current != *name {
                    *next = Some(state.selection.with_transformer(Some(name.clone())));
                }
            }
        });
    ui.separator();
}

fn category_select(ui: &mut Ui, state: &AppState, next: &mut Option<Selection>) {
    let Some(catalog) = &state.view.catalog else {
        return;
    };

    ui.strong("Select Categories");
    if catalog.is_empty() {
        ui.label("No customer files found.");
    }
    for category in &catalog.categories {
        let mut checked = state.selection.categories.contains(category);
        if ui.checkbox(&mut checked, category).changed() {
            *next = Some(state.selection.toggle_category(category));
        }
    }

    if !catalog.malformed.is_empty() {
        let header = format!("Skipped {} file(s)", catalog.malformed.len());
        egui::CollapsingHeader::new(RichText::new(header).color(WARNING))
            .id_salt("malformed")
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                ui.label("Names must look like <customer>_<category>.csv");
                for name in &catalog.malformed {
                    ui.monospace(name);
                }
            });
    }
    ui.separator();
}

fn customer_select(ui: &mut Ui, state: &AppState, next: &mut Option<Selection>) {
    if state.selection.categories.is_empty() {
        return;
    }

    let eligible = &state.view.eligible;
    let header = format!(
        "Select Customers  ({}/{})",
        state.selection.customers.len(),
        eligible.len()
    );
    ui.strong(header);
    if eligible.is_empty() {
        ui.label("No customer has every selected category.");
        ui.separator();
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            let all: BTreeSet<_> = eligible.iter().cloned().collect();
            *next = Some(state.selection.with_customers(all));
        }
        if ui.small_button("None").clicked() {
            *next = Some(state.selection.with_customers(BTreeSet::new()));
        }
    });

    for customer in eligible {
        let mut checked = state.selection.customers.contains(customer);
        if ui.checkbox(&mut checked, customer.as_str()).changed() {
            *next = Some(state.selection.toggle_customer(customer));
        }
    }
    ui.separator();
}

fn range_select(ui: &mut Ui, state: &AppState, next: &mut Option<Selection>) {
    let (Some(bounds), Some(range)) = (state.view.bounds, state.view.range) else {
        return;
    };
    let full = DateRange::covering(bounds);

    ui.strong("Select Date Range");
    let mut start = range.start;
    let mut end = range.end;
    egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("From");
        ui.add(DatePickerButton::new(&mut start).id_salt("range_start"));
        ui.end_row();
        ui.label("To");
        ui.add(DatePickerButton::new(&mut end).id_salt("range_end"));
        ui.end_row();
    });

    if start != range.start || end != range.end {
        let picked = DateRange::new(
            start.clamp(full.start, full.end),
            end.clamp(full.start, full.end),
        );
        *next = Some(state.selection.with_range(Some(picked)));
    }
    if ui
        .add_enabled(range != full, egui::Button::new("Full range"))
        .clicked()
    {
        *next = Some(state.selection.with_range(None));
    }
    ui.label(format!(
        "Data spans {} – {}",
        bounds.0.format("%Y-%m-%d %H:%M"),
        bounds.1.format("%Y-%m-%d %H:%M")
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, picker: &dyn DirectoryPicker) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open Folder…").clicked() {
                state.browse(picker);
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let Some(catalog) = &state.view.catalog {
            ui.label(format!(
                "{} customers, {} categories, {} series plotted",
                catalog.customer_count(),
                catalog.categories.len(),
                state.view.chart.len()
            ));
        }

        if !state.view.failures.is_empty() {
            ui.separator();
            ui.label(
                RichText::new(format!("{} file(s) failed to load", state.view.failures.len()))
                    .color(Color32::RED),
            );
        }
    });
}
