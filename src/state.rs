use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::color::ColorMap;
use crate::data::catalog::{list_transformers, load_catalog};
use crate::data::filter::{eligible_customers, filter_by_range, overall_date_bounds, DateRange};
use crate::data::loader::load_series;
use crate::data::model::{Catalog, CustomerId, Reading, SeriesRecord};
use crate::picker::DirectoryPicker;

// ---------------------------------------------------------------------------
// Selection – what the user has asked for
// ---------------------------------------------------------------------------

/// The user's choices. Never edited in place: every change builds a new
/// value, and a change upstream clears what depends on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub data_dir: Option<PathBuf>,
    pub transformer: Option<String>,
    pub categories: BTreeSet<String>,
    pub customers: BTreeSet<CustomerId>,
    /// `None` means the full span of the loaded data.
    pub range: Option<DateRange>,
}

impl Selection {
    pub fn with_data_dir(&self, data_dir: Option<PathBuf>) -> Self {
        Self {
            data_dir,
            ..Self::default()
        }
    }

    pub fn with_transformer(&self, transformer: Option<String>) -> Self {
        Self {
            data_dir: self.data_dir.clone(),
            transformer,
            ..Self::default()
        }
    }

    /// Customers and range are kept; reconciliation drops what no longer fits.
    pub fn with_categories(&self, categories: BTreeSet<String>) -> Self {
        Self {
            categories,
            ..self.clone()
        }
    }

    pub fn with_customers(&self, customers: BTreeSet<CustomerId>) -> Self {
        Self {
            customers,
            ..self.clone()
        }
    }

    pub fn with_range(&self, range: Option<DateRange>) -> Self {
        Self {
            range,
            ..self.clone()
        }
    }

    pub fn toggle_category(&self, category: &str) -> Self {
        let mut categories = self.categories.clone();
        if !categories.remove(category) {
            categories.insert(category.to_string());
        }
        self.with_categories(categories)
    }

    pub fn toggle_customer(&self, customer: &CustomerId) -> Self {
        let mut customers = self.customers.clone();
        if !customers.remove(customer) {
            customers.insert(customer.clone());
        }
        self.with_customers(customers)
    }
}

// ---------------------------------------------------------------------------
// View – everything derived from a Selection
// ---------------------------------------------------------------------------

/// How far the user has got through the selection steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    DirectorySelected,
    TransformerSelected,
    CategoriesSelected,
    CustomersSelected,
    RangeSelected,
}

/// A series that could not be read.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub customer: CustomerId,
    pub category: String,
    pub message: String,
}

/// One line of the chart, already cut to the date range.
#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub label: String,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Clone, Default)]
pub struct View {
    pub directory_valid: bool,
    pub transformers: Vec<String>,
    pub catalog: Option<Catalog>,
    pub eligible: Vec<CustomerId>,
    pub series: Vec<SeriesRecord>,
    pub failures: Vec<LoadFailure>,
    pub bounds: Option<(NaiveDateTime, NaiveDateTime)>,
    /// The range actually applied: the user's, or the full span.
    pub range: Option<DateRange>,
    pub chart: Vec<ChartSeries>,
    pub color_map: ColorMap,
    /// Directory listing problem, shown instead of the controls.
    pub error: Option<String>,
}

/// Recompute everything downstream of `sel`, reading from disk.
///
/// Returns the reconciled selection: defaulted transformer, customers that
/// are still eligible, and a range clamped to the new bounds.
pub fn derive(mut sel: Selection) -> (Selection, View) {
    let mut view = View::default();

    let Some(root) = sel.data_dir.clone().filter(|d| d.is_dir()) else {
        return (sel, view);
    };
    view.directory_valid = true;

    view.transformers = match list_transformers(&root) {
        Ok(t) => t,
        Err(e) => {
            view.error = Some(e.to_string());
            return (sel, view);
        }
    };

    // A select box always shows something: fall back to the first entry.
    let known = sel
        .transformer
        .as_ref()
        .is_some_and(|t| view.transformers.contains(t));
    if !known {
        sel = sel.with_transformer(view.transformers.first().cloned());
    }
    let Some(transformer) = sel.transformer.clone() else {
        return (sel, view);
    };

    let catalog = match load_catalog(&root, &transformer) {
        Ok(c) => c,
        Err(e) => {
            view.error = Some(e.to_string());
            return (sel, view);
        }
    };

    sel.categories.retain(|c| catalog.categories.contains(c));
    view.eligible = eligible_customers(&catalog, &sel.categories);
    sel.customers.retain(|c| view.eligible.contains(c));
    let nothing_to_load = sel.categories.is_empty() || sel.customers.is_empty();
    view.catalog = Some(catalog);
    if nothing_to_load {
        sel.range = None;
        return (sel, view);
    }

    let (series, failures) = load_selected(&root, &transformer, &sel, view.catalog.as_ref());
    view.series = series;
    view.failures = failures;

    view.bounds = overall_date_bounds(&view.series);
    let Some(bounds) = view.bounds else {
        sel.range = None;
        return (sel, view);
    };
    sel.range = sel.range.and_then(|r| r.clamp_to(bounds));
    let range = sel.range.unwrap_or_else(|| DateRange::covering(bounds));
    view.range = Some(range);

    let (start, end) = range.as_timestamps();
    view.chart = view
        .series
        .iter()
        .map(|s| ChartSeries {
            label: s.label(),
            readings: filter_by_range(&s.readings, start, end),
        })
        .collect();
    view.color_map = ColorMap::new(view.chart.iter().map(|c| c.label.as_str()));

    (sel, view)
}

/// Read every chosen customer × category file. Failures do not stop the rest.
fn load_selected(
    root: &Path,
    transformer: &str,
    sel: &Selection,
    catalog: Option<&Catalog>,
) -> (Vec<SeriesRecord>, Vec<LoadFailure>) {
    let mut series = Vec::new();
    let mut failures = Vec::new();
    let Some(catalog) = catalog else {
        return (series, failures);
    };

    for customer in &sel.customers {
        for category in &sel.categories {
            let Some(file) = catalog.file(customer, category) else {
                continue;
            };
            match load_series(root, transformer, file) {
                Ok(record) => {
                    log::debug!("Loaded {} ({} readings)", record.label(), record.readings.len());
                    series.push(record);
                }
                Err(e) => {
                    log::error!("Failed to load {customer}_{category}: {e}");
                    failures.push(LoadFailure {
                        customer: customer.clone(),
                        category: category.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }
    }
    (series, failures)
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub selection: Selection,
    pub view: View,
    /// Contents of the manual path field.
    pub path_input: String,
    /// Plot line width in points.
    pub line_width: f32,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            view: View::default(),
            path_input: String::new(),
            line_width: 1.5,
        }
    }
}

impl AppState {
    pub fn new(data_dir: Option<PathBuf>, line_width: f32) -> Self {
        let mut state = Self {
            line_width,
            ..Self::default()
        };
        if let Some(dir) = data_dir {
            state.path_input = dir.display().to_string();
            state.apply(state.selection.with_data_dir(Some(dir)));
        }
        state
    }

    /// Replace the selection and recompute everything derived from it.
    pub fn apply(&mut self, next: Selection) {
        if next.data_dir != self.selection.data_dir {
            match &next.data_dir {
                Some(dir) if dir.is_dir() => log::info!("Data directory: {}", dir.display()),
                Some(dir) => log::warn!("Not a directory: {}", dir.display()),
                None => {}
            }
        }
        let (selection, view) = derive(next);
        if selection.transformer != self.selection.transformer {
            if let Some(t) = &selection.transformer {
                log::info!("Transformer: {t}");
            }
        }
        self.selection = selection;
        self.view = view;
    }

    /// Ask the picker for a directory; a cancelled dialog changes nothing.
    pub fn browse(&mut self, picker: &dyn DirectoryPicker) {
        if let Some(dir) = picker.pick_directory() {
            self.path_input = dir.display().to_string();
            self.apply(self.selection.with_data_dir(Some(dir)));
        }
    }

    /// Take the manual path field as the data directory.
    pub fn commit_path_input(&mut self) {
        let trimmed = self.path_input.trim();
        let dir = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        if dir != self.selection.data_dir {
            self.apply(self.selection.with_data_dir(dir));
        }
    }

    pub fn stage(&self) -> Stage {
        let sel = &self.selection;
        if !self.view.directory_valid {
            Stage::Idle
        } else if sel.transformer.is_none() {
            Stage::DirectorySelected
        } else if sel.categories.is_empty() {
            Stage::TransformerSelected
        } else if sel.customers.is_empty() {
            Stage::CategoriesSelected
        } else if self.view.range.is_none() {
            Stage::CustomersSelected
        } else {
            Stage::RangeSelected
        }
    }
}
