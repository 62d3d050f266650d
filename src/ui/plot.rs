use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::state::{AppState, Stage};

const SECONDS_PER_DAY: f64 = 86_400.0;

// ---------------------------------------------------------------------------
// Time axis <-> plot coordinates
// ---------------------------------------------------------------------------

/// Seconds since the Unix epoch, treating the naive time as UTC.
pub fn to_plot_x(ts: NaiveDateTime) -> f64 {
    let utc = ts.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_nanos()) * 1e-9
}

pub fn from_plot_x(x: f64) -> Option<NaiveDateTime> {
    if !x.is_finite() {
        return None;
    }
    let secs = x.floor();
    let nanos = ((x - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)).map(|dt| dt.naive_utc())
}

/// Axis tick text; coarser when the visible window spans days.
fn format_tick(x: f64, visible_span: f64) -> String {
    let Some(ts) = from_plot_x(x) else {
        return String::new();
    };
    if visible_span > 3.0 * SECONDS_PER_DAY {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%m-%d %H:%M").to_string()
    }
}

// ---------------------------------------------------------------------------
// Time-series plot (central panel)
// ---------------------------------------------------------------------------

/// One line per file that could not be read, naming customer and category.
pub fn failure_lines(state: &AppState) -> Vec<String> {
    state
        .view
        .failures
        .iter()
        .map(|f| format!("Could not load {}_{}: {}", f.customer, f.category, f.message))
        .collect()
}

/// Render the chart in the central panel.
pub fn time_series_plot(ui: &mut Ui, state: &AppState) {
    for line in failure_lines(state) {
        ui.label(RichText::new(line).color(Color32::RED));
    }

    let stage = state.stage();
    if stage < Stage::RangeSelected {
        let hint = match stage {
            Stage::Idle => "Pick a data directory  (File → Open Folder…)",
            Stage::DirectorySelected => "This directory has no transformer folders",
            Stage::TransformerSelected => "Select one or more categories",
            Stage::CategoriesSelected => "Select one or more customers",
            _ => "No readings in the selected files",
        };
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(hint);
        });
        return;
    }

    let transformer = state.selection.transformer.as_deref().unwrap_or_default();
    ui.heading(format!("{transformer} Data"));

    Plot::new("time_series_plot")
        .legend(Legend::default())
        .x_axis_label("Datetime")
        .y_axis_label("Value")
        .x_axis_formatter(|mark: GridMark, range: &std::ops::RangeInclusive<f64>| {
            format_tick(mark.value, range.end() - range.start())
        })
        .label_formatter(|name: &str, point: &PlotPoint| {
            let when = from_plot_x(point.x)
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            if name.is_empty() {
                format!("{when}\n{:.3}", point.y)
            } else {
                format!("{name}\n{when}\n{:.3}", point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &state.view.chart {
                let points: PlotPoints = series
                    .readings
                    .iter()
                    .map(|r| [to_plot_x(r.timestamp), r.value])
                    .collect();

                let line = Line::new(points)
                    .name(&series.label)
                    .color(state.view.color_map.color_for(&series.label))
                    .width(state.line_width);

                plot_ui.line(line);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn plot_x_round_trips_to_the_second() {
        let ts = NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(12, 30, 15)
            .unwrap();
        let back = from_plot_x(to_plot_x(ts)).unwrap();
        assert_eq!(back.format("%F %T").to_string(), "2023-06-01 12:30:15");
    }

    #[test]
    fn ticks_drop_time_for_long_windows() {
        let ts = NaiveDate::from_ymd_opt(2023, 6, 1)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        let x = to_plot_x(ts);
        assert_eq!(format_tick(x, 30.0 * SECONDS_PER_DAY), "2023-06-01");
        assert_eq!(format_tick(x, 3600.0), "06-01 06:00");
        assert_eq!(format_tick(f64::NAN, 1.0), "");
    }
}
