use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::model::{date_from_millis, CategoryOrder, Granularity, MILLIS_PER_DAY};
use crate::state::{AppState, HoverPolicy, LoadStatus, TrendStyle};

const ALL_TYPES: &str = "All crime types";

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state below.
    let crime_types: Vec<String> = dataset.crime_types.iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            crime_type_selector(ui, state, &crime_types);
            ui.separator();

            time_range_sliders(ui, state);
            ui.separator();

            ui.strong("Time scale");
            let mut granularity = state.view().granularity;
            ui.horizontal(|ui: &mut Ui| {
                for g in [Granularity::Day, Granularity::Month] {
                    ui.radio_value(&mut granularity, g, g.label());
                }
            });
            state.set_granularity(granularity);

            ui.strong("Trend style");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.trend_style, TrendStyle::Line, "Line");
                ui.radio_value(&mut state.trend_style, TrendStyle::Bar, "Bar");
            });
            ui.separator();

            ui.strong("Crime type order");
            let mut order = state.view().category_order;
            ui.radio_value(&mut order, CategoryOrder::CountDescending, "Most frequent first");
            ui.radio_value(&mut order, CategoryOrder::FirstSeen, "Order of appearance");
            state.set_category_order(order);

            ui.strong("Hovering a crime type");
            ui.radio_value(&mut state.hover_policy, HoverPolicy::Inspect, "Highlights it");
            ui.radio_value(&mut state.hover_policy, HoverPolicy::Select, "Selects it");
            ui.separator();

            ui.strong("Map clusters");
            let mut radius = state.view().cluster_radius;
            let changed = ui
                .add(
                    Slider::new(&mut radius, 0.0..=0.5)
                        .step_by(0.005)
                        .fixed_decimals(3)
                        .text("radius (°)"),
                )
                .changed();
            if changed {
                state.set_cluster_radius(radius);
            }
        });
}

fn crime_type_selector(ui: &mut Ui, state: &mut AppState, crime_types: &[String]) {
    ui.strong("Crime type");
    let current = state.view().crime_type.clone();
    let mut chosen = current.clone();
    let selected_text = if current.is_empty() { ALL_TYPES } else { current.as_str() };

    egui::ComboBox::from_id_salt("crime_type")
        .selected_text(selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut chosen, String::new(), ALL_TYPES);
            for crime_type in crime_types {
                ui.selectable_value(&mut chosen, crime_type.clone(), crime_type);
            }
        });

    if chosen != current {
        state.set_crime_type(&chosen);
    }
}

fn time_range_sliders(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Date range");
    let bounds = state.slider_bounds();
    let span = bounds.start_millis()..=bounds.end_millis();
    let range = state.view().time_range;
    let mut start_ms = range.start_millis();
    let mut end_ms = range.end_millis();

    let start_changed = ui
        .add(
            Slider::new(&mut start_ms, span.clone())
                .step_by(MILLIS_PER_DAY)
                .custom_formatter(|v, _| millis_label(v))
                .text("start"),
        )
        .changed();
    let end_changed = ui
        .add(
            Slider::new(&mut end_ms, span)
                .step_by(MILLIS_PER_DAY)
                .custom_formatter(|v, _| millis_label(v))
                .text("end"),
        )
        .changed();

    if start_changed || end_changed {
        state.set_time_range_millis(start_ms, end_ms);
    }

    if ui.small_button("Full range").clicked() {
        state.set_time_range(bounds);
    }
}

fn millis_label(ms: f64) -> String {
    date_from_millis(ms)
        .map(|d| d.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let source = state.source.clone();
            if ui
                .add_enabled(source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Some(path) = source {
                    state.load_from_path(&path);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let vm = &state.view_model;
            ui.label(format!(
                "{} incidents loaded ({} with coordinates), {} in view, {} on the map",
                ds.len(),
                ds.located_len(),
                vm.filtered_count,
                vm.located_count
            ));
        }

        if let LoadStatus::Failed(msg) = &state.status {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open crime incident CSV")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_from_path(&path);
    }
}
