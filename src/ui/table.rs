use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Crime-type colour key with counts
// ---------------------------------------------------------------------------

/// Table of crime types in the current window, in the active order.
/// Returns the crime type whose row was clicked.
pub fn category_table(ui: &mut Ui, state: &AppState) -> Option<String> {
    let categories = &state.view_model.categories;
    let total: usize = categories.iter().map(|c| c.count).sum();
    let selected = state.view().crime_type.as_str();
    let mut clicked = None;

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(14.0))
        .column(Column::remainder().at_least(160.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(50.0))
        .max_scroll_height(260.0)
        .header(20.0, |mut header| {
            header.col(|_ui| {});
            header.col(|ui| {
                ui.strong("Crime type");
            });
            header.col(|ui| {
                ui.strong("Count");
            });
            header.col(|ui| {
                ui.strong("Share");
            });
        })
        .body(|mut body| {
            for c in categories {
                body.row(18.0, |mut row| {
                    let color = state
                        .colors
                        .as_ref()
                        .map(|colors| colors.color_for(&c.category))
                        .unwrap_or_default();
                    row.col(|ui| {
                        ui.label(RichText::new("■").color(color));
                    });
                    row.col(|ui| {
                        let is_selected = selected == c.category;
                        if ui.selectable_label(is_selected, &c.category).clicked() {
                            clicked = Some(if is_selected {
                                String::new()
                            } else {
                                c.category.clone()
                            });
                        }
                    });
                    row.col(|ui| {
                        ui.label(c.count.to_string());
                    });
                    row.col(|ui| {
                        let share = if total == 0 {
                            0.0
                        } else {
                            c.count as f64 * 100.0 / total as f64
                        };
                        ui.label(format!("{share:.1}%"));
                    });
                });
            }
        });

    clicked
}
