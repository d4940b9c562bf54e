use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, LoadStatus};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CrimeDashboardApp {
    pub state: AppState,
}

impl CrimeDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for CrimeDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and map ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                no_data(ui, &self.state.status);
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    let brushed = plot::trend_charts(ui, &self.state);
                    ui.separator();

                    let mut hovered = None;
                    ui.columns(2, |cols| {
                        cols[0].strong("Crime types in the selected window");
                        let bar = plot::category_bars(&mut cols[0], &self.state);
                        cols[1].strong("Share by crime type");
                        let slice = plot::category_pie(&mut cols[1], &self.state);
                        hovered = bar.or(slice);
                    });
                    let clicked = table::category_table(ui, &self.state);
                    ui.separator();

                    ui.strong("Incident clusters");
                    plot::cluster_map(ui, &self.state);

                    if let Some(range) = brushed {
                        self.state.set_time_range(range);
                    }
                    self.state.hover_category(hovered.as_deref());
                    if let Some(crime_type) = clicked {
                        self.state.set_crime_type(&crime_type);
                    }
                });
        });
    }
}

fn no_data(ui: &mut Ui, status: &LoadStatus) {
    ui.centered_and_justified(|ui: &mut Ui| match status {
        LoadStatus::Failed(msg) => {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.heading("No data");
                ui.label(RichText::new(msg).color(Color32::RED));
                ui.label("Open another file via File → Open…");
            });
        }
        LoadStatus::Empty | LoadStatus::Loaded => {
            ui.heading("Open a crime incident CSV to begin  (File → Open…)");
        }
    });
}
