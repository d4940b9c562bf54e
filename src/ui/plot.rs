use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoint, PlotUi, Points, Polygon};

use crate::color::{highlight, CategoryColors};
use crate::data::model::{Bucket, CategoryCount, Cluster, Granularity, TimeRange};
use crate::state::{AppState, TrendStyle};

const TREND_HEIGHT: f32 = 220.0;
const CATEGORY_HEIGHT: f32 = 320.0;
const MAP_HEIGHT: f32 = 480.0;
const AUSTIN: [f64; 2] = [-97.7431, 30.2672];
const OVERVIEW_COLOR: Color32 = Color32::LIGHT_BLUE;
const DETAIL_COLOR: Color32 = Color32::from_rgb(70, 130, 180);
const BRUSH_FILL: Color32 = Color32::from_rgba_premultiplied(40, 40, 40, 40);

// ---------------------------------------------------------------------------
// Date axis helpers
// ---------------------------------------------------------------------------

/// Plot x coordinate of a date (days from the common era).
fn day_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Inverse of [`day_x`]; `None` off the calendar.
fn x_day(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > f64::from(i32::MAX) {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

fn date_label(x: f64) -> String {
    x_day(x)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Time series (overview + detail)
// ---------------------------------------------------------------------------

/// Render the incident count over time: the full-extent overview on top and
/// the selected window below.
///
/// Dragging horizontally across the overview brushes a new window, which is
/// returned once the drag is released.
pub fn trend_charts(ui: &mut Ui, state: &AppState) -> Option<TimeRange> {
    let vm = &state.view_model;
    let granularity = state.view().granularity;
    let window = state.view().time_range;

    ui.strong("Incidents across the full dataset  (drag to select a window)");
    let brushed = overview_plot(ui, &vm.overview, granularity, state.trend_style, window);

    ui.strong(format!("Selected window  ({window})"));
    Plot::new("detail_chart")
        .height(TREND_HEIGHT)
        .include_y(0.0)
        .allow_scroll(false)
        .x_axis_formatter(|mark, _range| date_label(mark.value))
        .label_formatter(trend_label)
        .show(ui, |plot_ui| {
            trend_series(plot_ui, &vm.buckets, granularity, state.trend_style, DETAIL_COLOR);
        });

    brushed
}

fn overview_plot(
    ui: &mut Ui,
    buckets: &[Bucket],
    granularity: Granularity,
    style: TrendStyle,
    window: TimeRange,
) -> Option<TimeRange> {
    // In-progress brush as [anchor, pointer] plot x, kept across frames.
    let brush_id = ui.id().with("overview_brush");
    let mut brush: Option<[f64; 2]> = ui.data_mut(|d| d.get_temp(brush_id));
    let mut released = None;

    Plot::new("overview_chart")
        .height(TREND_HEIGHT)
        .include_y(0.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(|mark, _range| date_label(mark.value))
        .label_formatter(trend_label)
        .show(ui, |plot_ui| {
            let (started, dragging, stopped) = {
                let r = plot_ui.response();
                (r.drag_started(), r.dragged(), r.drag_stopped())
            };
            let pointer_x = plot_ui.pointer_coordinate().map(|p| p.x);

            if started {
                brush = pointer_x.map(|x| [x, x]);
            } else if dragging {
                if let (Some(b), Some(x)) = (brush.as_mut(), pointer_x) {
                    b[1] = x;
                }
            }
            if stopped {
                released = brush.take();
            }

            trend_series(plot_ui, buckets, granularity, style, OVERVIEW_COLOR);

            let [x0, x1] =
                brush.unwrap_or([day_x(window.start()) - 0.5, day_x(window.end()) + 0.5]);
            let bounds = plot_ui.plot_bounds();
            let (y0, y1) = (bounds.min()[1], bounds.max()[1]);
            plot_ui.polygon(
                Polygon::new(vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
                    .fill_color(BRUSH_FILL)
                    .stroke(Stroke::new(1.0, Color32::GRAY)),
            );
        });

    ui.data_mut(|d| match brush {
        Some(b) => d.insert_temp(brush_id, b),
        None => d.remove::<[f64; 2]>(brush_id),
    });

    released.and_then(|[x0, x1]| brush_range(x0, x1))
}

/// Window covered by a brush between plot x coordinates `x0` and `x1`, in
/// either order. A brush narrower than half a day counts as a click and
/// selects nothing.
pub fn brush_range(x0: f64, x1: f64) -> Option<TimeRange> {
    if (x1 - x0).abs() < 0.5 {
        return None;
    }
    Some(TimeRange::new(x_day(x0)?, x_day(x1)?))
}

fn trend_label(_name: &str, value: &PlotPoint) -> String {
    format!("{}\n{:.0} incidents", date_label(value.x), value.y)
}

fn trend_series(
    plot_ui: &mut PlotUi,
    buckets: &[Bucket],
    granularity: Granularity,
    style: TrendStyle,
    color: Color32,
) {
    match style {
        TrendStyle::Line => {
            let points: Vec<[f64; 2]> = buckets
                .iter()
                .map(|b| [day_x(b.start), b.count as f64])
                .collect();
            plot_ui.line(Line::new(points).color(color).width(2.0));
        }
        TrendStyle::Bar => {
            let bars: Vec<Bar> = buckets
                .iter()
                .map(|b| {
                    Bar::new(bucket_center(b.start, granularity), b.count as f64)
                        .width(bucket_width(b.start, granularity))
                        .fill(color)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(color));
        }
    }
}

fn bucket_width(start: NaiveDate, granularity: Granularity) -> f64 {
    match granularity {
        Granularity::Day => 0.8,
        Granularity::Month => f64::from(days_in_month(start)) * 0.9,
    }
}

fn bucket_center(start: NaiveDate, granularity: Granularity) -> f64 {
    match granularity {
        Granularity::Day => day_x(start),
        Granularity::Month => day_x(start) + f64::from(days_in_month(start)) / 2.0,
    }
}

fn days_in_month(start: NaiveDate) -> u32 {
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let first = start.with_day(1).unwrap_or(start);
    next
        .and_then(|n| u32::try_from((n - first).num_days()).ok())
        .unwrap_or(30)
}

// ---------------------------------------------------------------------------
// Crime-type distribution: bar chart + pie chart
// ---------------------------------------------------------------------------

/// Bar chart of the crime-type distribution. Returns the hovered type.
pub fn category_bars(ui: &mut Ui, state: &AppState) -> Option<String> {
    let categories = &state.view_model.categories;
    let colors = state.colors.as_ref();
    let hovered = state.hovered_category.as_deref();
    let labels: Vec<String> = categories
        .iter()
        .map(|c| short_label(&c.category))
        .collect();

    Plot::new("category_bars")
        .height(CATEGORY_HEIGHT)
        .include_y(0.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .label_formatter(|name, value| {
            if name.is_empty() {
                String::new()
            } else {
                format!("{name}\n{:.0}", value.y)
            }
        })
        .show(ui, |plot_ui| {
            let bars: Vec<Bar> = categories
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    let base = category_color(colors, &c.category);
                    let fill = if hovered == Some(c.category.as_str()) {
                        highlight(base)
                    } else {
                        base
                    };
                    Bar::new(i as f64, c.count as f64)
                        .width(0.9)
                        .fill(fill)
                        .name(&c.category)
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars));

            if !plot_ui.response().hovered() {
                return None;
            }
            let pointer = plot_ui.pointer_coordinate()?;
            bar_at(categories, pointer).map(|c| c.category.clone())
        })
        .inner
}

/// Category whose bar contains `pointer`.
fn bar_at(categories: &[CategoryCount], pointer: PlotPoint) -> Option<&CategoryCount> {
    let idx = pointer.x.round();
    if idx < 0.0 || (pointer.x - idx).abs() > 0.45 {
        return None;
    }
    let category = categories.get(idx as usize)?;
    (pointer.y >= 0.0 && pointer.y <= category.count as f64).then_some(category)
}

fn short_label(s: &str) -> String {
    const MAX: usize = 14;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX - 1).collect();
        format!("{head}…")
    }
}

fn category_color(colors: Option<&CategoryColors>, category: &str) -> Color32 {
    colors.map_or(Color32::GRAY, |c| c.color_for(category))
}

/// One wedge of the pie chart, angles in radians from the +x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub category: String,
    pub count: usize,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn fraction(&self) -> f64 {
        (self.end_angle - self.start_angle) / TAU
    }
}

/// Lay the categories out as consecutive wedges covering the full circle.
pub fn pie_slices(categories: &[CategoryCount]) -> Vec<PieSlice> {
    let total: usize = categories.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut angle = 0.0;
    categories
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| {
            let start_angle = angle;
            angle += TAU * c.count as f64 / total as f64;
            PieSlice {
                category: c.category.clone(),
                count: c.count,
                start_angle,
                end_angle: angle,
            }
        })
        .collect()
}

/// Slice under `pointer` on a unit pie centred at the origin.
fn slice_at(slices: &[PieSlice], pointer: PlotPoint) -> Option<&PieSlice> {
    if pointer.x.hypot(pointer.y) > 1.0 {
        return None;
    }
    let angle = pointer.y.atan2(pointer.x).rem_euclid(TAU);
    slices
        .iter()
        .find(|s| s.start_angle <= angle && angle < s.end_angle)
}

fn wedge(slice: &PieSlice) -> Vec<[f64; 2]> {
    let steps = ((slice.fraction() * 96.0).ceil() as usize).max(2);
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let a = slice.start_angle + (slice.end_angle - slice.start_angle) * i as f64 / steps as f64;
        points.push([a.cos(), a.sin()]);
    }
    points
}

/// Pie chart of the crime-type distribution. Returns the hovered type.
pub fn category_pie(ui: &mut Ui, state: &AppState) -> Option<String> {
    let slices = pie_slices(&state.view_model.categories);
    let colors = state.colors.as_ref();
    let hovered = state.hovered_category.as_deref();

    Plot::new("category_pie")
        .height(CATEGORY_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show_x(false)
        .show_y(false)
        .include_x(-1.1)
        .include_x(1.1)
        .include_y(-1.1)
        .include_y(1.1)
        .show(ui, |plot_ui| {
            for slice in &slices {
                let base = category_color(colors, &slice.category);
                let fill = if hovered == Some(slice.category.as_str()) {
                    highlight(base)
                } else {
                    base
                };
                plot_ui.polygon(
                    Polygon::new(wedge(slice))
                        .fill_color(fill)
                        .stroke(Stroke::new(1.0, Color32::WHITE))
                        .name(format!(
                            "{}: {} ({:.1}%)",
                            slice.category,
                            slice.count,
                            slice.fraction() * 100.0
                        )),
                );
            }

            if !plot_ui.response().hovered() {
                return None;
            }
            let pointer = plot_ui.pointer_coordinate()?;
            slice_at(&slices, pointer).map(|s| s.category.clone())
        })
        .inner
}

// ---------------------------------------------------------------------------
// Cluster map
// ---------------------------------------------------------------------------

/// Scatter map of clusters in longitude/latitude space.
pub fn cluster_map(ui: &mut Ui, state: &AppState) {
    let clusters: &[Cluster] = &state.view_model.clusters;

    Plot::new("cluster_map")
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .include_x(AUSTIN[0] - 0.2)
        .include_x(AUSTIN[0] + 0.2)
        .include_y(AUSTIN[1] - 0.2)
        .include_y(AUSTIN[1] + 0.2)
        .label_formatter(|name, value| {
            if name.is_empty() {
                format!("{:.4}, {:.4}", value.y, value.x)
            } else {
                format!("{name}\n{:.4}, {:.4}", value.y, value.x)
            }
        })
        .show(ui, |plot_ui| {
            for cluster in clusters {
                plot_ui.points(
                    Points::new(vec![[cluster.lng, cluster.lat]])
                        .radius(cluster.marker_radius())
                        .color(Color32::from_rgba_unmultiplied(220, 20, 60, 140))
                        .filled(true)
                        .name(format!("{} incidents", cluster.count)),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(name: &str, count: usize) -> CategoryCount {
        CategoryCount {
            category: name.to_string(),
            count,
        }
    }

    #[test]
    fn day_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2015, 7, 4).unwrap();
        assert_eq!(x_day(day_x(d)), Some(d));
        assert_eq!(date_label(day_x(d)), "2015-07-04");
        assert_eq!(x_day(f64::NAN), None);
    }

    #[test]
    fn brush_selects_whole_days_in_either_direction() {
        let d = |m, day| NaiveDate::from_ymd_opt(2015, m, day).unwrap();
        let x0 = day_x(d(3, 1)) + 0.2;
        let x1 = day_x(d(3, 20)) - 0.3;
        let expected = TimeRange::new(d(3, 1), d(3, 20));
        assert_eq!(brush_range(x0, x1), Some(expected));
        assert_eq!(brush_range(x1, x0), Some(expected));
    }

    #[test]
    fn brush_click_or_off_calendar_selects_nothing() {
        let x = day_x(NaiveDate::from_ymd_opt(2015, 6, 1).unwrap());
        assert_eq!(brush_range(x, x + 0.1), None);
        assert_eq!(brush_range(x, f64::NAN), None);
        assert_eq!(brush_range(x, f64::INFINITY), None);
    }

    #[test]
    fn month_bar_geometry() {
        let feb = NaiveDate::from_ymd_opt(2015, 2, 1).unwrap();
        let dec = NaiveDate::from_ymd_opt(2015, 12, 1).unwrap();
        assert_eq!(days_in_month(feb), 28);
        assert_eq!(days_in_month(dec), 31);
        assert_eq!(bucket_center(feb, Granularity::Month), day_x(feb) + 14.0);
        assert_eq!(bucket_width(feb, Granularity::Day), 0.8);
    }

    #[test]
    fn pie_slices_cover_circle() {
        let slices = pie_slices(&[cat("THEFT", 3), cat("ASSAULT", 1), cat("ARSON", 0)]);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].start_angle, 0.0);
        assert!((slices[0].fraction() - 0.75).abs() < 1e-12);
        assert!((slices[1].end_angle - TAU).abs() < 1e-12);
        assert!(pie_slices(&[]).is_empty());
    }

    #[test]
    fn pie_hit_test() {
        let slices = pie_slices(&[cat("THEFT", 1), cat("ASSAULT", 1)]);
        // Upper half is the first slice, lower half the second.
        let up = slice_at(&slices, PlotPoint::new(0.0, 0.5)).unwrap();
        assert_eq!(up.category, "THEFT");
        let down = slice_at(&slices, PlotPoint::new(0.0, -0.5)).unwrap();
        assert_eq!(down.category, "ASSAULT");
        assert!(slice_at(&slices, PlotPoint::new(2.0, 0.0)).is_none());
    }

    #[test]
    fn bar_hit_test() {
        let cats = [cat("THEFT", 10), cat("ASSAULT", 2)];
        assert_eq!(bar_at(&cats, PlotPoint::new(0.1, 5.0)).unwrap().category, "THEFT");
        assert_eq!(bar_at(&cats, PlotPoint::new(0.9, 1.0)).unwrap().category, "ASSAULT");
        assert!(bar_at(&cats, PlotPoint::new(1.0, 5.0)).is_none());
        assert!(bar_at(&cats, PlotPoint::new(0.5, 1.0)).is_none());
        assert!(bar_at(&cats, PlotPoint::new(-0.8, 1.0)).is_none());
        assert!(bar_at(&cats, PlotPoint::new(5.0, 1.0)).is_none());
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(short_label("THEFT"), "THEFT");
        assert_eq!(short_label("BURGLARY OF VEHICLE"), "BURGLARY OF V…");
    }
}
