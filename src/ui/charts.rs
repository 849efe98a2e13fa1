use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::data::aggregate::{MapPoint, Summary};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 300.0;
const MAP_HEIGHT: f32 = 500.0;

// ---------------------------------------------------------------------------
// KPI readouts
// ---------------------------------------------------------------------------

/// Shown in place of a readout with nothing to average.
pub const NO_DATA: &str = "—";

/// Text for a readout; `None` means there is nothing to average.
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => NO_DATA.to_string(),
    }
}

pub fn kpi_row(ui: &mut Ui, summary: &Summary) {
    ui.columns(4, |cols| {
        metric(&mut cols[0], "Total Listings", summary.count.to_string());
        metric(&mut cols[1], "Average Price ($)", format_metric(summary.mean_price));
        metric(&mut cols[2], "Median Price ($)", format_metric(summary.median_price));
        metric(
            &mut cols[3],
            "Avg Reviews / Month",
            format_metric(summary.mean_reviews_per_month),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.heading(value);
    });
}

fn no_rows(ui: &mut Ui) {
    ui.label("No listings match the current filters.");
}

/// Axis formatter showing `labels[i]` at integer positions only.
fn category_labels(labels: Vec<String>) -> impl Fn(egui_plot::GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Price distribution (stacked by room type)
// ---------------------------------------------------------------------------

pub fn price_histogram(ui: &mut Ui, state: &AppState) {
    let hist = &state.dashboard.histogram;
    if hist.is_empty() {
        no_rows(ui);
        return;
    }

    let mut charts: Vec<BarChart> = Vec::new();
    for (room_type, counts) in &hist.counts {
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(i, &n)| Bar::new(hist.bin_center(i), n as f64).width(hist.bin_width))
            .collect();
        let mut chart = BarChart::new(bars)
            .name(room_type)
            .color(state.color_map.color_for(room_type));
        if !charts.is_empty() {
            let below: Vec<&BarChart> = charts.iter().collect();
            chart = chart.stack_on(&below);
        }
        charts.push(chart);
    }

    Plot::new("price_histogram")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Price ($)")
        .y_axis_label("Listings")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Room type breakdown
// ---------------------------------------------------------------------------

pub fn room_type_chart(ui: &mut Ui, state: &AppState) {
    let breakdown = &state.dashboard.room_types;
    if breakdown.is_empty() {
        no_rows(ui);
        return;
    }

    let bars: Vec<Bar> = breakdown
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new(i as f64, c.count as f64)
                .width(0.7)
                .name(&c.room_type)
                .fill(state.color_map.color_for(&c.room_type))
        })
        .collect();
    let labels = breakdown.iter().map(|c| c.room_type.clone()).collect();

    Plot::new("room_type_chart")
        .height(CHART_HEIGHT)
        .y_axis_label("Number of Listings")
        .x_axis_formatter(category_labels(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Average price by city (top N, horizontal bars, highest on top)
// ---------------------------------------------------------------------------

pub fn top_city_chart(ui: &mut Ui, state: &AppState) {
    let ranked = &state.dashboard.top_cities;
    if ranked.is_empty() {
        no_rows(ui);
        return;
    }

    let n = ranked.len();
    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, c)| {
            Bar::new((n - 1 - i) as f64, c.mean_price)
                .width(0.7)
                .name(format!("{} ({} listings)", c.city, c.listings))
        })
        .collect();
    let labels = ranked.iter().rev().map(|c| c.city.clone()).collect();

    Plot::new("top_city_chart")
        .height(CHART_HEIGHT)
        .x_axis_label("Average Price ($)")
        .y_axis_formatter(category_labels(labels))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Geographic distribution
// ---------------------------------------------------------------------------

/// Marker radius classes; larger for pricier listings.
const RADII: [f32; 4] = [1.5, 2.5, 3.5, 5.0];

fn radius_class(price: Option<f64>, max_price: f64) -> usize {
    match price {
        Some(p) if max_price > 0.0 && p > 0.0 => {
            let scaled = (p / max_price).clamp(0.0, 1.0).sqrt();
            ((scaled * RADII.len() as f64) as usize).min(RADII.len() - 1)
        }
        _ => 0,
    }
}

/// Index of the point closest to `(x, y)` within `tolerance` plot units.
pub fn nearest_point(points: &[MapPoint], x: f64, y: f64, tolerance: f64) -> Option<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, (p.longitude - x).powi(2) + (p.latitude - y).powi(2)))
        .filter(|&(_, d2)| d2 <= tolerance * tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

pub fn geo_map(ui: &mut Ui, state: &AppState) {
    let points = &state.dashboard.map;
    if points.is_empty() {
        no_rows(ui);
        return;
    }

    let max_price = points
        .iter()
        .filter_map(|p| p.price)
        .fold(0.0_f64, f64::max);

    let mut series: Vec<Points> = Vec::new();
    for room_type in &state.dataset.room_types {
        let color = state.color_map.color_for(room_type);
        for (class, &radius) in RADII.iter().enumerate() {
            let coords: Vec<[f64; 2]> = points
                .iter()
                .filter(|p| &p.room_type == room_type && radius_class(p.price, max_price) == class)
                .map(|p| [p.longitude, p.latitude])
                .collect();
            if coords.is_empty() {
                continue;
            }
            series.push(
                Points::new(PlotPoints::from(coords))
                    .name(room_type)
                    .color(color)
                    .radius(radius),
            );
        }
    }

    let response = Plot::new("geo_map")
        .legend(Legend::default())
        .height(MAP_HEIGHT)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            for s in series {
                plot_ui.points(s);
            }
            let bounds = plot_ui.plot_bounds();
            let tolerance = bounds.width().max(bounds.height()) * 0.01;
            plot_ui
                .pointer_coordinate()
                .and_then(|p| nearest_point(points, p.x, p.y, tolerance))
        });

    if let Some(i) = response.inner {
        let p = &points[i];
        let price = p.price.map(|v| format!("${v:.0}")).unwrap_or_else(|| "no price".into());
        response.response.on_hover_ui_at_pointer(|ui: &mut Ui| {
            ui.strong(&p.name);
            ui.label(format!("{} · {} · {price}", p.city, p.room_type));
        });
    }
}

// ---------------------------------------------------------------------------
// Central panel layout
// ---------------------------------------------------------------------------

/// KPIs and every chart, top to bottom.
pub fn dashboard_panel(ui: &mut Ui, state: &AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("U.S. Rental Listings Analysis (2020 vs 2023)");
            ui.label("Exploratory analysis of short-term rental listings across U.S. cities");
            ui.separator();

            kpi_row(ui, &state.dashboard.summary);
            ui.separator();

            ui.heading("Price Distribution");
            price_histogram(ui, state);

            ui.heading("Room Type Breakdown");
            room_type_chart(ui, state);

            ui.heading(format!("Average Price by City (top {})", state.options.top_cities));
            top_city_chart(ui, state);

            ui.heading("Geographic Distribution");
            geo_map(ui, state);

            ui.separator();
            super::table::raw_data(ui, state);
        });
}
