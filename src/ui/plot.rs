use std::f64::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, RichText, Sense, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Plot, PlotPoint, Points,
    Polygon, Text,
};

use crate::color::{heat_color, CategoryColors};
use crate::data::aggregate::{FiveNumberSummary, HistogramBin, Series};
use crate::report::{ReportBody, ValueFormat};
use crate::state::{AppState, DistributionView};
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected page: title, description, then its table or chart.
pub fn report_view(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.page.title());
    ui.label(state.page.description());
    ui.separator();

    if let Some(err) = &state.page_error {
        ui.label(RichText::new(err).color(Color32::RED));
        return;
    }

    if matches!(state.report.as_ref().map(|r| &r.body), Some(ReportBody::Filter(_))) {
        panels::filter_controls(ui, state);
        ui.separator();
        ui.heading("Filtered Movie List");
        if let Some(filtered) = &state.filtered {
            ui.label(format!("{} movies", filtered.len()));
            table::data_table(ui, "filtered", &filtered.to_table());
        }
        return;
    }

    let Some(report) = &state.report else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Loading…");
        });
        return;
    };

    match &report.body {
        ReportBody::Table(t) => table::data_table(ui, "report_table", t),
        ReportBody::Bars {
            series,
            horizontal,
            format,
        } => bar_chart(ui, series, *horizontal, *format, &state.colors),
        ReportBody::Scatter {
            points,
            x_label,
            y_label,
            correlation,
        } => {
            let text = match correlation {
                Some(r) => format!("Correlation Coefficient: {r:.2}"),
                None => "Correlation Coefficient: n/a".to_string(),
            };
            ui.strong(text);
            Plot::new("scatter")
                .x_axis_label(x_label.as_str())
                .y_axis_label(y_label.as_str())
                .show(ui, |plot_ui| {
                    plot_ui.points(Points::new(points.clone()).radius(3.0).name("Movies"));
                });
        }
        ReportBody::Distribution { bins, summary } => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Choose a plot type:");
                ui.radio_value(&mut state.distribution_view, DistributionView::Histogram, "Histogram");
                ui.radio_value(&mut state.distribution_view, DistributionView::Boxplot, "Boxplot");
            });
            match state.distribution_view {
                DistributionView::Histogram => rating_histogram(ui, bins),
                DistributionView::Boxplot => rating_boxplot(ui, summary.as_ref()),
            }
        }
        ReportBody::Pie(series) => pie_chart(ui, series, &state.colors),
        ReportBody::Heatmap(series) => heatmap(ui, series),
        ReportBody::Extremes { shortest, longest } => {
            ui.strong("Shortest Movie:");
            table::data_table(ui, "shortest", shortest);
            ui.add_space(12.0);
            ui.strong("Longest Movie:");
            table::data_table(ui, "longest", longest);
        }
        ReportBody::Filter(_) => {}
    }
}

/// Axis formatter showing category names at integer positions.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let pos = mark.value.round();
        if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
            return String::new();
        }
        labels.get(pos as usize).cloned().unwrap_or_default()
    }
}

fn empty_chart(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label("No data");
    });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

fn bar_chart(ui: &mut Ui, series: &Series, horizontal: bool, format: ValueFormat, colors: &CategoryColors) {
    if series.is_empty() {
        empty_chart(ui);
        return;
    }
    let labels: Vec<String> = series.points.iter().map(|(l, _)| l.clone()).collect();
    let bars: Vec<Bar> = series
        .points
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::new(i as f64, *value)
                .name(label)
                .fill(colors.color_for(label))
                .width(0.7)
        })
        .collect();
    let mut chart = BarChart::new(bars).name(&series.value_label);
    if horizontal {
        chart = chart.horizontal();
    }

    let mut plot = Plot::new("bar_chart").allow_drag(false).allow_scroll(false);
    if horizontal {
        plot = plot
            .x_axis_label(series.value_label.as_str())
            .y_axis_label(series.category_label.as_str())
            .y_axis_formatter(category_formatter(labels));
    } else {
        plot = plot
            .x_axis_label(series.category_label.as_str())
            .y_axis_label(series.value_label.as_str())
            .x_axis_formatter(category_formatter(labels));
    }

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(chart);
        for (i, (_, value)) in series.points.iter().enumerate() {
            let pos = if horizontal {
                PlotPoint::new(*value, i as f64)
            } else {
                PlotPoint::new(i as f64, *value)
            };
            let anchor = if horizontal { Align2::LEFT_CENTER } else { Align2::CENTER_BOTTOM };
            plot_ui.text(Text::new(pos, RichText::new(format.format(*value)).strong()).anchor(anchor));
        }
    });
}

// ---------------------------------------------------------------------------
// Rating distribution
// ---------------------------------------------------------------------------

fn rating_histogram(ui: &mut Ui, bins: &[HistogramBin]) {
    if bins.is_empty() {
        empty_chart(ui);
        return;
    }
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .name(format!("{:.2}–{:.2}", b.start, b.end))
                .fill(Color32::from_rgb(135, 206, 235))
        })
        .collect();
    Plot::new("rating_histogram")
        .x_axis_label("Ratings")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Ratings"));
        });
}

fn rating_boxplot(ui: &mut Ui, summary: Option<&FiveNumberSummary>) {
    let Some(s) = summary else {
        empty_chart(ui);
        return;
    };
    let elem = BoxElem::new(0.0, BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max))
        .name("Ratings")
        .fill(Color32::from_rgb(240, 128, 128))
        .box_width(0.5);
    Plot::new("rating_boxplot")
        .x_axis_label("Ratings")
        .show_y(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal().name("Ratings"));
        });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Slices start at 140° and run counter-clockwise, labelled with their
/// percentage of the total.
fn pie_chart(ui: &mut Ui, series: &Series, colors: &CategoryColors) {
    let total = series.total();
    if series.is_empty() || total <= 0.0 {
        empty_chart(ui);
        return;
    }
    Plot::new("pie_chart")
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 140f64.to_radians();
            for (label, value) in &series.points {
                let sweep = value / total * TAU;
                let steps = ((sweep / TAU) * 120.0).ceil().max(2.0) as usize;
                let mut outline = vec![[0.0, 0.0]];
                outline.extend((0..=steps).map(|k| {
                    let a = start + sweep * k as f64 / steps as f64;
                    [a.cos(), a.sin()]
                }));
                plot_ui.polygon(
                    Polygon::new(outline)
                        .fill_color(colors.color_for(label))
                        .name(label),
                );

                let mid = start + sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    RichText::new(format!("{:.1}%", value / total * 100.0)).strong(),
                ));
                plot_ui.text(
                    Text::new(PlotPoint::new(1.12 * mid.cos(), 1.12 * mid.sin()), label.as_str())
                        .anchor(if mid.cos() >= 0.0 { Align2::LEFT_CENTER } else { Align2::RIGHT_CENTER }),
                );
                start += sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// One coloured cell per category, annotated with the value to one decimal.
fn heatmap(ui: &mut Ui, series: &Series) {
    if series.is_empty() {
        empty_chart(ui);
        return;
    }
    let lo = series.points.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let hi = series.max_value().unwrap_or(lo);
    let range = hi - lo;

    egui::Grid::new("heatmap")
        .spacing([4.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            for (label, value) in &series.points {
                ui.label(label);
                let t = if range.abs() < f64::EPSILON { 0.5 } else { (value - lo) / range };
                let (rect, _) = ui.allocate_exact_size(egui::vec2(140.0, 24.0), Sense::hover());
                let fill = heat_color(t);
                ui.painter().rect_filled(rect, 2.0, fill);
                let text_color = if t > 0.6 { Color32::WHITE } else { Color32::BLACK };
                ui.painter().text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{value:.1}"),
                    FontId::proportional(14.0),
                    text_color,
                );
                ui.end_row();
            }
        });
}
