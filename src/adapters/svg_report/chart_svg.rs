//! Line chart of normalized daily values.

use crate::domain::price::ValuePoint;
use chrono::{Duration, NaiveDate};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;

const PORTFOLIO_COLOR: &str = "#2563eb";
const BENCHMARK_COLOR: &str = "#16a34a";

/// A named series drawn as one line.
pub struct Series<'a> {
    pub label: &'a str,
    pub points: &'a [ValuePoint],
    pub color: &'a str,
}

impl<'a> Series<'a> {
    pub fn portfolio(points: &'a [ValuePoint]) -> Self {
        Self {
            label: "Portfolio",
            points,
            color: PORTFOLIO_COLOR,
        }
    }

    pub fn benchmark(label: &'a str, points: &'a [ValuePoint]) -> Self {
        Self {
            label,
            points,
            color: BENCHMARK_COLOR,
        }
    }
}

/// Render `series` as an SVG document. Returns an empty string when there is
/// nothing to draw.
///
/// The x axis is a shared calendar running from the earliest first date to
/// the latest last date of the drawn series.
pub fn generate_comparison_svg(title: &str, series: &[Series]) -> String {
    let drawn: Vec<&Series> = series.iter().filter(|s| !s.points.is_empty()).collect();
    let (Some(first_date), Some(last_date)) = (
        drawn.iter().map(|s| s.points[0].date).min(),
        drawn.iter().map(|s| s.points[s.points.len() - 1].date).max(),
    ) else {
        return String::new();
    };
    let span_days = (last_date - first_date).num_days().max(1) as f64;

    let (min_value, max_value) = drawn
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.value))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = if max_value - min_value > f64::EPSILON {
        max_value - min_value
    } else {
        1.0
    };

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let x_scale = |date: NaiveDate| -> f64 {
        MARGIN_LEFT + ((date - first_date).num_days() as f64 / span_days) * plot_width
    };
    let y_scale =
        |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_value) / range) * plot_height };

    let mut svg = String::new();
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"20\" text-anchor=\"middle\" font-size=\"16\" fill=\"#111\">{}</text>\n",
        CHART_WIDTH / 2.0,
        escape(title)
    ));

    // Axes
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        MARGIN_TOP,
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        CHART_HEIGHT - MARGIN_BOTTOM,
        CHART_WIDTH - MARGIN_RIGHT,
        CHART_HEIGHT - MARGIN_BOTTOM
    ));
    svg.push_str(&format!(
        "  <text x=\"15\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#666\" transform=\"rotate(-90 15 {})\">Price</text>\n",
        MARGIN_TOP + plot_height / 2.0,
        MARGIN_TOP + plot_height / 2.0
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"12\" fill=\"#666\">Date</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        CHART_HEIGHT - 5.0
    ));

    for value in [max_value, (max_value + min_value) / 2.0, min_value] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.2}</text>\n",
            MARGIN_LEFT - 5.0,
            y_scale(value) + 3.0,
            value
        ));
    }

    let middle_date = first_date + Duration::days((last_date - first_date).num_days() / 2);
    for date in [first_date, middle_date, last_date] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x_scale(date),
            CHART_HEIGHT - MARGIN_BOTTOM + 15.0,
            date
        ));
    }

    for s in &drawn {
        let mut path_data = String::new();
        for (i, point) in s.points.iter().enumerate() {
            let x = x_scale(point.date);
            let y = y_scale(point.value);
            if i == 0 {
                path_data.push_str(&format!("M {:.1} {:.1}", x, y));
            } else {
                path_data.push_str(&format!(" L {:.1} {:.1}", x, y));
            }
        }
        svg.push_str(&format!(
            "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            path_data, s.color
        ));
    }

    // Legend
    for (i, s) in drawn.iter().enumerate() {
        let y = MARGIN_TOP + 10.0 + i as f64 * 16.0;
        svg.push_str(&format!(
            "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            MARGIN_LEFT + 10.0,
            y,
            MARGIN_LEFT + 30.0,
            y,
            s.color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"11\" fill=\"#333\">{}</text>\n",
            MARGIN_LEFT + 35.0,
            y + 4.0,
            escape(s.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
