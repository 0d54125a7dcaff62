//! SVG rendering for trajectories and alignment paths.
//!
//! Output is plain SVG text so callers decide where it goes (file, HTTP
//! response, test assertion).

use std::fmt::Write as _;

use crate::model::{HmmModel, LabelSet};
use crate::types::Trajectory;

const STATE_COLORS: [&str; 3] = ["red", "blue", "green"];
const SYMBOL_COLORS: [&str; 3] = ["pink", "lightblue", "lightgreen"];
const EXTRA_COLORS: [&str; 6] = ["orange", "purple", "teal", "brown", "gray", "olive"];

const WIDTH: f64 = 1200.0;
const PANEL_HEIGHT: f64 = 250.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 50.0;
const MARKER_SIZE: f64 = 3.0;

fn palette_color(base: &[&'static str], idx: usize) -> &'static str {
    if idx < base.len() {
        base[idx]
    } else {
        EXTRA_COLORS[(idx - base.len()) % EXTRA_COLORS.len()]
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[derive(Clone, Copy)]
enum Marker {
    Circle,
    Square,
}

struct Panel<'a> {
    title: &'a str,
    y_label: &'a str,
    labels: &'a LabelSet,
    colors: &'a [&'static str],
    marker: Marker,
    legend_prefix: &'a str,
}

/// Two stacked scatter panels: step against state, then step against
/// observation.
pub fn render_trajectory_svg(model: &HmmModel, trajectory: &Trajectory) -> String {
    let height = 2.0 * PANEL_HEIGHT;
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="sans-serif" font-size="12">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);

    let states: Vec<usize> = trajectory.states().iter().map(|s| s.0).collect();
    let symbols: Vec<usize> = trajectory.observations().iter().map(|o| o.0).collect();

    render_panel(
        &mut svg,
        0.0,
        &Panel {
            title: "State Sequence",
            y_label: "State",
            labels: model.states(),
            colors: &STATE_COLORS,
            marker: Marker::Circle,
            legend_prefix: "State ",
        },
        &states,
    );
    render_panel(
        &mut svg,
        PANEL_HEIGHT,
        &Panel {
            title: "Observation Sequence",
            y_label: "Observation",
            labels: model.observations(),
            colors: &SYMBOL_COLORS,
            marker: Marker::Square,
            legend_prefix: "",
        },
        &symbols,
    );

    svg.push_str("</svg>\n");
    svg
}

fn render_panel(svg: &mut String, offset_y: f64, panel: &Panel<'_>, values: &[usize]) {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = PANEL_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let top = offset_y + MARGIN_TOP;
    let bottom = top + plot_h;
    let n_levels = panel.labels.len().max(1);
    let n_steps = values.len().max(1);

    let x_of = |step: usize| {
        if n_steps <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * step as f64 / (n_steps - 1) as f64
        }
    };
    // Level 0 sits at the bottom, matching an upward y axis.
    let y_of = |level: usize| bottom - plot_h * (level as f64 + 0.5) / n_levels as f64;

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        offset_y + MARGIN_TOP - 12.0,
        escape(panel.title)
    );
    let _ = writeln!(
        svg,
        r#"<rect x="{MARGIN_LEFT}" y="{top}" width="{plot_w}" height="{plot_h}" fill="none" stroke="black"/>"#
    );

    // Vertical grid lines and x ticks.
    let tick_count = 10.min(n_steps.saturating_sub(1)).max(1);
    for tick in 0..=tick_count {
        let step = (n_steps - 1) * tick / tick_count;
        let x = x_of(step);
        let _ = writeln!(
            svg,
            r##"<line x1="{x}" y1="{top}" x2="{x}" y2="{bottom}" stroke="#dddddd"/>"##
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x}" y="{}" text-anchor="middle">{step}</text>"#,
            bottom + 16.0
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle">Step</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        bottom + 34.0
    );

    for (level, label) in panel.labels.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            MARGIN_LEFT - 8.0,
            y_of(level),
            escape(label)
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="20" y="{mid}" text-anchor="middle" transform="rotate(-90 20 {mid})">{}</text>"#,
        escape(panel.y_label),
        mid = top + plot_h / 2.0
    );

    for level in 0..panel.labels.len() {
        let color = palette_color(panel.colors, level);
        let _ = writeln!(svg, r#"<g fill="{color}">"#);
        for (step, _) in values.iter().enumerate().filter(|&(_, &v)| v == level) {
            write_marker(svg, panel.marker, x_of(step), y_of(level));
        }
        svg.push_str("</g>\n");
    }

    let legend_x = WIDTH - MARGIN_RIGHT + 16.0;
    for (level, label) in panel.labels.iter().enumerate() {
        let y = top + 10.0 + 18.0 * level as f64;
        let color = palette_color(panel.colors, level);
        let _ = writeln!(svg, r#"<g fill="{color}">"#);
        write_marker(svg, panel.marker, legend_x, y);
        svg.push_str("</g>\n");
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{y}" dominant-baseline="middle">{}{}</text>"#,
            legend_x + 10.0,
            escape(panel.legend_prefix),
            escape(label)
        );
    }
}

fn write_marker(svg: &mut String, marker: Marker, x: f64, y: f64) {
    match marker {
        Marker::Circle => {
            let _ = writeln!(svg, r#"<circle cx="{x:.2}" cy="{y:.2}" r="{MARKER_SIZE}"/>"#);
        }
        Marker::Square => {
            let side = 2.0 * MARKER_SIZE;
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{side}" height="{side}"/>"#,
                x - MARKER_SIZE,
                y - MARKER_SIZE
            );
        }
    }
}

/// Line-and-marker plot of a warping path. Input frame `j` runs along x,
/// template frame `i` down the y axis (origin top-left).
pub fn render_path_svg(title: &str, path: &[(i64, i64)]) -> String {
    let size = 600.0;
    let margin = 60.0;
    let plot = size - 2.0 * margin;

    let (min_i, max_i) = bounds(path.iter().map(|&(i, _)| i));
    let (min_j, max_j) = bounds(path.iter().map(|&(_, j)| j));
    let span_i = (max_i - min_i).max(1) as f64;
    let span_j = (max_j - min_j).max(1) as f64;
    let x_of = |j: i64| margin + plot * (j - min_j) as f64 / span_j;
    let y_of = |i: i64| margin + plot * (i - min_i) as f64 / span_i;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}" font-family="sans-serif" font-size="12">"#
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
        size / 2.0,
        margin - 24.0,
        escape(title)
    );
    let _ = writeln!(
        svg,
        r#"<rect x="{margin}" y="{margin}" width="{plot}" height="{plot}" fill="none" stroke="black"/>"#
    );
    for (value, x) in [(min_j, x_of(min_j)), (max_j, x_of(max_j))] {
        let _ = writeln!(
            svg,
            r#"<text x="{x}" y="{}" text-anchor="middle">{value}</text>"#,
            margin + plot + 16.0
        );
    }
    for (value, y) in [(min_i, y_of(min_i)), (max_i, y_of(max_i))] {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{y}" text-anchor="end" dominant-baseline="middle">{value}</text>"#,
            margin - 6.0
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle">Input Frame (j)</text>"#,
        size / 2.0,
        size - 16.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="18" y="{mid}" text-anchor="middle" transform="rotate(-90 18 {mid})">Template Frame (i)</text>"#,
        mid = size / 2.0
    );

    let points = path
        .iter()
        .map(|&(i, j)| format!("{:.2},{:.2}", x_of(j), y_of(i)))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        svg,
        r#"<polyline points="{points}" fill="none" stroke="blue" stroke-width="1"/>"#
    );
    let _ = writeln!(svg, r#"<g fill="blue">"#);
    for &(i, j) in path {
        let _ = writeln!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="2"/>"#,
            x_of(j),
            y_of(i)
        );
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

fn bounds(values: impl Iterator<Item = i64>) -> (i64, i64) {
    values.fold(None, |acc: Option<(i64, i64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
    .unwrap_or((0, 0))
}
