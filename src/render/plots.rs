//! Explanation plots rendered as static SVG images

use crate::types::Explanation;

/// Positive attributions
const RED: &str = "#ff0051";
/// Negative attributions
const BLUE: &str = "#008bfb";
const AXIS: &str = "#999999";
const TEXT: &str = "#333333";

const WIDTH: f64 = 680.0;
const LEFT: f64 = 240.0;
const RIGHT: f64 = 60.0;
const TOP: f64 = 40.0;
const BOTTOM: f64 = 56.0;
const ROW: f64 = 30.0;

/// Rows shown by the summary plot
pub const SUMMARY_MAX_DISPLAY: usize = 20;
/// Rows shown by the waterfall and bar plots, including the folded row
pub const MAX_DISPLAY: usize = 10;

/// Minimal SVG document builder
struct Canvas {
    width: f64,
    height: f64,
    body: String,
}

impl Canvas {
    fn new(rows: usize) -> Self {
        let height = TOP + BOTTOM + ROW * rows.max(1) as f64;
        Self {
            width: WIDTH,
            height,
            body: String::new(),
        }
    }

    fn plot_bottom(&self) -> f64 {
        self.height - BOTTOM
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, dashed: bool) {
        let dash = if dashed { r#" stroke-dasharray="4 3""# } else { "" };
        self.body.push_str(&format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1"{}/>"#,
            x1, y1, x2, y2, stroke, dash
        ));
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str) {
        self.body.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
            x,
            y,
            w.max(1.0),
            h,
            fill
        ));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            cx, cy, r, fill
        ));
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, size: u32, fill: &str, content: &str) {
        self.body.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="{}" font-size="{}" fill="{}">{}</text>"#,
            x,
            y,
            anchor,
            size,
            fill,
            escape_xml(content)
        ));
    }

    fn finish(self, title: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif" role="img" aria-label="{t}"><rect width="100%" height="100%" fill="white"/>{body}</svg>"#,
            w = self.width,
            h = self.height,
            t = escape_xml(title),
            body = self.body
        )
    }
}

/// Linear mapping from data values to horizontal pixels
#[derive(Debug, Clone, Copy)]
struct Scale {
    lo: f64,
    hi: f64,
}

impl Scale {
    /// Domain covering `values` and zero, padded on both sides
    fn covering<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let (mut lo, mut hi) = (0.0_f64, 0.0_f64);
        for v in values {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if (hi - lo).abs() < f64::EPSILON {
            return Self { lo: lo - 1.0, hi: hi + 1.0 };
        }
        let pad = (hi - lo) * 0.08;
        Self {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    fn x(&self, value: f64) -> f64 {
        LEFT + (value - self.lo) / (self.hi - self.lo) * (WIDTH - LEFT - RIGHT)
    }
}

fn draw_axis(canvas: &mut Canvas, scale: Scale, label: &str) {
    let y = canvas.plot_bottom();
    canvas.line(LEFT, y, WIDTH - RIGHT, y, AXIS, false);

    for i in 0..=4 {
        let value = scale.lo + (scale.hi - scale.lo) * i as f64 / 4.0;
        let x = scale.x(value);
        canvas.line(x, y, x, y + 4.0, AXIS, false);
        canvas.text(x, y + 16.0, "middle", 10, TEXT, &format_tick(value));
    }

    canvas.text((LEFT + WIDTH - RIGHT) / 2.0, y + 36.0, "middle", 12, TEXT, label);
}

fn row_center(row: usize) -> f64 {
    TOP + ROW * row as f64 + ROW / 2.0
}

/// Per-feature attribution distribution.
///
/// One row per feature, largest absolute attribution first, dot coloured by
/// the feature value (high = red, low = blue).
pub fn summary_plot(explanation: &Explanation) -> String {
    let order: Vec<usize> = explanation
        .order_by_magnitude()
        .into_iter()
        .take(SUMMARY_MAX_DISPLAY)
        .collect();

    let mut canvas = Canvas::new(order.len());
    let scale = Scale::covering(order.iter().map(|&i| explanation.values[i]));

    let zero = scale.x(0.0);
    canvas.line(zero, TOP, zero, canvas.plot_bottom(), AXIS, false);

    for (row, &i) in order.iter().enumerate() {
        let y = row_center(row);
        canvas.line(LEFT, y, WIDTH - RIGHT, y, "#eeeeee", true);
        canvas.text(LEFT - 10.0, y + 4.0, "end", 12, TEXT, &explanation.feature_names[i]);

        let colour = if explanation.data[i] > 0.0 { RED } else { BLUE };
        canvas.circle(scale.x(explanation.values[i]), y, 5.0, colour);
    }

    canvas.text(WIDTH - RIGHT + 8.0, TOP + 10.0, "start", 10, RED, "High");
    canvas.text(WIDTH - RIGHT + 8.0, canvas.plot_bottom() - 4.0, "start", 10, BLUE, "Low");
    draw_axis(&mut canvas, scale, "SHAP value (impact on model output)");
    canvas.finish("Summary plot")
}

/// A displayed row: label and value
struct Row {
    label: String,
    value: f64,
}

/// Largest rows by magnitude; the rest are folded into one trailing row
fn top_rows(
    explanation: &Explanation,
    magnitude: impl Fn(f64) -> f64,
    label: impl Fn(usize) -> String,
    folded_label: impl Fn(usize) -> String,
) -> Vec<Row> {
    let order = explanation.order_by_magnitude();
    let shown = if order.len() > MAX_DISPLAY {
        MAX_DISPLAY - 1
    } else {
        order.len()
    };

    let mut rows: Vec<Row> = order[..shown]
        .iter()
        .map(|&i| Row {
            label: label(i),
            value: magnitude(explanation.values[i]),
        })
        .collect();

    let rest = &order[shown..];
    if !rest.is_empty() {
        rows.push(Row {
            label: folded_label(rest.len()),
            value: rest.iter().map(|&i| magnitude(explanation.values[i])).sum(),
        });
    }

    rows
}

/// Single-record breakdown from the base value `E[f(X)]` to the output `f(x)`
pub fn waterfall_plot(explanation: &Explanation) -> String {
    let rows = top_rows(
        explanation,
        |v| v,
        |i| {
            format!(
                "{} = {}",
                format_value(explanation.data[i]),
                explanation.feature_names[i]
            )
        },
        |n| format!("{} other features", n),
    );

    // Accumulate from the bottom row up so the top bar ends at f(x)
    let mut spans = vec![(0.0, 0.0); rows.len()];
    let mut cumulative = explanation.base_value;
    for (row, span) in rows.iter().zip(spans.iter_mut()).rev() {
        *span = (cumulative, cumulative + row.value);
        cumulative += row.value;
    }
    let output = cumulative;

    let mut canvas = Canvas::new(rows.len());
    let scale = Scale::covering(
        spans
            .iter()
            .flat_map(|&(a, b)| [a, b])
            .chain([explanation.base_value, output]),
    );

    let base_x = scale.x(explanation.base_value);
    let out_x = scale.x(output);
    canvas.line(base_x, TOP, base_x, canvas.plot_bottom(), AXIS, true);
    canvas.line(out_x, TOP - 10.0, out_x, canvas.plot_bottom(), AXIS, true);
    canvas.text(out_x, TOP - 14.0, "middle", 11, TEXT, &format!("f(x) = {:.3}", output));

    for (row, (entry, &(start, end))) in rows.iter().zip(&spans).enumerate() {
        let y = row_center(row);
        let (x0, x1) = (scale.x(start.min(end)), scale.x(start.max(end)));
        let colour = if entry.value >= 0.0 { RED } else { BLUE };

        canvas.text(LEFT - 10.0, y + 4.0, "end", 12, TEXT, &entry.label);
        canvas.rect(x0, y - ROW * 0.35, x1 - x0, ROW * 0.7, colour);

        let (tx, anchor) = if entry.value >= 0.0 {
            (x1 + 4.0, "start")
        } else {
            (x0 - 4.0, "end")
        };
        canvas.text(tx, y + 4.0, anchor, 10, colour, &format!("{:+.2}", entry.value));
    }

    draw_axis(
        &mut canvas,
        scale,
        &format!("E[f(X)] = {:.3}", explanation.base_value),
    );
    canvas.finish("Waterfall plot")
}

/// Feature importance ranking by mean absolute attribution
pub fn bar_plot(explanation: &Explanation) -> String {
    let rows = top_rows(
        explanation,
        f64::abs,
        |i| explanation.feature_names[i].clone(),
        |n| format!("Sum of {} other features", n),
    );

    let mut canvas = Canvas::new(rows.len());
    let scale = Scale::covering(rows.iter().map(|r| r.value));
    let zero = scale.x(0.0);
    canvas.line(zero, TOP, zero, canvas.plot_bottom(), AXIS, false);

    for (row, entry) in rows.iter().enumerate() {
        let y = row_center(row);
        let x1 = scale.x(entry.value);
        canvas.text(LEFT - 10.0, y + 4.0, "end", 12, TEXT, &entry.label);
        canvas.rect(zero, y - ROW * 0.35, x1 - zero, ROW * 0.7, RED);
        canvas.text(x1 + 4.0, y + 4.0, "start", 10, RED, &format!("+{:.2}", entry.value));
    }

    draw_axis(&mut canvas, scale, "mean(|SHAP value|)");
    canvas.finish("Feature importance")
}

/// Embed an SVG document as an `<img>` source
pub fn svg_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;charset=utf-8,{}", urlencoding::encode(svg))
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
    }
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Escape text for XML content and attributes
pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explanation(values: Vec<f64>) -> Explanation {
        let n = values.len();
        Explanation {
            base_value: -3.0,
            feature_names: (0..n).map(|i| format!("feature_{}", i)).collect(),
            data: (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -0.5 }).collect(),
            values,
        }
    }

    #[test]
    fn test_summary_plot_rows() {
        let e = explanation(vec![0.2, -1.5, 0.7]);
        let svg = summary_plot(&e);

        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 3);
        // largest magnitude first
        let first = svg.find("feature_1").unwrap();
        let second = svg.find("feature_2").unwrap();
        let third = svg.find("feature_0").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_summary_plot_caps_rows() {
        let e = explanation((0..25).map(|i| i as f64).collect());
        assert_eq!(summary_plot(&e).matches("<circle").count(), SUMMARY_MAX_DISPLAY);
    }

    #[test]
    fn test_waterfall_ends_at_output() {
        let e = explanation(vec![1.0, -0.5, 2.0]);
        let svg = waterfall_plot(&e);

        assert!(svg.contains("f(x) = -0.500"));
        assert!(svg.contains("E[f(X)] = -3.000"));
        assert!(svg.contains("1 = feature_0"));
        assert!(svg.contains("-0.500 = feature_1"));
        assert!(svg.contains("+2.00"));
        assert!(svg.contains("-0.50"));
    }

    #[test]
    fn test_waterfall_folds_other_features() {
        let e = explanation((1..=12).map(|i| i as f64 / 10.0).collect());
        let svg = waterfall_plot(&e);

        assert!(svg.contains("3 other features"));
        // 9 features + folded row + white background
        assert_eq!(svg.matches("<rect").count(), 11);
    }

    #[test]
    fn test_bar_plot_uses_magnitudes() {
        let e = explanation(vec![-2.0, 0.5]);
        let svg = bar_plot(&e);

        assert!(svg.contains("+2.00"));
        assert!(svg.contains("+0.50"));
        assert!(!svg.contains("-2.00"));
        assert!(svg.find("feature_0").unwrap() < svg.find("feature_1").unwrap());
    }

    #[test]
    fn test_bar_plot_sums_folded_rows() {
        let e = explanation(vec![5.0, 4.0, 3.0, 2.0, 1.0, 0.9, 0.8, 0.7, 0.6, -0.25, 0.25]);
        let svg = bar_plot(&e);
        assert!(svg.contains("Sum of 2 other features"));
        assert!(svg.contains("+0.50"));
    }

    #[test]
    fn test_plots_are_deterministic() {
        let e = explanation(vec![0.3, -0.1, 0.05]);
        assert_eq!(summary_plot(&e), summary_plot(&e));
        assert_eq!(waterfall_plot(&e), waterfall_plot(&e));
        assert_eq!(bar_plot(&e), bar_plot(&e));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut e = explanation(vec![1.0]);
        e.feature_names[0] = "a<b&c".to_string();
        let svg = bar_plot(&e);
        assert!(svg.contains("a&lt;b&amp;c"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn test_data_uri() {
        let uri = svg_data_uri("<svg a=\"1\"></svg>");
        assert!(uri.starts_with("data:image/svg+xml;charset=utf-8,"));
        assert!(!uri.contains('<'));
        assert!(!uri.contains('"'));
    }
}
