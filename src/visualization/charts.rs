//! Distribution, ROC and confusion matrix charts rendered to PNG bytes

use image::Rgb;

use super::canvas::{generate_palette, hsl_to_rgb, Canvas, AXIS, BLACK, GRID, WHITE};
use super::font;
use super::PlotConfig;
use crate::error::{CardError, Result};
use crate::training::{ConfusionMatrix, RocCurve};

const MARGIN_LEFT: i64 = 72;
const MARGIN_RIGHT: i64 = 24;
const MARGIN_TOP: i64 = 52;
const MARGIN_BOTTOM: i64 = 60;
const LABEL_SCALE: i64 = 2;
const TITLE_SCALE: i64 = 3;

/// Plot area in pixels plus the data range it shows
struct Frame {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    fn new(config: &PlotConfig, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: config.width as i64 - MARGIN_RIGHT,
            bottom: config.height as i64 - MARGIN_BOTTOM,
            x_range,
            y_range,
        }
    }

    fn px(&self, x: f64) -> i64 {
        let (lo, hi) = self.x_range;
        let t = if hi > lo { (x - lo) / (hi - lo) } else { 0.5 };
        self.left + (t * (self.right - self.left) as f64).round() as i64
    }

    fn py(&self, y: f64) -> i64 {
        let (lo, hi) = self.y_range;
        let t = if hi > lo { (y - lo) / (hi - lo) } else { 0.5 };
        self.bottom - (t * (self.bottom - self.top) as f64).round() as i64
    }
}

fn check_size(config: &PlotConfig) -> Result<()> {
    if config.width < 200 || config.height < 160 {
        return Err(CardError::PlotError(format!(
            "plot size {}x{} is below the 200x160 minimum",
            config.width, config.height
        )));
    }
    Ok(())
}

/// Tick positions on a 1-2-5 grid covering `[lo, hi]`
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    if !(hi > lo) {
        return vec![lo];
    }
    let raw_step = (hi - lo) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn format_tick(value: f64, ticks: &[f64]) -> String {
    let step = ticks.windows(2).map(|w| w[1] - w[0]).next().unwrap_or(1.0);
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{:.*}", decimals, value)
}

fn draw_title(canvas: &mut Canvas, config: &PlotConfig, title: &str) {
    canvas.draw_text_centered(config.width as i64 / 2, 14, title, BLACK, TITLE_SCALE);
}

fn draw_axes(canvas: &mut Canvas, frame: &Frame, x_label: &str, y_label: &str) {
    let x_ticks = nice_ticks(frame.x_range.0, frame.x_range.1, 6);
    let y_ticks = nice_ticks(frame.y_range.0, frame.y_range.1, 5);
    let text_h = Canvas::text_height(LABEL_SCALE);

    for &t in &y_ticks {
        let y = frame.py(t);
        canvas.draw_line(frame.left + 1, y, frame.right, y, GRID, 1);
        canvas.draw_line(frame.left - 5, y, frame.left, y, AXIS, 1);
        let label = format_tick(t, &y_ticks);
        let w = font::text_width(&label, LABEL_SCALE);
        canvas.draw_text(frame.left - 9 - w, y - text_h / 2, &label, AXIS, LABEL_SCALE);
    }
    for &t in &x_ticks {
        let x = frame.px(t);
        canvas.draw_line(x, frame.bottom, x, frame.bottom + 5, AXIS, 1);
        let label = format_tick(t, &x_ticks);
        canvas.draw_text_centered(x, frame.bottom + 9, &label, AXIS, LABEL_SCALE);
    }

    canvas.draw_line(frame.left, frame.top, frame.left, frame.bottom, AXIS, 1);
    canvas.draw_line(frame.left, frame.bottom, frame.right, frame.bottom, AXIS, 1);

    let mid_x = (frame.left + frame.right) / 2;
    canvas.draw_text_centered(mid_x, frame.bottom + 14 + text_h * 2, x_label, BLACK, LABEL_SCALE);
    canvas.draw_text(frame.left, frame.top - text_h - 6, y_label, BLACK, LABEL_SCALE);
}

fn draw_legend(canvas: &mut Canvas, frame: &Frame, entries: &[(String, Rgb<u8>)], alpha: f32) {
    let text_h = Canvas::text_height(LABEL_SCALE);
    let widest = entries
        .iter()
        .map(|(name, _)| font::text_width(name, LABEL_SCALE))
        .max()
        .unwrap_or(0);
    let x = frame.right - widest - 28;
    for (i, (name, color)) in entries.iter().enumerate() {
        let y = frame.top + 8 + i as i64 * (text_h + 8);
        canvas.blend_rect(x, y, x + text_h, y + text_h, *color, alpha);
        canvas.draw_text(x + text_h + 8, y, name, BLACK, LABEL_SCALE);
    }
}

/// Bin count by numpy's "auto" rule: the smaller of the Sturges and
/// Freedman-Diaconis bin widths, falling back to Sturges when the IQR is zero.
pub fn auto_bin_count(values: &[f64]) -> usize {
    let n = values.len();
    if n < 2 {
        return 1;
    }
    let (min, max) = min_max(values);
    let range = max - min;
    if range <= 0.0 {
        return 1;
    }

    let sturges_width = range / ((n as f64).log2() + 1.0);
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
    let fd_width = 2.0 * iqr / (n as f64).cbrt();

    let width = if fd_width > 0.0 {
        fd_width.min(sturges_width)
    } else {
        sturges_width
    };
    ((range / width).ceil() as usize).max(1)
}

/// Linear-interpolated percentile of sorted data
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Equal-width bin edges spanning the data
pub fn histogram_edges(values: &[f64]) -> Vec<f64> {
    let (min, max) = min_max(values);
    if !(max > min) {
        return vec![min - 0.5, min + 0.5];
    }
    let bins = auto_bin_count(values);
    let width = (max - min) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect()
}

fn bin_index(value: f64, edges: &[f64]) -> usize {
    let bins = edges.len() - 1;
    let (lo, hi) = (edges[0], edges[bins]);
    let t = ((value - lo) / (hi - lo) * bins as f64).floor();
    (t.max(0.0) as usize).min(bins - 1)
}

/// Histogram of one feature with one translucent layer per class
pub fn distribution_plot(
    values: &[f64],
    labels: &[f64],
    class_names: &[String],
    feature_name: &str,
    title: &str,
    config: &PlotConfig,
) -> Result<Vec<u8>> {
    check_size(config)?;
    if values.is_empty() {
        return Err(CardError::PlotError(format!("no values to plot for '{}'", feature_name)));
    }
    if values.len() != labels.len() {
        return Err(CardError::PlotError(format!(
            "{} values but {} labels for '{}'",
            values.len(),
            labels.len(),
            feature_name
        )));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(CardError::PlotError(format!("non-finite value in '{}'", feature_name)));
    }

    let mut classes: Vec<f64> = labels.to_vec();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup();

    let edges = histogram_edges(values);
    let bins = edges.len() - 1;
    let mut counts = vec![vec![0usize; bins]; classes.len()];
    for (&v, &label) in values.iter().zip(labels.iter()) {
        let class = classes.iter().position(|&c| c == label).unwrap_or(0);
        counts[class][bin_index(v, &edges)] += 1;
    }
    let max_count = counts.iter().flatten().copied().max().unwrap_or(0).max(1);

    let mut canvas = Canvas::new(config.width, config.height, WHITE);
    let frame = Frame::new(
        config,
        (edges[0], edges[bins]),
        (0.0, max_count as f64 * 1.1),
    );
    draw_title(&mut canvas, config, title);
    draw_axes(&mut canvas, &frame, feature_name, "COUNT");

    let colors = generate_palette(classes.len());
    let alpha = 0.5;
    for (class_counts, color) in counts.iter().zip(colors.iter()) {
        for (bin, &count) in class_counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let x0 = frame.px(edges[bin]);
            let x1 = frame.px(edges[bin + 1]) - 1;
            canvas.blend_rect(x0, frame.py(count as f64), x1, frame.bottom - 1, *color, alpha);
        }
    }

    let legend: Vec<(String, Rgb<u8>)> = classes
        .iter()
        .zip(colors.iter())
        .map(|(&c, &color)| {
            let name = class_names
                .get(c as usize)
                .cloned()
                .unwrap_or_else(|| c.to_string());
            (name, color)
        })
        .collect();
    draw_legend(&mut canvas, &frame, &legend, alpha);

    canvas.to_png()
}

/// ROC curve with the chance diagonal and the AUC in the lower right
pub fn roc_plot(curve: &RocCurve, auc: f64, title: &str, config: &PlotConfig) -> Result<Vec<u8>> {
    check_size(config)?;
    if curve.fpr.len() < 2 || curve.fpr.len() != curve.tpr.len() {
        return Err(CardError::PlotError(
            "ROC curve needs at least two matching (fpr, tpr) points".to_string(),
        ));
    }

    let mut canvas = Canvas::new(config.width, config.height, WHITE);
    let frame = Frame::new(config, (0.0, 1.0), (0.0, 1.0));
    draw_title(&mut canvas, config, title);
    draw_axes(&mut canvas, &frame, "FALSE POSITIVE RATE", "TRUE POSITIVE RATE");

    canvas.draw_dashed_line(frame.px(0.0), frame.py(0.0), frame.px(1.0), frame.py(1.0), AXIS, 6);

    let color = generate_palette(1)[0];
    for (f, t) in curve.fpr.windows(2).zip(curve.tpr.windows(2)) {
        canvas.draw_line(frame.px(f[0]), frame.py(t[0]), frame.px(f[1]), frame.py(t[1]), color, 3);
    }

    let label = format!("AUC = {:.2}", auc);
    let text_h = Canvas::text_height(LABEL_SCALE);
    let w = font::text_width(&label, LABEL_SCALE);
    canvas.draw_text(frame.right - w - 12, frame.bottom - text_h - 12, &label, BLACK, LABEL_SCALE);

    canvas.to_png()
}

/// 2x2 heat map of a confusion matrix with counts printed in each cell
pub fn confusion_matrix_plot(
    matrix: &ConfusionMatrix,
    class_names: &[String],
    title: &str,
    config: &PlotConfig,
) -> Result<Vec<u8>> {
    check_size(config)?;

    let mut canvas = Canvas::new(config.width, config.height, WHITE);
    draw_title(&mut canvas, config, title);

    let text_h = Canvas::text_height(LABEL_SCALE);
    let available_w = config.width as i64 - MARGIN_LEFT - MARGIN_RIGHT - 80;
    let available_h = config.height as i64 - MARGIN_TOP - MARGIN_BOTTOM - 20;
    let cell = (available_w.min(available_h) / 2).max(20);
    let left = MARGIN_LEFT + 80 + (available_w - 2 * cell) / 2;
    let top = MARGIN_TOP + 20;

    let max_count = matrix.max_count().max(1) as f32;
    let name_of = |i: usize| class_names.get(i).cloned().unwrap_or_else(|| i.to_string());

    for actual in 0..2 {
        for predicted in 0..2 {
            let count = matrix.counts[actual][predicted];
            let intensity = count as f32 / max_count;
            let fill = hsl_to_rgb(215.0, 0.6, 0.95 - 0.6 * intensity);
            let x0 = left + predicted as i64 * cell;
            let y0 = top + actual as i64 * cell;
            canvas.fill_rect(x0, y0, x0 + cell - 1, y0 + cell - 1, fill);
            canvas.stroke_rect(x0, y0, x0 + cell - 1, y0 + cell - 1, WHITE);

            let ink = if intensity > 0.5 { WHITE } else { BLACK };
            let count_scale = 4;
            canvas.draw_text_centered(
                x0 + cell / 2,
                y0 + cell / 2 - Canvas::text_height(count_scale) / 2,
                &count.to_string(),
                ink,
                count_scale,
            );
        }
    }

    for i in 0..2 {
        let name = name_of(i);
        canvas.draw_text_centered(left + i as i64 * cell + cell / 2, top + 2 * cell + 8, &name, BLACK, LABEL_SCALE);
        let w = font::text_width(&name, LABEL_SCALE);
        canvas.draw_text(left - w - 10, top + i as i64 * cell + cell / 2 - text_h / 2, &name, BLACK, LABEL_SCALE);
    }
    canvas.draw_text_centered(left + cell, top + 2 * cell + 16 + text_h, "PREDICTED LABEL", BLACK, LABEL_SCALE);
    canvas.draw_text(MARGIN_LEFT / 2, top - text_h - 6, "TRUE LABEL", BLACK, LABEL_SCALE);

    canvas.to_png()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::encode::is_png;

    fn config() -> PlotConfig {
        PlotConfig::default()
    }

    #[test]
    fn test_auto_bins_matches_numpy() {
        let values: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        assert_eq!(auto_bin_count(&values), 8);
    }

    #[test]
    fn test_constant_values_single_bin() {
        assert_eq!(auto_bin_count(&[3.0, 3.0, 3.0]), 1);
        assert_eq!(histogram_edges(&[3.0, 3.0]), vec![2.5, 3.5]);
    }

    #[test]
    fn test_edges_cover_range() {
        let values = [1.0, 2.0, 2.5, 7.0, 9.0, 10.0];
        let edges = histogram_edges(&values);
        assert_eq!(edges[0], 1.0);
        assert_eq!(*edges.last().unwrap(), 10.0);
        assert_eq!(bin_index(10.0, &edges), edges.len() - 2);
        assert_eq!(bin_index(1.0, &edges), 0);
    }

    #[test]
    fn test_nice_ticks() {
        let unit = nice_ticks(0.0, 1.0, 5);
        assert_eq!(unit.len(), 6);
        assert!((unit[1] - 0.2).abs() < 1e-12);
        assert!((unit[5] - 1.0).abs() < 1e-12);
        let ticks = nice_ticks(6.98, 28.11, 6);
        assert_eq!(ticks.first(), Some(&10.0));
        assert_eq!(ticks.last(), Some(&25.0));
    }

    #[test]
    fn test_distribution_plot_png() {
        let values: Vec<f64> = (0..60).map(|i| (i % 20) as f64 + if i % 2 == 0 { 5.0 } else { 0.0 }).collect();
        let labels: Vec<f64> = (0..60).map(|i| (i % 2) as f64).collect();
        let names = vec!["malignant".to_string(), "benign".to_string()];

        let png = distribution_plot(&values, &labels, &names, "MEAN RADIUS", "TRAIN", &config()).unwrap();
        assert!(is_png(&png));

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 640);
        assert_eq!(decoded.height(), 480);
    }

    #[test]
    fn test_distribution_plot_rejects_empty() {
        let result = distribution_plot(&[], &[], &[], "X", "T", &config());
        assert!(matches!(result, Err(CardError::PlotError(_))));
    }

    #[test]
    fn test_distribution_plot_rejects_mismatch() {
        let result = distribution_plot(&[1.0, 2.0], &[0.0], &[], "X", "T", &config());
        assert!(matches!(result, Err(CardError::PlotError(_))));
    }

    #[test]
    fn test_roc_plot_png() {
        let curve = RocCurve {
            fpr: vec![0.0, 0.0, 0.5, 1.0],
            tpr: vec![0.0, 0.5, 1.0, 1.0],
            thresholds: vec![f64::INFINITY, 0.9, 0.5, 0.1],
        };
        let png = roc_plot(&curve, curve.auc(), "ROC", &config()).unwrap();
        assert!(is_png(&png));
    }

    #[test]
    fn test_confusion_matrix_plot_png() {
        let matrix = ConfusionMatrix { counts: [[50, 3], [2, 88]] };
        let names = vec!["malignant".to_string(), "benign".to_string()];
        let png = confusion_matrix_plot(&matrix, &names, "CONFUSION MATRIX", &config()).unwrap();
        assert!(is_png(&png));
    }

    #[test]
    fn test_too_small_canvas_rejected() {
        let small = PlotConfig { width: 50, height: 50 };
        let matrix = ConfusionMatrix { counts: [[1, 0], [0, 1]] };
        assert!(confusion_matrix_plot(&matrix, &[], "CM", &small).is_err());
    }
}
