//! Chart rendering for method comparisons.
//!
//! Each chart shows one distribution glyph per method, drawn as quartile
//! box-and-whisker marks, with the method-type color grouping used across
//! the project's figures: benchmark methods in gray, the remaining methods
//! alternating between the single-GT and mean-GT colors.

use anyhow::{bail, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Gray used for benchmark methods.
pub const BENCHMARK_GRAY: RGBColor = RGBColor(0x98, 0x9e, 0x9a);

/// Red used for single-GT methods.
pub const SINGLE_GT_RED: RGBColor = RGBColor(0xff, 0x67, 0x67);

/// Green used for mean-GT methods.
pub const MEAN_GT_GREEN: RGBColor = RGBColor(0x8e, 0xdb, 0xa3);

/// Color for the method at `index`, with the first `benchmark_count`
/// methods shown as benchmarks and the rest alternating by position.
pub fn method_color(index: usize, benchmark_count: usize) -> RGBColor {
    if index < benchmark_count {
        BENCHMARK_GRAY
    } else if index % 2 == 0 {
        SINGLE_GT_RED
    } else {
        MEAN_GT_GREEN
    }
}

/// One comparison chart: a distribution per method.
#[derive(Debug, Clone)]
pub struct DistributionSpec {
    /// Chart title.
    pub title: String,
    /// X axis description.
    pub x_desc: String,
    /// Y axis description.
    pub y_desc: String,
    /// Per-method series, in display order.
    pub series: Vec<(String, Vec<f64>)>,
    /// How many leading series are benchmarks.
    pub benchmark_count: usize,
    /// Legend labels for the three method-type roles
    /// (benchmark, single GT, mean GT).
    pub roles: [String; 3],
    /// Mirror the y axis around zero (pairwise-difference charts) instead
    /// of starting at zero (variability charts).
    pub symmetric: bool,
}

impl DistributionSpec {
    /// Legend label for the series at `index`, attached only to the first
    /// series of each method-type role.
    fn role_label(&self, index: usize) -> Option<&str> {
        if index == 0 && self.benchmark_count > 0 {
            Some(self.roles[0].as_str())
        } else if index == self.benchmark_count {
            Some(self.roles[1].as_str())
        } else if index == self.benchmark_count + 1 {
            Some(self.roles[2].as_str())
        } else {
            None
        }
    }

    /// Y axis range: symmetric around zero or anchored at zero, with a
    /// small margin. The value axis is `f32` because that is what the
    /// box-and-whisker element draws in.
    fn y_range(&self) -> (f32, f32) {
        let max_abs = self
            .series
            .iter()
            .flat_map(|(_, values)| values.iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let max_abs = if max_abs > 0.0 { max_abs * 1.05 } else { 1.0 };
        if self.symmetric {
            (-max_abs as f32, max_abs as f32)
        } else {
            (0.0, max_abs as f32)
        }
    }

    /// Render this chart on its own canvas.
    pub fn render(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (900, 900)).into_drawing_area();
        root.fill(&WHITE)?;
        draw_distribution(&root, self)?;
        root.present()?;
        Ok(())
    }
}

/// Render several charts as a two-column panel grid on one canvas.
///
/// With an odd number of panels the last cell stays blank, mirroring the
/// layout of the per-contrast figure.
pub fn render_panel_grid(path: &Path, panels: &[DistributionSpec]) -> Result<()> {
    if panels.is_empty() {
        bail!("No panels to render");
    }

    let n_rows = panels.len().div_ceil(2) as u32;
    let root = BitMapBackend::new(path, (1200, n_rows * 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let cells = root.split_evenly((n_rows as usize, 2));
    for (panel, cell) in panels.iter().zip(cells.iter()) {
        draw_distribution(cell, panel)?;
    }

    root.present()?;
    Ok(())
}

/// Draw one distribution chart into a drawing area.
fn draw_distribution(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    spec: &DistributionSpec,
) -> Result<()> {
    if spec.series.is_empty() {
        bail!("Chart `{}` has no series", spec.title);
    }
    if spec.series.iter().any(|(_, values)| values.is_empty()) {
        bail!("Chart `{}` has an empty series", spec.title);
    }

    let labels: Vec<String> = spec.series.iter().map(|(name, _)| name.clone()).collect();
    let (y_min, y_max) = spec.y_range();

    let mut chart = ChartBuilder::on(area)
        .caption(&spec.title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(labels[..].into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(&spec.x_desc)
        .y_desc(&spec.y_desc)
        .axis_desc_style(("sans-serif", 16))
        .draw()?;

    for (index, (_, values)) in spec.series.iter().enumerate() {
        let color = method_color(index, spec.benchmark_count);
        let quartiles = Quartiles::new(values);

        let anno = chart.draw_series(std::iter::once(
            Boxplot::new_vertical(SegmentValue::CenterOf(&labels[index]), &quartiles)
                .width(25)
                .whisker_width(0.5)
                .style(color.filled()),
        ))?;

        if let Some(role) = spec.role_label(index) {
            anno.label(role).legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.filled())
            });
        }
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(series: Vec<(String, Vec<f64>)>, symmetric: bool) -> DistributionSpec {
        DistributionSpec {
            title: "test".to_string(),
            x_desc: "Methods".to_string(),
            y_desc: "value".to_string(),
            series,
            benchmark_count: 2,
            roles: [
                "Benchmark".to_string(),
                "Single GT".to_string(),
                "Mean GT".to_string(),
            ],
            symmetric,
        }
    }

    #[test]
    fn test_method_colors_follow_role_grouping() {
        assert_eq!(method_color(0, 2), BENCHMARK_GRAY);
        assert_eq!(method_color(1, 2), BENCHMARK_GRAY);
        assert_eq!(method_color(2, 2), SINGLE_GT_RED);
        assert_eq!(method_color(3, 2), MEAN_GT_GREEN);
        assert_eq!(method_color(4, 2), SINGLE_GT_RED);
    }

    #[test]
    fn test_role_labels_attach_once_per_role() {
        let s = spec(
            vec![
                ("a".into(), vec![1.0]),
                ("b".into(), vec![1.0]),
                ("c".into(), vec![1.0]),
                ("d".into(), vec![1.0]),
                ("e".into(), vec![1.0]),
            ],
            true,
        );
        assert_eq!(s.role_label(0), Some("Benchmark"));
        assert_eq!(s.role_label(1), None);
        assert_eq!(s.role_label(2), Some("Single GT"));
        assert_eq!(s.role_label(3), Some("Mean GT"));
        assert_eq!(s.role_label(4), None);
    }

    #[test]
    fn test_symmetric_y_range_mirrors_extremes() {
        let s = spec(vec![("a".into(), vec![-2.0, 10.0]), ("b".into(), vec![3.0])], true);
        let (lo, hi) = s.y_range();
        assert!((lo + 10.5).abs() < 1e-5);
        assert!((hi - 10.5).abs() < 1e-5);
    }

    #[test]
    fn test_variability_y_range_starts_at_zero() {
        let s = spec(vec![("a".into(), vec![1.0, 4.0])], false);
        let (lo, hi) = s.y_range();
        assert_eq!(lo, 0.0);
        assert!((hi - 4.2).abs() < 1e-5);
    }
}
