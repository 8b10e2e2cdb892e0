//! Boxplot comparison of leg latencies across providers (SVG).

use crate::domain::legs::LegMeasurement;
use crate::domain::topology::Leg;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

pub const PLOT_TITLE: &str = "Log-Scaled Time Delay Comparison Across Legs";

const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

/// Positive values of `leg` for `csp`. Log axes cannot show the rest.
fn plottable(measurements: &[LegMeasurement], csp: &str, leg: Leg) -> Vec<f64> {
    measurements
        .iter()
        .filter(|m| m.csp == csp)
        .filter_map(|m| m.leg(leg))
        .filter(|v| *v > 0.0)
        .collect()
}

fn ms_label(v: &f32) -> String {
    if *v >= 1.0 {
        format!("{:.0} ms", v)
    } else {
        format!("{:.2} ms", v)
    }
}

/// Renders one panel per leg with a boxplot per provider.
pub fn render_leg_boxplots(
    path: &Path,
    measurements: &[LegMeasurement],
    providers: &[String],
) -> Result<()> {
    let root = SVGBackend::new(path, (1200, 1200)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("Failed to prepare plot canvas: {}", e))?;
    let root = root
        .titled(PLOT_TITLE, ("sans-serif", 28))
        .map_err(|e| anyhow::anyhow!("Failed to draw plot title: {}", e))?;

    let panels = root.split_evenly((3, 2));
    for (leg, panel) in Leg::ALL.into_iter().zip(panels.iter()) {
        let series: Vec<(usize, &String, Vec<f64>)> = providers
            .iter()
            .enumerate()
            .map(|(i, csp)| (i, csp, plottable(measurements, csp, leg)))
            .filter(|(_, _, values)| !values.is_empty())
            .collect();

        let (lo, hi) = series
            .iter()
            .flat_map(|(_, _, values)| values.iter().copied())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .map(|(lo, hi)| ((lo * 0.8) as f32, (hi * 1.25) as f32))
            .unwrap_or((1.0, 10.0));

        let caption = if series.is_empty() {
            format!("{} (no data)", leg.label())
        } else {
            leg.label()
        };

        let mut chart = ChartBuilder::on(panel)
            .margin(10)
            .caption(caption, ("sans-serif", 20))
            .x_label_area_size(30)
            .y_label_area_size(70)
            .build_cartesian_2d(providers[..].into_segmented(), (lo..hi).log_scale())
            .map_err(|e| anyhow::anyhow!("Failed to build chart for {}: {}", leg, e))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|v: &SegmentValue<&String>| match v {
                SegmentValue::Exact(name) | SegmentValue::CenterOf(name) => name.to_string(),
                SegmentValue::Last => String::new(),
            })
            .y_label_formatter(&ms_label)
            .y_desc("Time delay")
            .draw()
            .map_err(|e| anyhow::anyhow!("Failed to draw axes for {}: {}", leg, e))?;

        chart
            .draw_series(series.iter().map(|(i, csp, values)| {
                let quartiles = Quartiles::new(values);
                Boxplot::new_vertical(SegmentValue::CenterOf(*csp), &quartiles)
                    .width(40)
                    .whisker_width(0.5)
                    .style(PALETTE[i % PALETTE.len()])
            }))
            .map_err(|e| anyhow::anyhow!("Failed to draw boxplots for {}: {}", leg, e))?;
    }

    root.present()
        .map_err(|e| anyhow::anyhow!("Failed to write plot to {}: {}", path.display(), e))?;
    Ok(())
}
