use std::path::Path;

use anyhow::{Context, Result};
use plotters::prelude::*;

use crate::model::{ProjectedRow, SeedStats};
use crate::stats::{mean, std_dev};

/// Chart styling for one rendering session. Passed explicitly to every
/// render call; there is no process-wide style state.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub font: &'static str,
    pub caption_size: u32,
    pub pair_dims: (u32, u32),
    pub quad_dims: (u32, u32),
    pub single_dims: (u32, u32),
    pub no_cover: RGBColor,
    pub with_cover: RGBColor,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font: "sans-serif",
            caption_size: 22,
            pair_dims: (1400, 600),
            quad_dims: (1400, 1000),
            single_dims: (1000, 600),
            no_cover: RED,
            with_cover: BLUE,
        }
    }
}

impl ChartStyle {
    fn cover_color(&self, cover: bool) -> RGBColor {
        if cover { self.with_cover } else { self.no_cover }
    }
}

fn cover_label(cover: bool) -> &'static str {
    if cover { "With Cover" } else { "No Cover" }
}

/// Distinct x values in ascending order.
fn distinct_sorted(values: impl Iterator<Item = u64>) -> Vec<u64> {
    let mut distinct: Vec<u64> = values.collect();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
}

/// (x, mean, std) per distinct x, for rows matching `filter`.
fn series_by<FX, FY, FF>(rows: &[ProjectedRow], x_of: FX, y_of: FY, filter: FF) -> Vec<(f64, f64, f64)>
where
    FX: Fn(&ProjectedRow) -> u64,
    FY: Fn(&ProjectedRow) -> f64,
    FF: Fn(&ProjectedRow) -> bool,
{
    let selected: Vec<&ProjectedRow> = rows.iter().filter(|r| filter(r)).collect();
    distinct_sorted(selected.iter().map(|r| x_of(r)))
        .into_iter()
        .map(|x| {
            let ys: Vec<f64> = selected
                .iter()
                .filter(|r| x_of(r) == x)
                .map(|r| y_of(r))
                .collect();
            (x as f64, mean(&ys), std_dev(&ys))
        })
        .collect()
}

fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    let pad = (hi - lo).abs() * 0.05 + 1e-6;
    (lo - pad)..(hi + pad)
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_mean_std_lines(
    area: &Area<'_>,
    style: &ChartStyle,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    x_range: std::ops::Range<f64>,
    y_range: std::ops::Range<f64>,
    series: &[(bool, Vec<(f64, f64, f64)>)],
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(caption, (style.font, style.caption_size).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    for (cover, points) in series {
        if points.is_empty() {
            continue;
        }
        let color = style.cover_color(*cover);

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|(x, m, _)| (*x, *m)),
                color.stroke_width(2),
            ))?
            .label(cover_label(*cover))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));

        chart.draw_series(
            points
                .iter()
                .map(|(x, m, _)| Circle::new((*x, *m), 4, color.filled())),
        )?;
        chart.draw_series(points.iter().map(|(x, m, s)| {
            ErrorBar::new_vertical(*x, m - s, *m, m + s, color.stroke_width(2), 8)
        }))?;
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    Ok(())
}

/// Two panels: adversary accuracy and graph-reconstruction F1 vs network
/// size, one series per cover flag, error bars showing std.
pub fn accuracy_vs_n(
    path: &Path,
    rows: &[ProjectedRow],
    style: &ChartStyle,
    seed: &str,
) -> Result<()> {
    let root = BitMapBackend::new(path, style.pair_dims).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let x_range = padded_range(rows.iter().map(|r| r.n as f64));

    let accuracy: Vec<(bool, Vec<(f64, f64, f64)>)> = [false, true]
        .into_iter()
        .map(|cover| {
            (
                cover,
                series_by(rows, |r| r.n, |r| r.accuracy, |r| r.cover_enabled == cover),
            )
        })
        .collect();
    draw_mean_std_lines(
        &panels[0],
        style,
        &format!("Message Inference Accuracy vs Network Size (Seed {seed})"),
        "Network Size (N)",
        "Adversary Accuracy",
        x_range.clone(),
        0.0..1.0,
        &accuracy,
    )?;

    let graph_f1: Vec<(bool, Vec<(f64, f64, f64)>)> = [false, true]
        .into_iter()
        .map(|cover| {
            (
                cover,
                series_by(rows, |r| r.n, |r| r.graph_f1, |r| r.cover_enabled == cover),
            )
        })
        .collect();
    draw_mean_std_lines(
        &panels[1],
        style,
        &format!("Graph Reconstruction Quality vs Network Size (Seed {seed})"),
        "Network Size (N)",
        "Graph Reconstruction F1 Score",
        x_range,
        0.0..1.0,
        &graph_f1,
    )?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Grouped bars: mean accuracy per observer placement, split by cover flag.
pub fn accuracy_by_placement(
    path: &Path,
    rows: &[ProjectedRow],
    style: &ChartStyle,
    seed: &str,
) -> Result<()> {
    let mut placements: Vec<String> = Vec::new();
    for row in rows {
        if !placements.contains(&row.placement) {
            placements.push(row.placement.clone());
        }
    }

    let root = BitMapBackend::new(path, style.single_dims).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = placements.len() as f64 - 0.4;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Impact of Observer Placement (Seed {seed})"),
            (style.font, style.caption_size).into_font(),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(-0.6..x_max, 0.0..1.0_f64)?;

    let labels = placements.clone();
    chart
        .configure_mesh()
        .x_desc("Observer Placement Strategy")
        .y_desc("Adversary Accuracy")
        .x_labels(placements.len().max(1))
        .x_label_formatter(&move |x| {
            let idx = x.round();
            if idx < 0.0 {
                return String::new();
            }
            labels
                .get(idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .draw()?;

    let bar_width = 0.35;
    for (series_idx, cover) in [false, true].into_iter().enumerate() {
        let color = style.cover_color(cover);
        let offset = if series_idx == 0 { -bar_width } else { 0.0 };

        let mut bars = Vec::new();
        let mut error_bars = Vec::new();
        for (idx, placement) in placements.iter().enumerate() {
            let values: Vec<f64> = rows
                .iter()
                .filter(|r| r.cover_enabled == cover && &r.placement == placement)
                .map(|r| r.accuracy)
                .collect();
            if values.is_empty() {
                continue;
            }
            let m = mean(&values);
            let s = std_dev(&values);
            let x0 = idx as f64 + offset;
            bars.push(Rectangle::new([(x0, 0.0), (x0 + bar_width, m)], color.mix(0.8).filled()));
            error_bars.push(ErrorBar::new_vertical(
                x0 + bar_width / 2.0,
                (m - s).max(0.0),
                m,
                m + s,
                BLACK.stroke_width(1),
                6,
            ));
        }

        chart
            .draw_series(bars)?
            .label(cover_label(cover))
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        chart.draw_series(error_bars)?;
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))
}

fn draw_scatter(
    area: &Area<'_>,
    style: &ChartStyle,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[(f64, f64, RGBColor)],
    x_range: std::ops::Range<f64>,
    y_range: std::ops::Range<f64>,
) -> Result<()> {
    let mut chart = ChartBuilder::on(area)
        .caption(caption, (style.font, style.caption_size).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;
    chart.draw_series(
        points
            .iter()
            .map(|(x, y, color)| Circle::new((*x, *y), 4, color.mix(0.6).filled())),
    )?;

    Ok(())
}

/// Box summary (min, quartiles, max) of a sample, drawn by hand so the
/// panel shares the float coordinate system of its siblings.
fn box_summary(values: &mut Vec<f64>) -> Option<(f64, f64, f64, f64, f64)> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let quantile = |q: f64| -> f64 {
        let pos = q * (values.len() - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;
        let weight = pos - lower as f64;
        values[lower] * (1.0 - weight) + values[upper] * weight
    };
    Some((
        values[0],
        quantile(0.25),
        quantile(0.5),
        quantile(0.75),
        values[values.len() - 1],
    ))
}

/// Four panels: dummy-fraction scatter, accuracy distribution by cover
/// flag, message-overhead bars by N, and privacy preserved vs N.
pub fn cover_traffic_impact(
    path: &Path,
    rows: &[ProjectedRow],
    style: &ChartStyle,
    seed: &str,
) -> Result<()> {
    let root = BitMapBackend::new(path, style.quad_dims).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Cover Traffic Analysis (Seed {seed})"),
        (style.font, style.caption_size + 4).into_font(),
    )?;
    let panels = root.split_evenly((2, 2));

    let cover_rows: Vec<&ProjectedRow> = rows.iter().filter(|r| r.cover_enabled).collect();

    // 1. Dummy fraction vs accuracy.
    let points: Vec<(f64, f64, RGBColor)> = cover_rows
        .iter()
        .map(|r| (r.dummy_fraction, r.accuracy, style.with_cover))
        .collect();
    draw_scatter(
        &panels[0],
        style,
        "Accuracy vs Cover Traffic Volume",
        "Fraction of Dummy Messages",
        "Adversary Accuracy",
        &points,
        padded_range(points.iter().map(|(x, _, _)| *x)),
        0.0..1.0,
    )?;

    // 2. Accuracy distribution per cover flag.
    {
        let mut chart = ChartBuilder::on(&panels[1])
            .caption("Accuracy Distribution", (style.font, style.caption_size).into_font())
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.7..1.7_f64, 0.0..1.0_f64)?;

        chart
            .configure_mesh()
            .y_desc("Adversary Accuracy")
            .x_labels(2)
            .x_label_formatter(&|x| match x.round() as i64 {
                0 => cover_label(false).to_string(),
                1 => cover_label(true).to_string(),
                _ => String::new(),
            })
            .draw()?;

        for (idx, cover) in [false, true].into_iter().enumerate() {
            let mut values: Vec<f64> = rows
                .iter()
                .filter(|r| r.cover_enabled == cover)
                .map(|r| r.accuracy)
                .collect();
            let Some((lo, q1, median, q3, hi)) = box_summary(&mut values) else {
                continue;
            };

            let x = idx as f64;
            let color = style.cover_color(cover);
            chart.draw_series([Rectangle::new(
                [(x - 0.2, q1), (x + 0.2, q3)],
                color.mix(0.5).filled(),
            )])?;
            chart.draw_series([
                PathElement::new(vec![(x - 0.2, median), (x + 0.2, median)], BLACK.stroke_width(2)),
                PathElement::new(vec![(x, lo), (x, q1)], BLACK),
                PathElement::new(vec![(x, q3), (x, hi)], BLACK),
            ])?;
        }
    }

    // 3. Message overhead from cover traffic.
    {
        let ns = distinct_sorted(cover_rows.iter().map(|r| r.n));
        let mut totals = Vec::new();
        let mut dummies = Vec::new();
        for n in &ns {
            let total: Vec<f64> = cover_rows
                .iter()
                .filter(|r| r.n == *n)
                .map(|r| r.total_messages as f64)
                .collect();
            let dummy: Vec<f64> = cover_rows
                .iter()
                .filter(|r| r.n == *n)
                .map(|r| r.dummy_messages as f64)
                .collect();
            totals.push(mean(&total));
            dummies.push(mean(&dummy));
        }

        let y_max = totals.iter().copied().fold(1.0_f64, f64::max) * 1.1;
        let x_max = ns.len().max(1) as f64 - 0.4;
        let mut chart = ChartBuilder::on(&panels[2])
            .caption(
                "Message Overhead from Cover Traffic",
                (style.font, style.caption_size).into_font(),
            )
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.6..x_max, 0.0..y_max)?;

        let tick_labels: Vec<String> = ns.iter().map(u64::to_string).collect();
        chart
            .configure_mesh()
            .x_desc("Network Size (N)")
            .y_desc("Number of Messages")
            .x_labels(ns.len().max(1))
            .x_label_formatter(&move |x| {
                let idx = x.round();
                if idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .draw()?;

        chart
            .draw_series(totals.iter().enumerate().map(|(idx, total)| {
                let x = idx as f64;
                Rectangle::new([(x - 0.4, 0.0), (x, *total)], style.no_cover.mix(0.8).filled())
            }))?
            .label("Total")
            .legend({
                let color = style.no_cover;
                move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
        chart
            .draw_series(dummies.iter().enumerate().map(|(idx, dummy)| {
                let x = idx as f64;
                Rectangle::new([(x, 0.0), (x + 0.4, *dummy)], style.with_cover.mix(0.8).filled())
            }))?
            .label("Dummy")
            .legend({
                let color = style.with_cover;
                move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;
    }

    // 4. Privacy preserved (1 - mean accuracy) vs N.
    let preserved: Vec<(bool, Vec<(f64, f64, f64)>)> = [false, true]
        .into_iter()
        .map(|cover| {
            let series = series_by(rows, |r| r.n, |r| r.accuracy, |r| r.cover_enabled == cover)
                .into_iter()
                .map(|(x, m, _)| (x, 1.0 - m, 0.0))
                .collect();
            (cover, series)
        })
        .collect();
    draw_mean_std_lines(
        &panels[3],
        style,
        "Privacy Preservation",
        "Network Size (N)",
        "Privacy Preserved (1 - Accuracy)",
        padded_range(rows.iter().map(|r| r.n as f64)),
        0.0..1.0,
        &preserved,
    )?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Four panels: precision/recall scatter colored by N, F1 by configuration,
/// confidence vs F1, and dual-axis edge detection vs N.
pub fn graph_reconstruction(
    path: &Path,
    rows: &[ProjectedRow],
    style: &ChartStyle,
    seed: &str,
) -> Result<()> {
    let root = BitMapBackend::new(path, style.quad_dims).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Graph Reconstruction Analysis (Seed {seed})"),
        (style.font, style.caption_size + 4).into_font(),
    )?;
    let panels = root.split_evenly((2, 2));

    // 1. Precision vs recall, colored by network size.
    let n_lo = rows.iter().map(|r| r.n).min().unwrap_or(0) as f64;
    let n_hi = rows.iter().map(|r| r.n).max().unwrap_or(0) as f64;
    let shade = |n: u64| -> RGBColor {
        let t = if n_hi > n_lo {
            (n as f64 - n_lo) / (n_hi - n_lo)
        } else {
            0.0
        };
        RGBColor(
            (60.0 + 180.0 * t) as u8,
            (80.0 * (1.0 - t)) as u8,
            (220.0 * (1.0 - t) + 40.0) as u8,
        )
    };
    let points: Vec<(f64, f64, RGBColor)> = rows
        .iter()
        .map(|r| (r.graph_recall, r.graph_precision, shade(r.n)))
        .collect();
    draw_scatter(
        &panels[0],
        style,
        "Graph Reconstruction: Precision vs Recall",
        "Recall",
        "Precision",
        &points,
        0.0..1.0,
        0.0..1.0,
    )?;

    // 2. F1 per placement/cover configuration.
    {
        let mut configs: Vec<(String, bool)> = Vec::new();
        for row in rows {
            let key = (row.placement.clone(), row.cover_enabled);
            if !configs.contains(&key) {
                configs.push(key);
            }
        }

        let x_max = configs.len() as f64 - 0.4;
        let mut chart = ChartBuilder::on(&panels[1])
            .caption(
                "Graph Reconstruction Quality by Configuration",
                (style.font, style.caption_size).into_font(),
            )
            .margin(10)
            .x_label_area_size(60)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.6..x_max.max(0.6), 0.0..1.0_f64)?;

        let tick_labels: Vec<String> = configs
            .iter()
            .map(|(placement, cover)| format!("{placement}/{}", cover_label(*cover)))
            .collect();
        chart
            .configure_mesh()
            .y_desc("F1 Score")
            .x_labels(configs.len().max(1))
            .x_label_formatter(&move |x| {
                let idx = x.round();
                if idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .draw()?;

        let mut bars = Vec::new();
        let mut error_bars = Vec::new();
        for (idx, (placement, cover)) in configs.iter().enumerate() {
            let values: Vec<f64> = rows
                .iter()
                .filter(|r| &r.placement == placement && r.cover_enabled == *cover)
                .map(|r| r.graph_f1)
                .collect();
            let m = mean(&values);
            let s = std_dev(&values);
            let x = idx as f64;
            bars.push(Rectangle::new(
                [(x - 0.3, 0.0), (x + 0.3, m)],
                style.cover_color(*cover).mix(0.8).filled(),
            ));
            error_bars.push(ErrorBar::new_vertical(
                x,
                (m - s).max(0.0),
                m,
                m + s,
                BLACK.stroke_width(1),
                6,
            ));
        }
        chart.draw_series(bars)?;
        chart.draw_series(error_bars)?;
    }

    // 3. Confidence vs reconstruction quality.
    let points: Vec<(f64, f64, RGBColor)> = rows
        .iter()
        .map(|r| (r.avg_confidence, r.graph_f1, style.with_cover))
        .collect();
    draw_scatter(
        &panels[2],
        style,
        "Reconstruction Confidence vs Quality",
        "Average Confidence",
        "F1 Score",
        &points,
        padded_range(points.iter().map(|(x, _, _)| *x)),
        padded_range(points.iter().map(|(_, y, _)| *y)),
    )?;

    // 4. Estimated edges (left axis) and recall (right axis) vs N.
    {
        let edges = series_by(rows, |r| r.n, |r| r.estimated_edges as f64, |_| true);
        let recall = series_by(rows, |r| r.n, |r| r.graph_recall, |_| true);

        let x_range = padded_range(rows.iter().map(|r| r.n as f64));
        let y_range = padded_range(edges.iter().map(|(_, m, _)| *m));
        let mut chart = ChartBuilder::on(&panels[3])
            .caption("Edge Detection Performance", (style.font, style.caption_size).into_font())
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .right_y_label_area_size(55)
            .build_cartesian_2d(x_range.clone(), y_range)?
            .set_secondary_coord(x_range, 0.0..1.0_f64);

        chart
            .configure_mesh()
            .x_desc("Network Size (N)")
            .y_desc("Number of Estimated Edges")
            .draw()?;
        chart.configure_secondary_axes().y_desc("Recall").draw()?;

        let edge_color = style.with_cover;
        chart
            .draw_series(LineSeries::new(
                edges.iter().map(|(x, m, _)| (*x, *m)),
                edge_color.stroke_width(2),
            ))?
            .label("Estimated Edges")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], edge_color));

        let recall_color = style.no_cover;
        chart
            .draw_secondary_series(LineSeries::new(
                recall.iter().map(|(x, m, _)| (*x, *m)),
                recall_color.stroke_width(2),
            ))?
            .label("Recall")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], recall_color));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()?;
    }

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Two panels: accuracy and routing path length vs hop limit. The caller
/// skips this chart when Hmax does not vary.
pub fn hmax_impact(
    path: &Path,
    rows: &[ProjectedRow],
    style: &ChartStyle,
    seed: &str,
) -> Result<()> {
    let root = BitMapBackend::new(path, style.pair_dims).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let x_range = padded_range(rows.iter().map(|r| r.hmax as f64));

    let accuracy: Vec<(bool, Vec<(f64, f64, f64)>)> = [false, true]
        .into_iter()
        .map(|cover| {
            (
                cover,
                series_by(rows, |r| r.hmax, |r| r.accuracy, |r| r.cover_enabled == cover),
            )
        })
        .collect();
    draw_mean_std_lines(
        &panels[0],
        style,
        &format!("Impact of Hop Limit on Privacy (Seed {seed})"),
        "Hmax (Max Hops)",
        "Adversary Accuracy",
        x_range.clone(),
        0.0..1.0,
        &accuracy,
    )?;

    let path_length: Vec<(bool, Vec<(f64, f64, f64)>)> = [false, true]
        .into_iter()
        .map(|cover| {
            (
                cover,
                series_by(
                    rows,
                    |r| r.hmax,
                    |r| r.avg_path_length,
                    |r| r.cover_enabled == cover,
                ),
            )
        })
        .collect();
    let y_hi = path_length
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(_, m, s)| m + s))
        .fold(1.0_f64, f64::max);
    draw_mean_std_lines(
        &panels[1],
        style,
        &format!("Routing Path Length vs Hop Limit (Seed {seed})"),
        "Hmax (Max Hops)",
        "Average Path Length",
        x_range,
        0.0..y_hi * 1.1,
        &path_length,
    )?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Combined view: mean accuracy and mean graph F1 per seed, as bars with
/// std error bars.
pub fn seed_variation(path: &Path, per_seed: &[SeedStats], style: &ChartStyle) -> Result<()> {
    let root = BitMapBackend::new(path, style.pair_dims).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    let seeds: Vec<String> = per_seed.iter().map(|s| s.seed.clone()).collect();

    let draw_panel = |area: &Area<'_>,
                      caption: &str,
                      y_desc: &str,
                      color: RGBColor,
                      values: Vec<(f64, f64)>|
     -> Result<()> {
        let x_max = seeds.len() as f64 - 0.4;
        let mut chart = ChartBuilder::on(area)
            .caption(caption, (style.font, style.caption_size).into_font())
            .margin(10)
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(-0.6..x_max.max(0.6), 0.0..1.0_f64)?;

        let tick_labels = seeds.clone();
        chart
            .configure_mesh()
            .x_desc("Seed")
            .y_desc(y_desc)
            .x_labels(seeds.len().max(1))
            .x_label_formatter(&move |x| {
                let idx = x.round();
                if idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(values.iter().enumerate().map(|(idx, (m, _))| {
            let x = idx as f64;
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *m)], color.mix(0.8).filled())
        }))?;
        chart.draw_series(values.iter().enumerate().map(|(idx, (m, s))| {
            ErrorBar::new_vertical(idx as f64, (m - s).max(0.0), *m, m + s, BLACK.stroke_width(1), 6)
        }))?;

        Ok(())
    };

    draw_panel(
        &panels[0],
        "Accuracy Variation Across Seeds",
        "Mean Adversary Accuracy",
        style.with_cover,
        per_seed
            .iter()
            .map(|s| (s.accuracy_mean, s.accuracy_std))
            .collect(),
    )?;
    draw_panel(
        &panels[1],
        "Graph Reconstruction Variation Across Seeds",
        "Mean Graph F1 Score",
        RGBColor(40, 150, 70),
        per_seed
            .iter()
            .map(|s| (s.graph_f1_mean, s.graph_f1_std))
            .collect(),
    )?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))
}
