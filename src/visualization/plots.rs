//! PNG rendering with `plotters`
//!
//! Every public function writes one image and maps drawing failures into
//! [`Error::Plot`]. The private `draw_*` helpers work on a drawing area so
//! the same panel code serves single and split figures.

use std::error::Error as StdError;
use std::ops::Range;
use std::path::Path;

use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::analysis::phase::poincare_section;
use crate::analysis::spectrum::Spectrum;
use crate::analysis::velocity::{gaussian, histogram_density, maxwell_boltzmann_2d, Histogram, SpeedStats, VelocitySample};
use crate::analysis::linspace;
use crate::error::{Error, Result};
use crate::trajectory::layout::GasFrames;
use crate::trajectory::schema::{PendulumSeries, ResonanceSeries};

type DrawResult = std::result::Result<(), Box<dyn StdError>>;
type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const COLORS: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

/// Speed histogram bins for a single run
pub const SPEED_BINS: usize = 50;
/// Speed histogram bins when several runs share one chart
pub const COMPARISON_BINS: usize = 40;
/// Upper end of the frequency axis of spectrum plots, Hz
pub const FFT_MAX_FREQ: f64 = 5.0;
const RESONANCE_HIST_BINS: usize = 20;
const CURVE_POINTS: usize = 1000;

fn color(i: usize) -> RGBColor {
    COLORS[i % COLORS.len()]
}

fn bitmap_root(path: &Path, size: (u32, u32)) -> BitMapBackend<'_> {
    info!("write {}", path.display());
    BitMapBackend::new(path, size)
}

fn finish(path: &Path, result: DrawResult) -> Result<()> {
    result.map_err(|e| Error::Plot(format!("{}: {}", path.display(), e)))
}

/// Slug used in file names: lowercase, spaces to underscores
pub fn slug(label: &str) -> String {
    label.to_lowercase().replace(' ', "_")
}

/// Data range padded by 5%, widened when degenerate
fn padded_range<I: IntoIterator<Item = f64>>(values: I) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    if hi - lo < 1e-12 {
        let w = lo.abs().max(1.0) * 0.05;
        return (lo - w)..(hi + w);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad)..(hi + pad)
}

/// A labelled polyline
pub struct Line {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

impl Line {
    pub fn new(label: impl Into<String>, x: &[f64], y: &[f64]) -> Self {
        Self {
            label: label.into(),
            points: x.iter().copied().zip(y.iter().copied()).collect(),
        }
    }
}

struct Axes<'s> {
    caption: &'s str,
    x_desc: &'s str,
    y_desc: &'s str,
}

/// Overlaid lines with a legend, plus an optional dashed horizontal reference
fn draw_lines(area: &Area<'_>, axes: &Axes<'_>, lines: &[Line], reference: Option<f64>, x_range: Option<Range<f64>>) -> DrawResult {
    let x_range = x_range.unwrap_or_else(|| padded_range(lines.iter().flat_map(|l| l.points.iter().map(|p| p.0))));
    let y_range = padded_range(
        lines
            .iter()
            .flat_map(|l| l.points.iter().filter(|p| x_range.contains(&p.0)).map(|p| p.1))
            .chain(reference),
    );

    let mut chart = ChartBuilder::on(area)
        .caption(axes.caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range)?;

    chart
        .configure_mesh()
        .x_desc(axes.x_desc)
        .y_desc(axes.y_desc)
        .draw()?;

    if let Some(y) = reference {
        chart.draw_series(LineSeries::new(
            vec![(x_range.start, y), (x_range.end, y)],
            BLACK.mix(0.5),
        ))?;
    }

    for (i, line) in lines.iter().enumerate() {
        let c = color(i);
        let points = line.points.iter().copied().filter(|p| x_range.contains(&p.0));
        let anno = chart.draw_series(LineSeries::new(points, c.stroke_width(2)))?;
        if !line.label.is_empty() {
            anno.label(line.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));
        }
    }

    if lines.iter().any(|l| !l.label.is_empty()) {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

/// Point cloud, one color
fn draw_scatter(area: &Area<'_>, axes: &Axes<'_>, points: &[(f64, f64)], size: u32, c: RGBColor) -> DrawResult {
    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(axes.caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc(axes.x_desc)
        .y_desc(axes.y_desc)
        .draw()?;

    chart.draw_series(points.iter().map(|&p| Circle::new(p, size, c.filled())))?;
    Ok(())
}

/// Translucent histogram bars for each labelled histogram, plus reference curves
fn draw_histograms(area: &Area<'_>, axes: &Axes<'_>, hists: &[(String, Histogram)], curves: &[Line]) -> DrawResult {
    let x_range = padded_range(
        hists
            .iter()
            .flat_map(|(_, h)| h.edges.iter().copied())
            .chain(curves.iter().flat_map(|l| l.points.iter().map(|p| p.0))),
    );
    let y_max = hists
        .iter()
        .map(|(_, h)| h.max_density())
        .chain(curves.iter().flat_map(|l| l.points.iter().map(|p| p.1)))
        .fold(0.0, f64::max)
        .max(1e-9);

    let mut chart = ChartBuilder::on(area)
        .caption(axes.caption, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_max * 1.1)?;

    chart
        .configure_mesh()
        .x_desc(axes.x_desc)
        .y_desc(axes.y_desc)
        .draw()?;

    for (i, (label, h)) in hists.iter().enumerate() {
        let c = color(i);
        let bars = h.edges.windows(2).zip(h.density.iter()).map(move |(w, &d)| {
            Rectangle::new([(w[0], 0.0), (w[1], d)], c.mix(0.45).filled())
        });
        let anno = chart.draw_series(bars)?;
        if !label.is_empty() {
            anno.label(label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], c.mix(0.45).filled()));
        }
    }

    for line in curves {
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), BLACK.stroke_width(2)))?
            .label(line.label.as_str())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
    }

    let labelled = hists.iter().any(|(label, _)| !label.is_empty()) || !curves.is_empty();
    if labelled {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

// =========================================================================================
// Gas plots
// =========================================================================================

/// Kinetic energy against time over the relative error in percent
pub fn plot_energy(path: &Path, title: &str, t: &[f64], energy: &[f64], rel_err_pct: &[f64]) -> Result<()> {
    let e0 = energy.first().copied();
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (1200, 900)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((2, 1));

        draw_lines(
            &panels[0],
            &Axes { caption: title, x_desc: "t", y_desc: "total kinetic energy" },
            &[Line::new("E(t)", t, energy)],
            e0,
            None,
        )?;
        draw_lines(
            &panels[1],
            &Axes { caption: "relative energy error", x_desc: "t", y_desc: "relative error (%)" },
            &[Line::new("", t, rel_err_pct)],
            Some(0.0),
            None,
        )?;

        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// One run in a method comparison
pub struct MethodRun {
    pub label: String,
    pub t: Vec<f64>,
    pub normalized: Vec<f64>,
    pub rel_err_pct: Vec<f64>,
}

/// E/E0 and relative error of several integrators on shared axes
pub fn plot_method_comparison(path: &Path, runs: &[MethodRun]) -> Result<()> {
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (1200, 1000)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((2, 1));

        let normalized: Vec<Line> = runs.iter().map(|r| Line::new(r.label.clone(), &r.t, &r.normalized)).collect();
        draw_lines(
            &panels[0],
            &Axes { caption: "energy conservation by integrator", x_desc: "t", y_desc: "E / E0" },
            &normalized,
            Some(1.0),
            None,
        )?;

        let errors: Vec<Line> = runs.iter().map(|r| Line::new(r.label.clone(), &r.t, &r.rel_err_pct)).collect();
        draw_lines(
            &panels[1],
            &Axes { caption: "relative energy error", x_desc: "t", y_desc: "relative error (%)" },
            &errors,
            Some(0.0),
            None,
        )?;

        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// Speed histogram against the 2-D Maxwell–Boltzmann density, and the
/// component histograms against a Gaussian of variance T
pub fn plot_velocity_distribution(path: &Path, title: &str, sample: &VelocitySample, stats: &SpeedStats) -> Result<()> {
    let temperature = stats.temperature;
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (1400, 600)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));

        let speed_hist = histogram_density(&sample.speeds, SPEED_BINS);
        let v = linspace(0.0, stats.max * 1.1, CURVE_POINTS);
        let mb: Vec<f64> = v.iter().map(|&v| maxwell_boltzmann_2d(v, temperature)).collect();
        let caption = format!("{} (T = {:.3})", title, temperature);
        draw_histograms(
            &panels[0],
            &Axes { caption: &caption, x_desc: "speed |v|", y_desc: "probability density" },
            &[("simulation".to_string(), speed_hist)],
            &[Line::new("Maxwell-Boltzmann 2D", &v, &mb)],
        )?;

        let lo = sample.vx.iter().chain(&sample.vy).copied().fold(f64::INFINITY, f64::min);
        let hi = sample.vx.iter().chain(&sample.vy).copied().fold(f64::NEG_INFINITY, f64::max);
        let sigma = temperature.sqrt();
        let vc = linspace(lo, hi, CURVE_POINTS);
        let g: Vec<f64> = vc.iter().map(|&v| gaussian(v, sigma)).collect();
        draw_histograms(
            &panels[1],
            &Axes { caption: "velocity components", x_desc: "velocity component", y_desc: "probability density" },
            &[
                ("vx".to_string(), histogram_density(&sample.vx, SPEED_BINS)),
                ("vy".to_string(), histogram_density(&sample.vy, SPEED_BINS)),
            ],
            &[Line::new("Gaussian", &vc, &g)],
        )?;

        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// Speed histograms of several runs on one chart
pub fn plot_distribution_comparison(path: &Path, runs: &[(String, Vec<f64>)]) -> Result<()> {
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (1000, 700)).into_drawing_area();
        root.fill(&WHITE)?;
        let hists: Vec<(String, Histogram)> = runs
            .iter()
            .map(|(label, speeds)| (label.clone(), histogram_density(speeds, COMPARISON_BINS)))
            .collect();
        draw_histograms(
            &root,
            &Axes { caption: "speed distribution comparison", x_desc: "speed |v|", y_desc: "probability density" },
            &hists,
            &[],
        )?;
        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// Paths of the first `show` particles, start circle and end square, in a `width` x `height` box
pub fn plot_trajectories(path: &Path, frames: &GasFrames<'_>, show: usize, width: f64, height: f64) -> Result<()> {
    let show = show.min(frames.n_particles());
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (900, 900)).into_drawing_area();
        root.fill(&WHITE)?;

        let caption = format!("trajectories of {} particles", show);
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..width, 0.0..height)?;
        chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

        let d = 0.01 * width.max(height);
        for i in 0..show {
            let c = color(i);
            let Some((x, y)) = frames.positions(i) else {
                continue;
            };
            let points: Vec<(f64, f64)> = x.into_iter().zip(y).collect();
            chart
                .draw_series(LineSeries::new(points.iter().copied(), c.mix(0.7)))?
                .label(format!("particle {}", i))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c));

            if let (Some(&start), Some(&(xe, ye))) = (points.first(), points.last()) {
                chart.draw_series(std::iter::once(Circle::new(start, 5, c.filled())))?;
                chart.draw_series(std::iter::once(Rectangle::new([(xe - d, ye - d), (xe + d, ye + d)], c.filled())))?;
            }
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// Particle positions of frame `k` drawn as discs of radius `radius`
pub fn plot_snapshot(path: &Path, frames: &GasFrames<'_>, k: usize, width: f64, height: f64, radius: f64) -> Result<()> {
    let t = frames.table().row(k).map_or(0.0, |row| row[0]);
    let positions = frames
        .frame_positions(k)
        .ok_or_else(|| Error::Plot(format!("frame {} out of range ({} frames)", k, frames.n_frames())))?;
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (900, 900)).into_drawing_area();
        root.fill(&WHITE)?;

        let caption = format!("frame {} (t = {:.3})", k, t);
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..width, 0.0..height)?;
        chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

        // disc radius in pixels from the plotting area width
        let (px_w, _) = chart.plotting_area().dim_in_pixel();
        let r_px = ((radius / width) * px_w as f64).round().max(2.0) as u32;
        chart.draw_series(positions.iter().map(|&p| Circle::new(p, r_px, BLUE.mix(0.7).filled())))?;

        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

// =========================================================================================
// Pendulum plots
// =========================================================================================

/// Every single-run pendulum figure into `out_dir`, returns the files written
pub fn plot_pendulum_run(out_dir: &Path, s: &PendulumSeries, omega_f: f64, spectrum: &Spectrum) -> Result<Vec<String>> {
    let mut written = Vec::new();
    let mut record = |name: &str, result: Result<()>| -> Result<()> {
        result?;
        written.push(name.to_string());
        Ok(())
    };

    let p = out_dir.join("theta_vs_t.png");
    record("theta_vs_t.png", single_lines(&p, "angles", "t (s)", "theta (rad)", &[
        Line::new("theta1", &s.t, &s.theta1),
        Line::new("theta2", &s.t, &s.theta2),
    ], None))?;

    let p = out_dir.join("omega_vs_t.png");
    record("omega_vs_t.png", single_lines(&p, "angular velocities", "t (s)", "omega (rad/s)", &[
        Line::new("omega1", &s.t, &s.omega1),
        Line::new("omega2", &s.t, &s.omega2),
    ], None))?;

    let mut energy_lines = Vec::new();
    if let Some(e1) = &s.e1 {
        energy_lines.push(Line::new("E1", &s.t, e1));
    }
    if let Some(e2) = &s.e2 {
        energy_lines.push(Line::new("E2", &s.t, e2));
    }
    if let Some(et) = &s.e_total {
        energy_lines.push(Line::new("E_total", &s.t, et));
    }
    if !energy_lines.is_empty() {
        let p = out_dir.join("energies_vs_t.png");
        record("energies_vs_t.png", single_lines(&p, "energies", "t (s)", "E (J)", &energy_lines, None))?;
    }

    if let (Some(e1), Some(e2)) = (&s.e1, &s.e2) {
        let pts: Vec<(f64, f64)> = e1.iter().copied().zip(e2.iter().copied()).collect();
        let p = out_dir.join("E1_vs_E2.png");
        record("E1_vs_E2.png", single_scatter(&p, "energy transfer", "E1", "E2", &pts, 2))?;
    }

    let phase1: Vec<(f64, f64)> = s.theta1.iter().copied().zip(s.omega1.iter().copied()).collect();
    let phase2: Vec<(f64, f64)> = s.theta2.iter().copied().zip(s.omega2.iter().copied()).collect();
    let p = out_dir.join("phase_theta1_omega1.png");
    record("phase_theta1_omega1.png", single_scatter(&p, "phase space, pendulum 1", "theta1", "omega1", &phase1, 1))?;
    let p = out_dir.join("phase_theta2_omega2.png");
    record("phase_theta2_omega2.png", single_scatter(&p, "phase space, pendulum 2", "theta2", "omega2", &phase2, 1))?;

    let p = out_dir.join("phase_space.png");
    record("phase_space.png", plot_phase_space(&p, s))?;

    let section = poincare_section(&s.t, &s.theta1, &s.omega1, omega_f);
    let p = out_dir.join("poincare_theta1.png");
    let caption = format!("Poincare section (omega_f = {})", omega_f);
    record("poincare_theta1.png", single_scatter(&p, &caption, "theta1", "omega1", &section, 2))?;

    let p = out_dir.join("fft_theta1.png");
    record("fft_theta1.png", single_lines(
        &p,
        "spectrum of theta1",
        "freq (Hz)",
        "FFT amplitude",
        &[Line::new("", &spectrum.freq, &spectrum.amplitude)],
        Some(0.0..FFT_MAX_FREQ),
    ))?;

    Ok(written)
}

fn single_lines(path: &Path, caption: &str, x_desc: &str, y_desc: &str, lines: &[Line], x_range: Option<Range<f64>>) -> Result<()> {
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (1000, 500)).into_drawing_area();
        root.fill(&WHITE)?;
        draw_lines(&root, &Axes { caption, x_desc, y_desc }, lines, None, x_range.clone())?;
        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

fn single_scatter(path: &Path, caption: &str, x_desc: &str, y_desc: &str, points: &[(f64, f64)], size: u32) -> Result<()> {
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (700, 700)).into_drawing_area();
        root.fill(&WHITE)?;
        draw_scatter(&root, &Axes { caption, x_desc, y_desc }, points, size, BLUE)?;
        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// Both phase portraits side by side
pub fn plot_phase_space(path: &Path, s: &PendulumSeries) -> Result<()> {
    let draw = || -> DrawResult {
        let root = bitmap_root(path, (1400, 650)).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));
        draw_lines(
            &panels[0],
            &Axes { caption: "phase space, pendulum 1", x_desc: "theta1", y_desc: "omega1" },
            &[Line::new("", &s.theta1, &s.omega1)],
            None,
            None,
        )?;
        draw_lines(
            &panels[1],
            &Axes { caption: "phase space, pendulum 2", x_desc: "theta2", y_desc: "omega2" },
            &[Line::new("", &s.theta2, &s.omega2)],
            None,
            None,
        )?;
        root.present()?;
        Ok(())
    };
    finish(path, draw())
}

/// Resonance curve and the histogram of peak amplitudes
pub fn plot_resonance(out_dir: &Path, r: &ResonanceSeries) -> Result<()> {
    let curve = out_dir.join("resonance_curve.png");
    let draw_curve = || -> DrawResult {
        let root = bitmap_root(&curve, (1000, 500)).into_drawing_area();
        root.fill(&WHITE)?;
        let points: Vec<(f64, f64)> = r.omega_f.iter().copied().zip(r.max_amp.iter().copied()).collect();
        let mut chart = ChartBuilder::on(&root)
            .caption("resonance curve", ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(padded_range(r.omega_f.iter().copied()), padded_range(r.max_amp.iter().copied()))?;
        chart.configure_mesh().x_desc("omega_f").y_desc("max |theta1|").draw()?;
        chart.draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))?;
        root.present()?;
        Ok(())
    };
    finish(&curve, draw_curve())?;

    let hist_path = out_dir.join("resonance_hist.png");
    let draw_hist = || -> DrawResult {
        let root = bitmap_root(&hist_path, (700, 500)).into_drawing_area();
        root.fill(&WHITE)?;
        // counts rather than density
        let mut h = histogram_density(&r.max_amp, RESONANCE_HIST_BINS);
        let scale = r.max_amp.len() as f64 * h.bin_width();
        h.density.iter_mut().for_each(|d| *d *= scale);
        draw_histograms(
            &root,
            &Axes { caption: "peak amplitudes", x_desc: "max amp", y_desc: "count" },
            &[(String::new(), h)],
            &[],
        )?;
        root.present()?;
        Ok(())
    };
    finish(&hist_path, draw_hist())
}

/// theta1, theta2 and total energy of several coupling strengths
pub fn plot_kappa_comparison(out_dir: &Path, runs: &[(String, PendulumSeries)]) -> Result<()> {
    let theta1: Vec<Line> = runs.iter().map(|(k, s)| Line::new(k.clone(), &s.t, &s.theta1)).collect();
    single_lines(&out_dir.join("compare_theta1.png"), "theta1 by coupling", "t (s)", "theta1 (rad)", &theta1, None)?;

    let theta2: Vec<Line> = runs.iter().map(|(k, s)| Line::new(k.clone(), &s.t, &s.theta2)).collect();
    single_lines(&out_dir.join("compare_theta2.png"), "theta2 by coupling", "t (s)", "theta2 (rad)", &theta2, None)?;

    let energy: Vec<Line> = runs
        .iter()
        .filter_map(|(k, s)| s.e_total.as_ref().map(|e| Line::new(k.clone(), &s.t, e)))
        .collect();
    if !energy.is_empty() {
        single_lines(&out_dir.join("compare_energy.png"), "total energy by coupling", "t (s)", "E total (J)", &energy, None)?;
    }
    Ok(())
}
