//! Command implementations shared by the binary and the tests

use std::io::Write;

use anyhow::Context;
use bttc::{Evaluator, Grid, GridBuf, Subdivision};

use crate::config::ToolConfig;
use crate::input::Window;
use crate::output::{write_faces, write_mesh, write_stats, StatsReport};

/// Borrow the whole grid, or the requested window of it
pub fn select_grid(buf: &GridBuf, window: Option<Window>) -> anyhow::Result<Grid<'_>> {
    match window {
        Some(w) => buf
            .window(w.x, w.y, w.size)
            .with_context(|| format!("invalid window {},{},{}", w.x, w.y, w.size)),
        None => buf.as_grid().context("invalid grid"),
    }
}

fn run_subdivision(grid: &Grid<'_>, config: &ToolConfig) -> anyhow::Result<Subdivision> {
    #[cfg(feature = "parallel")]
    let result = bttc::subdivide_parallel(grid, config.subdivide.threshold);
    #[cfg(not(feature = "parallel"))]
    let result = bttc::Subdivider::new(config.subdivide).run(grid);

    let subdivision = result.context("subdivision failed")?;
    tracing::info!(
        faces = subdivision.len(),
        threshold = config.subdivide.threshold,
        "grid subdivided"
    );
    Ok(subdivision)
}

/// Subdivide and write the face table
pub fn faces(
    buf: &GridBuf,
    window: Option<Window>,
    config: &ToolConfig,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    let grid = select_grid(buf, window)?;
    let subdivision = run_subdivision(&grid, config)?;
    write_faces(writer, subdivision.faces(), &config.output)
}

/// Subdivide, merge shared corners and write the indexed mesh
pub fn mesh(
    buf: &GridBuf,
    window: Option<Window>,
    config: &ToolConfig,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    let grid = select_grid(buf, window)?;
    let subdivision = run_subdivision(&grid, config)?;
    let mesh = subdivision.to_mesh(&grid);
    tracing::debug!(vertices = mesh.vertex_count(), "mesh built");
    write_mesh(writer, &mesh, config.output.index_base)
}

/// Subdivide and summarise the result
pub fn stats(
    buf: &GridBuf,
    window: Option<Window>,
    config: &ToolConfig,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    let report = stats_report(buf, window, config)?;
    write_stats(writer, &report)
}

pub fn stats_report(
    buf: &GridBuf,
    window: Option<Window>,
    config: &ToolConfig,
) -> anyhow::Result<StatsReport> {
    let grid = select_grid(buf, window)?;
    let subdivision = run_subdivision(&grid, config)?;
    let evaluator = Evaluator::new(&grid, config.subdivide.threshold)?;

    let max_error = subdivision
        .faces()
        .iter()
        .map(|face| evaluator.max_error(face))
        .fold(0.0, f64::max);

    Ok(StatsReport {
        size: grid.size(),
        threshold: config.subdivide.threshold,
        stats: *subdivision.stats(),
        vertices: subdivision.to_mesh(&grid).vertex_count(),
        max_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Layout, OutputFormat};

    fn spike() -> GridBuf {
        GridBuf::from_fn(9, |x, y| if (x, y) == (3, 5) { 40.0 } else { 1.0 })
    }

    fn config(threshold: f64) -> ToolConfig {
        let mut config = ToolConfig::default();
        config.subdivide.threshold = threshold;
        config
    }

    #[test]
    fn test_faces_command_writes_table() {
        let mut out = Vec::new();
        faces(&spike(), None, &config(100.0), &mut out).unwrap();
        let table: Vec<[i32; 6]> = serde_json::from_slice(&out).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_faces_command_csv_one_based() {
        let mut config = config(0.5);
        config.output.format = OutputFormat::Csv;
        config.output.layout = Layout::Rows;
        config.output.index_base = 1;

        let mut out = Vec::new();
        faces(&spike(), None, &config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.lines().count() > 2);
        for line in text.lines() {
            for value in line.split(',') {
                let coord: i32 = value.parse().unwrap();
                assert!((1..=9).contains(&coord));
            }
        }
    }

    #[test]
    fn test_mesh_command() {
        let mut out = Vec::new();
        mesh(&spike(), None, &config(0.5), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let vertices = value["vertices"].as_array().unwrap();
        assert!(vertices
            .iter()
            .any(|v| v["x"] == 3 && v["y"] == 5 && v["value"] == 40.0));
    }

    #[test]
    fn test_stats_report() {
        let report = stats_report(&spike(), None, &config(0.5)).unwrap();
        assert_eq!(report.size, 9);
        assert_eq!(report.stats.faces, report.stats.splits + 2);
        assert!(report.max_error <= 0.5);
        assert!(report.vertices >= 4);
    }

    #[test]
    fn test_window_selection() {
        let buf = GridBuf::from_fn(10, |x, y| (x + y) as f64);
        assert!(select_grid(&buf, None).is_err());

        let window = Window { x: 1, y: 1, size: 9 };
        let report = stats_report(&buf, Some(window), &config(0.0)).unwrap();
        assert_eq!(report.size, 9);
        assert_eq!(report.stats.faces, 2);

        let too_big = Window { x: 2, y: 0, size: 9 };
        assert!(select_grid(&buf, Some(too_big)).is_err());

        let far_away = Window { x: 0, y: usize::MAX, size: 9 };
        assert!(select_grid(&buf, Some(far_away)).is_err());
    }
}
