//! Face table, mesh and statistics writers

use std::io::Write;

use anyhow::Context;
use bttc::{Mesh, SubdivisionStats, TriangleNode};
use serde::Serialize;

use crate::config::{Layout, OutputConfig, OutputFormat};

/// Face coordinates shifted by `index_base`, one row per face
pub fn face_table(faces: &[TriangleNode], index_base: u32) -> Vec<[i32; 6]> {
    let shift = index_base as i32;
    faces
        .iter()
        .map(|face| face.to_coords().map(|coord| coord + shift))
        .collect()
}

/// Column-major flattening of an `n x 6` table: `data[j * n + i]`
pub fn column_major(table: &[[i32; 6]]) -> Vec<i32> {
    (0..6)
        .flat_map(|column| table.iter().map(move |row| row[column]))
        .collect()
}

#[derive(Serialize)]
struct ColumnMajorTable {
    rows: usize,
    cols: usize,
    data: Vec<i32>,
}

/// Write the face table in the configured format and layout
pub fn write_faces(
    writer: &mut impl Write,
    faces: &[TriangleNode],
    config: &OutputConfig,
) -> anyhow::Result<()> {
    let table = face_table(faces, config.index_base);

    match (config.format, config.layout) {
        (OutputFormat::Json, Layout::Rows) => {
            serde_json::to_writer(&mut *writer, &table)?;
            writeln!(writer)?;
        }
        (OutputFormat::Json, Layout::Columns) => {
            let matrix = ColumnMajorTable {
                rows: table.len(),
                cols: 6,
                data: column_major(&table),
            };
            serde_json::to_writer(&mut *writer, &matrix)?;
            writeln!(writer)?;
        }
        (OutputFormat::Csv, Layout::Rows) => {
            let mut csv_writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut *writer);
            for row in &table {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }
        (OutputFormat::Csv, Layout::Columns) => {
            let mut csv_writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(&mut *writer);
            for column in column_major(&table).chunks(table.len().max(1)) {
                csv_writer.serialize(column)?;
            }
            csv_writer.flush()?;
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct VertexRecord {
    x: i32,
    y: i32,
    value: f64,
}

#[derive(Serialize)]
struct MeshRecord {
    vertices: Vec<VertexRecord>,
    triangles: Vec<[u32; 3]>,
}

/// Write the deduplicated mesh as JSON, shifting coordinates and indices by `index_base`
pub fn write_mesh(writer: &mut impl Write, mesh: &Mesh, index_base: u32) -> anyhow::Result<()> {
    let shift = index_base as i32;
    let record = MeshRecord {
        vertices: mesh
            .vertices
            .iter()
            .map(|vertex| VertexRecord {
                x: vertex.position.x + shift,
                y: vertex.position.y + shift,
                value: vertex.value,
            })
            .collect(),
        triangles: mesh
            .triangles
            .iter()
            .map(|triangle| triangle.map(|index| index + index_base))
            .collect(),
    };

    serde_json::to_writer(&mut *writer, &record).context("failed to write mesh")?;
    writeln!(writer)?;
    Ok(())
}

/// Summary printed by the `stats` command
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub size: usize,
    pub threshold: f64,
    #[serde(flatten)]
    pub stats: SubdivisionStats,
    pub vertices: usize,
    /// Largest deviation between any sample and its face's plane
    pub max_error: f64,
}

pub fn write_stats(writer: &mut impl Write, report: &StatsReport) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report).context("failed to write stats")?;
    writeln!(writer)?;
    Ok(())
}
