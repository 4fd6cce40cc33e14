use crate::core::dynamics::unwrap::UnwrappedMolecule;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeriesError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Column '{column}' not found in '{path}'")]
    MissingColumn { path: String, column: String },
    #[error("Invalid number '{value}' in column '{column}' of record {row} in '{path}'")]
    InvalidNumber {
        path: String,
        row: usize,
        column: String,
        value: String,
    },
    #[error("Record {row} of '{path}' gives only part of the box lengths (lx, ly, lz)")]
    IncompleteBox { path: String, row: usize },
}

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> SeriesError + '_ {
    move |source| SeriesError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

/// Wrapped positions of one point over time, with optional per-frame boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSeries {
    pub positions: Vec<Point3<f64>>,
    pub boxes: Option<Vec<Vector3<f64>>>,
}

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    x: f64,
    y: f64,
    z: f64,
    #[serde(default)]
    lx: Option<f64>,
    #[serde(default)]
    ly: Option<f64>,
    #[serde(default)]
    lz: Option<f64>,
}

/// Reads a `x,y,z[,lx,ly,lz]` CSV file.
///
/// Box columns must be given on every record or on none.
pub fn read_coordinate_series(path: &Path) -> Result<CoordinateSeries, SeriesError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;

    let mut positions = Vec::new();
    let mut boxes = Vec::new();
    let mut boxed_rows = 0;
    for (row, result) in reader.deserialize::<SeriesRecord>().enumerate() {
        let record = result.map_err(csv_err(path))?;
        positions.push(Point3::new(record.x, record.y, record.z));
        match (record.lx, record.ly, record.lz) {
            (Some(lx), Some(ly), Some(lz)) => {
                boxes.push(Vector3::new(lx, ly, lz));
                boxed_rows += 1;
            }
            (None, None, None) => {}
            _ => {
                return Err(SeriesError::IncompleteBox {
                    path: path.to_string_lossy().to_string(),
                    row,
                });
            }
        }
        if boxed_rows != 0 && boxed_rows != row + 1 {
            return Err(SeriesError::IncompleteBox {
                path: path.to_string_lossy().to_string(),
                row,
            });
        }
    }

    Ok(CoordinateSeries {
        boxes: (boxed_rows > 0).then_some(boxes),
        positions,
    })
}

#[derive(Debug, Serialize)]
struct PositionRecord {
    frame: usize,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Serialize)]
struct MoleculePositionRecord {
    frame: usize,
    molecule: usize,
    x: f64,
    y: f64,
    z: f64,
}

/// Writes a single series as `frame,x,y,z`, numbering frames from zero.
pub fn write_coordinate_series(path: &Path, positions: &[Point3<f64>]) -> Result<(), SeriesError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for (frame, p) in positions.iter().enumerate() {
        writer
            .serialize(PositionRecord {
                frame,
                x: p.x,
                y: p.y,
                z: p.z,
            })
            .map_err(csv_err(path))?;
    }
    writer.flush().map_err(|e| SeriesError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Writes the unwrapped molecules of one species as `frame,molecule,x,y,z`.
///
/// `frame_indices` labels the positions of every molecule in order.
pub fn write_unwrapped_species(
    path: &Path,
    frame_indices: &[usize],
    molecules: &[UnwrappedMolecule],
) -> Result<(), SeriesError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_err(path))?;
    for molecule in molecules {
        for (&frame, p) in frame_indices.iter().zip(&molecule.positions) {
            writer
                .serialize(MoleculePositionRecord {
                    frame,
                    molecule: molecule.molecule_id,
                    x: p.x,
                    y: p.y,
                    z: p.z,
                })
                .map_err(csv_err(path))?;
        }
    }
    writer.flush().map_err(|e| SeriesError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}

/// Reads the named numeric columns of a CSV file with a header row.
///
/// # Return
///
/// One vector per requested column, in the order requested.
pub fn read_columns(path: &Path, columns: &[&str]) -> Result<Vec<Vec<f64>>, SeriesError> {
    let mut reader = csv::Reader::from_path(path).map_err(csv_err(path))?;
    let headers = reader.headers().map_err(csv_err(path))?.clone();

    let positions = columns
        .iter()
        .map(|&column| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| SeriesError::MissingColumn {
                    path: path.to_string_lossy().to_string(),
                    column: column.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut values = vec![Vec::new(); columns.len()];
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(csv_err(path))?;
        for (k, &position) in positions.iter().enumerate() {
            let raw = record.get(position).unwrap_or_default().trim();
            let value = raw.parse::<f64>().map_err(|_| SeriesError::InvalidNumber {
                path: path.to_string_lossy().to_string(),
                row,
                column: columns[k].to_string(),
                value: raw.to_string(),
            })?;
            values[k].push(value);
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_series_without_boxes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("com.csv");
        fs::write(&path, "x,y,z\n0.0,1.0,2.0\n9.5,1.0,2.0\n").unwrap();

        let series = read_coordinate_series(&path).unwrap();
        assert_eq!(series.positions.len(), 2);
        assert_eq!(series.positions[1], Point3::new(9.5, 1.0, 2.0));
        assert!(series.boxes.is_none());
    }

    #[test]
    fn reads_series_with_boxes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("com.csv");
        fs::write(
            &path,
            "x,y,z,lx,ly,lz\n0.0,1.0,2.0,10,10,10\n9.5,1.0,2.0,10.5,10,10\n",
        )
        .unwrap();

        let series = read_coordinate_series(&path).unwrap();
        let boxes = series.boxes.unwrap();
        assert_eq!(boxes[1], Vector3::new(10.5, 10.0, 10.0));
    }

    #[test]
    fn partial_box_columns_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("com.csv");
        fs::write(&path, "x,y,z,lx,ly,lz\n0,0,0,10,10,10\n1,1,1,,,\n").unwrap();
        assert!(matches!(
            read_coordinate_series(&path),
            Err(SeriesError::IncompleteBox { row: 1, .. })
        ));
    }

    #[test]
    fn malformed_series_is_a_csv_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("com.csv");
        fs::write(&path, "x,y,z\n0.0,abc,2.0\n").unwrap();
        assert!(matches!(
            read_coordinate_series(&path),
            Err(SeriesError::Csv { .. })
        ));
    }

    #[test]
    fn unwrapped_species_are_written_per_frame_and_molecule() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("EC.csv");
        let molecules = vec![
            UnwrappedMolecule {
                molecule_id: 0,
                positions: vec![Point3::new(1.0, 2.0, 3.0), Point3::new(1.5, 2.0, 3.0)],
            },
            UnwrappedMolecule {
                molecule_id: 4,
                positions: vec![Point3::new(7.0, 7.0, 7.0), Point3::new(10.5, 7.0, 7.0)],
            },
        ];
        write_unwrapped_species(&path, &[0, 5], &molecules).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "frame,molecule,x,y,z");
        assert_eq!(lines[1], "0,0,1.0,2.0,3.0");
        assert_eq!(lines[4], "5,4,10.5,7.0,7.0");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn written_series_reads_back_as_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_coordinate_series(&path, &[Point3::new(0.0, 0.5, 1.0), Point3::new(10.5, 0.5, 1.0)])
            .unwrap();

        let columns = read_columns(&path, &["x", "frame"]).unwrap();
        assert_eq!(columns[0], vec![0.0, 10.5]);
        assert_eq!(columns[1], vec![0.0, 1.0]);
    }

    #[test]
    fn read_columns_reports_missing_and_invalid_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cv.csv");
        fs::write(&path, "time,rg\n0,1.5\n1,n/a\n").unwrap();

        assert!(matches!(
            read_columns(&path, &["dist"]),
            Err(SeriesError::MissingColumn { column, .. }) if column == "dist"
        ));
        assert!(matches!(
            read_columns(&path, &["rg"]),
            Err(SeriesError::InvalidNumber { row: 1, .. })
        ));
    }
}
