use super::series::SeriesError;
use crate::core::analysis::fes::{Fes1d, Fes2d};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct Fes1dRecord {
    x: f64,
    energy: f64,
}

#[derive(Serialize)]
struct Fes2dRecord {
    x: f64,
    y: f64,
    energy: f64,
}

/// Writes a 1D surface as `x,energy` at the bin centers.
pub fn write_fes_1d(path: &Path, fes: &Fes1d) -> Result<(), SeriesError> {
    let rows = fes
        .centers()
        .into_iter()
        .zip(&fes.energies)
        .map(|(x, &energy)| Fes1dRecord { x, energy });
    write_rows(path, rows)
}

/// Writes a 2D surface as `x,y,energy` at the bin centers, x varying fastest.
pub fn write_fes_2d(path: &Path, fes: &Fes2d) -> Result<(), SeriesError> {
    let xs = fes.x_centers();
    let ys = fes.y_centers();
    let rows = ys.iter().zip(&fes.energies).flat_map(|(&y, row)| {
        xs.iter()
            .zip(row)
            .map(move |(&x, &energy)| Fes2dRecord { x, y, energy })
    });
    write_rows(path, rows)
}

fn write_rows<R: Serialize>(path: &Path, rows: impl Iterator<Item = R>) -> Result<(), SeriesError> {
    let csv_err = |source| SeriesError::Csv {
        path: path.to_string_lossy().to_string(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| SeriesError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })
}
