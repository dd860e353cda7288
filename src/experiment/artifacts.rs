//! On-disk hand-off between preparation and training.
//!
//! Layout of an experiment directory:
//!
//! ```text
//! X_train.csv  X_test.csv      headerless feature rows
//! y_train.csv  y_test.csv      one label code per line
//! label_classes.json           class value for each label code
//! transform.json               fitted feature transform
//! column_config.json           only when a column config was applied
//! ```

use crate::data::FeatureMatrixPair;
use crate::error::{ForgeError, Result};
use crate::experiment::PreparedExperiment;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Files written for one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub x_train: PathBuf,
    pub x_test: PathBuf,
    pub y_train: PathBuf,
    pub y_test: PathBuf,
    pub label_classes: PathBuf,
    pub transform: PathBuf,
    pub column_config: Option<PathBuf>,
}

impl ArtifactPaths {
    /// Standard file names under `dir`. `column_config` is filled in only
    /// once that file is written.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            x_train: dir.join("X_train.csv"),
            x_test: dir.join("X_test.csv"),
            y_train: dir.join("y_train.csv"),
            y_test: dir.join("y_test.csv"),
            label_classes: dir.join("label_classes.json"),
            transform: dir.join("transform.json"),
            column_config: None,
            dir,
        }
    }
}

/// Write the matrices, labels and fitted transform of a prepared experiment.
pub fn write_experiment<P: AsRef<Path>>(dir: P, prepared: &PreparedExperiment) -> Result<ArtifactPaths> {
    fs::create_dir_all(dir.as_ref())?;
    let mut paths = ArtifactPaths::in_dir(dir);
    let matrices = &prepared.data.matrices;

    write_matrix(&paths.x_train, &matrices.x_train)?;
    write_matrix(&paths.x_test, &matrices.x_test)?;
    write_labels(&paths.y_train, &matrices.y_train)?;
    write_labels(&paths.y_test, &matrices.y_test)?;
    write_json(&paths.label_classes, &matrices.label_classes)?;
    write_json(&paths.transform, &prepared.data.transform)?;

    if let Some(config) = &prepared.column_config_used {
        let path = paths.dir.join("column_config.json");
        write_json(&path, config)?;
        paths.column_config = Some(path);
    }

    tracing::info!(dir = %paths.dir.display(), "Wrote experiment artifacts");
    Ok(paths)
}

/// Read the matrices and labels written by [`write_experiment`].
pub fn read_feature_matrices(paths: &ArtifactPaths) -> Result<FeatureMatrixPair> {
    let x_train = read_matrix(&paths.x_train)?;
    let x_test = read_matrix(&paths.x_test)?;
    let y_train = read_labels(&paths.y_train)?;
    let y_test = read_labels(&paths.y_test)?;
    let label_classes: Vec<String> = serde_json::from_reader(File::open(&paths.label_classes)?)?;

    FeatureMatrixPair::new(x_train, x_test, y_train, y_test, label_classes)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn write_matrix(path: &Path, matrix: &DMatrix<f64>) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for row in matrix.row_iter() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_labels(path: &Path, labels: &[usize]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for label in labels {
        writer.write_record([label.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn read_matrix(path: &Path) -> Result<DMatrix<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        // A zero-width row is written as a single empty field.
        if record.len() == 1 && record[0].is_empty() {
            rows.push(Vec::new());
            continue;
        }
        let row = record
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|_| {
                    ForgeError::InvalidData(format!(
                        "{}: '{}' is not a number",
                        path.display(),
                        field
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }

    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != n_cols) {
        return Err(ForgeError::DimensionMismatch {
            expected: n_cols,
            actual: bad.len(),
        });
    }
    Ok(DMatrix::from_row_iterator(
        rows.len(),
        n_cols,
        rows.into_iter().flatten(),
    ))
}

fn read_labels(path: &Path) -> Result<Vec<usize>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    reader
        .records()
        .map(|record| {
            let record = record?;
            let field = record.get(0).unwrap_or("");
            field.parse::<usize>().map_err(|_| {
                ForgeError::InvalidData(format!(
                    "{}: '{}' is not a label code",
                    path.display(),
                    field
                ))
            })
        })
        .collect()
}
