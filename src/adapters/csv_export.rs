use crate::config::toml_config::OutputMode;
use crate::domain::model::{ProjectId, ResultTable};
use crate::domain::ports::Exporter;
use crate::utils::error::Result;
use chrono::{Local, NaiveDate};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Writes each project's records as CSV under the output directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    output_dir: PathBuf,
    mode: OutputMode,
    run_date: NaiveDate,
}

impl CsvExporter {
    /// The daily file name is fixed when the exporter is created, so a run
    /// that crosses midnight keeps writing to one file.
    pub fn new(output_dir: impl Into<PathBuf>, mode: OutputMode) -> Self {
        Self {
            output_dir: output_dir.into(),
            mode,
            run_date: Local::now().date_naive(),
        }
    }

    pub fn with_run_date(mut self, run_date: NaiveDate) -> Self {
        self.run_date = run_date;
        self
    }

    pub fn path_for(&self, project: &ProjectId) -> PathBuf {
        let file_name = match self.mode {
            OutputMode::DailyAppend => format!("{}.csv", self.run_date.format("%Y%m%d")),
            OutputMode::PerProject => format!("{}.csv", file_stem(project.as_str())),
        };
        self.output_dir.join(file_name)
    }

    fn overwrite(path: &Path, table: &ResultTable) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(|c| c.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Appends under the header already in the file. Columns the file does
    /// not have are dropped.
    fn append(path: &Path, table: &ResultTable) -> Result<()> {
        let header = existing_header(path)?;
        let Some(header) = header else {
            return Self::overwrite(path, table);
        };

        let dropped: Vec<&String> = table
            .columns()
            .iter()
            .filter(|c| !header.contains(c))
            .collect();
        if !dropped.is_empty() {
            tracing::warn!(
                "Columns not present in {} were dropped: {:?}",
                path.display(),
                dropped
            );
        }

        let file = OpenOptions::new().append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in table.rows_aligned_to(&header) {
            writer.write_record(row.iter().map(|c| c.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl Exporter for CsvExporter {
    async fn export(&self, project: &ProjectId, table: &ResultTable) -> Result<PathBuf> {
        let path = self.path_for(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        match self.mode {
            OutputMode::DailyAppend => Self::append(&path, table)?,
            OutputMode::PerProject => Self::overwrite(&path, table)?,
        }

        tracing::debug!(
            "Wrote {} row(s) for {} to {}",
            table.len(),
            project,
            path.display()
        );
        Ok(path)
    }
}

fn existing_header(path: &Path) -> Result<Option<Vec<String>>> {
    if fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true) {
        return Ok(None);
    }
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?.iter().map(str::to_string).collect();
    Ok(Some(header))
}

fn file_stem(project: &str) -> String {
    project
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
