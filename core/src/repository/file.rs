use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::model::DataEnvelope;
use crate::repository::traits::DatasetRepository;

/// Logical key of the stored blob.
pub const DATASET_KEY: &str = "daily-data";

#[derive(Clone)]
pub struct FileDatasetRepository {
    file_path: PathBuf,
}

impl FileDatasetRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not determine home directory"))?;
                home_dir.join(".footfall")
            }
        };
        fs::create_dir_all(&path)
            .with_context(|| format!("failed to create data directory {}", path.display()))?;
        path.push(format!("{}.json", DATASET_KEY));

        Ok(FileDatasetRepository { file_path: path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl DatasetRepository for FileDatasetRepository {
    fn get(&self) -> Result<Option<DataEnvelope>> {
        if !self.file_path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let envelope = serde_json::from_reader(reader)
            .with_context(|| format!("invalid dataset in {}", self.file_path.display()))?;
        Ok(Some(envelope))
    }

    fn set(&self, envelope: &DataEnvelope) -> Result<()> {
        let file = File::create(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, envelope)?;
        writer.flush()?;
        tracing::info!(
            path = %self.file_path.display(),
            records = envelope.metadata.records_processed,
            "dataset stored"
        );
        Ok(())
    }
}
