use crate::model::DataEnvelope;
use anyhow::Result;

/// Storage of the current dataset under one fixed logical key.
pub trait DatasetRepository {
    /// `None` when nothing has been stored yet.
    fn get(&self) -> Result<Option<DataEnvelope>>;
    fn set(&self, envelope: &DataEnvelope) -> Result<()>;
}
