pub mod file;
pub mod traits;

// Re-export
pub use file::{FileDatasetRepository, DATASET_KEY};
pub use traits::DatasetRepository;
