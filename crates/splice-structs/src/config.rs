use serde::{Deserialize, Serialize};
use splice_core::{ErrorInfo, SpliceError};

/// Sizing parameters shared by the containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerConfig {
    /// Fixed number of hash-table buckets; tables never rehash.
    #[serde(default = "default_bucket_count")]
    pub bucket_count: usize,
    /// Target run length of the sorted sequence; runs split at twice this.
    #[serde(default = "default_segment_load")]
    pub segment_load: usize,
}

fn default_bucket_count() -> usize {
    64
}

fn default_segment_load() -> usize {
    1000
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            bucket_count: default_bucket_count(),
            segment_load: default_segment_load(),
        }
    }
}

impl ContainerConfig {
    /// Rejects zero-sized buckets or runs.
    pub fn validate(&self) -> Result<(), SpliceError> {
        if self.bucket_count == 0 {
            return Err(SpliceError::Container(
                ErrorInfo::new("invalid-bucket-count", "bucket_count must be positive")
                    .with_hint("the table has a fixed bucket array and never grows"),
            ));
        }
        if self.segment_load == 0 {
            return Err(SpliceError::Container(ErrorInfo::new(
                "invalid-segment-load",
                "segment_load must be positive",
            )));
        }
        Ok(())
    }
}
