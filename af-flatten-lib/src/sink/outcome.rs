use super::DatasetInfo;
use core::fmt::{Display, Formatter};

/// A non-fatal problem encountered while publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishWarning {
    /// The dataset was uploaded but could not be renamed.
    RenameFailed { requested_name: String, message: String },
}

impl Display for PublishWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RenameFailed { requested_name, message } => {
                write!(f, "could not rename dataset to '{requested_name}': {message}")
            }
        }
    }
}

/// Where indexing stood when polling stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingStatus {
    /// The sink reported the dataset's columns.
    Ready(DatasetInfo),

    /// The polling budget ran out first; this carries the last known state.
    Pending(DatasetInfo),
}

impl IndexingStatus {
    #[must_use]
    pub const fn dataset(&self) -> &DatasetInfo {
        match self {
            Self::Ready(info) | Self::Pending(info) => info,
        }
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// The result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub dataset_id: String,
    pub requested_name: String,
    pub warnings: Vec<PublishWarning>,
    pub status: IndexingStatus,
}
