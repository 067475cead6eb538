use crate::Result;

/// What the sink reports about a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetInfo {
    pub id: String,
    pub name: Option<String>,

    /// Known once the sink has finished ingesting the upload.
    pub row_count: Option<u64>,

    /// Known once the sink has finished indexing the upload.
    pub column_count: Option<u64>,
}

impl DatasetInfo {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Whether the sink has finished computing the dataset's schema.
    #[must_use]
    pub const fn is_indexed(&self) -> bool {
        self.column_count.is_some()
    }
}

/// An analytics service that accepts uploaded tables.
pub trait Publisher: Sync {
    /// Upload CSV bytes as a new dataset.
    fn upload(&self, csv: Vec<u8>, file_name: &str) -> impl Future<Output = Result<DatasetInfo>> + Send;

    /// Give a dataset a human-readable name.
    fn rename(&self, id: &str, name: &str) -> impl Future<Output = Result<DatasetInfo>> + Send;

    /// Fetch the dataset's current state.
    fn refresh(&self, id: &str) -> impl Future<Output = Result<DatasetInfo>> + Send;
}
