//! Publishing flattened tables to an analytics service
//!
//! A [`Publisher`] uploads CSV bytes, renames the resulting dataset, and reports
//! its state. [`publish`] drives one complete round: upload, best-effort rename,
//! then [`await_indexing`], which polls until the service reports the dataset's
//! columns or the polling budget runs out. An exhausted budget is a normal
//! outcome ([`IndexingStatus::Pending`]), not an error.

mod datarobot;
mod outcome;
mod poll;
mod publisher;

pub use datarobot::{DEFAULT_ENDPOINT, DataRobotClient};
pub use outcome::{IndexingStatus, PublishOutcome, PublishWarning};
pub use poll::{DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT, PollSettings, await_indexing};
pub use publisher::{DatasetInfo, Publisher};

use crate::Result;
use crate::progress::Progress;
use crate::reports::encode_csv;
use crate::table::Table;
use ohno::bail;

/// File name attached to uploads.
pub const UPLOAD_FILE_NAME: &str = "af_flattened.csv";

/// Default name given to uploaded datasets.
pub const DEFAULT_DATASET_NAME: &str = "AF Flattened Attributes";

/// Upload `table`, name the dataset `dataset_name`, and wait for indexing.
///
/// A failed rename is recorded as a [`PublishWarning`] and does not stop the run.
pub async fn publish<P: Publisher>(
    publisher: &P,
    table: &Table,
    dataset_name: &str,
    poll: PollSettings,
    progress: &dyn Progress,
) -> Result<PublishOutcome> {
    if table.is_empty() {
        bail!("nothing to publish: the flattened table has no rows");
    }

    let csv = encode_csv(table)?;
    let size = csv.len();

    progress.set_phase("Uploading");
    progress.set_indeterminate(Box::new(move || format!("{size} bytes")));
    let uploaded = publisher.upload(csv, UPLOAD_FILE_NAME).await?;
    let dataset_id = uploaded.id.clone();

    let mut warnings = Vec::new();
    let current = match publisher.rename(&dataset_id, dataset_name).await {
        Ok(renamed) => {
            log::info!("renamed dataset {dataset_id} to '{dataset_name}'");
            renamed
        }
        Err(e) => {
            log::warn!("could not rename dataset {dataset_id} to '{dataset_name}': {e}");
            warnings.push(PublishWarning::RenameFailed {
                requested_name: dataset_name.to_string(),
                message: e.to_string(),
            });
            uploaded
        }
    };

    let status = await_indexing(publisher, current, poll, progress).await;

    Ok(PublishOutcome {
        dataset_id,
        requested_name: dataset_name.to_string(),
        warnings,
        status,
    })
}
