use super::Host;
use super::common::{Common, CommonArgs};
use super::config::parse_endpoint;
use crate::Result;
use crate::progress::Progress;
use crate::sink::{DataRobotClient, IndexingStatus, PollSettings, PublishOutcome, publish};
use clap::Parser;
use core::time::Duration;
use humantime_serde::re::humantime;
use ohno::bail;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct PublishArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Name given to the uploaded dataset
    #[arg(long, value_name = "NAME", help_heading = "Publishing")]
    pub name: Option<String>,

    /// Root of the DataRobot REST API
    #[arg(long, value_name = "URL", env = "DATAROBOT_ENDPOINT", help_heading = "Publishing")]
    pub endpoint: Option<String>,

    /// DataRobot API token
    #[arg(long, value_name = "TOKEN", env = "DATAROBOT_API_TOKEN", hide_env_values = true, help_heading = "Publishing")]
    pub api_token: Option<String>,

    /// How long to wait for the dataset to be indexed (e.g. `90s`, `5m`)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration, help_heading = "Publishing")]
    pub poll_timeout: Option<Duration>,

    /// Pause between dataset status checks (e.g. `2s`)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration, help_heading = "Publishing")]
    pub poll_interval: Option<Duration>,
}

/// Flatten an AF export, write the requested reports, and upload the table.
pub async fn publish_source<H: Host>(host: &mut H, args: &PublishArgs) -> Result<()> {
    let Some(api_token) = args.api_token.as_deref().filter(|t| !t.trim().is_empty()) else {
        bail!("an API token is required to publish; pass --api-token or set DATAROBOT_API_TOKEN");
    };

    let mut common = Common::new(host, &args.common)?;

    let endpoint = match &args.endpoint {
        Some(endpoint) => parse_endpoint(endpoint)?,
        None => common.config.endpoint_url()?,
    };

    let poll = PollSettings {
        timeout: args.poll_timeout.unwrap_or(common.config.poll_timeout),
        interval: args.poll_interval.unwrap_or(common.config.poll_interval),
    };
    poll.validate()?;

    let dataset_name = args.name.clone().unwrap_or_else(|| common.config.dataset_name.clone());
    let client = DataRobotClient::new(&endpoint, api_token, common.config.request_timeout)?;

    let result = flatten_and_publish(&mut common, &client, &dataset_name, poll).await;
    common.progress.done();

    let outcome = result?;
    write_outcome(common.host(), &outcome);
    Ok(())
}

async fn flatten_and_publish<H: Host>(
    common: &mut Common<'_, H>,
    client: &DataRobotClient,
    dataset_name: &str,
    poll: PollSettings,
) -> Result<PublishOutcome> {
    let table = common.load_table().await?;
    common.report(&table)?;
    publish(client, &table, dataset_name, poll, &common.progress).await
}

fn write_outcome<H: Host>(host: &mut H, outcome: &PublishOutcome) {
    for warning in &outcome.warnings {
        let _ = writeln!(host.error(), "warning: {warning}");
    }

    let mut out = host.output();
    let _ = writeln!(out, "Uploaded dataset {}", outcome.dataset_id);

    match &outcome.status {
        IndexingStatus::Ready(info) => {
            let name = info.name.as_deref().unwrap_or(&outcome.requested_name);
            let _ = writeln!(
                out,
                "Dataset '{name}' is ready: {} rows, {} columns",
                info.row_count.map_or_else(|| "unknown".to_string(), |n| n.to_string()),
                info.column_count.unwrap_or_default()
            );
        }
        IndexingStatus::Pending(_) => {
            let _ = writeln!(out, "Dataset is still being indexed; its row and column counts are not available yet");
        }
    }
}
