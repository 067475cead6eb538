use super::Host;
use super::common::{Common, CommonArgs};
use crate::Result;
use crate::progress::Progress;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct FlattenArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// Flatten an AF export and write the requested reports.
pub async fn flatten_source<H: Host>(host: &mut H, args: &FlattenArgs) -> Result<()> {
    let mut common = Common::new(host, &args.common)?;
    let result = flatten_and_report(&mut common).await;
    common.progress.done();
    result
}

async fn flatten_and_report<H: Host>(common: &mut Common<'_, H>) -> Result<()> {
    let table = common.load_table().await?;
    common.report(&table)
}
