use std::sync::Arc;

use anyhow::bail;

use fleetdrill_common::{error as status_error, success};
use fleetdrill_core::api::AwsCliApi;
use fleetdrill_core::asg::{FileStateStore, ProcessController};

use crate::commands::GroupArgs;

/// Suspends every named group, concurrently. A failure on one group
/// never stops the others; it only shows up in the exit status.
pub async fn suspend(args: GroupArgs) -> anyhow::Result<()> {
    let api = Arc::new(AwsCliApi::new(args.aws_context()));
    let store = Arc::new(FileStateStore::new(&args.state_dir));
    let controller = Arc::new(ProcessController::new(api, store));

    let mut handles = Vec::with_capacity(args.groups.len());
    for group in &args.groups {
        let controller = Arc::clone(&controller);
        let group = group.clone();
        handles.push(tokio::spawn(async move {
            let result = controller.suspend(&group).await;
            (group, result)
        }));
    }

    let mut failed = 0usize;
    for handle in handles {
        let (group, result) = handle.await?;
        if let Err(err) = result {
            status_error!("suspend failed for '{group}': {err}");
            failed += 1;
        }
    }

    let total = args.groups.len();
    if failed > 0 {
        bail!("{failed} of {total} groups failed to suspend");
    }

    success!("all {total} groups suspended");
    Ok(())
}
