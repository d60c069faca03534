use std::sync::Arc;

use anyhow::bail;

use fleetdrill_common::{error as status_error, success, warn};
use fleetdrill_core::api::AwsCliApi;
use fleetdrill_core::asg::{FileStateStore, ProcessController, ResumeMode};

use crate::commands::GroupArgs;

/// Resumes every named group, concurrently, restoring from captured
/// state where a record exists and saying so loudly where it does not.
pub async fn resume(args: GroupArgs) -> anyhow::Result<()> {
    let api = Arc::new(AwsCliApi::new(args.aws_context()));
    let store = Arc::new(FileStateStore::new(&args.state_dir));
    let controller = Arc::new(ProcessController::new(api, store));

    let mut handles = Vec::with_capacity(args.groups.len());
    for group in &args.groups {
        let controller = Arc::clone(&controller);
        let group = group.clone();
        handles.push(tokio::spawn(async move {
            let result = controller.resume(&group).await;
            (group, result)
        }));
    }

    let mut failed = 0usize;
    let mut degraded = 0usize;
    for handle in handles {
        let (group, result) = handle.await?;
        match result {
            Ok(ResumeMode::Restored(state)) => {
                success!("'{group}' restored (captured state was {state})");
            }
            Ok(ResumeMode::Degraded) => {
                warn!("'{group}' resumed in degraded mode: no state record to restore from");
                degraded += 1;
            }
            Err(err) => {
                status_error!("resume failed for '{group}': {err}");
                failed += 1;
            }
        }
    }

    let total = args.groups.len();
    if failed > 0 {
        bail!("{failed} of {total} groups failed to resume");
    }
    if degraded > 0 {
        warn!("{degraded} of {total} groups had no record; verify them by hand");
    }

    Ok(())
}
