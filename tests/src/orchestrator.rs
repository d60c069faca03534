use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use fleetdrill_common::config::DrillConfig;
use fleetdrill_common::fleet::{OutcomeKind, ProbeOutcome, Target};
use fleetdrill_core::fakes::{ScriptedValidator, StaticInventory};
use fleetdrill_core::inventory::InventoryProvider;
use fleetdrill_core::orchestrator::ProbeOrchestrator;

async fn accepting_listener() -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let _ = listener.accept().await;
        }
    });
    addr
}

fn fast_config(concurrency: usize) -> DrillConfig {
    DrillConfig {
        concurrency_limit: concurrency,
        connect_timeout: Duration::from_millis(500),
        ..DrillConfig::default()
    }
}

/// A fleet with every outcome class at once: one clean target, one
/// auth rejection, one failed command, one dead port, one target with
/// no address. The report must account for all five.
#[tokio::test]
async fn mixed_fleet_accounts_for_every_outcome_kind() {
    let open = accepting_listener().await;
    let closed = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
        // Listener dropped here; the port refuses connections.
    };

    let inventory = StaticInventory::new(vec![
        Target::new("i-clean").with_addr(open.to_string()),
        Target::new("i-badkey").with_addr(open.to_string()),
        Target::new("i-broken").with_addr(open.to_string()),
        Target::new("i-dead").with_addr(closed.to_string()),
        Target::new("i-noaddr"),
    ]);
    let targets = inventory.targets().await.unwrap();

    let validator = Arc::new(
        ScriptedValidator::new()
            .succeeds_for("i-clean", "09:15 up 41 days")
            .rejects_auth_for("i-badkey")
            .fails_command_for("i-broken", "exit 127"),
    );

    let report = ProbeOrchestrator::new(validator.clone(), fast_config(4))
        .run(targets)
        .await;

    assert_eq!(report.len(), 5);
    let counts = report.counts();
    assert_eq!(counts.of(OutcomeKind::Success), 1);
    assert_eq!(counts.of(OutcomeKind::AuthenticationFailed), 1);
    assert_eq!(counts.of(OutcomeKind::CommandFailed), 1);
    assert_eq!(counts.of(OutcomeKind::Unreachable), 1);
    assert_eq!(counts.of(OutcomeKind::Skipped), 1);

    // Dead and address-less targets never reached the shell layer.
    assert_eq!(validator.calls(), 3);
}

#[tokio::test]
async fn report_entries_come_back_sorted_by_target_id() {
    let open = accepting_listener().await;

    let targets: Vec<Target> = ["i-07", "i-02", "i-11", "i-01"]
        .into_iter()
        .map(|id| Target::new(id).with_addr(open.to_string()))
        .collect();

    let validator = Arc::new(ScriptedValidator::new());
    let report = ProbeOrchestrator::new(validator, fast_config(4))
        .run(targets)
        .await;

    let ids: Vec<&str> = report.entries().iter().map(|e| e.target.id.as_str()).collect();
    assert_eq!(ids, vec!["i-01", "i-02", "i-07", "i-11"]);
}

/// One outcome per submitted target, no matter how tight the
/// concurrency limit is relative to the fleet size.
#[tokio::test]
async fn count_is_preserved_across_concurrency_limits() {
    let open = accepting_listener().await;

    for limit in [1usize, 3, 64] {
        let targets: Vec<Target> = (0..25)
            .map(|i| Target::new(format!("i-{i:03}")).with_addr(open.to_string()))
            .collect();

        let validator = Arc::new(ScriptedValidator::new());
        let report = ProbeOrchestrator::new(validator, fast_config(limit))
            .run(targets)
            .await;

        assert_eq!(report.len(), 25, "lost outcomes at concurrency {limit}");
        assert_eq!(report.counts().total(), 25);
        assert_eq!(report.counts().of(OutcomeKind::Success), 25);
    }
}

/// Deadline fires with a large fleet stuck behind slow sessions. The
/// run still terminates promptly and the report is still complete.
#[tokio::test]
async fn deadline_with_hundred_targets_yields_complete_report() {
    let open = accepting_listener().await;

    let validator = Arc::new(ScriptedValidator::new().with_delay(Duration::from_secs(60)));
    let config = DrillConfig {
        run_deadline: Some(Duration::from_millis(200)),
        ..fast_config(8)
    };

    let targets: Vec<Target> = (0..100)
        .map(|i| Target::new(format!("i-{i:03}")).with_addr(open.to_string()))
        .collect();

    let started = std::time::Instant::now();
    let report = ProbeOrchestrator::new(validator, config).run(targets).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(report.len(), 100);
    assert_eq!(report.counts().of(OutcomeKind::Skipped), 100);
    for entry in report.entries() {
        assert_eq!(
            entry.outcome,
            ProbeOutcome::Skipped {
                reason: "deadline exceeded".into()
            }
        );
    }
}

#[tokio::test]
async fn progress_callback_sees_the_final_count() {
    let open = accepting_listener().await;
    let seen = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    let targets: Vec<Target> = (0..12)
        .map(|i| Target::new(format!("i-{i}")).with_addr(open.to_string()))
        .collect();

    let seen_in_callback = Arc::clone(&seen);
    let report = ProbeOrchestrator::new(Arc::new(ScriptedValidator::new()), fast_config(4))
        .with_progress(move |done| {
            seen_in_callback.store(done, std::sync::atomic::Ordering::SeqCst)
        })
        .run(targets)
        .await;

    assert_eq!(report.len(), 12);
    assert_eq!(seen.load(std::sync::atomic::Ordering::SeqCst), 12);
}
