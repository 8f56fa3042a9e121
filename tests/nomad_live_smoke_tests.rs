//! Read-only smoke test against a real Nomad agent.
//!
//! Requires `--features nomad-integration`, `NOMADLOGS_SMOKE=1` and a
//! reachable agent at `NOMAD_ADDR` (default `http://127.0.0.1:4646`).

#![cfg(feature = "nomad-integration")]

use std::env;
use std::time::Duration;

use nomadlogs::adapter::outbound::nomad::NomadClient;
use nomadlogs::infrastructure::config::nomad::NomadConfig;
use nomadlogs::port::Orchestrator;
use tokio::time::timeout;

fn smoke_enabled() -> bool {
    matches!(env::var("NOMADLOGS_SMOKE").ok().as_deref(), Some("1"))
}

#[tokio::test]
#[ignore = "requires NOMADLOGS_SMOKE=1 and a Nomad agent"]
async fn smoke_nomad_list_and_detail_readonly() {
    if !smoke_enabled() {
        eprintln!("Skipping smoke test (set NOMADLOGS_SMOKE=1 to enable)");
        return;
    }

    let config = NomadConfig::default();
    let address = config.resolve_address(None).expect("Invalid NOMAD_ADDR");
    let client = NomadClient::new(address.clone(), &config).expect("Failed to build client");

    let allocations = timeout(Duration::from_secs(20), client.list_allocations())
        .await
        .expect("Timed out listing allocations")
        .expect("Failed to list allocations");

    let Some(first) = allocations.first() else {
        eprintln!("No allocations on {address}; nothing more to check");
        return;
    };

    let detail = timeout(Duration::from_secs(20), client.allocation(&first.id))
        .await
        .expect("Timed out fetching allocation detail")
        .expect("Failed to fetch allocation detail");
    assert_eq!(detail.id, first.id);
    assert!(!detail.job_name.is_empty());
}
