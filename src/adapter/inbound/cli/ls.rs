//! `nomadlogs ls`: table of allocations and their task states.

use tabled::{Table, Tabled};

use super::command::LsArgs;
use super::{nomad_client, output};
use crate::application::listing::{self, AllocationRow};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

const RESTART_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Tabled)]
struct LsRow {
    #[tabled(rename = "Allocation")]
    allocation: String,
    #[tabled(rename = "Job ID")]
    job_id: String,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Last Restart")]
    last_restart: String,
}

impl From<AllocationRow> for LsRow {
    fn from(row: AllocationRow) -> Self {
        Self {
            state: output::task_state(&row.state),
            last_restart: row
                .last_restart
                .map(|t| t.format(RESTART_FORMAT).to_string())
                .unwrap_or_default(),
            allocation: row.allocation,
            job_id: row.job_id,
            task: row.task,
        }
    }
}

/// List allocations.
pub async fn execute(args: &LsArgs, config: &Config) -> Result<()> {
    let client = nomad_client(args.addr.as_deref(), &config.nomad)?;
    let rows = listing::list(&client).await?;

    if output::is_json() {
        output::json_output(serde_json::to_value(&rows)?);
        return Ok(());
    }

    output::lines(&render(rows));
    Ok(())
}

fn render(rows: Vec<AllocationRow>) -> String {
    Table::new(rows.into_iter().map(LsRow::from)).to_string()
}
