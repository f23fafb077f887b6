use dotenv::dotenv;
use log::{error, info};
use staking_report::config::Config;
use staking_report::services::pipeline::{self, RunSummary};
use staking_report::services::snapshot_service::SnapshotStakingService;
use staking_report::services::staking_service::LcdStakingService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::init();

    info!("Starting staking report");
    let config = Config::from_env()?;

    let summary = match &config.snapshot_file {
        Some(path) => {
            info!("Replaying snapshot {}", path.display());
            let service = SnapshotStakingService::from_file(path)?;
            pipeline::run(&service, &config).await?
        }
        None => {
            let service =
                LcdStakingService::connect(&config.node_endpoint, config.request_timeout).await?;
            pipeline::run(&service, &config).await?
        }
    };

    report_summary(&summary)
}

fn report_summary(summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Processed {} validators, {} delegations, {} delegators",
        summary.validators, summary.delegations, summary.delegators
    );

    let failed = summary.failed_reports().count();
    if failed > 0 {
        for report in summary.failed_reports() {
            error!("Report {} was not written to {}", report.name, report.path.display());
        }
        return Err(format!("{} of {} reports failed", failed, summary.reports.len()).into());
    }

    info!("All reports written");
    Ok(())
}
