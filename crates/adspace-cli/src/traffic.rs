//! `traffic` command handlers.

use adspace_core::{AppConfig, CandidateSelector};
use adspace_db::PgLocationStore;
use adspace_places::PlacesClient;
use adspace_traffic::{
    run_enrichment, EnrichmentOptions, EnrichmentRunReport, LocationOutcome, OutcomeStatus,
};
use clap::Subcommand;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Subcommand)]
pub enum TrafficCommands {
    /// Estimate foot traffic for a batch of located advertising locations
    Enrich {
        /// Enrich exactly this location (repeatable)
        #[arg(long = "id", value_name = "UUID")]
        ids: Vec<Uuid>,

        /// Maximum number of locations to consider when no --id is given
        #[arg(
            long,
            conflicts_with = "ids",
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        limit: Option<usize>,

        /// Re-enrich locations that already carry an estimate
        #[arg(long)]
        force: bool,

        /// Locations processed at once (overrides ADSPACE_ENRICH_MAX_CONCURRENCY)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: Option<u16>,
    },
    /// Print the stored traffic estimate for one location as JSON
    Show {
        /// Location id
        id: Uuid,
    },
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: TrafficCommands,
) -> anyhow::Result<()> {
    match command {
        TrafficCommands::Enrich {
            ids,
            limit,
            force,
            concurrency,
        } => {
            let selector = build_selector(ids, limit, config.enrich_batch_limit);
            run_traffic_enrich(pool, config, &selector, force, concurrency).await
        }
        TrafficCommands::Show { id } => run_traffic_show(pool, id).await,
    }
}

pub(crate) fn build_selector(
    ids: Vec<Uuid>,
    limit: Option<usize>,
    default_limit: usize,
) -> CandidateSelector {
    if ids.is_empty() {
        CandidateSelector::Limit(limit.unwrap_or(default_limit))
    } else {
        CandidateSelector::Ids(ids)
    }
}

/// Run one enrichment pass and print a line per location.
///
/// Ctrl-C stops new locations from starting; in-flight ones finish.
///
/// # Errors
///
/// Returns an error if the Places client cannot be configured, the candidate
/// list cannot be loaded, or every processed location failed.
async fn run_traffic_enrich(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    selector: &CandidateSelector,
    force: bool,
    concurrency: Option<u16>,
) -> anyhow::Result<()> {
    let places = PlacesClient::from_app_config(config)?;
    let store = PgLocationStore::new(pool.clone());

    let mut options = EnrichmentOptions::from_app_config(config, force);
    if let Some(concurrency) = concurrency {
        options.max_concurrency = usize::from(concurrency);
    }

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("interrupt received; finishing in-flight locations");
                cancel.cancel();
            }
        })
    };

    tracing::info!(
        force,
        max_concurrency = options.max_concurrency,
        "starting traffic enrichment run"
    );
    let result = run_enrichment(&store, &places, selector, &options, &cancel).await;
    ctrl_c.abort();
    let report = result?;
    if report.cancelled {
        tracing::warn!(skipped = report.skipped, "traffic enrichment run was cancelled");
    }

    for outcome in &report.results {
        println!("{}", format_outcome(outcome));
    }
    println!("{}", format_summary(&report));

    if report.processed > 0 && report.successful == 0 {
        anyhow::bail!(
            "all {} processed locations failed traffic enrichment",
            report.processed
        );
    }
    Ok(())
}

async fn run_traffic_show(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<()> {
    let row = adspace_db::get_location(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("location {id} not found"))?;

    let payload = serde_json::json!({
        "id": row.id,
        "title": row.title,
        "latitude": row.latitude.map(|d| d.to_string()),
        "longitude": row.longitude.map(|d| d.to_string()),
        "traffic_updated_at": row.traffic_updated_at,
        "traffic_attempted_at": row.traffic_attempted_at,
        "traffic": row.traffic_estimate(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub(crate) fn format_outcome(outcome: &LocationOutcome) -> String {
    match outcome.status {
        OutcomeStatus::Success => format!(
            "✓ {} ({}): {}",
            outcome.title,
            outcome.location_id,
            outcome
                .classification
                .map_or("unknown", adspace_core::TrafficLevel::as_str)
        ),
        OutcomeStatus::Failed => format!(
            "✗ {} ({}): {}",
            outcome.title,
            outcome.location_id,
            outcome.error_message.as_deref().unwrap_or("unknown error")
        ),
        OutcomeStatus::Skipped => match outcome.error_message.as_deref() {
            Some(reason) => format!(
                "- {} ({}): skipped, {reason}",
                outcome.title, outcome.location_id
            ),
            None => format!(
                "- {} ({}): skipped, already enriched",
                outcome.title, outcome.location_id
            ),
        },
    }
}

pub(crate) fn format_summary(report: &EnrichmentRunReport) -> String {
    let mut line = format!(
        "traffic enrichment complete: {} total, {} successful, {} failed, {} skipped",
        report.total, report.successful, report.failed, report.skipped
    );
    if report.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}
