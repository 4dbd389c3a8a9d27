//! plan-finder: command-line front end for the `plan-search` engine.
//!
//! Loads a TOML configuration, runs discovery for one organization or a
//! batch of them, and renders the ranked candidates as text or JSON.
//!
//! # Architecture
//!
//! - **config**: `[search]` discovery settings and `[output]` format
//! - **batch**: tab-separated organization lists
//! - **report**: text and JSON rendering
//! - the `plan-finder` binary wires these to the command line

pub mod batch;
pub mod config;
pub mod error;
pub mod report;

pub use batch::{parse_batch, BatchEntry};
pub use config::{FinderConfig, OutputFormat};
pub use error::{FinderError, Result};
pub use report::OrganizationReport;

use plan_search::{BrowserLauncher, DiscoveryEngine, DiscoveryRequest, Prober};

/// Run discovery for each entry in turn.
///
/// Every organization gets its own browser session. An entry that cannot
/// be searched (blank name, missing domain under the domain policy) is
/// reported with its error and the batch moves on.
pub async fn run_batch<L, P>(
    engine: &DiscoveryEngine<L, P>,
    entries: &[BatchEntry],
    top_n: Option<usize>,
) -> Vec<OrganizationReport>
where
    L: BrowserLauncher,
    P: Prober,
{
    let mut reports = Vec::with_capacity(entries.len());
    for entry in entries {
        let request = DiscoveryRequest::new(entry.name.as_str())
            .with_region(entry.region.as_deref())
            .with_domain(entry.domain.as_deref())
            .with_top_n(top_n);
        let report = match engine.discover(&request).await {
            Ok(candidates) => {
                OrganizationReport::found(&entry.name, entry.region.as_deref(), candidates)
            }
            Err(err) => {
                tracing::warn!(line = entry.line, error = %err, "batch entry skipped");
                OrganizationReport::failed(&entry.name, entry.region.as_deref(), err)
            }
        };
        reports.push(report);
    }
    reports
}
