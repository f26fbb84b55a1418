// src/pipeline.rs
use crate::verifier::Verifier;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub workers: usize,
    pub show_progress: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            show_progress: false,
        }
    }
}

/// Outcome of verifying a candidate set.
///
/// `verified.len() + rejected + failed == candidates` always holds; only
/// `verified` and `rejected` count as completed checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub candidates: usize,
    pub verified: Vec<String>,
    pub rejected: usize,
    pub failed: usize,
}

fn progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template(
        "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Verify every candidate with at most `options.workers` lookups in flight.
///
/// Tasks are spawned lazily as slots free up, so a panicking or failing
/// lookup only costs its own candidate. Results are gathered in completion
/// order; `verified` is sorted before returning.
pub async fn verify_candidates(
    verifier: &Verifier,
    candidates: &HashSet<String>,
    query: &str,
    options: &PipelineOptions,
) -> VerificationReport {
    let total = candidates.len();
    let workers = options.workers.max(1);
    let progress = progress_bar(total as u64, options.show_progress);
    let query: Arc<str> = Arc::from(query);

    info!("Verifying {} candidates with {} worker(s)", total, workers);

    let mut tasks = stream::iter(candidates.iter().cloned())
        .map(|domain| {
            let verifier = verifier.clone();
            let query = Arc::clone(&query);
            tokio::spawn(async move {
                let result = verifier.verify(&domain, &query).await;
                (domain, result)
            })
        })
        .buffer_unordered(workers);

    let mut report = VerificationReport {
        candidates: total,
        ..VerificationReport::default()
    };

    while let Some(joined) = tasks.next().await {
        match joined {
            Ok((_, Ok(Some(domain)))) => {
                progress.set_message(domain.clone());
                report.verified.push(domain);
            }
            Ok((_, Ok(None))) => report.rejected += 1,
            Ok((domain, Err(e))) => {
                warn!("{}: WHOIS lookup failed: {}", domain, e);
                report.failed += 1;
            }
            Err(e) => {
                error!("Verification task aborted: {}", e);
                report.failed += 1;
            }
        }
        progress.inc(1);
    }

    progress.finish_and_clear();
    report.verified.sort();
    report
}
