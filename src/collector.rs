// src/collector.rs
use crate::query::ReverseQuery;
use crate::session::Session;
use crate::types::Termination;
use crate::utils::normalize_domain;
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
struct WhoxyResponse {
    status: i64,
    #[serde(default)]
    status_reason: Option<String>,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    search_result: Vec<WhoxyDomain>,
}

#[derive(Debug, Deserialize)]
struct WhoxyDomain {
    domain_name: String,
}

/// One successfully decoded result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub total_pages: u32,
    pub domains: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Page(ResultPage),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub domains: HashSet<String>,
    pub pages_fetched: u32,
    pub termination: Termination,
}

pub struct WhoxyCollector {
    session: Session,
}

impl WhoxyCollector {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Fetch a single page. Transport errors, undecodable bodies and a
    /// non-success `status` all come back as `PageOutcome::Failed`.
    pub async fn fetch_page(&self, query: &ReverseQuery, page: u32) -> PageOutcome {
        let url = query.page_url(page);

        let response: WhoxyResponse = match self.session.get_json(url.as_str()).await {
            Ok(response) => response,
            Err(e) => return PageOutcome::Failed(e.to_string()),
        };

        if response.status != 1 {
            let reason = response
                .status_reason
                .unwrap_or_else(|| format!("API status {}", response.status));
            return PageOutcome::Failed(reason);
        }

        if page == 1 {
            if let Some(total) = response.total_results {
                debug!("Whoxy reports {} results for {}={}", total, query.field(), query.value());
            }
        }

        let domains = response
            .search_result
            .into_iter()
            .filter_map(|entry| normalize_domain(&entry.domain_name))
            .collect();

        PageOutcome::Page(ResultPage {
            total_pages: response.total_pages,
            domains,
        })
    }

    /// Walk every page the API reports, merging domains into one set.
    ///
    /// The page count from the latest response bounds the loop. A failed page
    /// ends collection; nothing is retried.
    pub async fn collect(&self, query: &ReverseQuery) -> Collection {
        let mut domains = HashSet::new();
        let mut page: u32 = 1;
        let mut total_pages: u32 = 1;
        let mut pages_fetched = 0;

        while page <= total_pages {
            let outcome = self.fetch_page(query, page).await;
            pages_fetched += 1;

            match outcome {
                PageOutcome::Page(result) => {
                    total_pages = result.total_pages;
                    debug!(
                        "Page {}/{}: {} domains",
                        page,
                        total_pages,
                        result.domains.len()
                    );
                    domains.extend(result.domains);
                }
                PageOutcome::Failed(reason) => {
                    warn!("Whoxy page {} failed, stopping collection: {}", page, reason);
                    return Collection {
                        domains,
                        pages_fetched,
                        termination: Termination::Failed { page, reason },
                    };
                }
            }

            page += 1;
        }

        info!(
            "Collected {} candidate domains from {} page(s)",
            domains.len(),
            pages_fetched
        );

        Collection {
            domains,
            pages_fetched,
            termination: Termination::Exhausted,
        }
    }
}
