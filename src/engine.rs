use crate::cli::Args;
use crate::collector::WhoxyCollector;
use crate::config;
use crate::error::Result;
use crate::extractor::extract_all;
use crate::output::{write_field_listing, OutputManager};
use crate::pipeline::{verify_candidates, PipelineOptions};
use crate::query::ReverseQuery;
use crate::session::Session;
use crate::types::{
    Config, IdentityField, OutputFormat, RunReport, Seed, WhoxyFinderError, DEFAULT_CONFIG_PATH,
};
use crate::verifier::Verifier;
use crate::whois::{WhoisClient, WhoisLookup};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct WhoxyFinderEngine {
    config: Config,
    session: Session,
    whois: Arc<dyn WhoisLookup>,
    output_manager: OutputManager,
}

impl WhoxyFinderEngine {
    pub fn new(args: &Args) -> Result<Self> {
        let config_path = args
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = config::load_config(&config_path)?;

        // Command line wins over file and environment
        if let Some(output_file) = &args.output_file {
            config.output.file = Some(output_file.clone());
        }
        if args.json {
            config.output.format = OutputFormat::Json;
        }
        config.output.quiet = args.quiet;
        config.workers = usize::from(args.threads);
        config.delay = Duration::from_secs(args.sleep);
        config::validate_config(&config)?;

        let whois = Arc::new(WhoisClient::new(config.whois.clone()));
        Self::with_whois(config, whois)
    }

    /// Build an engine around any WHOIS backend.
    pub fn with_whois(config: Config, whois: Arc<dyn WhoisLookup>) -> Result<Self> {
        let session = Session::new(&config)?;
        let output_manager = OutputManager::new(config.output.clone());

        Ok(Self {
            config,
            session,
            whois,
            output_manager,
        })
    }

    /// Resolve the seed, search, verify and write the results.
    ///
    /// Returns `None` for an inspection seed, which only prints the fields of
    /// the seed domain.
    pub async fn run(&self, seed: &Seed) -> Result<Option<RunReport>> {
        if let Seed::Inspect { domain } = seed {
            self.inspect(domain).await?;
            return Ok(None);
        }

        let (field, query) = self.resolve_query(seed).await?;
        let report = self.search(field, &query).await?;
        self.output_manager.write_report(&report)?;
        Ok(Some(report))
    }

    pub async fn inspect(&self, domain: &str) -> Result<()> {
        let record = self.whois.lookup(domain).await?;
        let fields = extract_all(&record.text);
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        write_field_listing(&mut handle, &fields)
    }

    /// The field and literal value a search runs on.
    pub async fn resolve_query(&self, seed: &Seed) -> Result<(IdentityField, String)> {
        match seed {
            Seed::Direct { field, value } => Ok((*field, value.clone())),
            Seed::FromDomain { domain, field } => {
                let record = self.whois.lookup(domain).await?;
                let value = record.field(*field).ok_or_else(|| WhoxyFinderError::FieldNotFound {
                    domain: domain.clone(),
                    field: field.label(),
                })?;
                info!("Using {} '{}' from {}", field.label(), value, domain);
                Ok((*field, value.to_string()))
            }
            Seed::Inspect { domain } => Err(WhoxyFinderError::InvalidInput(format!(
                "no search field chosen for {}",
                domain
            ))),
        }
    }

    /// Collect candidates for `field=query` and confirm each one over WHOIS.
    pub async fn search(&self, field: IdentityField, query: &str) -> Result<RunReport> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(WhoxyFinderError::MissingApiKey)?;
        let reverse = ReverseQuery::new(&self.config.api_base_url, api_key, field, query)?;

        info!("Searching Whoxy for {}={}", field, query);
        let start_time = Instant::now();

        let collection = WhoxyCollector::new(self.session.clone()).collect(&reverse).await;

        let verifier = Verifier::new(Arc::clone(&self.whois), self.config.delay);
        let options = PipelineOptions {
            workers: self.config.workers,
            show_progress: !self.config.output.quiet,
        };
        let verification = verify_candidates(&verifier, &collection.domains, query, &options).await;

        info!(
            "candidates={}, verified={}",
            verification.candidates,
            verification.verified.len()
        );

        Ok(RunReport {
            field,
            query: query.to_string(),
            candidates: verification.candidates,
            verified_count: verification.verified.len(),
            rejected: verification.rejected,
            failed: verification.failed,
            pages_fetched: collection.pages_fetched,
            termination: collection.termination,
            verified: verification.verified,
            duration: start_time.elapsed(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}
