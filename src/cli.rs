use crate::error::Result;
use crate::types::{IdentityField, Seed, WhoxyFinderError};
use crate::utils::{is_valid_domain, normalize_domain};
use clap::Parser;
use log::warn;
use std::ffi::OsString;
use std::path::PathBuf;

/// Single-dash spellings accepted for the direct search flags.
const LEGACY_FLAGS: [&str; 3] = ["cn", "on", "em"];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "whoxyfinder",
    version,
    about = "Gather the root domains of an organization from Whoxy reverse WHOIS",
    long_about = "WhoxyFinder searches the Whoxy reverse WHOIS index for domains registered to a company,\nowner or email address, then confirms each candidate against its live WHOIS record."
)]
pub struct Args {
    /// Domain to read registrant details from
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Field of the domain's record to search on, for use with -d [1=company, 2=owner, 3=email]
    #[arg(short = 'c', long = "choice", value_enum, value_name = "CHOICE")]
    pub choice: Option<IdentityField>,

    /// Company name to look for
    #[arg(long = "company-name", visible_alias = "cn", value_name = "NAME")]
    pub company_name: Option<String>,

    /// Owner name to look for
    #[arg(long = "owner-name", visible_alias = "on", value_name = "NAME")]
    pub owner_name: Option<String>,

    /// Email to look for
    #[arg(long = "email", visible_alias = "em", value_name = "EMAIL")]
    pub email: Option<String>,

    /// Output file (results are also printed to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Number of concurrent WHOIS verifications
    #[arg(short = 't', long = "threads", default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Seconds to wait before each WHOIS verification
    #[arg(short = 's', long = "sleep", default_value_t = 0, value_name = "SECS")]
    pub sleep: u64,

    /// Only print verified domains
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    pub verbose: bool,

    /// Emit a JSON report instead of plain lines
    #[arg(long = "json")]
    pub json: bool,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,
}

/// Rewrite `-cn`, `-on` and `-em` to their long form.
///
/// Clap reads `-cn` as `-c n`, so these have to be fixed up before parsing.
/// `-cn=VALUE` is rewritten too. Nothing after a bare `--` is touched.
pub fn expand_legacy_flags<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    argv.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            let Some(rest) = text.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if LEGACY_FLAGS.contains(&name) {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

impl Args {
    /// Parse the process arguments, accepting the single-dash legacy flags.
    pub fn parse_env() -> Self {
        Self::parse_from(expand_legacy_flags(std::env::args_os()))
    }

    /// True when no seed value of any kind was supplied.
    pub fn has_no_seed(&self) -> bool {
        self.domain.is_none()
            && self.company_name.is_none()
            && self.owner_name.is_none()
            && self.email.is_none()
    }

    /// Decide how the search value is obtained.
    ///
    /// A domain wins over direct values, then company, owner name and email
    /// in that order.
    pub fn seed(&self) -> Result<Seed> {
        if let Some(domain) = &self.domain {
            let domain = normalize_domain(domain)
                .filter(|d| is_valid_domain(d))
                .ok_or_else(|| WhoxyFinderError::InvalidDomain(domain.clone()))?;

            return Ok(match self.choice {
                Some(field) => Seed::FromDomain { domain, field },
                None => Seed::Inspect { domain },
            });
        }

        if self.choice.is_some() {
            warn!("--choice only applies together with --domain; ignoring it");
        }

        let direct = [
            (IdentityField::Organization, &self.company_name),
            (IdentityField::OwnerName, &self.owner_name),
            (IdentityField::Email, &self.email),
        ];

        for (field, value) in direct {
            if let Some(value) = value {
                if value.trim().is_empty() {
                    return Err(WhoxyFinderError::InvalidInput(format!(
                        "empty value for {}",
                        field.label()
                    )));
                }
                return Ok(Seed::Direct {
                    field,
                    value: value.clone(),
                });
            }
        }

        Err(WhoxyFinderError::InvalidInput(
            "Please provide a domain, company name, owner name or email".to_string(),
        ))
    }
}
