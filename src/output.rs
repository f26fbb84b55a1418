// src/output.rs
use crate::error::{ErrorContext, Result};
use crate::types::{IdentityField, OutputConfig, OutputFormat, RunReport};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct OutputManager {
    config: OutputConfig,
}

impl OutputManager {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Print the report to stdout and mirror it into the output file, if any.
    pub fn write_report(&self, report: &RunReport) -> Result<()> {
        {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            self.write_output(&mut handle, report)?;
        }

        if let Some(file_path) = &self.config.file {
            self.write_to_file(file_path, report)?;
        }

        Ok(())
    }

    fn write_to_file(&self, file_path: &str, report: &RunReport) -> Result<()> {
        if let Some(parent) = Path::new(file_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .output_context(|| format!("Failed to create directory {}", parent.display()))?;
            }
        }

        let mut file = File::create(file_path).output_context(|| format!("Failed to create {}", file_path))?;
        self.write_domains(&mut file, report)?;
        Ok(())
    }

    pub fn write_output<W: Write>(&self, writer: &mut W, report: &RunReport) -> Result<()> {
        match self.config.format {
            OutputFormat::Text => {
                if !self.config.quiet {
                    writeln!(writer, "Results from Whoxy: {}", report.candidates)
                        .output_context(|| "stdout".to_string())?;
                    writeln!(writer, "Verified results: {}", report.verified_count)
                        .output_context(|| "stdout".to_string())?;
                }
                self.write_domains(writer, report)
            }
            OutputFormat::Json => self.write_json(writer, report),
        }
    }

    /// The file copy carries only the result itself, never the summary.
    fn write_domains<W: Write>(&self, writer: &mut W, report: &RunReport) -> Result<()> {
        match self.config.format {
            OutputFormat::Text => {
                for domain in &report.verified {
                    writeln!(writer, "{}", domain).output_context(|| "write failed".to_string())?;
                }
                Ok(())
            }
            OutputFormat::Json => self.write_json(writer, report),
        }
    }

    fn write_json<W: Write>(&self, writer: &mut W, report: &RunReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)
            .output_context(|| "Failed to serialize JSON".to_string())?;
        writeln!(writer, "{}", json).output_context(|| "write failed".to_string())
    }
}

/// Listing printed for `-d` without `-c`.
pub fn write_field_listing<W: Write>(
    writer: &mut W,
    fields: &[(IdentityField, Option<&str>)],
) -> Result<()> {
    for (field, value) in fields {
        writeln!(
            writer,
            "[{}] {}: '{}'",
            field.choice(),
            field.label(),
            value.unwrap_or("")
        )
        .output_context(|| "stdout".to_string())?;
    }
    writeln!(writer, "[>] Use -c and one of the numbers above or see the help.")
        .output_context(|| "stdout".to_string())
}
