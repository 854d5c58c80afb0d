use std::collections::HashSet;

use tracing::error;

use crate::cli::OutputFormat;
use crate::cli::context::RunContext;
use crate::cli::output;
use crate::core::errors::{KeyringSyncError, Result};
use crate::core::models::key_record::{KeyRecord, validate_key_id};
use crate::core::models::run_report::{RecordResult, RecordStatus, RunReport};

/// Execute the `keyring-sync import` command.
///
/// Records are processed in configuration order, one at a time. By default
/// the run stops at the first failed record; `--keep-going` carries on and
/// reports every failure at the end.
pub fn execute(
    ctx: &RunContext,
    selected: &[String],
    keep_going: bool,
    format: OutputFormat,
) -> Result<()> {
    let records = select_records(&ctx.records, selected, ctx.sentinel())?;
    let importer = ctx.importer();

    output::header(&format!("keyring-sync import: {}", ctx.store().display()));

    let mut results = Vec::with_capacity(records.len());
    let mut not_processed = 0;

    for (idx, record) in records.iter().enumerate() {
        let sp = output::spinner(&format!("{}: checking...", record.identifier));
        let outcome = importer.ensure_imported(ctx.store(), record);
        output::clear_spinner(sp);

        let result = match outcome {
            Ok(outcome) => {
                let status = if outcome.changed {
                    output::success(&format!("{}: imported", record.identifier));
                    RecordStatus::Changed
                } else if outcome.fetched {
                    output::unchanged(&format!("{}: refreshed, no change", record.identifier));
                    RecordStatus::Unchanged
                } else {
                    output::unchanged(&format!("{}: already present", record.identifier));
                    RecordStatus::Unchanged
                };
                RecordResult {
                    id: record.identifier.clone(),
                    url: record.source_url.clone(),
                    status,
                    fetched: outcome.fetched,
                    artifact_sha256: outcome.artifact_sha256,
                    error: None,
                }
            }
            Err(e) => {
                error!(key = %record.identifier, error = %e, "import failed");
                output::error(&format!("{}: {e}", record.identifier));
                RecordResult {
                    id: record.identifier.clone(),
                    url: record.source_url.clone(),
                    status: RecordStatus::Failed,
                    fetched: false,
                    artifact_sha256: None,
                    error: Some(first_line(&e.to_string())),
                }
            }
        };

        let failed = result.status == RecordStatus::Failed;
        results.push(result);

        if failed && !keep_going {
            not_processed = records.len() - idx - 1;
            break;
        }
    }

    let report = RunReport::new(ctx.store().display().to_string(), results);

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::from)?;
            println!("{json}");
        }
        OutputFormat::Text => print_summary(&report, not_processed),
    }

    if report.failed > 0 {
        return Err(KeyringSyncError::RecordsFailed {
            failed: report.failed,
            total: records.len(),
        });
    }

    Ok(())
}

/// Narrow the configured records to the `--key` selection, keeping
/// configuration order.
fn select_records(
    records: &[KeyRecord],
    selected: &[String],
    sentinel: &str,
) -> Result<Vec<KeyRecord>> {
    if selected.is_empty() {
        return Ok(records.to_vec());
    }

    let mut wanted = HashSet::new();
    for id in selected {
        let normalized = if id == sentinel {
            id.clone()
        } else {
            validate_key_id(id)?
        };

        if !records.iter().any(|r| r.identifier == normalized) {
            return Err(KeyringSyncError::InvalidConfig {
                detail: format!("key '{id}' is not configured"),
            });
        }
        wanted.insert(normalized);
    }

    Ok(records
        .iter()
        .filter(|r| wanted.contains(&r.identifier))
        .cloned()
        .collect())
}

fn print_summary(report: &RunReport, not_processed: usize) {
    let changed = report
        .results
        .iter()
        .filter(|r| r.status == RecordStatus::Changed)
        .count();

    if not_processed > 0 {
        output::warning(&format!(
            "Stopped after a failure; {not_processed} key(s) not processed (use --keep-going to continue past failures)"
        ));
    }

    if report.failed == 0 {
        let state = if report.changed { "changed" } else { "unchanged" };
        output::success(&format!(
            "{} key(s) processed, {changed} imported, keyring {state}",
            report.results.len()
        ));
    }
}

fn first_line(msg: &str) -> String {
    msg.lines().next().unwrap_or_default().to_string()
}
