use crate::core::models::import_outcome::ImportSummary;

const STATUS_PREFIX: &str = "[GNUPG:] IMPORT_RES ";

/// Reads the counters of a `gpg --import` run.
///
/// Prefers the machine-readable `IMPORT_RES` status line (`--status-fd`)
/// and falls back to the human summary gpg prints on stderr
/// (`Total number processed`, `imported:`, `unchanged:`).
pub fn parse_import_result(status_output: &str, stderr: &str) -> Option<ImportSummary> {
    parse_status_line(status_output).or_else(|| parse_summary_text(stderr))
}

fn parse_status_line(status_output: &str) -> Option<ImportSummary> {
    let line = status_output
        .lines()
        .find_map(|l| l.trim().strip_prefix(STATUS_PREFIX))?;

    let counts: Vec<u32> = line
        .split_whitespace()
        .map(|n| n.parse().unwrap_or(0))
        .collect();

    // count no_user_id imported imported_rsa unchanged ...
    Some(ImportSummary {
        processed: *counts.first()?,
        imported: *counts.get(2)?,
        unchanged: counts.get(4).copied().unwrap_or(0),
    })
}

fn parse_summary_text(stderr: &str) -> Option<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut seen = false;

    for line in stderr.lines() {
        let body = line.trim().trim_start_matches("gpg:").trim();
        let Some((label, value)) = body.rsplit_once(':') else {
            continue;
        };
        let Ok(n) = value.trim().parse::<u32>() else {
            continue;
        };

        match label.trim() {
            "Total number processed" => {
                summary.processed = n;
                seen = true;
            }
            "imported" => {
                summary.imported = n;
                seen = true;
            }
            "unchanged" => {
                summary.unchanged = n;
                seen = true;
            }
            _ => {}
        }
    }

    seen.then_some(summary)
}
