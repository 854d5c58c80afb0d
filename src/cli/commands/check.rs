use crate::cli::context::RunContext;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute the `keyring-sync check` command.
///
/// Prints the import decision for every configured key. Nothing is
/// fetched and no scratch directory is created.
pub fn execute(ctx: &RunContext) -> Result<()> {
    let importer = ctx.importer();

    output::header(&format!("keyring-sync check: {}", ctx.store().display()));

    let mut pending = 0;
    for record in &ctx.records {
        let decision = importer.decide(ctx.store(), record)?;
        let line = format!("{}: {decision}", record.identifier);
        if decision.needs_import {
            pending += 1;
            output::warning(&line);
            output::detail(&record.source_url);
        } else {
            output::unchanged(&line);
        }
    }

    if pending == 0 {
        output::success("All keys present.");
    } else {
        output::success(&format!(
            "{pending} of {} key(s) would be fetched by 'keyring-sync import'.",
            ctx.records.len()
        ));
    }

    Ok(())
}
