use crate::cli::context::RunContext;
use crate::cli::output;
use crate::core::errors::Result;

/// Execute the `keyring-sync list` command.
pub fn execute(ctx: &RunContext) -> Result<()> {
    let keys = ctx.key_tool().list_keys(ctx.store())?;

    if keys.is_empty() {
        output::warning(&format!("No keys in {}", ctx.store().display()));
        return Ok(());
    }

    output::header(&format!("{} ({} keys)", ctx.store().display(), keys.len()));
    for key in &keys {
        println!("  • {}  {}", key.fingerprint, key.uid);

        let created = key
            .created
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        let expires = key
            .expires
            .map(|d| d.to_string())
            .unwrap_or_else(|| "never".into());
        output::detail(&format!(
            "{}  validity: {}  created: {created}  expires: {expires}",
            key.key_type, key.validity
        ));
    }

    Ok(())
}
