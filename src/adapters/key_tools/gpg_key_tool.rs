use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::adapters::parsers::armor_parser::ArmorParser;
use crate::adapters::parsers::colons_parser::{parse_fingerprints, parse_keys};
use crate::adapters::parsers::import_result_parser::parse_import_result;
use crate::core::errors::{KeyringSyncError, Result};
use crate::core::models::import_outcome::ImportSummary;
use crate::core::models::key::Key;
use crate::core::models::key_record::{fingerprint_matches, validate_key_id};
use crate::core::traits::key_tool::KeyTool;

/// Key tool that shells out to the system `gpg` binary.
///
/// Every call targets one keyring file explicitly
/// (`--no-default-keyring --keyring <path>`), so the user's own keyring
/// is never read or written.
pub struct GpgKeyTool {
    /// Path to the gpg binary (defaults to "gpg").
    gpg_path: PathBuf,
    /// Optional `--homedir` for trustdb and agent state.
    homedir: Option<PathBuf>,
    parser: ArmorParser,
}

impl GpgKeyTool {
    /// Create a tool with a custom gpg binary path.
    pub fn with_path(gpg_path: PathBuf) -> Self {
        Self {
            gpg_path,
            homedir: None,
            parser: ArmorParser,
        }
    }

    pub fn with_homedir(mut self, homedir: Option<PathBuf>) -> Self {
        self.homedir = homedir;
        self
    }

    /// List every primary key in `store`.
    pub fn list_keys(&self, store: &Path) -> Result<Vec<Key>> {
        if !store.exists() {
            return Ok(Vec::new());
        }

        let output = self.run_gpg(store, &["--list-keys", "--with-colons"])?;
        if !output.status.success() {
            return Err(KeyringSyncError::ImportFailed {
                reason: format!(
                    "could not list keys in {}: {}",
                    store.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(parse_keys(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Run gpg against a single keyring file and return its raw output.
    fn run_gpg(&self, keyring: &Path, args: &[&str]) -> Result<Output> {
        // gpg resolves bare keyring names relative to its homedir.
        let keyring = std::path::absolute(keyring)?;

        let mut cmd = Command::new(&self.gpg_path);
        cmd.env("LC_ALL", "C");
        if let Some(home) = &self.homedir {
            cmd.arg("--homedir").arg(home);
        }
        cmd.args(["--batch", "--no-auto-check-trustdb", "--no-default-keyring"])
            .arg("--keyring")
            .arg(&keyring)
            .args(args);

        debug!(gpg = %self.gpg_path.display(), keyring = %keyring.display(), ?args, "running gpg");

        cmd.output().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                KeyringSyncError::ToolUnavailable {
                    tool: self.gpg_path.display().to_string(),
                    reason: e.to_string(),
                }
            }
            _ => KeyringSyncError::Io(e),
        })
    }
}

impl KeyTool for GpgKeyTool {
    fn check_presence(&self, store: &Path, identifier: &str) -> Result<bool> {
        let key_id = validate_key_id(identifier)?;

        if !store.exists() {
            debug!(store = %store.display(), "keyring store does not exist yet");
            return Ok(false);
        }

        let output = self.run_gpg(store, &["--list-keys", "--with-colons", key_id.as_str()])?;
        if !output.status.success() {
            // gpg exits non-zero when the key is absent.
            debug!(
                key = %key_id,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "key not listed"
            );
            return Ok(false);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_fingerprints(&stdout)
            .iter()
            .any(|fpr| fingerprint_matches(fpr, &key_id)))
    }

    fn normalize_to_binary(&self, artifact: &[u8]) -> Result<Vec<u8>> {
        self.parser.normalize(artifact)
    }

    fn extract_key(&self, keyring: &Path, identifier: &str, dest: &Path) -> Result<()> {
        let key_id = validate_key_id(identifier)?;

        let output = self.run_gpg(keyring, &["--export", key_id.as_str()])?;
        if !output.status.success() {
            return Err(KeyringSyncError::MalformedArtifact {
                url: String::new(),
                reason: format!(
                    "gpg could not read the downloaded keyring: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        // gpg succeeds with empty output when nothing matched.
        if output.stdout.is_empty() {
            return Err(KeyringSyncError::KeyNotFoundInArtifact {
                identifier: key_id,
                url: String::new(),
            });
        }

        std::fs::write(dest, &output.stdout)?;
        Ok(())
    }

    fn import_key(&self, store: &Path, key_file: &Path) -> Result<ImportSummary> {
        let created = create_store_file(store)?;

        let key_file = key_file.to_string_lossy();
        let result = self
            .run_gpg(store, &["--status-fd", "1", "--import", key_file.as_ref()])
            .and_then(|output| import_result(&output));

        if result.is_err() && created {
            // Leave no empty store behind when the first import failed.
            let _ = std::fs::remove_file(store);
        }
        result
    }
}

/// Create `store` as an empty file if it does not exist yet.
///
/// gpg creates a missing `--keyring` file in keybox format, which apt and
/// gpgv cannot read. An existing empty file stays a plain OpenPGP keyring.
/// Returns whether the file was created.
fn create_store_file(store: &Path) -> Result<bool> {
    if let Some(parent) = store.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    match options.open(store) {
        Ok(file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(std::fs::Permissions::from_mode(0o644))?;
            }
            drop(file);
            debug!(store = %store.display(), "created empty keyring store");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Interpret the output of `gpg --status-fd 1 --import`.
fn import_result(output: &Output) -> Result<ImportSummary> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        return Err(KeyringSyncError::ImportFailed {
            reason: format!("gpg exited with error: {}", stderr.trim()),
        });
    }

    parse_import_result(&stdout, &stderr).ok_or_else(|| KeyringSyncError::ImportFailed {
        reason: "gpg did not report an import result".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_gpg() -> GpgKeyTool {
        GpgKeyTool::with_path(PathBuf::from("/nonexistent/bin/gpg"))
    }

    #[test]
    fn missing_store_is_absent_without_running_gpg() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("keyring.gpg");

        let present = missing_gpg()
            .check_presence(&store, "D75CEA17048B9ACBF186794B32637D44F14F620E")
            .unwrap();
        assert!(!present);
        assert!(!store.exists());
    }

    #[test]
    fn missing_binary_is_tool_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("keyring.gpg");
        std::fs::write(&store, [0x99u8, 0x00]).unwrap();

        let err = missing_gpg().check_presence(&store, "DEADBEEF").unwrap_err();
        assert!(matches!(err, KeyringSyncError::ToolUnavailable { .. }));
    }

    #[test]
    fn invalid_key_id_never_reaches_gpg() {
        let dir = tempfile::tempdir().unwrap();
        let err = missing_gpg()
            .extract_key(
                &dir.path().join("k.gpg"),
                "--export-secret-keys",
                &dir.path().join("out.gpg"),
            )
            .unwrap_err();
        assert!(matches!(err, KeyringSyncError::InvalidKeyId { .. }));
    }

    #[test]
    fn list_keys_on_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let keys = missing_gpg().list_keys(&dir.path().join("none.gpg")).unwrap();
        assert!(keys.is_empty());
    }

    #[cfg(unix)]
    fn output(code: i32, stdout: &str, stderr: &str) -> Output {
        use std::os::unix::process::ExitStatusExt;
        Output {
            status: std::process::ExitStatus::from_raw(code << 8),
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[cfg(unix)]
    #[test]
    fn import_result_reads_status_line() {
        let status = "[GNUPG:] IMPORT_RES 1 0 1 0 0 0 0 0 0 0 0 0 0 0\n";
        let summary = import_result(&output(0, status, "")).unwrap();
        assert_eq!(summary.imported, 1);
    }

    #[cfg(unix)]
    #[test]
    fn import_without_result_is_import_failure() {
        let err = import_result(&output(0, "", "")).unwrap_err();
        assert!(matches!(err, KeyringSyncError::ImportFailed { .. }));
        assert!(err.to_string().contains("did not report an import result"));
    }

    #[cfg(unix)]
    #[test]
    fn gpg_error_exit_is_import_failure() {
        let stderr = "gpg: no valid OpenPGP data found.\n";
        let err = import_result(&output(2, "", stderr)).unwrap_err();
        assert!(matches!(err, KeyringSyncError::ImportFailed { .. }));
        assert!(err.to_string().contains("no valid OpenPGP data found"));
    }

    #[test]
    fn missing_store_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("keyrings/agent-archive-keyring.gpg");

        assert!(create_store_file(&store).unwrap());
        assert_eq!(std::fs::read(&store).unwrap(), b"");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&store).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn existing_store_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("keyring.gpg");
        std::fs::write(&store, [0x99u8, 0x00]).unwrap();

        assert!(!create_store_file(&store).unwrap());
        assert_eq!(std::fs::read(&store).unwrap(), [0x99u8, 0x00]);
    }

    #[test]
    fn failed_first_import_removes_created_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("keyring.gpg");
        let key_file = dir.path().join("key.gpg");
        std::fs::write(&key_file, [0x99u8, 0x00]).unwrap();

        let err = missing_gpg().import_key(&store, &key_file).unwrap_err();
        assert!(matches!(err, KeyringSyncError::ToolUnavailable { .. }));
        assert!(!store.exists());
    }

    #[test]
    fn normalize_delegates_to_armor_parser() {
        let binary = [0x99u8, 0x00, 0x0D, 0x04];
        assert_eq!(missing_gpg().normalize_to_binary(&binary).unwrap(), binary);
        assert!(missing_gpg().normalize_to_binary(b"<html>").is_err());
    }
}
