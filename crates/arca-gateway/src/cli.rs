use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Output};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use arca_types::{Bundle, Coordinator, LogOrder, ObjectFile, VersionInfo};

use crate::error::{GatewayError, GatewayResult};
use crate::layout::StorageLayout;
use crate::traits::RepositoryGateway;

/// Subprocess-driven gateway backend: every operation shells out to the
/// external `rocfl` tool.
///
/// Tool failures are classified by substring match on stderr and mapped
/// onto the typed gateway errors; any unrecognized non-zero exit is wrapped
/// as a generic `Repository` error. The classification lives entirely in
/// this module so it never leaks past the trait boundary.
pub struct CliRepositoryGateway {
    storage_path: PathBuf,
    storage_layout: StorageLayout,
}

impl CliRepositoryGateway {
    pub const TOOL: &'static str = "rocfl";

    pub fn new(storage_path: impl Into<PathBuf>, storage_layout: StorageLayout) -> Self {
        Self {
            storage_path: storage_path.into(),
            storage_layout,
        }
    }

    fn run(&self, args: &[OsString]) -> GatewayResult<Output> {
        debug!(tool = Self::TOOL, ?args, "invoking versioning tool");
        Command::new(Self::TOOL)
            .arg("-r")
            .arg(&self.storage_path)
            .args(args)
            .output()
            .map_err(GatewayError::from)
    }

    fn has_staged_changes(&self, id: &str) -> GatewayResult<bool> {
        let output = self.run(&to_args(&["status", id]))?;
        Ok(output.status.success())
    }
}

impl RepositoryGateway for CliRepositoryGateway {
    fn create_repository(&self) -> GatewayResult<()> {
        let output = self.run(&to_args(&[
            "init",
            "-l",
            self.storage_layout.extension_name(),
        ]))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(repository_error(&output))
        }
    }

    fn has_object(&self, id: &str) -> GatewayResult<bool> {
        let output = self.run(&to_args(&["info", id]))?;
        if output.status.success() {
            return Ok(true);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(id, &stderr) {
            Ok(false)
        } else {
            Err(repository_error(&output))
        }
    }

    fn create_staged_object(&self, id: &str) -> GatewayResult<()> {
        let output = self.run(&to_args(&["new", id]))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_new_failure(id, &stderr)
            .unwrap_or_else(|| repository_error(&output)))
    }

    fn stage_object_files(&self, id: &str, source_bundle: &Bundle) -> GatewayResult<()> {
        for entry in &source_bundle.entries {
            let mut args: Vec<OsString> = to_args(&["cp", "-r", id]);
            args.push(source_bundle.resolve(entry).into_os_string());
            args.push("--".into());
            let mut destination = OsString::from("/");
            destination.push(entry.as_os_str());
            args.push(destination);

            let output = self.run(&args)?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                if is_not_found(id, &stderr) {
                    return Err(GatewayError::ObjectDoesNotExist(id.to_owned()));
                }
                return Err(repository_error(&output));
            }
        }
        Ok(())
    }

    fn commit_object_changes(
        &self,
        id: &str,
        coordinator: &Coordinator,
        message: &str,
        date: Option<DateTime<Utc>>,
    ) -> GatewayResult<()> {
        let mut args = to_args(&["commit", id, "-n"]);
        args.push(coordinator.username.clone().into());
        args.push("-a".into());
        args.push(coordinator.mailto_address().into());
        args.push("-m".into());
        args.push(message.into());
        if let Some(date) = date {
            args.push("--created".into());
            args.push(date.to_rfc3339().into());
        }

        let output = self.run(&args)?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(classify_commit_failure(id, &stderr)
            .unwrap_or_else(|| repository_error(&output)))
    }

    fn get_object_files(&self, id: &str, include_staged: bool) -> GatewayResult<Vec<ObjectFile>> {
        let has_staged_changes = self.has_staged_changes(id)?;
        if !self.has_object(id)? && !has_staged_changes {
            return Err(GatewayError::ObjectDoesNotExist(id.to_owned()));
        }

        let flags = if include_staged && has_staged_changes {
            "-ptS"
        } else {
            "-pt"
        };
        let output = self.run(&to_args(&["ls", flags, id]))?;
        if !output.status.success() {
            return Err(repository_error(&output));
        }
        Ok(parse_ls_output(&String::from_utf8_lossy(&output.stdout)))
    }

    fn log(&self, id: &str, order: LogOrder) -> GatewayResult<Vec<VersionInfo>> {
        let output = self.run(&to_args(&["log", id]))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_not_found(id, &stderr) {
                return Err(GatewayError::ObjectDoesNotExist(id.to_owned()));
            }
            return Err(repository_error(&output));
        }

        let mut entries = parse_log_output(&String::from_utf8_lossy(&output.stdout))?;
        entries.sort_by_key(|entry| entry.version);
        if order == LogOrder::Descending {
            entries.reverse();
        }
        Ok(entries)
    }

    fn purge_object(&self, id: &str) -> GatewayResult<()> {
        let output = self.run(&to_args(&["purge", "-f", id]))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(id, &stderr) {
            // Purging a missing object is a no-op, not an error.
            warn!(object_id = id, "purge requested for missing object");
            return Ok(());
        }
        Err(repository_error(&output))
    }
}

fn to_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

fn repository_error(output: &Output) -> GatewayError {
    GatewayError::Repository(String::from_utf8_lossy(&output.stderr).trim().to_owned())
}

fn is_not_found(id: &str, stderr: &str) -> bool {
    stderr.contains(&format!("Not found: Object {id}"))
}

fn classify_new_failure(id: &str, stderr: &str) -> Option<GatewayError> {
    let already_staged =
        format!("Cannot create object {id} because it already exists in staging");
    stderr
        .contains(&already_staged)
        .then(|| GatewayError::StagedObjectAlreadyExists(id.to_owned()))
}

fn classify_commit_failure(id: &str, stderr: &str) -> Option<GatewayError> {
    let no_staged_changes = format!("No staged changes found for object {id}");
    stderr
        .contains(&no_staged_changes)
        .then(|| GatewayError::NoStagedChanges(id.to_owned()))
}

/// Parse `rocfl ls -pt` output: one `logical<TAB>physical` mapping per line.
fn parse_ls_output(stdout: &str) -> Vec<ObjectFile> {
    stdout
        .lines()
        .filter_map(|line| {
            let (logical, literal) = line.split_once('\t')?;
            Some(ObjectFile::new(logical.trim(), literal.trim()))
        })
        .collect()
}

/// Parse `rocfl log` output into version entries.
///
/// The tool prints blocks of the form:
/// ```text
/// Version 2
/// Author:  name <mailto:someone@example.edu>
/// Date:    2023-05-01 17:06:09 +00:00
/// Message: Second version
/// ```
fn parse_log_output(stdout: &str) -> GatewayResult<Vec<VersionInfo>> {
    let mut entries = Vec::new();
    let mut current: Option<VersionInfo> = None;

    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("Version ") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            let version = rest.trim().parse::<u32>().map_err(|_| {
                GatewayError::Repository(format!("unparseable log version line: {line}"))
            })?;
            current = Some(VersionInfo {
                version,
                author: String::new(),
                date: Utc::now(),
                message: String::new(),
            });
        } else if let Some(entry) = current.as_mut() {
            if let Some(author) = line.strip_prefix("Author:") {
                entry.author = author.trim().to_owned();
            } else if let Some(date) = line.strip_prefix("Date:") {
                entry.date = parse_log_date(date.trim())?;
            } else if let Some(message) = line.strip_prefix("Message:") {
                entry.message = message.trim().to_owned();
            }
        }
    }
    if let Some(entry) = current.take() {
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_log_date(raw: &str) -> GatewayResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %:z"))
        .map(|date| date.with_timezone(&Utc))
        .map_err(|_| GatewayError::Repository(format!("unparseable log date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_staged_object_conflict() {
        let stderr =
            "Illegal state: Cannot create object deposit_one because it already exists in staging";
        assert!(matches!(
            classify_new_failure("deposit_one", stderr),
            Some(GatewayError::StagedObjectAlreadyExists(_))
        ));
        assert!(classify_new_failure("deposit_two", stderr).is_none());
    }

    #[test]
    fn classifies_missing_staged_changes() {
        let stderr = "Error: No staged changes found for object deposit_one";
        assert!(matches!(
            classify_commit_failure("deposit_one", stderr),
            Some(GatewayError::NoStagedChanges(_))
        ));
    }

    #[test]
    fn recognizes_not_found_by_object_id() {
        assert!(is_not_found("deposit_one", "Not found: Object deposit_one"));
        assert!(!is_not_found("deposit_one", "Not found: Object deposit_two"));
    }

    #[test]
    fn parses_ls_output_into_object_files() {
        let stdout = "A.txt\t/storage/deposit_one/v1/content/A.txt\n\
                      B/B.txt\t/storage/deposit_one/v2/content/B/B.txt\n";
        let files = parse_ls_output(stdout);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].logical_path, PathBuf::from("A.txt"));
        assert_eq!(
            files[1].literal_path,
            PathBuf::from("/storage/deposit_one/v2/content/B/B.txt")
        );
    }

    #[test]
    fn parses_empty_ls_output() {
        assert!(parse_ls_output("").is_empty());
    }

    #[test]
    fn parses_log_output_blocks() {
        let stdout = "\
Version 1
Author:  test <mailto:test@example.edu>
Date:    2023-05-01 17:06:09 +00:00
Message: First version

Version 2
Author:  test <mailto:test@example.edu>
Date:    2023-06-02T09:00:00+00:00
Message: Second version
";
        let entries = parse_log_output(stdout).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].version, 1);
        assert_eq!(entries[0].author, "test <mailto:test@example.edu>");
        assert_eq!(entries[0].message, "First version");
        assert_eq!(entries[1].version, 2);
    }

    #[test]
    fn rejects_unparseable_log_date() {
        let stdout = "Version 1\nDate: not-a-date\n";
        assert!(parse_log_output(stdout).is_err());
    }
}
