// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wikictl migrate`, `export`, `preview`, and `reset`.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use tracing::info;
use wikictl_core::WikictlError;
use wikictl_vault::{
    EnvLegacySource, MigrationCoordinator, MigrationDirection, MigrationReport, PreviewEntry,
};

use crate::app::App;

pub fn run_migrate(
    app: &mut App,
    overwrite: bool,
    from_file: Option<&Path>,
    dry_run: bool,
) -> Result<(), WikictlError> {
    app.unlock()?;

    if dry_run {
        let entries = match from_file {
            Some(path) => {
                let source = EnvLegacySource::from_env_file(&app.config.legacy, path)?;
                MigrationCoordinator::new(&mut app.store, &source)
                    .preview_migration(MigrationDirection::ToEncrypted, overwrite)?
            }
            None => app
                .coordinator()
                .preview_migration(MigrationDirection::ToEncrypted, overwrite)?,
        };
        print_preview(&entries);
        return Ok(());
    }

    let report = match from_file {
        Some(path) => {
            let legacy_config = app.config.legacy.clone();
            app.coordinator()
                .import_env_file(&legacy_config, path, overwrite)?
        }
        None => app.coordinator().migrate_to_encrypted(overwrite)?,
    };
    print_report(&report);

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(WikictlError::MalformedInput(format!(
            "{} instance(s) could not be migrated",
            report.errors.len()
        )))
    }
}

fn print_report(report: &MigrationReport) {
    println!(
        "Migrated: {}  Skipped: {}  Errors: {}",
        report.migrated.len(),
        report.skipped.len(),
        report.errors.len()
    );
    for id in &report.migrated {
        println!("  + {id}");
    }
    for id in &report.skipped {
        println!("  = {id} (already in store; use --overwrite to replace)");
    }
    for failure in &report.errors {
        println!("  ! {}: {}", failure.id, failure.message);
    }
}

fn print_preview(entries: &[PreviewEntry]) {
    if entries.is_empty() {
        println!("Nothing to do.");
        return;
    }
    for entry in entries {
        println!("  {:<16} {:<24} {}", entry.id, entry.name, entry.action);
    }
}

pub fn run_export(app: &mut App, output: Option<&Path>) -> Result<(), WikictlError> {
    app.unlock()?;
    let text = app.coordinator().generate_env_from_encrypted()?;

    match output {
        Some(path) => {
            write_private(path, &text)?;
            info!(path = %path.display(), "credentials exported");
            eprintln!("Exported to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Replace `path` with `text`, readable only by the owner on Unix.
///
/// The temp file is created with mode 0600 and renamed over `path`, so an
/// existing file with wider permissions is replaced rather than reused.
fn write_private(path: &Path, text: &str) -> Result<(), WikictlError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(WikictlError::storage)?;
    tmp.write_all(text.as_bytes()).map_err(WikictlError::storage)?;
    tmp.as_file().sync_all().map_err(WikictlError::storage)?;
    tmp.persist(path).map_err(|e| WikictlError::storage(e.error))?;
    Ok(())
}

pub fn run_preview(
    app: &mut App,
    direction: MigrationDirection,
    overwrite: bool,
) -> Result<(), WikictlError> {
    app.unlock()?;
    let entries = app.coordinator().preview_migration(direction, overwrite)?;
    print_preview(&entries);
    Ok(())
}

pub fn run_reset(app: &mut App, yes: bool) -> Result<(), WikictlError> {
    let path = app.store.path().to_path_buf();
    if !app.store.has_config_file() {
        println!("No credential store at {}", path.display());
        return Ok(());
    }

    if !yes && !confirm(&format!(
        "Delete {} and every stored credential? [y/N] ",
        path.display()
    ))? {
        println!("Aborted.");
        return Ok(());
    }

    app.coordinator().reset_encrypted_config()?;
    println!("Deleted {}", path.display());
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, WikictlError> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        return Err(WikictlError::MalformedInput(
            "refusing to reset without --yes when stdin is not a terminal".to_string(),
        ));
    }
    eprint!("{prompt}");
    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .map_err(WikictlError::storage)?;
    Ok(parse_confirmation(&answer))
}

fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_accepts_only_yes() {
        assert!(parse_confirmation("y\n"));
        assert!(parse_confirmation(" YES "));
        assert!(!parse_confirmation("\n"));
        assert!(!parse_confirmation("no"));
    }

    #[cfg(unix)]
    #[test]
    fn private_export_file_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.env");
        write_private(&path, "A=1\n").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "A=1\n");
    }

    #[cfg(unix)]
    #[test]
    fn private_export_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.env");
        std::fs::write(&path, "OLD=1\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, "WIKIJS_API_KEY=secret\n").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "WIKIJS_API_KEY=secret\n"
        );
    }
}
