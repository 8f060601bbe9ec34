// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wikictl doctor` command implementation.
//!
//! Checks the store file, the password source, every stored record, and the
//! legacy environment, and reports each result on its own line.

use std::io::IsTerminal;
use std::time::{Duration, Instant};

use wikictl_core::{LegacyCredentialSource, WikictlError};
use wikictl_vault::get_store_password;

use crate::app::App;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `wikictl doctor` command. With `--plain`, disables colored output.
///
/// Failing checks are reported, not returned as errors.
pub fn run_doctor(app: &mut App, plain: bool) -> Result<(), WikictlError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = collect_checks(app);
    print_results(&results, use_color);
    Ok(())
}

/// Run every check in order. Later checks are skipped when the store cannot be unlocked.
pub fn collect_checks(app: &mut App) -> Vec<CheckResult> {
    let mut results = vec![check_config(app), check_store_file(app), check_password(app)];

    let unlock = check_unlock(app);
    let unlocked = unlock.status == CheckStatus::Pass;
    results.push(unlock);

    if unlocked {
        results.push(check_records(app));
    }
    results.push(check_legacy(app));
    if unlocked {
        results.push(check_default_instance(app));
    }
    results
}

fn check_config(app: &App) -> CheckResult {
    let start = Instant::now();
    let files = app.config_files();
    if files.is_empty() {
        return CheckResult::new("Configuration", CheckStatus::Pass, "built-in defaults", start);
    }
    let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    CheckResult::new("Configuration", CheckStatus::Pass, names.join(", "), start)
}

fn check_store_file(app: &App) -> CheckResult {
    let start = Instant::now();
    let path = app.store.path();
    if app.store.has_config_file() {
        CheckResult::new("Store file", CheckStatus::Pass, path.display().to_string(), start)
    } else {
        CheckResult::new(
            "Store file",
            CheckStatus::Warn,
            format!("not found: {} (created on first use)", path.display()),
            start,
        )
    }
}

fn check_password(app: &App) -> CheckResult {
    let start = Instant::now();
    if app.store.is_initialized() {
        return CheckResult::new("Password", CheckStatus::Pass, "already unlocked", start);
    }
    if app.asks_password() {
        return CheckResult::new("Password", CheckStatus::Pass, "interactive prompt", start);
    }
    match get_store_password(false) {
        Ok(source) if source.is_weak_default() => CheckResult::new(
            "Password",
            CheckStatus::Warn,
            "machine-derived default; set WIKICTL_STORE_PASSWORD for real protection",
            start,
        ),
        Ok(_) => CheckResult::new("Password", CheckStatus::Pass, "explicit password", start),
        Err(e) => CheckResult::new("Password", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_unlock(app: &mut App) -> CheckResult {
    let start = Instant::now();
    match app.unlock().and_then(|()| app.store.instance_count()) {
        Ok(count) => CheckResult::new(
            "Unlock",
            CheckStatus::Pass,
            format!("{count} stored instance(s)"),
            start,
        ),
        Err(e) => CheckResult::new("Unlock", CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_records(app: &App) -> CheckResult {
    let start = Instant::now();
    let checks = match app.store.verify_all() {
        Ok(checks) => checks,
        Err(e) => return CheckResult::new("Records", CheckStatus::Fail, e.to_string(), start),
    };
    let failed: Vec<&str> = checks
        .iter()
        .filter(|c| c.result.is_err())
        .map(|c| c.id.as_str())
        .collect();
    if failed.is_empty() {
        CheckResult::new(
            "Records",
            CheckStatus::Pass,
            format!("{} decrypted", checks.len()),
            start,
        )
    } else {
        CheckResult::new(
            "Records",
            CheckStatus::Fail,
            format!(
                "{} of {} failed to decrypt: {}",
                failed.len(),
                checks.len(),
                failed.join(", ")
            ),
            start,
        )
    }
}

fn check_legacy(app: &App) -> CheckResult {
    let start = Instant::now();
    let legacy = app.legacy.instance_ids();
    if legacy.is_empty() {
        return CheckResult::new("Legacy env", CheckStatus::Pass, "no legacy variables set", start);
    }
    let stored = app.store.instance_count().unwrap_or(0);
    if stored > 0 {
        CheckResult::new(
            "Legacy env",
            CheckStatus::Warn,
            format!(
                "{} hidden by the store; run `wikictl migrate` and remove the variables",
                legacy.join(", ")
            ),
            start,
        )
    } else {
        CheckResult::new(
            "Legacy env",
            CheckStatus::Warn,
            format!("using {} from the environment; run `wikictl migrate`", legacy.join(", ")),
            start,
        )
    }
}

fn check_default_instance(app: &App) -> CheckResult {
    let start = Instant::now();
    let resolver = app.resolver();
    match resolver.default_instance_id() {
        Ok(Some(id)) => match resolver.get_dynamic_config(Some(&id)) {
            Ok(resolved) => CheckResult::new(
                "Default instance",
                CheckStatus::Pass,
                format!("{id} ({})", resolved.source),
                start,
            ),
            Err(e) => CheckResult::new("Default instance", CheckStatus::Fail, e.to_string(), start),
        },
        Ok(None) => CheckResult::new(
            "Default instance",
            CheckStatus::Warn,
            "no instances configured",
            start,
        ),
        Err(e) => CheckResult::new("Default instance", CheckStatus::Fail, e.to_string(), start),
    }
}

fn print_results(results: &[CheckResult], use_color: bool) {
    println!();
    println!("  wikictl doctor");
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in results {
        let duration_ms = result.duration.as_millis();
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        let line = if use_color {
            use colored::Colorize;
            let (symbol, message) = match result.status {
                CheckStatus::Pass => ("✓".green(), result.message.normal()),
                CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
                CheckStatus::Fail => ("✗".red(), result.message.red()),
            };
            format!("    {symbol} {:<18} {message} ({duration_ms}ms)", result.name)
        } else {
            let tag = match result.status {
                CheckStatus::Pass => "[OK]  ",
                CheckStatus::Warn => "[WARN]",
                CheckStatus::Fail => "[FAIL]",
            };
            format!("    {tag} {:<18} {} ({duration_ms}ms)", result.name, result.message)
        };
        println!("{line}");
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikictl_config::{KdfConfig, WikictlConfig};

    fn app_in(dir: &tempfile::TempDir) -> App {
        let mut config = WikictlConfig::default();
        config.kdf = KdfConfig {
            memory_cost: 8192,
            iterations: 1,
            parallelism: 1,
        };
        App::new(config, Some(dir.path().join("instances.json")), false)
    }

    #[test]
    fn fresh_store_unlocks_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let results = collect_checks(&mut app);

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"Unlock"));
        assert!(names.contains(&"Records"));
        let store_file = results.iter().find(|r| r.name == "Store file").unwrap();
        assert_eq!(store_file.status, CheckStatus::Warn);
        let unlock = results.iter().find(|r| r.name == "Unlock").unwrap();
        assert_eq!(unlock.status, CheckStatus::Pass);
    }

    #[test]
    fn ask_password_is_reported_as_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(
            WikictlConfig::default(),
            Some(dir.path().join("instances.json")),
            true,
        );
        let result = check_password(&app);
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, "interactive prompt");
    }

    #[test]
    fn config_row_lists_loaded_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir);
        assert_eq!(check_config(&app).message, "built-in defaults");

        let file = dir.path().join("wikictl.toml");
        let app = app_in(&dir).with_config_files(vec![file.clone()]);
        let result = check_config(&app);
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.message, file.display().to_string());
    }

    #[test]
    fn corrupt_store_fails_unlock_and_skips_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("instances.json"), "not json").unwrap();
        let mut app = app_in(&dir);
        let results = collect_checks(&mut app);

        let unlock = results.iter().find(|r| r.name == "Unlock").unwrap();
        assert_eq!(unlock.status, CheckStatus::Fail);
        assert!(results.iter().all(|r| r.name != "Records"));
    }
}
