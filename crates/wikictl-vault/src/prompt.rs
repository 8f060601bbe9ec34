// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store password acquisition via TTY prompt or the WIKICTL_STORE_PASSWORD variable.

use secrecy::SecretString;
use wikictl_config::STORE_PASSWORD_ENV_VAR;
use wikictl_core::WikictlError;

use crate::kdf::PasswordSource;

/// Decide which password protects the store.
///
/// Priority:
/// 1. Interactive prompt when `ask` is set (fails without a terminal)
/// 2. `WIKICTL_STORE_PASSWORD` environment variable
/// 3. The weak machine-derived default
pub fn get_store_password(ask: bool) -> Result<PasswordSource, WikictlError> {
    if ask {
        return read_secret("Store password: ").map(PasswordSource::Explicit);
    }

    if let Ok(password) = std::env::var(STORE_PASSWORD_ENV_VAR)
        && !password.is_empty()
    {
        return Ok(PasswordSource::Explicit(SecretString::from(password)));
    }

    Ok(PasswordSource::WeakMachineDefault)
}

/// Read a non-empty secret from the terminal without echo.
pub fn read_secret(label: &str) -> Result<SecretString, WikictlError> {
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(WikictlError::MalformedInput(format!(
            "cannot prompt for `{}`: stdin is not a terminal",
            label.trim_end_matches([':', ' '])
        )));
    }

    eprint!("{label}");
    let value = rpassword::read_password().map_err(WikictlError::storage)?;
    if value.is_empty() {
        return Err(WikictlError::MalformedInput("empty input not allowed".to_string()));
    }
    Ok(SecretString::from(value))
}
