// SPDX-FileCopyrightText: 2026 wikictl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wikictl instance`, `wikictl resolve`, and `wikictl theme`.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use wikictl_core::{InstanceSource, InstanceUpdate, WikiInstance, WikictlError};
use wikictl_vault::read_secret;

use crate::app::App;
use crate::{InstanceCommand, ThemeCommand};

/// Structured output for `resolve --json`.
#[derive(Debug, Serialize)]
struct ResolveOutput<'a> {
    id: &'a str,
    url: &'a str,
    key: &'a str,
    source: InstanceSource,
}

pub fn run_instance(app: &mut App, action: InstanceCommand) -> Result<(), WikictlError> {
    app.unlock()?;
    match action {
        InstanceCommand::Add {
            id,
            name,
            url,
            key,
            json,
        } => {
            let instance = match json {
                Some(raw) => parse_instance_json(&raw)?,
                None => {
                    let id = id.unwrap_or_default();
                    let key = match key {
                        Some(k) => SecretString::from(k),
                        None => read_secret(&format!("API key for {id}: "))?,
                    };
                    WikiInstance {
                        name: name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| id.clone()),
                        id,
                        url: url.unwrap_or_default(),
                        key,
                    }
                }
            };
            app.store.add_instance(&instance)?;
            println!("Added instance `{}` ({})", instance.id, instance.url);
        }
        InstanceCommand::Update {
            id,
            name,
            url,
            key,
            prompt_key,
        } => {
            let key = match (key, prompt_key) {
                (Some(k), _) => Some(SecretString::from(k)),
                (None, true) => Some(read_secret(&format!("New API key for {id}: "))?),
                (None, false) => None,
            };
            let update = InstanceUpdate { name, url, key };
            if update.is_empty() {
                return Err(WikictlError::MalformedInput(
                    "nothing to update; pass --name, --url, --key, or --prompt-key".to_string(),
                ));
            }
            app.store.update_instance(&id, &update)?;
            println!("Updated instance `{id}`");
        }
        InstanceCommand::Remove { id } => {
            app.store.remove_instance(&id)?;
            println!("Removed instance `{id}`");
        }
        InstanceCommand::List { json } => list_instances(app, json)?,
        InstanceCommand::Show { id, reveal } => {
            let info = app
                .store
                .get_instance_info(&id)?
                .ok_or_else(|| WikictlError::InstanceNotFound { id: id.clone() })?;
            println!("id:   {}", info.id);
            println!("name: {}", info.name);
            println!("url:  {}", info.url);
            if let Some(instance) = app.store.get_instance(&id)? {
                let key = instance.key.expose_secret();
                if reveal {
                    println!("key:  {key}");
                } else {
                    println!("key:  {}", mask_key(key));
                }
            }
        }
    }
    Ok(())
}

/// `{"id":..,"name":..,"url":..,"key":..}`; an empty name becomes the id.
fn parse_instance_json(raw: &str) -> Result<WikiInstance, WikictlError> {
    let mut instance: WikiInstance = serde_json::from_str(raw)
        .map_err(|e| WikictlError::MalformedInput(format!("invalid instance JSON: {e}")))?;
    if instance.name.trim().is_empty() {
        instance.name = instance.id.clone();
    }
    Ok(instance)
}

fn list_instances(app: &App, json: bool) -> Result<(), WikictlError> {
    let resolver = app.resolver();
    let instances = resolver.available_instances()?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&instances).unwrap_or_else(|_| "[]".to_string())
        );
        return Ok(());
    }

    if instances.is_empty() {
        println!("No instances configured. Add one with `wikictl instance add`.");
        return Ok(());
    }

    let default = resolver.default_instance_id()?;
    for entry in &instances {
        let marker = if default.as_deref() == Some(entry.info.id.as_str()) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<16} {:<24} {} [{}]",
            entry.info.id, entry.info.name, entry.info.url, entry.source
        );
    }
    Ok(())
}

pub fn run_resolve(app: &mut App, id: Option<&str>, json: bool) -> Result<(), WikictlError> {
    app.unlock()?;
    let resolved = app.resolver().get_dynamic_config(id)?;

    if json {
        let out = ResolveOutput {
            id: &resolved.instance_id,
            url: &resolved.url,
            key: resolved.key.expose_secret(),
            source: resolved.source,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("instance: {}", resolved.instance_id);
        println!("url:      {}", resolved.url);
        println!("key:      {}", mask_key(resolved.key.expose_secret()));
        println!("source:   {}", resolved.source);
    }
    Ok(())
}

pub fn run_theme(app: &mut App, action: Option<ThemeCommand>) -> Result<(), WikictlError> {
    app.unlock()?;
    match action.unwrap_or(ThemeCommand::Get) {
        ThemeCommand::Get => match app.store.get_default_theme()? {
            Some(theme) => println!("{theme}"),
            None => println!("(not set)"),
        },
        ThemeCommand::Set { name } => {
            app.store.set_default_theme(&name)?;
            println!("Default theme set to `{name}`");
        }
    }
    Ok(())
}

/// Mask a key for display, keeping the first and last four characters of long keys.
pub fn mask_key(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
