use super::context::AppContext;
use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use movie_search_config::{CredentialStore, API_KEY_ENV};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(ctx: &AppContext, cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(ctx, full, output),
        ConfigCommands::SetKey { key } => set_key(ctx, key, output),
        ConfigCommands::Path => {
            if output.format() == OutputFormat::Human {
                println!("{}", ctx.paths.config_file().display());
            } else {
                output.json(&json!({
                    "config_file": ctx.paths.config_file(),
                    "credentials_file": ctx.paths.credentials_file(),
                    "store_dir": ctx.store_dir(),
                    "log_file": ctx.paths.session_log_file(),
                }));
            }
            Ok(())
        }
    }
}

fn load_credentials(ctx: &AppContext) -> Result<CredentialStore> {
    let credentials_file = ctx.paths.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(cred_store)
}

fn show_config(ctx: &AppContext, full: bool, output: &Output) -> Result<()> {
    let config = &ctx.config;
    let cred_store = load_credentials(ctx)?;
    let key_source = if std::env::var(API_KEY_ENV).map(|k| !k.trim().is_empty()).unwrap_or(false) {
        API_KEY_ENV
    } else {
        "credentials file"
    };
    let api_key = cred_store
        .resolve_api_key()
        .map(|k| if full { k } else { mask_string(&k) });

    if output.format() != OutputFormat::Human {
        output.json(&json!({
            "config_file": ctx.paths.config_file(),
            "provider": { "base_url": config.provider.base_url, "timeout_seconds": config.provider.timeout_seconds },
            "ui": { "default_title": config.ui.default_title },
            "keys": { "focus_search": config.keys.focus_search, "close_detail": config.keys.close_detail },
            "storage": { "watched_key": config.storage.watched_key, "dir": ctx.store_dir() },
            "api_key": api_key,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    if !ctx.paths.config_file().exists() {
        println!("{}", "No config file yet, showing defaults".bright_black());
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new("Value").fg(Color::Cyan).add_attribute(Attribute::Bold),
    ]);
    let rows = [
        ("Config file", ctx.paths.config_file().display().to_string()),
        ("OMDb base URL", config.provider.base_url.clone()),
        ("Request timeout", format!("{} seconds", config.provider.timeout_seconds)),
        (
            "OMDb API key",
            api_key.map_or_else(|| "<not set>".to_string(), |k| format!("{} ({})", k, key_source)),
        ),
        ("Default title", config.ui.default_title.clone()),
        ("Focus search key", config.keys.focus_search.clone()),
        ("Close detail key", config.keys.close_detail.clone()),
        ("Watched list key", config.storage.watched_key.clone()),
        ("Store directory", ctx.store_dir().display().to_string()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    Ok(())
}

fn set_key(ctx: &AppContext, key: Option<String>, output: &Output) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => prompts::prompt_password("OMDb API key")?,
    };
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let mut cred_store = load_credentials(ctx)?;
    cred_store.set_omdb_api_key(key);
    cred_store
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;
    output.success(format!("API key saved to {}", ctx.paths.credentials_file().display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("abcd"), "****");
        assert_eq!(mask_string("abcdef12"), "ab***12");
        assert_eq!(mask_string(""), "");
    }
}
