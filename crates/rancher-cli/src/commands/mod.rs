//! CLI command handlers.

pub mod action;
pub mod call;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod schema;
pub mod update;

use anyhow::{Context as _, Result, anyhow, bail};
use clap::Args;
use console::{Style, style};
use rancher_api::{ClientConfig, GenericObject, Query, RancherClient, Record, Value};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Resolved client configuration.
    pub config: ClientConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Build a client and load its schema.
    pub async fn connect(&self) -> Result<RancherClient> {
        if self.config.url.is_none() {
            bail!("no API endpoint configured (use --url or RANCHER_URL)");
        }
        let client = RancherClient::from_config(&self.config)?;
        client
            .load_schemas()
            .await
            .with_context(|| format!("loading schema from {}", client.base_url()))?;
        Ok(client)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Request bodies and filters
// ─────────────────────────────────────────────────────────────────────────────

/// Request body given as a JSON document and/or `key=value` pairs.
#[derive(Args, Debug, Default)]
pub struct BodyArgs {
    /// Set a field (repeatable). Values are parsed as JSON when possible.
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Request body as a JSON object; --set fields are applied on top
    #[arg(short, long, value_name = "JSON")]
    pub data: Option<String>,
}

impl BodyArgs {
    pub fn to_record(&self) -> Result<Record> {
        let mut record = match &self.data {
            Some(text) => {
                let json: serde_json::Value =
                    serde_json::from_str(text).context("--data is not valid JSON")?;
                Value::from(json)
                    .into_object()
                    .and_then(GenericObject::into_record)
                    .ok_or_else(|| anyhow!("--data must be a JSON object"))?
            }
            None => Record::new(),
        };
        for pair in &self.set {
            let (key, value) = split_pair(pair)?;
            record.insert(key, parse_scalar(value));
        }
        Ok(record)
    }
}

/// Split `key=value`.
pub fn split_pair(pair: &str) -> Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("expected KEY=VALUE, got '{}'", pair),
    }
}

/// JSON literal if it parses, otherwise the raw string.
fn parse_scalar(value: &str) -> Value {
    serde_json::from_str::<serde_json::Value>(value)
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(value))
}

/// Build a query from repeated `key=value` filters.
pub fn parse_filters(filters: &[String]) -> Result<Query> {
    let mut query = Query::new();
    for pair in filters {
        let (key, value) = split_pair(pair)?;
        query.push(key, value);
    }
    Ok(query)
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

pub fn print_object(obj: &GenericObject, ctx: &Context) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(obj)?);
        return Ok(());
    }
    match obj {
        GenericObject::Record(record) => print_record(record, ctx),
        GenericObject::Collection(collection) => print_records(collection.data()),
    }
    Ok(())
}

pub fn print_record(record: &Record, ctx: &Context) {
    println!("{}", record.as_table(!ctx.verbose));
}

/// One line per record: id, name, state.
pub fn print_records(records: &[Record]) {
    let dim = Style::new().dim();
    if records.is_empty() {
        println!("{}", dim.apply_to("No resources found"));
        return;
    }

    println!(
        "{}",
        style(format!("{:<16} {:<32} {}", "ID", "NAME", "STATE")).bold()
    );
    for record in records {
        let id = record.id().unwrap_or_default();
        let name = record.get("name").and_then(Value::to_plain_string).unwrap_or_default();
        let state = record.get_str("state").unwrap_or("");
        println!("{:<16} {:<32} {}", id, truncate(&name, 32), dim.apply_to(state));
    }
}

pub fn print_success(message: &str) {
    let green = Style::new().green();
    println!("{} {}", green.apply_to("✓"), message);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
