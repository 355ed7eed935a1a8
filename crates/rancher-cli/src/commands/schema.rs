//! Schema command - inspect the declared resource types.

use anyhow::Result;
use clap::Args;
use console::{Style, style};
use serde_json::json;

use super::Context;

/// Arguments for the schema command.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Show a single type in detail
    pub type_name: Option<String>,

    /// List the per-type method names instead
    #[arg(long)]
    pub methods: bool,

    /// Fetch the schema again, ignoring the cache
    #[arg(long)]
    pub refresh: bool,
}

/// Run the schema command.
pub async fn run(args: SchemaArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    if args.refresh {
        client.reload_schema().await?;
    }

    if args.methods {
        let names = client.method_names();
        if ctx.json_output {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else {
            for name in names {
                println!("{}", name);
            }
        }
        return Ok(());
    }

    let Some(schema) = client.schema() else {
        anyhow::bail!("schema not loaded");
    };
    let dim = Style::new().dim();

    if let Some(type_name) = args.type_name {
        let Some(ty) = schema.get(&type_name) else {
            anyhow::bail!("unknown type '{}'", type_name);
        };
        let filters: Vec<_> = ty
            .collection_filters
            .iter()
            .map(|(name, spec)| json!({"field": name, "modifiers": spec.modifiers}))
            .collect();

        if ctx.json_output {
            let out = json!({
                "id": ty.id,
                "collection": ty.collection_url,
                "collectionMethods": ty.collection_methods,
                "resourceMethods": ty.resource_methods,
                "collectionFilters": filters,
                "resourceActions": ty.resource_actions,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("{}", style(&ty.id).bold());
        println!("{}", dim.apply_to("─".repeat(50)));
        println!("Collection:  {}", ty.collection_url.as_deref().unwrap_or("-"));
        println!("Collection methods: {}", ty.collection_methods.join(", "));
        println!("Resource methods:   {}", ty.resource_methods.join(", "));
        if !ty.resource_actions.is_empty() {
            println!("Actions: {}", ty.resource_actions.join(", "));
        }
        if !ty.collection_filters.is_empty() {
            println!();
            println!("{}", style("Filters").bold());
            for (name, spec) in &ty.collection_filters {
                println!("  {:<24} {}", name, dim.apply_to(spec.modifiers.join(" ")));
            }
        }
        return Ok(());
    }

    if ctx.json_output {
        let types: Vec<_> = schema
            .types()
            .map(|ty| {
                json!({
                    "id": ty.id,
                    "list": ty.listable,
                    "create": ty.creatable,
                    "update": ty.updatable,
                    "delete": ty.deletable,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&types)?);
        return Ok(());
    }

    println!("{}", style(format!("{:<32} {}", "TYPE", "CAPABILITIES")).bold());
    for ty in schema.types() {
        let caps: Vec<&str> = [
            (ty.listable, "list"),
            (ty.creatable, "create"),
            (ty.updatable, "update"),
            (ty.deletable, "delete"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        println!("{:<32} {}", ty.id, dim.apply_to(caps.join(" ")));
    }
    Ok(())
}
