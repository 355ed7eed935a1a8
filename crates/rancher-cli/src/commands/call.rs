//! Call command - invoke a per-type method by name.

use anyhow::Result;
use clap::Args;
use rancher_api::CallArgs as MethodArgs;

use super::{BodyArgs, Context, parse_filters, print_object};

/// Arguments for the call command.
#[derive(Args, Debug)]
pub struct CallArgs {
    /// Method name, e.g. list_container or update_by_id_service_consume_map
    pub method: String,

    /// Resource id for by_id_* and update_by_id_*
    #[arg(long)]
    pub id: Option<String>,

    /// Query parameter (repeatable)
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    #[command(flatten)]
    pub body: BodyArgs,
}

/// Run the call command.
pub async fn run(args: CallArgs, ctx: &Context) -> Result<()> {
    let mut method_args = MethodArgs {
        id: args.id,
        query: parse_filters(&args.filters)?,
        body: None,
    };
    if !args.body.set.is_empty() || args.body.data.is_some() {
        method_args = method_args.body(args.body.to_record()?);
    }

    let client = ctx.connect().await?;
    match client.call(&args.method, method_args).await? {
        Some(obj) => print_object(&obj, ctx),
        None => anyhow::bail!("not found"),
    }
}
