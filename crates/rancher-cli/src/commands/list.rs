//! List command - list a collection.

use anyhow::Result;
use clap::Args;
use rancher_api::GenericObject;

use super::{Context, parse_filters, print_object, print_records};

/// Arguments for the list command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Resource type (e.g. container)
    pub type_name: String,

    /// Filter (repeatable), e.g. -f state=running -f name_like=web%
    #[arg(short, long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Follow pagination to the last page
    #[arg(long)]
    pub all_pages: bool,
}

/// Run the list command.
pub async fn run(args: ListArgs, ctx: &Context) -> Result<()> {
    let filters = parse_filters(&args.filters)?;
    let client = ctx.connect().await?;

    if args.all_pages {
        let records = client.list_all_pages(&args.type_name, &filters).await?;
        if ctx.json_output {
            println!("{}", serde_json::to_string_pretty(&records)?);
        } else {
            print_records(&records);
        }
        return Ok(());
    }

    let collection = client.list(&args.type_name, &filters).await?;
    print_object(&GenericObject::Collection(collection), ctx)
}
