//! Get command - show one resource.

use anyhow::{Result, bail};
use clap::Args;

use super::{Context, print_object};

/// Arguments for the get command.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Resource type (e.g. container)
    pub type_name: String,

    /// Resource id
    pub id: String,

    /// Follow a link on the resource instead (e.g. --link hosts)
    #[arg(long)]
    pub link: Option<String>,
}

/// Run the get command.
pub async fn run(args: GetArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    let Some(obj) = client.by_id(&args.type_name, &args.id).await? else {
        bail!("{} '{}' not found", args.type_name, args.id);
    };

    match args.link {
        Some(link) => {
            let Some(record) = obj.as_record() else {
                bail!("{} '{}' is not a single resource", args.type_name, args.id);
            };
            let linked = client
                .follow_link(record, &link, &rancher_api::Query::new())
                .await?;
            print_object(&linked, ctx)
        }
        None => print_object(&obj, ctx),
    }
}
