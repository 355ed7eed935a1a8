//! Update command - update a resource.

use anyhow::Result;
use clap::Args;

use super::{BodyArgs, Context, print_object};

/// Arguments for the update command.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Resource type (e.g. container)
    pub type_name: String,

    /// Resource id
    pub id: String,

    #[command(flatten)]
    pub body: BodyArgs,
}

/// Run the update command.
pub async fn run(args: UpdateArgs, ctx: &Context) -> Result<()> {
    let body = args.body.to_record()?;
    let client = ctx.connect().await?;
    let updated = client.update_by_id(&args.type_name, &args.id, body).await?;
    print_object(&updated, ctx)
}
