//! Create command - create a resource.

use anyhow::Result;
use clap::Args;

use super::{BodyArgs, Context, print_object, print_success};

/// Arguments for the create command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Resource type (e.g. container)
    pub type_name: String,

    #[command(flatten)]
    pub body: BodyArgs,
}

/// Run the create command.
pub async fn run(args: CreateArgs, ctx: &Context) -> Result<()> {
    let body = args.body.to_record()?;
    let client = ctx.connect().await?;
    let created = client.create(&args.type_name, body).await?;

    if !ctx.json_output {
        let id = created.header().id().unwrap_or_default();
        print_success(&format!("Created {} {}", args.type_name, id));
    }
    print_object(&created, ctx)
}
