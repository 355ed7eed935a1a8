//! Action command - invoke an action advertised on a resource.

use anyhow::{Result, bail};
use clap::Args;

use super::{BodyArgs, Context, print_object};

/// Arguments for the action command.
#[derive(Args, Debug)]
pub struct ActionArgs {
    /// Resource type (e.g. container)
    pub type_name: String,

    /// Resource id
    pub id: String,

    /// Action name (e.g. stop)
    pub action: String,

    #[command(flatten)]
    pub body: BodyArgs,
}

/// Run the action command.
pub async fn run(args: ActionArgs, ctx: &Context) -> Result<()> {
    let body = args.body.to_record()?;
    let client = ctx.connect().await?;

    let Some(obj) = client.by_id(&args.type_name, &args.id).await? else {
        bail!("{} '{}' not found", args.type_name, args.id);
    };
    let Some(record) = obj.as_record() else {
        bail!("{} '{}' is not a single resource", args.type_name, args.id);
    };
    if record.bound_action(&args.action).is_none() && record.action(&args.action).is_none() {
        let available: Vec<&str> = record.actions().map(|(name, _)| name).collect();
        bail!(
            "{} '{}' has no action '{}' (available: {})",
            args.type_name,
            args.id,
            args.action,
            if available.is_empty() { "none".to_string() } else { available.join(", ") }
        );
    }

    let result = client.action(record, &args.action, body).await?;
    print_object(&result, ctx)
}
