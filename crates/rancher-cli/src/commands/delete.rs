//! Delete command - delete resources by id.

use anyhow::{Result, bail};
use clap::Args;
use console::Style;

use super::{Context, print_object, print_success};

/// Arguments for the delete command.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Resource type (e.g. container)
    pub type_name: String,

    /// Resource ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Run the delete command.
pub async fn run(args: DeleteArgs, ctx: &Context) -> Result<()> {
    let client = ctx.connect().await?;
    let yellow = Style::new().yellow();

    let mut targets = Vec::with_capacity(args.ids.len());
    for id in &args.ids {
        match client.by_id(&args.type_name, id).await? {
            Some(obj) => targets.push(obj),
            None => eprintln!(
                "{} {} '{}' not found, skipping",
                yellow.apply_to("Warning:"),
                args.type_name,
                id
            ),
        }
    }
    if targets.is_empty() {
        bail!("nothing to delete");
    }

    let last = client.delete(&targets).await?;
    if ctx.json_output {
        if let Some(obj) = last {
            print_object(&obj, ctx)?;
        }
    } else {
        print_success(&format!("Deleted {} {}", targets.len(), args.type_name));
    }
    Ok(())
}
