//! Owner commands

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use crate::{AppContext, Cli};
use pedigree_core::NewOwner;

#[derive(Args)]
pub struct OwnerArgs {
    #[command(subcommand)]
    pub command: OwnerCommands,
}

#[derive(Subcommand)]
pub enum OwnerCommands {
    /// Register a new owner
    Add {
        /// First name
        first_name: String,
        /// Last name
        last_name: String,
        /// Contact email
        #[arg(short, long)]
        email: Option<String>,
    },
    /// List owners, optionally filtered by name
    List {
        /// Full name contains
        #[arg(short, long)]
        name: Option<String>,
        /// Limit results
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

pub async fn run(args: &OwnerArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        OwnerCommands::Add {
            first_name,
            last_name,
            email,
        } => {
            let mut new_owner = NewOwner::new(first_name, last_name);
            new_owner.email = email.clone();

            let owner = ctx.service.create_owner(new_owner).await?;
            if !cli.quiet {
                let text = output::format_value(&owner, ctx.format, |o| {
                    format!("Created owner {} (#{})\n", o.full_name(), o.id)
                })?;
                print!("{}", text);
            }
        }
        OwnerCommands::List { name, limit } => {
            let owners = match name {
                Some(name) => ctx.service.search_owners(name, *limit).await?,
                None => {
                    let mut owners = ctx.service.list_owners().await?;
                    owners.truncate(limit.unwrap_or(usize::MAX));
                    owners
                }
            };

            tracing::info!("Found {} owners", owners.len());
            if owners.is_empty() && ctx.format == OutputFormat::Table {
                println!("No owners found");
            } else {
                print!("{}", output::format_list(&owners, ctx.format)?);
            }
        }
    }

    Ok(())
}
