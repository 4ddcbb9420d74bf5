//! Horse commands

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use crate::{AppContext, Cli};
use pedigree_core::{HorseDraft, HorseId, HorseSearch, OwnerId, Sex};

#[derive(Args)]
pub struct HorseArgs {
    #[command(subcommand)]
    pub command: HorseCommands,
}

#[derive(Subcommand)]
pub enum HorseCommands {
    /// Register a new horse
    Add {
        /// Horse name
        name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        born: NaiveDate,
        /// Sex: female or male
        #[arg(short, long)]
        sex: Sex,
        /// Free-text description
        #[arg(long)]
        description: Option<String>,
        /// Owner ID
        #[arg(short, long)]
        owner: Option<OwnerId>,
        /// Parent horse ID (at most two)
        #[arg(short, long)]
        parent: Vec<HorseId>,
    },
    /// Search horses
    List {
        /// Name contains
        #[arg(short, long)]
        name: Option<String>,
        /// Description contains
        #[arg(long)]
        description: Option<String>,
        /// Born strictly before this date
        #[arg(long)]
        born_before: Option<NaiveDate>,
        /// Filter by sex
        #[arg(short, long)]
        sex: Option<Sex>,
        /// Owner name contains
        #[arg(short, long)]
        owner: Option<String>,
        /// Limit results (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },
    /// Show a horse with its owner and parents
    Get {
        /// Horse ID
        id: HorseId,
    },
    /// Change an existing horse
    Update {
        /// Horse ID
        id: HorseId,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New date of birth (YYYY-MM-DD)
        #[arg(short, long)]
        born: Option<NaiveDate>,
        /// New sex
        #[arg(short, long)]
        sex: Option<Sex>,
        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear_description: bool,
        /// New owner ID
        #[arg(short, long, conflicts_with = "clear_owner")]
        owner: Option<OwnerId>,
        /// Remove the owner
        #[arg(long)]
        clear_owner: bool,
        /// Replace the parents with these IDs
        #[arg(short, long, conflicts_with = "clear_parents")]
        parent: Vec<HorseId>,
        /// Remove all parents
        #[arg(long)]
        clear_parents: bool,
    },
    /// Delete a horse and its parent links
    Delete {
        /// Horse ID
        id: HorseId,
    },
    /// Find parent candidates by name
    Parents {
        /// Name contains
        name: String,
        /// Only candidates of this sex
        #[arg(short, long)]
        sex: Option<Sex>,
        /// Limit results
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show the ancestor tree of a horse
    Tree {
        /// Horse ID
        id: HorseId,
        /// Generations to show, including the horse itself (1-10)
        #[arg(short, long)]
        generations: Option<u32>,
    },
}

pub async fn run(args: &HorseArgs, cli: &Cli, ctx: &AppContext) -> anyhow::Result<()> {
    let service = &ctx.service;

    match &args.command {
        HorseCommands::Add {
            name,
            born,
            sex,
            description,
            owner,
            parent,
        } => {
            let draft = HorseDraft {
                name: Some(name.clone()),
                description: description.clone(),
                date_of_birth: Some(*born),
                sex: Some(*sex),
                owner_id: *owner,
                parent_ids: Some(parent.clone()),
            };

            let detail = service.create_horse(draft).await?;
            if !cli.quiet {
                print!(
                    "{}",
                    output::format_value(&detail, ctx.format, output::render_detail)?
                );
            }
        }
        HorseCommands::List {
            name,
            description,
            born_before,
            sex,
            owner,
            limit,
        } => {
            let search = HorseSearch {
                name: name.clone(),
                description: description.clone(),
                born_before: *born_before,
                sex: *sex,
                owner_name: owner.clone(),
                limit: Some(*limit),
            };

            let horses = service.search_horses(&search).await?;
            if horses.is_empty() && ctx.format == OutputFormat::Table {
                println!("No horses found");
            } else {
                print!("{}", output::format_list(&horses, ctx.format)?);
            }
        }
        HorseCommands::Get { id } => {
            let detail = service.get_horse(*id).await?;
            print!(
                "{}",
                output::format_value(&detail, ctx.format, output::render_detail)?
            );
        }
        HorseCommands::Update {
            id,
            name,
            born,
            sex,
            description,
            clear_description,
            owner,
            clear_owner,
            parent,
            clear_parents,
        } => {
            let current = service.get_horse(*id).await?;
            let mut draft = HorseDraft::from_horse(&current.horse);

            if let Some(name) = name {
                draft.name = Some(name.clone());
            }
            if born.is_some() {
                draft.date_of_birth = *born;
            }
            if sex.is_some() {
                draft.sex = *sex;
            }
            if *clear_description {
                draft.description = None;
            } else if description.is_some() {
                draft.description = description.clone();
            }
            if *clear_owner {
                draft.owner_id = None;
            } else if owner.is_some() {
                draft.owner_id = *owner;
            }
            if *clear_parents {
                draft.parent_ids = Some(Vec::new());
            } else if !parent.is_empty() {
                draft.parent_ids = Some(parent.clone());
            }

            let detail = service.update_horse(*id, draft).await?;
            if !cli.quiet {
                print!(
                    "{}",
                    output::format_value(&detail, ctx.format, output::render_detail)?
                );
            }
        }
        HorseCommands::Delete { id } => {
            service.delete_horse(*id).await?;
            if !cli.quiet {
                println!("Deleted horse {}", id);
            }
        }
        HorseCommands::Parents { name, sex, limit } => {
            let candidates = service.search_parents(name, *sex, *limit).await?;
            if candidates.is_empty() && ctx.format == OutputFormat::Table {
                println!("No matching horses");
            } else {
                print!("{}", output::format_list(&candidates, ctx.format)?);
            }
        }
        HorseCommands::Tree { id, generations } => {
            let generations = generations.unwrap_or(ctx.config.default_generations);
            let tree = service.family_tree(*id, generations).await?;
            print!(
                "{}",
                output::format_value(&tree, ctx.format, output::render_tree)?
            );
        }
    }

    Ok(())
}
