use clap::{Args, Parser, Subcommand, ValueEnum};
use anyhow::{Context, Result};

use denbla_pedigree_core::pedigree::{
    build_grid, fetch_prominent_ancestors, flatten, max_depth, prominent_ancestors, ActionResult,
    AncestorNode, Registry,
};

#[derive(Parser)]
#[command(name = "denbla-pedigree")]
#[command(version)]
#[command(about = "Pedigree tools for the DenBlå-Angora rabbit registry")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every pedigree position in pre-order (self, father side, mother side)
    Flatten {
        #[command(flatten)]
        input: Input,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Print the number of generations in a pedigree, counting the subject
    Depth {
        #[command(flatten)]
        input: Input,
    },

    /// Rank ancestors by how many pedigree positions they occupy
    Prominent {
        #[command(flatten)]
        input: Input,

        /// Only list ancestors occupying more than one position
        #[arg(long)]
        repeated: bool,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Lay out a pedigree as a generation-indexed table
    Grid {
        #[command(flatten)]
        input: Input,

        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Check a registry CSV for dangling parents and cycles
    Validate {
        /// Path to registry CSV (columns: animal, sire, dam, ...)
        #[arg(short, long)]
        registry: String,
    },
}

/// Where the pedigree comes from: a JSON tree, or a registry plus an ear tag.
#[derive(Args)]
struct Input {
    /// Path to a pedigree tree in JSON, as returned by the registry backend
    #[arg(short, long, conflicts_with_all = ["registry", "animal"])]
    tree: Option<String>,

    /// Path to registry CSV (columns: animal, sire, dam, ...)
    #[arg(short, long, requires = "animal")]
    registry: Option<String>,

    /// Ear tag of the pedigree subject in the registry
    #[arg(short, long)]
    animal: Option<String>,

    /// Generations of ancestors to include above the subject
    #[arg(short, long, default_value = "3")]
    generations: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Flatten { input, format } => cmd_flatten(&input, format),
        Commands::Depth { input } => cmd_depth(&input),
        Commands::Prominent {
            input,
            repeated,
            format,
        } => cmd_prominent(&input, repeated, format),
        Commands::Grid { input, format } => cmd_grid(&input, format),
        Commands::Validate { registry } => cmd_validate(&registry),
    }
}

fn load_registry(path: &str) -> Result<Registry> {
    let registry = Registry::from_csv(path)
        .with_context(|| format!("Failed to load registry from '{}'", path))?;
    eprintln!("Loaded {} rabbits from '{}'", registry.n_rabbits(), path);
    Ok(registry)
}

fn load_tree(input: &Input) -> Result<AncestorNode> {
    if let Some(path) = &input.tree {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pedigree tree from '{}'", path))?;
        return AncestorNode::from_json(&json)
            .with_context(|| format!("Failed to parse pedigree tree in '{}'", path));
    }

    let (Some(registry_path), Some(animal)) = (&input.registry, &input.animal) else {
        anyhow::bail!("Provide either --tree <json> or --registry <csv> --animal <ear tag>");
    };
    let registry = load_registry(registry_path)?;
    registry
        .validate()
        .with_context(|| format!("Registry '{}' is inconsistent", registry_path))?;
    registry
        .ancestor_tree(animal, input.generations)
        .with_context(|| format!("Failed to build pedigree of '{}'", animal))
}

fn cmd_flatten(input: &Input, format: Format) -> Result<()> {
    let tree = load_tree(input)?;
    let flat = flatten(Some(&tree));

    match format {
        Format::Json => {
            let summaries: Vec<_> = flat.iter().map(|n| n.summary()).collect();
            println!("{}", serde_json::to_string_pretty(&summaries)?);
        }
        Format::Text => {
            for node in flat {
                println!(
                    "{:<10} {:<28} {}",
                    node.id,
                    node.relation,
                    node.nickname.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

fn cmd_depth(input: &Input) -> Result<()> {
    let tree = load_tree(input)?;
    println!("{}", max_depth(Some(&tree)));
    Ok(())
}

fn cmd_prominent(input: &Input, repeated: bool, format: Format) -> Result<()> {
    // Registry lookups go through the fetch wrapper so failures come back
    // as a status-coded result, as the web front end sees them.
    let result = match (&input.registry, &input.animal) {
        (Some(path), Some(animal)) if input.tree.is_none() => {
            let registry = load_registry(path)?;
            fetch_prominent_ancestors(&registry, animal, input.generations)
        }
        _ => ActionResult::Success(prominent_ancestors(&load_tree(input)?)),
    };

    let result = match result {
        ActionResult::Success(mut ranked) => {
            if repeated {
                ranked.retain(|e| e.is_repeated());
            }
            ActionResult::Success(ranked)
        }
        failure => failure,
    };

    match (format, &result) {
        (Format::Json, _) => println!("{}", serde_json::to_string_pretty(&result)?),
        (Format::Text, ActionResult::Success(ranked)) => {
            for entry in ranked {
                println!(
                    "{:>4}  {:<10} {}",
                    entry.occurrences,
                    entry.id,
                    entry.nickname.as_deref().unwrap_or("")
                );
            }
        }
        (Format::Text, ActionResult::Failure { error, status }) => {
            anyhow::bail!("{} (status {})", error, status);
        }
    }
    Ok(())
}

fn cmd_grid(input: &Input, format: Format) -> Result<()> {
    let tree = load_tree(input)?;
    let grid = build_grid(Some(&tree), input.generations.saturating_add(1))
        .context("Failed to lay out pedigree grid")?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&grid)?),
        Format::Text => print!("{}", grid),
    }
    Ok(())
}

fn cmd_validate(path: &str) -> Result<()> {
    let registry = load_registry(path)?;
    registry
        .validate()
        .with_context(|| format!("Registry '{}' is inconsistent", path))?;
    println!("Registry is consistent ({} rabbits)", registry.n_rabbits());
    Ok(())
}
