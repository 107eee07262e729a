use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use conntree::inheritance::InheritAll;
use conntree::logging;
use conntree::preset::{Preset, PresetLibrary};
use conntree::schema::{discover, PropertyValue};
use conntree::scope::{Config, Resolver, ValueOrigin};
use conntree::store::{export_effective, TomlTreeStore, TreeStore};
use conntree::tree::{ConfigTree, NodeKey};

#[derive(Parser)]
#[command(name = "conntree")]
#[command(about = "Connection tree inspector with inherited properties", long_about = None)]
struct Cli {
    /// Connection tree file
    #[arg(long, global = true, default_value = "connections.toml")]
    tree: PathBuf,

    /// Inheritance and resolution settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preset library file
    #[arg(long, global = true, default_value = "presets.toml")]
    presets: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the connection tree
    List,

    /// Resolve the effective value of a property
    Resolve {
        /// Node ID
        node_id: String,

        /// Property name (e.g., "hostname")
        property: String,
    },

    /// List the properties a node currently inherits
    Inherited {
        /// Node ID
        node_id: String,
    },

    /// Write a local property value
    Set {
        node_id: String,
        property: String,
        value: String,
    },

    /// Change inheritance toggles ("all" accepts yes, no or auto)
    Inherit {
        node_id: String,

        /// Property name or "all"
        property: String,

        /// yes, no or auto
        mode: InheritAll,
    },

    /// Check schema consistency and the tree file
    Validate,

    /// Export every node's effective values as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not mask encrypted properties
        #[arg(long)]
        reveal_secrets: bool,
    },

    /// Manage property presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand)]
enum PresetAction {
    /// Capture a node's values and toggles as a preset
    Save { name: String, node_id: String },

    /// Apply a preset to one or more nodes
    Apply {
        name: String,
        #[arg(required = true)]
        node_ids: Vec<String>,
    },

    /// List saved presets
    List,

    /// Delete a preset
    Delete { name: String },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    let cli = Cli::parse();

    let machine_output = matches!(cli.command, Commands::Export { output: None, .. });
    logging::init_logging(logging::default_level(cli.verbose, machine_output));

    if !discover().self_check() {
        eprintln!("Warning: property schema and inheritance toggles are out of sync");
    }

    let result = match &cli.command {
        Commands::List => list_tree(&cli),
        Commands::Resolve { node_id, property } => resolve_property(&cli, node_id, property),
        Commands::Inherited { node_id } => list_inherited(&cli, node_id),
        Commands::Set {
            node_id,
            property,
            value,
        } => set_property(&cli, node_id, property, value),
        Commands::Inherit {
            node_id,
            property,
            mode,
        } => set_inheritance(&cli, node_id, property, *mode),
        Commands::Validate => validate(&cli),
        Commands::Export {
            output,
            reveal_secrets,
        } => export_tree(&cli, output.as_deref(), *reveal_secrets),
        Commands::Preset { action } => run_preset(&cli, action),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_store(cli: &Cli) -> Result<TomlTreeStore, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::empty(),
    };
    let schema = discover();
    Ok(TomlTreeStore::new(&cli.tree).with_settings(
        config.inheritance_defaults(schema)?,
        config.resolution_policy(schema)?,
    ))
}

fn load_tree(cli: &Cli) -> Result<(TomlTreeStore, ConfigTree), Box<dyn std::error::Error>> {
    let store = open_store(cli)?;
    let (tree, validation) = store.load_tree()?;

    // Print validation issues if any
    if validation.has_issues() {
        eprintln!("{}", validation);
    }
    Ok((store, tree))
}

fn lookup(tree: &ConfigTree, node_id: &str) -> Result<NodeKey, Box<dyn std::error::Error>> {
    Ok(tree.key_of(node_id)?)
}

fn list_tree(cli: &Cli) -> CliResult {
    let (_, tree) = load_tree(cli)?;

    println!("Tree: {} ({} nodes)", cli.tree.display(), tree.len());
    for (key, node) in tree.iter() {
        let depth = depth_of(&tree, key);
        let mut line = format!(
            "{}- {} [{}] {}",
            "  ".repeat(depth),
            node.display_name(),
            node.kind(),
            node.id()
        );
        if let Some(target) = node.linked_id() {
            line.push_str(&format!(" -> {}", target));
        }
        if !tree.is_root(key) && !tree.inheritance_active(key) {
            line.push_str(" (inheritance inactive)");
        }
        println!("{}", line);
    }
    Ok(())
}

fn depth_of(tree: &ConfigTree, key: NodeKey) -> usize {
    let mut depth = 0;
    let mut current = tree.get(key).and_then(|n| n.parent());
    while let Some(parent) = current {
        depth += 1;
        current = tree.get(parent).and_then(|n| n.parent());
    }
    depth
}

fn resolve_property(cli: &Cli, node_id: &str, property: &str) -> CliResult {
    let (_, tree) = load_tree(cli)?;
    let key = lookup(&tree, node_id)?;
    let resolution = Resolver::new(&tree).resolve_with_origin(key, property)?;
    let source = tree.node(resolution.source)?;

    println!("Property: {}", property);
    println!("Node: {}", node_id);
    println!("Resolved value: {}", resolution.value);
    match resolution.origin {
        ValueOrigin::Local => println!("Origin: local"),
        ValueOrigin::Inherited => println!(
            "Origin: inherited from {} ({})",
            source.id(),
            source.display_name()
        ),
        ValueOrigin::Linked => println!(
            "Origin: linked from {} ({})",
            source.id(),
            source.display_name()
        ),
        ValueOrigin::CycleFallback => {
            println!("Origin: cycle fallback at {} ({})", source.id(), source.display_name())
        }
    }
    println!("\nJSON: {}", serde_json::to_string(&resolution.value)?);
    Ok(())
}

fn list_inherited(cli: &Cli, node_id: &str) -> CliResult {
    let (_, tree) = load_tree(cli)?;
    let key = lookup(&tree, node_id)?;
    let properties = tree.enabled_inheritance_properties(key)?;

    if properties.is_empty() {
        if tree.inheritance_active(key) {
            println!("{} inherits nothing", node_id);
        } else {
            println!("{} inherits nothing (inheritance inactive)", node_id);
        }
        return Ok(());
    }

    println!("Inherited properties ({}):", properties.len());
    for property in properties {
        println!("  - {} = {}", property, tree.value(key, property)?);
    }
    Ok(())
}

fn set_property(cli: &Cli, node_id: &str, property: &str, raw: &str) -> CliResult {
    let (store, mut tree) = load_tree(cli)?;
    let key = lookup(&tree, node_id)?;
    let descriptor = tree.schema().require(property)?;
    let value = descriptor
        .value_type
        .coerce(descriptor.name, PropertyValue::from(raw))?;

    if tree.set_value(key, descriptor.name, value.clone())? {
        store.save_tree(&tree)?;
        println!("{}.{} = {}", node_id, descriptor.name, value);
    } else {
        println!("{}.{} already {}", node_id, descriptor.name, value);
    }
    Ok(())
}

fn set_inheritance(cli: &Cli, node_id: &str, property: &str, mode: InheritAll) -> CliResult {
    let (store, mut tree) = load_tree(cli)?;
    let key = lookup(&tree, node_id)?;

    if property.eq_ignore_ascii_case("all") {
        tree.set_everything_inherited(key, mode)?;
    } else {
        let inherit = match mode {
            InheritAll::Yes => true,
            InheritAll::No => false,
            InheritAll::Auto => return Err("auto is only valid with \"all\"".into()),
        };
        tree.set_inherited(key, property, inherit)?;
    }

    store.save_tree(&tree)?;
    println!(
        "{} now inherits {} properties",
        node_id,
        tree.toggles(key)?.enabled().count()
    );
    Ok(())
}

fn validate(cli: &Cli) -> CliResult {
    let schema = discover();
    let missing = schema.validate_inheritance_sync();
    let orphaned = schema.validate_orphaned_toggles();

    for name in &missing {
        println!("Missing toggle: {}", name);
    }
    for name in &orphaned {
        println!("Orphaned toggle: {}", name);
    }

    let store = open_store(cli)?;
    let (tree, validation) = store.load_tree()?;
    if validation.has_issues() {
        println!("{}", validation);
    }

    if !missing.is_empty() || !orphaned.is_empty() || validation.has_issues() {
        return Err("validation failed".into());
    }
    println!("OK: {} properties, {} nodes", schema.descriptors().len(), tree.len());
    Ok(())
}

fn export_tree(cli: &Cli, output: Option<&Path>, reveal_secrets: bool) -> CliResult {
    let (_, tree) = load_tree(cli)?;
    let exported = export_effective(&tree, reveal_secrets)?;
    let json = serde_json::to_string_pretty(&exported)?;

    if let Some(output_path) = output {
        std::fs::write(output_path, json)?;
        println!("Tree exported to {}", output_path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn run_preset(cli: &Cli, action: &PresetAction) -> CliResult {
    let mut library = PresetLibrary::load(&cli.presets)?;

    match action {
        PresetAction::Save { name, node_id } => {
            let (_, tree) = load_tree(cli)?;
            let key = lookup(&tree, node_id)?;
            let preset = Preset::capture_from(name.as_str(), &tree, key)?;
            let summary = format!(
                "Saved preset '{}' ({} values, {} toggles)",
                preset.name,
                preset.values.len(),
                preset.toggles.len()
            );
            library.upsert(preset)?;
            library.save(&cli.presets)?;
            println!("{}", summary);
        }
        PresetAction::Apply { name, node_ids } => {
            let (store, mut tree) = load_tree(cli)?;
            let targets = node_ids
                .iter()
                .map(|id| lookup(&tree, id))
                .collect::<Result<Vec<_>, _>>()?;
            let written = library.apply(name, &mut tree, &targets)?;
            store.save_tree(&tree)?;
            println!("Applied '{}' to {} node(s)", name, written);
        }
        PresetAction::List => {
            if library.is_empty() {
                println!("No presets in {}", cli.presets.display());
            }
            for preset in library.presets() {
                println!(
                    "  - {} ({} values, {} toggles)",
                    preset.name,
                    preset.values.len(),
                    preset.toggles.len()
                );
            }
        }
        PresetAction::Delete { name } => {
            let removed = library.remove(name)?;
            library.save(&cli.presets)?;
            println!("Deleted preset '{}'", removed.name);
        }
    }
    Ok(())
}
