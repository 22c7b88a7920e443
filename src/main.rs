use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use gamedex::Rc;
use gamedex::catalog::{Catalog, CatalogProvider, Item, Recipe, load_catalog};
use gamedex::options::build_filter_options;
use gamedex::query::{ItemFilters, ItemQuery, KeyValueFilter, SortKey, SortOrder};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the items dataset
    #[clap(short, long, default_value = "data/items.json")]
    items: PathBuf,

    /// Path to the recipes dataset
    #[clap(short, long, default_value = "data/recipes.json")]
    recipes: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search, filter, and sort the item collection
    Query {
        /// Free-text search over item fields (including nested structures)
        #[clap(short, long)]
        search: Option<String>,

        /// Item type to match
        #[clap(short = 't', long = "type")]
        item_type: Option<String>,

        #[clap(long)]
        min_damage: Option<i64>,
        #[clap(long)]
        max_damage: Option<i64>,

        /// Bounds on the `stats.Level` field
        #[clap(long)]
        min_level: Option<i64>,
        #[clap(long)]
        max_level: Option<i64>,

        /// Exact baseStats match, as KEY=VALUE
        #[clap(long, value_parser = parse_key_value)]
        base_stat: Option<KeyValueFilter>,

        /// Exact stats match, as KEY=VALUE
        #[clap(long, value_parser = parse_key_value)]
        stat: Option<KeyValueFilter>,

        /// Match against an item's embedded recipe, as KEY=VALUE
        /// (special keys: materials.itemId, skillLevel, skillRequired)
        #[clap(long, value_parser = parse_key_value)]
        recipe_field: Option<KeyValueFilter>,

        #[clap(long)]
        has_effects: bool,
        #[clap(long)]
        craftable: bool,
        #[clap(long)]
        has_recipe: bool,

        /// Sort key: name, rarity, level, value, damage, enhancementLevel.
        /// Unrecognized keys leave the order unchanged.
        #[clap(long)]
        sort: Option<String>,

        /// Sort descending
        #[clap(long)]
        desc: bool,

        #[clap(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show one item's details, including its recipe and reverse lookups
    Show { item_id: String },
    /// Show the recipe that produces an item
    Recipe { item_id: String },
    /// List the items whose recipes consume an item as a material
    BuildsInto { item_id: String },
    /// List the filter option domains discovered in the loaded data
    Options {
        #[clap(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn parse_key_value(s: &str) -> Result<KeyValueFilter, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    Ok(KeyValueFilter::builder().key(key).value(value).build())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let catalog = match load_catalog(&args.items, &args.recipes) {
        Ok(catalog) => catalog,
        Err(err) => {
            eprintln!("failed to load catalog: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&catalog, args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(catalog: &Catalog, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Query {
            search,
            item_type,
            min_damage,
            max_damage,
            min_level,
            max_level,
            base_stat,
            stat,
            recipe_field,
            has_effects,
            craftable,
            has_recipe,
            sort,
            desc,
            format,
        } => {
            let filters = ItemFilters {
                item_type,
                min_damage,
                max_damage,
                min_level,
                max_level,
                base_stat,
                stat,
                recipe_field,
                has_effects,
                craftable,
                has_recipe,
            };
            let query = ItemQuery {
                search: search.unwrap_or_default(),
                filters,
                sort_by: sort.as_deref().and_then(SortKey::from_name),
                order: if desc { SortOrder::Desc } else { SortOrder::Asc },
            };
            let results = query.run(catalog.items());
            print_items(&results, format)?;
        }
        Command::Show { item_id } => {
            let Some(item) = catalog.item_by_id(&item_id) else {
                return Err(format!("no item with id {item_id:?}").into());
            };
            print_item_detail(catalog, &item);
        }
        Command::Recipe { item_id } => {
            let Some(recipe) = catalog.recipe_for(&item_id) else {
                return Err(format!("no recipe produces item {item_id:?}").into());
            };
            print_recipe(catalog, &recipe);
        }
        Command::BuildsInto { item_id } => {
            let uses = catalog.items_using_material(&item_id);
            if uses.is_empty() {
                println!("{item_id} is not consumed by any recipe");
            }
            for item in uses {
                println!(
                    "{}\t{}\t{}",
                    item.item_id,
                    item.name,
                    item.type_label().unwrap_or("")
                );
            }
        }
        Command::Options { format } => {
            let options = build_filter_options(catalog.items());
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&options)?),
                _ => {
                    println!("types: {}", options.types.join(", "));
                    println!("baseStat keys: {}", options.base_stat_keys.join(", "));
                    println!("stat keys: {}", options.stat_keys.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn print_items(items: &[Rc<Item>], format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("no items matched");
                return Ok(());
            }
            println!(
                "{:<24} {:<28} {:<12} {:<10} {:>5} {:>7}",
                "ID", "NAME", "TYPE", "RARITY", "LVL", "DMG"
            );
            for item in items {
                println!(
                    "{:<24} {:<28} {:<12} {:<10} {:>5} {:>7}",
                    item.item_id,
                    item.name,
                    item.type_label().unwrap_or(""),
                    item.rarity,
                    item.level,
                    item.stat("damage"),
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["itemId", "name", "type", "rarity", "level", "damage", "value"])?;
            for item in items {
                writer.write_record([
                    item.item_id.as_str(),
                    item.name.as_str(),
                    item.type_label().unwrap_or(""),
                    item.rarity.as_str(),
                    &item.level.to_string(),
                    &item.stat("damage").to_string(),
                    &item.value.unwrap_or(0.0).to_string(),
                ])?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn print_item_detail(catalog: &Catalog, item: &Item) {
    println!("{} [{}]", item.name, item.rarity);
    if let Some(label) = item.type_label() {
        match item.subtype.as_deref() {
            Some(subtype) => println!("type: {label} / {subtype}"),
            None => println!("type: {label}"),
        }
    }
    println!("level: {}", item.level);
    if !item.description.is_empty() {
        println!("{}", item.description);
    }
    if let Some(req) = &item.requirements {
        println!(
            "requires: level {} / str {} / agi {} / int {}",
            req.level, req.strength, req.agility, req.intelligence
        );
    }
    if !item.stats.is_empty() {
        println!("stats:");
        for (key, value) in &item.stats {
            println!("  {key}: {value}");
        }
    }
    for effect in &item.effects {
        println!(
            "effect: {} -- {}",
            effect.name.as_deref().unwrap_or("Unnamed Effect"),
            effect.description
        );
    }
    if let Some(recipe) = catalog.recipe_for(&item.item_id) {
        println!();
        print_recipe(catalog, &recipe);
    }
    let builds_into = catalog.items_using_material(&item.item_id);
    if !builds_into.is_empty() {
        println!("builds into:");
        for output in builds_into {
            println!("  {} ({})", output.name, output.item_id);
        }
    }
}

fn print_recipe(catalog: &Catalog, recipe: &Recipe) {
    println!("recipe: {}", recipe.resolved_id().unwrap_or_default());
    if let Some(skill) = recipe.required_skill() {
        match recipe.required_skill_level() {
            Some(level) => println!("skill: {skill} (level {level})"),
            None => println!("skill: {skill}"),
        }
    }
    if let Some(craft_time) = recipe.craft_time {
        println!("craft time: {}", format_craft_time(craft_time));
    }
    println!("materials:");
    for material in &recipe.materials {
        let name = catalog
            .item_by_id(&material.item_id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| material.item_id.replace('_', " "));
        println!("  {} x{}", name, material.quantity);
    }
}

fn format_craft_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
