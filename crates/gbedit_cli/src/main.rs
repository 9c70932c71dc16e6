use std::path::PathBuf;
use std::process;

use clap::Parser;
use gbedit_core::config::ProjectConfig;
use gbedit_core::{Engine, Project, SymbolKind};
use gbedit_render::{render_json, render_listing};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "PROJECT")]
    path: PathBuf,
    /// Use this config instead of the project's gbedit.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(
        long,
        conflicts_with_all = ["add", "delete_door", "delete_tileset", "save", "build"]
    )]
    json: bool,
    /// Report whether NAME is free to use for a new asset.
    #[arg(
        long = "check-name",
        value_name = "NAME",
        conflicts_with_all = ["json", "add", "delete_door", "delete_tileset", "save", "build"]
    )]
    check_name: Option<String>,
    #[arg(long, value_name = "KIND", value_parser = parse_symbol_kind)]
    add: Option<SymbolKind>,
    /// Source file for --add, relative to the project root.
    #[arg(long, value_name = "REL")]
    file: Option<PathBuf>,
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    #[arg(long = "delete-door", value_name = "INDEX")]
    delete_door: Option<usize>,
    #[arg(long = "delete-tileset", value_name = "INDEX")]
    delete_tileset: Option<usize>,
    #[arg(long)]
    save: bool,
    #[arg(long)]
    build: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn parse_symbol_kind(value: &str) -> Result<SymbolKind, String> {
    SymbolKind::from_name(value).ok_or_else(|| {
        let names: Vec<&str> = SymbolKind::ALL.iter().map(SymbolKind::as_str).collect();
        format!("unknown kind '{value}', expected one of: {}", names.join(", "))
    })
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

fn apply_mutations(cli: &Cli, project: &mut Project) -> bool {
    let mut changed = false;

    if let Some(kind) = cli.add {
        // Both are enforced by the usage check in main.
        let (Some(file), Some(name)) = (&cli.file, &cli.name) else {
            return changed;
        };
        project
            .add_resource(kind, file, name)
            .unwrap_or_else(|e| {
                eprintln!("Error adding {kind} {name}:");
                eprintln!("  {e}");
                process::exit(1);
            });
        println!("added {kind} {name} to {}", file.display());
        changed = true;
    }

    if let Some(index) = cli.delete_door {
        let deletion = project.delete_door(index).unwrap_or_else(|e| {
            eprintln!("Error deleting door {index}:");
            eprintln!("  {e}");
            process::exit(1);
        });
        println!("deleted door {index}");
        for orphan in deletion.orphaned {
            println!("  door {orphan} no longer has a target");
        }
        changed = true;
    }

    if let Some(index) = cli.delete_tileset {
        let removed = project.delete_tileset(index).unwrap_or_else(|e| {
            eprintln!("Error deleting tileset {index}:");
            eprintln!("  {e}");
            process::exit(1);
        });
        println!("deleted tileset {index} ({removed})");
        changed = true;
    }

    changed
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.add.is_some() && (cli.file.is_none() || cli.name.is_none()) {
        eprintln!("--add requires --file <REL> and --name <NAME>");
        process::exit(2);
    }
    if cli.add.is_none() && (cli.file.is_some() || cli.name.is_some()) {
        eprintln!("--file and --name are only used with --add");
        process::exit(2);
    }

    let engine = match &cli.config {
        Some(path) => {
            let config = ProjectConfig::load(path).unwrap_or_else(|e| {
                eprintln!("Error loading config {}:", path.display());
                eprintln!("  {e}");
                process::exit(1);
            });
            Engine::with_config(config)
        }
        None => Engine::new(),
    };

    let mut project = engine.open_project(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error opening project: {}", cli.path.display());
        eprintln!("  {e}");
        process::exit(1);
    });

    if let Some(name) = &cli.check_name {
        match project.validate_new_name(name) {
            Ok(()) => println!("{name}: available"),
            Err(issue) => {
                println!("{name}: {issue}");
                process::exit(1);
            }
        }
        return;
    }

    let changed = apply_mutations(&cli, &mut project);

    if changed || cli.save || cli.build {
        let summary = project.save().unwrap_or_else(|e| {
            eprintln!("Error saving project: {}", cli.path.display());
            eprintln!("  {e}");
            process::exit(1);
        });
        println!(
            "saved {} symbols across {} files",
            summary.symbols, summary.files
        );
    } else if cli.json {
        let text = serde_json::to_string_pretty(&render_json(&project)).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON: {e}");
            process::exit(1);
        });
        println!("{text}");
    } else {
        print!("{}", render_listing(&project));
    }

    if cli.build {
        match project.build() {
            Ok(true) => println!("build succeeded"),
            Ok(false) => {
                eprintln!("build failed");
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error running build:");
                eprintln!("  {e}");
                process::exit(1);
            }
        }
    }
}
