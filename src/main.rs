use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hwpx_ir::{BlockContent, Result, Searcher, parse_package, read_package};

#[derive(Parser)]
#[command(name = "hwpx-ir")]
#[command(version)]
#[command(about = "Inspect, search, edit and rewrite HWPX documents", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show package and document structure
    Info {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print all paragraph text
    Text {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Search paragraph text
    Search {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        query: String,

        /// Treat the query as a regular expression
        #[arg(long)]
        regex: bool,

        #[arg(long)]
        case_sensitive: bool,
    },

    /// Replace text in the first section
    Replace {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        old: String,

        new: String,

        /// Maximum number of replacements
        #[arg(long)]
        count: Option<usize>,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Read a document into the IR and write it back out
    Rewrite {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Template package (defaults to the input)
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,
    },
}

fn info(input: &Path) -> Result<()> {
    let package = read_package(input)?;
    let doc = parse_package(&package)?;

    println!("{}", input.display());
    println!("  sections:     {}", package.sections.len());
    println!("  binary items: {}", package.binary_items.len());
    for item in package.binary_items.values() {
        println!("    {} ({}, {} bytes)", item.id, item.filename, item.data.len());
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut count = |kind: &'static str| match counts.iter_mut().find(|(k, _)| *k == kind) {
        Some((_, n)) => *n += 1,
        None => counts.push((kind, 1)),
    };
    for block in &doc.blocks {
        count(block.kind_name());
        if let BlockContent::Section(section) = &block.content {
            for inner in &section.blocks {
                count(inner.kind_name());
            }
        }
    }
    println!("  blocks:");
    for (kind, n) in counts {
        println!("    {kind:<10} {n}");
    }

    for (name, xml) in &package.sections {
        let searcher = Searcher::parse(xml)?;
        println!(
            "  {name}: {} paragraphs, ~{} pages, {} tables, {} images",
            searcher.paragraph_count(),
            searcher.get_page_count_estimate(),
            searcher.get_tables_info().len(),
            searcher.get_images_info().len(),
        );
    }
    Ok(())
}

fn text(input: &Path) -> Result<()> {
    let package = read_package(input)?;
    for (_, xml) in &package.sections {
        println!("{}", Searcher::parse(xml)?.get_all_text());
    }
    Ok(())
}

fn search(input: &Path, query: &str, regex: bool, case_sensitive: bool) -> Result<()> {
    let package = read_package(input)?;
    let mut total = 0;
    for (name, xml) in &package.sections {
        let searcher = Searcher::parse(xml)?;
        let hits = if regex {
            searcher.search_regex(query)?
        } else {
            searcher.search(query, case_sensitive)
        };
        for hit in &hits {
            println!(
                "{name} #{} (page ~{}): {}",
                hit.paragraph_index, hit.page_estimate, hit.context
            );
        }
        total += hits.len();
    }
    println!("{total} match(es)");
    Ok(())
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Info { input } => info(&input),
        Commands::Text { input } => text(&input),
        Commands::Search {
            input,
            query,
            regex,
            case_sensitive,
        } => search(&input, &query, regex, case_sensitive),
        Commands::Replace {
            input,
            old,
            new,
            count,
            output,
        } => {
            let n = hwpx_ir::replace_text_in_hwpx(&input, &output, &old, &new, count)?;
            println!("{n} replacement(s), saved to {}", output.display());
            Ok(())
        }
        Commands::Rewrite {
            input,
            output,
            template,
        } => {
            hwpx_ir::rewrite_hwpx(&input, &output, template.as_deref())?;
            println!("Wrote {}", output.display());
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
