//! Command-line interface for mdt
//! Parses decision tree transcripts into structured trees and walks them.
//!
//! Usage:
//!   mdt parse `<path>` [--format `<format>`] [--diagnostics] [--partials]  - Parse a transcript (`-` reads stdin)
//!   mdt walk `<path>` --answer `<answer>`...                               - Follow answers to an outcome
//!   mdt chunk `<path>`                                                   - Split an article into paragraph chunks
//!   mdt tokens `<path>`                                                  - Print each line as the parser classifies it
//!   mdt formats                                                        - List the output formats
//!
//! `--config <file>` layers a TOML file over the built-in defaults; `-v` (repeatable)
//! raises the log level on stderr.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*};

use mdt::mdt::ast::TreeNode;
use mdt::mdt::chunking::{chunk_text, has_tree_markers, split_partials_with_lines};
use mdt::mdt::conditions::Answer;
use mdt::mdt::config::{Loader, MdtConfig};
use mdt::mdt::error::{Error, Result};
use mdt::mdt::formats::FormatRegistry;
use mdt::mdt::parsing::TreeParser;

fn build_cli() -> Command {
    Command::new("mdt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse indentation-structured decision tree transcripts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log output (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a transcript and print the tree")
                .arg(
                    Arg::new("path")
                        .help("Transcript file, or - for stdin")
                        .default_value("-")
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (see `mdt formats`); defaults to output.format"),
                )
                .arg(
                    Arg::new("diagnostics")
                        .long("diagnostics")
                        .help("Report skipped and overridden lines on stderr")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("partials")
                        .long("partials")
                        .help("Treat the input as partial trees separated by --- lines")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("walk")
                .about("Follow answers from the root to an outcome")
                .arg(
                    Arg::new("path")
                        .help("Transcript file, or a .json tree")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("answer")
                        .long("answer")
                        .short('a')
                        .help("Answer to the next question (repeat in order)")
                        .required(true)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("chunk")
                .about("Split text into paragraph chunks and flag those with tree markers")
                .arg(
                    Arg::new("path")
                        .help("Text file, or - for stdin")
                        .default_value("-")
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print every line with its source line number and classification")
                .arg(
                    Arg::new("path")
                        .help("Transcript file, or - for stdin")
                        .default_value("-")
                        .index(1),
                ),
        )
        .subcommand(Command::new("formats").about("List available output formats"))
}

fn main() {
    let matches = build_cli().get_matches();
    setup_logging(matches.get_count("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    debug!(?filter, "logging initialized");
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches.get_one::<PathBuf>("config"))?;

    match matches.subcommand() {
        Some(("parse", sub)) => handle_parse_command(sub, &config),
        Some(("walk", sub)) => handle_walk_command(sub, &config),
        Some(("chunk", sub)) => handle_chunk_command(sub, &config),
        Some(("tokens", sub)) => handle_tokens_command(sub, &config),
        Some(("formats", _)) => {
            handle_formats_command(&config);
            Ok(())
        }
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<MdtConfig> {
    let loader = match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Loader::new().with_file(path)
        }
        None => Loader::new(),
    };
    Ok(loader.build()?)
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(|source| Error::Io {
                path: PathBuf::from("<stdin>"),
                source,
            })?;
        return Ok(source);
    }
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: PathBuf::from(path),
        source,
    })
}

fn path_arg<'a>(matches: &'a ArgMatches) -> &'a str {
    matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or("-")
}

/// Handle the parse command
fn handle_parse_command(matches: &ArgMatches, config: &MdtConfig) -> Result<()> {
    let source = read_input(path_arg(matches))?;
    let format = matches
        .get_one::<String>("format")
        .cloned()
        .unwrap_or_else(|| config.output.format.clone());
    let show_diagnostics = matches.get_flag("diagnostics");

    let parser = TreeParser::from_config(config)?;
    let registry = FormatRegistry::with_markers(config.markers.clone());

    // (first source line, text) per document
    let mut documents = if matches.get_flag("partials") {
        split_partials_with_lines(&source)
    } else {
        vec![(1, source.as_str())]
    };
    if documents.is_empty() {
        documents.push((1, ""));
    }

    for (i, (first_line, document)) in documents.into_iter().enumerate() {
        let offset = first_line - 1;
        let report = parser
            .parse_with_diagnostics(document)
            .map_err(|e| e.offset_lines(offset))?;
        if show_diagnostics {
            for diagnostic in report.diagnostics {
                eprintln!("{}", diagnostic.offset_lines(offset));
            }
        }
        if i > 0 {
            println!("---");
        }
        print!("{}", registry.serialize(report.tree.as_ref(), &format)?);
    }

    Ok(())
}

/// Handle the walk command
fn handle_walk_command(matches: &ArgMatches, config: &MdtConfig) -> Result<()> {
    let path = path_arg(matches);
    let source = read_input(path)?;

    let tree = if Path::new(path).extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str::<TreeNode>(&source).map_err(|source| Error::StoredTree {
            path: PathBuf::from(path),
            source,
        })?
    } else {
        TreeParser::from_config(config)?
            .parse(&source)?
            .ok_or_else(|| Error::NoTree(path.to_string()))?
    };

    let answers = matches
        .get_many::<String>("answer")
        .into_iter()
        .flatten()
        .map(|answer| Answer::parse(answer));
    let walk = tree.walk(answers)?;

    for step in &walk.steps {
        info!(question = step.question.as_str(), condition = step.condition.as_str(), "step");
    }
    println!("{}", walk.outcome);
    Ok(())
}

/// Handle the chunk command
fn handle_chunk_command(matches: &ArgMatches, config: &MdtConfig) -> Result<()> {
    let source = read_input(path_arg(matches))?;
    let parser = TreeParser::from_config(config)?;

    for (i, chunk) in chunk_text(&source).iter().enumerate() {
        let flag = if has_tree_markers(chunk, parser.classifier()) {
            " (tree markers)"
        } else {
            ""
        };
        println!("--- chunk {}{} ---", i + 1, flag);
        println!("{}", chunk);
    }
    Ok(())
}

/// Handle the tokens command
fn handle_tokens_command(matches: &ArgMatches, config: &MdtConfig) -> Result<()> {
    let source = read_input(path_arg(matches))?;
    let parser = TreeParser::from_config(config)?;

    for (line, token) in parser.tokens(&source) {
        println!("{:>4} {}", line, token);
    }
    Ok(())
}

/// Handle the formats command
fn handle_formats_command(config: &MdtConfig) {
    let registry = FormatRegistry::with_markers(config.markers.clone());
    println!("Available formats:\n");
    for name in registry.list_formats() {
        let description = registry
            .get(&name)
            .map(|formatter| formatter.description().to_string())
            .unwrap_or_default();
        println!("  {:<10}{}", name, description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli().debug_assert();
    }

    #[test]
    fn parses_repeated_answers_in_order() {
        let matches = build_cli()
            .try_get_matches_from(["mdt", "walk", "tree.json", "-a", "85", "-a", "No"])
            .unwrap();
        let (_, walk) = matches.subcommand().unwrap();
        let answers: Vec<&String> = walk.get_many::<String>("answer").unwrap().collect();
        assert_eq!(answers, vec!["85", "No"]);
    }

    #[test]
    fn counts_global_verbosity_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["mdt", "formats", "-vv"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
    }
}
