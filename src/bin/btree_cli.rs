//! Simple CLI for exercising the B-tree engine.
//!
//! Commands run in order against one in-memory tree of `i64` values:
//!   btree_cli [--degree N] add <v>... remove <v>... walk in reverse stats
//!
//! Commands:
//!   add <v>...                      Add values
//!   remove <v>...                   Remove one occurrence of each value
//!   contains <v>                    Print FOUND or NOT_FOUND for one value
//!   walk <level|pre|in|post> [reverse]   Print entries in that order
//!   blocks <level|pre|in|post> [reverse] Print one block per line
//!   levels                          Print entries level by level
//!   stats                           Print tree statistics
//!   export                          Print the tree as JSON
//!   validate                        Check structural invariants
//!
//! Set `RUST_LOG=btree_engine=trace` to see splits, borrows and merges.

use btree_engine::{BTreeMultiset, Direction, TraverseMethod, DEFAULT_DEGREE};
use std::env;
use std::iter::Peekable;
use std::process::exit;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Tree = BTreeMultiset<i64>;

fn usage() -> ! {
    eprintln!("Usage: btree_cli [--degree N] <command> [args...] [<command> [args...]]...");
    eprintln!("Commands:");
    eprintln!("  add <v>...                  - Add values");
    eprintln!("  remove <v>...               - Remove one occurrence of each value");
    eprintln!("  contains <v>                - Check if a value is stored");
    eprintln!("  walk <order> [reverse]      - Print entries (order: level, pre, in, post)");
    eprintln!("  blocks <order> [reverse]    - Print blocks, one per line");
    eprintln!("  levels                      - Print entries level by level");
    eprintln!("  stats                       - Show tree statistics");
    eprintln!("  export                      - Print the tree structure as JSON");
    eprintln!("  validate                    - Check structural invariants");
    exit(1);
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("ERROR: {}", message);
    exit(1);
}

fn parse_method(name: &str) -> TraverseMethod {
    match name {
        "level" => TraverseMethod::LevelOrder,
        "pre" => TraverseMethod::PreOrder,
        "in" => TraverseMethod::InOrder,
        "post" => TraverseMethod::PostOrder,
        other => fail(format!("Unknown order: {}", other)),
    }
}

/// Read `<order> [reverse]`
fn parse_walk<I>(args: &mut Peekable<I>) -> (TraverseMethod, Direction)
where
    I: Iterator<Item = String>,
{
    let method = match args.next() {
        Some(name) => parse_method(&name),
        None => usage(),
    };
    let direction = if args.next_if(|a| a == "reverse").is_some() {
        Direction::Backward
    } else {
        Direction::Forward
    };
    (method, direction)
}

/// Read every following argument that parses as a value
fn parse_values<I>(args: &mut Peekable<I>) -> Vec<i64>
where
    I: Iterator<Item = String>,
{
    let mut values = Vec::new();
    while let Some(arg) = args.next_if(|a| a.parse::<i64>().is_ok()) {
        if let Ok(v) = arg.parse() {
            values.push(v);
        }
    }
    values
}

/// Read exactly one value
fn parse_value<I>(args: &mut Peekable<I>) -> Option<i64>
where
    I: Iterator<Item = String>,
{
    args.next_if(|a| a.parse::<i64>().is_ok())
        .and_then(|arg| arg.parse().ok())
}

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn run<I>(tree: &mut Tree, command: &str, args: &mut Peekable<I>)
where
    I: Iterator<Item = String>,
{
    match command {
        "add" => {
            let values = parse_values(args);
            if values.is_empty() {
                usage();
            }
            for v in values {
                if let Err(e) = tree.add(v) {
                    fail(e);
                }
            }
            println!("OK");
        }

        "remove" => {
            let values = parse_values(args);
            if values.is_empty() {
                usage();
            }
            for v in values {
                match tree.remove(&v) {
                    Ok(true) => println!("DELETED {}", v),
                    Ok(false) => println!("NOT_FOUND {}", v),
                    Err(e) => fail(e),
                }
            }
        }

        "contains" => {
            let value = match parse_value(args) {
                Some(v) => v,
                None => usage(),
            };
            if tree.contains(&value) {
                println!("FOUND");
            } else {
                println!("NOT_FOUND");
            }
        }

        "walk" => {
            let (method, direction) = parse_walk(args);
            println!("{}", join(tree.values(method, direction)));
        }

        "blocks" => {
            let (method, direction) = parse_walk(args);
            let mut blocks = tree.as_tree().blocks(method, direction);
            while let Some(block) = blocks.next() {
                let depth = blocks.depth().unwrap_or_default();
                println!("{}[{}]", "  ".repeat(depth), join(block.iter()));
            }
        }

        "levels" => {
            tree.as_tree()
                .iterate_levels(Direction::Forward, |depth, entries| {
                    println!("{}: {}", depth, join(entries.iter()));
                });
        }

        "stats" => {
            let stats = tree.as_tree().stats();
            println!("count: {}", stats.count);
            println!("height: {}", stats.height);
            println!("degree: {}", stats.degree);
            println!("blocks: {}", stats.blocks);
        }

        "export" => match serde_json::to_string_pretty(&tree.as_tree().export()) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(e),
        },

        "validate" => match tree.as_tree().validate() {
            Ok(()) => println!("VALID"),
            Err(e) => fail(e),
        },

        _ => usage(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("btree_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1).peekable();

    let mut degree = DEFAULT_DEGREE;
    if args.next_if(|a| a == "--degree").is_some() {
        degree = match args.next().map(|d| d.parse()) {
            Some(Ok(d)) => d,
            _ => fail("Invalid degree"),
        };
    }

    let mut tree = match Tree::new(degree) {
        Ok(tree) => tree,
        Err(e) => fail(e),
    };
    info!(degree, "tree created");

    if args.peek().is_none() {
        usage();
    }
    while let Some(command) = args.next() {
        run(&mut tree, &command, &mut args);
    }
}
