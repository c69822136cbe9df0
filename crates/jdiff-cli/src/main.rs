//! Command-line interface for the `jdiff` structural diff tool.
//!
//! Compares two JSON (or YAML) documents and prints either the full
//! indented diff tree or a flat path report. Exit codes: `0` when the
//! inputs are identical, `2` on usage errors, `3` when a file cannot be
//! read, `4` when it cannot be parsed, `5` when the diff itself fails and
//! `6` when the inputs differ.

use std::convert::Infallible;
use std::fs;
use std::io::{BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use globset::{Glob, GlobSet, GlobSetBuilder};
use jdiff_core::{
    diff_streams, diff_with, path::strip_indices, report, validate_stream, walk, DiffKind,
    DiffNode, DiffOptions, JsonStream, OnceStream, OutputStyle, SequenceStrategy, Value,
};
use tracing::debug;

const STATUS_USAGE: u8 = 2;
const STATUS_READ_ERROR: u8 = 3;
const STATUS_UNMARSHAL_ERROR: u8 = 4;
const STATUS_DIFF_ERROR: u8 = 5;
const STATUS_DIFF_MISMATCH: u8 = 6;

#[derive(Debug, Parser)]
#[command(
    name = "jdiff",
    about = "Diff JSON and YAML documents structurally.",
    version,
)]
struct Cli {
    /// First file to compare.
    #[arg(value_name = "FILE_1")]
    lhs: PathBuf,

    /// Second file to compare.
    #[arg(value_name = "FILE_2")]
    rhs: PathBuf,

    /// Paths to ignore (glob), matched with and without sequence indices.
    #[arg(short = 'i', long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// Ignore excess keys and sequence elements.
    #[arg(long)]
    ignore_excess: bool,

    /// Output the flat path report instead of the full tree.
    #[arg(short = 'r', long)]
    report: bool,

    /// Indent string.
    #[arg(long, default_value = "\t")]
    indent: String,

    /// Show semantic type labels next to values.
    #[arg(short = 't', long, conflicts_with = "json")]
    show_types: bool,

    /// Render containers with JSON delimiters (implies --json-values).
    #[arg(long)]
    json: bool,

    /// Render values as their JSON serialisation.
    #[arg(long)]
    json_values: bool,

    /// Align sequence elements with an LCS edit script instead of by position.
    #[arg(long)]
    myers: bool,

    /// Sort sequences of objects by these keys before comparing.
    #[arg(long = "sort-by", value_name = "KEY")]
    sort_by: Vec<String>,

    /// Compare the inputs as streams of concatenated JSON documents.
    #[arg(long, conflicts_with = "yaml")]
    stream: bool,

    /// Check every document of FILE_2 against the single value in FILE_1.
    #[arg(long, conflicts_with_all = ["yaml", "stream"])]
    stream_validate: bool,

    /// Parse the inputs as YAML documents.
    #[arg(long)]
    yaml: bool,
}

#[derive(Debug)]
struct Failure {
    code: u8,
    message: String,
}

impl Failure {
    fn new<M>(code: u8, message: M) -> Self
    where
        M: Into<String>,
    {
        Self { code, message: message.into() }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(failure) => {
            eprintln!("Error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Failure> {
    let options = build_options(cli)?;
    let d = compute_diff(cli, &options)?;
    let d = prune(d, cli)?;

    let colorized = std::io::stdout().is_terminal();
    colored::control::set_override(colorized);
    let style = OutputStyle::default()
        .with_indent(cli.indent.clone())
        .with_show_types(cli.show_types)
        .with_colorized(colorized)
        .with_json(cli.json)
        .with_json_values(cli.json_values);

    if cli.report {
        for line in report(&d, &style) {
            println!("{line}");
        }
    } else {
        println!("{}", d.string_indent("", "", &style));
    }

    if d.kind() == DiffKind::Identical {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(STATUS_DIFF_MISMATCH))
    }
}

fn build_options(cli: &Cli) -> Result<DiffOptions, Failure> {
    let mut options = DiffOptions::default();
    if cli.myers {
        options = options.with_strategy(SequenceStrategy::Lcs);
    }
    if !cli.sort_by.is_empty() {
        options = options
            .with_sort_keys(cli.sort_by.iter().cloned())
            .map_err(|err| Failure::new(STATUS_USAGE, err.to_string()))?;
    }
    debug!(strategy = %options.strategy(), "diff options resolved");
    Ok(options)
}

fn compute_diff(cli: &Cli, options: &DiffOptions) -> Result<DiffNode, Failure> {
    if cli.stream_validate {
        let template = parse_file(&cli.lhs, cli.yaml)?;
        let mut lhs = OnceStream::new(template);
        let mut rhs = open_stream(&cli.rhs)?;
        return validate_stream(&mut lhs, &mut rhs, options)
            .map_err(|err| Failure::new(STATUS_DIFF_ERROR, format!("diff failed: {err}")));
    }
    if cli.stream {
        let mut lhs = open_stream(&cli.lhs)?;
        let mut rhs = open_stream(&cli.rhs)?;
        return diff_streams(&mut lhs, &mut rhs, options)
            .map_err(|err| Failure::new(STATUS_DIFF_ERROR, format!("diff failed: {err}")));
    }

    let lhs = parse_file(&cli.lhs, cli.yaml)?;
    let rhs = parse_file(&cli.rhs, cli.yaml)?;
    diff_with(&lhs, &rhs, options)
        .map_err(|err| Failure::new(STATUS_DIFF_ERROR, format!("diff failed: {err}")))
}

fn parse_file(path: &Path, yaml: bool) -> Result<Value, Failure> {
    let text = fs::read_to_string(path)
        .map_err(|err| Failure::new(STATUS_READ_ERROR, format!("cannot read {}: {err}", path.display())))?;
    let parsed = if yaml { Value::from_yaml_str(&text) } else { Value::from_json_str(&text) };
    parsed.map_err(|err| {
        Failure::new(STATUS_UNMARSHAL_ERROR, format!("cannot parse {}: {err}", path.display()))
    })
}

fn open_stream(path: &Path) -> Result<JsonStream<BufReader<fs::File>>, Failure> {
    let file = fs::File::open(path)
        .map_err(|err| Failure::new(STATUS_READ_ERROR, format!("cannot read {}: {err}", path.display())))?;
    Ok(JsonStream::new(BufReader::new(file)))
}

fn prune(d: DiffNode, cli: &Cli) -> Result<DiffNode, Failure> {
    if cli.ignore.is_empty() && !cli.ignore_excess {
        return Ok(d);
    }
    let matcher = build_matcher(&cli.ignore)?;
    let ignore_excess = cli.ignore_excess;
    let walked = walk(d, |_, node, path| {
        if !path.is_empty() && (matcher.is_match(path) || matcher.is_match(strip_indices(path))) {
            debug!(path, "subtree ignored");
            return Ok::<_, Infallible>(Some(DiffNode::Ignore));
        }
        if ignore_excess && node.is_excess() {
            return Ok(Some(DiffNode::Ignore));
        }
        Ok(None)
    });
    match walked {
        Ok(node) => Ok(node),
        Err(never) => match never {},
    }
}

fn build_matcher(patterns: &[String]) -> Result<GlobSet, Failure> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|err| Failure::new(STATUS_USAGE, format!("invalid ignore pattern: {err}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|err| Failure::new(STATUS_USAGE, format!("invalid ignore patterns: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matcher_handles_index_stripped_paths() {
        // "[[]]" is glob syntax for a literal "[]", so the pattern matches
        // the index-stripped form of the path.
        let matcher = build_matcher(&[".b[[]].c".to_owned()]).expect("valid pattern");
        assert!(matcher.is_match(strip_indices(".b[4].c")));
        assert!(!matcher.is_match(".b[4].c"));
    }

    #[test]
    fn cli_rejects_json_with_show_types() {
        use clap::CommandFactory;
        let err = Cli::command()
            .try_get_matches_from(["jdiff", "--json", "--show-types", "a", "b"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
