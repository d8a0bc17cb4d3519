//! Encode Newick trees into a CBLV feature table
//!
//! Reads `;`-terminated Newick trees, optionally attaches tip states from a
//! tab-separated `label<TAB>state` file, and writes one column per tree as
//! CSV (or the full table as JSON).

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use cblv::prelude::*;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Plain,
    Binary,
    Multi,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Newick file with one or more trees
    #[arg(short, long)]
    input: PathBuf,

    /// Tab-separated tip states: label<TAB>state
    #[arg(short, long)]
    states: Option<PathBuf>,

    /// Encoding variant
    #[arg(short, long, value_enum, default_value_t = Kind::Plain)]
    kind: Kind,

    /// Number of states for the multi-state encoding
    #[arg(long, default_value_t = 3)]
    num_states: u32,

    /// Capacity in taxa; defaults to the largest input tree
    #[arg(short, long)]
    max_taxa: Option<usize>,

    /// JSON config file overriding --kind/--num-states/--max-taxa
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the table as JSON instead of CSV
    #[arg(long)]
    json: bool,
}

impl Args {
    fn encoder_config(&self) -> Result<EncoderConfig> {
        if let Some(path) = &self.config {
            return cblv::utils::load_json(path);
        }
        let config = match self.kind {
            Kind::Plain => EncoderConfig::plain(),
            Kind::Binary => EncoderConfig::binary_state(),
            Kind::Multi => EncoderConfig::multi_state(self.num_states),
        };
        Ok(match self.max_taxa {
            Some(max_taxa) => config.with_max_taxa(max_taxa),
            None => config,
        })
    }
}

fn read_states(path: &Path) -> Result<HashMap<String, u32>> {
    parse_states(&fs::read_to_string(path)?, &path.display().to_string())
}

/// Parse `label<TAB>state` lines, skipping blank lines and `#` comments
fn parse_states(text: &str, source: &str) -> Result<HashMap<String, u32>> {
    let mut states = HashMap::new();
    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = line
            .split_once('\t')
            .and_then(|(label, state)| Some((label.trim(), state.trim().parse::<u32>().ok()?)));
        match parsed {
            Some((label, state)) => {
                states.insert(label.to_string(), state);
            }
            None => {
                return Err(CblvError::InvalidConfig(format!(
                    "{}:{}: expected label<TAB>state",
                    source,
                    line_number + 1
                )))
            }
        }
    }
    Ok(states)
}

fn run(args: Args) -> Result<()> {
    let config = args.encoder_config()?;
    config.validate()?;

    let mut trees = parse_newick_trees(&fs::read_to_string(&args.input)?)?;
    log::info!("read {} trees from {}", trees.len(), args.input.display());

    if let Some(path) = &args.states {
        let states = read_states(path)?;
        log::info!("read {} tip states from {}", states.len(), path.display());
        trees = trees.iter().map(|tree| tree.assign_states(&states)).collect();
    }

    let table = BatchEncoder::new(config)
        .with_progress(LogProgress::default())
        .encode(&trees)?;

    match (&args.output, args.json) {
        (Some(path), true) => cblv::utils::save_json(&table, path)?,
        (Some(path), false) => table.write_csv(fs::File::create(path)?)?,
        (None, true) => serde_json::to_writer_pretty(io::stdout().lock(), &table)?,
        (None, false) => table.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Args::parse()) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_states() {
        let text = "# tip states\nA\t0\n\n  B\t 1 \n# C\t9\nC D\t2\n";
        let states = parse_states(text, "states.tsv").unwrap();

        assert_eq!(states.len(), 3);
        assert_eq!(states["A"], 0);
        assert_eq!(states["B"], 1);
        assert_eq!(states["C D"], 2);
        assert!(!states.contains_key("C"));
    }

    #[test]
    fn test_parse_states_rejects_malformed_lines() {
        for text in ["A\t0\nB 1\n", "A\t0\nB\tone\n", "A\t0\nB\t-1\n"] {
            match parse_states(text, "states.tsv") {
                Err(CblvError::InvalidConfig(message)) => {
                    assert_eq!(message, "states.tsv:2: expected label<TAB>state");
                }
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn test_read_states_from_file() {
        let path = std::env::temp_dir().join(format!("cblv_states_{}.tsv", std::process::id()));
        fs::write(&path, "A\t1\nB\t0\n").unwrap();
        let states = read_states(&path).unwrap();
        assert_eq!(states.get("A"), Some(&1));
        assert_eq!(states.get("B"), Some(&0));

        // Clean up
        fs::remove_file(&path).ok();
    }
}
