//! Parsing Options.
//! `pn-reach [OPTIONS] <INPUT>`; extra flags may also come from `PN_FLAGS`.

use clap::{Arg, ArgAction, Command, value_parser};
use std::error::Error;
use std::path::PathBuf;

use crate::analysis::reachability::SearchMode;
use crate::config::PnConfig;

fn make_options_parser() -> clap::Command {
    Command::new("pn-reach")
        .no_binary_name(true)
        .version("v0.1.0")
        .about("Reachable-marking exploration for 1-safe Place/Transition nets")
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Net document (JSON, or RON with a .ron extension)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file")
                .default_value("pn.toml")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .help("Traversal order(s) to run")
                .value_parser(["bfs", "dfs", "both"]),
        )
        .arg(
            Arg::new("allow-unsafe")
                .long("allow-unsafe")
                .help("Do not require 1-safe markings and unit arc weights")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("state-limit")
                .short('l')
                .long("state-limit")
                .value_name("N")
                .help("Fail once more than N distinct markings are reached")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path to file where the JSON report will be stored")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("details")
                .long("details")
                .help("List every place, transition and arc")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("deadlocks")
                .long("deadlocks")
                .help("Report dead markings and never-enabled transitions")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("viz-petrinet")
                .long("viz-petrinet")
                .value_name("FILE")
                .help("Write the net as a DOT graph")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("viz-stategraph")
                .long("viz-stategraph")
                .value_name("FILE")
                .help("Write the reachability graph as a DOT graph")
                .value_parser(value_parser!(PathBuf)),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    pub config: PathBuf,
    pub modes: Option<Vec<SearchMode>>,
    pub allow_unsafe: bool,
    pub state_limit: Option<usize>,
    pub output: Option<PathBuf>,
    pub details: bool,
    pub deadlocks: bool,
    pub viz_petrinet: Option<PathBuf>,
    pub viz_stategraph: Option<PathBuf>,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let modes = match matches.get_one::<String>("mode").map(String::as_str) {
            None => None,
            Some("bfs") => Some(vec![SearchMode::BreadthFirst]),
            Some("dfs") => Some(vec![SearchMode::DepthFirst]),
            Some("both") => Some(vec![SearchMode::BreadthFirst, SearchMode::DepthFirst]),
            Some(_) => return Err("UnsupportedSearchMode")?,
        };
        let input = matches
            .get_one::<PathBuf>("input")
            .cloned()
            .ok_or("missing INPUT")?;
        let config = matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("pn.toml"));

        Ok(Options {
            input,
            config,
            modes,
            allow_unsafe: matches.get_flag("allow-unsafe"),
            state_limit: matches.get_one::<usize>("state-limit").copied(),
            output: matches.get_one::<PathBuf>("output").cloned(),
            details: matches.get_flag("details"),
            deadlocks: matches.get_flag("deadlocks"),
            viz_petrinet: matches.get_one::<PathBuf>("viz-petrinet").cloned(),
            viz_stategraph: matches.get_one::<PathBuf>("viz-stategraph").cloned(),
        })
    }

    /// Command-line values take precedence over the configuration file.
    pub fn apply_to(&self, config: &mut PnConfig) {
        if let Some(modes) = &self.modes {
            config.modes = modes.clone();
        }
        if self.allow_unsafe {
            config.require_one_safe = false;
        }
        if self.state_limit.is_some() {
            config.state_limit = self.state_limit;
        }
        if self.details {
            config.include_details = true;
        }
    }
}
