use std::process;

use anyhow::{Context, Result};
use log::debug;

use pnreach::analysis::{
    DeadlockDetector, ExploreConfig, ExploreError, ReachabilityExplorer, StateGraph,
};
use pnreach::config::PnConfig;
use pnreach::net::io::{self, IoError};
use pnreach::net::{BuildError, NetBuilder};
use pnreach::options::Options;
use pnreach::report::{AnalysisReport, NetDetails, ReachabilityReport};

fn main() {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let mut flags = match std::env::var("PN_FLAGS") {
        Ok(env_flags) => shellwords::split(&env_flags).unwrap_or_else(|err| {
            log::warn!("ignoring PN_FLAGS: {err}");
            Vec::new()
        }),
        Err(_) => Vec::new(),
    };
    for (i, arg) in std::env::args_os().enumerate().skip(1) {
        match arg.into_string() {
            Ok(arg) => flags.push(arg),
            Err(arg) => {
                eprintln!("error[usage]: argument {i} is not valid Unicode: {arg:?}");
                process::exit(1);
            }
        }
    }

    let options = match Options::parse_from_args(&flags) {
        Ok(options) => options,
        Err(err) => {
            if let Some(err) = err.downcast_ref::<clap::Error>() {
                err.exit();
            }
            eprintln!("error[usage]: {err}");
            process::exit(1);
        }
    };
    debug!("PN options: {:?}", options);

    if let Err(err) = run(&options) {
        let (code, tag) = exit_code(&err);
        eprintln!("error[{tag}]: {err:#}");
        process::exit(code);
    }
}

fn run(options: &Options) -> Result<()> {
    let mut config = PnConfig::load_from_file(&options.config)?;
    options.apply_to(&mut config);
    debug!("PN config: {:?}", config);

    let document = io::read_document(&options.input)
        .with_context(|| format!("Failed to read net document: {:?}", options.input))?;
    let net = NetBuilder::new(config.build_options()).build(&document)?;

    let mut report = AnalysisReport::new(&net);
    println!("{}", report.summary);
    if config.include_details {
        let details = NetDetails::of(&net);
        print!("{details}");
        report.details = Some(details);
    }
    if let Some(path) = &options.viz_petrinet {
        net.write_dot(path)
            .with_context(|| format!("Failed to write net graph: {:?}", path))?;
    }

    let explorer = ReachabilityExplorer::new(&net);
    let mut first = None;
    for explore_config in config.explore_configs() {
        let reachability = explorer.explore_with(explore_config)?;
        let listing = ReachabilityReport::new(&net, &reachability);
        print!("{listing}");
        report.reachability.push(listing);
        if first.is_none() {
            first = Some(reachability);
        }
    }

    if options.deadlocks || options.viz_stategraph.is_some() {
        let reachability = match first {
            Some(reachability) => reachability,
            None => explorer.explore_with(
                ExploreConfig::default().with_state_limit(config.state_limit),
            )?,
        };
        if options.deadlocks {
            let deadlocks = DeadlockDetector::new(explorer.engine(), &reachability).detect();
            print!("{deadlocks}");
            report.deadlocks = Some(deadlocks);
        }
        if let Some(path) = &options.viz_stategraph {
            StateGraph::build(explorer.engine(), &reachability)
                .write_dot(path)
                .with_context(|| format!("Failed to write state graph: {:?}", path))?;
        }
    }

    if let Some(path) = &options.output {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }
    Ok(())
}

/// Process exit status and stderr tag for a failed run.
fn exit_code(err: &anyhow::Error) -> (i32, &'static str) {
    if let Some(err) = err.downcast_ref::<BuildError>() {
        return (if err.is_malformed() { 3 } else { 2 }, err.code());
    }
    if let Some(err) = err.downcast_ref::<IoError>() {
        return if err.is_decode() {
            (3, "malformed-source")
        } else {
            (1, "io")
        };
    }
    if err.downcast_ref::<ExploreError>().is_some() {
        return (4, "state-limit");
    }
    (1, "error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnreach::analysis::SearchMode;
    use pnreach::net::ElementKind;

    #[test]
    fn build_errors_map_to_their_kind() {
        let malformed = anyhow::Error::new(BuildError::MalformedSource {
            reason: "no <net> element".into(),
        });
        assert_eq!(exit_code(&malformed), (3, "malformed-source"));

        let isolated = anyhow::Error::new(BuildError::IsolatedNode {
            nodes: vec![(ElementKind::Place, "lonely".into())],
        });
        assert_eq!(exit_code(&isolated), (2, "isolated-node"));
    }

    #[test]
    fn context_does_not_hide_the_kind() {
        let decode = io::parse_document("{ not json", io::Format::Json)
            .context("Failed to read net document")
            .unwrap_err();
        assert_eq!(exit_code(&decode), (3, "malformed-source"));

        let limit = anyhow::Error::new(ExploreError::StateLimitExceeded {
            mode: SearchMode::DepthFirst,
            limit: 8,
        });
        assert_eq!(exit_code(&limit), (4, "state-limit"));
        assert_eq!(exit_code(&anyhow::anyhow!("other")), (1, "error"));
    }
}
