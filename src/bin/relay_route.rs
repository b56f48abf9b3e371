use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use relay_engine::data::{parse, read_challenge, ChallengeDetails};
use relay_engine::{Locate, Location, RouteResult, RouteStrategy, Router};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Routes a signal between two ground points over orbiting relays"
)]
struct Cli {
    /// Challenge data file; reads standard input when omitted or `-`.
    input: Option<PathBuf>,

    /// Select the shortest path algorithm over the default fewest hops.
    #[arg(long, conflicts_with = "fast")]
    short: bool,

    /// Select the fast algorithm over the default fewest hops.
    #[arg(long)]
    fast: bool,

    /// Print the route as JSON instead of the text report.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn strategy(&self) -> RouteStrategy {
        if self.short {
            RouteStrategy::ShortestPath
        } else if self.fast {
            RouteStrategy::Fast
        } else {
            RouteStrategy::FewestHops
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let contents = read_challenge(cli.input.as_deref()).context("failed to read challenge data")?;
    let challenge = parse(&contents).context("failed to parse challenge data")?;

    let strategy = cli.strategy();
    info!(
        "routing {} -> {} over {} relay(s) with {}",
        challenge.source.name(),
        challenge.target.name(),
        challenge.relays.len(),
        strategy
    );

    let router = Router::new(strategy, challenge.relays.clone());
    let route = router.route(&challenge.source, &challenge.target);

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&route).context("failed to encode route")?
        );
    } else {
        for line in report(strategy, &challenge, &route) {
            println!("{}", line);
        }
    }
    Ok(())
}

/// Text report: algorithm and metrics headers, the input comments, then the
/// relay names along the route.
fn report(
    strategy: RouteStrategy,
    challenge: &ChallengeDetails,
    route: &RouteResult<Location>,
) -> Vec<String> {
    let Some(path) = &route.path else {
        let mut lines = challenge.comments.clone();
        lines.push("#NO ROUTE".to_string());
        return lines;
    };

    let mut lines = vec![
        format!("#ALGORITHM: {}", strategy.label()),
        format!("#METRICS: {:.3} km over {} hops", route.distance, route.hops),
    ];
    lines.extend(challenge.comments.iter().cloned());
    lines.push(
        path[1..path.len() - 1]
            .iter()
            .map(|relay| relay.name())
            .collect::<Vec<_>>()
            .join(","),
    );
    lines
}
