use log::debug;

use crate::graph::graph::{LayeredGraph, VisibilityOracle};
use crate::graph::pathfinder::{
    exhaustive_shortest, fewest_hops_shortest, greedy_backtrack, summarize, RouteResult,
};
use crate::Locate;

use super::RouteStrategy;

/// A routing strategy bound to a relay set.
///
/// Implementations hold no per-route state; every call builds its own
/// graph and search bookkeeping, so one instance serves any number of
/// source/target pairs.
pub trait RelayRouter<P> {
    fn strategy(&self) -> RouteStrategy;

    fn relays(&self) -> &[P];

    fn route(&self, source: &P, target: &P) -> RouteResult<P>;
}

/// Fewest hops, picking the nearest predecessor at each step back from the
/// target.
#[derive(Clone, Debug)]
pub struct FastRouter<P> {
    relays: Vec<P>,
}

impl<P> FastRouter<P> {
    pub fn new(relays: Vec<P>) -> Self {
        FastRouter { relays }
    }
}

impl<P: Locate + Clone> RelayRouter<P> for FastRouter<P> {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::Fast
    }

    fn relays(&self) -> &[P] {
        &self.relays
    }

    fn route(&self, source: &P, target: &P) -> RouteResult<P> {
        let mut oracle = VisibilityOracle::new(source, target, &self.relays);
        let graph = LayeredGraph::build(&mut oracle);
        let path = greedy_backtrack(&graph, &oracle);
        finish(self.strategy(), &oracle, &path)
    }
}

/// Fewest hops, then the shortest total distance among those routes.
#[derive(Clone, Debug)]
pub struct FewestHopsRouter<P> {
    relays: Vec<P>,
}

impl<P> FewestHopsRouter<P> {
    pub fn new(relays: Vec<P>) -> Self {
        FewestHopsRouter { relays }
    }
}

impl<P: Locate + Clone> RelayRouter<P> for FewestHopsRouter<P> {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::FewestHops
    }

    fn relays(&self) -> &[P] {
        &self.relays
    }

    fn route(&self, source: &P, target: &P) -> RouteResult<P> {
        let mut oracle = VisibilityOracle::new(source, target, &self.relays);
        let graph = LayeredGraph::build(&mut oracle);
        let path = fewest_hops_shortest(&graph, &oracle);
        finish(self.strategy(), &oracle, &path)
    }
}

/// Shortest total distance over any number of hops; fewer hops only break
/// distance ties.
#[derive(Clone, Debug)]
pub struct ShortestPathRouter<P> {
    relays: Vec<P>,
}

impl<P> ShortestPathRouter<P> {
    pub fn new(relays: Vec<P>) -> Self {
        ShortestPathRouter { relays }
    }
}

impl<P: Locate + Clone> RelayRouter<P> for ShortestPathRouter<P> {
    fn strategy(&self) -> RouteStrategy {
        RouteStrategy::ShortestPath
    }

    fn relays(&self) -> &[P] {
        &self.relays
    }

    fn route(&self, source: &P, target: &P) -> RouteResult<P> {
        let mut oracle = VisibilityOracle::new(source, target, &self.relays);
        let path = exhaustive_shortest(&mut oracle);
        finish(self.strategy(), &oracle, &path)
    }
}

fn finish<P: Locate + Clone>(
    strategy: RouteStrategy,
    oracle: &VisibilityOracle<'_, P>,
    path: &[usize],
) -> RouteResult<P> {
    let result = summarize(oracle, path);
    if result.is_found() {
        debug!(
            "{}: {:.3} over {} hop(s)",
            strategy, result.distance, result.hops
        );
    } else {
        debug!("{}: no route", strategy);
    }
    result
}
