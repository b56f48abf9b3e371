//! Strategy selection and the routing facade.
//!
//! [`Router`] owns one [`RelayRouter`] chosen by [`RouteStrategy`] and
//! forwards every `route()` call to it.

mod strategies;

pub use strategies::{FastRouter, FewestHopsRouter, RelayRouter, ShortestPathRouter};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::pathfinder::RouteResult;
use crate::Locate;

/// Supported routing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    /// Fewest hops with a greedy nearest-predecessor walk back.
    Fast,
    /// Fewest hops, shortest distance among them.
    #[default]
    FewestHops,
    /// Shortest distance regardless of hop count.
    ShortestPath,
}

impl RouteStrategy {
    pub const ALL: [RouteStrategy; 3] = [
        RouteStrategy::Fast,
        RouteStrategy::FewestHops,
        RouteStrategy::ShortestPath,
    ];

    /// Human readable name used in reports.
    pub fn label(self) -> &'static str {
        match self {
            RouteStrategy::Fast => "Fast",
            RouteStrategy::FewestHops => "Fewest Hops",
            RouteStrategy::ShortestPath => "Shortest Path",
        }
    }
}

impl fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteStrategy::Fast => "fast",
            RouteStrategy::FewestHops => "fewest_hops",
            RouteStrategy::ShortestPath => "shortest_path",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown route strategy '{0}'; expected fast, fewest_hops or shortest_path")]
pub struct UnknownStrategy(pub String);

impl FromStr for RouteStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fast" => Ok(RouteStrategy::Fast),
            "fewest_hops" | "fewest-hops" | "fewestHops" => Ok(RouteStrategy::FewestHops),
            "shortest_path" | "shortest-path" | "shortestPath" | "short" => {
                Ok(RouteStrategy::ShortestPath)
            }
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Builds the router implementing `strategy` over `relays`.
pub fn select_router<P>(strategy: RouteStrategy, relays: Vec<P>) -> Box<dyn RelayRouter<P>>
where
    P: Locate + Clone + 'static,
{
    match strategy {
        RouteStrategy::Fast => Box::new(FastRouter::new(relays)),
        RouteStrategy::FewestHops => Box::new(FewestHopsRouter::new(relays)),
        RouteStrategy::ShortestPath => Box::new(ShortestPathRouter::new(relays)),
    }
}

/// Routes between arbitrary source/target pairs over a fixed relay set.
pub struct Router<P> {
    inner: Box<dyn RelayRouter<P>>,
}

impl<P> Router<P>
where
    P: Locate + Clone + 'static,
{
    pub fn new(strategy: RouteStrategy, relays: Vec<P>) -> Self {
        Router {
            inner: select_router(strategy, relays),
        }
    }

    pub fn strategy(&self) -> RouteStrategy {
        self.inner.strategy()
    }

    pub fn relays(&self) -> &[P] {
        self.inner.relays()
    }

    pub fn route(&self, source: &P, target: &P) -> RouteResult<P> {
        self.inner.route(source, target)
    }
}
