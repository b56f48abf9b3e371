use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use log::trace;
use serde::Serialize;

use crate::graph::graph::{LayeredGraph, VisibilityOracle, SOURCE, TARGET};
use crate::Locate;

/// Relative slack under which two route distances count as equal.
const DISTANCE_TOLERANCE: f64 = 1e-9;

/// Outcome of a single `route()` call.
///
/// `path` runs from source to target inclusive, or is `None` when no route
/// exists. `hops` counts the relays on the path; `distance` is the sum of
/// the distances between consecutive points.
///
/// Without a route both metrics are zero, the same values a zero-length
/// direct link would carry. Check `path` (or [`RouteResult::is_found`]),
/// never the metrics, to tell the two apart; serialized output keeps
/// `path: null` for that reason.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RouteResult<P> {
    pub path: Option<Vec<P>>,
    pub hops: usize,
    pub distance: f64,
}

impl<P> RouteResult<P> {
    pub fn no_route() -> Self {
        RouteResult {
            path: None,
            hops: 0,
            distance: 0.0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }
}

/// Turns an index path (source first, target last) into a [`RouteResult`].
/// A path holding a single node means the target was never connected.
pub fn summarize<P: Locate + Clone>(
    oracle: &VisibilityOracle<'_, P>,
    path: &[usize],
) -> RouteResult<P> {
    if path.len() < 2 {
        return RouteResult::no_route();
    }

    let distance: f64 = path
        .windows(2)
        .map(|pair| oracle.distance(pair[1], pair[0]))
        .sum();

    RouteResult {
        path: Some(path.iter().map(|&idx| oracle.point(idx).clone()).collect()),
        hops: path.len() - 2,
        distance,
    }
}

/// Walks back from the target, always stepping to the nearest predecessor
/// recorded in the layered graph. Fewest hops, locally shortest legs.
pub fn greedy_backtrack<P: Locate>(
    graph: &LayeredGraph,
    oracle: &VisibilityOracle<'_, P>,
) -> Vec<usize> {
    let mut node = TARGET;
    let mut path = vec![node];

    while !graph.incoming[node].is_empty() {
        let mut selected = graph.incoming[node][0];
        let mut shortest = oracle.distance(node, selected);
        for &candidate in &graph.incoming[node][1..] {
            let d = oracle.distance(node, candidate);
            if d < shortest {
                shortest = d;
                selected = candidate;
            }
        }
        trace!(
            "{} > {} ({:.3})",
            oracle.point(selected).name(),
            oracle.point(node).name(),
            shortest
        );
        node = selected;
        path.push(node);
    }

    path.reverse();
    path
}

/// Dijkstra over the layered graph's incoming edges, from the target back
/// to the source.
///
/// Every source-to-target path in the layered graph has the same hop count,
/// so the result is the shortest route among those with the fewest hops.
pub fn fewest_hops_shortest<P: Locate>(
    graph: &LayeredGraph,
    oracle: &VisibilityOracle<'_, P>,
) -> Vec<usize> {
    if !graph.reached() {
        return vec![TARGET];
    }

    #[derive(Copy, Clone, Debug)]
    struct Node {
        idx: usize,
        cost: f64,
    }

    impl Eq for Node {}

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            self.cmp(other) == Ordering::Equal
        }
    }

    impl Ord for Node {
        fn cmp(&self, other: &Self) -> Ordering {
            other
                .cost
                .partial_cmp(&self.cost)
                .unwrap_or(Ordering::Equal)
                .then_with(|| other.idx.cmp(&self.idx))
        }
    }

    impl PartialOrd for Node {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let mut open = BinaryHeap::new();
    open.push(Node {
        idx: TARGET,
        cost: 0.0,
    });

    // toward[n] is the next node from n on the way to the target.
    let mut toward: HashMap<usize, usize> = HashMap::new();
    let mut g_score: HashMap<usize, f64> = HashMap::new();
    g_score.insert(TARGET, 0.0);

    while let Some(Node { idx: current, cost }) = open.pop() {
        if current == SOURCE {
            return reconstruct_path(&toward, SOURCE);
        }
        if cost > *g_score.get(&current).unwrap_or(&f64::INFINITY) {
            continue;
        }

        for &previous in &graph.incoming[current] {
            let tentative = cost + oracle.distance(current, previous);
            if tentative < *g_score.get(&previous).unwrap_or(&f64::INFINITY) {
                toward.insert(previous, current);
                g_score.insert(previous, tentative);
                open.push(Node {
                    idx: previous,
                    cost: tentative,
                });
            }
        }
    }

    vec![TARGET]
}

fn reconstruct_path(toward: &HashMap<usize, usize>, mut current: usize) -> Vec<usize> {
    let mut path = vec![current];
    while let Some(&next) = toward.get(&current) {
        current = next;
        path.push(current);
    }
    path
}

/// Depth-first enumeration of every loop-free route over the full
/// visibility relation, starting at the target.
///
/// Keeps the shortest complete route; on equal distance the one with fewer
/// relays wins, then the one found first. Branches already longer than the
/// best complete route are cut since distances never shrink. Exponential in
/// the relay count in the worst case.
pub fn exhaustive_shortest<P: Locate>(oracle: &mut VisibilityOracle<'_, P>) -> Vec<usize> {
    let mut descent = Descent {
        on_path: vec![false; oracle.len()],
        trail: Vec::new(),
        best: None,
        oracle,
    };
    descent.visit(TARGET, 0.0);

    match descent.best {
        Some(best) => {
            let mut path = Vec::with_capacity(best.relays.len() + 2);
            path.push(SOURCE);
            path.extend(best.relays.iter().rev());
            path.push(TARGET);
            path
        }
        None => vec![TARGET],
    }
}

struct Candidate {
    /// Relays in the order they were visited, nearest to the target first.
    relays: Vec<usize>,
    distance: f64,
}

struct Descent<'o, 'a, P> {
    oracle: &'o mut VisibilityOracle<'a, P>,
    on_path: Vec<bool>,
    trail: Vec<usize>,
    best: Option<Candidate>,
}

impl<P: Locate> Descent<'_, '_, P> {
    fn visit(&mut self, node: usize, length: f64) {
        if let Some(best) = &self.best {
            if length > best.distance + tolerance(best.distance) {
                return;
            }
        }

        if self.oracle.visible(node, SOURCE) {
            let distance = length + self.oracle.distance(node, SOURCE);
            if self.improves(distance, self.trail.len()) {
                trace!(
                    "= {:.3} over {} relay(s) via {}",
                    distance,
                    self.trail.len(),
                    self.oracle.point(node).name()
                );
                self.best = Some(Candidate {
                    relays: self.trail.clone(),
                    distance,
                });
            }
        }

        for next in self.oracle.relays() {
            if self.on_path[next] || !self.oracle.visible(node, next) {
                continue;
            }
            let leg = self.oracle.distance(node, next);

            self.on_path[next] = true;
            self.trail.push(next);
            self.visit(next, length + leg);
            self.trail.pop();
            self.on_path[next] = false;
        }
    }

    fn improves(&self, distance: f64, hops: usize) -> bool {
        match &self.best {
            None => true,
            Some(best) => {
                let slack = tolerance(best.distance);
                distance < best.distance - slack
                    || (distance <= best.distance + slack && hops < best.relays.len())
            }
        }
    }
}

fn tolerance(distance: f64) -> f64 {
    DISTANCE_TOLERANCE * distance.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::graph::FIRST_RELAY;
    use crate::test_support::{linked, relay, Relay};
    use assert_approx_eq::assert_approx_eq;

    fn layered<'a>(
        source: &'a Relay,
        target: &'a Relay,
        relays: &'a [Relay],
    ) -> (VisibilityOracle<'a, Relay>, LayeredGraph) {
        let mut oracle = VisibilityOracle::new(source, target, relays);
        let graph = LayeredGraph::build(&mut oracle);
        (oracle, graph)
    }

    #[test]
    fn summarize_single_node_is_no_route() {
        let source = relay("source", 0, 0);
        let target = relay("target", 5, 0);
        let relays: Vec<Relay> = Vec::new();
        let oracle = VisibilityOracle::new(&source, &target, &relays);

        let result = summarize(&oracle, &[TARGET]);
        assert_eq!(result, RouteResult::no_route());
        assert!(!result.is_found());
    }

    #[test]
    fn summarize_sums_every_leg() {
        let source = relay("source", 0, 0);
        let target = relay("target", 3, 4);
        let relays = vec![relay("relay", 3, 0)];
        let oracle = VisibilityOracle::new(&source, &target, &relays);

        let result = summarize(&oracle, &[SOURCE, FIRST_RELAY, TARGET]);
        assert_eq!(result.hops, 1);
        assert_approx_eq!(result.distance, 7.0);
        assert_eq!(result.path.map(|p| p.len()), Some(3));
    }

    #[test]
    fn greedy_prefers_nearest_predecessor() {
        let source = relay("source", 0, 0);
        let target = relay("target", 4, 0);
        let relays = vec![
            relay("relay1", 1, 10),
            relay("relay2", 1, 0),
            linked("relay3", 2, 10, &[1, 3, 4]),
            relay("relay4", 2, 0),
            relay("relay5", 3, 0),
        ];
        let (oracle, graph) = layered(&source, &target, &relays);

        // relay3 is the only relay of its layer seeing the target; relay1
        // is its nearest predecessor.
        let path = greedy_backtrack(&graph, &oracle);
        assert_eq!(path, vec![SOURCE, FIRST_RELAY, FIRST_RELAY + 2, TARGET]);
    }

    #[test]
    fn dijkstra_finds_shortest_among_fewest_hops() {
        let source = relay("source", 0, 0);
        let target = relay("target", 5, 0);
        let relays = vec![
            linked("relay0", 1, 0, &[0, 2, 3]),
            relay("relay1", 3, 10),
            linked("relay2", 2, 5, &[1, 3, 4]),
            relay("relay3", 4, 5),
            relay("relay4", 2, 0),
            relay("relay5", 3, 0),
            relay("relay6", 4, 0),
        ];
        let (oracle, graph) = layered(&source, &target, &relays);

        let path = fewest_hops_shortest(&graph, &oracle);
        assert_eq!(
            path,
            vec![SOURCE, FIRST_RELAY, FIRST_RELAY + 5, FIRST_RELAY + 6, TARGET]
        );
        assert_approx_eq!(summarize(&oracle, &path).distance, 5.0);
    }

    #[test]
    fn dijkstra_without_route() {
        let source = relay("source", 0, 0);
        let target = relay("target", 2, 0);
        let relays: Vec<Relay> = Vec::new();
        let (oracle, graph) = layered(&source, &target, &relays);

        assert_eq!(fewest_hops_shortest(&graph, &oracle), vec![TARGET]);
    }

    #[test]
    fn summarize_no_route_serializes_null_path() {
        let result = RouteResult::<crate::Location>::no_route();
        let value = serde_json::to_value(result).expect("encodes");
        assert!(value["path"].is_null());
        assert_eq!(value["hops"], 0);
        assert_eq!(value["distance"], 0.0);
    }

    #[test]
    fn equidistant_predecessors_resolve_to_first_listed() {
        let source = relay("source", 0, 0);
        let target = relay("target", 2, 0);
        let relays = vec![relay("upper", 1, 1), relay("lower", 1, -1)];
        let (oracle, graph) = layered(&source, &target, &relays);
        assert_eq!(graph.incoming[TARGET], vec![FIRST_RELAY, FIRST_RELAY + 1]);

        let first = vec![SOURCE, FIRST_RELAY, TARGET];
        assert_eq!(greedy_backtrack(&graph, &oracle), first);
        assert_eq!(fewest_hops_shortest(&graph, &oracle), first);
    }

    #[test]
    fn exhaustive_keeps_earlier_route_on_full_tie() {
        let source = relay("source", 0, 0);
        let target = relay("target", 2, 0);
        let relays = vec![relay("upper", 1, 1), relay("lower", 1, -1)];
        let mut oracle = VisibilityOracle::new(&source, &target, &relays);

        let path = exhaustive_shortest(&mut oracle);
        assert_eq!(path, vec![SOURCE, FIRST_RELAY, TARGET]);
        assert_approx_eq!(summarize(&oracle, &path).distance, 2.0 * 2f64.sqrt());
    }

    #[test]
    fn exhaustive_breaks_distance_ties_on_hops() {
        let source = relay("source", 0, 0);
        let target = relay("target", 5, 0);
        // source-relay0-relay5-relay6-target and
        // source-relay0-relay4-relay5-relay6-target both measure 5.
        let relays = vec![
            linked("relay0", 1, 0, &[0, 2, 3]),
            relay("relay1", 3, 10),
            linked("relay2", 2, 5, &[1, 3, 4]),
            relay("relay3", 4, 5),
            relay("relay4", 2, 0),
            relay("relay5", 3, 0),
            relay("relay6", 4, 0),
        ];
        let mut oracle = VisibilityOracle::new(&source, &target, &relays);

        let path = exhaustive_shortest(&mut oracle);
        assert_eq!(
            path,
            vec![SOURCE, FIRST_RELAY, FIRST_RELAY + 5, FIRST_RELAY + 6, TARGET]
        );
    }

    #[test]
    fn exhaustive_prefers_distance_over_hops() {
        let source = relay("source", 0, 0);
        let target = relay("target", 4, 0);
        let relays = vec![
            relay("relay1", 1, 10),
            relay("relay2", 1, 0),
            linked("relay3", 2, 10, &[1, 3, 4]),
            relay("relay4", 2, 0),
            relay("relay5", 3, 0),
        ];
        let mut oracle = VisibilityOracle::new(&source, &target, &relays);

        let path = exhaustive_shortest(&mut oracle);
        assert_eq!(
            path,
            vec![
                SOURCE,
                FIRST_RELAY + 1,
                FIRST_RELAY + 3,
                FIRST_RELAY + 4,
                TARGET
            ]
        );
    }
}
