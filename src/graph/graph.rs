use log::{debug, trace};

use crate::Locate;

/// Arena index of the route's source.
pub const SOURCE: usize = 0;
/// Arena index of the route's target.
pub const TARGET: usize = 1;
/// Arena index of the first relay; relay `i` lives at `FIRST_RELAY + i`.
pub const FIRST_RELAY: usize = 2;

/// Per-call view over the source, the target and the relays, addressed by
/// index, with memoized pairwise visibility.
///
/// The points are borrowed and never mutated; all search state hangs off
/// indices so the same relay set can back any number of calls.
pub struct VisibilityOracle<'a, P> {
    points: Vec<&'a P>,
    memo: Vec<Option<bool>>,
}

impl<'a, P: Locate> VisibilityOracle<'a, P> {
    pub fn new(source: &'a P, target: &'a P, relays: &'a [P]) -> Self {
        let mut points = Vec::with_capacity(relays.len() + FIRST_RELAY);
        points.push(source);
        points.push(target);
        points.extend(relays.iter());
        let n = points.len();
        VisibilityOracle {
            points,
            memo: vec![None; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, idx: usize) -> &'a P {
        self.points[idx]
    }

    pub fn relays(&self) -> std::ops::Range<usize> {
        FIRST_RELAY..self.points.len()
    }

    /// Visibility between two arena nodes.
    ///
    /// The predicate runs once per unordered pair, always from the lower
    /// index; both orientations then share the stored answer.
    pub fn visible(&mut self, a: usize, b: usize) -> bool {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let key = lo * self.points.len() + hi;
        if let Some(hit) = self.memo[key] {
            return hit;
        }
        let seen = self.points[lo].visible(self.points[hi]);
        self.memo[key] = Some(seen);
        seen
    }

    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.points[a].distance(self.points[b])
    }
}

/// Directed acyclic graph grown outward from the source in hop layers.
///
/// `incoming[n]` lists, in discovery order, the nodes of the previous layer
/// that can see `n`. The source never has incoming edges, and the target
/// has some only when it was reached.
#[derive(Clone, Debug)]
pub struct LayeredGraph {
    pub incoming: Vec<Vec<usize>>,
    /// Number of frontier layers expanded, counting the source's own layer.
    pub layers: usize,
}

impl LayeredGraph {
    /// Expands frontiers from the source until some frontier node sees the
    /// target or no unvisited relay is reachable any more.
    pub fn build<P: Locate>(oracle: &mut VisibilityOracle<'_, P>) -> Self {
        let mut incoming = vec![Vec::new(); oracle.len()];
        let mut frontier = vec![SOURCE];
        let mut outskirts: Vec<usize> = oracle.relays().collect();
        let mut layers = 0;

        loop {
            layers += 1;

            let hits = connect(oracle, &frontier, TARGET);
            if !hits.is_empty() {
                debug!(
                    "target {} reached after {} layer(s) from {} node(s)",
                    oracle.point(TARGET).name(),
                    layers,
                    hits.len()
                );
                incoming[TARGET] = hits;
                break;
            }

            let mut next = Vec::new();
            let mut rest = Vec::with_capacity(outskirts.len());
            for node in outskirts {
                let hits = connect(oracle, &frontier, node);
                if hits.is_empty() {
                    rest.push(node);
                } else {
                    incoming[node] = hits;
                    next.push(node);
                }
            }

            debug!(
                "layer {}: {} relay(s) reached, {} left outside",
                layers,
                next.len(),
                rest.len()
            );

            if next.is_empty() {
                debug!("target {} unreachable", oracle.point(TARGET).name());
                break;
            }

            frontier = next;
            outskirts = rest;
        }

        LayeredGraph { incoming, layers }
    }

    pub fn reached(&self) -> bool {
        !self.incoming[TARGET].is_empty()
    }
}

/// Frontier nodes that can see `node`, in frontier order.
fn connect<P: Locate>(
    oracle: &mut VisibilityOracle<'_, P>,
    frontier: &[usize],
    node: usize,
) -> Vec<usize> {
    let hits: Vec<usize> = frontier
        .iter()
        .copied()
        .filter(|&from| oracle.visible(from, node))
        .collect();
    if !hits.is_empty() {
        trace!(
            "{} < {}",
            oracle.point(node).name(),
            hits.iter()
                .map(|&idx| oracle.point(idx).name())
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    hits
}
