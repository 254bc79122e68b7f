use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::iter;

use log::trace;

use crate::graph::{Graph, NodeId};

/// Offset window the search uses unless told otherwise.
pub const DEFAULT_WINDOW: usize = 600;

/// Tuning knobs for [`Search`].
///
/// `window` is the bounded lag: for every node only arrivals that happen
/// less than `window` ticks after the fastest known arrival at that node
/// are tracked, everything later is pruned. This is a heuristic. A walk
/// which has to pass some node `window` or more ticks after its fastest
/// arrival is never found, so sparse or adversarial graphs may need a
/// larger window. The table stays bounded at `window` slots per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub window: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl SearchConfig {
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }
}

/// Arrival at the target, ordered by time and then by wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Arrival {
    pub time: u64,
    pub wait: u64,
}

impl Arrival {
    pub const UNREACHABLE: Arrival = Arrival {
        time: u64::MAX,
        wait: u64::MAX,
    };

    pub fn is_reachable(&self) -> bool {
        *self != Self::UNREACHABLE
    }
}

impl fmt::Display for Arrival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.wait)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    pub node: NodeId,
    pub time: u64,
    pub wait: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Wait,
    Move(NodeId),
}

/// The actions that realise an [`Arrival`], starting from `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    pub start: NodeId,
    pub actions: Vec<Action>,
}

impl Walk {
    /// Node occupied at every tick, `actions.len() + 1` items.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        iter::once(self.start).chain(self.actions.iter().scan(self.start, |at, action| {
            if let Action::Move(to) = action {
                *at = *to;
            }
            Some(*at)
        }))
    }

    pub fn arrival(&self) -> Arrival {
        Arrival {
            time: self.actions.len() as u64,
            wait: self
                .actions
                .iter()
                .filter(|&&a| a == Action::Wait)
                .count() as u64,
        }
    }
}

impl fmt::Display for Walk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub pushed: usize,
    pub popped: usize,
    pub stale: usize,
    pub pruned: usize,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    base: u64,
    wait: u64,
}

impl Slot {
    const EMPTY: Slot = Slot {
        base: u64::MAX,
        wait: u64::MAX,
    };
}

/// Best waits of one node, indexed by offset above `min_time`.
///
/// Each slot remembers the `min_time` it was written under, so lowering
/// `min_time` invalidates every other slot without touching them.
#[derive(Debug, Clone)]
struct Lag {
    min_time: u64,
    slots: Vec<Slot>,
}

impl Lag {
    fn new(time: u64, wait: u64, window: usize) -> Self {
        let mut slots = vec![Slot::EMPTY; window];
        slots[0] = Slot { base: time, wait };
        Self {
            min_time: time,
            slots,
        }
    }

    fn offset(&self, time: u64) -> Option<usize> {
        time.checked_sub(self.min_time)
            .and_then(|d| usize::try_from(d).ok())
            .filter(|&d| d < self.slots.len())
    }

    fn best_wait(&self, offset: usize) -> u64 {
        match self.slots.get(offset) {
            Some(slot) if slot.base == self.min_time => slot.wait,
            _ => u64::MAX,
        }
    }

    fn admit(&mut self, time: u64, wait: u64) -> bool {
        if time < self.min_time {
            self.min_time = time;
            self.slots[0] = Slot { base: time, wait };
            return true;
        }
        match self.offset(time) {
            Some(offset) if wait < self.best_wait(offset) => {
                self.slots[offset] = Slot {
                    base: self.min_time,
                    wait,
                };
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    time: u64,
    wait: u64,
    node: NodeId,
    step: usize,
}

impl Entry {
    fn state(&self) -> State {
        State {
            node: self.node,
            time: self.time,
            wait: self.wait,
        }
    }
}

// BinaryHeap is a max-heap, smallest (time, wait) has to compare greatest
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.time, self.wait, self.node, self.step)
            .cmp(&(other.time, other.wait, other.node, other.step))
            .reverse()
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
struct Step {
    node: NodeId,
    parent: Option<usize>,
    action: Option<Action>,
}

/// Lexicographic (time, wait) search over one graph.
///
/// A `Search` can be reused, every [`Search::run`] starts from scratch.
pub struct Search<'g> {
    graph: &'g Graph,
    config: SearchConfig,
    table: Vec<Option<Lag>>,
    frontier: BinaryHeap<Entry>,
    steps: Vec<Step>,
    best_step: Option<usize>,
    stats: Stats,
}

impl<'g> Search<'g> {
    pub fn new(graph: &'g Graph, config: SearchConfig) -> Self {
        Self {
            graph,
            config: SearchConfig::with_window(config.window),
            table: Vec::new(),
            frontier: BinaryHeap::new(),
            steps: Vec::new(),
            best_step: None,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Clears previous results and seeds the frontier with `(source, 0, 0)`.
    pub fn initialize(&mut self, source: NodeId) {
        self.table.clear();
        self.table.resize(self.graph.node_count() + 1, None);
        self.frontier.clear();
        self.steps.clear();
        self.best_step = None;
        self.stats = Stats::default();
        if self.graph.contains(source) {
            self.table[source] = Some(Lag::new(0, 0, self.config.window));
            self.push(
                State {
                    node: source,
                    time: 0,
                    wait: 0,
                },
                None,
                None,
            );
        }
    }

    /// Successors of `state`: waiting in place, then the selected edge if any.
    pub fn expand(&self, state: State) -> [Option<(State, Action)>; 2] {
        let wait = State {
            time: state.time + 1,
            wait: state.wait + 1,
            ..state
        };
        let step = self.graph.select(state.node, state.time).map(|to| {
            (
                State {
                    node: to,
                    time: state.time + 1,
                    wait: state.wait,
                },
                Action::Move(to),
            )
        });
        [Some((wait, Action::Wait)), step]
    }

    /// Enqueues `state` if it beats the recorded wait for its offset slot.
    pub fn accept(&mut self, state: State, action: Action, parent: usize) -> bool {
        let window = self.config.window;
        let record = &mut self.table[state.node];
        let admitted = if let Some(lag) = record.as_mut() {
            lag.admit(state.time, state.wait)
        } else {
            *record = Some(Lag::new(state.time, state.wait, window));
            true
        };
        if admitted {
            self.push(state, Some(parent), Some(action));
        } else {
            self.stats.pruned += 1;
        }
        admitted
    }

    pub fn run(&mut self, source: NodeId, target: NodeId) -> Arrival {
        self.initialize(source);
        let mut best = Arrival::UNREACHABLE;
        while let Some(entry) = self.frontier.pop() {
            self.stats.popped += 1;
            if !self.is_current(&entry) {
                self.stats.stale += 1;
                continue;
            }
            // pops come in time order, nothing later can beat `best`
            if entry.time > best.time {
                break;
            }
            if entry.node == target {
                let found = Arrival {
                    time: entry.time,
                    wait: entry.wait,
                };
                if found < best {
                    trace!("target {target} reached at {found}");
                    best = found;
                    self.best_step = Some(entry.step);
                }
            }
            for (next, action) in self.expand(entry.state()).into_iter().flatten() {
                self.accept(next, action, entry.step);
            }
        }
        trace!("search {source}->{target} finished with {best}");
        best
    }

    /// Walk behind the last [`Search::run`] answer.
    pub fn walk(&self) -> Option<Walk> {
        let mut actions = Vec::new();
        let mut cursor = self.best_step?;
        while let Step {
            parent: Some(parent),
            action: Some(action),
            ..
        } = self.steps[cursor]
        {
            actions.push(action);
            cursor = parent;
        }
        actions.reverse();
        Some(Walk {
            start: self.steps[cursor].node,
            actions,
        })
    }

    fn is_current(&self, entry: &Entry) -> bool {
        self.table[entry.node]
            .as_ref()
            .and_then(|lag| {
                lag.offset(entry.time)
                    .map(|offset| entry.wait <= lag.best_wait(offset))
            })
            .unwrap_or(false)
    }

    fn push(&mut self, state: State, parent: Option<usize>, action: Option<Action>) {
        let step = self.steps.len();
        self.steps.push(Step {
            node: state.node,
            parent,
            action,
        });
        self.frontier.push(Entry {
            time: state.time,
            wait: state.wait,
            node: state.node,
            step,
        });
        self.stats.pushed += 1;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn shortest_arrival(
        graph: &Graph,
        source: NodeId,
        target: NodeId,
        config: SearchConfig,
    ) -> Arrival {
        Search::new(graph, config).run(source, target)
    }

    fn solve(graph: &Graph) -> Arrival {
        shortest_arrival(graph, 1, graph.node_count(), SearchConfig::default())
    }

    fn arrival(time: u64, wait: u64) -> Arrival {
        Arrival { time, wait }
    }

    /// Exact answer by sweeping the time-expanded graph layer by layer.
    fn sweep(graph: &Graph, source: NodeId, target: NodeId, horizon: u64) -> Option<Arrival> {
        let n = graph.node_count();
        let mut layer = vec![u64::MAX; n + 1];
        layer[source] = 0;
        for time in 0..=horizon {
            if layer[target] != u64::MAX {
                return Some(arrival(time, layer[target]));
            }
            let mut next = vec![u64::MAX; n + 1];
            for u in 1..=n {
                if layer[u] == u64::MAX {
                    continue;
                }
                next[u] = next[u].min(layer[u] + 1);
                if let Some(v) = graph.select(u, time) {
                    next[v] = next[v].min(layer[u]);
                }
            }
            layer = next;
        }
        None
    }

    #[test]
    fn single_edge() {
        let g = Graph::from_edges(2, [(1, 2)]);
        assert_eq!(solve(&g), arrival(1, 0));
    }

    #[test]
    fn no_edges_is_unreachable() {
        let g = Graph::new(2);
        let answer = solve(&g);
        assert_eq!(answer, Arrival::UNREACHABLE);
        assert!(!answer.is_reachable());
        assert_eq!(
            answer.to_string(),
            "18446744073709551615 18446744073709551615"
        );
    }

    #[test]
    fn source_is_target() {
        let g = Graph::from_edges(3, [(1, 2), (2, 3)]);
        let answer = shortest_arrival(&g, 2, 2, SearchConfig::default());
        assert_eq!(answer, arrival(0, 0));
        assert_eq!(solve(&Graph::new(1)), arrival(0, 0));
    }

    #[test]
    fn triangle_follows_edge_order() {
        let g = Graph::from_edges(3, [(1, 2), (2, 3), (1, 3)]);
        let mut search = Search::new(&g, SearchConfig::default());
        assert_eq!(search.run(1, 3), arrival(2, 0));
        let walk = search.walk().unwrap();
        assert_eq!(walk.to_string(), "1-2-3");
        assert_eq!(walk.actions, vec![Action::Move(2), Action::Move(3)]);
    }

    #[test]
    fn waits_for_the_right_edge() {
        // node 1 picks 2 at even ticks and 3 at odd ticks
        let g = Graph::from_edges(3, [(1, 2), (1, 3)]);
        let mut search = Search::new(&g, SearchConfig::default());
        assert_eq!(search.run(1, 3), arrival(2, 1));
        let walk = search.walk().unwrap();
        assert_eq!(walk.actions, vec![Action::Wait, Action::Move(3)]);
        assert_eq!(walk.to_string(), "1-1-3");
        assert_eq!(walk.arrival(), arrival(2, 1));
    }

    #[test]
    fn narrow_window_loses_late_walks() {
        let g = Graph::from_edges(3, [(1, 2), (1, 3)]);
        let narrow = shortest_arrival(&g, 1, 3, SearchConfig::with_window(1));
        assert_eq!(narrow, Arrival::UNREACHABLE);
        let zero = SearchConfig::with_window(0);
        assert_eq!(zero.window, 1);
    }

    #[test]
    fn out_of_range_source_is_unreachable() {
        let g = Graph::from_edges(2, [(1, 2)]);
        assert_eq!(
            shortest_arrival(&g, 7, 2, SearchConfig::default()),
            Arrival::UNREACHABLE
        );
        assert_eq!(
            shortest_arrival(&g, 1, 7, SearchConfig::default()),
            Arrival::UNREACHABLE
        );
    }

    #[test]
    fn search_is_reusable() {
        let g = Graph::from_edges(4, [(1, 2), (2, 3), (3, 4), (1, 4)]);
        let mut search = Search::new(&g, SearchConfig::default());
        let first = search.run(1, 4);
        let stats = search.stats();
        assert_eq!(search.run(1, 4), first);
        assert_eq!(search.stats(), stats);
        assert!(stats.pushed >= stats.popped);
    }

    #[test]
    fn expand_yields_wait_then_move() {
        let g = Graph::from_edges(2, [(1, 2)]);
        let search = Search::new(&g, SearchConfig::default());
        let state = State {
            node: 1,
            time: 4,
            wait: 2,
        };
        let [wait, step] = search.expand(state);
        assert_eq!(
            wait,
            Some((
                State {
                    node: 1,
                    time: 5,
                    wait: 3
                },
                Action::Wait
            ))
        );
        assert_eq!(
            step,
            Some((
                State {
                    node: 2,
                    time: 5,
                    wait: 2
                },
                Action::Move(2)
            ))
        );
        let lonely = Graph::new(1);
        let [_, step] = Search::new(&lonely, SearchConfig::default()).expand(State {
            node: 1,
            time: 0,
            wait: 0,
        });
        assert_eq!(step, None);
    }

    #[test]
    fn accept_prunes_worse_waits() {
        let g = Graph::from_edges(2, [(1, 2)]);
        let mut search = Search::new(&g, SearchConfig::with_window(4));
        search.initialize(1);
        let at = |time, wait| State {
            node: 2,
            time,
            wait,
        };
        assert!(search.accept(at(3, 1), Action::Move(2), 0));
        assert!(!search.accept(at(3, 1), Action::Move(2), 0));
        assert!(search.accept(at(4, 2), Action::Wait, 0));
        assert!(!search.accept(at(4, 3), Action::Wait, 0));
        assert!(search.accept(at(4, 0), Action::Move(2), 0));
        // offset 4 is outside a window of 4
        assert!(!search.accept(at(7, 0), Action::Move(2), 0));
        // an earlier arrival moves the base, old offsets no longer count
        assert!(search.accept(at(2, 2), Action::Move(2), 0));
        assert!(search.accept(at(3, 2), Action::Wait, 0));
        assert_eq!(search.stats().pruned, 3);
    }

    fn small_graph() -> impl Strategy<Value = Graph> {
        (1usize..=5).prop_flat_map(|n| {
            prop::collection::vec((1..=n, 1..=n), 0..=7)
                .prop_map(move |edges| Graph::from_edges(n, edges))
        })
    }

    proptest! {
        #[test]
        fn matches_exhaustive_sweep(g in small_graph()) {
            let horizon = 40;
            let n = g.node_count();
            let answer = shortest_arrival(&g, 1, n, SearchConfig::with_window(horizon as usize + 1));
            match sweep(&g, 1, n, horizon) {
                Some(expected) => prop_assert_eq!(answer, expected),
                None => prop_assert!(answer.time > horizon),
            }
        }

        #[test]
        fn walk_replays_answer(g in small_graph()) {
            let n = g.node_count();
            let mut search = Search::new(&g, SearchConfig::default());
            let answer = search.run(1, n);
            prop_assert!(answer.wait <= answer.time);
            match search.walk() {
                None => prop_assert!(!answer.is_reachable()),
                Some(walk) => {
                    prop_assert_eq!(walk.arrival(), answer);
                    prop_assert_eq!(walk.start, 1);
                    prop_assert_eq!(walk.nodes().last(), Some(n));
                    let nodes: Vec<_> = walk.nodes().collect();
                    for (t, action) in walk.actions.iter().enumerate() {
                        if let Action::Move(to) = action {
                            prop_assert_eq!(g.select(nodes[t], t as u64), Some(*to));
                        }
                    }
                }
            }
        }

        #[test]
        fn deterministic(g in small_graph()) {
            let n = g.node_count();
            let first = solve(&g);
            prop_assert_eq!(solve(&g), first);
            prop_assert_eq!(shortest_arrival(&g, n, n, SearchConfig::default()), arrival(0, 0));
        }

        #[test]
        fn waiting_never_helps_a_move(g in small_graph(), time in 0u64..50, wait in 0u64..50) {
            let search = Search::new(&g, SearchConfig::default());
            let now = State { node: 1, time: time + wait, wait };
            let [waited, moved] = search.expand(now);
            let (waited, _) = waited.unwrap();
            let [_, later] = search.expand(waited);
            if let (Some((moved, _)), Some((later, _))) = (moved, later) {
                prop_assert!(later.time >= moved.time);
                prop_assert!(later.wait >= moved.wait);
            }
        }
    }
}
