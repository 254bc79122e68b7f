use std::fmt::Write;
use std::str::SplitAsciiWhitespace;

use log::debug;

use crate::error::{InputError, Result};
use crate::graph::{Graph, NodeId};
use crate::search::{Arrival, Search, SearchConfig, Walk};

/// One test case: walk from node 1 to node N.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Case {
    pub graph: Graph,
    pub source: NodeId,
    pub target: NodeId,
}

impl Case {
    pub fn solve(&self, config: SearchConfig) -> (Arrival, Option<Walk>) {
        let mut search = Search::new(&self.graph, config);
        let arrival = search.run(self.source, self.target);
        let walk = search.walk();
        let stats = search.stats();
        debug!(
            "frontier: pushed {}, popped {}, stale {}, pruned {}",
            stats.pushed, stats.popped, stats.stale, stats.pruned
        );
        debug_assert!(walk.as_ref().map_or(!arrival.is_reachable(), |w| w.arrival() == arrival));
        (arrival, walk)
    }
}

struct Tokens<'a> {
    inner: SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_ascii_whitespace(),
        }
    }

    fn number(&mut self, expected: &'static str) -> Result<usize> {
        let token = self
            .inner
            .next()
            .ok_or(InputError::UnexpectedEnd { expected })?;
        token.parse().map_err(|_| InputError::InvalidNumber {
            token: token.to_owned(),
        })
    }
}

/// Reads `T`, then `T` blocks of `N M` followed by `M` edges.
pub fn read_cases(text: &str) -> Result<Vec<Case>> {
    let mut tokens = Tokens::new(text);
    let count = tokens.number("case count")?;
    (1..=count).map(|case| read_case(&mut tokens, case)).collect()
}

fn read_case(tokens: &mut Tokens, case: usize) -> Result<Case> {
    let node_count = tokens.number("node count")?;
    let edge_count = tokens.number("edge count")?;
    if node_count == 0 {
        return Err(InputError::EmptyGraph { case });
    }
    let edges = (0..edge_count)
        .map(|_| {
            let u = tokens.number("edge endpoint")?;
            let v = tokens.number("edge endpoint")?;
            match [u, v].into_iter().find(|node| !(1..=node_count).contains(node)) {
                Some(node) => Err(InputError::NodeOutOfRange {
                    case,
                    node,
                    node_count,
                }),
                None => Ok((u, v)),
            }
        })
        .collect::<Result<Vec<_>>>()?;
    let graph = Graph::from_edges(node_count, edges);
    debug!(
        "case {case}: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(Case {
        graph,
        source: 1,
        target: node_count,
    })
}

/// Solves every case in `text`, one `time wait` line each.
///
/// With `show_walk` every answer line is followed by the walk, or `unreachable`.
pub fn answers(text: &str, config: SearchConfig, show_walk: bool) -> Result<String> {
    let mut out = String::new();
    for (i, case) in read_cases(text)?.iter().enumerate() {
        let (arrival, walk) = case.solve(config);
        if arrival.is_reachable() {
            debug!("case {}: {arrival}", i + 1);
        } else {
            debug!("case {}: unreachable", i + 1);
        }
        // writing into a String cannot fail
        let _ = writeln!(out, "{arrival}");
        if show_walk {
            let _ = match walk {
                Some(walk) => writeln!(out, "{walk}"),
                None => writeln!(out, "unreachable"),
            };
        }
    }
    Ok(out)
}
