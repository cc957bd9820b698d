//! Longest-path ranking over a feedback-arc-reduced view of the graph.

use std::collections::VecDeque;

/// Adjacency over node indices with self-loops, parallel edges and
/// back-edges already removed, so it is always acyclic.
pub(super) struct RankedGraph {
	pub succ: Vec<Vec<usize>>,
	pub ranks: Vec<usize>,
	/// Edges ignored for ranking (self-loops and back-edges).
	pub suppressed: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
	New,
	Active,
	Done,
}

impl RankedGraph {
	/// `arcs` are `(source, target)` index pairs in edge order.
	pub fn build(n: usize, arcs: &[(usize, usize)]) -> Self {
		let mut succ = vec![Vec::new(); n];
		let mut suppressed = 0;
		for &(u, v) in arcs {
			if u == v {
				suppressed += 1;
				continue;
			}
			succ[u].push(v);
		}
		for list in &mut succ {
			list.sort_unstable();
			list.dedup();
		}

		let has_pred = {
			let mut flags = vec![false; n];
			for &v in succ.iter().flatten() {
				flags[v] = true;
			}
			flags
		};
		for (u, v) in feedback_arcs(&succ, &has_pred) {
			succ[u].retain(|&w| w != v);
			suppressed += 1;
		}

		let mut pred = vec![Vec::new(); n];
		for (u, list) in succ.iter().enumerate() {
			for &v in list {
				pred[v].push(u);
			}
		}

		let ranks = longest_path(&succ, &pred);
		Self {
			succ,
			ranks,
			suppressed,
		}
	}

	pub fn rank_count(&self) -> usize {
		self.ranks.iter().max().map_or(0, |r| r + 1)
	}
}

/// Depth-first search from the sources (then from any node still
/// unvisited, in input order); every edge closing onto the active path is
/// a back-edge. Removing them leaves a DAG.
fn feedback_arcs(succ: &[Vec<usize>], has_pred: &[bool]) -> Vec<(usize, usize)> {
	let n = succ.len();
	let mut state = vec![Visit::New; n];
	let mut back = Vec::new();
	let roots = (0..n).filter(|&v| !has_pred[v]).chain(0..n);

	for root in roots {
		if state[root] != Visit::New {
			continue;
		}
		state[root] = Visit::Active;
		let mut stack = vec![(root, 0usize)];
		while let Some(top) = stack.last_mut() {
			let (v, next) = *top;
			match succ[v].get(next) {
				Some(&w) => {
					top.1 += 1;
					match state[w] {
						Visit::New => {
							state[w] = Visit::Active;
							stack.push((w, 0));
						}
						Visit::Active => back.push((v, w)),
						Visit::Done => {}
					}
				}
				None => {
					state[v] = Visit::Done;
					stack.pop();
				}
			}
		}
	}
	back
}

/// rank(v) = 0 for sources, else 1 + max rank of its predecessors.
fn longest_path(succ: &[Vec<usize>], pred: &[Vec<usize>]) -> Vec<usize> {
	let n = succ.len();
	let mut ranks = vec![0usize; n];
	let mut in_degree: Vec<usize> = pred.iter().map(Vec::len).collect();
	let mut queue: VecDeque<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();

	while let Some(u) = queue.pop_front() {
		for &v in &succ[u] {
			ranks[v] = ranks[v].max(ranks[u] + 1);
			in_degree[v] -= 1;
			if in_degree[v] == 0 {
				queue.push_back(v);
			}
		}
	}
	ranks
}
