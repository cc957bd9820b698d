//! Crossing reduction: order nodes within each rank by iterated barycenter
//! sweeps. Edges spanning several ranks are split into chains of virtual
//! vertices first so every edge connects adjacent layers.

use super::rank::RankedGraph;

/// Upper bound on down+up sweep pairs.
pub const MAX_ORDER_PASSES: usize = 8;

/// Layered graph including virtual vertices. Indices `0..real` are the
/// input nodes, the rest are virtual.
pub(super) struct Layering {
	pub real: usize,
	pub layers: Vec<Vec<usize>>,
	down: Vec<Vec<usize>>,
	up: Vec<Vec<usize>>,
	pos: Vec<usize>,
}

/// How the sweeps went.
pub(super) struct OrderOutcome {
	pub passes: usize,
	pub crossings: usize,
}

impl Layering {
	pub fn new(graph: &RankedGraph) -> Self {
		let real = graph.ranks.len();
		let mut layers = vec![Vec::new(); graph.rank_count()];
		let mut down = vec![Vec::new(); real];
		let mut up = vec![Vec::new(); real];

		for (v, &r) in graph.ranks.iter().enumerate() {
			layers[r].push(v);
		}

		for (u, targets) in graph.succ.iter().enumerate() {
			for &v in targets {
				let (ru, rv) = (graph.ranks[u], graph.ranks[v]);
				let mut prev = u;
				for r in (ru + 1)..rv {
					let dummy = down.len();
					down.push(Vec::new());
					up.push(Vec::new());
					layers[r].push(dummy);
					down[prev].push(dummy);
					up[dummy].push(prev);
					prev = dummy;
				}
				down[prev].push(v);
				up[v].push(prev);
			}
		}

		let mut pos = vec![0; down.len()];
		for layer in &layers {
			for (i, &v) in layer.iter().enumerate() {
				pos[v] = i;
			}
		}

		Self {
			real,
			layers,
			down,
			up,
			pos,
		}
	}

	/// Alternate down and up sweeps, keeping the best ordering seen.
	/// Stops at the first pass that does not improve the crossing count.
	pub fn minimize_crossings(&mut self) -> OrderOutcome {
		let mut best = self.crossings();
		let mut best_layers = self.layers.clone();
		let mut passes = 0;

		while passes < MAX_ORDER_PASSES && best > 0 {
			passes += 1;
			for r in 1..self.layers.len() {
				self.reorder(r, Sweep::Down);
			}
			for r in (0..self.layers.len().saturating_sub(1)).rev() {
				self.reorder(r, Sweep::Up);
			}

			let crossings = self.crossings();
			if crossings < best {
				best = crossings;
				best_layers = self.layers.clone();
			} else {
				break;
			}
		}

		self.layers = best_layers;
		self.sync_positions();
		OrderOutcome {
			passes,
			crossings: best,
		}
	}

	/// Layers with virtual vertices stripped, in final order.
	pub fn real_layers(&self) -> Vec<Vec<usize>> {
		self.layers
			.iter()
			.map(|layer| layer.iter().copied().filter(|&v| v < self.real).collect())
			.collect()
	}

	/// Sort layer `r` by the mean position of its neighbours in the fixed
	/// adjacent layer. Vertices without such neighbours keep their slot;
	/// ties keep the current relative order.
	fn reorder(&mut self, r: usize, sweep: Sweep) {
		let neighbours = match sweep {
			Sweep::Down => &self.up,
			Sweep::Up => &self.down,
		};
		let mut keyed: Vec<(f64, usize, usize)> = self.layers[r]
			.iter()
			.map(|&v| {
				let adj = &neighbours[v];
				let key = if adj.is_empty() {
					self.pos[v] as f64
				} else {
					adj.iter().map(|&w| self.pos[w] as f64).sum::<f64>() / adj.len() as f64
				};
				(key, self.pos[v], v)
			})
			.collect();
		keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

		self.layers[r] = keyed.into_iter().map(|(_, _, v)| v).collect();
		for (i, &v) in self.layers[r].iter().enumerate() {
			self.pos[v] = i;
		}
	}

	fn sync_positions(&mut self) {
		for layer in &self.layers {
			for (i, &v) in layer.iter().enumerate() {
				self.pos[v] = i;
			}
		}
	}

	fn crossings(&self) -> usize {
		self.layers
			.windows(2)
			.map(|pair| self.bilayer_crossings(&pair[0], pair[1].len()))
			.sum()
	}

	/// Inversions among edge endpoints in the lower layer, taken in upper
	/// layer order, counted with a Fenwick tree.
	fn bilayer_crossings(&self, upper: &[usize], lower_len: usize) -> usize {
		let mut targets = Vec::new();
		for &u in upper {
			let start = targets.len();
			targets.extend(self.down[u].iter().map(|&v| self.pos[v]));
			targets[start..].sort_unstable();
		}

		let mut tree = vec![0usize; lower_len + 1];
		let mut crossings = 0;
		for (seen, &t) in targets.iter().enumerate() {
			let mut at_most = 0;
			let mut i = t + 1;
			while i > 0 {
				at_most += tree[i];
				i &= i - 1;
			}
			crossings += seen - at_most;

			let mut i = t + 1;
			while i <= lower_len {
				tree[i] += 1;
				i += i & i.wrapping_neg();
			}
		}
		crossings
	}
}

#[derive(Clone, Copy)]
enum Sweep {
	Down,
	Up,
}
