use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::ViewError;
use crate::table::{Field, Table};

/// Directed executor → target graph. Nodes are in first-appearance order;
/// each ordered pair appears once in `edges` no matter how often it occurs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActorGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<(usize, usize)>,
}

impl ActorGraph {
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n == name)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        match (self.node_index(from), self.node_index(to)) {
            (Some(a), Some(b)) => self.edges.contains(&(a, b)),
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Build the connections graph from the filtered table.
/// Unavailable when the data has no target-player column.
pub fn build_actor_graph(table: &Table) -> Result<ActorGraph, ViewError> {
    table.require(Field::ExecutingPlayer)?;
    table.require(Field::TargetPlayer)?;

    let mut graph = ActorGraph::default();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut seen_edges: HashSet<(usize, usize)> = HashSet::new();

    let mut intern = |graph: &mut ActorGraph, name: &str| -> usize {
        if let Some(&idx) = index.get(name) {
            return idx;
        }
        graph.nodes.push(name.to_string());
        index.insert(name.to_string(), graph.nodes.len() - 1);
        graph.nodes.len() - 1
    };

    for row in table.rows() {
        let (Some(from), Some(to)) = (row.executing_player.as_deref(), row.target_player.as_deref())
        else {
            continue;
        };
        let a = intern(&mut graph, from);
        let b = intern(&mut graph, to);
        if seen_edges.insert((a, b)) {
            graph.edges.push((a, b));
        }
    }
    Ok(graph)
}

/// Assigns a 2-D position to every node of a graph, aligned with `graph.nodes`.
pub trait GraphLayout {
    fn layout(&self, graph: &ActorGraph) -> Vec<(f64, f64)>;
}

/// Fruchterman–Reingold force-directed layout, seeded so the same graph
/// always lands in the same place. Output is centred and scaled into [-1, 1].
#[derive(Debug, Clone, Copy)]
pub struct SpringLayout {
    /// Optimal distance between nodes.
    pub k: f64,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            k: 0.5,
            iterations: 50,
            seed: 42,
        }
    }
}

impl GraphLayout for SpringLayout {
    fn layout(&self, graph: &ActorGraph) -> Vec<(f64, f64)> {
        let n = graph.nodes.len();
        match n {
            0 => return Vec::new(),
            1 => return vec![(0.0, 0.0)],
            _ => {}
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.r#gen::<f64>(), rng.r#gen::<f64>()))
            .collect();

        // Attraction is undirected.
        let mut adjacent = vec![vec![false; n]; n];
        for &(a, b) in &graph.edges {
            if a != b {
                adjacent[a][b] = true;
                adjacent[b][a] = true;
            }
        }

        let k = if self.k > 0.0 { self.k } else { (1.0 / n as f64).sqrt() };
        let iterations = self.iterations.max(1);
        let mut temperature = 0.1;
        let cooling = temperature / (iterations as f64 + 1.0);

        for _ in 0..iterations {
            let mut displacement = vec![(0.0_f64, 0.0_f64); n];
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].0 - pos[j].0;
                    let dy = pos[i].1 - pos[j].1;
                    let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                    let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                    let force = k * k / (distance * distance) - attraction;
                    displacement[i].0 += dx * force;
                    displacement[i].1 += dy * force;
                }
            }
            for (p, d) in pos.iter_mut().zip(&displacement) {
                let mut length = (d.0 * d.0 + d.1 * d.1).sqrt();
                if length < 0.01 {
                    length = 0.1;
                }
                p.0 += d.0 * temperature / length;
                p.1 += d.1 * temperature / length;
            }
            temperature -= cooling;
        }

        rescale(pos)
    }
}

fn rescale(mut pos: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let n = pos.len() as f64;
    let (cx, cy) = pos
        .iter()
        .fold((0.0, 0.0), |acc, p| (acc.0 + p.0 / n, acc.1 + p.1 / n));
    let mut lim: f64 = 0.0;
    for p in &mut pos {
        p.0 -= cx;
        p.1 -= cy;
        lim = lim.max(p.0.abs()).max(p.1.abs());
    }
    if lim > 0.0 {
        for p in &mut pos {
            p.0 /= lim;
            p.1 /= lim;
        }
    }
    pos
}
