use fraudml_core::{MlError, MlResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::binning::BinnedMatrix;
use crate::params::BoosterParams;

/// Splits whose gain does not exceed this are treated as no improvement.
const MIN_SPLIT_GAIN: f64 = 1e-6;

/// A node in a flat tree. Children are indices into the node array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node: rows with `x[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        gain: f64,
    },
    Leaf { value: f64 },
}

/// Regression tree fitted to gradient statistics, stored as a flat node array
/// with the root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Rebuild a tree from persisted nodes, checking child links.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> MlResult<Self> {
        if nodes.is_empty() {
            return Err(MlError::InvalidOperation("a tree needs at least one node".into()));
        }
        for (i, node) in nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = node {
                if *left <= i || *right <= i || *left >= nodes.len() || *right >= nodes.len() {
                    return Err(MlError::InvalidOperation(format!(
                        "node {i} has invalid children ({left}, {right})"
                    )));
                }
            }
        }
        Ok(RegressionTree { nodes })
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Largest feature index referenced by a split, if any.
    pub fn max_feature(&self) -> Option<usize> {
        self.splits().map(|(f, _)| f).max()
    }

    /// `(feature, gain)` for every split node.
    pub fn splits(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            TreeNode::Split { feature, gain, .. } => Some((*feature, *gain)),
            TreeNode::Leaf { .. } => None,
        })
    }

    /// Leaf value reached by `row`. The row must cover every split feature.
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split { feature, threshold, left, right, .. } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

/// Depth-wise tree builder over a binned matrix and per-row gradients.
pub(crate) struct TreeGrower<'a> {
    pub binned: &'a BinnedMatrix,
    pub grad: &'a [f64],
    pub hess: &'a [f64],
    /// Features this tree may split on, ascending.
    pub features: &'a [usize],
    pub params: &'a BoosterParams,
}

impl<'a> TreeGrower<'a> {
    pub fn grow(&self, mut rows: Vec<usize>) -> RegressionTree {
        let mut nodes = Vec::new();
        self.build_node(&mut rows, 0, &mut nodes);
        RegressionTree { nodes }
    }

    fn build_node(&self, rows: &mut [usize], depth: usize, nodes: &mut Vec<TreeNode>) -> usize {
        let current = nodes.len();
        let (g, h) = rows
            .iter()
            .fold((0.0, 0.0), |(g, h), &i| (g + self.grad[i], h + self.hess[i]));

        let leaf = TreeNode::Leaf {
            value: -g / (h + self.params.reg_lambda) * self.params.learning_rate,
        };
        if depth >= self.params.max_depth || rows.len() < 2 {
            nodes.push(leaf);
            return current;
        }

        let best = match self.find_best_split(rows, g, h) {
            Some(s) if s.gain > self.params.gamma.max(MIN_SPLIT_GAIN) => s,
            _ => {
                nodes.push(leaf);
                return current;
            }
        };

        // Partition in place: bins <= best.bin to the front.
        let column = self.binned.column(best.feature);
        let mut mid = 0;
        for k in 0..rows.len() {
            if usize::from(column[rows[k]]) <= best.bin {
                rows.swap(k, mid);
                mid += 1;
            }
        }

        nodes.push(TreeNode::Split {
            feature: best.feature,
            threshold: self.binned.feature(best.feature).threshold(best.bin),
            left: 0,
            right: 0,
            gain: best.gain,
        });
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left = self.build_node(left_rows, depth + 1, nodes);
        let right = self.build_node(right_rows, depth + 1, nodes);
        if let TreeNode::Split { left: l, right: r, .. } = &mut nodes[current] {
            *l = left;
            *r = right;
        }
        current
    }

    fn find_best_split(&self, rows: &[usize], g_total: f64, h_total: f64) -> Option<SplitCandidate> {
        let lambda = self.params.reg_lambda;
        let parent_score = g_total * g_total / (h_total + lambda);

        let per_feature: Vec<Option<SplitCandidate>> = self
            .features
            .par_iter()
            .map(|&feature| {
                let n_bins = self.binned.feature(feature).n_bins();
                let column = self.binned.column(feature);
                let mut hist = vec![(0.0f64, 0.0f64); n_bins];
                for &i in rows {
                    let slot = &mut hist[usize::from(column[i])];
                    slot.0 += self.grad[i];
                    slot.1 += self.hess[i];
                }

                let mut best: Option<SplitCandidate> = None;
                let (mut gl, mut hl) = (0.0, 0.0);
                for (bin, &(bg, bh)) in hist.iter().enumerate().take(n_bins.saturating_sub(1)) {
                    gl += bg;
                    hl += bh;
                    let (gr, hr) = (g_total - gl, h_total - hl);
                    if hl < self.params.min_child_weight || hr < self.params.min_child_weight {
                        continue;
                    }
                    let gain = 0.5
                        * (gl * gl / (hl + lambda) + gr * gr / (hr + lambda) - parent_score);
                    if best.map_or(true, |b| gain > b.gain) {
                        best = Some(SplitCandidate { feature, bin, gain });
                    }
                }
                best
            })
            .collect();

        // Sequential reduction keeps ties on the earliest feature.
        per_feature
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<SplitCandidate>, c| match acc {
                Some(a) if a.gain >= c.gain => Some(a),
                _ => Some(c),
            })
    }
}
