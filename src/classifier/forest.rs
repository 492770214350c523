//! Random forest classifier
//!
//! CART trees grown on bootstrap resamples with Gini impurity. Each split
//! considers a random subset of features (default floor(sqrt(n_features))).
//! Class probabilities are the mean of the per-tree leaf distributions.
//! Feature importance is mean decrease in impurity, normalized per tree and
//! again across the forest.
//!
//! Trees are fitted in parallel with Rayon. Tree `t` draws from its own RNG
//! seeded with `seed + t`, so the fitted forest is identical regardless of
//! thread scheduling.

use super::synthetic::FeatureRow;
use crate::config::ForestParams;
use crate::types::Feature;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Class probabilities, summing to 1
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
    /// Unnormalized impurity decrease per feature
    importances: FeatureRow,
}

impl DecisionTree {
    fn leaf_distribution(&self, row: &FeatureRow) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split { feature, threshold, left, right } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// Candidate split found while scanning a feature
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// n_left·gini_left + n_right·gini_right
    weighted_impurity: f64,
}

struct TreeBuilder<'a> {
    x: &'a [FeatureRow],
    y: &'a [usize],
    n_classes: usize,
    params: &'a ForestParams,
    max_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
    importances: FeatureRow,
}

impl<'a> TreeBuilder<'a> {
    fn class_counts(&self, indices: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1.0;
        }
        counts
    }

    fn leaf(&mut self, counts: &[f64], n: f64) -> usize {
        let distribution = counts.iter().map(|c| c / n).collect();
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn build(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let counts = self.class_counts(indices);
        let n = indices.len() as f64;
        let impurity = gini(&counts, n);

        let depth_exhausted = self.params.max_depth.is_some_and(|max| depth >= max);
        if indices.len() < self.params.min_samples_split || impurity <= 0.0 || depth_exhausted {
            return self.leaf(&counts, n);
        }

        let Some(split) = self.best_split(indices) else {
            return self.leaf(&counts, n);
        };

        // Partition in place: rows going left first
        let mut boundary = 0;
        for k in 0..indices.len() {
            if self.x[indices[k]][split.feature] <= split.threshold {
                indices.swap(k, boundary);
                boundary += 1;
            }
        }

        self.importances[split.feature] += n * impurity - split.weighted_impurity;

        let node = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution: Vec::new() }); // placeholder

        let (left_rows, right_rows) = indices.split_at_mut(boundary);
        let left = self.build(left_rows, depth + 1);
        let right = self.build(right_rows, depth + 1);

        self.nodes[node] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node
    }

    /// Best split over a random subset of non-constant features
    fn best_split(&mut self, indices: &[usize]) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..Feature::COUNT).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut evaluated = 0;

        for feature in features {
            if evaluated >= self.max_features {
                break;
            }

            let mut column: Vec<(f64, usize)> = indices.iter().map(|&i| (self.x[i][feature], self.y[i])).collect();
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column.first().map(|c| c.0) == column.last().map(|c| c.0) {
                continue; // constant in this node, does not count toward max_features
            }
            evaluated += 1;

            if let Some(candidate) = self.scan_feature(feature, &column) {
                if best.map_or(true, |b| candidate.weighted_impurity < b.weighted_impurity) {
                    best = Some(candidate);
                }
            }
        }

        best
    }

    /// Sweep sorted values, tracking left/right class counts
    fn scan_feature(&self, feature: usize, column: &[(f64, usize)]) -> Option<SplitCandidate> {
        let n = column.len();
        let mut left = vec![0.0; self.n_classes];
        let mut right = vec![0.0; self.n_classes];
        for &(_, label) in column {
            right[label] += 1.0;
        }

        let mut best: Option<SplitCandidate> = None;
        for k in 0..n - 1 {
            let (value, label) = column[k];
            left[label] += 1.0;
            right[label] -= 1.0;

            let next = column[k + 1].0;
            if value >= next {
                continue;
            }

            let n_left = (k + 1) as f64;
            let n_right = (n - k - 1) as f64;
            let weighted = n_left * gini(&left, n_left) + n_right * gini(&right, n_right);

            if best.map_or(true, |b| weighted < b.weighted_impurity) {
                let mut threshold = (value + next) / 2.0;
                if threshold >= next {
                    threshold = value;
                }
                best = Some(SplitCandidate { feature, threshold, weighted_impurity: weighted });
            }
        }

        best
    }
}

fn gini(counts: &[f64], n: f64) -> f64 {
    if n <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / n).powi(2)).sum::<f64>()
}

/// Fitted forest
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fit `params.n_trees` trees on `(x, y)`; labels must be `< n_classes`
    pub fn fit(x: &[FeatureRow], y: &[usize], n_classes: usize, params: &ForestParams, seed: u64) -> Self {
        let max_features = params
            .max_features
            .unwrap_or_else(|| (Feature::COUNT as f64).sqrt().floor() as usize)
            .clamp(1, Feature::COUNT);

        let trees = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let mut bootstrap: Vec<usize> = (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();

                let mut builder = TreeBuilder {
                    x,
                    y,
                    n_classes,
                    params,
                    max_features,
                    rng,
                    nodes: Vec::new(),
                    importances: [0.0; Feature::COUNT],
                };
                if !bootstrap.is_empty() {
                    builder.build(&mut bootstrap, 0);
                }

                DecisionTree {
                    nodes: builder.nodes,
                    importances: builder.importances,
                }
            })
            .collect();

        Self { trees, n_classes }
    }

    /// Mean of the per-tree leaf distributions
    pub fn predict_proba(&self, row: &FeatureRow) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        let mut fitted = 0usize;

        for tree in self.trees.iter().filter(|t| !t.nodes.is_empty()) {
            for (p, q) in proba.iter_mut().zip(tree.leaf_distribution(row)) {
                *p += q;
            }
            fitted += 1;
        }

        if fitted > 0 {
            for p in &mut proba {
                *p /= fitted as f64;
            }
        }
        proba
    }

    /// Most probable class; ties go to the lowest label
    pub fn predict(&self, row: &FeatureRow) -> usize {
        self.predict_proba(row)
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (label, &p)| if p > best.1 { (label, p) } else { best })
            .0
    }

    /// Normalized mean decrease in impurity per feature (sums to 1, or all 0)
    pub fn feature_importances(&self) -> FeatureRow {
        let mut total = [0.0; Feature::COUNT];

        for tree in &self.trees {
            let sum: f64 = tree.importances.iter().sum();
            if sum > 0.0 {
                for (acc, imp) in total.iter_mut().zip(&tree.importances) {
                    *acc += imp / sum;
                }
            }
        }

        let grand: f64 = total.iter().sum();
        if grand > 0.0 {
            for v in &mut total {
                *v /= grand;
            }
        }
        total
    }
}
