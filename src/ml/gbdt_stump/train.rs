use rand::{SeedableRng, rngs::StdRng, seq::index};

use super::model::{GbdtStumpRegressor, MODEL_VERSION, Stump};

/// Upper bound on boosting rounds accepted by [`train_gbdt_stump`].
pub const MAX_ROUNDS: usize = 10_000;

/// Training hyperparameters for stump boosting.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Learning rate applied per round.
    pub learning_rate: f64,
    /// Number of bins used for split search.
    pub bins: usize,
    /// Fraction of rows sampled per round, in `(0, 1]`.
    pub subsample: f64,
    /// Seed for the row sampler.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            rounds: 100,
            learning_rate: 0.1,
            bins: 32,
            subsample: 1.0,
            seed: 42,
        }
    }
}

/// In-memory dataset used for training and evaluation.
#[derive(Debug, Clone, Default)]
pub struct TrainDataset {
    /// Number of values in each feature vector.
    pub feature_len: usize,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f64>>,
    /// Targets aligned with `x`.
    pub y: Vec<f64>,
}

/// Fit a squared-error stump booster.
pub fn train_gbdt_stump(
    dataset: &TrainDataset,
    options: &TrainOptions,
) -> Result<GbdtStumpRegressor, String> {
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched X/Y lengths".to_string());
    }
    if dataset.x.is_empty() {
        return Err("Empty dataset".to_string());
    }
    if dataset.feature_len == 0 || dataset.feature_len > u16::MAX as usize {
        return Err(format!("Unsupported feature length {}", dataset.feature_len));
    }
    if let Some(pos) = dataset.y.iter().position(|v| !v.is_finite()) {
        return Err(format!("Target at row {pos} is not finite"));
    }
    if !options.learning_rate.is_finite() || options.learning_rate <= 0.0 {
        return Err(format!("Invalid learning rate {}", options.learning_rate));
    }
    if options.rounds == 0 || options.rounds > MAX_ROUNDS {
        return Err(format!(
            "Boosting rounds {} outside 1..={MAX_ROUNDS}",
            options.rounds
        ));
    }

    let n = dataset.x.len();
    let bins = options.bins.clamp(2, 256);
    let (mins, maxs) = compute_feature_min_max(&dataset.x, dataset.feature_len);
    let binned = bin_features(&dataset.x, &mins, &maxs, bins);
    let init_value = dataset.y.iter().sum::<f64>() / n as f64;
    let mut predictions = vec![init_value; n];

    let sample_size = sample_size(n, options.subsample);
    let mut rng = StdRng::seed_from_u64(options.seed);
    let all_rows: Vec<usize> = (0..n).collect();

    let mut stumps = Vec::new();
    for _round in 0..options.rounds {
        let residuals: Vec<f64> = dataset
            .y
            .iter()
            .zip(&predictions)
            .map(|(y, p)| y - p)
            .collect();
        let sampled;
        let rows: &[usize] = if sample_size < n {
            sampled = index::sample(&mut rng, n, sample_size).into_vec();
            &sampled
        } else {
            &all_rows
        };
        let stump = fit_best_stump(&binned, &dataset.x, &mins, &maxs, bins, &residuals, rows);
        for (pred, row) in predictions.iter_mut().zip(&dataset.x) {
            *pred += options.learning_rate * stump.predict(row);
        }
        stumps.push(stump);
    }

    Ok(GbdtStumpRegressor {
        model_version: MODEL_VERSION,
        feature_len: dataset.feature_len,
        learning_rate: options.learning_rate,
        init_value,
        stumps,
    })
}

fn sample_size(n: usize, subsample: f64) -> usize {
    if !subsample.is_finite() || subsample >= 1.0 {
        return n;
    }
    ((n as f64 * subsample.max(0.0)).round() as usize).clamp(1, n)
}

fn compute_feature_min_max(x: &[Vec<f64>], feature_len: usize) -> (Vec<f64>, Vec<f64>) {
    let mut mins = vec![f64::INFINITY; feature_len];
    let mut maxs = vec![f64::NEG_INFINITY; feature_len];
    for row in x {
        for (j, &v) in row.iter().take(feature_len).enumerate() {
            if v.is_finite() {
                mins[j] = mins[j].min(v);
                maxs[j] = maxs[j].max(v);
            }
        }
    }
    for j in 0..feature_len {
        if !mins[j].is_finite() || !maxs[j].is_finite() {
            mins[j] = 0.0;
            maxs[j] = 0.0;
        }
        if mins[j] == maxs[j] {
            maxs[j] = mins[j] + 1.0;
        }
    }
    (mins, maxs)
}

fn bin_features(x: &[Vec<f64>], mins: &[f64], maxs: &[f64], bins: usize) -> Vec<Vec<u8>> {
    let top = (bins - 1) as f64;
    x.iter()
        .map(|row| {
            mins.iter()
                .zip(maxs)
                .enumerate()
                .map(|(j, (&min, &max))| {
                    let v = row.get(j).copied().unwrap_or(0.0);
                    let t = if v.is_finite() {
                        ((v - min) / (max - min)).clamp(0.0, 1.0)
                    } else {
                        1.0
                    };
                    (t * top).round() as u8
                })
                .collect()
        })
        .collect()
}

#[derive(Debug, Clone)]
struct BestSplit {
    score: f64,
    parent_sse: f64,
    feature_index: usize,
    split_bin: usize,
}

impl Default for BestSplit {
    fn default() -> Self {
        Self {
            score: f64::INFINITY,
            parent_sse: 0.0,
            feature_index: 0,
            split_bin: 0,
        }
    }
}

fn fit_best_stump(
    binned: &[Vec<u8>],
    x: &[Vec<f64>],
    mins: &[f64],
    maxs: &[f64],
    bins: usize,
    residuals: &[f64],
    rows: &[usize],
) -> Stump {
    let mut best = BestSplit::default();
    for feature_idx in 0..mins.len() {
        let split = best_split_for_feature(binned, residuals, rows, feature_idx, bins);
        if split.score < best.score {
            best = split;
        }
    }

    if !best.score.is_finite() {
        // Every feature is constant over the sampled rows: fall back to a mean shift.
        let mean = rows.iter().map(|&i| residuals[i]).sum::<f64>() / rows.len().max(1) as f64;
        return Stump {
            feature_index: 0,
            threshold: mins[0],
            left_value: mean,
            right_value: mean,
            gain: 0.0,
        };
    }

    let feature_idx = best.feature_index;
    let threshold = threshold_for_bin(mins[feature_idx], maxs[feature_idx], best.split_bin, bins);
    let (left_value, right_value) = leaf_means(x, residuals, rows, feature_idx, threshold);
    Stump {
        feature_index: feature_idx as u16,
        threshold,
        left_value,
        right_value,
        gain: (best.parent_sse - best.score).max(0.0),
    }
}

fn best_split_for_feature(
    binned: &[Vec<u8>],
    residuals: &[f64],
    rows: &[usize],
    feature_idx: usize,
    bins: usize,
) -> BestSplit {
    let mut counts = vec![0u32; bins];
    let mut sums = vec![0f64; bins];
    let mut sums_sq = vec![0f64; bins];
    for &i in rows {
        let b = binned[i].get(feature_idx).copied().unwrap_or(0) as usize;
        let r = residuals[i];
        counts[b] += 1;
        sums[b] += r;
        sums_sq[b] += r * r;
    }
    let total_count: u32 = counts.iter().sum();
    if total_count == 0 {
        return BestSplit::default();
    }
    let total_sum: f64 = sums.iter().sum();
    let total_sum_sq: f64 = sums_sq.iter().sum();
    let parent_sse = total_sum_sq - (total_sum * total_sum) / total_count as f64;

    let mut best = BestSplit {
        parent_sse,
        feature_index: feature_idx,
        ..BestSplit::default()
    };
    let mut left_count = 0u32;
    let mut left_sum = 0f64;
    let mut left_sum_sq = 0f64;
    for split_bin in 0..(bins - 1) {
        left_count += counts[split_bin];
        left_sum += sums[split_bin];
        left_sum_sq += sums_sq[split_bin];
        let right_count = total_count - left_count;
        if left_count == 0 || right_count == 0 {
            continue;
        }
        let right_sum = total_sum - left_sum;
        let right_sum_sq = total_sum_sq - left_sum_sq;
        let left_sse = left_sum_sq - (left_sum * left_sum) / left_count as f64;
        let right_sse = right_sum_sq - (right_sum * right_sum) / right_count as f64;
        let score = left_sse + right_sse;
        if score < best.score {
            best.score = score;
            best.split_bin = split_bin;
        }
    }
    best
}

/// Midpoint between the centers of `split_bin` and the next bin.
fn threshold_for_bin(min: f64, max: f64, split_bin: usize, bins: usize) -> f64 {
    let t = (split_bin as f64 + 0.5) / (bins - 1) as f64;
    min + t * (max - min)
}

fn leaf_means(
    x: &[Vec<f64>],
    residuals: &[f64],
    rows: &[usize],
    feature_idx: usize,
    threshold: f64,
) -> (f64, f64) {
    let (mut left_sum, mut left_count) = (0.0f64, 0u32);
    let (mut right_sum, mut right_count) = (0.0f64, 0u32);
    for &i in rows {
        let v = x[i].get(feature_idx).copied().unwrap_or(0.0);
        if v <= threshold {
            left_sum += residuals[i];
            left_count += 1;
        } else {
            right_sum += residuals[i];
            right_count += 1;
        }
    }
    let mean = |sum: f64, count: u32| if count == 0 { 0.0 } else { sum / count as f64 };
    (mean(left_sum, left_count), mean(right_sum, right_count))
}
