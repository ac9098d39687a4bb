//! Binary reward scoring: extraction + normalization + comparison.
//!
//! This is the entry point the training loop calls once per generated
//! solution. It is a total, pure function: every input yields exactly 0.0
//! or 1.0, with no side effects and no shared state, so the caller may
//! score an arbitrary number of pairs concurrently with no coordination.

use serde_json::Value;

use crate::config::RewardConfig;

use super::extract::extract_final_answer;
use super::normalize::normalize_answer;

/// Absolute tolerance for the numeric-equality fallback.
///
/// This is a safety net for formatting-equivalent numerals ("8" vs "8.0")
/// whose normalized string forms could theoretically differ; in practice
/// the normalizer already strips most such differences.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Scores model solutions against ground-truth answers.
///
/// Stateless apart from the configured tolerance; safe to share across
/// threads and to call repeatedly with identical results.
#[derive(Debug, Clone)]
pub struct RewardScorer {
    config: RewardConfig,
}

impl Default for RewardScorer {
    fn default() -> Self {
        Self::new(RewardConfig::default())
    }
}

impl RewardScorer {
    /// Create a scorer with the given reward configuration.
    pub fn new(config: RewardConfig) -> Self {
        Self { config }
    }

    /// Compute the reward for one solution / ground-truth pair.
    ///
    /// `data_source` and `extra_info` are part of the call contract but
    /// currently inert: `data_source` is reserved for future per-dataset
    /// branching and `extra_info` for auxiliary metadata. They must be
    /// accepted and ignored, not repurposed.
    ///
    /// # Algorithm
    ///
    /// 1. Extract the model's declared final answer; no answer -> 0.0.
    /// 2. Normalize the extracted answer and the ground truth independently.
    /// 3. Exact string equality -> 1.0.
    /// 4. Otherwise parse both as `f64`; if both parse and the absolute
    ///    difference is below the tolerance -> 1.0.
    /// 5. Anything else -> 0.0.
    pub fn score(
        &self,
        data_source: &str,
        solution_str: &str,
        ground_truth: &str,
        extra_info: Option<&Value>,
    ) -> f64 {
        let _ = (data_source, extra_info);

        let Some(model_answer) = extract_final_answer(solution_str) else {
            return 0.0;
        };

        let model_normalized = normalize_answer(model_answer);
        let truth_normalized = normalize_answer(ground_truth);

        if model_normalized == truth_normalized {
            return 1.0;
        }

        if let (Ok(model_num), Ok(truth_num)) = (
            model_normalized.parse::<f64>(),
            truth_normalized.parse::<f64>(),
        ) {
            if (model_num - truth_num).abs() < self.config.tolerance {
                return 1.0;
            }
        }

        0.0
    }
}

/// Compute the reward for one pair using the default tolerance.
///
/// This is the verl-style call contract: the training harness supplies a
/// data-source tag, the generated solution, the ground truth, and optional
/// extra info, and receives exactly 0.0 or 1.0 back.
pub fn compute_score(
    data_source: &str,
    solution_str: &str,
    ground_truth: &str,
    extra_info: Option<&Value>,
) -> f64 {
    RewardScorer::default().score(data_source, solution_str, ground_truth, extra_info)
}
