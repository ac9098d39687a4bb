//! Verifiable reward function for GSM8K-style math solutions.
//!
//! This is the scoring function consumed by the GRPO training loop: given a
//! model-generated solution string and a ground-truth answer, decide whether
//! the model's declared final numeric answer matches and return a binary
//! reward (1.0 correct, 0.0 otherwise).
//!
//! The pipeline has three stages:
//!
//! 1. **Extraction** ([`extract`]) -- locate the final answer in free-form
//!    solution text using a ranked cascade of pattern strategies.
//! 2. **Normalization** ([`normalize`]) -- canonicalize an answer string by
//!    stripping formatting noise (commas, currency, percent, whitespace).
//! 3. **Comparison** ([`score`]) -- exact string equality, with a numeric
//!    tolerance fallback for formatting-equivalent values like "8" vs "8.0".
//!
//! All three stages are pure, total string transformations: malformed or
//! empty input degrades to "no answer found" and a reward of 0.0, never an
//! error. A scoring call must never interrupt a training step.

pub mod extract;
pub mod normalize;
pub mod score;

pub use extract::{extract_final_answer, extraction_strategies, ExtractStrategy};
pub use normalize::normalize_answer;
pub use score::{compute_score, RewardScorer, DEFAULT_TOLERANCE};
