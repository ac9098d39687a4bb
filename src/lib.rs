//! Minnow: operational toolkit for GRPO fine-tuning on GSM8K math problems.
//!
//! The one component with real decision logic is the verifiable reward
//! function in [`reward`], which turns a model-generated solution string and
//! a ground-truth answer into a binary training signal. Everything else is
//! the plumbing around it: dataset preparation ([`data`]), the verl training
//! launcher ([`train`]), and a cloud GPU provisioning client ([`cloud`]).

pub mod cloud;
pub mod config;
pub mod data;
pub mod reward;
pub mod train;
