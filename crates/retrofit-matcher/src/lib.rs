//! Matching of a building against the simulation pool and ranking of
//! renovation measures.
//!
//! # Overview
//!
//! 1. **Normalize** ([`normalization::NormalizedPool`]): min-max scale V/A and
//!    AW/BF over the loaded pool
//! 2. **Match** ([`matcher::find_nearest`]): closest building variant at the
//!    query's window-share bucket
//! 3. **Aggregate** ([`aggregate::rank_groups`]): mean savings per measure group,
//!    best first
//!
//! [`Recommender`] runs the whole pipeline, starting from a construction date
//! and a [`TableSource`](retrofit_dataset::source::TableSource).

pub use self::recommend::*;

pub mod aggregate;
pub mod matcher;
pub mod normalization;
mod recommend;
