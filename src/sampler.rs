//! Repetition-averse weighted random choice.
//!
//! Every item of a fixed universe carries a weight in `(0, 1]`. A draw picks
//! from a caller-supplied subset with probability proportional to weight,
//! then penalises the winner and lets every other item drift back toward 1:
//!
//! ```text
//! chosen: w = w * bias_factor
//! others: w = min(1, w + recovery_rate * (1 - w))
//! ```
//!
//! Recently chosen items therefore become unlikely to repeat and recover
//! geometrically over the following draws.

use anyhow::{bail, Result};
use log::trace;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::hash::Hash;

/// Anything that can pick one element out of a candidate list.
///
/// The walk depends on this seam rather than on a concrete sampler so it can
/// be driven deterministically.
pub trait Chooser<T> {
    /// Pick one element of `subset`.
    ///
    /// # Errors
    ///
    /// Implementations fail on an empty subset or on candidates they do not know.
    fn choose(&mut self, subset: &[T]) -> Result<T>;
}

/// Always takes the first candidate.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstChoice;

impl<T: Clone> Chooser<T> for FirstChoice {
    fn choose(&mut self, subset: &[T]) -> Result<T> {
        match subset.first() {
            Some(item) => Ok(item.clone()),
            None => bail!("Subset cannot be empty"),
        }
    }
}

/// Weighted sampler with per-item memory of recent picks.
#[derive(Debug, Clone)]
pub struct WeightedSampler<T, R = StdRng> {
    weights: HashMap<T, f64>,
    bias_factor: f64,
    recovery_rate: f64,
    last_chosen: Option<T>,
    rng: R,
}

impl<T: Eq + Hash + Clone> WeightedSampler<T, StdRng> {
    /// Sampler seeded from OS entropy.
    pub fn new(
        items: impl IntoIterator<Item = T>,
        bias_factor: f64,
        recovery_rate: f64,
    ) -> Result<Self> {
        Self::with_rng(items, bias_factor, recovery_rate, StdRng::from_entropy())
    }

    /// Sampler with a reproducible sequence of draws.
    pub fn seeded(
        items: impl IntoIterator<Item = T>,
        bias_factor: f64,
        recovery_rate: f64,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(items, bias_factor, recovery_rate, StdRng::seed_from_u64(seed))
    }
}

impl<T: Eq + Hash + Clone, R: Rng> WeightedSampler<T, R> {
    /// Build a sampler over `items` with an explicit random source.
    ///
    /// # Errors
    ///
    /// `bias_factor` must lie in `(0, 1)` and `recovery_rate` in `(0, 1]`.
    pub fn with_rng(
        items: impl IntoIterator<Item = T>,
        bias_factor: f64,
        recovery_rate: f64,
        rng: R,
    ) -> Result<Self> {
        validate_tuning(bias_factor, recovery_rate)?;

        Ok(Self {
            weights: items.into_iter().map(|item| (item, 1.0)).collect(),
            bias_factor,
            recovery_rate,
            last_chosen: None,
            rng,
        })
    }

    /// Current weight of `item`, `None` outside the universe.
    #[must_use]
    pub fn weight(&self, item: &T) -> Option<f64> {
        self.weights.get(item).copied()
    }

    #[must_use]
    pub fn last_chosen(&self) -> Option<&T> {
        self.last_chosen.as_ref()
    }

    #[must_use]
    pub fn universe_size(&self) -> usize {
        self.weights.len()
    }

    fn update_weights(&mut self, chosen: &T) {
        let (bias, recovery) = (self.bias_factor, self.recovery_rate);
        for (item, weight) in &mut self.weights {
            *weight = if item == chosen {
                // Floor keeps the weight strictly positive after long streaks.
                (*weight * bias).max(f64::MIN_POSITIVE)
            } else {
                (*weight + recovery * (1.0 - *weight)).min(1.0)
            };
        }
    }
}

impl<T: Eq + Hash + Clone, R: Rng> Chooser<T> for WeightedSampler<T, R> {
    fn choose(&mut self, subset: &[T]) -> Result<T> {
        if subset.is_empty() {
            bail!("Subset cannot be empty");
        }

        let subset_weights = subset
            .iter()
            .map(|item| self.weights.get(item).copied())
            .collect::<Option<Vec<f64>>>();
        let Some(subset_weights) = subset_weights else {
            bail!("Subset contains items not in the original universe");
        };

        let distribution = WeightedIndex::new(&subset_weights)?;
        let chosen = subset[distribution.sample(&mut self.rng)].clone();

        trace!("Drew from subset weights {:?}", subset_weights);
        self.update_weights(&chosen);
        self.last_chosen = Some(chosen.clone());
        Ok(chosen)
    }
}

/// Range check shared by the sampler and the runtime configuration.
pub fn validate_tuning(bias_factor: f64, recovery_rate: f64) -> Result<()> {
    if !(bias_factor > 0.0 && bias_factor < 1.0) {
        bail!("bias_factor must be in (0, 1), got {bias_factor}");
    }
    if !(recovery_rate > 0.0 && recovery_rate <= 1.0) {
        bail!("recovery_rate must be in (0, 1], got {recovery_rate}");
    }
    Ok(())
}
