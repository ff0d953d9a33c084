//! Weight-proportional single-draw sampling.
//!
//! A [`WeightedChooser`] stores the running sum of weights and draws an
//! index by picking a uniform point in `[0, total)` and binary-searching the
//! cumulative array. Building is O(n), each pick is O(log n).
//!
//! The chooser is immutable: removing an item means building a new chooser
//! over the reduced item list. The raffle does exactly that on every
//! rejected draw, which is O(pool) per rejection. This is fine for pools of
//! a few thousand tickets; larger pools would want a Fenwick tree over the
//! weights instead.

use rand::Rng;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct WeightedChooser {
    /// `cumulative[i]` is the sum of weights `0..=i`
    cumulative: Vec<u128>,
    total: u128,
}

impl WeightedChooser {
    /// Build a chooser over `weights`. Zero weights are allowed and are
    /// never picked.
    pub fn new<I>(weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = u128>,
    {
        let mut total: u128 = 0;
        let cumulative = weights
            .into_iter()
            .map(|weight| {
                total = total.checked_add(weight).ok_or(Error::WeightOverflow)?;
                Ok(total)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { cumulative, total })
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u128 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Pick an index with probability proportional to its weight. Returns
    /// `None` when the total weight is zero.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let point = rng.gen_range(0..self.total);
        // First index whose running sum exceeds the point.
        Some(self.cumulative.partition_point(|&sum| sum <= point))
    }
}
