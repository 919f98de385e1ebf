//! Per-species blend weights.

use crate::MorphError;

/// Sums this close to one are treated as already normalized; without the
/// tolerance, repeated normalization drifts by an ulp per pass and repeated
/// blends stop being bit-identical.
const UNIT_SUM_TOLERANCE: f32 = 1e-6;

/// Ordered per-species blend coefficients.
///
/// Indices align positionally with [`SpeciesMeshSet`](crate::SpeciesMeshSet)
/// registration order. Weights are plain scalars;
/// [`normalize`](Self::normalize) turns them into a convex combination
/// before blending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightVector {
    weights: Vec<f32>,
}

impl WeightVector {
    /// Creates an all-zero weight vector.
    pub fn new(len: usize) -> Self {
        Self {
            weights: vec![0.0; len],
        }
    }

    /// Creates a weight vector from existing values.
    pub fn from_weights(weights: Vec<f32>) -> Self {
        Self { weights }
    }

    /// Number of weights.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns true if the vector holds no weights.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Gets a weight by index, 0.0 when out of range.
    pub fn get(&self, index: usize) -> f32 {
        self.weights.get(index).copied().unwrap_or(0.0)
    }

    /// Sets a single weight, clamped to be non-negative.
    ///
    /// An out-of-range index leaves the vector unchanged.
    pub fn set(&mut self, index: usize, value: f32) -> Result<(), MorphError> {
        let len = self.weights.len();
        match self.weights.get_mut(index) {
            Some(w) => {
                *w = value.max(0.0);
                Ok(())
            }
            None => Err(MorphError::IndexOutOfRange { index, len }),
        }
    }

    /// Replaces every weight at once.
    ///
    /// Values are stored verbatim; negative entries are only clamped by the
    /// next [`normalize`](Self::normalize) pass. A length mismatch leaves
    /// the vector unchanged.
    pub fn set_all(&mut self, values: &[f32]) -> Result<(), MorphError> {
        if values.len() != self.weights.len() {
            return Err(MorphError::LengthMismatch {
                expected: self.weights.len(),
                got: values.len(),
            });
        }
        self.weights.copy_from_slice(values);
        Ok(())
    }

    /// Grows or shrinks the vector to `target` entries.
    ///
    /// New entries are zero; excess entries are dropped from the tail.
    /// Idempotent.
    pub fn sync_length(&mut self, target: usize) {
        self.weights.resize(target, 0.0);
    }

    /// Normalizes the weights into a convex combination, in place.
    ///
    /// Negative entries are clamped to zero first. If the clamped sum is
    /// not positive the vector falls back to selecting entry 0 (one-hot),
    /// so a degenerate input still yields a deterministic blend. Empty
    /// vectors are left untouched, and a vector already summing to one
    /// (within tolerance) is not rescaled, making the operation idempotent.
    pub fn normalize(&mut self) {
        if self.weights.is_empty() {
            return;
        }

        for w in &mut self.weights {
            *w = w.max(0.0);
        }

        let sum: f32 = self.weights.iter().sum();
        if sum <= 0.0 {
            self.weights.fill(0.0);
            self.weights[0] = 1.0;
        } else if (sum - 1.0).abs() > UNIT_SUM_TOLERANCE {
            let inv = 1.0 / sum;
            for w in &mut self.weights {
                *w *= inv;
            }
        }
    }

    /// Resets all weights to zero.
    pub fn reset(&mut self) {
        self.weights.fill(0.0);
    }

    /// Splits unit weight between two entries: `1 - t` to `from`, `t` to `to`.
    ///
    /// `t` is clamped to `[0, 1]` and every other entry is zeroed. This is
    /// the two-species slider hosts typically drive. Either index out of
    /// range leaves the vector unchanged.
    pub fn crossfade(&mut self, from: usize, to: usize, t: f32) -> Result<(), MorphError> {
        let len = self.weights.len();
        if from >= len {
            return Err(MorphError::IndexOutOfRange { index: from, len });
        }
        if to >= len {
            return Err(MorphError::IndexOutOfRange { index: to, len });
        }

        let t = t.clamp(0.0, 1.0);
        self.weights.fill(0.0);
        self.weights[from] += 1.0 - t;
        self.weights[to] += t;
        Ok(())
    }

    /// Returns the weights as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Iterates over the weights.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights.iter().copied()
    }
}
