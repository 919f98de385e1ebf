//! Morph session orchestration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{self, Aabb};
use crate::{MorphError, MorphReport, SpeciesMesh, SpeciesMeshSet, WeightVector, blend};

/// Configuration for a [`MorphSession`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MorphConfig {
    /// Normalize weights into a convex combination before every blend.
    pub normalize_weights: bool,
    /// Recompute vertex normals after every blend. Requires `indices`.
    pub recalculate_normals: bool,
    /// Shared triangle topology, three indices per triangle.
    ///
    /// All species meshes are assumed to share this connectivity. When
    /// empty, normal recomputation is skipped regardless of the flag.
    pub indices: Vec<u32>,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            normalize_weights: true,
            recalculate_normals: true,
            indices: Vec::new(),
        }
    }
}

/// Owns the working buffer and drives blend passes over a species set.
///
/// The session is lazily initialized: the first mutating call establishes
/// the reference topology (explicit template, else the first registered
/// mesh), allocates the working buffer, and runs one morph pass. All weight
/// mutation funnels into [`apply_morph`](Self::apply_morph).
///
/// The working buffer is freshly allocated and never aliases species data;
/// it is resized only by [`initialize`](Self::initialize). Access from
/// multiple threads must be serialized by the host.
#[derive(Debug, Clone)]
pub struct MorphSession {
    config: MorphConfig,
    species: SpeciesMeshSet,
    weights: WeightVector,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    bounds: Option<Aabb>,
    initialized: bool,
}

impl MorphSession {
    /// Creates an uninitialized session over a species set.
    pub fn new(species: SpeciesMeshSet, config: MorphConfig) -> Self {
        let weights = WeightVector::new(species.len());
        Self {
            config,
            species,
            weights,
            positions: Vec::new(),
            normals: Vec::new(),
            bounds: None,
            initialized: false,
        }
    }

    /// Establishes the reference topology and runs the first morph pass.
    ///
    /// The working buffer is allocated zero-filled at the reference vertex
    /// count and the weight vector is synced to the species count. Calling
    /// this again re-establishes topology, for use after registering
    /// species with a different reference.
    pub fn initialize(&mut self) -> MorphReport {
        let reference = self.species.reference_vertex_count().unwrap_or(0);
        self.positions = vec![Vec3::ZERO; reference];
        self.normals.clear();
        self.bounds = None;
        self.initialized = true;
        self.apply_morph()
    }

    fn ensure_initialized(&mut self) {
        if !self.initialized {
            self.initialize();
        }
    }

    /// Runs one full morph pass: weight sync, optional normalization,
    /// blend, then derived geometry (bounds always, normals when
    /// configured and topology is present).
    ///
    /// This is the single recomputation path; it is re-entrant and has no
    /// effect on the session lifecycle. When every positively weighted
    /// species is excluded, the working buffer keeps its last valid
    /// contents (`applied == false` in the report) instead of collapsing
    /// the mesh to the origin.
    pub fn apply_morph(&mut self) -> MorphReport {
        if !self.initialized {
            return self.initialize();
        }

        self.weights.sync_length(self.species.len());
        if self.config.normalize_weights {
            self.weights.normalize();
        }

        let (contributors, issues) =
            blend::plan(&self.weights, &self.species, self.positions.len());
        let report = if contributors.is_empty() && !issues.is_empty() {
            MorphReport {
                issues,
                contributing: 0,
                applied: false,
            }
        } else {
            blend::blend_into(&mut self.positions, &self.weights, &self.species)
        };

        if report.applied {
            if self.config.recalculate_normals && !self.config.indices.is_empty() {
                self.normals =
                    geometry::compute_vertex_normals(&self.positions, &self.config.indices);
            }
            self.bounds = Aabb::from_points(self.positions.iter().copied());
        }

        for issue in &report.issues {
            log::warn!("morph pass skipped a species: {issue}");
        }
        log::debug!(
            "morph pass: {} contributing, {} issues, applied: {}",
            report.contributing,
            report.issues.len(),
            report.applied
        );

        report
    }

    /// Sets one weight (clamped non-negative), optionally re-blending.
    ///
    /// With `apply` false the change is staged; the next
    /// [`apply_morph`](Self::apply_morph) picks it up and the returned
    /// report has `applied == false`.
    pub fn set_weight(
        &mut self,
        index: usize,
        value: f32,
        apply: bool,
    ) -> Result<MorphReport, MorphError> {
        self.ensure_initialized();
        self.weights.set(index, value)?;
        Ok(self.maybe_apply(apply))
    }

    /// Sets one weight addressed by species label.
    ///
    /// An unknown label reports [`MorphError::IndexOutOfRange`] with
    /// `index == len`; `MissingSource` is reserved for registered slots
    /// that lack vertex data.
    pub fn set_weight_by_label(
        &mut self,
        label: &str,
        value: f32,
        apply: bool,
    ) -> Result<MorphReport, MorphError> {
        let index = self
            .species
            .find_index(label)
            .ok_or(MorphError::IndexOutOfRange {
                index: self.species.len(),
                len: self.species.len(),
            })?;
        self.set_weight(index, value, apply)
    }

    /// Replaces the whole weight vector, optionally re-blending.
    ///
    /// A length mismatch against the species count leaves the weights
    /// unchanged and skips the re-blend.
    pub fn set_weights(&mut self, values: &[f32], apply: bool) -> Result<MorphReport, MorphError> {
        self.ensure_initialized();
        self.weights.sync_length(self.species.len());
        self.weights.set_all(values)?;
        Ok(self.maybe_apply(apply))
    }

    /// Splits unit weight between two species (`1 - t` / `t`), re-blending
    /// immediately.
    pub fn crossfade(&mut self, from: usize, to: usize, t: f32) -> Result<MorphReport, MorphError> {
        self.ensure_initialized();
        self.weights.crossfade(from, to, t)?;
        Ok(self.apply_morph())
    }

    /// Zeroes all weights, optionally re-blending.
    pub fn reset_weights(&mut self, apply: bool) -> MorphReport {
        self.ensure_initialized();
        self.weights.reset();
        self.maybe_apply(apply)
    }

    /// Appends a species mesh, keeping the weight vector in sync.
    ///
    /// The new species starts at weight zero. If the session was already
    /// initialized and the new mesh disagrees with the established
    /// reference count, it is excluded from blending (reported per pass).
    pub fn add_species(&mut self, mesh: SpeciesMesh) -> usize {
        let index = self.species.add(mesh);
        if self.initialized {
            self.weights.sync_length(self.species.len());
        }
        index
    }

    /// Assigns a mesh to an existing slot (typically a placeholder).
    pub fn assign_species(&mut self, index: usize, mesh: SpeciesMesh) -> Result<(), MorphError> {
        self.species.assign(index, mesh)
    }

    fn maybe_apply(&mut self, apply: bool) -> MorphReport {
        if apply {
            self.apply_morph()
        } else {
            MorphReport::default()
        }
    }

    /// Blended vertex positions (the working buffer).
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Vertex normals from the latest pass, empty when never recomputed.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Bounding box of the latest blended buffer.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Current weight vector.
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Registered species.
    pub fn species(&self) -> &SpeciesMeshSet {
        &self.species
    }

    /// Session configuration.
    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    /// Vertex count of the working buffer once initialized, else the
    /// species set's reference count.
    pub fn reference_vertex_count(&self) -> Option<usize> {
        if self.initialized {
            Some(self.positions.len())
        } else {
            self.species.reference_vertex_count()
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_species() -> SpeciesMeshSet {
        let mut set = SpeciesMeshSet::new();
        set.add(SpeciesMesh::new("a", vec![Vec3::ZERO]));
        set.add(SpeciesMesh::new("b", vec![Vec3::new(10.0, 0.0, 0.0)]));
        set
    }

    #[test]
    fn test_lazy_initialization() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        assert!(!session.is_initialized());

        session.set_weight(1, 1.0, true).unwrap();

        assert!(session.is_initialized());
        assert_eq!(session.weights().len(), 2);
        assert_eq!(session.positions().len(), 1);
    }

    #[test]
    fn test_initial_pass_uses_zero_sum_fallback() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        let report = session.initialize();

        // All-zero weights one-hot to species 0 under normalization.
        assert_eq!(session.weights().as_slice(), &[1.0, 0.0]);
        assert_eq!(report.contributing, 1);
        assert_eq!(session.positions(), &[Vec3::ZERO]);
    }

    #[test]
    fn test_apply_morph_is_deterministic() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        session.set_weights(&[0.3, 0.7], true).unwrap();

        let first = session.positions().to_vec();
        session.apply_morph();

        assert_eq!(session.positions(), first.as_slice());
    }

    #[test]
    fn test_staged_weight_applies_later() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        session.initialize();

        let report = session.set_weight(1, 1.0, false).unwrap();
        assert!(!report.applied);
        // Buffer still holds the one-hot initial pass result.
        assert_eq!(session.positions(), &[Vec3::ZERO]);

        let report = session.apply_morph();
        assert!(report.applied);
        assert_eq!(session.positions(), &[Vec3::new(5.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_total_exclusion_keeps_last_buffer() {
        let mut set = SpeciesMeshSet::new();
        set.add(SpeciesMesh::new("a", vec![Vec3::new(2.0, 0.0, 0.0)]));
        set.add(SpeciesMesh::new("short", vec![]));
        let mut session = MorphSession::new(set, MorphConfig::default());

        session.set_weights(&[1.0, 0.0], true).unwrap();
        assert_eq!(session.positions(), &[Vec3::new(2.0, 0.0, 0.0)]);

        // Shift all weight onto the mismatched species: the pass reports
        // the exclusion and keeps the previous buffer.
        let report = session.set_weights(&[0.0, 1.0], true).unwrap();
        assert!(!report.applied);
        assert_eq!(report.contributing, 0);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(session.positions(), &[Vec3::new(2.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_add_species_syncs_weights() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        session.initialize();

        let index = session.add_species(SpeciesMesh::new("c", vec![Vec3::Y]));

        assert_eq!(index, 2);
        assert_eq!(session.weights().len(), 3);
        assert_eq!(session.weights().get(2), 0.0);
    }

    #[test]
    fn test_bounds_refresh_after_pass() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        session.set_weights(&[0.0, 1.0], true).unwrap();

        let bounds = session.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_normals_need_indices() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        session.set_weights(&[1.0, 0.0], true).unwrap();

        // recalculate_normals defaults on, but without topology it is inert.
        assert!(session.normals().is_empty());
    }

    #[test]
    fn test_set_weight_by_label() {
        let mut session = MorphSession::new(two_species(), MorphConfig::default());
        session.initialize();
        session.reset_weights(false);

        session.set_weight_by_label("b", 1.0, true).unwrap();
        assert_eq!(session.positions(), &[Vec3::new(10.0, 0.0, 0.0)]);

        let err = session.set_weight_by_label("unknown", 1.0, true).unwrap_err();
        assert_eq!(err, MorphError::IndexOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn test_empty_species_set_is_harmless() {
        let mut session = MorphSession::new(SpeciesMeshSet::new(), MorphConfig::default());
        let report = session.initialize();

        assert!(report.is_clean());
        assert!(session.positions().is_empty());
        assert_eq!(session.bounds(), None);
    }
}
