//! Weighted vertex blending.

use glam::Vec3;

use crate::{MorphError, MorphReport, SpeciesMeshSet, WeightVector};

/// Classifies every species for a pass over `reference_count` vertices:
/// the indices that will contribute, plus one issue per skipped species.
///
/// Species with a non-positive weight are passed over silently; skipping
/// them is an optimization with no semantic effect.
pub(crate) fn plan(
    weights: &WeightVector,
    species: &SpeciesMeshSet,
    reference_count: usize,
) -> (Vec<usize>, Vec<MorphError>) {
    let mut contributors = Vec::new();
    let mut issues = Vec::new();

    for index in 0..species.len() {
        if weights.get(index) <= 0.0 {
            continue;
        }

        match species.vertex_count_of(index) {
            None => issues.push(MorphError::MissingSource {
                index,
                label: species.label_of(index).unwrap_or_default().to_string(),
            }),
            Some(actual) if actual != reference_count => {
                issues.push(MorphError::TopologyMismatch {
                    index,
                    label: species.label_of(index).unwrap_or_default().to_string(),
                    expected: reference_count,
                    actual,
                });
            }
            Some(_) => contributors.push(index),
        }
    }

    (contributors, issues)
}

/// Blends species vertices into `out` as a weighted sum.
///
/// `out.len()` is the reference vertex count. The buffer is zeroed, then
/// each species with a positive weight and a matching vertex count
/// accumulates `weight * vertex` per vertex. Species that cannot
/// contribute are skipped and reported; they displace nothing, exactly as
/// a zero weight would.
///
/// Species are accumulated in registration order, so the floating-point
/// accumulation order per vertex is fixed and repeated calls with the same
/// inputs are bit-identical. An empty species set or a zero-length buffer
/// yields a zeroed/empty buffer, not an error.
pub fn blend_into(
    out: &mut [Vec3],
    weights: &WeightVector,
    species: &SpeciesMeshSet,
) -> MorphReport {
    let (contributors, issues) = plan(weights, species, out.len());

    out.fill(Vec3::ZERO);
    for &index in &contributors {
        let weight = weights.get(index);
        let Some(vertices) = species.vertices_of(index) else {
            continue;
        };

        for (acc, vertex) in out.iter_mut().zip(vertices) {
            *acc += *vertex * weight;
        }
    }

    MorphReport {
        contributing: contributors.len(),
        issues,
        applied: true,
    }
}

/// Allocating convenience wrapper around [`blend_into`].
pub fn blend(
    weights: &WeightVector,
    species: &SpeciesMeshSet,
    reference_count: usize,
) -> (Vec<Vec3>, MorphReport) {
    let mut out = vec![Vec3::ZERO; reference_count];
    let report = blend_into(&mut out, weights, species);
    (out, report)
}
