//! Deterministic cross-species mesh morphing.
//!
//! Given a set of topologically identical vertex buffers ("species meshes")
//! and a per-species weight vector, this crate computes a blended vertex
//! buffer plus derived normals and bounds:
//!
//! - [`SpeciesMesh`] / [`SpeciesMeshSet`] - ordered, labeled source buffers
//! - [`WeightVector`] - per-species blend coefficients with normalization
//! - [`blend_into`] / [`blend`] - the weighted-sum blend kernel
//! - [`MorphSession`] - owns the working buffer and drives morph passes
//! - [`MorphError`] / [`MorphReport`] - non-fatal structured diagnostics
//!
//! Malformed input degrades instead of failing: a species with a missing
//! mesh or a mismatched vertex count contributes zero displacement and is
//! reported, never raised as a hard error.
//!
//! # Usage
//!
//! ```
//! use chimera_morph::{MorphConfig, MorphSession, SpeciesMesh, SpeciesMeshSet};
//! use glam::Vec3;
//!
//! let mut species = SpeciesMeshSet::new();
//! species.add(SpeciesMesh::new("human", vec![Vec3::ZERO]));
//! species.add(SpeciesMesh::new("macaque", vec![Vec3::new(10.0, 0.0, 0.0)]));
//!
//! let mut session = MorphSession::new(species, MorphConfig::default());
//! session.set_weights(&[0.5, 0.5], true).unwrap();
//!
//! assert_eq!(session.positions()[0], Vec3::new(5.0, 0.0, 0.0));
//! ```

mod blend;
mod error;
mod geometry;
mod session;
mod species;
mod weights;

pub use blend::{blend, blend_into};
pub use error::{MorphError, MorphReport};
pub use geometry::{Aabb, compute_vertex_normals};
pub use session::{MorphConfig, MorphSession};
pub use species::{SpeciesMesh, SpeciesMeshSet};
pub use weights::WeightVector;

pub use glam;
