//! Species mesh registry.

use glam::Vec3;

use crate::MorphError;

/// One source vertex buffer representing a single species or variant.
///
/// Immutable once registered. The triangle topology is shared across the
/// whole set and owned by the host, not by this type.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesMesh {
    /// Display label (e.g. "human", "macaque").
    pub label: String,
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
}

impl SpeciesMesh {
    /// Creates a species mesh from a label and vertex buffer.
    pub fn new(label: impl Into<String>, vertices: Vec<Vec3>) -> Self {
        Self {
            label: label.into(),
            vertices,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    label: String,
    vertices: Option<Vec<Vec3>>,
}

/// Ordered collection of species meshes sharing one topology.
///
/// Slots are append-friendly and may be registered before their mesh asset
/// is available; such placeholders blend as zero displacement and are
/// reported as [`MorphError::MissingSource`]. The set is read-only from the
/// blend engine's perspective during a pass.
#[derive(Debug, Clone, Default)]
pub struct SpeciesMeshSet {
    slots: Vec<Slot>,
    reference: Option<usize>,
}

impl SpeciesMeshSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set with an explicit reference vertex count (template),
    /// instead of inferring it from the first registered mesh.
    pub fn with_reference_count(count: usize) -> Self {
        Self {
            slots: Vec::new(),
            reference: Some(count),
        }
    }

    /// Appends a species mesh, returning its index.
    pub fn add(&mut self, mesh: SpeciesMesh) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot {
            label: mesh.label,
            vertices: Some(mesh.vertices),
        });
        index
    }

    /// Appends a labeled slot with no mesh yet, returning its index.
    pub fn add_placeholder(&mut self, label: impl Into<String>) -> usize {
        let index = self.slots.len();
        self.slots.push(Slot {
            label: label.into(),
            vertices: None,
        });
        index
    }

    /// Assigns a mesh to an existing slot (typically a placeholder).
    ///
    /// An out-of-range index leaves the set unchanged.
    pub fn assign(&mut self, index: usize, mesh: SpeciesMesh) -> Result<(), MorphError> {
        let len = self.slots.len();
        match self.slots.get_mut(index) {
            Some(slot) => {
                slot.label = mesh.label;
                slot.vertices = Some(mesh.vertices);
                Ok(())
            }
            None => Err(MorphError::IndexOutOfRange { index, len }),
        }
    }

    /// Number of slots, with or without meshes.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the set has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Label of a slot.
    pub fn label_of(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|s| s.label.as_str())
    }

    /// Finds a slot index by label.
    pub fn find_index(&self, label: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.label == label)
    }

    /// Vertex buffer of a slot, `None` for placeholders or out of range.
    pub fn vertices_of(&self, index: usize) -> Option<&[Vec3]> {
        self.slots.get(index)?.vertices.as_deref()
    }

    /// Vertex count of a slot's mesh.
    pub fn vertex_count_of(&self, index: usize) -> Option<usize> {
        self.vertices_of(index).map(<[Vec3]>::len)
    }

    /// Returns true if the slot exists and has a mesh assigned.
    pub fn has_mesh(&self, index: usize) -> bool {
        self.vertices_of(index).is_some()
    }

    /// The canonical vertex count of the shared topology.
    ///
    /// The explicit template count when one was supplied, otherwise the
    /// count of the first slot holding a mesh.
    pub fn reference_vertex_count(&self) -> Option<usize> {
        self.reference
            .or_else(|| self.slots.iter().find_map(|s| s.vertices.as_ref().map(Vec::len)))
    }

    /// Iterates slot labels in registration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.label.as_str())
    }
}
