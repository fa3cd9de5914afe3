/// Change descriptors and vertex snapshots
///
/// Upstream change notifications carry a list of changed element indices,
/// where an empty list means "indeterminate, assume everything changed".
/// That convention stops here: [`ChangeSet::from_indices`] turns it into the
/// explicit [`ChangeSet::Full`], and nothing downstream looks at emptiness.

/// Which elements of a renderable changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSet {
    /// Every element, rebuild from scratch
    Full,
    /// Elements `first..=last`
    Range { first: usize, last: usize },
}

impl ChangeSet {
    /// Inclusive range; `first <= last`
    pub fn range(first: usize, last: usize) -> Self {
        debug_assert!(first <= last, "reversed change range [{}, {}]", first, last);
        ChangeSet::Range { first, last }
    }

    /// Convert an upstream index list
    ///
    /// An empty list is the upstream "everything may have changed" signal and
    /// becomes `Full`. Otherwise the smallest range covering every index.
    pub fn from_indices(indices: &[usize]) -> Self {
        let first = indices.iter().copied().min();
        let last = indices.iter().copied().max();
        match (first, last) {
            (Some(first), Some(last)) => ChangeSet::Range { first, last },
            _ => ChangeSet::Full,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, ChangeSet::Full)
    }

    /// Union of two change sets
    pub fn merge(self, other: ChangeSet) -> ChangeSet {
        match (self, other) {
            (ChangeSet::Range { first: a, last: b }, ChangeSet::Range { first: c, last: d }) => {
                ChangeSet::Range { first: a.min(c), last: b.max(d) }
            }
            _ => ChangeSet::Full,
        }
    }

    /// The change as a range within `count` elements
    ///
    /// `None` when the change is `Full` or does not fit: the caller rebuilds.
    pub fn bounded(&self, count: usize) -> Option<(usize, usize)> {
        match *self {
            ChangeSet::Range { first, last } if first <= last && last < count => Some((first, last)),
            _ => None,
        }
    }
}

/// Vertex data captured on the producer thread
#[derive(Debug, Clone, PartialEq)]
pub enum VertexSnapshot<V> {
    /// Complete vertex array
    Rebuild(Vec<V>),
    /// Vertices for `first..first + vertices.len()` of a buffer holding
    /// `element_count` vertices when the snapshot was taken
    Partial {
        first: usize,
        vertices: Vec<V>,
        element_count: usize,
    },
}

impl<V> VertexSnapshot<V> {
    /// Build a snapshot of `count` vertices for `change`
    ///
    /// A range that does not fit inside `count` falls back to a full rebuild.
    pub fn build<F>(change: ChangeSet, count: usize, mut vertex: F) -> Self
    where
        F: FnMut(usize) -> V,
    {
        match change.bounded(count) {
            Some((first, last)) => VertexSnapshot::Partial {
                first,
                vertices: (first..=last).map(&mut vertex).collect(),
                element_count: count,
            },
            None => VertexSnapshot::Rebuild((0..count).map(vertex).collect()),
        }
    }

    pub fn is_rebuild(&self) -> bool {
        matches!(self, VertexSnapshot::Rebuild(_))
    }

    /// Number of vertices carried
    pub fn len(&self) -> usize {
        match self {
            VertexSnapshot::Rebuild(vertices) => vertices.len(),
            VertexSnapshot::Partial { vertices, .. } => vertices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "change_set_tests.rs"]
mod tests;
