//! Push-timing and capability markers shared by the synchronized range types.

use sheetlink_common::RangeError;

/// When local edits reach the remote.
///
/// `Linked`: each mutator sends its update before returning and only commits
/// locally once the remote accepted it. `Unlinked`: mutators commit locally and
/// mark the object dirty; the next flush (`save`/`sync`/`link`) sends all
/// buffered changes as one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LinkMode {
    #[default]
    Linked,
    Unlinked,
}

impl LinkMode {
    pub fn is_linked(self) -> bool {
        matches!(self, LinkMode::Linked)
    }
}

/// Which layer of the range model a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    Plain,
    SheetBound,
    ValueBacked,
    Named,
    Protected,
}

/// Lifecycle of an entity whose identity is assigned by the remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Lifecycle<Id> {
    Unregistered,
    Registered(Id),
    Deleted,
}

impl<Id: Clone + ToString> Lifecycle<Id> {
    pub(crate) fn id(&self) -> Option<&Id> {
        match self {
            Lifecycle::Registered(id) => Some(id),
            _ => None,
        }
    }

    /// The id, or the error for using an entity that is not (or no longer) registered.
    pub(crate) fn require_registered(&self, entity: &'static str) -> Result<Id, RangeError> {
        match self {
            Lifecycle::Registered(id) => Ok(id.clone()),
            Lifecycle::Unregistered => Err(RangeError::NotRegistered { entity }),
            Lifecycle::Deleted => Err(RangeError::Deleted { entity }),
        }
    }

    pub(crate) fn require_unregistered(&self, entity: &'static str) -> Result<(), RangeError> {
        match self {
            Lifecycle::Unregistered => Ok(()),
            Lifecycle::Registered(id) => Err(RangeError::AlreadyRegistered {
                entity,
                id: id.to_string(),
            }),
            Lifecycle::Deleted => Err(RangeError::Deleted { entity }),
        }
    }

    pub(crate) fn require_live(&self, entity: &'static str) -> Result<(), RangeError> {
        match self {
            Lifecycle::Deleted => Err(RangeError::Deleted { entity }),
            _ => Ok(()),
        }
    }
}

/// Ordered, indexable access to the rows (or columns) of a cached matrix.
pub trait SequenceLike {
    type Item;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with `CellNotFound` when `index` is past the end.
    fn get(&self, index: usize) -> Result<&Self::Item, RangeError>;

    fn iter(&self) -> std::slice::Iter<'_, Self::Item>;
}
