//! DirtyTracker: applied/current value pair shared by every builder panel.
//!
//! `current` is the working copy a panel edits; `applied` is the last value the user
//! confirmed. Dirtiness is a structural `PartialEq` comparison, so vector order and map
//! key sets both count.

/// Draft/applied tracker over any cloneable, comparable value
#[derive(Debug, Clone)]
pub struct DirtyTracker<T> {
    applied: T,
    current: T,
}

impl<T: Clone + PartialEq> DirtyTracker<T> {
    pub fn new(initial: T) -> Self {
        Self {
            applied: initial.clone(),
            current: initial,
        }
    }

    /// Working value
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Edit the working value in place
    pub fn current_mut(&mut self) -> &mut T {
        &mut self.current
    }

    /// Replace the working value. Takes ownership so no alias survives on the caller side.
    pub fn set_current(&mut self, value: T) {
        self.current = value;
    }

    /// Last confirmed value
    pub fn applied(&self) -> &T {
        &self.applied
    }

    pub fn is_dirty(&self) -> bool {
        self.current != self.applied
    }

    /// Confirm the working value and return an owned copy of it for hand-off
    pub fn apply(&mut self) -> T {
        self.applied = self.current.clone();
        self.applied.clone()
    }

    /// Discard edits
    pub fn undo(&mut self) {
        self.current = self.applied.clone();
    }

    /// Re-baseline both sides, e.g. when the underlying dataset changes
    pub fn reset(&mut self, initial: T) {
        self.applied = initial.clone();
        self.current = initial;
    }
}

impl<T: Clone + PartialEq + Default> Default for DirtyTracker<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
