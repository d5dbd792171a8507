//! Resource tracker for bulk disposal at the end of a test.

use crate::document::Disposable;
use parking_lot::Mutex;
use std::any::Any;
use tracing::debug;

enum TrackedResource {
    Disposable(Box<dyn Disposable>),
    Opaque(Box<dyn Any + Send>),
}

/// Collects objects handed over by a component for later bulk disposal.
///
/// Objects that implement [`Disposable`] are disposed by
/// [`ResourceTracker::dispose_all`]; other objects are simply dropped.
#[derive(Default)]
pub struct ResourceTracker {
    resources: Mutex<Vec<TrackedResource>>,
}

impl ResourceTracker {
    /// Creates a new empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks an arbitrary object.
    pub fn add_resource<R: Any + Send>(&self, resource: R) {
        self.resources
            .lock()
            .push(TrackedResource::Opaque(Box::new(resource)));
    }

    /// Tracks an object that must be disposed.
    pub fn add_disposable<D: Disposable + 'static>(&self, resource: D) {
        self.resources
            .lock()
            .push(TrackedResource::Disposable(Box::new(resource)));
    }

    /// Returns the number of tracked objects.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.resources.lock().len()
    }

    /// Removes every tracked object in insertion order, disposing those that
    /// support disposal.
    ///
    /// Returns the number of objects disposed. The tracker is empty
    /// afterwards; objects added during disposal are kept for the next call.
    pub fn dispose_all(&self) -> usize {
        let resources = std::mem::take(&mut *self.resources.lock());
        let total = resources.len();
        let mut disposed = 0;

        for resource in resources {
            match resource {
                TrackedResource::Disposable(mut d) => {
                    d.dispose();
                    disposed += 1;
                }
                TrackedResource::Opaque(resource) => drop(resource),
            }
        }

        debug!(total, disposed, "Released tracked resources");
        disposed
    }
}

impl std::fmt::Debug for ResourceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTracker")
            .field("pending_count", &self.pending_count())
            .finish()
    }
}
