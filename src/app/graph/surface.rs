use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use eframe::egui::Id;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CanvasError {
    #[error("surface {0:?} already has a mounted graph canvas")]
    SurfaceBusy(Id),
}

/// Tracks which drawing surfaces currently have a canvas bound to them.
#[derive(Clone, Default)]
pub struct SurfaceRegistry {
    bound: Rc<RefCell<HashSet<Id>>>,
}

impl SurfaceRegistry {
    pub fn acquire(&self, surface: Id) -> Result<SurfaceLease, CanvasError> {
        if !self.bound.borrow_mut().insert(surface) {
            return Err(CanvasError::SurfaceBusy(surface));
        }

        Ok(SurfaceLease {
            surface,
            bound: Rc::clone(&self.bound),
            released: false,
        })
    }

    pub fn is_bound(&self, surface: Id) -> bool {
        self.bound.borrow().contains(&surface)
    }
}

/// Exclusive binding of one canvas to one surface. Released explicitly or on
/// drop, whichever comes first.
pub struct SurfaceLease {
    surface: Id,
    bound: Rc<RefCell<HashSet<Id>>>,
    released: bool,
}

impl SurfaceLease {
    pub fn surface(&self) -> Id {
        self.surface
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.bound.borrow_mut().remove(&self.surface);
    }
}

impl Drop for SurfaceLease {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_lease_per_surface() {
        let registry = SurfaceRegistry::default();
        let surface = Id::new("graph");

        let mut lease = registry.acquire(surface).unwrap();
        assert_eq!(
            registry.acquire(surface).err(),
            Some(CanvasError::SurfaceBusy(surface))
        );
        assert!(registry.acquire(Id::new("other")).is_ok());

        lease.release();
        lease.release();
        assert!(!registry.is_bound(surface));
        assert!(registry.acquire(surface).is_ok());
    }

    #[test]
    fn drop_releases_the_surface() {
        let registry = SurfaceRegistry::default();
        let surface = Id::new("graph");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _lease = registry.acquire(surface).unwrap();
            panic!("render failure");
        }));

        assert!(result.is_err());
        assert!(!registry.is_bound(surface));
    }
}
