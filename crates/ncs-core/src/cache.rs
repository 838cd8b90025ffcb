//! Lazily computed, explicitly refreshable state slots.

use std::sync::Mutex;

use crate::error::NcsResult;

/// Holds a value computed at most once on demand and replaced only by an
/// explicit store. An unset slot is distinguishable from a loaded-but-empty
/// value, which is what makes cache staleness observable to callers.
#[derive(Debug, Default)]
pub(crate) struct CacheSlot<T> {
    slot: Mutex<Option<T>>,
}

impl<T: Clone> CacheSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// True once a value has been loaded or stored.
    pub(crate) fn is_loaded(&self) -> bool {
        self.slot.lock().expect("cache slot poisoned").is_some()
    }

    /// Return the cached value, computing and memoizing it on first access.
    ///
    /// A failed load leaves the slot unset, so the next read retries.
    pub(crate) fn get_or_load<F>(&self, load: F) -> NcsResult<T>
    where
        F: FnOnce() -> NcsResult<T>,
    {
        let mut guard = self.slot.lock().expect("cache slot poisoned");
        if let Some(value) = guard.as_ref() {
            return Ok(value.clone());
        }
        let value = load()?;
        *guard = Some(value.clone());
        Ok(value)
    }

    /// Unconditionally replace the cached value, loaded or not.
    pub(crate) fn store(&self, value: T) {
        *self.slot.lock().expect("cache slot poisoned") = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NcsError;

    #[test]
    fn slot_starts_unset() {
        let slot: CacheSlot<u32> = CacheSlot::new();
        assert!(!slot.is_loaded());
    }

    #[test]
    fn get_or_load_computes_exactly_once() {
        let slot = CacheSlot::new();
        let mut loads = 0;
        for _ in 0..3 {
            let value = slot
                .get_or_load(|| {
                    loads += 1;
                    Ok(42u32)
                })
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(loads, 1);
        assert!(slot.is_loaded());
    }

    #[test]
    fn store_overwrites_and_marks_loaded() {
        let slot = CacheSlot::new();
        slot.store(1u32);
        assert!(slot.is_loaded());
        slot.store(2u32);
        let value = slot.get_or_load(|| panic!("must not reload")).unwrap();
        assert_eq!(value, 2);
    }

    #[test]
    fn store_works_without_a_prior_read() {
        let slot: CacheSlot<u32> = CacheSlot::new();
        slot.store(7);
        assert_eq!(slot.get_or_load(|| unreachable!()).unwrap(), 7);
    }

    #[test]
    fn failed_load_leaves_slot_unset() {
        let slot: CacheSlot<u32> = CacheSlot::new();
        let err = slot.get_or_load(|| {
            Err(NcsError::AppNotInstalled {
                name: "mail".to_string(),
            })
        });
        assert!(err.is_err());
        assert!(!slot.is_loaded());
        assert_eq!(slot.get_or_load(|| Ok(9)).unwrap(), 9);
    }
}
