//! Lazy field cell with one-time override semantics.

use std::sync::RwLock;

use crate::Result;

/// The three states a field of a metadata-backed entity can be in.
enum FieldState<T> {
    /// No access has happened yet; the original value still lives in the image.
    Unset,
    /// The original value, decoded exactly once from the image.
    Original(T),
    /// A caller-written value. Terminal: the loader is never consulted again.
    Overridden(T),
}

/// A lazy-with-override value holder backing exactly one field of exactly one entity
/// instance.
///
/// A `LazyField` starts out unset. The first successful [`LazyField::get`] runs the
/// supplied loader, caches the result as the original value, and every later `get` returns
/// that cached value without touching the loader again. [`LazyField::set`] overrides the
/// field unconditionally and permanently: whatever was cached (or never loaded) is
/// discarded, and no loader invocation ever happens for this cell afterwards.
///
/// Cells are never shared across instances. Callers wire exactly one loader per cell - the
/// owning entity's accessor - so passing the loader to `get` is equivalent to injecting it
/// at construction, without the cell having to own a closure over its container.
///
/// A failing loader leaves the cell unset and surfaces the error; "at most once" binds the
/// successful initialization. The internal lock makes the first-access race safe without
/// changing the observable contract.
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::lazy::LazyField;
///
/// let field: LazyField<u32> = LazyField::new();
/// assert_eq!(field.get(|| Ok(7))?, 7);
/// field.set(42);
/// assert_eq!(field.get(|| Ok(7))?, 42);
/// # Ok::<(), cilmeta::Error>(())
/// ```
pub struct LazyField<T> {
    state: RwLock<FieldState<T>>,
}

impl<T: Clone> LazyField<T> {
    /// Creates an unset cell
    #[must_use]
    pub fn new() -> Self {
        LazyField {
            state: RwLock::new(FieldState::Unset),
        }
    }

    /// Returns the field value, running `loader` exactly once if no value is present yet.
    ///
    /// # Arguments
    /// * `loader` - Produces the original value from the owning image; only invoked while
    ///   the cell is unset, and never again after it has succeeded once or after
    ///   [`LazyField::set`] has been called
    ///
    /// # Errors
    /// Propagates the loader's error; the cell stays unset in that case.
    pub fn get<F>(&self, loader: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        {
            let state = read_lock!(self.state);
            match &*state {
                FieldState::Original(value) | FieldState::Overridden(value) => {
                    return Ok(value.clone())
                }
                FieldState::Unset => {}
            }
        }

        let mut state = write_lock!(self.state);
        match &*state {
            // Someone else populated the cell between the two locks
            FieldState::Original(value) | FieldState::Overridden(value) => Ok(value.clone()),
            FieldState::Unset => {
                let value = loader()?;
                *state = FieldState::Original(value.clone());
                Ok(value)
            }
        }
    }

    /// Overrides the field value, permanently.
    ///
    /// Any cached original is discarded; all later [`LazyField::get`] calls return `value`
    /// (or a later override) without ever invoking a loader again.
    pub fn set(&self, value: T) {
        *write_lock!(self.state) = FieldState::Overridden(value);
    }

    /// Returns true while no value has been loaded or written
    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(&*read_lock!(self.state), FieldState::Unset)
    }

    /// Returns true once the field has been overridden by a write
    #[must_use]
    pub fn is_overridden(&self) -> bool {
        matches!(&*read_lock!(self.state), FieldState::Overridden(_))
    }
}

impl<T: Clone> Default for LazyField<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn loader_runs_at_most_once() {
        let calls = AtomicUsize::new(0);
        let field: LazyField<String> = LazyField::new();

        for _ in 0..5 {
            let value = field
                .get(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("original".to_string())
                })
                .unwrap();
            assert_eq!(value, "original");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn override_is_permanent() {
        let calls = AtomicUsize::new(0);
        let field: LazyField<u32> = LazyField::new();

        assert_eq!(field.get(|| Ok(1)).unwrap(), 1);

        field.set(2);
        for _ in 0..3 {
            let value = field
                .get(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .unwrap();
            assert_eq!(value, 2);
        }

        field.set(3);
        assert_eq!(field.get(|| Ok(1)).unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(field.is_overridden());
    }

    #[test]
    fn set_before_first_get_skips_loader() {
        let field: LazyField<u32> = LazyField::new();
        field.set(9);

        let value = field.get(|| panic!("loader must not run")).unwrap();
        assert_eq!(value, 9);
    }

    #[test]
    fn failed_loader_leaves_cell_unset() {
        let field: LazyField<u32> = LazyField::new();

        let result = field.get(|| Err(malformed_error!("no row")));
        assert!(result.is_err());
        assert!(field.is_unset());

        assert_eq!(field.get(|| Ok(4)).unwrap(), 4);
        assert!(!field.is_unset());
    }

    #[test]
    fn legitimate_empty_values_are_cached() {
        // An empty vec is a real value, not a sentinel for "unset"
        let calls = AtomicUsize::new(0);
        let field: LazyField<Vec<u8>> = LazyField::new();

        for _ in 0..3 {
            let value = field
                .get(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .unwrap();
            assert!(value.is_empty());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!field.is_unset());
    }
}
