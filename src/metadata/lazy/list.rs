//! Lazily resolved, editable ordered collections.

use std::sync::RwLock;

use crate::metadata::token::Token;

/// Resolver callback turning one id of an ordered id-list into its element.
///
/// The callback receives the full id-list plus the index to resolve, and has to be total:
/// every index below the list length yields an element. Dangling ids are the resolver's
/// business to represent (typically with an empty placeholder), not to fail over.
pub type ListResolver<T> = Box<dyn Fn(&[Token], usize) -> T + Send + Sync>;

enum ListState<T> {
    /// Not yet resolved; holds the ordered id-list and the injected resolver.
    Pending {
        ids: Vec<Token>,
        resolve: ListResolver<T>,
    },
    /// Fully resolved; a plain ordered collection from here on.
    Materialized(Vec<T>),
}

/// An ordered collection that resolves an id-list into concrete elements on demand, once.
///
/// Constructed with an ordered list of tokens and a resolver, a `LazyList` performs no
/// resolution at construction. The first element access materializes the whole collection:
/// exactly one resolver invocation per id, in id-list order. From then on access is
/// constant-time per element, the resolver is never consulted again, and the collection
/// behaves as a plain ordered sequence - [`LazyList::push`] and [`LazyList::remove`] edit
/// it directly (forcing materialization first, so the original membership stays intact).
///
/// # Examples
///
/// ```rust
/// use cilmeta::metadata::{lazy::LazyList, token::Token};
///
/// let ids = vec![Token::new(0x0C000001), Token::new(0x0C000002)];
/// let list = LazyList::new(ids, |ids, index| ids[index].row());
///
/// assert_eq!(list.len(), 2);
/// assert_eq!(list.get(1), Some(2));
/// assert_eq!(list.to_vec(), vec![1, 2]);
/// ```
pub struct LazyList<T> {
    state: RwLock<ListState<T>>,
}

impl<T: Clone> LazyList<T> {
    /// Creates a list over `ids` which resolves through `resolve` on first access
    ///
    /// # Arguments
    /// * `ids` - The ordered id-list; its length is the list's length until edited
    /// * `resolve` - Total resolver from `(id-list, index)` to the element
    #[must_use]
    pub fn new<F>(ids: Vec<Token>, resolve: F) -> Self
    where
        F: Fn(&[Token], usize) -> T + Send + Sync + 'static,
    {
        LazyList {
            state: RwLock::new(ListState::Pending {
                ids,
                resolve: Box::new(resolve),
            }),
        }
    }

    /// Creates an already materialized list from explicit values
    ///
    /// Used by synthetic entities, whose collections never had an image to resolve from.
    #[must_use]
    pub fn from_values(values: Vec<T>) -> Self {
        LazyList {
            state: RwLock::new(ListState::Materialized(values)),
        }
    }

    /// The number of elements (resolved or not)
    #[must_use]
    pub fn len(&self) -> usize {
        match &*read_lock!(self.state) {
            ListState::Pending { ids, .. } => ids.len(),
            ListState::Materialized(values) => values.len(),
        }
    }

    /// Returns true if the list holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once every element has been resolved
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        matches!(&*read_lock!(self.state), ListState::Materialized(_))
    }

    /// Returns the element at `index`, materializing the collection on first access
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.materialize();

        match &*read_lock!(self.state) {
            ListState::Materialized(values) => values.get(index).cloned(),
            ListState::Pending { .. } => unreachable!("list was just materialized"),
        }
    }

    /// Returns a snapshot of all elements in order, materializing on first access
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.materialize();

        match &*read_lock!(self.state) {
            ListState::Materialized(values) => values.clone(),
            ListState::Pending { .. } => unreachable!("list was just materialized"),
        }
    }

    /// Appends an element, materializing the collection first
    pub fn push(&self, value: T) {
        self.materialize();

        if let ListState::Materialized(values) = &mut *write_lock!(self.state) {
            values.push(value);
        }
    }

    /// Removes and returns the element at `index`, materializing the collection first.
    ///
    /// Returns `None` when the index is out of range.
    pub fn remove(&self, index: usize) -> Option<T> {
        self.materialize();

        match &mut *write_lock!(self.state) {
            ListState::Materialized(values) => {
                if index < values.len() {
                    Some(values.remove(index))
                } else {
                    None
                }
            }
            ListState::Pending { .. } => None,
        }
    }

    fn materialize(&self) {
        {
            if matches!(&*read_lock!(self.state), ListState::Materialized(_)) {
                return;
            }
        }

        let mut state = write_lock!(self.state);
        let resolved = match &*state {
            ListState::Materialized(_) => None,
            ListState::Pending { ids, resolve } => {
                Some((0..ids.len()).map(|index| resolve(ids, index)).collect())
            }
        };

        if let Some(values) = resolved {
            *state = ListState::Materialized(values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted_list(count: u32) -> (LazyList<u32>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let ids: Vec<Token> = (1..=count).map(|rid| Token::new(0x0C00_0000 + rid)).collect();
        let list = LazyList::new(ids, move |ids, index| {
            counter.fetch_add(1, Ordering::SeqCst);
            ids[index].row()
        });

        (list, calls)
    }

    #[test]
    fn no_resolution_at_construction() {
        let (list, calls) = counted_list(3);

        assert_eq!(list.len(), 3);
        assert!(!list.is_materialized());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn exactly_n_resolver_calls() {
        let (list, calls) = counted_list(4);

        // Partial indexing followed by full traversal: still exactly N calls
        assert_eq!(list.get(2), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        let values = list.to_vec();
        assert_eq!(values, vec![1, 2, 3, 4]);
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        for index in 0..4 {
            assert_eq!(list.get(index), Some(index as u32 + 1));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn resolution_preserves_input_order() {
        let ids = vec![
            Token::new(0x0C000005),
            Token::new(0x0C000001),
            Token::new(0x0C000003),
        ];
        let list = LazyList::new(ids, |ids, index| ids[index].row());

        assert_eq!(list.to_vec(), vec![5, 1, 3]);
    }

    #[test]
    fn editing_after_materialization() {
        let (list, calls) = counted_list(2);

        list.push(99);
        assert_eq!(list.len(), 3);
        assert_eq!(list.to_vec(), vec![1, 2, 99]);

        assert_eq!(list.remove(0), Some(1));
        assert_eq!(list.to_vec(), vec![2, 99]);
        assert_eq!(list.remove(7), None);

        // Edits never re-invoke the resolver
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn from_values_is_plain() {
        let list = LazyList::from_values(vec!["a", "b"]);

        assert!(list.is_materialized());
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some("a"));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn empty_id_list() {
        let list: LazyList<u32> = LazyList::new(Vec::new(), |_, _| unreachable!());

        assert!(list.is_empty());
        assert_eq!(list.get(0), None);
        assert!(list.to_vec().is_empty());
        assert!(list.is_materialized());
    }
}
