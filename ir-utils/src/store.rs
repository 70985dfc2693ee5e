//! A small generic store that hands out dense, typed keys for values pushed
//! into it, with interior mutability so that the store can be shared by
//! `&self` reference while still growing. Modeled after the
//! `Store<K, V>` pattern used throughout the compiler for interned tables
//! (type registries, layout caches, and the like).

use std::cell::RefCell;

use index_vec::Idx;

/// A keyed, append-only store. Implementors only need to provide access to
/// the backing buffer; `create`/`map_fast`/`map_many_fast`/`modify_fast`
/// come for free.
pub trait Store<K: Idx, V> {
    fn internal_data(&self) -> &RefCell<Vec<V>>;

    /// Push a value into the store and return the key that was assigned to
    /// it. Keys are dense and monotonically increasing.
    fn create(&self, value: V) -> K {
        let mut data = self.internal_data().borrow_mut();
        let key = K::from_usize(data.len());
        data.push(value);
        key
    }

    /// Borrow the value behind `key` for the duration of `f`.
    fn map_fast<R>(&self, key: K, f: impl FnOnce(&V) -> R) -> R {
        let data = self.internal_data().borrow();
        f(&data[key.index()])
    }

    /// Borrow several values at once. Useful when a computation needs to
    /// compare or combine more than one entry without re-borrowing.
    fn map_many_fast<R>(&self, keys: impl IntoIterator<Item = K>, f: impl FnOnce(&[&V]) -> R) -> R {
        let data = self.internal_data().borrow();
        let values: Vec<&V> = keys.into_iter().map(|k| &data[k.index()]).collect();
        f(&values)
    }

    /// Mutably borrow the value behind `key` for the duration of `f`. Used
    /// by callers that grew a collection under a key earlier and now need
    /// to append to it in place (e.g. a block's node list as nodes are
    /// emitted into it).
    fn modify_fast<R>(&self, key: K, f: impl FnOnce(&mut V) -> R) -> R {
        let mut data = self.internal_data().borrow_mut();
        f(&mut data[key.index()])
    }

    fn len(&self) -> usize {
        self.internal_data().borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A plain `Store` backed by a single `RefCell<Vec<V>>`. Most interned
/// tables in the crate are just this with a newtype key.
#[derive(Debug, Default)]
pub struct DefaultStore<V> {
    data: RefCell<Vec<V>>,
}

impl<V> DefaultStore<V> {
    pub fn new() -> Self {
        Self { data: RefCell::new(Vec::new()) }
    }

    /// Consume the store, returning its contents as a plain `Vec` in the
    /// same dense key order `create` assigned them. Used at `build()` time
    /// to hand the finished table off to an `IndexVec`-backed `Function`.
    pub fn into_vec(self) -> Vec<V> {
        self.data.into_inner()
    }

    /// Inherent `len`/`is_empty`, shadowing the trait's: `Store<K, V>` is
    /// implemented for every `K: Idx`, so a bare `store.len()` with no
    /// key-bearing argument to pin `K` down would otherwise be ambiguous at
    /// every call site.
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Idx, V> Store<K, V> for DefaultStore<V> {
    fn internal_data(&self) -> &RefCell<Vec<V>> {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use index_vec::define_index_type;

    use super::*;

    define_index_type! { pub struct TestKey = u32; }

    #[test]
    fn create_returns_dense_keys() {
        let store: DefaultStore<&'static str> = DefaultStore::new();
        let a: TestKey = store.create("a");
        let b: TestKey = store.create("b");

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(store.map_fast(a, |v| *v), "a");
        assert_eq!(store.map_fast(b, |v| *v), "b");
    }

    #[test]
    fn map_many_fast_borrows_all_at_once() {
        let store: DefaultStore<i32> = DefaultStore::new();
        let a: TestKey = store.create(1);
        let b: TestKey = store.create(2);

        let sum = store.map_many_fast([a, b], |values| values.iter().copied().sum::<i32>());
        assert_eq!(sum, 3);
    }

    #[test]
    fn modify_fast_mutates_in_place() {
        let store: DefaultStore<Vec<i32>> = DefaultStore::new();
        let a: TestKey = store.create(Vec::new());
        store.modify_fast(a, |v| v.push(1));
        store.modify_fast(a, |v| v.push(2));
        assert_eq!(store.map_fast(a, |v| v.clone()), vec![1, 2]);
    }

    #[test]
    fn into_vec_preserves_key_order() {
        let store: DefaultStore<&'static str> = DefaultStore::new();
        let _a: TestKey = store.create("a");
        let _b: TestKey = store.create("b");
        assert_eq!(store.into_vec(), vec!["a", "b"]);
    }
}
