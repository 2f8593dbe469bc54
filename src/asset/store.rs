use std::marker::PhantomData;

/// Typed index into an [`AssetStore`].
///
/// Handles are plain indices: cheap to copy, hashable, and shared freely
/// across scene nodes. Every node holding the same material handle aliases
/// the same stored instance, so mutating it through the store is visible
/// everywhere at once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Handle<T> {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Append-only store of assets addressed by [`Handle`].
pub struct AssetStore<T> {
    items: Vec<T>,
}

impl<T> AssetStore<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn insert(&mut self, item: T) -> Handle<T> {
        let index = self.items.len();
        self.items.push(item);
        Handle::new(index)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.items.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.items.get_mut(handle.index())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> Default for AssetStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_copy_and_stable() {
        let mut store: AssetStore<String> = AssetStore::new();
        let a = store.insert("a".to_string());
        let b = store.insert("b".to_string());
        let a2 = a;
        assert_eq!(store.get(a2).unwrap(), "a");
        assert_eq!(store.get(b).unwrap(), "b");
        assert_eq!(a.index(), a2.index());
    }

    #[test]
    fn shared_handle_sees_mutation() {
        let mut store: AssetStore<f32> = AssetStore::new();
        let shared = store.insert(1.0);
        let alias = shared;
        *store.get_mut(shared).unwrap() = 0.25;
        assert_eq!(*store.get(alias).unwrap(), 0.25);
    }
}
