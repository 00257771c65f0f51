use std::any::Any;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Typed key into a [`Blackboard`].
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    id: u64,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> BbKey<T> {
    pub const fn new(id: u64) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    pub fn id(self) -> u64 {
        self.id
    }
}

/// Heterogeneous per-context storage.
///
/// Each execution context owns one blackboard; custom leaves keep their scratch data here and
/// hosts install trace sinks into it. Values must be `Send` so a context can be handed to
/// another thread between frames.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<u64, Box<dyn Any + Send>>,
}

fn mismatch(id: u64) -> ! {
    panic!("blackboard type mismatch for key id={id} (stored type differs from requested)")
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn contains<T: 'static>(&self, key: BbKey<T>) -> bool {
        self.values.contains_key(&key.id)
    }

    pub fn set<T: Send + 'static>(&mut self, key: BbKey<T>, value: T) {
        self.values.insert(key.id, Box::new(value));
    }

    pub fn get<T: 'static>(&self, key: BbKey<T>) -> Option<&T> {
        let value = self.values.get(&key.id)?;
        match value.downcast_ref::<T>() {
            Some(v) => Some(v),
            None => mismatch(key.id),
        }
    }

    pub fn get_mut<T: 'static>(&mut self, key: BbKey<T>) -> Option<&mut T> {
        let value = self.values.get_mut(&key.id)?;
        match value.downcast_mut::<T>() {
            Some(v) => Some(v),
            None => mismatch(key.id),
        }
    }

    pub fn get_or_insert_with<T, F>(&mut self, key: BbKey<T>, make: F) -> &mut T
    where
        T: Send + 'static,
        F: FnOnce() -> T,
    {
        let value = self
            .values
            .entry(key.id)
            .or_insert_with(|| Box::new(make()));
        match value.downcast_mut::<T>() {
            Some(v) => v,
            None => mismatch(key.id),
        }
    }

    pub fn remove<T: 'static>(&mut self, key: BbKey<T>) -> Option<T> {
        let value = self.values.remove(&key.id)?;
        match value.downcast::<T>() {
            Ok(v) => Some(*v),
            Err(_) => mismatch(key.id),
        }
    }
}
