//! Apply-locally / commit-remotely helper.
//!
//! An [`Optimistic`] value is created by writing the proposed value into a
//! store and remembering what it replaced. It must then be resolved exactly
//! once: [`Optimistic::reconcile`] after the remote side accepted (optionally
//! with its own confirmed value), or [`Optimistic::rollback`] to restore the
//! previous value.

/// Keyed storage an optimistic update can write into
pub trait OptimisticStore<K, V> {
  fn read(&self, key: &K) -> Option<V>;
  /// Returns false if the key no longer exists
  fn write(&mut self, key: &K, value: V) -> bool;
}

/// A locally applied, not yet confirmed change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimistic<K, V> {
  key: K,
  previous: V,
  proposed: V,
}

impl<K, V> Optimistic<K, V>
where
  V: Clone + PartialEq,
{
  /// Write `proposed` into the store.
  ///
  /// Returns `None` (and leaves the store untouched) if the key is unknown or
  /// already holds `proposed`.
  pub fn apply<S: OptimisticStore<K, V>>(store: &mut S, key: K, proposed: V) -> Option<Self> {
    let previous = store.read(&key)?;
    if previous == proposed {
      return None;
    }
    if !store.write(&key, proposed.clone()) {
      return None;
    }
    Some(Self {
      key,
      previous,
      proposed,
    })
  }

  pub fn key(&self) -> &K {
    &self.key
  }

  pub fn previous(&self) -> &V {
    &self.previous
  }

  pub fn proposed(&self) -> &V {
    &self.proposed
  }

  /// Settle on the remote side's value, or keep the proposed one when the
  /// remote did not report any. Returns the value left in the store.
  pub fn reconcile<S: OptimisticStore<K, V>>(self, store: &mut S, confirmed: Option<V>) -> V {
    let value = confirmed.unwrap_or(self.proposed);
    store.write(&self.key, value.clone());
    value
  }

  /// Restore the value the store held before `apply`. Returns it.
  pub fn rollback<S: OptimisticStore<K, V>>(self, store: &mut S) -> V {
    store.write(&self.key, self.previous.clone());
    self.previous
  }
}
