// Scoped static registry
//
// Static members of a mocked type share one `Mock` per Rust type. A test
// provisions that mock through an explicit `StaticRegistry` and holds the
// returned `StaticScope` token; dropping the token tears the mock down.
// Provisioning the same type again replaces the previous token's mock.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;

use mimic_error::{abort, not_provisioned_error, ScopeError, ScopeResult};

use crate::call::TypeTag;
use crate::config::MockConfig;
use crate::mock::Mock;

struct Slot {
    generation: u64,
    mock: Mock,
}

#[derive(Default)]
struct RegistryState {
    slots: HashMap<TypeTag, Slot>,
    next_generation: u64,
}

/// Per-type mocks for static members, shared by clones of the handle
#[derive(Clone, Default)]
pub struct StaticRegistry {
    state: Arc<Mutex<RegistryState>>,
    config: MockConfig,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose provisioned mocks use `config`
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            state: Arc::default(),
            config,
        }
    }

    /// Provision a fresh mock for `T`.
    ///
    /// Any token already alive for `T` becomes invalid; its drop no longer
    /// removes the new mock.
    pub fn provision<T: ?Sized + 'static>(&self) -> StaticScope<T> {
        let tag = TypeTag::of::<T>();
        let mock = Mock::with_config(tag.name(), self.config.clone());

        let mut state = self.state.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        let replaced = state
            .slots
            .insert(
                tag,
                Slot {
                    generation,
                    mock: mock.clone(),
                },
            )
            .is_some();
        drop(state);

        tracing::debug!(type_name = %tag, generation, replaced, "static scope provisioned");
        StaticScope {
            registry: Arc::clone(&self.state),
            tag,
            generation,
            mock,
            _type: PhantomData,
        }
    }

    /// Mock for `T`, or an error naming the provisioning call
    pub fn try_mock_for<T: ?Sized + 'static>(&self) -> ScopeResult<Mock> {
        let tag = TypeTag::of::<T>();
        self.state
            .lock()
            .slots
            .get(&tag)
            .map(|slot| slot.mock.clone())
            .ok_or_else(|| not_provisioned_error(tag.name()))
    }

    /// Mock for `T`; aborts when no scope is provisioned
    #[track_caller]
    pub fn mock_for<T: ?Sized + 'static>(&self) -> Mock {
        match self.try_mock_for::<T>() {
            Ok(mock) => mock,
            Err(err) => abort(&err),
        }
    }

    pub fn is_provisioned<T: ?Sized + 'static>(&self) -> bool {
        self.state.lock().slots.contains_key(&TypeTag::of::<T>())
    }

    /// Number of types with a live scope
    pub fn len(&self) -> usize {
        self.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().slots.is_empty()
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let mut types: Vec<String> = state.slots.keys().map(TypeTag::name).collect();
        types.sort();
        f.debug_struct("StaticRegistry")
            .field("provisioned", &types)
            .finish()
    }
}

/// Token keeping the static mock for `T` alive
pub struct StaticScope<T: ?Sized> {
    registry: Arc<Mutex<RegistryState>>,
    tag: TypeTag,
    generation: u64,
    mock: Mock,
    _type: PhantomData<fn() -> Box<T>>,
}

impl<T: ?Sized> StaticScope<T> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether this token still owns the registry entry for `T`
    pub fn is_valid(&self) -> bool {
        self.registry
            .lock()
            .slots
            .get(&self.tag)
            .map_or(false, |slot| slot.generation == self.generation)
    }

    /// The provisioned mock, unless a newer scope replaced it
    pub fn try_mock(&self) -> ScopeResult<&Mock> {
        if self.is_valid() {
            Ok(&self.mock)
        } else {
            Err(ScopeError::Invalidated {
                type_name: self.tag.name(),
            })
        }
    }

    /// The provisioned mock; aborts if a newer scope replaced it
    #[track_caller]
    pub fn mock(&self) -> &Mock {
        match self.try_mock() {
            Ok(mock) => mock,
            Err(err) => abort(&err),
        }
    }

    /// Tear the scope down now instead of at the end of the enclosing block
    pub fn end(self) {}
}

impl<T: ?Sized> Drop for StaticScope<T> {
    fn drop(&mut self) {
        let mut state = self.registry.lock();
        let owned = state
            .slots
            .get(&self.tag)
            .map_or(false, |slot| slot.generation == self.generation);
        if owned {
            state.slots.remove(&self.tag);
            tracing::debug!(
                type_name = %self.tag,
                generation = self.generation,
                "static scope torn down"
            );
        }
    }
}

impl<T: ?Sized> fmt::Debug for StaticScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticScope")
            .field("type", &self.tag)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock;
    struct Calendar;

    #[test]
    fn test_provision_and_teardown() {
        let registry = StaticRegistry::new();
        assert!(!registry.is_provisioned::<Clock>());

        let scope = registry.provision::<Clock>();
        assert!(scope.is_valid());
        assert_eq!(scope.mock().name(), "Clock");
        registry
            .mock_for::<Clock>()
            .stub_output::<(), u64>("now()", 1_700_000_000);
        assert_eq!(scope.mock().invoke::<(), u64>("now()", ()), 1_700_000_000);

        drop(scope);
        assert!(registry.is_empty());
        assert!(matches!(
            registry.try_mock_for::<Clock>(),
            Err(ScopeError::NotProvisioned { .. })
        ));
    }

    #[test]
    fn test_new_token_invalidates_old() {
        let registry = StaticRegistry::new();
        let first = registry.provision::<Clock>();
        first.mock().record("tick()", ());

        let second = registry.provision::<Clock>();
        assert!(!first.is_valid());
        assert!(second.is_valid());
        assert!(second.generation() > first.generation());
        assert!(matches!(first.try_mock(), Err(ScopeError::Invalidated { .. })));

        // The replaced token must not tear down its successor.
        drop(first);
        assert!(registry.is_provisioned::<Clock>());
        assert_eq!(registry.mock_for::<Clock>().ledger().call_count(), 0);

        second.end();
        assert!(!registry.is_provisioned::<Clock>());
    }

    #[test]
    fn test_types_are_isolated() {
        let registry = StaticRegistry::new();
        let _clock = registry.provision::<Clock>();
        let _calendar = registry.provision::<Calendar>();
        assert_eq!(registry.len(), 2);

        registry.mock_for::<Clock>().record("tick()", ());
        assert_eq!(registry.mock_for::<Calendar>().ledger().call_count(), 0);
    }

    #[test]
    #[should_panic(expected = "call StaticRegistry::provision::<Clock>()")]
    fn test_unprovisioned_use_aborts() {
        let registry = StaticRegistry::new();
        registry.mock_for::<Clock>();
    }

    #[test]
    fn test_config_is_applied() {
        let registry = StaticRegistry::with_config(MockConfig::new().with_exclusive(false));
        let scope = registry.provision::<Clock>();
        assert!(!scope.mock().config().exclusive_by_default);
    }
}
