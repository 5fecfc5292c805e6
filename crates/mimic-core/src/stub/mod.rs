// Stub registry
//
// Maps (signature, input type, output type) to a resolution strategy. Lookups
// try the exact key first and then the key with the abbreviated signature.
// An abbreviated registration therefore answers every overload sharing the
// name, which tests rely on even though it can hide a mistyped signature.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use mimic_error::{abort, StubError, StubResult};

use crate::call::TypeTag;
use crate::signature::Signature;

pub mod entry;
pub mod key;
pub mod property;

pub use entry::{FallibleStubFn, StubFn};
pub use key::StubKey;
pub use property::Property;

use entry::StubEntry;

/// Thread-safe store of stubbed behaviour for one mock
pub struct StubRegistry {
    owner: String,
    entries: Mutex<HashMap<StubKey, StubEntry>>,
}

impl StubRegistry {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn insert(&self, key: StubKey, entry: StubEntry) {
        tracing::debug!(
            owner = %self.owner,
            stub = ?key,
            strategy = %entry.describe(),
            "stub registered"
        );
        // Last write wins.
        self.entries.lock().insert(key, entry);
    }

    /// Return `output` for every matching call
    pub fn register_output<I, O>(&self, signature: impl Into<Signature>, output: O)
    where
        I: 'static,
        O: Clone + Send + Sync + 'static,
    {
        self.insert(StubKey::of::<I, O>(signature), StubEntry::output(output));
    }

    /// Fail every matching call with `error`
    pub fn register_error<I, O, E>(&self, signature: impl Into<Signature>, error: E)
    where
        I: 'static,
        O: 'static,
        E: fmt::Display + Clone + Send + Sync + 'static,
    {
        self.insert(StubKey::of::<I, O>(signature), StubEntry::error(error));
    }

    /// Compute the output from the input on every matching call
    pub fn register_dynamic<I, O, F>(&self, signature: impl Into<Signature>, closure: F)
    where
        I: 'static,
        O: 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        let closure: StubFn<I, O> = Arc::new(closure);
        self.insert(StubKey::of::<I, O>(signature), StubEntry::closure(closure));
    }

    /// Compute the output or an error from the input on every matching call
    pub fn register_dynamic_fallible<I, O, E, F>(&self, signature: impl Into<Signature>, closure: F)
    where
        I: 'static,
        O: 'static,
        E: 'static,
        F: Fn(I) -> Result<O, E> + Send + Sync + 'static,
    {
        let closure: FallibleStubFn<I, O, E> = Arc::new(closure);
        self.insert(
            StubKey::of::<I, O>(signature),
            StubEntry::fallible_closure(closure),
        );
    }

    /// Exact key first, then the abbreviated key.
    ///
    /// The entry is cloned out so no lock is held while a closure runs.
    fn lookup(&self, key: &StubKey) -> Result<StubEntry, StubError> {
        let entries = self.entries.lock();
        if let Some(entry) = entries.get(key) {
            return Ok(entry.clone());
        }
        if let Some(entry) = entries.get(&key.abbreviated()) {
            return Ok(entry.clone());
        }
        let registry_empty = entries.is_empty();
        drop(entries);

        Err(StubError::NoStub {
            owner: self.owner.clone(),
            signature: key.signature.to_string(),
            input_type: key.input.name(),
            output_type: key.output.name(),
            registry_empty,
            registry_dump: if registry_empty { String::new() } else { self.dump() },
        })
    }

    /// Resolve a value for a member that cannot fail.
    ///
    /// Any failure aborts: such a member has no way to report it, and
    /// returning a wrong value would corrupt the test.
    #[track_caller]
    pub fn resolve<I, O>(&self, signature: impl Into<Signature>, input: I) -> O
    where
        I: 'static,
        O: Clone + Send + Sync + 'static,
    {
        match self.try_resolve(signature, input) {
            Ok(output) => output,
            Err(err) => abort(&err),
        }
    }

    /// Resolve a value for a member that cannot fail, reporting failures
    pub fn try_resolve<I, O>(&self, signature: impl Into<Signature>, input: I) -> StubResult<O>
    where
        I: 'static,
        O: Clone + Send + Sync + 'static,
    {
        let key = StubKey::of::<I, O>(signature);
        tracing::trace!(owner = %self.owner, stub = ?key, "resolving");
        match self.lookup(&key)? {
            StubEntry::Output(value) => cast_output::<O>(&key, &value),
            StubEntry::Closure(closure) => Ok(cast_closure::<I, O>(&key, &closure)?(input)),
            StubEntry::Error { .. } | StubEntry::FallibleClosure { .. } => {
                Err(StubError::ErrorOnInfalliblePath {
                    signature: key.signature.to_string(),
                })
            }
        }
    }

    /// Resolve a value for a member that can fail.
    ///
    /// Stubbed errors and closure errors propagate to the caller, as does a
    /// missing stub. Internal type faults still abort.
    #[track_caller]
    pub fn resolve_fallible<I, O, E>(
        &self,
        signature: impl Into<Signature>,
        input: I,
    ) -> Result<O, E>
    where
        I: 'static,
        O: Clone + Send + Sync + 'static,
        E: From<StubError> + Clone + 'static,
    {
        let key = StubKey::of::<I, O>(signature);
        tracing::trace!(owner = %self.owner, stub = ?key, "resolving fallible");
        let entry = self.lookup(&key).map_err(E::from)?;
        match entry {
            StubEntry::Output(value) => match cast_output::<O>(&key, &value) {
                Ok(output) => Ok(output),
                Err(err) => abort(&err),
            },
            StubEntry::Closure(closure) => match cast_closure::<I, O>(&key, &closure) {
                Ok(closure) => Ok(closure(input)),
                Err(err) => abort(&err),
            },
            StubEntry::Error {
                error, error_type, ..
            } => match error.downcast_ref::<E>() {
                Some(error) => Err(error.clone()),
                None => Err(E::from(StubError::IncorrectErrorType {
                    signature: key.signature.to_string(),
                    expected: TypeTag::of::<E>().name(),
                    found: error_type.name(),
                })),
            },
            StubEntry::FallibleClosure {
                closure,
                error_type,
            } => match closure.downcast_ref::<FallibleStubFn<I, O, E>>() {
                Some(closure) => closure(input),
                None if error_type != TypeTag::of::<E>() => {
                    Err(E::from(StubError::IncorrectErrorType {
                        signature: key.signature.to_string(),
                        expected: TypeTag::of::<E>().name(),
                        found: error_type.name(),
                    }))
                }
                None => abort(&StubError::IncorrectClosureType {
                    signature: key.signature.to_string(),
                    expected: std::any::type_name::<FallibleStubFn<I, O, E>>().to_string(),
                }),
            },
        }
    }

    /// Whether any strategy would answer this lookup
    pub fn has_stub<I: 'static, O: 'static>(&self, signature: impl Into<Signature>) -> bool {
        let key = StubKey::of::<I, O>(signature);
        let entries = self.entries.lock();
        entries.contains_key(&key) || entries.contains_key(&key.abbreviated())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// One line per registered stub, sorted by signature then types
    pub fn dump(&self) -> String {
        let entries = self.entries.lock();
        if entries.is_empty() {
            return "(no stubs registered)".to_string();
        }
        let mut lines: Vec<_> = entries
            .iter()
            .map(|(key, entry)| {
                let line = format!("{:?}, strategy: {}", key, entry.describe());
                (key.sort_key(), line)
            })
            .collect();
        lines.sort_by(|a, b| a.0.cmp(&b.0));
        lines
            .into_iter()
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for StubRegistry {
    fn default() -> Self {
        Self::new("mock")
    }
}

impl fmt::Debug for StubRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubRegistry")
            .field("owner", &self.owner)
            .field("stubs", &self.len())
            .finish()
    }
}

fn cast_output<O: Clone + 'static>(key: &StubKey, value: &entry::Erased) -> StubResult<O> {
    value
        .downcast_ref::<O>()
        .cloned()
        .ok_or_else(|| StubError::IncorrectOutputType {
            signature: key.signature.to_string(),
            expected: key.output.name(),
        })
}

fn cast_closure<I: 'static, O: 'static>(
    key: &StubKey,
    closure: &entry::Erased,
) -> StubResult<StubFn<I, O>> {
    closure
        .downcast_ref::<StubFn<I, O>>()
        .cloned()
        .ok_or_else(|| StubError::IncorrectClosureType {
            signature: key.signature.to_string(),
            expected: std::any::type_name::<StubFn<I, O>>().to_string(),
        })
}
