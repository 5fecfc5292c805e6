// Property stubs
//
// Properties reuse the stub registry, keyed by the property name with a unit
// input. Reads are recorded as `name()`, writes as `set_name(_:)`.

use std::fmt;
use std::marker::PhantomData;

use mimic_error::StubResult;

use crate::ledger::Ledger;
use crate::signature::Signature;
use crate::stub::StubRegistry;

/// Accessor pair for one stubbed property of type `T`
pub struct Property<'a, T> {
    name: String,
    stubs: &'a StubRegistry,
    ledger: &'a Ledger,
    _value: PhantomData<fn() -> T>,
}

impl<'a, T> Property<'a, T>
where
    T: Clone + fmt::Debug + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, stubs: &'a StubRegistry, ledger: &'a Ledger) -> Self {
        Self {
            name: name.into(),
            stubs,
            ledger,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signature recorded for reads
    pub fn getter_signature(&self) -> Signature {
        Signature::new(format!("{}()", self.name))
    }

    /// Signature recorded for writes
    pub fn setter_signature(&self) -> Signature {
        Signature::new(format!("set_{}(_:)", self.name))
    }

    /// Stub the value returned by reads without recording a write
    pub fn stub(&self, value: T) {
        self.stubs
            .register_output::<(), T>(self.name.as_str(), value);
    }

    /// Read the property; aborts when no value was stubbed or set
    #[track_caller]
    pub fn get(&self) -> T {
        self.ledger.record::<(), T>(self.getter_signature(), ());
        self.stubs.resolve::<(), T>(self.name.as_str(), ())
    }

    /// Read the property, reporting a missing value
    pub fn try_get(&self) -> StubResult<T> {
        self.ledger.record::<(), T>(self.getter_signature(), ());
        self.stubs.try_resolve::<(), T>(self.name.as_str(), ())
    }

    /// Write the property; later reads return `value`
    pub fn set(&self, value: T) {
        self.ledger.record::<T, ()>(self.setter_signature(), value.clone());
        self.stub(value);
    }
}
