// Stub entries
//
// A registered resolution strategy. Values, errors and closures are stored
// type-erased; the registry casts them back using the types of the lookup.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::call::TypeTag;

pub(crate) type Erased = Arc<dyn Any + Send + Sync>;

/// Closure shape stored for members that cannot fail
pub type StubFn<I, O> = Arc<dyn Fn(I) -> O + Send + Sync>;

/// Closure shape stored for members that can fail
pub type FallibleStubFn<I, O, E> = Arc<dyn Fn(I) -> Result<O, E> + Send + Sync>;

#[derive(Clone)]
pub(crate) enum StubEntry {
    /// Fixed value, holds an `O`
    Output(Erased),
    /// Fixed error, holds an `E`
    Error {
        error: Erased,
        error_type: TypeTag,
        description: String,
    },
    /// Computed value, holds a `StubFn<I, O>`
    Closure(Erased),
    /// Computed value or error, holds a `FallibleStubFn<I, O, E>`
    FallibleClosure { closure: Erased, error_type: TypeTag },
}

impl StubEntry {
    pub(crate) fn output<O: Send + Sync + 'static>(output: O) -> Self {
        StubEntry::Output(Arc::new(output))
    }

    pub(crate) fn error<E>(error: E) -> Self
    where
        E: fmt::Display + Send + Sync + 'static,
    {
        let description = error.to_string();
        StubEntry::Error {
            error: Arc::new(error),
            error_type: TypeTag::of::<E>(),
            description,
        }
    }

    pub(crate) fn closure<I: 'static, O: 'static>(closure: StubFn<I, O>) -> Self {
        StubEntry::Closure(Arc::new(closure))
    }

    pub(crate) fn fallible_closure<I: 'static, O: 'static, E: 'static>(
        closure: FallibleStubFn<I, O, E>,
    ) -> Self {
        StubEntry::FallibleClosure {
            closure: Arc::new(closure),
            error_type: TypeTag::of::<E>(),
        }
    }

    /// Short description of the strategy for registry dumps
    pub(crate) fn describe(&self) -> String {
        match self {
            StubEntry::Output(_) => "returns fixed value".to_string(),
            StubEntry::Error {
                error_type,
                description,
                ..
            } => format!("fails with {}: {}", error_type, description),
            StubEntry::Closure(_) => "computed by closure".to_string(),
            StubEntry::FallibleClosure { error_type, .. } => {
                format!("computed by closure failing with {}", error_type)
            }
        }
    }
}
