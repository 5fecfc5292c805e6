// Recorded calls
//
// Each intercepted invocation becomes a `RecordedCall<I, O>`. The ledger stores
// them behind the `ErasedCall` trait so calls with different input and output
// types can share one ordered log; typed queries cast them back.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Runtime identity of an input or output type
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths removed, e.g. `Option<String>`
    pub fn name(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Strip module paths from every path segment of a type name
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for ch in full.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            segment.push(ch);
        } else {
            out.push_str(last_path_segment(&segment));
            segment.clear();
            out.push(ch);
        }
    }
    out.push_str(last_path_segment(&segment));
    out
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Monotonic call time, in nanoseconds since the owning ledger was created
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn as_nanos(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// One recorded invocation of a mocked member
pub struct RecordedCall<I, O> {
    signature: Signature,
    input: I,
    time: Timestamp,
    id: u64,
    _output: PhantomData<fn() -> O>,
}

impl<I, O> RecordedCall<I, O> {
    pub(crate) fn new(signature: Signature, input: I, time: Timestamp, id: u64) -> Self {
        Self {
            signature,
            input,
            time,
            id,
            _output: PhantomData,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// Ledger-assigned id, starting at 1
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<I: 'static, O: 'static> RecordedCall<I, O> {
    pub fn input_type(&self) -> TypeTag {
        TypeTag::of::<I>()
    }

    pub fn output_type(&self) -> TypeTag {
        TypeTag::of::<O>()
    }
}

impl<I: Clone, O> Clone for RecordedCall<I, O> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            input: self.input.clone(),
            time: self.time,
            id: self.id,
            _output: PhantomData,
        }
    }
}

impl<I: fmt::Debug + 'static, O: 'static> fmt::Debug for RecordedCall<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedCall")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("input", &self.input)
            .field("output_type", &TypeTag::of::<O>())
            .field("time", &self.time)
            .finish()
    }
}

/// Type-erased view of a recorded call, as stored by the ledger
pub trait ErasedCall: Send + Sync + 'static {
    fn signature(&self) -> &Signature;

    fn id(&self) -> u64;

    fn time(&self) -> Timestamp;

    fn input_type(&self) -> TypeTag;

    fn output_type(&self) -> TypeTag;

    /// The recorded input as `Any`, for value-level casts
    fn input_any(&self) -> &dyn Any;

    /// `Debug` rendering of the recorded input
    fn input_description(&self) -> String;

    /// Single-line rendering: signature, input, output type, time
    fn debug_description(&self) -> String {
        format!(
            "#{} signature: {}, input: {}, outputType: {}, time: {}",
            self.id(),
            self.signature(),
            self.input_description(),
            self.output_type(),
            self.time()
        )
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<I, O> ErasedCall for RecordedCall<I, O>
where
    I: fmt::Debug + Send + Sync + 'static,
    O: 'static,
{
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn time(&self) -> Timestamp {
        self.time
    }

    fn input_type(&self) -> TypeTag {
        TypeTag::of::<I>()
    }

    fn output_type(&self) -> TypeTag {
        TypeTag::of::<O>()
    }

    fn input_any(&self) -> &dyn Any {
        &self.input
    }

    fn input_description(&self) -> String {
        format!("{:?}", self.input)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

impl fmt::Debug for dyn ErasedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug_description())
    }
}

/// An input whose static type was erased when the call was recorded.
///
/// Generated code records parameters typed as trait objects through this
/// wrapper. Queries may later ask for the concrete type the value actually
/// has, and the ledger will present the call in that shape.
#[derive(Clone)]
pub struct DynInput {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    description: String,
}

impl DynInput {
    pub fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + Send + Sync + 'static,
    {
        let description = format!("{:?}", value);
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            description,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Name of the concrete type held
    pub fn type_name(&self) -> String {
        short_type_name(self.type_name)
    }
}

impl fmt::Debug for DynInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Cast an erased call to a concrete `RecordedCall<I, O>`.
///
/// Calls recorded with exactly `(I, O)` are shared as-is. Calls recorded with
/// a `DynInput` holding an `I` are synthesized into the requested shape,
/// keeping their id, time and signature.
pub fn downcast_call<I, O>(call: &Arc<dyn ErasedCall>) -> Option<Arc<RecordedCall<I, O>>>
where
    I: Clone + Send + Sync + 'static,
    O: 'static,
{
    if call.output_type() != TypeTag::of::<O>() {
        return None;
    }
    if call.input_type() == TypeTag::of::<I>() {
        return Arc::clone(call)
            .into_any()
            .downcast::<RecordedCall<I, O>>()
            .ok();
    }
    let dynamic = call.input_any().downcast_ref::<DynInput>()?;
    let input = dynamic.downcast_ref::<I>()?.clone();
    Some(Arc::new(RecordedCall::new(
        call.signature().clone(),
        input,
        call.time(),
        call.id(),
    )))
}

/// Whether an erased call can be presented as `RecordedCall<I, O>`
pub fn is_call_of<I: 'static, O: 'static>(call: &dyn ErasedCall) -> bool {
    if call.output_type() != TypeTag::of::<O>() {
        return false;
    }
    if call.input_type() == TypeTag::of::<I>() {
        return true;
    }
    call.input_any()
        .downcast_ref::<DynInput>()
        .map_or(false, |dynamic| dynamic.downcast_ref::<I>().is_some())
}
