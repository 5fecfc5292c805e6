// Call ledger
//
// This module provides the append-only, thread-safe log of invocations that
// backs spying: recording, filtered retrieval, and live subscriptions.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use mimic_error::{abort, LedgerError};

use crate::call::{downcast_call, is_call_of, ErasedCall, RecordedCall, Timestamp};
use crate::signature::Signature;

pub mod filter;
pub mod snapshot;
pub mod subscription;

pub use filter::CallFilter;
pub use snapshot::CallSummary;
pub use subscription::CallStream;

use subscription::{Delivery, Subscription};

/// Shared handle to a call ledger.
///
/// Cloning the handle shares the underlying log. Ids start at 1 and increase
/// by one per recorded call; timestamps strictly increase in append order.
#[derive(Clone)]
pub struct Ledger {
    shared: Arc<LedgerShared>,
}

pub(crate) struct LedgerShared {
    owner: String,
    epoch: Instant,
    state: Mutex<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    calls: Vec<Arc<dyn ErasedCall>>,
    subscriptions: Vec<Subscription>,
    last_time: Option<Timestamp>,
    next_subscription_id: u64,
}

impl LedgerShared {
    pub(crate) fn remove_subscription(&self, id: u64) {
        let mut state = self.state.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|subscription| subscription.id != id);
        if state.subscriptions.len() != before {
            tracing::debug!(owner = %self.owner, subscription = id, "subscription removed");
        }
    }
}

// Smallest time after `last` that honours `proposed`; `Err(last)` when exhausted
fn next_time(last: Option<Timestamp>, proposed: Timestamp) -> Result<Timestamp, Timestamp> {
    match last {
        Some(last) if proposed <= last => last.0.checked_add(1).map(Timestamp).ok_or(last),
        _ => Ok(proposed),
    }
}

impl Ledger {
    /// Create an empty ledger for the named mock
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(LedgerShared {
                owner: owner.into(),
                epoch: Instant::now(),
                state: Mutex::new(LedgerState::default()),
            }),
        }
    }

    /// Name of the mock owning this ledger
    pub fn owner(&self) -> &str {
        &self.shared.owner
    }

    /// Record a call stamped with the ledger's monotonic clock
    pub fn record<I, O>(&self, signature: impl Into<Signature>, input: I) -> Arc<RecordedCall<I, O>>
    where
        I: fmt::Debug + Send + Sync + 'static,
        O: 'static,
    {
        self.append(signature.into(), input, None)
    }

    /// Record a call at an explicit time.
    ///
    /// Times that do not advance past the last recorded call are bumped so
    /// that timestamps keep strictly increasing. Aborts once the last call
    /// sits at `u64::MAX`, since no later time exists.
    pub fn record_at<I, O>(
        &self,
        signature: impl Into<Signature>,
        input: I,
        time: Timestamp,
    ) -> Arc<RecordedCall<I, O>>
    where
        I: fmt::Debug + Send + Sync + 'static,
        O: 'static,
    {
        self.append(signature.into(), input, Some(time))
    }

    fn append<I, O>(
        &self,
        signature: Signature,
        input: I,
        requested: Option<Timestamp>,
    ) -> Arc<RecordedCall<I, O>>
    where
        I: fmt::Debug + Send + Sync + 'static,
        O: 'static,
    {
        if signature.is_abbreviated() {
            abort(&LedgerError::AbbreviatedSignature {
                owner: self.shared.owner.clone(),
                signature: signature.to_string(),
            });
        }

        let mut state = self.shared.state.lock();

        let proposed = requested.unwrap_or_else(|| self.now());
        let time = match next_time(state.last_time, proposed) {
            Ok(time) => time,
            Err(last) => {
                drop(state);
                abort(&LedgerError::ClockExhausted {
                    owner: self.shared.owner.clone(),
                    last: last.0,
                })
            }
        };
        let id = state.calls.len() as u64 + 1;

        let call = Arc::new(RecordedCall::<I, O>::new(signature, input, time, id));
        let erased: Arc<dyn ErasedCall> = call.clone();
        state.calls.push(Arc::clone(&erased));
        state.last_time = Some(time);

        state
            .subscriptions
            .retain(|subscription| subscription.offer(&erased) != Delivery::Closed);

        tracing::debug!(
            owner = %self.shared.owner,
            id,
            signature = %call.signature(),
            "call recorded"
        );
        call
    }

    fn now(&self) -> Timestamp {
        Timestamp(self.shared.epoch.elapsed().as_nanos() as u64)
    }

    /// All recorded calls in recording order
    pub fn calls(&self) -> Vec<Arc<dyn ErasedCall>> {
        self.shared.state.lock().calls.clone()
    }

    /// Calls whose signature matches, in recording order
    pub fn calls_matching(&self, signature: impl Into<Signature>) -> Vec<Arc<dyn ErasedCall>> {
        let signature = signature.into();
        self.shared
            .state
            .lock()
            .calls
            .iter()
            .filter(|call| signature.matches(call.signature()))
            .cloned()
            .collect()
    }

    /// Calls whose signature matches and that can be presented as `(I, O)`
    pub fn calls_matching_typed<I, O>(
        &self,
        signature: impl Into<Signature>,
    ) -> Vec<Arc<RecordedCall<I, O>>>
    where
        I: Clone + Send + Sync + 'static,
        O: 'static,
    {
        let signature = signature.into();
        self.shared
            .state
            .lock()
            .calls
            .iter()
            .filter(|call| signature.matches(call.signature()))
            .filter_map(downcast_call::<I, O>)
            .collect()
    }

    /// Calls selected by an arbitrary filter
    pub fn filter(&self, filter: &CallFilter) -> Vec<Arc<dyn ErasedCall>> {
        let state = self.shared.state.lock();
        let matching = state.calls.iter().filter(|call| filter.matches(call.as_ref()));
        match filter.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.shared.state.lock().calls.len()
    }

    pub fn call_count_matching(&self, signature: impl Into<Signature>) -> usize {
        let signature = signature.into();
        self.shared
            .state
            .lock()
            .calls
            .iter()
            .filter(|call| signature.matches(call.signature()))
            .count()
    }

    pub fn first_call(&self) -> Option<Arc<dyn ErasedCall>> {
        self.shared.state.lock().calls.first().cloned()
    }

    pub fn last_call(&self) -> Option<Arc<dyn ErasedCall>> {
        self.shared.state.lock().calls.last().cloned()
    }

    /// The call recorded right after `previous`, if any
    pub fn call_after(&self, previous: &dyn ErasedCall) -> Option<Arc<dyn ErasedCall>> {
        let state = self.shared.state.lock();
        let position = state.calls.iter().position(|call| {
            call.id() == previous.id()
                && call.time() == previous.time()
                && call.signature() == previous.signature()
        })?;
        state.calls.get(position + 1).cloned()
    }

    /// Subscribe to every call matching the signature
    pub fn subscribe(&self, signature: impl Into<Signature>) -> CallStream<Arc<dyn ErasedCall>> {
        self.subscribe_with(signature.into(), |call| Some(Arc::clone(call)))
    }

    /// Subscribe to calls matching the signature that can be presented as `(I, O)`
    pub fn subscribe_typed<I, O>(
        &self,
        signature: impl Into<Signature>,
    ) -> CallStream<Arc<RecordedCall<I, O>>>
    where
        I: Clone + Send + Sync + 'static,
        O: 'static,
    {
        self.subscribe_with(signature.into(), |call| {
            if is_call_of::<I, O>(call.as_ref()) {
                downcast_call::<I, O>(call)
            } else {
                None
            }
        })
    }

    fn subscribe_with<T, F>(&self, signature: Signature, convert: F) -> CallStream<T>
    where
        T: Send + 'static,
        F: Fn(&Arc<dyn ErasedCall>) -> Option<T> + Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut state = self.shared.state.lock();

        // Replay and registration happen under one lock so no call is
        // delivered twice or missed.
        for call in state
            .calls
            .iter()
            .filter(|call| signature.matches(call.signature()))
        {
            if let Some(item) = convert(call) {
                let _ = sender.send(item);
            }
        }

        let id = state.next_subscription_id;
        state.next_subscription_id += 1;

        let sink = move |call: &Arc<dyn ErasedCall>| {
            if sender.is_closed() {
                return Delivery::Closed;
            }
            match convert(call) {
                Some(item) => match sender.send(item) {
                    Ok(()) => Delivery::Sent,
                    Err(_) => Delivery::Closed,
                },
                None => Delivery::Skipped,
            }
        };
        state.subscriptions.push(Subscription {
            id,
            signature: signature.clone(),
            sink: Box::new(sink),
        });
        drop(state);

        tracing::debug!(
            owner = %self.shared.owner,
            subscription = id,
            signature = %signature,
            "subscription added"
        );
        CallStream::new(receiver, Arc::downgrade(&self.shared), id, signature)
    }

    /// Number of live subscriptions
    pub fn subscription_count(&self) -> usize {
        self.shared.state.lock().subscriptions.len()
    }

    /// Multi-line rendering of every recorded call, one per line
    pub fn dump(&self) -> String {
        let state = self.shared.state.lock();
        if state.calls.is_empty() {
            return "(no calls recorded)".to_string();
        }
        state
            .calls
            .iter()
            .map(|call| call.debug_description())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serializable summary of every recorded call
    pub fn snapshot(&self) -> Vec<CallSummary> {
        self.shared
            .state
            .lock()
            .calls
            .iter()
            .map(|call| CallSummary::from_call(call.as_ref()))
            .collect()
    }

    /// JSON rendering of `snapshot()`
    pub fn dump_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new("mock")
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("owner", &self.shared.owner)
            .field("calls", &self.call_count())
            .finish()
    }
}
