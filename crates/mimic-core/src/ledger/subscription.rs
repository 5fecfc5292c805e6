// Live call subscriptions
//
// A subscription pairs a signature with a sink closure. The ledger hands every
// newly recorded call whose signature matches to the sink while holding its
// lock; the sink performs any type check itself and forwards the call into an
// unbounded channel owned by a `CallStream`.

use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::call::ErasedCall;
use crate::ledger::LedgerShared;
use crate::signature::Signature;

/// Outcome of handing one call to a subscription sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Sent,
    Skipped,
    Closed,
}

pub(crate) type Sink = Box<dyn Fn(&Arc<dyn ErasedCall>) -> Delivery + Send + Sync>;

pub(crate) struct Subscription {
    pub(crate) id: u64,
    pub(crate) signature: Signature,
    pub(crate) sink: Sink,
}

impl Subscription {
    /// Deliver a call if its signature matches
    pub(crate) fn offer(&self, call: &Arc<dyn ErasedCall>) -> Delivery {
        if self.signature.matches(call.signature()) {
            (self.sink)(call)
        } else {
            Delivery::Skipped
        }
    }
}

/// Stream of calls matching a subscription.
///
/// Yields every matching call that was already recorded when the stream was
/// created, in order, then each new matching call as it is recorded. Dropping
/// the stream removes the subscription from the ledger.
pub struct CallStream<T> {
    receiver: UnboundedReceiver<T>,
    ledger: Weak<LedgerShared>,
    subscription_id: u64,
    signature: Signature,
}

impl<T> CallStream<T> {
    pub(crate) fn new(
        receiver: UnboundedReceiver<T>,
        ledger: Weak<LedgerShared>,
        subscription_id: u64,
        signature: Signature,
    ) -> Self {
        Self {
            receiver,
            ledger,
            subscription_id,
            signature,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Take the next buffered call without waiting
    pub fn try_next(&mut self) -> Option<T> {
        match self.receiver.try_recv() {
            Ok(call) => Some(call),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain every buffered call without waiting
    pub fn drain(&mut self) -> Vec<T> {
        let mut calls = Vec::new();
        while let Some(call) = self.try_next() {
            calls.push(call);
        }
        calls
    }

    /// Stop listening; buffered calls can still be drained afterwards
    pub fn cancel(&mut self) {
        self.receiver.close();
        self.unsubscribe();
    }

    fn unsubscribe(&self) {
        if let Some(ledger) = self.ledger.upgrade() {
            ledger.remove_subscription(self.subscription_id);
        }
    }
}

impl<T> Stream for CallStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for CallStream<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
