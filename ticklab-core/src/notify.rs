//! Completion notifier — exactly-once settlement, replayed to late
//! subscribers.
//!
//! A [`Notifier`] is handed back from order submission and settled by the
//! fulfillment step. It is deliberately stricter than a general-purpose
//! future: settlement happens at most once (a second attempt panics), every
//! handler runs synchronously on the settling call stack, and a handler
//! registered after settlement fires immediately with the stored payload.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Terminal state of a settled notifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The order was filled at a price.
    Filled(f64),
    /// The order was rejected with a reason.
    Rejected(String),
}

type FulfillHandler = Box<dyn FnMut(f64)>;
type RejectHandler = Box<dyn FnMut(&str)>;
type AlwaysHandler = Box<dyn FnMut(&Outcome)>;

#[derive(Default)]
struct Inner {
    outcome: Option<Outcome>,
    on_fulfill: Vec<FulfillHandler>,
    on_reject: Vec<RejectHandler>,
    on_always: Vec<AlwaysHandler>,
}

/// Cheap-clone handle to one order's settlement.
///
/// Single-threaded by design: handlers run to completion, in registration
/// order, inside the `fulfill`/`reject` call that triggers them.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Rc<RefCell<Inner>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored outcome, if settled.
    pub fn outcome(&self) -> Option<Outcome> {
        self.inner.borrow().outcome.clone()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.borrow().outcome.is_some()
    }

    /// Register a success handler, returning the notifier for chaining.
    /// If the notifier is already fulfilled, the handler fires immediately.
    pub fn on_fulfill(&self, mut handler: impl FnMut(f64) + 'static) -> &Self {
        let outcome = self.outcome();
        match outcome {
            Some(Outcome::Filled(price)) => handler(price),
            // Settled the other way: the handler can never fire.
            Some(Outcome::Rejected(_)) => {}
            None => self.inner.borrow_mut().on_fulfill.push(Box::new(handler)),
        }
        self
    }

    /// Register a failure handler, returning the notifier for chaining.
    /// If the notifier is already rejected, the handler fires immediately.
    pub fn on_reject(&self, mut handler: impl FnMut(&str) + 'static) -> &Self {
        let outcome = self.outcome();
        match outcome {
            Some(Outcome::Rejected(reason)) => handler(&reason),
            Some(Outcome::Filled(_)) => {}
            None => self.inner.borrow_mut().on_reject.push(Box::new(handler)),
        }
        self
    }

    /// Register a handler for either outcome, returning the notifier for
    /// chaining. Fires immediately if already settled.
    pub fn on_always(&self, mut handler: impl FnMut(&Outcome) + 'static) -> &Self {
        let outcome = self.outcome();
        match outcome {
            Some(outcome) => handler(&outcome),
            None => self.inner.borrow_mut().on_always.push(Box::new(handler)),
        }
        self
    }

    /// Settle successfully at `price`, invoking success handlers then
    /// always-handlers, each list in registration order.
    ///
    /// # Panics
    ///
    /// Panics if the notifier is already settled. Settlement is exactly-once
    /// by contract; a second attempt is a bug in the caller, not a
    /// recoverable condition.
    pub fn fulfill(&self, price: f64) {
        let (mut fulfill_handlers, mut always_handlers) = {
            let mut inner = self.inner.borrow_mut();
            assert!(inner.outcome.is_none(), "notifier settled twice");
            inner.outcome = Some(Outcome::Filled(price));
            inner.on_reject.clear();
            (
                std::mem::take(&mut inner.on_fulfill),
                std::mem::take(&mut inner.on_always),
            )
        };
        // No internal borrow held here: handlers may re-enter the notifier.
        for handler in &mut fulfill_handlers {
            handler(price);
        }
        let outcome = Outcome::Filled(price);
        for handler in &mut always_handlers {
            handler(&outcome);
        }
    }

    /// Settle as a failure, invoking failure handlers then always-handlers.
    ///
    /// # Panics
    ///
    /// Panics if the notifier is already settled.
    pub fn reject(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let (mut reject_handlers, mut always_handlers) = {
            let mut inner = self.inner.borrow_mut();
            assert!(inner.outcome.is_none(), "notifier settled twice");
            inner.outcome = Some(Outcome::Rejected(reason.clone()));
            inner.on_fulfill.clear();
            (
                std::mem::take(&mut inner.on_reject),
                std::mem::take(&mut inner.on_always),
            )
        };
        for handler in &mut reject_handlers {
            handler(&reason);
        }
        let outcome = Outcome::Rejected(reason);
        for handler in &mut always_handlers {
            handler(&outcome);
        }
    }
}

impl PartialEq for Notifier {
    /// Two notifiers are equal when they are handles to the same settlement.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("outcome", &self.inner.borrow().outcome)
            .finish()
    }
}
