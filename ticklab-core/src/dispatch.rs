//! Event dispatcher — ordered subscriber lists, current price, and the
//! single in-flight order slot.
//!
//! Dispatch is synchronous and single-threaded: every handler runs to
//! completion, in registration order, inside the `dispatch_*` call that
//! triggered it. Handlers may re-enter the dispatcher (submit an order,
//! push a balance update); no internal borrow is held across a handler
//! invocation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use thiserror::Error;

use crate::domain::{Bar, Order, Tick};
use crate::notify::Notifier;

/// A second order was submitted while one was still unsettled.
///
/// Surfaced to the submitting caller as an immediate failure of the
/// submission itself, never through a notifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("an order is already queued for fulfillment")]
pub struct OrderQueueError;

type BarHandler = Box<dyn FnMut(&Bar)>;
type TickHandler = Box<dyn FnMut(&Tick)>;
type BalanceHandler = Box<dyn FnMut(f64)>;

#[derive(Default)]
struct Inner {
    bar_handlers: Vec<BarHandler>,
    tick_handlers: Vec<TickHandler>,
    balance_handlers: Vec<BalanceHandler>,
    current_price: Option<f64>,
    queued: Option<(Order, Notifier)>,
}

/// Cheap-clone handle to one dispatcher instance.
///
/// One dispatcher serves one instrument/strategy pairing; it is not `Send`
/// and must be driven from a single logical actor.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Rc<RefCell<Inner>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to bar events. Subscribers are invoked in registration
    /// order; no de-duplication.
    pub fn on_bar(&self, handler: impl FnMut(&Bar) + 'static) {
        self.inner.borrow_mut().bar_handlers.push(Box::new(handler));
    }

    /// Subscribe to tick events.
    pub fn on_tick(&self, handler: impl FnMut(&Tick) + 'static) {
        self.inner.borrow_mut().tick_handlers.push(Box::new(handler));
    }

    /// Subscribe to balance updates.
    pub fn on_balance(&self, handler: impl FnMut(f64) + 'static) {
        self.inner
            .borrow_mut()
            .balance_handlers
            .push(Box::new(handler));
    }

    /// Price established by the most recent price-bearing event.
    pub fn current_price(&self) -> Option<f64> {
        self.inner.borrow().current_price
    }

    /// The queued order and its notifier, if one is in flight.
    pub fn queued_order(&self) -> Option<(Order, Notifier)> {
        self.inner.borrow().queued.clone()
    }

    pub fn order_in_flight(&self) -> bool {
        self.inner.borrow().queued.is_some()
    }

    /// Update the current price from the tick (when it carries one), then
    /// invoke every tick subscriber in order.
    pub fn dispatch_tick(&self, tick: &Tick) {
        if let Some(price) = tick.price {
            self.inner.borrow_mut().current_price = Some(price);
        }
        let mut handlers = std::mem::take(&mut self.inner.borrow_mut().tick_handlers);
        for handler in handlers.iter_mut() {
            handler(tick);
        }
        let mut inner = self.inner.borrow_mut();
        // Subscribers added during dispatch keep registration order.
        let late = std::mem::replace(&mut inner.tick_handlers, handlers);
        inner.tick_handlers.extend(late);
    }

    /// Update the current price from the bar — close where present, else
    /// open, else leave it unchanged — then invoke every bar subscriber.
    pub fn dispatch_bar(&self, bar: &Bar) {
        if let Some(price) = bar.last_price() {
            self.inner.borrow_mut().current_price = Some(price);
        }
        let mut handlers = std::mem::take(&mut self.inner.borrow_mut().bar_handlers);
        for handler in handlers.iter_mut() {
            handler(bar);
        }
        let mut inner = self.inner.borrow_mut();
        let late = std::mem::replace(&mut inner.bar_handlers, handlers);
        inner.bar_handlers.extend(late);
    }

    /// Invoke every balance subscriber with the new value.
    pub fn dispatch_balance(&self, balance: f64) {
        let mut handlers = std::mem::take(&mut self.inner.borrow_mut().balance_handlers);
        for handler in handlers.iter_mut() {
            handler(balance);
        }
        let mut inner = self.inner.borrow_mut();
        let late = std::mem::replace(&mut inner.balance_handlers, handlers);
        inner.balance_handlers.extend(late);
    }

    /// Queue an order for fulfillment and return its notifier.
    ///
    /// At most one order may be in flight per dispatcher; submitting while
    /// one is queued fails immediately and leaves the queued order intact.
    /// The slot is cleared when the notifier settles, whatever the outcome.
    pub fn update_order(&self, order: Order) -> Result<Notifier, OrderQueueError> {
        let mut inner = self.inner.borrow_mut();
        if inner.queued.is_some() {
            return Err(OrderQueueError);
        }

        let notifier = Notifier::new();
        let slot: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        notifier.on_always(move |_| {
            if let Some(inner) = slot.upgrade() {
                inner.borrow_mut().queued = None;
            }
        });

        inner.queued = Some((order, notifier.clone()));
        Ok(notifier)
    }
}
