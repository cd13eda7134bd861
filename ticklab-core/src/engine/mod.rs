//! Backtest engine — account state and the order fulfillment state machine.
//!
//! The engine wraps a [`Dispatcher`] and tracks one account: a cash balance
//! and at most one open position. On every dispatched bar and tick it runs
//! the fulfillment step, which tries to resolve the queued order against the
//! price that event established. Entries debit the full notional from the
//! balance; exits credit the full realized value back, so `balance` always
//! reads "cash after the current position's entry cost" while [`equity`]
//! adds the mark-to-market value of anything still open.
//!
//! [`equity`]: BacktestEngine::equity

pub mod replay;
pub mod settle;

pub use replay::{Column, ReplayError, DEFAULT_COLUMNS};

use std::cell::RefCell;
use std::rc::Rc;

use crate::dispatch::{Dispatcher, OrderQueueError};
use crate::domain::{Order, Signal};
use crate::notify::Notifier;

use self::settle::settle;

/// Rejection reason when flattening with no open position.
pub const REJECT_NO_OPEN_ORDER: &str = "No open order";
/// Rejection reason when an entry costs more than the balance.
pub const REJECT_BALANCE_TOO_LOW: &str = "Account balance too low";

/// An open directional position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub signal: Signal,
    pub entry_price: f64,
    pub volume: i64,
}

#[derive(Debug, Default)]
struct Account {
    balance: f64,
    position: Option<Position>,
}

/// Cheap-clone handle to one backtest engine instance.
///
/// Construction wires the engine's own handlers into the dispatcher before
/// any strategy can subscribe, so the fulfillment step sees each price
/// update first and strategy code observes the resulting balance changes as
/// ordinary balance events.
#[derive(Clone)]
pub struct BacktestEngine {
    dispatcher: Dispatcher,
    account: Rc<RefCell<Account>>,
    columns: Vec<Column>,
}

impl BacktestEngine {
    pub fn new(initial_balance: f64) -> Self {
        let dispatcher = Dispatcher::new();
        let account = Rc::new(RefCell::new(Account::default()));

        {
            let handle = dispatcher.clone();
            let account = Rc::clone(&account);
            dispatcher.on_bar(move |_| fulfill_queued(&handle, &account));
        }
        {
            let handle = dispatcher.clone();
            let account = Rc::clone(&account);
            dispatcher.on_tick(move |_| fulfill_queued(&handle, &account));
        }
        {
            let account = Rc::clone(&account);
            dispatcher.on_balance(move |balance| account.borrow_mut().balance = balance);
        }

        dispatcher.dispatch_balance(initial_balance);

        Self {
            dispatcher,
            account,
            columns: DEFAULT_COLUMNS.to_vec(),
        }
    }

    /// Replace the replay column mapping (default: start time, O, H, L, C, V).
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// The dispatcher this engine is wired to; strategies subscribe here.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Queue an order for fulfillment on the next price-bearing event.
    pub fn update_order(&self, order: Order) -> Result<Notifier, OrderQueueError> {
        self.dispatcher.update_order(order)
    }

    /// Tracked cash balance.
    pub fn balance(&self) -> f64 {
        self.account.borrow().balance
    }

    /// The open position, if any.
    pub fn position(&self) -> Option<Position> {
        self.account.borrow().position
    }

    /// Total account value: balance plus the mark-to-market value of any
    /// open position at the current price. Derived on demand; never mutates.
    pub fn equity(&self) -> f64 {
        let account = self.account.borrow();
        match account.position {
            None => account.balance,
            Some(position) => {
                let price = self
                    .dispatcher
                    .current_price()
                    .unwrap_or(position.entry_price);
                account.balance
                    + position.volume as f64 * settle(position.signal, position.entry_price, price)
            }
        }
    }

    pub(crate) fn columns(&self) -> &[Column] {
        &self.columns
    }
}

/// One fulfillment step: resolve the queued order against the price
/// established by the event currently being dispatched.
///
/// No dispatcher or account borrow is held while a notifier settles —
/// settlement re-enters the dispatcher to clear the order slot, and balance
/// updates re-enter it to notify subscribers.
fn fulfill_queued(dispatcher: &Dispatcher, account: &Rc<RefCell<Account>>) {
    let Some((order, notifier)) = dispatcher.queued_order() else {
        return;
    };
    // No price established yet: the order stays queued. It is never dropped;
    // the next price-bearing event resolves it.
    let Some(price) = dispatcher.current_price() else {
        return;
    };

    match order {
        Order::Out => {
            let position = account.borrow().position;
            let Some(position) = position else {
                notifier.reject(REJECT_NO_OPEN_ORDER);
                return;
            };
            let realized = realize(account.borrow().balance, position, price);
            account.borrow_mut().position = None;
            dispatcher.dispatch_balance(realized);
            notifier.fulfill(price);
        }
        Order::Buy { volume } | Order::Sell { volume } => {
            let signal = order.signal();

            // Signal flip: realize the opposite leg into the balance first.
            // Purely an accounting step — only the queued order's notifier
            // is ever settled.
            let flipped = account.borrow().position.filter(|p| p.signal != signal);
            if let Some(position) = flipped {
                let realized = realize(account.borrow().balance, position, price);
                account.borrow_mut().position = None;
                dispatcher.dispatch_balance(realized);
            }

            let balance = account.borrow().balance;
            let cost = price * volume as f64;
            if cost > balance {
                notifier.reject(REJECT_BALANCE_TOO_LOW);
                return;
            }

            account.borrow_mut().position = Some(Position {
                signal,
                entry_price: price,
                volume,
            });
            dispatcher.dispatch_balance(balance - cost);
            notifier.fulfill(price);
        }
    }
}

/// Account total after closing `position` at `exit_price`.
fn realize(balance: f64, position: Position, exit_price: f64) -> f64 {
    balance + position.volume as f64 * settle(position.signal, position.entry_price, exit_price)
}
