//! Core engine for event-driven trading backtests.
//!
//! The crate is organized around a synchronous event [`dispatch::Dispatcher`]:
//! market data ([`domain::Bar`] and [`domain::Tick`]) flows in, strategies
//! subscribe and submit [`domain::Order`]s, and the [`engine::BacktestEngine`]
//! fulfills them against a simulated account. Each order's outcome is
//! delivered exactly once through a [`notify::Notifier`]. The [`transport`]
//! module defines the contract a live data feed binds to.

pub mod dispatch;
pub mod domain;
pub mod engine;
pub mod notify;
pub mod transport;
