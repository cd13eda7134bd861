//! Orders — a desired position change submitted by strategy code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional intent of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    /// Go long.
    Buy,
    /// Go short.
    Sell,
    /// Flatten any open position.
    Out,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Out => "out",
        })
    }
}

/// A desired position change: enter long or short with a trade size, or
/// flatten.
///
/// The shape encodes the volume rule — entering orders always carry a
/// volume, a flattening order never does. The default order is `Out`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Buy {
        volume: i64,
    },
    Sell {
        volume: i64,
    },
    #[default]
    Out,
}

impl Order {
    pub fn buy(volume: i64) -> Self {
        Order::Buy { volume }
    }

    pub fn sell(volume: i64) -> Self {
        Order::Sell { volume }
    }

    pub fn out() -> Self {
        Order::Out
    }

    pub fn signal(&self) -> Signal {
        match self {
            Order::Buy { .. } => Signal::Buy,
            Order::Sell { .. } => Signal::Sell,
            Order::Out => Signal::Out,
        }
    }

    pub fn volume(&self) -> Option<i64> {
        match self {
            Order::Buy { volume } | Order::Sell { volume } => Some(*volume),
            Order::Out => None,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.volume() {
            Some(volume) => write!(f, "<Order: volume={}, signal={}>", volume, self.signal()),
            None => write!(f, "<Order: signal={}>", self.signal()),
        }
    }
}
