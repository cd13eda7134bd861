//! Settlement arithmetic, per unit of volume.

use crate::domain::Signal;

/// Gain from entering at `entry` and exiting at `exit`.
///
/// # Panics
///
/// Panics for [`Signal::Out`] — the calculator is only defined for
/// directional positions and is never invoked for a flatten.
pub fn gain(signal: Signal, entry: f64, exit: f64) -> f64 {
    match signal {
        Signal::Buy => exit - entry,
        Signal::Sell => entry - exit,
        Signal::Out => panic!("no settlement arithmetic for 'out' orders"),
    }
}

/// Exit-side value per unit: the entry price plus the gain.
pub fn settle(signal: Signal, entry: f64, exit: f64) -> f64 {
    entry + gain(signal, entry, exit)
}
