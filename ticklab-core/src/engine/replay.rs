//! Replay — drive the dispatcher from an ordered sequence of historical
//! rows.
//!
//! Each row maps positional fields to named columns, produces one [`Bar`]
//! and one synthetic [`Tick`] (priced at the bar's close, else its open),
//! and dispatches the bar first, then the tick. The fulfillment step runs
//! inside each dispatch. A malformed row aborts the whole replay.

use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::domain::{Bar, BarFields, Tick, ValidationError};

use super::BacktestEngine;

/// Role of a positional column in replay input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    StartTime,
    Period,
    Open,
    High,
    Low,
    Close,
    Volume,
    /// Ignore the column.
    Skip,
}

/// Default column layout: start time, open, high, low, close, volume.
pub const DEFAULT_COLUMNS: [Column; 6] = [
    Column::StartTime,
    Column::Open,
    Column::High,
    Column::Low,
    Column::Close,
    Column::Volume,
];

/// A replay run failed and was aborted.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// A row produced an invalid bar. Nothing after it is replayed.
    #[error("row {row}: {source}")]
    Row {
        row: u64,
        source: ValidationError,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl BacktestEngine {
    /// Replay a CSV file at `path`.
    pub fn replay_path(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        self.replay_records(reader)
    }

    /// Replay CSV rows from any reader.
    pub fn replay(&self, input: impl Read) -> Result<(), ReplayError> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input);
        self.replay_records(reader)
    }

    fn replay_records<R: Read>(&self, mut reader: csv::Reader<R>) -> Result<(), ReplayError> {
        let mut record = csv::StringRecord::new();
        let mut row = 0u64;
        while reader.read_record(&mut record)? {
            row += 1;
            // Blank rows are skipped, not errors.
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let bar = bar_from_record(self.columns(), &record)
                .map_err(|source| ReplayError::Row { row, source })?;
            let tick = Tick {
                time: None,
                price: bar.last_price(),
            };
            self.dispatcher().dispatch_bar(&bar);
            self.dispatcher().dispatch_tick(&tick);
        }
        Ok(())
    }
}

/// Map a positional record onto named bar fields and validate.
fn bar_from_record(columns: &[Column], record: &csv::StringRecord) -> Result<Bar, ValidationError> {
    let mut fields = BarFields::default();
    for (column, value) in columns.iter().zip(record.iter()) {
        match column {
            Column::StartTime => fields.start_time = Some(value),
            Column::Period => fields.period = Some(value),
            Column::Open => fields.open = Some(value),
            Column::High => fields.high = Some(value),
            Column::Low => fields.low = Some(value),
            Column::Close => fields.close = Some(value),
            Column::Volume => fields.volume = Some(value),
            Column::Skip => {}
        }
    }
    Bar::from_fields(&fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const THREE_BARS: &str = "\
2016-01-01T12:00:00,10,12,9,11,1000
2016-01-01T12:10:00,11,13,10,12,1001
2016-01-01T12:20:00,12,13,11,13,1002
";

    #[test]
    fn every_row_dispatches_a_bar_and_a_tick() {
        let engine = BacktestEngine::new(0.0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let bars = seen.clone();
        engine.dispatcher().on_bar(move |bar| bars.borrow_mut().push(format!("{bar}")));
        let ticks = seen.clone();
        engine
            .dispatcher()
            .on_tick(move |tick| ticks.borrow_mut().push(format!("{tick}")));

        engine.replay(THREE_BARS.as_bytes()).unwrap();

        assert_eq!(seen.borrow().len(), 6);
        assert_eq!(
            seen.borrow()[0],
            "<Bar: open=10, high=12, low=9, close=11, volume=1000, \
             start_time=2016-01-01T12:00:00+00:00>"
        );
        assert_eq!(seen.borrow()[1], "<Tick: price=11>");
    }

    #[test]
    fn blank_rows_are_skipped() {
        let engine = BacktestEngine::new(0.0);
        let count = Rc::new(RefCell::new(0));
        let bars = count.clone();
        engine.dispatcher().on_bar(move |_| *bars.borrow_mut() += 1);

        engine
            .replay("\n2016-01-01,10,12,9,11,1000\n\n,,,,,\n".as_bytes())
            .unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn synthetic_tick_falls_back_to_open() {
        let engine = BacktestEngine::new(0.0);
        let prices = Rc::new(RefCell::new(Vec::new()));
        let log = prices.clone();
        engine
            .dispatcher()
            .on_tick(move |tick| log.borrow_mut().push(tick.price));

        // No close column value: the tick takes the open.
        engine.replay(",20\n".as_bytes()).unwrap();
        assert_eq!(*prices.borrow(), vec![Some(20.0)]);
    }

    #[test]
    fn short_rows_leave_trailing_columns_absent() {
        let engine = BacktestEngine::new(0.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        engine
            .dispatcher()
            .on_bar(move |bar| log.borrow_mut().push(bar.clone()));

        engine.replay(",10,12,9\n".as_bytes()).unwrap();
        let bar = &seen.borrow()[0];
        assert_eq!(bar.open, Some(10.0));
        assert_eq!(bar.close, None);
        assert_eq!(bar.volume, None);
    }

    #[test]
    fn malformed_row_aborts_the_replay() {
        let engine = BacktestEngine::new(0.0);
        let count = Rc::new(RefCell::new(0));
        let bars = count.clone();
        engine.dispatcher().on_bar(move |_| *bars.borrow_mut() += 1);

        // Second row has high (9) < low (12); the third row never replays.
        let err = engine
            .replay(
                "\
2016-01-01T12:00:00,10,12,9,11,1000
2016-01-01T12:10:00,10,9,12,11,1000
2016-01-01T12:20:00,12,13,11,13,1002
"
                .as_bytes(),
            )
            .unwrap_err();

        assert_eq!(*count.borrow(), 1);
        let message = err.to_string();
        assert!(message.contains("row 2"), "unexpected error: {message}");
        assert!(
            message.contains("high (9) is less than low (12)"),
            "unexpected error: {message}"
        );
    }

    #[test]
    fn custom_columns_remap_fields() {
        let engine = BacktestEngine::new(0.0)
            .with_columns(vec![Column::Close, Column::Skip, Column::Volume]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        engine
            .dispatcher()
            .on_bar(move |bar| log.borrow_mut().push(bar.clone()));

        engine.replay("42,ignored,7\n".as_bytes()).unwrap();
        let bar = &seen.borrow()[0];
        assert_eq!(bar.close, Some(42.0));
        assert_eq!(bar.volume, Some(7));
        assert_eq!(bar.start_time, None);
    }
}
