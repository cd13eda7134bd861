//! Live transport contract — framework-independent report handling.
//!
//! A live terminal pushes `bar` and `tick` reports over some wire; the wire
//! itself is plumbing. This module is the whole contract: map a report kind
//! and its form fields to a dispatch call plus the status a binding should
//! answer with. A binding must hand requests over one at a time — the
//! dispatcher is single-threaded.

use std::collections::HashMap;

use crate::dispatch::Dispatcher;
use crate::domain::{Bar, BarFields, Tick, TickFields, ValidationError};

/// Status and body a transport binding answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportResponse {
    pub status: u16,
    pub body: &'static str,
}

/// A bar or tick report was accepted and dispatched.
pub const REPORTED: ReportResponse = ReportResponse {
    status: 201,
    body: "Reported",
};

/// A request with no report kind is a connectivity probe.
pub const CONNECTED: ReportResponse = ReportResponse {
    status: 200,
    body: "Connected",
};

/// The report kind is not recognized.
pub const INVALID_TYPE: ReportResponse = ReportResponse {
    status: 400,
    body: "Invalid type",
};

/// Handle one pushed report.
///
/// `bar` reports carry `start_time`/`open`/`high`/`low`/`close`/`volume`
/// fields; `tick` reports carry `time`/`price`. Missing fields are absent.
/// Malformed field values propagate as [`ValidationError`].
pub fn handle_report(
    dispatcher: &Dispatcher,
    kind: Option<&str>,
    form: &HashMap<String, String>,
) -> Result<ReportResponse, ValidationError> {
    let field = |name: &str| form.get(name).map(String::as_str);

    match kind {
        Some("bar") => {
            let bar = Bar::from_fields(&BarFields {
                start_time: field("start_time"),
                period: field("period"),
                open: field("open"),
                high: field("high"),
                low: field("low"),
                close: field("close"),
                volume: field("volume"),
            })?;
            dispatcher.dispatch_bar(&bar);
            Ok(REPORTED)
        }
        Some("tick") => {
            let tick = Tick::from_fields(&TickFields {
                time: field("time"),
                price: field("price"),
            })?;
            dispatcher.dispatch_tick(&tick);
            Ok(REPORTED)
        }
        None => Ok(CONNECTED),
        Some(_) => Ok(INVALID_TYPE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn bar_report_dispatches_a_bar() {
        let dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        dispatcher.on_bar(move |bar| log.borrow_mut().push(bar.to_string()));

        let response = handle_report(
            &dispatcher,
            Some("bar"),
            &form(&[
                ("start_time", "2016.01.02 03:02:00"),
                ("open", "1.2345"),
                ("high", "2.3456"),
                ("low", "0.1234"),
                ("close", "1.2468"),
                ("volume", "20"),
            ]),
        )
        .unwrap();

        assert_eq!(response, REPORTED);
        assert_eq!(
            seen.borrow()[0],
            "<Bar: open=1.2345, high=2.3456, low=0.1234, close=1.2468, \
             volume=20, start_time=2016-01-02T03:02:00+00:00>"
        );
    }

    #[test]
    fn tick_report_dispatches_a_tick() {
        let dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        dispatcher.on_tick(move |tick| log.borrow_mut().push(tick.clone()));

        let response = handle_report(
            &dispatcher,
            Some("tick"),
            &form(&[("time", "2016.01.02 03:02:00"), ("price", "1.2345")]),
        )
        .unwrap();

        assert_eq!(response, REPORTED);
        assert_eq!(seen.borrow()[0].price, Some(1.2345));
        assert_eq!(dispatcher.current_price(), Some(1.2345));
    }

    #[test]
    fn no_kind_is_a_connectivity_probe() {
        let dispatcher = Dispatcher::new();
        let response = handle_report(&dispatcher, None, &HashMap::new()).unwrap();
        assert_eq!(response, CONNECTED);
        assert_eq!(response.status, 200);
    }

    #[test]
    fn unknown_kind_is_a_client_error() {
        let dispatcher = Dispatcher::new();
        let response = handle_report(&dispatcher, Some("balance?"), &HashMap::new()).unwrap();
        assert_eq!(response, INVALID_TYPE);
        assert_eq!(response.status, 400);
    }

    #[test]
    fn malformed_fields_propagate_validation_errors() {
        let dispatcher = Dispatcher::new();
        let seen = Rc::new(RefCell::new(0));
        let count = seen.clone();
        dispatcher.on_bar(move |_| *count.borrow_mut() += 1);

        let err = handle_report(
            &dispatcher,
            Some("bar"),
            &form(&[("high", "5"), ("low", "10")]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            ValidationError::HighBelowLow {
                high: 5.0,
                low: 10.0
            }
        );
        // Nothing was dispatched.
        assert_eq!(*seen.borrow(), 0);
    }
}
