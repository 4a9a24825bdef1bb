//! Return-URL Contract
//!
//! On redirect back from the gateway the query string carries a
//! success/cancel signal and, on success, the gateway-specific reference
//! parameter. A success signal without a usable reference is an error
//! state, never a success.

use checkout_core::Gateway;

use crate::session::GatewayReference;

/// What the return query string told us
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnSignal {
    /// Payment flow completed at the gateway; verify this reference
    Completed(GatewayReference),

    /// Success marker present but the reference is missing or empty
    MissingReference,

    /// Buyer backed out at the gateway
    Cancelled,
}

/// Parse a gateway return query string (with or without a leading `?`).
///
/// Returns `None` when the query carries no recognizable return signal at
/// all, i.e. an ordinary page load.
pub fn parse_return_query(gateway: Gateway, query: &str) -> Option<ReturnSignal> {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut status: Option<&str> = None;
    let mut reference: Option<&str> = None;

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == gateway.reference_param() {
            reference = Some(value);
        } else if key == "status" {
            status = Some(value);
        }
    }

    match (status, reference) {
        (_, Some(reference)) if !reference.is_empty() => {
            Some(ReturnSignal::Completed(GatewayReference::from_string(reference)))
        }
        (Some("success"), _) => Some(ReturnSignal::MissingReference),
        (Some("cancelled" | "canceled"), _) => Some(ReturnSignal::Cancelled),
        _ => None,
    }
}
