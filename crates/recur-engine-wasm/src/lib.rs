//! WASM bindings for recur-engine.
//!
//! Exposes rule parsing, expansion and validation to JavaScript via
//! `wasm-bindgen`. Lists cross the boundary as JSON strings, and every error is
//! thrown as a JS string carrying the engine's message.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p recur-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir packages/recur-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/recur_engine_wasm.wasm
//! # Rename .js -> .cjs for ESM compatibility
//! mv packages/recur-js/wasm/recur_engine_wasm.js \
//!    packages/recur-js/wasm/recur_engine_wasm.cjs
//! ```

use recur_engine::{ParentContext, Temporal};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Plain-Rust implementations (testable off the wasm32 target)
// ---------------------------------------------------------------------------

fn parse_rule_impl(text: &str) -> Result<String, String> {
    recur_engine::parse(text)
        .map(|rule| rule.to_string())
        .map_err(|e| e.to_string())
}

fn expand_rule_impl(
    rule: &str,
    dtstart: &str,
    timezone: Option<&str>,
    limit: u32,
    exdates_json: Option<&str>,
) -> Result<String, String> {
    let exdates: Vec<String> = match exdates_json {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| format!("Invalid EXDATE JSON: {}", e))?,
        None => Vec::new(),
    };
    let exdates: Vec<&str> = exdates.iter().map(String::as_str).collect();

    let occurrences = recur_engine::expand_rrule_with_exdates(
        rule,
        dtstart,
        timezone,
        limit as usize,
        &exdates,
    )
    .map_err(|e| e.to_string())?;

    let values: Vec<String> = occurrences.iter().map(ToString::to_string).collect();
    serde_json::to_string(&values).map_err(|e| format!("Serialization error: {}", e))
}

fn validate_rule_impl(
    rule: &str,
    dtstart: &str,
    timezone: Option<&str>,
) -> Result<String, String> {
    let rule = recur_engine::parse(rule).map_err(|e| e.to_string())?;
    let start = Temporal::parse(dtstart, timezone).map_err(|e| e.to_string())?;
    let messages = rule.error_messages(&ParentContext::new(start));
    serde_json::to_string(&messages).map_err(|e| format!("Serialization error: {}", e))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Parse an RRULE and return its canonical serialization.
///
/// Throws a JS error if the rule cannot be parsed or is structurally invalid.
#[wasm_bindgen(js_name = "parseRule")]
pub fn parse_rule(text: &str) -> Result<String, JsValue> {
    parse_rule_impl(text).map_err(|e| JsValue::from_str(&e))
}

/// Expand an RRULE into its first `limit` occurrences.
///
/// Returns a JSON array of occurrence strings in the start's kind
/// (`2026-02-17`, `2026-02-17T14:00:00`, `2026-02-17T22:00:00Z` or
/// `2026-02-17T14:00:00-08:00[America/Los_Angeles]`).
///
/// # Arguments
/// - `rule` -- RFC 5545 RRULE string (e.g., "FREQ=WEEKLY;BYDAY=TU,TH")
/// - `dtstart` -- start value (e.g., "2026-02-17T14:00:00" or "20260217T140000")
/// - `timezone` -- optional IANA timezone the start's wall-clock time is in
/// - `limit` -- maximum number of occurrences
/// - `exdates_json` -- optional JSON array of values to exclude, read like `dtstart`
#[wasm_bindgen(js_name = "expandRule")]
pub fn expand_rule(
    rule: &str,
    dtstart: &str,
    timezone: Option<String>,
    limit: u32,
    exdates_json: Option<String>,
) -> Result<String, JsValue> {
    expand_rule_impl(
        rule,
        dtstart,
        timezone.as_deref(),
        limit,
        exdates_json.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Check an RRULE against its DTSTART.
///
/// Returns a JSON array of violation messages; an empty array means the rule is valid.
#[wasm_bindgen(js_name = "validateRule")]
pub fn validate_rule(
    rule: &str,
    dtstart: &str,
    timezone: Option<String>,
) -> Result<String, JsValue> {
    validate_rule_impl(rule, dtstart, timezone.as_deref()).map_err(|e| JsValue::from_str(&e))
}
