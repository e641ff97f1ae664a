//! Deterministic idempotency keys for order submission.
//!
//! # Responsibilities
//! - Normalize cart line items (string or numeric quantities and prices)
//! - Sort them into a canonical order
//! - Serialize and hash the canonical form
//!
//! # Design Decisions
//! - Ids compare by UTF-16 code units so the order is locale independent
//! - Ties on id fall back to quantity, then price
//! - Numbers print like JSON.stringify: integers without a fraction, exponent
//!   form outside [1e-6, 1e21), non-finite as `null`
//! - Rolling hash `h * 31 + unit` over UTF-16 code units, wrapping at 32 bits

use std::cmp::Ordering;

use serde::{Deserialize, Deserializer, Serialize};

/// Header carrying the key on order creation.
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// One cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(alias = "book_id", alias = "id", deserialize_with = "lenient_id")]
    pub book_id: String,
    #[serde(alias = "quantity", default = "missing", deserialize_with = "lenient_number")]
    pub qty: f64,
    #[serde(
        alias = "unit_price",
        alias = "price",
        default = "missing",
        deserialize_with = "lenient_number"
    )]
    pub unit_price: f64,
}

impl LineItem {
    pub fn new(book_id: impl Into<String>, qty: f64, unit_price: f64) -> Self {
        Self {
            book_id: book_id.into(),
            qty,
            unit_price,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(f64),
    Text(String),
    Null,
}

fn missing() -> f64 {
    f64::NAN
}

/// Numeric coercion: numbers pass through, strings are parsed after trimming
/// (blank is 0, garbage is NaN), null is 0.
fn coerce(value: Lenient) -> f64 {
    match value {
        Lenient::Number(n) => n,
        Lenient::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                0.0
            } else {
                text.parse().unwrap_or(f64::NAN)
            }
        }
        Lenient::Null => 0.0,
    }
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Lenient::deserialize(deserializer).map(coerce)
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Lenient::deserialize(deserializer)? {
        Lenient::Number(n) => format_number(n),
        Lenient::Text(text) => text,
        Lenient::Null => String::new(),
    })
}

fn format_number(n: f64) -> String {
    if !n.is_finite() {
        "null".to_string()
    } else if n == 0.0 {
        // Drops the sign of -0.
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Exponent form with an explicit sign on positive exponents: 1e+21, 1.5e-7.
        let text = format!("{:e}", n);
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => text,
        }
    } else {
        // f64 Display is shortest round-trip and omits ".0" for integers.
        n.to_string()
    }
}

fn compare(a: &LineItem, b: &LineItem) -> Ordering {
    a.book_id
        .encode_utf16()
        .cmp(b.book_id.encode_utf16())
        .then_with(|| a.qty.total_cmp(&b.qty))
        .then_with(|| a.unit_price.total_cmp(&b.unit_price))
}

/// Canonical string form hashed by [`compute_key`].
pub fn canonical_form(items: &[LineItem]) -> String {
    let mut sorted: Vec<&LineItem> = items.iter().collect();
    sorted.sort_by(|a, b| compare(a, b));

    let mut out = String::from("[");
    for (i, item) in sorted.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let id = serde_json::Value::String(item.book_id.clone());
        out.push_str(&format!(
            "{{\"id\":{},\"qty\":{},\"unitPrice\":{}}}",
            id,
            format_number(item.qty),
            format_number(item.unit_price)
        ));
    }
    out.push(']');
    out
}

fn rolling_hash(text: &str) -> u32 {
    text.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Order-independent key for a set of line items, as lowercase hex.
pub fn compute_key(items: &[LineItem]) -> String {
    format!("{:x}", rolling_hash(&canonical_form(items)))
}

/// `compute_key` where an absent cart counts as empty.
pub fn compute_key_opt(items: Option<&[LineItem]>) -> String {
    compute_key(items.unwrap_or(&[]))
}
