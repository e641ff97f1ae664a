//! Checkout: idempotency keys and order submission.

pub mod idempotency;
pub mod order;

pub use idempotency::{canonical_form, compute_key, compute_key_opt, LineItem, IDEMPOTENCY_KEY};
pub use order::{OrderClient, OrderReceipt, PlaceOrder, ORDERS_PATH};
