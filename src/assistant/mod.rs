/// Assistant — keyword-routed canned-response engine.
///
/// The pipeline is linear and entirely in-memory:
///
/// ```text
/// submit(text) ──▶ classifier::classify ──▶ Category
///                                              │
///              poll(now) ◀── due reply ◀── catalog::select_response
/// ```
///
/// [`classifier`] maps free text to a closed category set, [`catalog`]
/// supplies the canned payload, and [`session`] owns the message log and the
/// simulated thinking delay between the two.
pub mod catalog;
pub mod classifier;
pub mod session;

pub use catalog::{Attachment, QUICK_QUERIES, QuickQuery, ResponsePayload, SelectionPolicy};
pub use classifier::{Category, classify};
pub use session::{ChatMessage, ChatSession, OverlapPolicy, Role, SubmitOutcome};
