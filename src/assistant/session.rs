//! Chat session state machine.
//!
//! Holds the ordered, append-only message log and the pending-reply
//! schedule. The session never spawns timers: callers pass the current time
//! into [`ChatSession::submit`] and [`ChatSession::poll`], which makes the
//! `idle -> awaiting-response -> idle` cycle fully deterministic under test.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::assistant::catalog::{self, ResponsePayload, SelectionPolicy};
use crate::assistant::classifier::{self, Category};
use crate::rng::RandomSource;

/// Seed greeting shown before any user input.
const WELCOME_TEXT: &str = "Hello! I'm your Urban Intelligence AI Assistant. I can help you \
     analyze city data, monitor public safety, optimize routes, and provide \
     insights about urban planning. What would you like to know?";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the session log. Immutable once appended.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<catalog::Attachment>,
}

// ---------------------------------------------------------------------------
// Submit outcome and overlap policy
// ---------------------------------------------------------------------------

/// What to do with a submit that arrives while a reply is still pending.
///
/// The original allowed unbounded overlapping replies; `Reject` is the
/// default single-in-flight guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Refuse the submit while a reply is in flight.
    #[default]
    Reject,
    /// Buffer the submit; its reply is scheduled once the in-flight one lands.
    Queue,
    /// Accept it; replies may interleave (original behavior).
    Allow,
}

impl std::fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Queue => write!(f, "queue"),
            Self::Allow => write!(f, "allow"),
        }
    }
}

/// Result of [`ChatSession::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// User message appended; a reply is due after the configured delay.
    Accepted,
    /// Blank input — nothing appended, nothing scheduled.
    IgnoredEmpty,
    /// A reply is already in flight and the policy is `Reject`.
    RejectedBusy,
    /// A reply is in flight; the submit was buffered (`Queue` policy).
    Queued,
}

/// A scheduled assistant reply.
#[derive(Debug, Clone)]
struct PendingReply {
    query: String,
    due_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Ordered chat log plus the reply schedule.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    pending: Vec<PendingReply>,
    queued: Vec<String>,
    response_delay: Duration,
    selection: SelectionPolicy,
    overlap: OverlapPolicy,
    next_id: u64,
}

impl ChatSession {
    pub fn new(
        response_delay_ms: u64,
        selection: SelectionPolicy,
        overlap: OverlapPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            pending: Vec::new(),
            queued: Vec::new(),
            response_delay: Duration::milliseconds(response_delay_ms as i64),
            selection,
            overlap,
            next_id: 1,
        };
        session.append(Role::Assistant, WELCOME_TEXT.to_string(), None, now);
        session
    }

    /// All messages, in insertion order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a reply is scheduled or buffered.
    pub fn is_awaiting_response(&self) -> bool {
        !self.pending.is_empty() || !self.queued.is_empty()
    }

    /// The earliest moment a pending reply becomes due, if any.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.pending.iter().map(|p| p.due_at).min()
    }

    /// Submit a user query.
    ///
    /// Trimmed-empty input is silently ignored. Otherwise the user message is
    /// appended and an assistant reply is scheduled `response_delay` after
    /// `now`, subject to the overlap policy.
    pub fn submit(&mut self, text: &str, now: DateTime<Utc>) -> SubmitOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }

        if self.is_awaiting_response() {
            match self.overlap {
                OverlapPolicy::Reject => return SubmitOutcome::RejectedBusy,
                OverlapPolicy::Queue => {
                    self.append(Role::User, trimmed.to_string(), None, now);
                    self.queued.push(trimmed.to_string());
                    return SubmitOutcome::Queued;
                }
                OverlapPolicy::Allow => {}
            }
        }

        self.append(Role::User, trimmed.to_string(), None, now);
        self.pending.push(PendingReply {
            query: trimmed.to_string(),
            due_at: now + self.response_delay,
        });
        SubmitOutcome::Accepted
    }

    /// Resolve every pending reply that is due at `now`.
    ///
    /// Appends exactly one assistant message per resolved submit and returns
    /// the newly appended messages so the view can scroll to them. Queued
    /// submits are promoted once the in-flight reply lands.
    pub fn poll(&mut self, now: DateTime<Utc>, rng: &mut dyn RandomSource) -> Vec<ChatMessage> {
        let mut appended = Vec::new();

        while let Some(pos) = self.pending.iter().position(|p| p.due_at <= now) {
            let reply = self.pending.remove(pos);
            let category = classifier::classify(&reply.query);
            let payload = catalog::select_response(category, self.selection, rng);
            appended.push(self.append_payload(payload, now));

            if self.pending.is_empty()
                && let Some(next) = self.queued.first().cloned()
            {
                self.queued.remove(0);
                self.pending.push(PendingReply {
                    query: next,
                    due_at: now + self.response_delay,
                });
            }
        }

        appended
    }

    /// The category the next due reply will be drawn from, if any.
    pub fn pending_category(&self) -> Option<Category> {
        self.pending
            .iter()
            .min_by_key(|p| p.due_at)
            .map(|p| classifier::classify(&p.query))
    }

    /// Reset the log to the seed greeting and cancel all scheduled replies.
    /// Sign-out semantics: messages only ever leave the log here.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.messages.clear();
        self.pending.clear();
        self.queued.clear();
        self.next_id = 1;
        self.append(Role::Assistant, WELCOME_TEXT.to_string(), None, now);
    }

    fn append_payload(&mut self, payload: ResponsePayload, now: DateTime<Utc>) -> ChatMessage {
        self.append(Role::Assistant, payload.text, payload.attachment, now)
    }

    fn append(
        &mut self,
        role: Role,
        text: String,
        attachment: Option<catalog::Attachment>,
        now: DateTime<Utc>,
    ) -> ChatMessage {
        let message = ChatMessage {
            id: format!("msg-{}", self.next_id),
            role,
            text,
            sent_at: now,
            attachment,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceRandom;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn session(overlap: OverlapPolicy) -> ChatSession {
        ChatSession::new(1500, SelectionPolicy::Deterministic, overlap, t0())
    }

    #[test]
    fn new_session_seeds_the_greeting() {
        let s = session(OverlapPolicy::Reject);
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].role, Role::Assistant);
        assert!(!s.is_awaiting_response());
    }

    #[test]
    fn empty_submit_is_a_noop() {
        let mut s = session(OverlapPolicy::Reject);
        assert_eq!(s.submit("", t0()), SubmitOutcome::IgnoredEmpty);
        assert_eq!(s.submit("   \t ", t0()), SubmitOutcome::IgnoredEmpty);
        assert_eq!(s.messages().len(), 1);
        assert!(s.next_due().is_none());
    }

    #[test]
    fn submit_appends_user_message_and_schedules_reply() {
        let mut s = session(OverlapPolicy::Reject);
        let outcome = s.submit("What's the current traffic situation?", t0());
        assert_eq!(outcome, SubmitOutcome::Accepted);
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].role, Role::User);
        assert!(s.is_awaiting_response());
        assert_eq!(s.next_due(), Some(t0() + Duration::milliseconds(1500)));
    }

    #[test]
    fn poll_before_due_appends_nothing() {
        let mut s = session(OverlapPolicy::Reject);
        let mut rng = SequenceRandom::constant(0.0);
        s.submit("traffic?", t0());
        let appended = s.poll(t0() + Duration::milliseconds(1499), &mut rng);
        assert!(appended.is_empty());
        assert!(s.is_awaiting_response());
    }

    #[test]
    fn poll_resolves_exactly_one_traffic_reply() {
        let mut s = session(OverlapPolicy::Reject);
        let mut rng = SequenceRandom::constant(0.0);
        s.submit("What's the current traffic situation?", t0());

        let due = t0() + Duration::milliseconds(1500);
        let appended = s.poll(due, &mut rng);
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].role, Role::Assistant);
        assert!(appended[0].attachment.is_some());
        assert!(appended[0].text.contains("traffic data analysis"));
        assert!(!s.is_awaiting_response());

        // No double resolution.
        assert!(s.poll(due + Duration::seconds(10), &mut rng).is_empty());
    }

    #[test]
    fn reject_policy_refuses_overlapping_submit() {
        let mut s = session(OverlapPolicy::Reject);
        s.submit("traffic?", t0());
        let outcome = s.submit("air quality?", t0());
        assert_eq!(outcome, SubmitOutcome::RejectedBusy);
        // Only greeting + first user message.
        assert_eq!(s.messages().len(), 2);
    }

    #[test]
    fn queue_policy_defers_the_second_reply() {
        let mut s = session(OverlapPolicy::Queue);
        let mut rng = SequenceRandom::constant(0.0);
        s.submit("traffic?", t0());
        assert_eq!(s.submit("air quality?", t0()), SubmitOutcome::Queued);
        assert_eq!(s.messages().len(), 3);

        let first_due = t0() + Duration::milliseconds(1500);
        let appended = s.poll(first_due, &mut rng);
        assert_eq!(appended.len(), 1);
        assert!(appended[0].text.contains("traffic"));
        // The queued submit is now in flight.
        assert!(s.is_awaiting_response());

        let second_due = first_due + Duration::milliseconds(1500);
        let appended = s.poll(second_due, &mut rng);
        assert_eq!(appended.len(), 1);
        assert!(appended[0].text.contains("Air quality"));
        assert!(!s.is_awaiting_response());
    }

    #[test]
    fn allow_policy_interleaves_replies() {
        let mut s = session(OverlapPolicy::Allow);
        let mut rng = SequenceRandom::constant(0.0);
        s.submit("traffic?", t0());
        assert_eq!(
            s.submit("transit coverage?", t0() + Duration::milliseconds(100)),
            SubmitOutcome::Accepted
        );

        let appended = s.poll(t0() + Duration::seconds(5), &mut rng);
        assert_eq!(appended.len(), 2);
    }

    #[test]
    fn clear_resets_to_greeting_and_cancels_pending() {
        let mut s = session(OverlapPolicy::Reject);
        let mut rng = SequenceRandom::constant(0.0);
        s.submit("traffic?", t0());
        s.clear(t0() + Duration::seconds(1));

        assert_eq!(s.messages().len(), 1);
        assert!(!s.is_awaiting_response());
        assert!(s.poll(t0() + Duration::seconds(60), &mut rng).is_empty());
    }

    #[test]
    fn message_ids_are_unique_and_ordered() {
        let mut s = session(OverlapPolicy::Allow);
        s.submit("one", t0());
        s.submit("two", t0());
        let ids: Vec<_> = s.messages().iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, vec!["msg-1", "msg-2", "msg-3"]);
    }

    #[test]
    fn pending_category_reflects_next_due_reply() {
        let mut s = session(OverlapPolicy::Reject);
        s.submit("show me active incidents", t0());
        assert_eq!(s.pending_category(), Some(Category::Safety));
    }
}
