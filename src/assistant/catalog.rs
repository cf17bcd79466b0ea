//! Static response catalog and quick-query shortcuts.
//!
//! Every category owns a fixed set of canned payloads. Two selection
//! policies exist:
//!
//! - [`SelectionPolicy::Deterministic`] — one enriched payload per category
//!   with a structured attachment (locations, labeled metrics,
//!   recommendations); the general fallback carries plain text only.
//! - [`SelectionPolicy::Random`] — uniform pick among a short list of
//!   plain-text candidates, drawn through the injected random source.
//!
//! The catalog is exhaustive over the closed category set by construction,
//! so selection never fails.

use serde::{Deserialize, Serialize};

use crate::assistant::classifier::Category;
use crate::rng::RandomSource;

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Direction of a metric inside an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

/// One labeled metric row inside an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentMetric {
    pub label: String,
    pub value: String,
    pub trend: Trend,
}

/// Structured sub-content embedded in an enriched assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub locations: Vec<String>,
    pub metrics: Vec<AttachmentMetric>,
    pub recommendations: Vec<String>,
}

/// A canned response: text plus an optional structured attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl ResponsePayload {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            attachment: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection policy
// ---------------------------------------------------------------------------

/// How a payload is chosen within a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Always return the category's single enriched payload.
    #[default]
    Deterministic,
    /// Uniform pick among the category's short-answer candidates.
    Random,
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deterministic => write!(f, "deterministic"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Select a response payload for a category.
///
/// The random source is only consulted under [`SelectionPolicy::Random`].
pub fn select_response(
    category: Category,
    policy: SelectionPolicy,
    rng: &mut dyn RandomSource,
) -> ResponsePayload {
    match policy {
        SelectionPolicy::Deterministic => enriched_response(category),
        SelectionPolicy::Random => {
            let candidates = short_answers(category);
            ResponsePayload::plain(candidates[rng.pick_index(candidates.len())])
        }
    }
}

// ---------------------------------------------------------------------------
// Deterministic enriched payloads
// ---------------------------------------------------------------------------

fn enriched_response(category: Category) -> ResponsePayload {
    match category {
        Category::Traffic => ResponsePayload {
            text: "Based on current traffic data analysis, here's what I found:".to_string(),
            attachment: Some(Attachment {
                locations: strings(&[
                    "5th Avenue",
                    "Broadway",
                    "FDR Drive",
                    "West Side Highway",
                ]),
                metrics: vec![
                    metric("Average Speed", "23 mph", Trend::Down),
                    metric("Congestion Level", "68%", Trend::Up),
                    metric("Incidents", "3 active", Trend::Down),
                ],
                recommendations: strings(&[
                    "Increase traffic light timing on 5th Avenue",
                    "Deploy additional traffic officers to Broadway",
                    "Consider alternative route suggestions via mobile apps",
                ]),
            }),
        },
        Category::Safety => ResponsePayload {
            text: "Public safety scan across active incident feeds:".to_string(),
            attachment: Some(Attachment {
                locations: strings(&[
                    "Central Park West",
                    "5th Avenue & 42nd St",
                    "Times Square",
                ]),
                metrics: vec![
                    metric("Active Incidents", "3", Trend::Down),
                    metric("Avg Response Time", "4.2 min", Trend::Down),
                    metric("Units Available", "14", Trend::Up),
                ],
                recommendations: strings(&[
                    "Reroute patrol coverage toward Central Park West",
                    "Keep Unit 7 assigned until the medical call clears",
                    "Escalate the 5th Avenue accident to traffic control",
                ]),
            }),
        },
        Category::Planning => ResponsePayload {
            text: "Air quality analysis for the past week shows the following trends:"
                .to_string(),
            attachment: Some(Attachment {
                locations: strings(&[
                    "Downtown",
                    "Central Park",
                    "Financial District",
                    "Brooklyn Bridge",
                ]),
                metrics: vec![
                    metric("PM2.5 Average", "28 \u{3bc}g/m\u{b3}", Trend::Down),
                    metric("AQI Score", "Good (45)", Trend::Up),
                    metric("Pollution Sources", "Traffic 65%", Trend::Down),
                ],
                recommendations: strings(&[
                    "Continue monitoring industrial areas",
                    "Promote electric vehicle adoption",
                    "Increase green spaces in high-traffic zones",
                ]),
            }),
        },
        Category::Transit => ResponsePayload {
            text: "Public transportation analysis reveals these insights:".to_string(),
            attachment: Some(Attachment {
                locations: strings(&[
                    "Outer Queens",
                    "South Brooklyn",
                    "Bronx Corridors",
                    "Staten Island",
                ]),
                metrics: vec![
                    metric("Coverage Gap", "12 areas", Trend::Down),
                    metric("Average Wait Time", "8.2 min", Trend::Up),
                    metric("Ridership", "2.4M daily", Trend::Up),
                ],
                recommendations: strings(&[
                    "Extend subway lines to underserved areas",
                    "Increase bus frequency during peak hours",
                    "Implement bus rapid transit (BRT) corridors",
                ]),
            }),
        },
        Category::General => ResponsePayload::plain(
            "I can help you analyze various aspects of urban planning including \
             traffic patterns, air quality, public transportation, pedestrian \
             flows, and infrastructure planning. Could you please specify what \
             area you'd like me to focus on?",
        ),
    }
}

// ---------------------------------------------------------------------------
// Random short-answer candidates
// ---------------------------------------------------------------------------

fn short_answers(category: Category) -> &'static [&'static str] {
    match category {
        Category::Traffic => &[
            "Current traffic flow is moderate with some congestion on Main Street. \
             Average speed is 28 mph, down 15% from normal. I recommend using \
             alternate routes via Riverside Drive.",
            "Traffic conditions are optimal in most areas. The downtown core shows \
             light congestion with an average speed of 35 mph. No major incidents \
             reported.",
        ],
        Category::Safety => &[
            "There are currently 3 active incidents: 1 traffic accident on 5th \
             Avenue (high priority), 1 noise complaint in the residential district \
             (low priority), and 1 medical emergency being handled by Unit 7.",
            "Public safety status is stable. Response times are averaging 4.2 \
             minutes, which is within target parameters. All emergency units are \
             operational.",
        ],
        Category::Planning => &[
            "Air quality index is currently 67 (moderate). PM2.5 levels are \
             elevated in the industrial district. I recommend increasing green \
             transportation initiatives in that area.",
            "Based on current data, the optimal route is via Highway 101 to \
             Airport Boulevard. Estimated travel time: 23 minutes. This route \
             avoids the construction zone on Main Street.",
        ],
        Category::Transit => &[
            "Transit coverage analysis shows 12 underserved areas, concentrated \
             in the outer boroughs. Average platform wait time is 8.2 minutes \
             and climbing during peak hours.",
            "Ridership is holding at 2.4M daily trips. The busiest corridors are \
             running at 94% capacity; consider adding express service before the \
             evening peak.",
        ],
        Category::General => &[
            "City energy consumption is at 78% of capacity. Renewable sources are \
             providing 42% of current demand. Peak usage typically occurs between \
             6-8 PM.",
            "I've analyzed the latest urban data. Would you like me to focus on \
             any specific area like transportation, safety, or environmental \
             metrics?",
        ],
    }
}

fn metric(label: &str, value: &str, trend: Trend) -> AttachmentMetric {
    AttachmentMetric {
        label: label.to_string(),
        value: value.to_string(),
        trend,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Quick queries
// ---------------------------------------------------------------------------

/// A preset query shortcut shown next to the chat input.
///
/// `category` drives badge grouping in the view layer; the reply is still
/// routed by classifying `query`, so the two can legitimately differ.
#[derive(Debug, Clone, Serialize)]
pub struct QuickQuery {
    pub id: &'static str,
    pub title: &'static str,
    pub query: &'static str,
    pub category: Category,
    pub icon: &'static str,
}

/// The static quick-query list, in display order.
pub const QUICK_QUERIES: &[QuickQuery] = &[
    QuickQuery {
        id: "1",
        title: "Current Traffic Status",
        query: "What's the current traffic situation in downtown?",
        category: Category::Traffic,
        icon: "car",
    },
    QuickQuery {
        id: "2",
        title: "Active Safety Incidents",
        query: "Show me all active public safety incidents",
        category: Category::Safety,
        icon: "shield",
    },
    QuickQuery {
        id: "3",
        title: "Air Quality Analysis",
        query: "How is the air quality today and what are the trends?",
        category: Category::Planning,
        icon: "activity",
    },
    QuickQuery {
        id: "4",
        title: "Route Optimization",
        query: "What's the fastest route from City Hall to the airport right now?",
        category: Category::Planning,
        icon: "map-pin",
    },
    QuickQuery {
        id: "5",
        title: "Emergency Response",
        query: "What's the average emergency response time this week?",
        category: Category::Safety,
        icon: "alert-triangle",
    },
    QuickQuery {
        id: "6",
        title: "Energy Usage",
        query: "Show me the current city energy consumption patterns",
        category: Category::General,
        icon: "zap",
    },
];
