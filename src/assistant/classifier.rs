/// Query classification for response routing.
///
/// Maps a free-text query to exactly one topic [`Category`] via ordered
/// case-insensitive substring rules. The rule order is significant: a query
/// like "emergency route closures" mentions both a safety keyword and a
/// traffic keyword, and precedence decides which catalog answers it.
/// Traffic rules are checked first, then safety, then planning, then
/// transit; anything unmatched falls back to [`Category::General`], so
/// classification is total — every query gets a category, nothing panics.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Topic bucket for routing a query to a canned response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Traffic flow, congestion, routing.
    Traffic,
    /// Public safety incidents and emergency response.
    Safety,
    /// Urban planning, air quality, environment.
    Planning,
    /// Public transportation and transit coverage.
    Transit,
    /// Fallback for everything else.
    General,
}

impl Category {
    /// All categories, in rule-precedence order with the fallback last.
    pub const ALL: [Category; 5] = [
        Category::Traffic,
        Category::Safety,
        Category::Planning,
        Category::Transit,
        Category::General,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Traffic => write!(f, "traffic"),
            Self::Safety => write!(f, "safety"),
            Self::Planning => write!(f, "planning"),
            Self::Transit => write!(f, "transit"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Ordered rule table. First rule whose keyword set matches wins.
const RULES: &[(Category, &[&str])] = &[
    (Category::Traffic, &["traffic", "route"]),
    (Category::Safety, &["safety", "incident", "emergency"]),
    (Category::Planning, &["air", "planning", "quality"]),
    (Category::Transit, &["transport", "transit"]),
];

/// Classify a query into its topic category.
///
/// Pure and infallible: unmatched queries (including empty strings) return
/// [`Category::General`].
pub fn classify(query: &str) -> Category {
    let lowered = query.to_lowercase();

    for (category, keywords) in RULES {
        if keywords.iter().any(|kw| lowered.contains(kw)) {
            return *category;
        }
    }

    Category::General
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traffic_keywords_classify_as_traffic() {
        assert_eq!(classify("What's the current traffic situation?"), Category::Traffic);
        assert_eq!(classify("fastest route to the airport"), Category::Traffic);
    }

    #[test]
    fn safety_keywords_classify_as_safety() {
        assert_eq!(classify("Show me all active public safety incidents"), Category::Safety);
        assert_eq!(classify("any incident downtown?"), Category::Safety);
        assert_eq!(classify("average emergency response time"), Category::Safety);
    }

    #[test]
    fn planning_keywords_classify_as_planning() {
        assert_eq!(classify("How is the air quality today?"), Category::Planning);
        assert_eq!(classify("urban planning insights"), Category::Planning);
    }

    #[test]
    fn transit_keywords_classify_as_transit() {
        assert_eq!(classify("public transport coverage gaps"), Category::Transit);
        assert_eq!(classify("transit ridership trends"), Category::Transit);
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("TRAFFIC on 5th Avenue"), Category::Traffic);
        assert_eq!(classify("Air Quality Analysis"), Category::Planning);
    }

    #[test]
    fn unmatched_queries_fall_back_to_general() {
        assert_eq!(classify("show me the energy consumption"), Category::General);
        assert_eq!(classify(""), Category::General);
        assert_eq!(classify("   "), Category::General);
    }

    // Precedence: queries matching multiple keyword sets must resolve by
    // rule order, not by which keyword appears first in the text.

    #[test]
    fn traffic_takes_precedence_over_safety() {
        assert_eq!(classify("emergency route closures"), Category::Traffic);
        assert_eq!(classify("incident blocking traffic"), Category::Traffic);
    }

    #[test]
    fn safety_takes_precedence_over_planning() {
        assert_eq!(classify("air incident near the plant"), Category::Safety);
    }

    #[test]
    fn planning_takes_precedence_over_transit() {
        assert_eq!(classify("transit air quality impact"), Category::Planning);
    }
}
