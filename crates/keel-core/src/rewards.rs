//! Rules-based card ranking engine.
//!
//! A [`RewardsTable`] maps each card to a base multiplier and per-category
//! multipliers. Ranking looks up the multiplier for the visit's spending
//! category (falling back to the card's base when the category is unmapped
//! or absent), uses the multiplier itself as the score, and attaches a
//! human-readable reason naming the matched rule. The table is versioned so
//! clients can detect stale cached reasoning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::{CardCandidate, CardRecommendation};

/// Reward multipliers for one card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRule {
    /// Multiplier applied when no category rule matches.
    pub base: f64,
    /// Category name (lowercase) → multiplier.
    #[serde(default)]
    pub categories: BTreeMap<String, f64>,
}

impl Default for RewardRule {
    fn default() -> Self {
        Self {
            base: defaults::DEFAULT_BASE_MULTIPLIER,
            categories: BTreeMap::new(),
        }
    }
}

/// A versioned reward-multiplier table. Read-mostly; swapped atomically on
/// reload, never mutated mid-request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsTable {
    pub version: String,
    pub cards: BTreeMap<String, RewardRule>,
}

impl RewardsTable {
    /// Parse a table from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("invalid rewards table: {}", e)))
    }

    /// All cards in the table, in stable (alphabetical) order. Used when a
    /// score request does not name a candidate set.
    pub fn all_candidates(&self) -> Vec<CardCandidate> {
        self.cards.keys().map(CardCandidate::new).collect()
    }

    /// Rank candidate cards for a spending category.
    ///
    /// Output is sorted descending by score; ties preserve the caller's
    /// candidate order (the sort is stable; card order is meaningful to
    /// the caller). An empty candidate list yields an empty list.
    pub fn rank(
        &self,
        category: Option<&str>,
        mcc: Option<&str>,
        candidates: &[CardCandidate],
    ) -> Vec<CardRecommendation> {
        let category = category
            .map(|c| c.to_lowercase())
            .or_else(|| mcc.and_then(category_for_mcc).map(str::to_string));

        let mut ranked: Vec<CardRecommendation> = candidates
            .iter()
            .map(|candidate| self.score_card(&candidate.name, category.as_deref()))
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }

    fn score_card(&self, card: &str, category: Option<&str>) -> CardRecommendation {
        let default_rule = RewardRule::default();
        let rule = self.cards.get(card).unwrap_or(&default_rule);

        let matched = category.and_then(|c| rule.categories.get(c).map(|m| (c, *m)));
        let (score, reason) = match matched {
            Some((cat, multiplier)) if multiplier > rule.base => {
                (multiplier, format!("{} {}", format_multiplier(multiplier), cat))
            }
            Some((_, multiplier)) => (multiplier, format!("{} base", format_multiplier(rule.base))),
            None => (rule.base, format!("{} base", format_multiplier(rule.base))),
        };

        CardRecommendation {
            card: card.to_string(),
            score,
            reason,
        }
    }
}

/// Derive a reward category from a merchant category code when the caller
/// has an MCC but no category.
pub fn category_for_mcc(mcc: &str) -> Option<&'static str> {
    match mcc {
        "5812" | "5813" | "5814" => Some("dining"),
        "5411" => Some("grocery"),
        "5541" => Some("gas"),
        "7011" | "4722" => Some("travel"),
        "5311" => Some("department_store"),
        _ => None,
    }
}

/// Render a multiplier as "4x" (or "1.5x" for fractional rates).
fn format_multiplier(multiplier: f64) -> String {
    if (multiplier - multiplier.trunc()).abs() < f64::EPSILON {
        format!("{}x", multiplier as i64)
    } else {
        format!("{:.1}x", multiplier)
    }
}
