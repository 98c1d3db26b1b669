use crate::config::ScoringRules;
use crate::error::{Result, ScoringError};
use crate::stats::{json_kind, StatField, StatRecord};
use crate::SCORE_DECIMAL_PLACES;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// A fantasy point total, rounded to two decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FantasyPoints(Decimal);

impl FantasyPoints {
    pub const ZERO: FantasyPoints = FantasyPoints(Decimal::ZERO);

    /// Round a raw total half-to-even to two places
    pub fn from_raw(total: Decimal) -> Self {
        Self(total.round_dp_with_strategy(SCORE_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_default()
    }
}

impl fmt::Display for FantasyPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Serialize for FantasyPoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Scores for a whole stats payload, one entry per player
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchScore {
    /// Players whose stats scored cleanly
    pub scores: BTreeMap<String, FantasyPoints>,

    /// Players whose stats could not be read, with the reason
    #[serde(serialize_with = "serialize_failures")]
    pub failures: BTreeMap<String, ScoringError>,
}

impl BatchScore {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn serialize_failures<S: Serializer>(
    failures: &BTreeMap<String, ScoringError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(failures.len()))?;
    for (player_id, error) in failures {
        map.serialize_entry(player_id, &error.to_string())?;
    }
    map.end()
}

/// Fantasy point calculator
#[derive(Debug, Clone, Default)]
pub struct PprCalculator {
    rules: ScoringRules,
}

impl PprCalculator {
    /// Create a calculator with custom rules
    pub fn new(rules: ScoringRules) -> Self {
        Self { rules }
    }

    /// Calculator with full PPR rules
    pub fn full_ppr() -> Self {
        Self::new(ScoringRules::full_ppr())
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    /// Score one stat record.
    ///
    /// Values near the edge of the decimal range fail with
    /// [`ScoringError::Overflow`] instead of wrapping or panicking.
    pub fn score(&self, stats: &StatRecord) -> Result<FantasyPoints> {
        let mut total = Decimal::ZERO;
        for field in StatField::ALL {
            let overflow = || ScoringError::Overflow { stat: field.key().to_string() };
            let points =
                stats.get(field).checked_mul(self.rules.weight(field)).ok_or_else(overflow)?;
            total = total.checked_add(points).ok_or_else(overflow)?;
        }
        Ok(FantasyPoints::from_raw(total))
    }

    /// Score a raw JSON stats object
    pub fn score_value(&self, raw: &Value) -> Result<FantasyPoints> {
        let stats = StatRecord::from_value(raw)?;
        self.score(&stats)
    }

    /// Score a `player_id -> stats` payload.
    ///
    /// Each player is scored independently: a malformed record lands in
    /// `failures` and never stops the rest of the batch. Only a payload that is
    /// not a mapping at all is an error.
    pub fn score_batch(&self, raw: &Value) -> Result<BatchScore> {
        let players = raw
            .as_object()
            .ok_or_else(|| ScoringError::InputShape { found: json_kind(raw).to_string() })?;

        let mut batch = BatchScore::default();
        for (player_id, stats) in players {
            match self.score_value(stats) {
                Ok(points) => {
                    batch.scores.insert(player_id.clone(), points);
                }
                Err(e) => {
                    warn!("Skipping stats for player {}: {}", player_id, e);
                    batch.failures.insert(player_id.clone(), e);
                }
            }
        }

        debug!(
            "Scored {} players ({} failed)",
            batch.scores.len(),
            batch.failures.len()
        );
        Ok(batch)
    }

    /// Score already-parsed records, preserving keys. Stops at the first
    /// record that overflows.
    pub fn score_records<'a, I>(&self, records: I) -> Result<BTreeMap<String, FantasyPoints>>
    where
        I: IntoIterator<Item = (&'a String, &'a StatRecord)>,
    {
        records
            .into_iter()
            .map(|(player_id, stats)| Ok((player_id.clone(), self.score(stats)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn score(raw: Value) -> f64 {
        PprCalculator::full_ppr().score_value(&raw).unwrap().as_f64()
    }

    #[test]
    fn test_zero_stats() {
        assert_eq!(score(json!({})), 0.0);
    }

    #[test]
    fn test_passing_stats() {
        // 350/25 + 3*6 - 1*2 = 14 + 18 - 2
        assert_eq!(score(json!({ "passing_yds": 350, "passing_tds": 3, "passing_int": 1 })), 30.0);
    }

    #[test]
    fn test_full_ppr_receiving() {
        // 8 + 120/10 + 6
        assert_eq!(score(json!({ "receptions": 8, "receiving_yds": 120, "receiving_tds": 1 })), 26.0);
    }

    #[test]
    fn test_rushing_stats() {
        assert_eq!(score(json!({ "rushing_yds": 85, "rushing_tds": 2 })), 20.5);
    }

    #[test]
    fn test_negative_points() {
        assert_eq!(score(json!({ "receptions": 0, "fumbles_lost": 1, "passing_int": 0 })), -2.0);
    }

    #[test]
    fn test_mixed_stats() {
        let stats = json!({
            "passing_yds": 250,
            "passing_tds": 2,
            "passing_int": 1,
            "rushing_yds": 30,
            "rushing_tds": 1,
            "receptions": 5,
            "receiving_yds": 45,
            "receiving_tds": 1,
            "fumbles_lost": 1
        });
        // passing 20 + rushing 9 + receiving 15.5 - fumble 2
        assert_eq!(score(stats), 42.5);
    }

    #[test]
    fn test_two_point_conversions() {
        assert_eq!(score(json!({ "passing_2pt": 1, "rushing_2pt": 1, "receiving_2pt": 1 })), 6.0);
    }

    #[test]
    fn test_decimal_rounding() {
        // 9.88 + 3.3 + 3.7
        assert_eq!(score(json!({ "passing_yds": 247, "rushing_yds": 33, "receiving_yds": 37 })), 16.88);
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 1/25 * 1.125 = 0.045 -> 0.04, 1/25 * 1.375 = 0.055 -> 0.06
        assert_eq!(score(json!({ "passing_yds": 1.125 })), 0.04);
        assert_eq!(score(json!({ "passing_yds": 1.375 })), 0.06);
    }

    #[test]
    fn test_invalid_input() {
        let err = PprCalculator::full_ppr().score_value(&json!("not a dict")).unwrap_err();
        assert!(matches!(err, ScoringError::InputShape { .. }));

        let err = PprCalculator::full_ppr()
            .score_value(&json!({ "passing_yds": "lots" }))
            .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidStatValue { .. }));
    }

    #[test]
    fn test_display_keeps_two_places() {
        let points = PprCalculator::full_ppr().score_value(&json!({ "receptions": 3 })).unwrap();
        assert_eq!(points.to_string(), "3.00");
        assert_eq!(serde_json::to_value(points).unwrap(), json!(3.0));
    }

    #[test]
    fn test_half_ppr_rules() {
        let calculator = PprCalculator::new(ScoringRules::half_ppr());
        let points =
            calculator.score_value(&json!({ "receptions": 8, "receiving_yds": 120 })).unwrap();
        assert_eq!(points.as_f64(), 16.0);
    }

    #[test]
    fn test_batch_preserves_keys_and_isolates_failures() {
        let payload = json!({
            "4046": { "passing_yds": 350, "passing_tds": 3, "passing_int": 1 },
            "6794": { "receptions": "eight" },
            "9509": { "rushing_yds": 85, "rushing_tds": 2 },
            "1234": []
        });

        let batch = PprCalculator::full_ppr().score_batch(&payload).unwrap();

        assert_eq!(batch.len(), 4);
        assert!(!batch.is_complete());
        assert_eq!(batch.scores["4046"].as_f64(), 30.0);
        assert_eq!(batch.scores["9509"].as_f64(), 20.5);
        assert!(matches!(batch.failures["6794"], ScoringError::InvalidStatValue { .. }));
        assert!(matches!(batch.failures["1234"], ScoringError::InputShape { .. }));
    }

    #[test]
    fn test_batch_rejects_non_mapping_payload() {
        let err = PprCalculator::full_ppr().score_batch(&json!([{ "receptions": 1 }])).unwrap_err();
        assert_eq!(err, ScoringError::InputShape { found: "array".to_string() });
    }

    #[test]
    fn test_batch_serializes_failures_as_messages() {
        let batch =
            PprCalculator::full_ppr().score_batch(&json!({ "1": { "receptions": null } })).unwrap();
        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(value["scores"], json!({}));
        assert!(value["failures"]["1"].as_str().unwrap().contains("receptions"));
    }

    #[test]
    fn test_score_records() {
        let mut records = BTreeMap::new();
        records.insert("a".to_string(), StatRecord::new().with(StatField::FumblesLost, 2));
        records.insert("b".to_string(), StatRecord::new().with(StatField::Receptions, 7));

        let scores = PprCalculator::full_ppr().score_records(&records).unwrap();
        assert_eq!(scores["a"].as_f64(), -4.0);
        assert_eq!(scores["b"].as_f64(), 7.0);

        records.insert("c".to_string(), StatRecord::new().with(StatField::PassingTouchdowns, Decimal::MAX));
        let err = PprCalculator::full_ppr().score_records(&records).unwrap_err();
        assert_eq!(err, ScoringError::Overflow { stat: "passing_tds".to_string() });
    }

    #[test]
    fn test_overflow_is_an_error() {
        let err = PprCalculator::full_ppr()
            .score_value(&json!({ "receiving_tds": "79228162514264337593543950335" }))
            .unwrap_err();
        assert_eq!(err, ScoringError::Overflow { stat: "receiving_tds".to_string() });

        // Each term fits, the sum does not
        let err = PprCalculator::full_ppr()
            .score_value(&json!({
                "receptions": "79228162514264337593543950335",
                "receiving_2pt": "20000000000000000000000000000"
            }))
            .unwrap_err();
        assert!(matches!(err, ScoringError::Overflow { .. }));
    }

    #[test]
    fn test_batch_isolates_overflow() {
        let payload = json!({
            "ok": { "receptions": 3 },
            "huge": { "receiving_tds": "79228162514264337593543950335" }
        });

        let batch = PprCalculator::full_ppr().score_batch(&payload).unwrap();
        assert_eq!(batch.scores["ok"].as_f64(), 3.0);
        assert!(matches!(batch.failures["huge"], ScoringError::Overflow { .. }));
    }

    proptest! {
        #[test]
        fn prop_score_is_order_independent(
            values in proptest::collection::vec(0i64..500, StatField::ALL.len())
        ) {
            let calculator = PprCalculator::full_ppr();

            let forward: StatRecord =
                StatField::ALL.iter().zip(&values).map(|(f, v)| (*f, Decimal::from(*v))).collect();
            let reversed: StatRecord = StatField::ALL
                .iter()
                .rev()
                .zip(values.iter().rev())
                .map(|(f, v)| (*f, Decimal::from(*v)))
                .collect();

            let first = calculator.score(&forward).unwrap();
            prop_assert_eq!(first, calculator.score(&reversed).unwrap());
            prop_assert_eq!(first, calculator.score(&forward).unwrap());
        }

        #[test]
        fn prop_score_has_at_most_two_places(yards in -1000i64..1000, hundredths in 0i64..100) {
            let raw = Decimal::new(yards * 100 + hundredths, 2);
            let stats = StatRecord::new().with(StatField::PassingYards, raw);
            let points = PprCalculator::full_ppr().score(&stats).unwrap();
            prop_assert!(points.as_decimal().scale() <= 2);
        }
    }
}
