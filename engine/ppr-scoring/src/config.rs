use crate::stats::{decimal_from_json, StatField};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Points awarded per unit of each stat
///
/// Yardage weights are points per yard (1/25 = 0.04 for passing), which keeps
/// the whole computation exact in decimal arithmetic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Points per passing yard
    pub passing_yard: Decimal,

    /// Points per passing touchdown
    pub passing_touchdown: Decimal,

    /// Points per interception thrown (negative)
    pub interception: Decimal,

    /// Points per rushing yard
    pub rushing_yard: Decimal,

    /// Points per rushing touchdown
    pub rushing_touchdown: Decimal,

    /// Points per reception (1.0 in full PPR)
    pub reception: Decimal,

    /// Points per receiving yard
    pub receiving_yard: Decimal,

    /// Points per receiving touchdown
    pub receiving_touchdown: Decimal,

    /// Points per fumble lost (negative)
    pub fumble_lost: Decimal,

    /// Points per two-point conversion of any kind
    pub two_point_conversion: Decimal,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::full_ppr()
    }
}

impl ScoringRules {
    /// Full point-per-reception scoring
    pub fn full_ppr() -> Self {
        Self {
            passing_yard: Decimal::new(4, 2),     // 1 point per 25 yards
            passing_touchdown: Decimal::from(6),
            interception: Decimal::from(-2),
            rushing_yard: Decimal::new(1, 1),     // 1 point per 10 yards
            rushing_touchdown: Decimal::from(6),
            reception: Decimal::ONE,
            receiving_yard: Decimal::new(1, 1),   // 1 point per 10 yards
            receiving_touchdown: Decimal::from(6),
            fumble_lost: Decimal::from(-2),
            two_point_conversion: Decimal::from(2),
        }
    }

    /// Half point per reception
    pub fn half_ppr() -> Self {
        Self { reception: Decimal::new(5, 1), ..Self::full_ppr() }
    }

    /// No points for receptions
    pub fn standard() -> Self {
        Self { reception: Decimal::ZERO, ..Self::full_ppr() }
    }

    /// Weight applied to one stat field
    pub fn weight(&self, field: StatField) -> Decimal {
        match field {
            StatField::PassingYards => self.passing_yard,
            StatField::PassingTouchdowns => self.passing_touchdown,
            StatField::Interceptions => self.interception,
            StatField::RushingYards => self.rushing_yard,
            StatField::RushingTouchdowns => self.rushing_touchdown,
            StatField::Receptions => self.reception,
            StatField::ReceivingYards => self.receiving_yard,
            StatField::ReceivingTouchdowns => self.receiving_touchdown,
            StatField::FumblesLost => self.fumble_lost,
            StatField::PassingTwoPoint
            | StatField::RushingTwoPoint
            | StatField::ReceivingTwoPoint => self.two_point_conversion,
        }
    }

    /// Overlay a league's `scoring_settings` object on these rules.
    ///
    /// Keys follow the league endpoint (`pass_yd`, `rec`, `fum_lost`, ...). Unknown
    /// keys and non-numeric values are skipped.
    pub fn with_league_settings(mut self, settings: &Value) -> Self {
        let Some(map) = settings.as_object() else {
            return self;
        };

        let read = |key: &str| map.get(key).and_then(decimal_from_json);

        // Two-point conversions share one weight; the passing value wins when a
        // league splits them by type.
        for key in ["rec_2pt", "rush_2pt", "pass_2pt"] {
            if let Some(value) = read(key) {
                self.two_point_conversion = value;
            }
        }

        let overlays: [(&str, &mut Decimal); 9] = [
            ("pass_yd", &mut self.passing_yard),
            ("pass_td", &mut self.passing_touchdown),
            ("pass_int", &mut self.interception),
            ("rush_yd", &mut self.rushing_yard),
            ("rush_td", &mut self.rushing_touchdown),
            ("rec", &mut self.reception),
            ("rec_yd", &mut self.receiving_yard),
            ("rec_td", &mut self.receiving_touchdown),
            ("fum_lost", &mut self.fumble_lost),
        ];
        for (key, slot) in overlays {
            if let Some(value) = read(key) {
                debug!("League scoring override {} = {}", key, value);
                *slot = value;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_presets_differ_only_in_reception_weight() {
        let full = ScoringRules::full_ppr();
        let half = ScoringRules::half_ppr();
        let standard = ScoringRules::standard();

        assert_eq!(full.reception, Decimal::ONE);
        assert_eq!(half.reception, Decimal::new(5, 1));
        assert_eq!(standard.reception, Decimal::ZERO);
        assert_eq!(ScoringRules { reception: Decimal::ONE, ..half }, full);
        assert_eq!(ScoringRules::default(), full);
    }

    #[test]
    fn test_league_settings_overlay() {
        let settings = json!({
            "pass_td": 4.0,
            "rec": 0.5,
            "pass_yd": 0.04,
            "bonus_rec_te": 0.5,
            "fum_lost": "bad"
        });
        let rules = ScoringRules::full_ppr().with_league_settings(&settings);

        assert_eq!(rules.passing_touchdown, Decimal::from(4));
        assert_eq!(rules.reception, Decimal::new(5, 1));
        assert_eq!(rules.passing_yard, Decimal::new(4, 2));
        assert_eq!(rules.fumble_lost, Decimal::from(-2));
    }

    #[test]
    fn test_league_settings_ignores_non_object() {
        let rules = ScoringRules::standard().with_league_settings(&json!(null));
        assert_eq!(rules, ScoringRules::standard());
    }

    #[test]
    fn test_rules_deserialize_from_numbers() {
        let rules: ScoringRules = serde_json::from_value(json!({
            "passing_yard": 0.04,
            "passing_touchdown": 4,
            "interception": -1,
            "rushing_yard": 0.1,
            "rushing_touchdown": 6,
            "reception": 0.5,
            "receiving_yard": 0.1,
            "receiving_touchdown": 6,
            "fumble_lost": -2,
            "two_point_conversion": 2
        }))
        .unwrap();
        assert_eq!(rules.passing_touchdown, Decimal::from(4));
        assert_eq!(rules.reception, Decimal::new(5, 1));
    }
}
