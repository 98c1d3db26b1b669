//! Raw stat records as reported by the Sleeper stats endpoints

use crate::error::{Result, ScoringError};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Stat counters that contribute to a fantasy score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatField {
    PassingYards,
    PassingTouchdowns,
    Interceptions,
    RushingYards,
    RushingTouchdowns,
    Receptions,
    ReceivingYards,
    ReceivingTouchdowns,
    FumblesLost,
    PassingTwoPoint,
    RushingTwoPoint,
    ReceivingTwoPoint,
}

impl StatField {
    pub const ALL: [StatField; 12] = [
        StatField::PassingYards,
        StatField::PassingTouchdowns,
        StatField::Interceptions,
        StatField::RushingYards,
        StatField::RushingTouchdowns,
        StatField::Receptions,
        StatField::ReceivingYards,
        StatField::ReceivingTouchdowns,
        StatField::FumblesLost,
        StatField::PassingTwoPoint,
        StatField::RushingTwoPoint,
        StatField::ReceivingTwoPoint,
    ];

    /// Key used by the stats payload
    pub fn key(self) -> &'static str {
        match self {
            StatField::PassingYards => "passing_yds",
            StatField::PassingTouchdowns => "passing_tds",
            StatField::Interceptions => "passing_int",
            StatField::RushingYards => "rushing_yds",
            StatField::RushingTouchdowns => "rushing_tds",
            StatField::Receptions => "receptions",
            StatField::ReceivingYards => "receiving_yds",
            StatField::ReceivingTouchdowns => "receiving_tds",
            StatField::FumblesLost => "fumbles_lost",
            StatField::PassingTwoPoint => "passing_2pt",
            StatField::RushingTwoPoint => "rushing_2pt",
            StatField::ReceivingTwoPoint => "receiving_2pt",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One player's stat counters. Unset fields read as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatRecord {
    values: BTreeMap<StatField, Decimal>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, field: StatField, value: impl Into<Decimal>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: StatField, value: impl Into<Decimal>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: StatField) -> Decimal {
        self.values.get(&field).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatField, Decimal)> + '_ {
        self.values.iter().map(|(field, value)| (*field, *value))
    }

    /// Build a record from a raw JSON stats object.
    ///
    /// Only scoring keys are read; the provider sends many others (games played,
    /// snap counts, precomputed points) and those are ignored. A scoring key whose
    /// value cannot be read as a number is an error.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let map = raw
            .as_object()
            .ok_or_else(|| ScoringError::InputShape { found: json_kind(raw).to_string() })?;

        let mut record = StatRecord::new();
        for field in StatField::ALL {
            if let Some(value) = map.get(field.key()) {
                record.set(field, coerce_stat(field, value)?);
            }
        }
        Ok(record)
    }
}

impl FromIterator<(StatField, Decimal)> for StatRecord {
    fn from_iter<I: IntoIterator<Item = (StatField, Decimal)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

impl TryFrom<&Value> for StatRecord {
    type Error = ScoringError;

    fn try_from(raw: &Value) -> Result<Self> {
        StatRecord::from_value(raw)
    }
}

impl<'de> Deserialize<'de> for StatRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        StatRecord::from_value(&raw).map_err(serde::de::Error::custom)
    }
}

fn coerce_stat(field: StatField, value: &Value) -> Result<Decimal> {
    let invalid = || ScoringError::InvalidStatValue {
        stat: field.key().to_string(),
        value: value.to_string(),
    };

    match value {
        Value::Number(_) => decimal_from_json(value).ok_or_else(invalid),
        Value::String(text) => parse_decimal(text.trim()).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}

/// Read a JSON number as an exact decimal.
///
/// Goes through the number's shortest textual form so `0.04` stays `0.04`
/// instead of picking up binary float noise.
pub(crate) fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)).ok()
}

/// Human-readable name of a JSON value's type
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
