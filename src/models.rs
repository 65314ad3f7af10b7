use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub const MOMENTUM: &str = "Market Momentum";
pub const VOLATILITY: &str = "Market Volatility";

/// Score and weight used whenever a reading cannot be computed.
pub const NEUTRAL_SCORE: f64 = 50.0;
pub const DEFAULT_WEIGHT: f64 = 0.5;

/// One daily OHLCV observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Extract the close series the indicators work on.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    // The name is the key of the enclosing map in the JSON form.
    #[serde(skip)]
    pub name: String,
    pub value: f64,
    pub weight: f64,
}

impl Indicator {
    pub fn new(name: &str, value: f64, weight: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
            weight,
        }
    }

    pub fn neutral(name: &str) -> Self {
        Self::new(name, NEUTRAL_SCORE, DEFAULT_WEIGHT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    #[serde(serialize_with = "serialize_instant", deserialize_with = "deserialize_instant")]
    pub timestamp: DateTime<Utc>,
    pub current_index: u8,
    #[serde(deserialize_with = "deserialize_indicators")]
    pub indicators: BTreeMap<String, Indicator>,
}

impl IndexResult {
    /// The result served when no reading could be produced at all.
    pub fn neutral(timestamp: DateTime<Utc>) -> Self {
        let indicators = [Indicator::neutral(MOMENTUM), Indicator::neutral(VOLATILITY)]
            .into_iter()
            .map(|i| (i.name.clone(), i))
            .collect();

        Self {
            timestamp,
            current_index: NEUTRAL_SCORE as u8,
            indicators,
        }
    }

    pub fn indicator(&self, name: &str) -> Option<&Indicator> {
        self.indicators.get(name)
    }

    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_score(f64::from(self.current_index))
    }
}

fn serialize_instant<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn deserialize_instant<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

// Restore the names dropped on serialization from the map keys.
fn deserialize_indicators<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, Indicator>, D::Error> {
    let mut map = BTreeMap::<String, Indicator>::deserialize(d)?;
    for (name, indicator) in map.iter_mut() {
        indicator.name = name.clone();
    }
    Ok(map)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl Sentiment {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Sentiment::ExtremeGreed
        } else if score >= 60.0 {
            Sentiment::Greed
        } else if score >= 40.0 {
            Sentiment::Neutral
        } else if score >= 20.0 {
            Sentiment::Fear
        } else {
            Sentiment::ExtremeFear
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::ExtremeFear => write!(f, "Extreme Fear"),
            Sentiment::Fear => write!(f, "Fear"),
            Sentiment::Neutral => write!(f, "Neutral"),
            Sentiment::Greed => write!(f, "Greed"),
            Sentiment::ExtremeGreed => write!(f, "Extreme Greed"),
        }
    }
}
