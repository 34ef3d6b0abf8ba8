/// Playlist domain types
use super::Track;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User playlist, either an explicit track list or a smart rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,

    /// Ordered track ids (ignored for smart playlists)
    #[serde(default)]
    pub track_ids: Vec<String>,

    /// Creation time, epoch milliseconds
    pub created_at: i64,

    /// Last modification time, epoch milliseconds
    pub updated_at: i64,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub smart: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<SmartRule>,

    #[serde(default)]
    pub rule_match: RuleMatch,
}

impl Playlist {
    /// Tracks of this playlist, resolved against the library
    ///
    /// Smart playlists compute membership from their rules in library order;
    /// explicit playlists keep their stored order and drop ids that no longer
    /// resolve.
    pub fn resolve<'a>(&self, library: &'a [Track]) -> Vec<&'a Track> {
        if self.smart {
            return library.iter().filter(|t| self.matches(t)).collect();
        }

        let by_id: HashMap<&str, &Track> = library.iter().map(|t| (t.id.as_str(), t)).collect();
        self.track_ids
            .iter()
            .filter_map(|id| by_id.get(id.as_str()).copied())
            .collect()
    }

    /// Whether `track` satisfies the rule set; an empty rule set matches nothing
    pub fn matches(&self, track: &Track) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        match self.rule_match {
            RuleMatch::All => self.rules.iter().all(|r| r.matches(track)),
            RuleMatch::Any => self.rules.iter().any(|r| r.matches(track)),
        }
    }
}

/// How smart rules combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMatch {
    #[default]
    All,
    Any,
}

/// Track field a smart rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleField {
    Genre,
    Year,
    Artist,
    Album,
    Duration,
    Title,
    Bpm,
}

/// Comparison a smart rule applies
///
/// `equals`, `greater` and `less` are accepted as aliases written by older
/// releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOperator {
    #[serde(alias = "equals")]
    Is,
    Contains,
    Starts,
    #[serde(alias = "greater")]
    Gt,
    #[serde(alias = "less")]
    Lt,
    Between,
}

/// Operand of a smart rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
}

impl RuleValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// A single smart playlist condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartRule {
    pub field: RuleField,
    pub operator: RuleOperator,
    pub value: RuleValue,
    /// Upper bound for `between`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<RuleValue>,
}

enum FieldValue<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

impl SmartRule {
    fn field_value<'a>(&self, track: &'a Track) -> FieldValue<'a> {
        match self.field {
            RuleField::Genre => FieldValue::Text(&track.genre),
            RuleField::Artist => FieldValue::Text(&track.artist),
            RuleField::Album => FieldValue::Text(&track.album),
            RuleField::Title => FieldValue::Text(&track.title),
            RuleField::Year => FieldValue::Number(Some(f64::from(track.year))),
            RuleField::Duration => FieldValue::Number(Some(track.duration)),
            RuleField::Bpm => FieldValue::Number(track.credits.bpm.map(f64::from)),
        }
    }

    /// Whether `track` satisfies this rule
    pub fn matches(&self, track: &Track) -> bool {
        match self.field_value(track) {
            FieldValue::Text(actual) => {
                let actual = actual.to_lowercase();
                let wanted = self.value.as_text().to_lowercase();
                match self.operator {
                    RuleOperator::Is => actual == wanted,
                    RuleOperator::Contains => actual.contains(&wanted),
                    RuleOperator::Starts => actual.starts_with(&wanted),
                    RuleOperator::Gt | RuleOperator::Lt | RuleOperator::Between => false,
                }
            }
            FieldValue::Number(None) => false,
            FieldValue::Number(Some(actual)) => {
                let Some(wanted) = self.value.as_number() else {
                    return false;
                };
                match self.operator {
                    RuleOperator::Is => (actual - wanted).abs() < f64::EPSILON,
                    RuleOperator::Gt => actual > wanted,
                    RuleOperator::Lt => actual < wanted,
                    RuleOperator::Between => self
                        .value2
                        .as_ref()
                        .and_then(RuleValue::as_number)
                        .is_some_and(|upper| actual >= wanted && actual <= upper),
                    RuleOperator::Contains => {
                        actual.to_string().contains(&self.value.as_text())
                    }
                    RuleOperator::Starts => {
                        actual.to_string().starts_with(&self.value.as_text())
                    }
                }
            }
        }
    }
}
