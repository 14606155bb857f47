use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A cell value as delivered by the data source, before normalization.
///
/// `List` covers multi-value cells (lookups, rollups, multi-selects).
/// `Object` holds a structured cell (link, attachment, user) as canonical JSON
/// text; it never has a numeric value and never equals a `Text` cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
    Object(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl<T: Into<RawValue>> From<Vec<T>> for RawValue {
    fn from(values: Vec<T>) -> Self {
        RawValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// One record handed to the engine.
///
/// `record_id` is expected to be unique, but duplicates are ranked
/// independently rather than merged.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputRecord {
    pub record_id: String,
    pub source_value: RawValue,
    /// `None` when the record has no group value (or grouping is off upstream).
    pub group_value: Option<RawValue>,
}

impl InputRecord {
    pub fn new(record_id: impl Into<String>, source_value: impl Into<RawValue>) -> Self {
        InputRecord {
            record_id: record_id.into(),
            source_value: source_value.into(),
            group_value: None,
        }
    }

    pub fn with_group(mut self, group_value: impl Into<RawValue>) -> Self {
        self.group_value = Some(group_value.into());
        self
    }
}

/// Error returned when a config option name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {option} \"{value}\" (expected one of: {expected})")]
pub struct ParseConfigError {
    pub option: &'static str,
    pub value: String,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", try_from = "String"))]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Tie handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", try_from = "String"))]
pub enum RankingMethod {
    /// 1,2,2,4
    #[default]
    Standard,
    /// 1,2,2,3
    Dense,
}

/// Whether records whose value is exactly zero take part in ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", try_from = "String"))]
pub enum ZeroValueHandling {
    #[default]
    SkipZero,
    IncludeZero,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl RankingMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RankingMethod::Standard => "standard",
            RankingMethod::Dense => "dense",
        }
    }
}

impl ZeroValueHandling {
    pub fn as_str(self) -> &'static str {
        match self {
            ZeroValueHandling::SkipZero => "skipZero",
            ZeroValueHandling::IncludeZero => "includeZero",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(ParseConfigError {
                option: "sort direction",
                value: s.to_string(),
                expected: "asc, desc",
            }),
        }
    }
}

impl FromStr for RankingMethod {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(RankingMethod::Standard),
            "dense" => Ok(RankingMethod::Dense),
            _ => Err(ParseConfigError {
                option: "ranking method",
                value: s.to_string(),
                expected: "standard, dense",
            }),
        }
    }
}

impl FromStr for ZeroValueHandling {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accepts skipZero, skip-zero, skip_zero (and the same for include).
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "skipzero" | "skip" => Ok(ZeroValueHandling::SkipZero),
            "includezero" | "include" => Ok(ZeroValueHandling::IncludeZero),
            _ => Err(ParseConfigError {
                option: "zero value handling",
                value: s.to_string(),
                expected: "skipZero, includeZero",
            }),
        }
    }
}

// Deserialization goes through `FromStr` so config files accept the same
// spellings as command-line flags.
macro_rules! impl_try_from_string {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = ParseConfigError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    )*};
}

impl_try_from_string!(SortDirection, RankingMethod, ZeroValueHandling);

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RankingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ZeroValueHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for one ranking run. Immutable for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingConfig {
    pub sort_direction: SortDirection,
    pub ranking_method: RankingMethod,
    pub zero_value_handling: ZeroValueHandling,
    /// False when no group field is configured: every record lands in one group.
    pub grouping_enabled: bool,
}

/// Input for `calculate_grouped_ranking()`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingInput {
    pub records: Vec<InputRecord>,
    pub config: RankingConfig,
}

/// Rank assigned to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankResult {
    pub record_id: String,
    /// 1-based rank within the record's group.
    pub rank: usize,
}

/// How many records were left unranked, by reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExclusionCounts {
    /// Source value absent or not a finite number.
    pub no_value: usize,
    /// Value exactly zero under `ZeroValueHandling::SkipZero`.
    pub zero_skipped: usize,
}

impl ExclusionCounts {
    pub fn total(&self) -> usize {
        self.no_value + self.zero_skipped
    }

    pub(crate) fn add(&mut self, other: ExclusionCounts) {
        self.no_value += other.no_value;
        self.zero_skipped += other.zero_skipped;
    }
}

/// Result of `calculate_grouped_ranking()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingOutcome {
    /// Ranked records, in group order and then in sorted order within each group.
    pub results: Vec<RankResult>,
    /// Groups that produced at least one ranked record.
    pub group_count: usize,
    pub excluded: ExclusionCounts,
}

impl RankingOutcome {
    /// True when nothing could be ranked. Not an error: the caller reports "no valid data".
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
