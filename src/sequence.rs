//! Decoration sequence parsing.
//!
//! The upstream backend encodes the chain of decoration teams a glass
//! component passes through as an underscore-joined string, e.g.
//! `"printing_coating_foiling"`. The string is parsed once at ingestion;
//! everything downstream works with the ordered form and never re-parses.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Identifier of a decoration team (e.g. `printing`, `coating`, `foiling`).
///
/// Team identifiers are lowercase tokens on the wire; comparison is exact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for TeamId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Ordered chain of teams a component must pass through.
///
/// Serializes to and from the upstream's underscore-joined encoding. An
/// empty sequence means the component has no decoration workflow.
#[derive(Clone, Debug, Default, PartialEq, Eq, ToSchema)]
#[schema(value_type = String, example = "printing_coating_foiling")]
pub struct DecoSequence(Vec<TeamId>);

impl DecoSequence {
    /// Parses the wire encoding: splits on `_`, discards empty tokens and
    /// preserves order. An empty string yields an empty sequence.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split('_')
                .filter(|token| !token.is_empty())
                .map(TeamId::from)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn teams(&self) -> &[TeamId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &TeamId> {
        self.0.iter()
    }

    /// Zero-based position of `team` in the chain, if present.
    pub fn position_of(&self, team: &TeamId) -> Option<usize> {
        self.0.iter().position(|t| t == team)
    }

    pub fn contains(&self, team: &TeamId) -> bool {
        self.position_of(team).is_some()
    }

    /// The team uniquely responsible for vehicle approval.
    pub fn first(&self) -> Option<&TeamId> {
        self.0.first()
    }

    pub fn is_first(&self, team: &TeamId) -> bool {
        self.first() == Some(team)
    }

    /// The team immediately upstream of `team`, if any.
    pub fn previous_of(&self, team: &TeamId) -> Option<&TeamId> {
        match self.position_of(team)? {
            0 => None,
            pos => self.0.get(pos - 1),
        }
    }

    /// The wire encoding (`a_b_c`).
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(TeamId::as_str)
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for DecoSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromIterator<TeamId> for DecoSequence {
    fn from_iter<I: IntoIterator<Item = TeamId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for DecoSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for DecoSequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null and absent both mean "no decoration chain"
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Self::parse).unwrap_or_default())
    }
}
