use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::error::{GlossaryError, GlossaryResult};

/// Lookup key of a language: its display name, lowercased.
pub fn language_key(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Clone, Debug, FromRow)]
pub struct LanguageRow {
    pub id: i64,
    pub name: String,
    pub is_primary: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: i64,
    pub name: String,
    pub key: String,
    pub is_primary: bool,
}

impl Language {
    pub fn new(id: i64, name: &str, is_primary: bool) -> Self {
        Self {
            id,
            name: name.to_string(),
            key: language_key(name),
            is_primary,
        }
    }
}

impl From<LanguageRow> for Language {
    fn from(row: LanguageRow) -> Self {
        Self::new(row.id, &row.name, row.is_primary)
    }
}

#[allow(dead_code)]
#[derive(Clone, Debug, FromRow)]
pub struct TermRow {
    pub id: i64,
    pub term: String,
    pub definition: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[allow(dead_code)]
#[derive(Clone, Debug, FromRow)]
pub struct TranslationRow {
    pub id: i64,
    pub term_id: i64,
    pub language_id: i64,
    pub translation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One table row: a term with its text in every language it has.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WideTerm {
    pub term_id: i64,
    pub definition: String,
    pub updated_at: DateTime<Utc>,
    pub translations: BTreeMap<String, String>,
}

/// Language key to text, in the order the caller supplied them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationInput(Vec<(String, String)>);

impl TranslationInput {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationInput {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'de> Deserialize<'de> for TranslationInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = TranslationInput;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language key to translated text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Option<String>>()? {
                    entries.push((key, value.unwrap_or_default()));
                }
                Ok(TranslationInput(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// A term id as it arrives from a client: a number or a numeric string.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawTermId {
    Number(serde_json::Number),
    Text(String),
}

impl RawTermId {
    pub fn parse(&self) -> GlossaryResult<i64> {
        let parsed = match self {
            RawTermId::Number(n) => n.as_i64(),
            RawTermId::Text(s) => s.trim().parse::<i64>().ok(),
        };
        parsed
            .filter(|id| *id > 0)
            .ok_or_else(|| GlossaryError::Validation(format!("Invalid term id: {self}")))
    }
}

impl fmt::Display for RawTermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawTermId::Number(n) => write!(f, "{n}"),
            RawTermId::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for RawTermId {
    fn from(id: i64) -> Self {
        RawTermId::Number(id.into())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub reason: String,
}

/// Result of a per-item loop where single items may fail without aborting
/// the rest.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub applied: usize,
    pub removed: usize,
    pub failures: Vec<ItemFailure>,
}

impl BatchOutcome {
    pub fn fail(&mut self, item: impl Into<String>, reason: impl ToString) {
        self.failures.push(ItemFailure {
            item: item.into(),
            reason: reason.to_string(),
        });
    }
}

/// Uniform `{success, message}` reply of every mutating operation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<i64>,
    #[serde(flatten)]
    pub outcome: Option<BatchOutcome>,
}

impl OperationResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            term_id: None,
            outcome: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            term_id: None,
            outcome: None,
        }
    }

    pub fn with_term_id(mut self, term_id: i64) -> Self {
        self.term_id = Some(term_id);
        self
    }

    pub fn with_outcome(mut self, outcome: BatchOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

impl From<GlossaryError> for OperationResult {
    fn from(err: GlossaryError) -> Self {
        OperationResult::failure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_input_keeps_request_order() {
        let input: TranslationInput =
            serde_json::from_str(r#"{"spanish":"Hola","french":"Bonjour","german":null}"#)
                .expect("parse");
        let keys: Vec<_> = input.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["spanish", "french", "german"]);
        assert_eq!(input.iter().last(), Some(("german", "")));
    }

    #[test]
    fn term_id_accepts_numbers_and_numeric_strings() {
        let number: RawTermId = serde_json::from_str("42").expect("number");
        let text: RawTermId = serde_json::from_str(r#"" 7 ""#).expect("text");
        assert_eq!(number.parse().expect("valid"), 42);
        assert_eq!(text.parse().expect("valid"), 7);
    }

    #[test]
    fn term_id_rejects_malformed_values() {
        for raw in [r#""abc""#, "0", "-3", "1.5", r#""""#] {
            let id: RawTermId = serde_json::from_str(raw).expect("deserialize");
            let err = id.parse().expect_err("should be rejected");
            assert!(err.to_string().starts_with("Invalid term id"), "{raw}: {err}");
        }
    }

    #[test]
    fn operation_result_omits_absent_fields() {
        let json = serde_json::to_value(OperationResult::ok("done")).expect("json");
        assert_eq!(json, serde_json::json!({ "success": true, "message": "done" }));

        let json = serde_json::to_value(
            OperationResult::ok("added")
                .with_term_id(3)
                .with_outcome(BatchOutcome {
                    applied: 2,
                    ..BatchOutcome::default()
                }),
        )
        .expect("json");
        assert_eq!(json["termId"], 3);
        assert_eq!(json["applied"], 2);
        assert_eq!(json["failures"], serde_json::json!([]));
    }
}
