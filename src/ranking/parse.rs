//! Ranking reply parsing.
//!
//! Replies are decoded in two stages. [`parse_strict`] accepts only a reply
//! that is a JSON array as a whole. When that fails, [`extract_array`]
//! pulls the outermost `[...]` span out of the surrounding prose and that
//! span is decoded instead. [`parse_rankings`] chains the two.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// One ranked position returned by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    /// Index into the submitted candidate list.
    pub index: usize,
    /// Relevance score, 0 to 10.
    pub score: Option<f64>,
}

/// Why a reply could not be turned into rankings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The reply contains no bracketed span at all.
    #[error("no JSON array found in reply")]
    NoArray,
    /// The reply decoded to something other than an array.
    #[error("reply is JSON but not an array")]
    NotAnArray,
    /// The bracketed span is not valid JSON.
    #[error("invalid JSON: {0}")]
    Invalid(String),
}

fn array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid array regex"))
}

/// Decode the whole reply as a JSON array of rankings.
pub fn parse_strict(reply: &str) -> Result<Vec<Ranking>, ParseError> {
    match serde_json::from_str::<Value>(reply.trim()) {
        Ok(Value::Array(items)) => Ok(rankings_from(items)),
        Ok(_) => Err(ParseError::NotAnArray),
        Err(e) => Err(ParseError::Invalid(e.to_string())),
    }
}

/// The span from the first `[` to the last `]`, if any.
pub fn extract_array(reply: &str) -> Option<&str> {
    array_re().find(reply).map(|m| m.as_str())
}

/// Parse a reply, falling back to array extraction when strict decoding fails.
pub fn parse_rankings(reply: &str) -> Result<Vec<Ranking>, ParseError> {
    let strict_err = match parse_strict(reply) {
        Ok(rankings) => return Ok(rankings),
        Err(e) => e,
    };

    match extract_array(reply) {
        Some(span) => parse_strict(span),
        None if strict_err == ParseError::NotAnArray => Err(ParseError::NotAnArray),
        None => Err(ParseError::NoArray),
    }
}

/// Keep elements that carry a usable non-negative integer `index`.
fn rankings_from(items: Vec<Value>) -> Vec<Ranking> {
    items
        .iter()
        .filter_map(|item| {
            let index = item.get("index")?.as_u64()?;
            Some(Ranking {
                index: usize::try_from(index).ok()?,
                score: item.get("score").and_then(Value::as_f64),
            })
        })
        .collect()
}
