//! AI relevance ranking.
//!
//! Candidates are sent to a chat-completions service which replies with
//! `{index, score}` pairs. Every failure path falls back to feed order.

pub mod client;
pub mod filter;
pub mod parse;

pub use client::ChatClient;
pub use filter::{apply_rankings, build_prompt, RelevanceFilter};
pub use parse::{extract_array, parse_rankings, parse_strict, ParseError, Ranking};
