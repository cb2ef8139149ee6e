//! Keyword cascade and oracle label parsing for intent classification.

use helpdesk_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::types::Intent;

/// Four digits in a row anywhere, including inside longer tokens.
static ORDER_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").unwrap());

pub const ORDER_KEYWORDS: &[&str] = &["order", "track", "where is my order", "order id"];
pub const FAQ_KEYWORDS: &[&str] = &["return", "refund", "cancel", "warranty", "shipping"];
pub const RECOMMENDATION_KEYWORDS: &[&str] = &[
    "recommend",
    "suggest",
    "which phone",
    "what should i buy",
    "recommendation",
];

/// Intent decided by keywords alone, or `None` when the oracle must decide.
///
/// Rules in priority order: order keywords, FAQ keywords, recommendation
/// keywords, then any run of four or more digits.
pub fn classify_heuristic(text: &str) -> Option<Intent> {
    let lowered = text.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if has_any(ORDER_KEYWORDS) {
        Some(Intent::Order)
    } else if has_any(FAQ_KEYWORDS) {
        Some(Intent::Faq)
    } else if has_any(RECOMMENDATION_KEYWORDS) {
        Some(Intent::Recommendation)
    } else if ORDER_DIGITS_RE.is_match(text) {
        Some(Intent::Order)
    } else {
        None
    }
}

pub fn classification_prompt(text: &str) -> String {
    format!(
        "Classify the user's intent into exactly one of the labels: faq, order, recommendation, fallback.\n\n\
         User text:\n\"\"\"{}\"\"\"\n\nReply only with one word label.",
        text
    )
}

/// First token of the oracle reply, lowercased. Unknown labels become `Fallback`;
/// a reply with no token is a classification failure.
pub fn parse_label(reply: &str) -> Result<Intent> {
    let token = reply
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::Classification("oracle returned no label".into()))?
        .to_lowercase();

    Ok(Intent::from_label(&token).unwrap_or_else(|| {
        debug!("Unknown intent label {:?}, using fallback", token);
        Intent::Fallback
    }))
}
