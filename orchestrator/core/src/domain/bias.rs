// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Lexical bias indicators
//!
//! A fixed word list matched case-insensitively on word boundaries. This is
//! a reading aid for side-by-side comparison, not a classifier.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCategory {
    Gender,
    Age,
    Ethnicity,
    Profession,
}

impl IndicatorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Ethnicity => "ethnicity",
            Self::Profession => "profession",
        }
    }
}

const LEXICON: &[(IndicatorCategory, &[&str])] = &[
    (
        IndicatorCategory::Gender,
        &[
            "he", "she", "him", "her", "his", "hers", "himself", "herself", "man", "men",
            "woman", "women", "male", "female", "boy", "girl", "gentleman", "lady",
            "husband", "wife", "mother", "father", "masculine", "feminine",
        ],
    ),
    (
        IndicatorCategory::Age,
        &[
            "old", "older", "elderly", "young", "younger", "youthful", "senior", "seniors",
            "millennial", "millennials", "boomer", "boomers", "retiree", "teenager",
        ],
    ),
    (
        IndicatorCategory::Ethnicity,
        &[
            "black", "white", "asian", "hispanic", "latino", "latina", "african",
            "european", "arab", "immigrant", "immigrants", "foreign", "ethnic", "minority",
        ],
    ),
    (
        IndicatorCategory::Profession,
        &[
            "doctor", "nurse", "engineer", "secretary", "ceo", "housekeeper", "pilot",
            "teacher", "scientist", "receptionist", "programmer", "assistant",
        ],
    ),
];

static PATTERNS: LazyLock<Vec<(IndicatorCategory, Regex)>> = LazyLock::new(|| {
    LEXICON
        .iter()
        .map(|(category, terms)| {
            let alternation = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            let pattern = format!(r"(?i)\b(?:{})\b", alternation);
            (
                *category,
                Regex::new(&pattern).expect("lexicon terms form a valid pattern"),
            )
        })
        .collect()
});

/// One indicator occurrence; `start..end` is a byte range into the scanned text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorMatch {
    pub category: IndicatorCategory,
    pub term: String,
    pub start: usize,
    pub end: usize,
}

/// All indicator matches in `text`, ordered by position
pub fn scan(text: &str) -> Vec<IndicatorMatch> {
    let mut matches: Vec<IndicatorMatch> = PATTERNS
        .iter()
        .flat_map(|(category, regex)| {
            regex.find_iter(text).map(move |m| IndicatorMatch {
                category: *category,
                term: m.as_str().to_lowercase(),
                start: m.start(),
                end: m.end(),
            })
        })
        .collect();
    matches.sort_by_key(|m| m.start);
    matches
}

/// Match counts per category
pub fn summarize(text: &str) -> BTreeMap<IndicatorCategory, usize> {
    let mut counts = BTreeMap::new();
    for m in scan(text) {
        *counts.entry(m.category).or_insert(0) += 1;
    }
    counts
}

/// Rebuild `text` with every match passed through `decorate`
pub fn highlight<F>(text: &str, decorate: F) -> String
where
    F: Fn(&str, IndicatorCategory) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for m in scan(text) {
        out.push_str(&text[cursor..m.start]);
        out.push_str(&decorate(&text[m.start..m.end], m.category));
        cursor = m.end;
    }
    out.push_str(&text[cursor..]);
    out
}
