// src/relevance.rs
//! Relevance scoring: rule schema (TOML), regex compilation and the scorer.
//!
//! A `ScoringRules` value holds weighted keyword patterns, negative-signal
//! patterns, the short-text penalty and per-region boosts. `Scorer::new`
//! compiles it once; `Scorer::score` is a pure function of the text.

use anyhow::{anyhow, Context, Result};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::region::Region;

pub const ENV_SCORING_PATH: &str = "DIGEST_SCORING_PATH";

/// Rules shipped with the binary.
pub const DEFAULT_SCORING_TOML: &str = include_str!("../config/scoring.toml");

/* ----------------------------
Config schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringRules {
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub region_boost: RegionBoost,
    #[serde(default)]
    pub keywords: Vec<KeywordRule>,
    #[serde(default)]
    pub negatives: Vec<NegativeRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSection {
    /// Subtracted once per negative rule that matches.
    #[serde(default = "default_negative_penalty")]
    pub negative_penalty: f64,
    /// Texts with fewer whitespace-delimited tokens get `short_text_penalty`.
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
    #[serde(default = "default_short_text_penalty")]
    pub short_text_penalty: f64,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            negative_penalty: default_negative_penalty(),
            min_tokens: default_min_tokens(),
            short_text_penalty: default_short_text_penalty(),
        }
    }
}

fn default_negative_penalty() -> f64 {
    2.5
}
fn default_min_tokens() -> usize {
    8
}
fn default_short_text_penalty() -> f64 {
    0.8
}
fn default_boost() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RegionBoost {
    #[serde(rename = "DACH", default = "default_boost")]
    pub dach: f64,
    #[serde(rename = "MENA", default = "default_boost")]
    pub mena: f64,
    #[serde(rename = "GLOBAL", default = "default_boost")]
    pub global: f64,
}

impl Default for RegionBoost {
    fn default() -> Self {
        Self {
            dach: 1.0,
            mena: 1.0,
            global: 1.0,
        }
    }
}

impl RegionBoost {
    pub fn for_region(&self, region: Region) -> f64 {
        match region {
            Region::Dach => self.dach,
            Region::Mena => self.mena,
            Region::Global => self.global,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRule {
    pub id: String,
    pub pattern: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NegativeRule {
    pub id: String,
    pub pattern: String,
}

impl ScoringRules {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("parsing scoring rules toml")
    }

    /// The embedded default rule set.
    pub fn builtin() -> Self {
        Self::from_toml_str(DEFAULT_SCORING_TOML).expect("embedded scoring rules are valid")
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scoring rules from {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

/* ----------------------------
Compiled scorer
---------------------------- */

#[derive(Debug)]
struct CompiledKeyword {
    id: String,
    re: Regex,
    weight: f64,
}

#[derive(Debug)]
struct CompiledNegative {
    id: String,
    re: Regex,
}

/// Per-rule view of a scoring pass, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub score: f64,
    /// `(rule id, match count)` for every keyword rule with at least one hit.
    pub keyword_hits: Vec<(String, usize)>,
    /// Ids of negative rules that matched.
    pub negatives: Vec<String>,
    pub short_text: bool,
}

#[derive(Debug)]
pub struct Scorer {
    section: ScoringSection,
    region_boost: RegionBoost,
    keywords: Vec<CompiledKeyword>,
    negatives: Vec<CompiledNegative>,
}

fn compile(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

impl Scorer {
    pub fn new(rules: ScoringRules) -> Result<Self> {
        let keywords = rules
            .keywords
            .into_iter()
            .map(|k| {
                let re = compile(&k.pattern)
                    .map_err(|e| anyhow!("keyword `{}` regex error: {}", k.id, e))?;
                Ok(CompiledKeyword {
                    id: k.id,
                    re,
                    weight: k.weight,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let negatives = rules
            .negatives
            .into_iter()
            .map(|n| {
                let re = compile(&n.pattern)
                    .map_err(|e| anyhow!("negative `{}` regex error: {}", n.id, e))?;
                Ok(CompiledNegative { id: n.id, re })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            section: rules.scoring,
            region_boost: rules.region_boost,
            keywords,
            negatives,
        })
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        Self::new(ScoringRules::from_toml_str(toml_str)?)
    }

    pub fn builtin() -> Self {
        Self::new(ScoringRules::builtin()).expect("embedded scoring rules compile")
    }

    pub fn region_boost(&self, region: Region) -> f64 {
        self.region_boost.for_region(region)
    }

    /// Relevance of `text`, unrounded. Empty text scores exactly 0.0.
    pub fn score(&self, text: &str) -> f64 {
        self.explain(text).score
    }

    pub fn explain(&self, text: &str) -> ScoreBreakdown {
        let mut out = ScoreBreakdown::default();
        if text.is_empty() {
            return out;
        }

        let mut score = 0.0;
        for k in &self.keywords {
            let hits = k.re.find_iter(text).count();
            if hits > 0 {
                score += k.weight * hits as f64;
                out.keyword_hits.push((k.id.clone(), hits));
            }
        }

        // One penalty per matching rule, regardless of match count.
        for n in &self.negatives {
            if n.re.is_match(text) {
                score -= self.section.negative_penalty;
                out.negatives.push(n.id.clone());
            }
        }

        if text.split_whitespace().count() < self.section.min_tokens {
            score -= self.section.short_text_penalty;
            out.short_text = true;
        }

        out.score = score;
        debug!(
            target: "relevance",
            score,
            keywords = ?out.keyword_hits,
            negatives = ?out.negatives,
            short_text = out.short_text,
            "scored"
        );
        out
    }
}

/// Scoring text for an item: title, summary and source name joined by spaces.
pub fn scoring_text(title: &str, summary: &str, source: &str) -> String {
    [title, summary, source].join(" ")
}
