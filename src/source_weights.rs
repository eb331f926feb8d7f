//! # Source Weights
//!
//! Reputation multipliers keyed by registrable domain (e.g. `handelsblatt`,
//! `bafin.de`). The score of an item is multiplied by the weight of the
//! domain its canonical URL points to.
//!
//! - Loads from JSON config or falls back to the built-in `default_seed()`.
//! - Keys are kept in declaration order so lookups are deterministic.
//! - Lookup order: exact domain match → first key contained in the domain → default.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::warn;

/// One reputation entry: a domain (or domain fragment) and its multiplier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceWeight {
    pub domain: String,
    pub weight: f64,
}

/// Ordered reputation table, loaded from JSON or defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceWeights {
    /// Multiplier if no entry matches.
    #[serde(default = "default_default_weight")]
    pub default_weight: f64,
    #[serde(default)]
    pub weights: Vec<SourceWeight>,
}

fn default_default_weight() -> f64 {
    1.0
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl SourceWeights {
    /// Parse a JSON document of the shape
    /// `{"default_weight": 1.0, "weights": [{"domain": "nzz", "weight": 1.1}]}`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let mut cfg: SourceWeights =
            serde_json::from_str(s).context("parsing source weights json")?;
        for w in &mut cfg.weights {
            w.domain = w.domain.trim().to_ascii_lowercase();
        }
        cfg.weights.retain(|w| !w.domain.is_empty());
        Ok(cfg)
    }

    /// Load configuration from a JSON file.
    /// Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let parsed = fs::read_to_string(path)
            .with_context(|| format!("reading source weights from {}", path.display()))
            .and_then(|s| Self::from_json_str(&s));
        match parsed {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(error = ?e, "source weights unavailable, using built-in table");
                Self::default_seed()
            }
        }
    }

    /// Weight for an already extracted registrable domain.
    pub fn weight_for_host(&self, host: &str) -> f64 {
        let h = host.trim().to_ascii_lowercase();
        if h.is_empty() {
            return self.default_weight;
        }

        if let Some(w) = self.weights.iter().find(|w| w.domain == h) {
            return w.weight;
        }

        self.weights
            .iter()
            .find(|w| h.contains(w.domain.as_str()))
            .map(|w| w.weight)
            .unwrap_or(self.default_weight)
    }

    /// Built-in table of news outlets, regulators and central banks.
    pub fn default_seed() -> Self {
        let weights = [
            ("handelsblatt", 1.15),
            ("wiwo", 1.1),
            ("faz", 1.05),
            ("nzz", 1.1),
            ("coindesk", 1.05),
            ("cointelegraph", 1.0),
            ("zawya", 1.05),
            ("thenationalnews", 1.0),
            ("gulfnews", 1.0),
            ("arabnews", 0.95),
            // regulators and central banks
            ("bafin.de", 1.12),
            ("finma.ch", 1.12),
            ("bundesbank.de", 1.12),
            ("snb.ch", 1.1),
            ("oenb.at", 1.1),
            ("ecb.europa.eu", 1.12),
            ("bis.org", 1.08),
            ("imf.org", 1.05),
            ("sama.gov.sa", 1.1),
            ("cbuae.gov.ae", 1.1),
            ("qcb.gov.qa", 1.08),
            ("cbe.org.eg", 1.05),
            ("cma.org.sa", 1.05),
            ("dfsa.ae", 1.08),
            ("adgm.com", 1.06),
            ("vara.ae", 1.06),
        ]
        .into_iter()
        .map(|(domain, weight)| SourceWeight {
            domain: domain.to_string(),
            weight,
        })
        .collect();

        Self {
            default_weight: 1.0,
            weights,
        }
    }
}
