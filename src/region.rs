//! # Region
//!
//! Region tags and URL-based classification.
//!
//! - `Region` is the closed set `{DACH, MENA, GLOBAL}`.
//! - `registrable_domain()` returns the public-suffix-aware root domain of a URL.
//! - `guess_region_from_url()` maps the rightmost public-suffix label to a region.
//!
//! Both helpers tolerate schemeless and malformed input and never fail:
//! on extraction failure the domain is empty and the region is `GLOBAL`.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::{Host, Url};

/// Geographic/topical grouping of a news item.
///
/// Variant order is alphabetical by tag, so the derived `Ord` matches
/// string ordering of the tags (`DACH < GLOBAL < MENA`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Dach,
    Global,
    Mena,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Dach, Region::Mena, Region::Global];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Dach => "DACH",
            Region::Global => "GLOBAL",
            Region::Mena => "MENA",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DACH_TLDS: &[&str] = &["de", "at", "ch", "li"];
const MENA_TLDS: &[&str] = &[
    "ae", "sa", "qa", "bh", "om", "kw", "eg", "jo", "lb", "ma", "tn", "dz", "ir", "iq", "ye",
    "ly", "ps", "sd",
];

/// Second-level labels that form a public suffix under a two-letter country code
/// (`co.uk`, `gov.sa`, `com.eg`, `gv.at`, ...).
const SECOND_LEVEL_LABELS: &[&str] = &[
    "ac", "co", "com", "edu", "gov", "gv", "ltd", "mil", "net", "or", "org", "plc", "sch",
];

/// Classify a URL by its public suffix. Unknown suffixes and unparsable input map to `GLOBAL`.
pub fn guess_region_from_url(url: &str) -> Region {
    let Some(host) = extract_host(url) else {
        return Region::Global;
    };
    let Some(suffix) = public_suffix(&host) else {
        return Region::Global;
    };
    let tld = suffix.rsplit('.').next().unwrap_or_default();
    if DACH_TLDS.contains(&tld) {
        Region::Dach
    } else if MENA_TLDS.contains(&tld) {
        Region::Mena
    } else {
        Region::Global
    }
}

/// Registrable domain (`www.nzz.ch` → `nzz.ch`, `news.bbc.co.uk` → `bbc.co.uk`).
/// Returns an empty string when the URL has no registrable domain.
pub fn registrable_domain(url: &str) -> String {
    let Some(host) = extract_host(url) else {
        return String::new();
    };
    let Some(suffix) = public_suffix(&host) else {
        return String::new();
    };
    let labels: Vec<&str> = host.split('.').collect();
    let suffix_len = suffix.split('.').count();
    if labels.len() <= suffix_len {
        return String::new();
    }
    labels[labels.len() - suffix_len - 1..].join(".")
}

/// Lowercased DNS host of `url`; schemeless input is retried with `http://`.
/// IP literals have no registrable domain and yield `None`.
fn extract_host(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = match Url::parse(trimmed) {
        Ok(u) if u.has_host() => u,
        _ => Url::parse(&format!("http://{trimmed}")).ok()?,
    };
    match parsed.host()? {
        Host::Domain(d) => {
            let d = d.trim_end_matches('.').to_ascii_lowercase();
            (!d.is_empty()).then_some(d)
        }
        Host::Ipv4(_) | Host::Ipv6(_) => None,
    }
}

/// Public suffix of a host, or `None` for single-label hosts and non-alphabetic TLDs.
fn public_suffix(host: &str) -> Option<String> {
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 2 {
        return None;
    }
    let tld = labels[labels.len() - 1];
    if !tld.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
        return None;
    }
    let second = labels[labels.len() - 2];
    if tld.len() == 2 && SECOND_LEVEL_LABELS.contains(&second) {
        return Some(format!("{second}.{tld}"));
    }
    Some(tld.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dach_and_mena_suffixes() {
        assert_eq!(guess_region_from_url("https://www.handelsblatt.com/x"), Region::Global);
        assert_eq!(guess_region_from_url("https://www.faz.net/a"), Region::Global);
        assert_eq!(guess_region_from_url("https://www.nzz.ch/wirtschaft"), Region::Dach);
        assert_eq!(guess_region_from_url("https://www.bafin.de/x"), Region::Dach);
        assert_eq!(guess_region_from_url("https://www.oenb.at/x"), Region::Dach);
        assert_eq!(guess_region_from_url("https://sama.gov.sa/en"), Region::Mena);
        assert_eq!(guess_region_from_url("https://www.dfsa.ae/news"), Region::Mena);
    }

    #[test]
    fn schemeless_and_malformed_default_to_global() {
        assert_eq!(guess_region_from_url("bundesbank.de/presse"), Region::Dach);
        assert_eq!(guess_region_from_url(""), Region::Global);
        assert_eq!(guess_region_from_url("not a url at all"), Region::Global);
        assert_eq!(guess_region_from_url("http://127.0.0.1/feed"), Region::Global);
        assert_eq!(guess_region_from_url("http://localhost/feed"), Region::Global);
    }

    #[test]
    fn registrable_domain_strips_subdomains() {
        assert_eq!(registrable_domain("https://www.nzz.ch/wirtschaft"), "nzz.ch");
        assert_eq!(registrable_domain("https://news.bbc.co.uk/x"), "bbc.co.uk");
        assert_eq!(registrable_domain("https://www.cbuae.gov.ae/en"), "cbuae.gov.ae");
        assert_eq!(registrable_domain("https://WWW.Coindesk.COM/markets"), "coindesk.com");
        assert_eq!(registrable_domain("https://co.uk/"), "");
        assert_eq!(registrable_domain("::::"), "");
    }

    #[test]
    fn tags_sort_alphabetically() {
        let mut v = vec![Region::Mena, Region::Dach, Region::Global];
        v.sort();
        assert_eq!(v, vec![Region::Dach, Region::Global, Region::Mena]);
        assert_eq!(Region::Mena.to_string(), "MENA");
    }
}
