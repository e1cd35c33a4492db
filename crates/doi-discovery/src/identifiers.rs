//! Persistent identifier normalization.
//!
//! Filter options and event-store queries accept DOIs, ORCID iDs, and ROR
//! IDs in either bare or URL form. Everything is canonicalized here before
//! it reaches a query document; malformed input yields `None` and the
//! caller builds a filter that matches nothing (never an error).

use std::sync::LazyLock;

use regex::Regex;

static DOI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:(?:http|https)://(?:dx\.)?(?:doi\.org|handle\.test\.datacite\.org)/)?(?:doi:)?(10\.\d{4,5}/.+)\z")
        .expect("valid DOI regex")
});

static ORCID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:(?:http|https)://orcid\.org/)?(\d{4}-\d{4}-\d{4}-\d{3}[0-9Xx])\z")
        .expect("valid ORCID regex")
});

static ROR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:(?:http|https)://)?(ror\.org/0\w{6}\d{2})\z").expect("valid ROR regex")
});

/// Extract a bare, lower-cased DOI from a DOI string or URL.
///
/// `"https://doi.org/10.5061/DRYAD.8515"` and `"10.5061/DRYAD.8515"` both
/// yield `"10.5061/dryad.8515"`.
#[must_use]
pub fn doi_from_url(url: &str) -> Option<String> {
    DOI_RE
        .captures(url.trim())
        .map(|caps| caps[1].replace('\u{200B}', "").to_lowercase())
}

/// Normalize a DOI to its canonical `https://doi.org/...` resolver form.
#[must_use]
pub fn normalize_doi(doi: &str) -> Option<String> {
    doi_from_url(doi).map(|doi| format!("https://doi.org/{doi}"))
}

/// Extract a bare ORCID iD from an ORCID string or URL.
#[must_use]
pub fn orcid_from_url(url: &str) -> Option<String> {
    ORCID_RE.captures(url.trim()).map(|caps| caps[1].to_uppercase())
}

/// Normalize an ORCID iD to its `https://orcid.org/...` URL form.
#[must_use]
pub fn orcid_as_url(orcid: &str) -> Option<String> {
    orcid_from_url(orcid).map(|id| format!("https://orcid.org/{id}"))
}

/// Extract a bare `ror.org/...` identifier from a ROR string or URL.
#[must_use]
pub fn ror_from_url(url: &str) -> Option<String> {
    ROR_RE.captures(url.trim()).map(|caps| caps[1].to_lowercase())
}
