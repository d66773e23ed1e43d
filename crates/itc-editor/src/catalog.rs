//! Web-font catalog client.
//!
//! Resolves a catalog family to font bytes the way a browser would: fetch
//! the family's stylesheet, take the first `src: url(...)`, download it.
//! Built on `winnow` 0.7 for the stylesheet scan.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use thiserror::Error;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, delimited, preceded, terminated};
use winnow::prelude::*;
use winnow::token::take_till;

pub const STYLESHEET_ENDPOINT: &str = "https://fonts.googleapis.com/css2";
pub const LISTING_ENDPOINT: &str = "https://www.googleapis.com/webfonts/v1/webfonts";

/// Weight axis requested for every family.
const WEIGHT_RANGE: &str = "wght@100..900";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("stylesheet for `{0}` names no font source")]
    NoSource(String),
    #[error("malformed listing: {0}")]
    Listing(#[from] serde_json::Error),
}

/// Everything outside the URI-component unreserved set gets escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Stylesheet URL for `family`, covering the full weight range.
pub fn stylesheet_url(family: &str) -> String {
    format!(
        "{STYLESHEET_ENDPOINT}?family={}:{WEIGHT_RANGE}&display=swap",
        utf8_percent_encode(family, COMPONENT)
    )
}

// ─── Stylesheet scan ────────────────────────────────────────────────────

fn quoted<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
    ))
    .parse_next(input)
}

fn bare<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_till(1.., |c: char| c == ')' || c.is_whitespace()).parse_next(input)
}

/// `src: url(<target>)`, quoted or not.
fn font_src<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded(
        ("src", multispace0, ':', multispace0, "url(", multispace0),
        terminated(alt((quoted, bare)), (multispace0, ')')),
    )
    .parse_next(input)
}

/// First font URL declared in a stylesheet.
pub fn first_font_url(css: &str) -> Option<&str> {
    let mut rest = css;
    while let Some(at) = rest.find("src") {
        let mut input = &rest[at..];
        if let Ok(url) = font_src(&mut input) {
            return Some(url).filter(|u| !u.is_empty());
        }
        rest = &rest[at + "src".len()..];
    }
    None
}

// ─── Client ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    items: Vec<ListingItem>,
}

#[derive(Debug, Deserialize)]
struct ListingItem {
    family: String,
}

#[derive(Debug, Clone, Default)]
pub struct CatalogClient {
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Download the first face the catalog serves for `family`.
    pub async fn fetch_face(&self, family: &str) -> Result<Vec<u8>, CatalogError> {
        let css = self
            .http
            .get(stylesheet_url(family))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let url = first_font_url(&css).ok_or_else(|| CatalogError::NoSource(family.to_string()))?;
        log::debug!("catalog: {family:?} → {url}");

        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// Every family the catalog offers. Needs an access key.
    pub async fn list_families(&self, api_key: &str) -> Result<Vec<String>, CatalogError> {
        let body = self
            .http
            .get(LISTING_ENDPOINT)
            .query(&[("key", api_key)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_listing(&body)
    }
}

fn parse_listing(body: &str) -> Result<Vec<String>, CatalogError> {
    let listing: Listing = serde_json::from_str(body)?;
    Ok(listing.items.into_iter().map(|item| item.family).collect())
}
