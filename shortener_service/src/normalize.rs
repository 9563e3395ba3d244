//! Canonical form of destination URLs.
//!
//! Two inputs that differ only in host case, a missing trailing `/` on an
//! empty path, or the order of their query pairs normalise to the same string,
//! so they share one slug.

use url::{ParseError, Url};

use crate::error::{Result, StoreError};

pub fn normalize_url(raw: &str) -> Result<String> {
    let mut parsed = parse_url(raw)?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(StoreError::InvalidUrl(format!("`{raw}` has no host")));
    }

    if parsed.path().is_empty() {
        parsed.set_path("/");
    }

    if let Some(query) = parsed.query().map(str::to_owned) {
        let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        pairs.sort();
        // `?` and `?&` carry no pairs, drop the separator too
        if pairs.is_empty() {
            parsed.set_query(None);
        } else {
            parsed
                .query_pairs_mut()
                .clear()
                .extend_pairs(pairs.iter());
        }
    }

    Ok(parsed.to_string())
}

fn parse_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidUrl("empty url".to_string()));
    }

    match Url::parse(trimmed) {
        Ok(parsed) => Ok(parsed),
        // no scheme, read it as `http://<input>`
        Err(ParseError::RelativeUrlWithoutBase) => {
            let rest = trimmed.trim_start_matches(':').trim_start_matches('/');
            Url::parse(&format!("http://{rest}"))
                .map_err(|e| StoreError::InvalidUrl(format!("`{raw}`: {e}")))
        }
        Err(e) => Err(StoreError::InvalidUrl(format!("`{raw}`: {e}"))),
    }
}
