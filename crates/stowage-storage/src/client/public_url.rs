//! Public URL templating.
//!
//! Path-style addressing: `https://s3.amazonaws.com/{bucket}/{key}` in
//! `us-east-1`, `https://s3-{region}.amazonaws.com/{bucket}/{key}` elsewhere,
//! and `{endpoint}/{bucket}/{key}` for S3-compatible services. Key segments
//! are percent-encoded, `/` separators are kept.

use stowage_core::{Credentials, Error, ResolvedTarget, Result};
use url::Url;

/// Region whose public host carries no region suffix.
const STANDARD_REGION: &str = "us-east-1";

/// Computes the public URL of `target` from the addressing part of
/// `credentials`. Performs no I/O.
pub fn s3_public_url(credentials: &Credentials, target: &ResolvedTarget) -> Result<Url> {
    let base = match credentials.endpoint() {
        Some(endpoint) => Url::parse(endpoint).map_err(|e| {
            Error::configuration(format!("invalid endpoint '{endpoint}'")).with_source(e)
        })?,
        None => {
            let host = match credentials.region() {
                Some(region) if !region.is_empty() && region != STANDARD_REGION => {
                    format!("s3-{region}.amazonaws.com")
                }
                _ => "s3.amazonaws.com".to_string(),
            };
            Url::parse(&format!("https://{host}/")).map_err(|e| {
                Error::configuration(format!("invalid region '{host}'")).with_source(e)
            })?
        }
    };

    object_url(base, target)
}

/// Appends `{bucket}/{key}` to the path of `base`.
///
/// URL paths cannot carry `.` or `..` segments in any encoding, so targets
/// containing them are rejected rather than resolved to another object.
pub(crate) fn object_url(mut base: Url, target: &ResolvedTarget) -> Result<Url> {
    let is_dot_segment = |segment: &str| matches!(segment, "." | "..");
    if is_dot_segment(target.bucket()) || target.key().split('/').any(is_dot_segment) {
        return Err(Error::invalid_destination(format!(
            "'{target}' contains a '.' or '..' path segment and has no public URL"
        )));
    }

    if base.cannot_be_a_base() {
        return Err(Error::configuration(format!(
            "endpoint '{base}' cannot carry an object path"
        )));
    }

    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop_if_empty().push(target.bucket());
        segments.extend(target.key().split('/'));
    }

    Ok(base)
}
