//! # Content Negotiation
//!
//! Parses an `Accept` header into ranked media ranges and picks the response
//! format a route offers.
//!
//! ## Grammar
//!
//! ```text
//! Accept = range *( "," range )
//! range  = ( "*" | type "/" ( "*" | subtype ) ) *( ";" name "=" value )
//! ```
//!
//! Whitespace around `;` and `=` is ignored and `q` defaults to `1.0`. A bare `*`
//! is read as `*/*` and a range without `/` as `type/*`. A q value that does not
//! parse keeps the default. Ranges with `q=0` are never selected, and a format
//! whose most specific matching range has `q=0` is excluded.
//!
//! ## Selection
//!
//! Ranges are stable-sorted by descending q. For the best range, the first
//! offered format (in route order) it matches is chosen. A blank header, or one
//! without a single usable range, selects the route's default format.

use crate::error::GatewayError;
use std::cmp::Ordering;
use tracing::debug;

/// One media range of an `Accept` header. `None` stands for `*`.
#[derive(Debug, Clone, PartialEq)]
pub struct Accept {
    pub group: Option<String>,
    pub subtype: Option<String>,
    pub q: f32,
}

impl Accept {
    fn part(raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            None
        } else {
            Some(raw.to_ascii_lowercase())
        }
    }

    /// Whether this range accepts `media_type`. Parameters of `media_type` are ignored.
    pub fn matches(&self, media_type: &str) -> bool {
        let essence = media_type.split(';').next().unwrap_or_default().trim();
        let (group, subtype) = essence.split_once('/').unwrap_or((essence, ""));
        let part_ok = |want: &Option<String>, have: &str| match want {
            None => true,
            Some(w) => w.eq_ignore_ascii_case(have.trim()),
        };
        part_ok(&self.group, group) && part_ok(&self.subtype, subtype)
    }

    /// `q=0` marks a range as explicitly unacceptable.
    pub fn is_refused(&self) -> bool {
        self.q <= 0.0
    }

    fn specificity(&self) -> u8 {
        u8::from(self.group.is_some()) + u8::from(self.subtype.is_some())
    }
}

/// Whether the most specific range matching `media_type` has `q=0`.
fn refuses(ranges: &[Accept], media_type: &str) -> bool {
    let mut best: Option<&Accept> = None;
    for range in ranges.iter().filter(|r| r.matches(media_type)) {
        if best.map_or(true, |b| range.specificity() > b.specificity()) {
            best = Some(range);
        }
    }
    best.is_some_and(Accept::is_refused)
}

fn parse_range(raw: &str) -> Option<Accept> {
    let mut parts = raw.split(';');
    let range = parts.next()?.trim();
    if range.is_empty() {
        return None;
    }
    let (group, subtype) = range.split_once('/').unwrap_or((range, "*"));

    let mut q = 1.0_f32;
    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("q") {
            if let Ok(v) = value.trim().parse::<f32>() {
                if v.is_finite() {
                    q = v;
                }
            }
        }
    }

    Some(Accept {
        group: Accept::part(group),
        subtype: Accept::part(subtype),
        q,
    })
}

/// Parse an `Accept` header into ranges, in header order.
pub fn parse_accept(header: &str) -> Vec<Accept> {
    header.split(',').filter_map(parse_range).collect()
}

/// Stable sort by descending q; ties keep header order.
pub fn rank(mut ranges: Vec<Accept>) -> Vec<Accept> {
    ranges.sort_by(|a, b| b.q.partial_cmp(&a.q).unwrap_or(Ordering::Equal));
    ranges
}

/// Choose the response format for a route.
///
/// # Errors
///
/// [`GatewayError::NotAcceptable`] when the header names usable ranges and none
/// of them matches any of `offered`.
pub fn select<'a>(
    accept: Option<&str>,
    offered: &'a [String],
    default: &'a str,
) -> Result<&'a str, GatewayError> {
    let header = accept.unwrap_or_default();
    let ranges = rank(parse_accept(header));
    if ranges.is_empty() {
        return Ok(default);
    }

    for range in ranges.iter().filter(|r| !r.is_refused()) {
        if let Some(format) = offered
            .iter()
            .find(|f| range.matches(f) && !refuses(&ranges, f))
        {
            debug!(accept = %header, selected = %format, "Content negotiated");
            return Ok(format.as_str());
        }
    }

    debug!(accept = %header, offered = ?offered, "No acceptable format");
    Err(GatewayError::NotAcceptable {
        accept: header.to_string(),
    })
}
