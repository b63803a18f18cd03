use std::time::Duration;

use reqwest::header::HeaderMap;

pub const PER_PAGE: &str = "50";
pub const MAX_PAGES: usize = 20;
/// Below this many remaining rate-limit units the client pauses between pages.
pub const RATE_LIMIT_FLOOR: f64 = 20.0;
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(1);

const RATE_LIMIT_HEADER: &str = "x-rate-limit-remaining";

/// URL of the `rel="next"` entry of a `Link` header.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        let is_next = pieces.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

pub fn rate_limit_remaining(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(RATE_LIMIT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

pub fn should_throttle(headers: &HeaderMap) -> bool {
    rate_limit_remaining(headers).is_some_and(|remaining| remaining < RATE_LIMIT_FLOOR)
}
