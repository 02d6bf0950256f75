//! String formats checked by `format` rules.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static DOMAIN_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.?[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?(\.[a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?)*$")
        .expect("invalid regex")
});

static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("invalid regex"));

const DOMAIN_HINT: &str = "must be a bare domain, subdomain, or extension like '.gov'";

/// String formats understood by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Bare domain (`sec.gov`), subdomain (`docs.sec.gov`) or extension (`.gov`).
    DomainSelector,
    /// Absolute `http`/`https` URL with a host.
    HttpUrl,
    /// RFC 3339 full-date (`YYYY-MM-DD`).
    CalendarDate,
}

impl Format {
    /// Returns a violation message, or `None` when `value` conforms.
    pub fn check(self, value: &str) -> Option<String> {
        match self {
            Format::DomainSelector => domain_selector_violation(value),
            Format::HttpUrl => {
                if is_http_url(value) {
                    None
                } else {
                    Some("must be an absolute http/https URL".to_string())
                }
            }
            Format::CalendarDate => {
                if is_calendar_date(value) {
                    None
                } else {
                    Some("must be a valid YYYY-MM-DD date".to_string())
                }
            }
        }
    }

    /// Short name used when listing rule tables.
    pub fn name(self) -> &'static str {
        match self {
            Format::DomainSelector => "domain-selector",
            Format::HttpUrl => "http-url",
            Format::CalendarDate => "full-date",
        }
    }
}

fn domain_selector_violation(value: &str) -> Option<String> {
    let has_scheme = value.contains("://");
    let has_path = value.replacen("://", "", 1).contains('/');
    match (has_scheme, has_path) {
        (true, true) => return Some(format!("{DOMAIN_HINT} (URL scheme and path are not allowed)")),
        (true, false) => return Some(format!("{DOMAIN_HINT} (URL scheme is not allowed)")),
        (false, true) => return Some(format!("{DOMAIN_HINT} (path is not allowed)")),
        (false, false) => {}
    }
    let shaped = if value.starts_with('.') {
        value.len() > 1
    } else {
        value.contains('.')
    };
    if shaped && DOMAIN_SELECTOR.is_match(value) {
        None
    } else {
        Some(DOMAIN_HINT.to_string())
    }
}

fn is_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

fn is_calendar_date(value: &str) -> bool {
    FULL_DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}
