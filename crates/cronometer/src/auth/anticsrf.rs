//! Anti-forgery token extraction from the login page.

use std::sync::LazyLock;

use regex::Regex;

/// Name of the hidden input carrying the anti-forgery token.
pub const ANTI_FORGERY_FIELD: &str = "anticsrf";

static INPUT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<input\b[^>]*>").expect("valid input tag regex"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("valid attribute regex")
});

/// Find the `value` of the `<input name="anticsrf">` element in a login page.
///
/// Attribute order and quoting style do not matter. Returns `None` if no such
/// input exists or it has no `value` attribute.
pub fn extract_anti_forgery_token(html: &str) -> Option<String> {
    INPUT_TAG.find_iter(html).find_map(|tag| {
        let mut name = None;
        let mut value = None;
        for caps in ATTRIBUTE.captures_iter(tag.as_str()) {
            let attr = caps.get(1).map(|m| m.as_str())?;
            let text = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str());
            if attr.eq_ignore_ascii_case("name") {
                name = text;
            } else if attr.eq_ignore_ascii_case("value") {
                value = text;
            }
        }
        match name {
            Some(ANTI_FORGERY_FIELD) => value.map(str::to_string),
            _ => None,
        }
    })
}
