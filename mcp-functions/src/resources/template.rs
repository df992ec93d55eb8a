// URI templates
//
// `items://{category}/{id}` compiles to an anchored, case-insensitive pattern
// in which every placeholder captures one or more non-`/` characters.

use std::cmp::Ordering;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ResourceError;

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// A compiled URI template
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    matcher: Regex,
    placeholders: Vec<String>,
    literal_len: usize,
}

impl UriTemplate {
    /// Compile a template such as `items://{category}/{id}`
    pub fn parse(template: &str) -> Result<Self, ResourceError> {
        let invalid = |reason: &str| ResourceError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if template.is_empty() {
            return Err(invalid("template is empty"));
        }

        let mut pattern = String::from("(?i)^");
        let mut placeholders: Vec<String> = Vec::new();
        let mut literal_len = 0;
        let mut last = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(template) {
            if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
                let literal = &template[last..whole.start()];
                literal_len += literal.chars().count();
                pattern.push_str(&regex::escape(literal));

                if placeholders.iter().any(|p| p == name.as_str()) {
                    return Err(invalid(&format!("placeholder '{}' appears twice", name.as_str())));
                }
                placeholders.push(name.as_str().to_string());
                pattern.push_str("([^/]+)");
                last = whole.end();
            }
        }

        let tail = &template[last..];
        literal_len += tail.chars().count();
        pattern.push_str(&regex::escape(tail));
        pattern.push('$');

        let matcher = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            matcher,
            placeholders,
            literal_len,
        })
    }

    /// The template as registered
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Case-insensitive full match
    pub fn matches(&self, uri: &str) -> bool {
        self.matcher.is_match(uri)
    }

    /// Placeholder values captured from `uri`, or `None` when it does not match
    pub fn extract(&self, uri: &str) -> Option<HashMap<String, String>> {
        let caps = self.matcher.captures(uri)?;
        Some(
            self.placeholders
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Ordering among templates matching the same URI; `Less` means more
    /// specific: more literal characters, then fewer placeholders, then the
    /// smaller template string.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        other
            .literal_len
            .cmp(&self.literal_len)
            .then(self.placeholders.len().cmp(&other.placeholders.len()))
            .then_with(|| self.template.cmp(&other.template))
    }
}
