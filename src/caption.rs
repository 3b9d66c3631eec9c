// Caption rendering. The template is validated once at startup so that a
// malformed template is a configuration error, never a per-frame one.

use anyhow::{bail, Result};

const PLACEHOLDER: &str = "{num}";

/// A caption template with a single `{num}` substitution point.
///
/// The template is split at construction time; rendering is a pure
/// string concatenation and cannot fail.
#[derive(Debug, Clone)]
pub struct CaptionTemplate {
    prefix: String,
    suffix: String,
}

impl CaptionTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let occurrences = template.matches(PLACEHOLDER).count();
        if occurrences != 1 {
            bail!(
                "caption template must contain exactly one {PLACEHOLDER} placeholder, found {occurrences}: {template:?}"
            );
        }
        let Some((prefix, suffix)) = template.split_once(PLACEHOLDER) else {
            bail!("caption template {template:?} is missing its {PLACEHOLDER} placeholder");
        };
        Ok(CaptionTemplate {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Render the caption for a frame, zero-padding the sequence number
    /// to four digits to match the frame file naming.
    pub fn render(&self, sequence: i64) -> String {
        format!("{}{:04}{}", self.prefix, sequence, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_zero_padded_sequence() {
        let template = CaptionTemplate::parse("Frame {num} of the movie").unwrap();
        assert_eq!(template.render(7), "Frame 0007 of the movie");
        assert_eq!(template.render(1234), "Frame 1234 of the movie");
    }

    #[test]
    fn wide_sequence_numbers_are_not_truncated() {
        let template = CaptionTemplate::parse("{num}").unwrap();
        assert_eq!(template.render(12345), "12345");
    }

    #[test]
    fn rejects_template_without_placeholder() {
        assert!(CaptionTemplate::parse("no substitution here").is_err());
    }

    #[test]
    fn rejects_template_with_two_placeholders() {
        assert!(CaptionTemplate::parse("{num} and {num}").is_err());
    }
}
