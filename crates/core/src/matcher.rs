//! Alertmanager label matchers (`name=value`, `name!=value`, `name=~re`, `name!~re`).

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single label matcher in the shape the Alertmanager v2 API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    pub name: String,
    pub value: String,
    pub is_regex: bool,
    /// Older Alertmanager releases omit this field; they only support equality.
    #[serde(default = "default_true")]
    pub is_equal: bool,
}

fn default_true() -> bool {
    true
}

fn label_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*").expect("static regex"))
}

impl Matcher {
    /// Parse a matcher from its textual form.
    ///
    /// Whitespace around the name, operator and value is ignored. The value
    /// may be wrapped in double quotes, in which case `\"`, `\\`, `\n` and `\t`
    /// escapes are honoured. Regex values must compile when anchored.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let err = |reason: &str| ConfigError::Matcher {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        let name = label_name_re()
            .find(trimmed)
            .map(|m| m.as_str())
            .ok_or_else(|| err("missing or invalid label name"))?;
        let rest = trimmed[name.len()..].trim_start();

        let (op, raw_value) = ["=~", "!~", "!=", "="]
            .iter()
            .find_map(|op| rest.strip_prefix(op).map(|v| (*op, v)))
            .ok_or_else(|| err("expected one of =, !=, =~, !~"))?;

        let value = unquote(raw_value.trim()).map_err(|reason| err(&reason))?;
        let (is_regex, is_equal) = match op {
            "=" => (false, true),
            "!=" => (false, false),
            "=~" => (true, true),
            _ => (true, false),
        };

        if is_regex {
            Regex::new(&format!("^(?:{value})$"))
                .map_err(|e| err(&format!("invalid regex: {e}")))?;
        }

        Ok(Self {
            name: name.to_string(),
            value,
            is_regex,
            is_equal,
        })
    }

    /// Parse every matcher, failing on the first invalid entry.
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Self>, ConfigError> {
        inputs.iter().map(|s| Self::parse(s.as_ref())).collect()
    }

    fn operator(&self) -> &'static str {
        match (self.is_regex, self.is_equal) {
            (false, true) => "=",
            (false, false) => "!=",
            (true, true) => "=~",
            (true, false) => "!~",
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.operator(), self.value)
    }
}

fn unquote(value: &str) -> Result<String, String> {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return Ok(value.to_string());
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => return Err(format!("unsupported escape '\\{other}'")),
            None => return Err("dangling escape at end of value".to_string()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_equality() {
        let m = Matcher::parse("alertname=test1").unwrap();
        assert_eq!(m.name, "alertname");
        assert_eq!(m.value, "test1");
        assert!(!m.is_regex);
        assert!(m.is_equal);
    }

    #[test]
    fn parse_all_operators() {
        let ne = Matcher::parse("severity!=info").unwrap();
        assert!(!ne.is_regex && !ne.is_equal);

        let re = Matcher::parse("severity=~warning|critical").unwrap();
        assert!(re.is_regex && re.is_equal);
        assert_eq!(re.value, "warning|critical");

        let nre = Matcher::parse("job!~node.*").unwrap();
        assert!(nre.is_regex && !nre.is_equal);
    }

    #[test]
    fn parse_tolerates_whitespace_and_quotes() {
        let m = Matcher::parse("  instance = \"host:9100\"  ").unwrap();
        assert_eq!(m.name, "instance");
        assert_eq!(m.value, "host:9100");
    }

    #[test]
    fn parse_quoted_escapes() {
        let m = Matcher::parse(r#"msg="say \"hi\"""#).unwrap();
        assert_eq!(m.value, "say \"hi\"");
    }

    #[test]
    fn parse_empty_value() {
        let m = Matcher::parse("team=").unwrap();
        assert_eq!(m.value, "");
    }

    #[test]
    fn rejects_missing_operator() {
        let err = Matcher::parse("alertname").unwrap_err();
        assert!(matches!(err, ConfigError::Matcher { .. }));
    }

    #[test]
    fn rejects_invalid_name() {
        assert!(Matcher::parse("1abc=foo").is_err());
        assert!(Matcher::parse("=foo").is_err());
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = Matcher::parse("job=~(unclosed").unwrap_err();
        assert!(err.to_string().contains("invalid regex"), "{err}");
    }

    #[test]
    fn serializes_in_api_shape() {
        let m = Matcher::parse("severity=~warning|critical").unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "severity",
                "value": "warning|critical",
                "isRegex": true,
                "isEqual": true,
            })
        );
    }

    #[test]
    fn deserializes_without_is_equal() {
        let m: Matcher =
            serde_json::from_str(r#"{"name":"a","value":"b","isRegex":false}"#).unwrap();
        assert!(m.is_equal);
    }

    #[test]
    fn display_uses_operator() {
        let m = Matcher::parse("job!~node.*").unwrap();
        assert_eq!(m.to_string(), "job!~\"node.*\"");
    }
}
