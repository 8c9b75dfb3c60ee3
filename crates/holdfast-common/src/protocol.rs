use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Query language understood by a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryLanguage {
    Css,
    XPath,
    /// Matches the `name` attribute.
    Name,
    /// Matches a single CSS class name.
    ClassName,
    Id,
    LinkText,
}

impl QueryLanguage {
    pub fn prefix(&self) -> &'static str {
        match self {
            QueryLanguage::Css => "css",
            QueryLanguage::XPath => "xpath",
            QueryLanguage::Name => "name",
            QueryLanguage::ClassName => "class",
            QueryLanguage::Id => "id",
            QueryLanguage::LinkText => "link",
        }
    }
}

impl FromStr for QueryLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(QueryLanguage::Css),
            "xpath" => Ok(QueryLanguage::XPath),
            "name" => Ok(QueryLanguage::Name),
            "class" => Ok(QueryLanguage::ClassName),
            "id" => Ok(QueryLanguage::Id),
            "link" => Ok(QueryLanguage::LinkText),
            other => Err(format!("unknown query language '{}'", other)),
        }
    }
}

/// A single DOM query: a language plus an expression.
///
/// Serialized as `"<language>:<expression>"`, e.g. `"xpath://h6[text()='Buzz']"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Query {
    pub language: QueryLanguage,
    pub expression: String,
}

impl Query {
    pub fn new(language: QueryLanguage, expression: impl Into<String>) -> Self {
        Self {
            language,
            expression: expression.into(),
        }
    }

    pub fn css(expression: impl Into<String>) -> Self {
        Self::new(QueryLanguage::Css, expression)
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::new(QueryLanguage::XPath, expression)
    }

    pub fn name(expression: impl Into<String>) -> Self {
        Self::new(QueryLanguage::Name, expression)
    }

    pub fn class_name(expression: impl Into<String>) -> Self {
        Self::new(QueryLanguage::ClassName, expression)
    }

    /// Substitute `{key}` slots in the expression.
    pub fn fill(&self, params: &[(&str, &str)]) -> Query {
        let mut expression = self.expression.clone();
        for (key, value) in params {
            expression = expression.replace(&format!("{{{}}}", key), value);
        }
        Query {
            language: self.language,
            expression,
        }
    }

    /// Whether any `{slot}` remains unfilled.
    pub fn has_unfilled_slots(&self) -> bool {
        let bytes = self.expression.as_bytes();
        let mut open = None;
        for (i, b) in bytes.iter().enumerate() {
            match b {
                b'{' => open = Some(i),
                b'}' => {
                    if let Some(start) = open
                        && i > start + 1
                        && bytes[start + 1..i]
                            .iter()
                            .all(|c| c.is_ascii_alphanumeric() || *c == b'_')
                    {
                        return true;
                    }
                    open = None;
                }
                _ => {}
            }
        }
        false
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.language.prefix(), self.expression)
    }
}

impl FromStr for Query {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lang, expr) = s
            .split_once(':')
            .ok_or_else(|| format!("query '{}' has no '<language>:' prefix", s))?;
        let language = lang.trim().parse::<QueryLanguage>()?;
        let expression = expr.trim();
        if expression.is_empty() {
            return Err(format!("query '{}' has an empty expression", s));
        }
        Ok(Query::new(language, expression))
    }
}

impl TryFrom<String> for Query {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Query> for String {
    fn from(query: Query) -> Self {
        query.to_string()
    }
}

/// Opaque, session-scoped reference to a node in the remote DOM.
///
/// The `id` is assigned by the driver that produced the handle and means
/// nothing to any other session. Invalidation is never signaled; it has to
/// be polled for with `Driver::is_present`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub id: u64,
    /// The query that produced this handle, kept for diagnostics.
    pub origin: String,
}

impl ElementHandle {
    pub fn new(id: u64, origin: impl Into<String>) -> Self {
        Self {
            id,
            origin: origin.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.id)
    }
}

/// Keys with confirm/escape/navigation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKey {
    Enter,
    Escape,
    Tab,
    Backspace,
    ArrowDown,
    /// Control+A chord.
    SelectAll,
}

impl SpecialKey {
    /// W3C WebDriver key sequence for this key.
    pub fn sequence(&self) -> String {
        match self {
            SpecialKey::Enter => "\u{E007}".to_string(),
            SpecialKey::Escape => "\u{E00C}".to_string(),
            SpecialKey::Tab => "\u{E004}".to_string(),
            SpecialKey::Backspace => "\u{E003}".to_string(),
            SpecialKey::ArrowDown => "\u{E015}".to_string(),
            // Control is held until the null key releases it.
            SpecialKey::SelectAll => "\u{E009}a\u{E000}".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}
