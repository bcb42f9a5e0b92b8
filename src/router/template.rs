use std::borrow::Cow;
use std::fmt;

/// One element of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Matches only the exact (case-sensitive) text
    Literal(String),
    /// Matches any single path element and captures it under `name`
    Parameter(String),
}

/// Error raised when a path template string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplateError {
    MissingLeadingSlash { template: String },
    EmptyParameterName { template: String },
    DuplicateParameter { template: String, name: String },
}

impl fmt::Display for PathTemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathTemplateError::MissingLeadingSlash { template } => {
                write!(f, "path template '{template}' must start with '/'")
            }
            PathTemplateError::EmptyParameterName { template } => {
                write!(f, "path template '{template}' has an unnamed '{{}}' parameter")
            }
            PathTemplateError::DuplicateParameter { template, name } => {
                write!(
                    f,
                    "path template '{template}' declares parameter '{name}' more than once"
                )
            }
        }
    }
}

impl std::error::Error for PathTemplateError {}

/// Parsed `/a/{b}/c` path template.
///
/// The element count is fixed at construction and is the key routes are
/// bucketed by; a template only ever matches paths with exactly that many
/// elements. There is no trailing wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<PathSegment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, PathTemplateError> {
        let Some(rest) = template.strip_prefix('/') else {
            return Err(PathTemplateError::MissingLeadingSlash {
                template: template.to_string(),
            });
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                let segment = match part
                    .strip_prefix('{')
                    .and_then(|p| p.strip_suffix('}'))
                {
                    Some("") => {
                        return Err(PathTemplateError::EmptyParameterName {
                            template: template.to_string(),
                        })
                    }
                    Some(name) => {
                        if segments
                            .iter()
                            .any(|s| matches!(s, PathSegment::Parameter(n) if n == name))
                        {
                            return Err(PathTemplateError::DuplicateParameter {
                                template: template.to_string(),
                                name: name.to_string(),
                            });
                        }
                        PathSegment::Parameter(name.to_string())
                    }
                    None => PathSegment::Literal(part.to_string()),
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.segments.len()
    }

    /// Position of the `{name}` segment, computed once per route at start-up.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.segments
            .iter()
            .position(|s| matches!(s, PathSegment::Parameter(n) if n == name))
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Parameter(n) => Some(n.as_str()),
            PathSegment::Literal(_) => None,
        })
    }

    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Literal(_)))
            .count()
    }

    /// Whether the concrete path elements match this template.
    ///
    /// Lengths must be equal; literals compare byte-for-byte and parameters accept
    /// anything (type checking happens later, during parameter binding).
    pub fn matches<S: AsRef<str>>(&self, elements: &[S]) -> bool {
        elements.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(elements)
                .all(|(segment, element)| match segment {
                    PathSegment::Literal(lit) => lit.as_str() == element.as_ref(),
                    PathSegment::Parameter(_) => true,
                })
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a concrete request path into percent-decoded elements.
///
/// Uses the same rule as templates: the leading `/` is dropped and an empty
/// remainder yields no elements, so `/` is the zero-length root path. Any query
/// string is ignored.
pub fn split_path(path: &str) -> Vec<String> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/')
        .map(|part| {
            urlencoding::decode(part)
                .unwrap_or(Cow::Borrowed(part))
                .into_owned()
        })
        .collect()
}

/// Join path elements back into a display path (`/` for zero elements).
pub fn join_path<S: AsRef<str>>(elements: &[S]) -> String {
    let mut out = String::with_capacity(elements.iter().map(|e| e.as_ref().len() + 1).sum());
    for e in elements {
        out.push('/');
        out.push_str(e.as_ref());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}
