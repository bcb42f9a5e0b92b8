use std::fmt;

/// One problem found while compiling a route manifest.
///
/// The compiler collects every issue in the manifest before aborting, so a single
/// run reports all of them instead of stopping at the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Render issues one per line, in the order they were found.
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print issues to stderr in the compiler's report format.
pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!(
        "\n❌ Route manifest validation failed. {} issue(s) found:\n",
        issues.len()
    );
    eprintln!("{}", format_issues(issues));
    eprintln!("\nPlease fix the manifest before generating routes.\n");
}
