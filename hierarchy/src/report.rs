//! Run report: findings gathered while the pipeline runs.
//!
//! Fatal conditions are errors; the report only carries what a successful
//! run observed along the way, such as dropped subclass edges.

use std::fmt;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress information.
    Info,
    /// Something was dropped or replaced; the run still succeeded.
    Warning,
}

impl Severity {
    /// Short tag used when printing.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
        }
    }
}

/// A single observation of one pipeline stage.
#[derive(Debug, Clone)]
pub struct Finding {
    /// Stage that produced the finding (e.g. `"network"`).
    pub stage: String,
    /// Human-readable message.
    pub message: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Optional detail lines.
    pub details: Vec<String>,
}

impl Finding {
    /// Creates an informational finding.
    pub fn info(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: Severity::Info,
            details: Vec::new(),
        }
    }

    /// Creates a warning with detail lines.
    pub fn warn_with_details(
        stage: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
            severity: Severity::Warning,
            details,
        }
    }

    /// Returns true if this finding is a warning.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} — {}", self.severity.as_str(), self.stage, self.message)?;
        for detail in &self.details {
            write!(f, "\n       {detail}")?;
        }
        Ok(())
    }
}

/// Findings of one pipeline run, in the order they were recorded.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// All findings.
    pub findings: Vec<Finding>,
}

impl RunReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_warning()).count()
    }

    /// Findings recorded by `stage`.
    pub fn for_stage<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_warnings() {
        let mut report = RunReport::new();
        report.push(Finding::info("network", "4 classes visited"));
        report.push(Finding::warn_with_details(
            "network",
            "1 subclass edge dropped",
            vec!["B -> C (kept under A)".to_string()],
        ));
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.for_stage("network").count(), 2);
        assert_eq!(report.for_stage("encoder").count(), 0);
    }

    #[test]
    fn display_includes_details() {
        let finding = Finding::warn_with_details("merge", "overrides", vec!["B".to_string()]);
        assert_eq!(finding.to_string(), "[WARN] merge — overrides\n       B");
    }
}
