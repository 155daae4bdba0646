//! Dependency probe outcomes.

use std::fmt;

use serde::Serialize;

/// Whether a dependency must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Absence aborts configuration.
    Required,
    /// Absence only leaves a feature define out.
    Optional,
}

/// How a dependency was looked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeMethod {
    /// `pkg-config <name>`
    PkgConfig,
    /// A `<name>-config` style helper script
    Helper,
    /// Linking a test program against the library
    Library,
    /// Preprocessing a test program including the header
    Header,
    /// Fixed paths, nothing probed
    Fixed,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeMethod::PkgConfig => "pkg-config",
            ProbeMethod::Helper => "helper",
            ProbeMethod::Library => "library",
            ProbeMethod::Header => "header",
            ProbeMethod::Fixed => "fixed",
        };
        f.write_str(s)
    }
}

/// Result of probing one dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    pub name: String,
    pub requirement: Requirement,
    pub method: ProbeMethod,
    pub found: bool,
    /// Feature define enabled by this outcome, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub define: Option<String>,
    /// Why the probe failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ProbeOutcome {
    /// A dependency that was found.
    pub fn found(name: impl Into<String>, requirement: Requirement, method: ProbeMethod) -> Self {
        ProbeOutcome {
            name: name.into(),
            requirement,
            method,
            found: true,
            define: None,
            detail: None,
        }
    }

    /// A dependency that was not found.
    pub fn missing(
        name: impl Into<String>,
        requirement: Requirement,
        method: ProbeMethod,
        detail: impl Into<String>,
    ) -> Self {
        ProbeOutcome {
            name: name.into(),
            requirement,
            method,
            found: false,
            define: None,
            detail: Some(detail.into()),
        }
    }

    /// Record the feature define enabled by this outcome.
    pub fn with_define(mut self, define: impl Into<String>) -> Self {
        self.define = Some(define.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.requirement == Requirement::Required
    }
}

/// Outcomes of every probe in a configure run, in probe order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    outcomes: Vec<ProbeOutcome>,
}

impl DependencyReport {
    pub fn new() -> Self {
        DependencyReport::default()
    }

    pub fn add(&mut self, outcome: ProbeOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    /// Look up an outcome by dependency name.
    pub fn get(&self, name: &str) -> Option<&ProbeOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }

    /// Whether every required dependency was found.
    pub fn all_required_found(&self) -> bool {
        self.outcomes
            .iter()
            .filter(|o| o.is_required())
            .all(|o| o.found)
    }

    /// Required dependencies that were not found.
    pub fn missing_required(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.is_required() && !o.found)
    }

    /// Feature defines enabled by optional dependencies.
    pub fn enabled_features(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.found)
            .filter_map(|o| o.define.as_deref())
    }
}
