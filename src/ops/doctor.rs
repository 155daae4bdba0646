//! Environment health checks.
//!
//! The `doctor` command runs every probe configure would run, without
//! stopping at the first failure, and reports what is missing.
//!
//! ## Usage
//!
//! ```bash
//! extconf doctor           # Quick check
//! extconf doctor --verbose # Tool paths and failure details
//! ```
//!
//! ## Checks Performed
//!
//! - Host platform (Windows is reported, not probed)
//! - C compiler, pkg-config on Linux, sdl2-config on macOS
//! - Every required and optional dependency

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::builder::resolve::{FlagResolver, ProbeMode, ResolveOptions, SDL2_CONFIG};
use crate::core::dependency::DependencyReport;
use crate::core::errors::ConfigureError;
use crate::core::platform::{detect_platform, Platform, PlatformProfile};
use crate::ops::configure::ConfigureOptions;
use crate::probe::SystemProbe;
use crate::util::config::Config;
use crate::util::fs::absolutize;

/// Result of a single tool check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: false,
            message: message.into(),
            path: None,
            required: true,
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the tool path.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone)]
pub struct DoctorReport {
    /// Detected host
    pub profile: PlatformProfile,

    /// Platform and tool checks
    pub checks: Vec<CheckResult>,

    /// Every dependency probe, in probe order
    pub dependencies: DependencyReport,
}

impl DoctorReport {
    /// Check if all required checks and dependencies passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
            && self.dependencies.all_required_found()
    }

    /// Get the count of passed checks and found dependencies.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
            + self.dependencies.outcomes().iter().filter(|o| o.found).count()
    }

    /// Get the count of failed checks and missing dependencies.
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
            + self.dependencies.outcomes().iter().filter(|o| !o.found).count()
    }

    /// Get the count of required failures.
    pub fn required_failed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.required && !c.passed)
            .count()
            + self.dependencies.missing_required().count()
    }
}

/// Run the doctor command.
pub fn doctor(
    config: &Config,
    options: &ConfigureOptions,
    probe: &dyn SystemProbe,
) -> Result<DoctorReport> {
    let name = config.package_name();
    let profile = detect_platform(probe);
    let mut checks = Vec::new();

    if let Err(err) = profile.ensure_supported(name, config.windows_redirect()) {
        let message = match err {
            ConfigureError::UnsupportedPlatform {
                redirect: Some(redirect),
                ..
            } => format!("not built from source here; use: {}", redirect),
            other => other.to_string(),
        };
        checks.push(CheckResult::fail("Platform", message));
        return Ok(DoctorReport {
            profile,
            checks,
            dependencies: DependencyReport::new(),
        });
    }

    checks.push(CheckResult::pass(
        "Platform",
        format!("{} (kernel {})", profile.platform(), display_release(&profile)),
    ));
    // Only the optional library and header checks compile anything
    checks.push(check_tool(probe, "cc", "C compiler").optional());
    match profile.platform() {
        Platform::MacOs => checks.push(check_tool(probe, SDL2_CONFIG, SDL2_CONFIG)),
        Platform::Linux | Platform::LinuxEmbedded => {
            checks.push(check_tool(probe, "pkg-config", "pkg-config"))
        }
        Platform::Windows => {}
    }

    let source_root = absolutize(&options.project_root, &config.source_root());
    let resolve_options =
        ResolveOptions::from_config(config, &options.project_root, &source_root, &options.output_dir)?;
    let resolution = FlagResolver::new(probe, &resolve_options, ProbeMode::Collect).resolve(&profile)?;

    Ok(DoctorReport {
        profile,
        checks,
        dependencies: resolution.report,
    })
}

fn display_release(profile: &PlatformProfile) -> &str {
    if profile.kernel_release().is_empty() {
        "unknown"
    } else {
        profile.kernel_release()
    }
}

fn check_tool(probe: &dyn SystemProbe, tool: &str, label: &str) -> CheckResult {
    match probe.locate(tool) {
        Some(path) => CheckResult::pass(label, format!("{} is available", tool)).with_path(path),
        None => CheckResult::fail(label, format!("{} not found in PATH", tool)),
    }
}

/// Format a doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "extconf doctor");
    let _ = writeln!(output, "==============\n");

    if verbose {
        let _ = writeln!(output, "Host: {}", report.profile.host());
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "Checks:");
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        let required = if check.required { "" } else { " (optional)" };
        let _ = writeln!(output, "  {} {}{}", status, check.name, required);

        if verbose || !check.passed {
            let _ = writeln!(output, "      {}", check.message);
        }
        if verbose {
            if let Some(path) = &check.path {
                let _ = writeln!(output, "      Path: {}", path.display());
            }
        }
    }

    if !report.dependencies.outcomes().is_empty() {
        let _ = writeln!(output, "\nDependencies:");
    }
    for outcome in report.dependencies.outcomes() {
        let status = if outcome.found { "[OK]" } else { "[!!]" };
        let required = if outcome.is_required() { "" } else { " (optional)" };
        let _ = writeln!(
            output,
            "  {} {} via {}{}",
            status, outcome.name, outcome.method, required
        );

        if let Some(detail) = &outcome.detail {
            if verbose || outcome.is_required() {
                let _ = writeln!(output, "      {}", detail);
            }
        }
        if verbose {
            if let Some(define) = &outcome.define {
                let _ = writeln!(output, "      Defines: {}", define);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Summary: {} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    );

    let required_failed = report.required_failed_count();
    if required_failed > 0 {
        let _ = writeln!(
            output,
            "\n{} required check(s) failed; configure will not succeed.",
            required_failed
        );
        if let Some(url) = report.profile.platform().getting_started_url() {
            let _ = writeln!(output, "See {}", url);
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockProbe;
    use tempfile::TempDir;

    fn run(probe: &MockProbe) -> DoctorReport {
        let tmp = TempDir::new().unwrap();
        let config = Config::default();
        let options = ConfigureOptions::new(&config, tmp.path());
        doctor(&config, &options, probe).unwrap()
    }

    #[test]
    fn test_check_result_optional() {
        let result = CheckResult::pass("test", "passed").optional();
        assert!(result.passed);
        assert!(!result.required);
    }

    #[test]
    fn test_healthy_linux() {
        let report = run(&MockProbe::linux());

        assert!(report.all_required_passed());
        assert_eq!(report.required_failed_count(), 0);
        assert!(report.checks.iter().any(|c| c.name == "pkg-config" && c.passed));
        assert!(report.dependencies.get("sndfile").is_some());
    }

    #[test]
    fn test_collects_every_missing_dependency() {
        let probe = MockProbe::linux()
            .without_package("gl")
            .without_package("openal")
            .without_library("SDL2_ttf");
        let report = run(&probe);

        assert!(!report.all_required_passed());
        assert_eq!(report.required_failed_count(), 2);
        // Probing continued past the first failure
        assert!(report.dependencies.get("sndfile").is_some_and(|o| o.found));

        let text = format_report(&report, false);
        assert!(text.contains("[!!] gl via pkg-config"));
        assert!(text.contains("[!!] libSDL2_ttf via library (optional)"));
        assert!(text.contains("2 required check(s) failed"));
        assert!(text.contains("Getting-Started-on-Linux"));
    }

    #[test]
    fn test_missing_tool_fails() {
        let probe = MockProbe::macos("14.0.0").without_helper(SDL2_CONFIG);
        let report = run(&probe);

        assert!(!report.all_required_passed());
        assert!(report
            .checks
            .iter()
            .any(|c| c.name == SDL2_CONFIG && !c.passed));
    }

    #[test]
    fn test_missing_compiler_is_optional() {
        let report = run(&MockProbe::linux().without_helper("cc"));

        assert!(report.all_required_passed());
        assert!(report
            .checks
            .iter()
            .any(|c| c.name == "C compiler" && !c.passed && !c.required));
    }

    #[test]
    fn test_windows_reports_redirect() {
        let probe = MockProbe::linux().with_host("i386-mingw32");
        let report = run(&probe);

        assert!(!report.all_required_passed());
        assert!(report.dependencies.outcomes().is_empty());
        assert!(report.checks[0]
            .message
            .contains("gem install gosu --platform=i386-mingw32"));
        assert!(probe.calls().is_empty());
    }

    #[test]
    fn test_verbose_report_lists_paths() {
        let report = run(&MockProbe::linux());
        let text = format_report(&report, true);

        assert!(text.contains("Host: x86_64-linux"));
        assert!(text.contains("Path: "));
        assert!(text.contains("Defines: HAVE_AL_AL_H"));
    }
}
