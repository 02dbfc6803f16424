use crate::executor::ExecutionStatus;
use crate::registry::{REGISTRY, TestCase};
use serde::Serialize;

/// Default severity level for crashes detected by `CrashOracle`.
const DEFAULT_CRASH_SEVERITY: u8 = 10;

/// A finding produced while replaying a saved input.
#[derive(Debug, Clone, Serialize)]
pub struct BugReport {
    /// Registry entry selected by the input, if the selector is valid.
    pub case: Option<&'static str>,
    /// Panic or fault message.
    pub description: String,
    /// MD5 of the whole input, for deduplication.
    pub input_hash: String,
    pub input_len: usize,
    pub severity: u8,
}

/// Examines an execution status and decides whether it is a bug.
pub trait Oracle {
    fn examine(&self, input: &[u8], status: &ExecutionStatus) -> Option<BugReport>;
}

/// Reports every `Crash` status and nothing else. The case name in a report
/// comes from the table the crashing dispatcher selected from.
#[derive(Debug, Clone, Copy)]
pub struct CrashOracle {
    cases: &'static [TestCase],
}

impl CrashOracle {
    /// An oracle naming cases from the built-in [`REGISTRY`].
    pub fn new() -> Self {
        Self::with_cases(&REGISTRY)
    }

    pub fn with_cases(cases: &'static [TestCase]) -> Self {
        Self { cases }
    }
}

impl Default for CrashOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl Oracle for CrashOracle {
    fn examine(&self, input: &[u8], status: &ExecutionStatus) -> Option<BugReport> {
        match status {
            ExecutionStatus::Crash(description) => Some(BugReport {
                case: input
                    .first()
                    .and_then(|&selector| self.cases.get(usize::from(selector)))
                    .map(|case| case.name),
                description: description.clone(),
                input_hash: format!("{:x}", md5::compute(input)),
                input_len: input.len(),
                severity: DEFAULT_CRASH_SEVERITY,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadKind;
    use crate::target::{OutputFormat, Profile};

    #[test]
    fn crash_oracle_detects_crash_and_creates_valid_report() {
        let oracle = CrashOracle::new();
        let input: Vec<u8> = vec![17, b'#', b' ', b'x'];
        let status = ExecutionStatus::Crash("Test panic: index out of bounds".to_string());

        let report = oracle
            .examine(&input, &status)
            .expect("Oracle should detect a crash");
        assert_eq!(report.case, Some("all_features"));
        assert_eq!(report.description, "Test panic: index out of bounds");
        assert_eq!(
            report.input_hash,
            format!("{:x}", md5::compute(&input)),
            "Report input_hash should be the MD5 hex string of the input"
        );
        assert_eq!(report.input_len, 4);
        assert_eq!(report.severity, DEFAULT_CRASH_SEVERITY);
    }

    #[test]
    fn crash_with_unknown_selector_has_no_case() {
        let report = CrashOracle::new()
            .examine(&[0xFE], &ExecutionStatus::Crash("x".to_string()))
            .expect("crash is reported");
        assert_eq!(report.case, None);
    }

    #[test]
    fn case_names_come_from_the_oracle_table() {
        static TABLE: [TestCase; 1] = [TestCase {
            name: "only_entry",
            profile: Profile::plain(OutputFormat::Html5),
            payload: PayloadKind::Bytes,
        }];
        let oracle = CrashOracle::with_cases(&TABLE);
        let crash = ExecutionStatus::Crash("boom".to_string());

        let report = oracle.examine(&[0x00, 0xFF], &crash).expect("crash is reported");
        assert_eq!(report.case, Some("only_entry"));
        let report = oracle.examine(&[17], &crash).expect("crash is reported");
        assert_eq!(report.case, None, "selector 17 is outside the custom table");
    }

    #[test]
    fn crash_oracle_ignores_non_crash_statuses() {
        let oracle = CrashOracle::new();
        for status in [
            ExecutionStatus::Ok,
            ExecutionStatus::Skipped,
            ExecutionStatus::Suppressed("unsupported".to_string()),
        ] {
            assert!(
                oracle.examine(&[0x01], &status).is_none(),
                "Oracle should ignore {status:?}"
            );
        }
    }

    #[test]
    fn report_serializes_to_toml_friendly_fields() {
        let report = CrashOracle::new()
            .examine(&[0x00], &ExecutionStatus::Crash("boom".to_string()))
            .expect("crash is reported");
        let rendered = toml::to_string(&report).expect("report serializes");
        assert!(rendered.contains("case = \"xhtml\""), "got: {rendered}");
        assert!(rendered.contains("severity = 10"), "got: {rendered}");
    }
}
