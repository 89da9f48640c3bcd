use gemaudit::lockfile::{GemfileLockLoader, ManifestLoader};
use gemaudit::model::{Manifest, Source};
use gemaudit::output::{parse_stream, CheckName};
use gemaudit::{AdvisoryScanner, Analyzer, AnalyzerError, Database, Finding, Scanner};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_directory(fixture: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(fixture)
}

fn scanner() -> AdvisoryScanner {
    AdvisoryScanner::new(Database::open(fixture_directory("advisory_db")).unwrap())
}

fn analyze_directory(directory: &Path, scanner: impl Scanner) -> (Vec<u8>, Vec<u8>) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    Analyzer::new(directory, scanner)
        .with_stdout(&mut stdout)
        .with_stderr(&mut stderr)
        .run()
        .unwrap();
    (stdout, stderr)
}

fn split_issues(stdout: &[u8]) -> Vec<Value> {
    stdout
        .split(|b| *b == b'\0')
        .filter(|segment| !segment.is_empty())
        .map(|segment| serde_json::from_slice(segment).unwrap())
        .collect()
}

fn expected_issues(fixture: &str) -> Vec<Value> {
    let body = fs::read_to_string(fixture_directory(fixture).join("issues.json")).unwrap();
    serde_json::from_str(&body).unwrap()
}

/// True when every field of `expected` is present in `actual` with the same value.
fn is_subset(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => expected
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|other| is_subset(value, other))),
        _ => expected == actual,
    }
}

fn assert_includes_expected(fixture: &str) {
    let (stdout, _) = analyze_directory(&fixture_directory(fixture), scanner());
    let issues = split_issues(&stdout);

    for expected in expected_issues(fixture) {
        assert!(
            issues.iter().any(|issue| is_subset(&expected, issue)),
            "missing issue in {}: {}",
            fixture,
            expected
        );
    }
}

/// Prepends one finding of a kind the analyzer has no issue for.
struct WithUnsupported<S>(S);

impl<S: Scanner> Scanner for WithUnsupported<S> {
    fn scan<'a>(&'a self, manifest: &'a Manifest) -> Box<dyn Iterator<Item = Finding> + 'a> {
        Box::new(
            std::iter::once(Finding::unsupported("UnhandledVulnerability"))
                .chain(self.0.scan(manifest)),
        )
    }
}

#[test]
fn test_missing_gemfile_lock_is_an_error() {
    let directory = fixture_directory("no_gemfile_lock");
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let result = Analyzer::new(&directory, scanner())
        .with_stdout(&mut stdout)
        .with_stderr(&mut stderr)
        .run();

    match result {
        Err(AnalyzerError::GemfileLockNotFound { directory: reported }) => {
            assert_eq!(reported, directory);
        }
        other => panic!("expected GemfileLockNotFound, got {:?}", other),
    }
    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
}

#[test]
fn test_emits_issues_for_unpatched_gems() {
    assert_includes_expected("unpatched_versions");
}

#[test]
fn test_emits_issues_for_insecure_sources() {
    assert_includes_expected("insecure_sources");
}

#[test]
fn test_supports_alphanumeric_versions() {
    assert_includes_expected("alphanumeric_versions");
}

#[test]
fn test_issue_count_matches_findings() {
    let directory = fixture_directory("unpatched_versions");
    let manifest = GemfileLockLoader.load(&directory).unwrap();
    let scanner = scanner();
    let findings = scanner.scan(&manifest).count();

    let (stdout, stderr) = analyze_directory(&directory, &scanner);

    assert_eq!(findings, 3);
    assert_eq!(stdout.iter().filter(|b| **b == b'\0').count(), findings - 1);
    assert_eq!(parse_stream(&stdout).unwrap().len(), findings);
    assert!(stderr.is_empty());
}

#[test]
fn test_insecure_sources_skip_internal_hosts() {
    let (stdout, _) = analyze_directory(&fixture_directory("insecure_sources"), scanner());
    let issues = parse_stream(&stdout).unwrap();

    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|issue| !issue.description.contains("localhost")));
}

#[test]
fn test_logs_unsupported_vulnerability_to_stderr() {
    let (stdout, stderr) = analyze_directory(
        &fixture_directory("unpatched_versions"),
        WithUnsupported(scanner()),
    );

    assert_eq!(
        String::from_utf8(stderr).unwrap(),
        "Unsupported vulnerability: UnhandledVulnerability"
    );
    assert_eq!(split_issues(&stdout).len(), 3);
}

#[test]
fn test_ignored_advisories_are_not_reported() {
    let scanner = scanner().with_ignore(["CVE-2013-0262", "OSVDB-89939"]);
    let (stdout, _) = analyze_directory(&fixture_directory("unpatched_versions"), scanner);
    let issues = parse_stream(&stdout).unwrap();

    assert_eq!(issues.len(), 1);
    assert!(issues[0]
        .content
        .as_ref()
        .is_some_and(|content| content.body.contains("CVE-2013-0156")));
}

#[test]
fn test_runs_are_idempotent() {
    let scanner = scanner();
    for fixture in ["unpatched_versions", "insecure_sources", "alphanumeric_versions"] {
        let directory = fixture_directory(fixture);
        let first = analyze_directory(&directory, &scanner);
        let second = analyze_directory(&directory, &scanner);
        assert_eq!(first, second, "output of {} changed between runs", fixture);
    }
}

#[test]
fn test_issues_reference_declared_gems_or_sources() {
    let scanner = scanner();
    for fixture in ["unpatched_versions", "insecure_sources", "alphanumeric_versions"] {
        let directory = fixture_directory(fixture);
        let manifest = GemfileLockLoader.load(&directory).unwrap();

        let mut source_lines: Vec<usize> = Vec::new();
        for source in manifest.sources() {
            match source {
                Source::Rubygems { remotes } => source_lines.extend(remotes.iter().map(|r| r.line)),
                Source::Git { line, .. } | Source::Path { line, .. } => source_lines.push(*line),
            }
        }

        let (stdout, _) = analyze_directory(&directory, &scanner);
        for issue in parse_stream(&stdout).unwrap() {
            assert!(!issue.description.trim().is_empty());
            assert_eq!(issue.location.path, "Gemfile.lock");
            assert_eq!(issue.fingerprint.len(), 64);

            match issue.check_name {
                CheckName::InsecureDependency => {
                    let package = issue
                        .package
                        .as_ref()
                        .unwrap_or_else(|| panic!("{}: dependency issue without package", fixture));
                    let spec = manifest
                        .find_spec(&package.name)
                        .unwrap_or_else(|| panic!("{}: undeclared gem {}", fixture, package.name));
                    assert_eq!(package.version, spec.version.to_string());
                    assert_eq!(issue.location.lines.begin, spec.line);
                }
                CheckName::InsecureSource => {
                    assert!(issue.package.is_none());
                    assert!(
                        source_lines.contains(&issue.location.lines.begin),
                        "{} points at undeclared line {}",
                        fixture,
                        issue.location.lines.begin
                    );
                }
            }
        }
    }
}
