use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{info, warn};
use regex::Regex;
use walkdir::WalkDir;

use crate::error::CheckError;
use crate::input;
use crate::search::SearchConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub input: PathBuf,
    pub line: usize,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Default)]
pub struct CheckReport {
    pub passed: Vec<PathBuf>,
    pub failed: Vec<Mismatch>,
    pub missing: Vec<PathBuf>,
    pub errors: Vec<CheckError>,
}

impl CheckReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.errors.is_empty()
    }
}

/// Solves every `<name>.in` under `path` and compares with `<name>.ans` (or `<name>.out`).
pub fn check_dir<P: AsRef<Path>>(path: P, recursive: bool, config: SearchConfig) -> CheckReport {
    lazy_static! {
        static ref INPUT_NAME: Regex = Regex::new(r"^(?P<name>.+)\.in$").unwrap();
    }
    let inputs = WalkDir::new(path)
        .max_depth(if recursive { usize::MAX } else { 1 })
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            INPUT_NAME
                .captures(e.file_name().to_string_lossy().as_ref())
                .map(|cap| (e.path().to_path_buf(), cap["name"].to_owned()))
        })
        .collect::<Vec<_>>();

    let mut report = CheckReport::default();
    for (input, name) in inputs {
        let Some(expected) = expected_file(&input, &name) else {
            warn!("No answer file for {}", input.display());
            report.missing.push(input);
            continue;
        };
        match check_file(&input, &expected, config) {
            Ok(None) => report.passed.push(input),
            Ok(Some(mismatch)) => {
                warn!("Wrong answer for {} on line {}", input.display(), mismatch.line);
                report.failed.push(mismatch)
            }
            Err(e) => {
                warn!("{e}");
                report.errors.push(e)
            }
        }
    }
    info!(
        "{} passed, {} failed, {} missing, {} errors",
        report.passed.len(),
        report.failed.len(),
        report.missing.len(),
        report.errors.len()
    );
    report
}

fn expected_file(input: &Path, name: &str) -> Option<PathBuf> {
    ["ans", "out"]
        .iter()
        .map(|ext| input.with_file_name(format!("{name}.{ext}")))
        .find(|p| p.is_file())
}

fn check_file(
    input: &Path,
    expected: &Path,
    config: SearchConfig,
) -> Result<Option<Mismatch>, CheckError> {
    let read = |path: &Path| {
        fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })
    };
    let actual = input::answers(&read(input)?, config, false).map_err(|source| {
        CheckError::Input {
            path: input.to_path_buf(),
            source,
        }
    })?;
    Ok(compare(&actual, &read(expected)?).map(|(line, expected, actual)| Mismatch {
        input: input.to_path_buf(),
        line,
        expected,
        actual,
    }))
}

/// First differing non-blank line as `(line, expected, actual)`, whitespace insensitive.
fn compare(actual: &str, expected: &str) -> Option<(usize, String, String)> {
    fn lines(s: &str) -> Vec<Vec<&str>> {
        s.lines()
            .map(|l| l.split_ascii_whitespace().collect::<Vec<_>>())
            .filter(|l| !l.is_empty())
            .collect()
    }
    let (actual, expected) = (lines(actual), lines(expected));
    let render = |l: Option<&Vec<&str>>| l.map_or("<missing>".to_owned(), |t| t.join(" "));
    (0..actual.len().max(expected.len()))
        .find(|&i| actual.get(i) != expected.get(i))
        .map(|i| (i + 1, render(expected.get(i)), render(actual.get(i))))
}
