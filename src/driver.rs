// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Validates a batch of files one after the other and reports the outcome.

use core::fmt;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::problem::Problem;
use crate::validator::{DocumentError, Validate};

/// Highest exit code used for validation failures. Failure counts above it
/// saturate so they never wrap around to 0 or reach [USAGE_EXIT_CODE].
pub const MAX_FAILURE_EXIT_CODE: u8 = 254;

/// Exit code for invalid arguments or configuration.
pub const USAGE_EXIT_CODE: u8 = 255;

/// Pass and fail counts of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub pass: usize,
    pub fail: usize,
}

impl RunSummary {
    /// The number of failed files, saturated at [MAX_FAILURE_EXIT_CODE].
    pub fn exit_code(&self) -> u8 {
        self.fail.min(usize::from(MAX_FAILURE_EXIT_CODE)) as u8
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SUMMARY: PASS={} FAIL={}", self.pass, self.fail)
    }
}

/// Validates every file of `paths`, in order, and writes a line per file
/// followed by the summary to `out` unless `quiet` is set. A file that can't
/// be read or parsed counts as failed; it never stops the run. Only errors
/// writing to `out` are returned.
pub fn run<V, P, W>(validator: &V, paths: &[P], quiet: bool, out: &mut W) -> io::Result<RunSummary>
where
    V: Validate,
    P: AsRef<Path>,
    W: Write,
{
    let mut summary = RunSummary::default();
    for path in paths {
        let path = path.as_ref();
        if !quiet {
            write!(out, "{}: ", display_name(path))?;
        }
        match validate_file(validator, path) {
            Ok(problems) if problems.is_empty() => {
                debug!(file = %path.display(), "document is valid");
                summary.pass += 1;
                if !quiet {
                    writeln!(out, "PASS")?;
                }
            }
            Ok(problems) => {
                debug!(file = %path.display(), problems = problems.len(), "document is invalid");
                summary.fail += 1;
                if !quiet {
                    writeln!(out, "FAIL")?;
                    for problem in &problems {
                        writeln!(out, "{problem}")?;
                    }
                }
            }
            Err(e) => {
                debug!(file = %path.display(), error = %e, "document could not be validated");
                summary.fail += 1;
                if !quiet {
                    writeln!(out, "FAIL")?;
                }
            }
        }
    }
    if !quiet {
        writeln!(out, "{summary}")?;
    }
    Ok(summary)
}

/// The reader is dropped before returning, whatever the outcome.
fn validate_file<V: Validate>(validator: &V, path: &Path) -> Result<Vec<Problem>, DocumentError> {
    let reader = BufReader::new(File::open(path)?);
    validator.validate(reader)
}

fn display_name(path: &Path) -> String {
    path.file_name().unwrap_or(path.as_os_str()).to_string_lossy().into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Read;
    use std::path::PathBuf;

    /// Fails documents containing "bad", and rejects ones containing "{{".
    struct StubValidator;

    impl Validate for StubValidator {
        fn validate<R: Read>(&self, mut document: R) -> Result<Vec<Problem>, DocumentError> {
            let mut text = String::new();
            document.read_to_string(&mut text)?;
            if text.contains("{{") {
                return Err(serde_json::from_str::<serde_json::Value>(&text).unwrap_err().into());
            }
            if text.contains("bad") {
                return Ok(vec![
                    Problem::leaf("bad value", "[/] bad value"),
                    Problem::branching(
                        "no match",
                        "[/x] no match",
                        vec![vec![Problem::leaf("a", "[/x] a")], vec![Problem::leaf("b", "[/x] b")]],
                    ),
                ]);
            }
            Ok(vec![])
        }
    }

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
        files
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                std::fs::write(&path, content).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_report() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(
            dir.path(),
            &[("good.json", "{}"), ("bad.json", "\"bad\""), ("broken.json", "{{")],
        );
        let mut out = Vec::new();
        let summary = run(&StubValidator, &paths, false, &mut out).unwrap();
        assert_eq!(summary, RunSummary { pass: 1, fail: 2 });
        assert_eq!(summary.exit_code(), 2);
        let expected = [
            "good.json: PASS",
            "bad.json: FAIL",
            "[/] bad value",
            "no match",
            "1) [/x] a",
            "2) [/x] b",
            "broken.json: FAIL",
            "SUMMARY: PASS=1 FAIL=2",
            "",
        ]
        .join("\n");
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_quiet() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_files(
            dir.path(),
            &[("a.json", "{}"), ("b.json", "\"bad\""), ("c.json", "[]")],
        );
        let mut out = Vec::new();
        let summary = run(&StubValidator, &paths, true, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_no_files() {
        let mut out = Vec::new();
        let summary = run::<_, PathBuf, _>(&StubValidator, &[], false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "SUMMARY: PASS=0 FAIL=0\n");
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_missing_file_fails_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = vec![dir.path().join("gone.json")];
        paths.extend(write_files(dir.path(), &[("ok.json", "{}")]));
        let mut out = Vec::new();
        let summary = run(&StubValidator, &paths, false, &mut out).unwrap();
        assert_eq!(summary, RunSummary { pass: 1, fail: 1 });
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "gone.json: FAIL\nok.json: PASS\nSUMMARY: PASS=1 FAIL=1\n"
        );
    }

    #[test]
    fn test_exit_code_saturates() {
        assert_eq!(RunSummary { pass: 3, fail: 0 }.exit_code(), 0);
        assert_eq!(RunSummary { pass: 0, fail: 254 }.exit_code(), 254);
        assert_eq!(RunSummary { pass: 0, fail: 256 }.exit_code(), MAX_FAILURE_EXIT_CODE);
    }
}
