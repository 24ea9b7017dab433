//! End-to-end case runner for errside.
//!
//! A case is a function body dropped into a small Go file. Running it goes
//! through the whole pipeline and records how many checks were merged and
//! what the merged file looks like, so a suite can report a pass rate per
//! category.

use errside_compiler::Program;
use errside_printer::RenderConfig;

/// Imports and helpers every case body may use.
const PRELUDE: &str = "package cases

import (
\t\"errors\"
\t\"fmt\"
\t\"os\"
\t\"strconv\"
)

var errSentinel = errors.New(\"sentinel\")

func open(name string) (*os.File, error) {
\treturn os.Open(name)
}

func validate(x int) error {
\tif x < 0 {
\t\treturn fmt.Errorf(\"negative: %d\", x)
\t}
\treturn nil
}

func atoi(s string) (int, error) {
\treturn strconv.Atoi(s)
}
";

/// Wrap a function body into a complete file.
pub fn go_source(params: &str, results: &str, body: &str) -> String {
    let results = if results.is_empty() {
        String::new()
    } else {
        format!(" {}", results)
    };
    format!("{}\nfunc run({}){} {{\n{}}}\n", PRELUDE, params, results, body)
}

/// What a case is expected to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    /// This many composites, with each snippet somewhere in the output.
    Merged(usize, Vec<&'static str>),
    /// No composite at all.
    Untouched,
    /// The file does not resolve.
    Rejected,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub name: &'static str,
    pub category: &'static str,
    pub source: String,
    pub expect: Expect,
}

/// Outcome of one case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: &'static str,
    pub category: &'static str,
    pub passed: bool,
    pub detail: String,
}

pub fn run_case(case: &Case, config: &RenderConfig) -> CaseResult {
    let mut program = Program::new();
    let outcome = match program.add_source("cases.go", &case.source) {
        Ok(()) => program.render(config),
        Err(err) => Err(err),
    };

    let (passed, detail) = match (&case.expect, outcome) {
        (Expect::Rejected, Err(err)) => (true, err.to_string()),
        (_, Err(err)) => (false, format!("unexpected error: {}", err)),
        (Expect::Rejected, Ok(_)) => (false, "expected an error".to_string()),
        (expect, Ok(files)) => {
            let composites: usize = files.iter().map(|f| f.ranges.len()).sum();
            let text: String = files.into_iter().map(|f| f.text).collect();
            match expect {
                Expect::Untouched => (composites == 0 && text == case.source, text),
                Expect::Merged(count, snippets) => {
                    let missing: Vec<&str> = snippets.iter().copied().filter(|s| !text.contains(s)).collect();
                    let passed = composites == *count && missing.is_empty();
                    (passed, format!("{} composites, missing {:?}\n{}", composites, missing, text))
                }
                Expect::Rejected => (false, text),
            }
        }
    };

    CaseResult {
        name: case.name,
        category: case.category,
        passed,
        detail,
    }
}

/// A collection of cases run together.
#[derive(Debug, Default)]
pub struct Suite {
    cases: Vec<Case>,
    results: Vec<CaseResult>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: &'static str, name: &'static str, source: String, expect: Expect) {
        self.cases.push(Case {
            name,
            category,
            source,
            expect,
        });
    }

    pub fn run(&mut self, config: &RenderConfig) {
        self.results = self.cases.iter().map(|case| run_case(case, config)).collect();
    }

    pub fn failures(&self) -> Vec<&CaseResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// Passed cases over all cases, per category, in insertion order.
    pub fn summary(&self) -> Vec<(&'static str, usize, usize)> {
        let mut summary: Vec<(&'static str, usize, usize)> = Vec::new();
        for result in &self.results {
            let index = match summary.iter().position(|(c, _, _)| *c == result.category) {
                Some(index) => index,
                None => {
                    summary.push((result.category, 0, 0));
                    summary.len() - 1
                }
            };
            summary[index].2 += 1;
            if result.passed {
                summary[index].1 += 1;
            }
        }
        summary
    }
}
