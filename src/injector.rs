//! # Target Injection
//!
//! Every target block of the Podfile must record one decision: either it
//! invokes the generated `airone_modules!` method, or it carries a commented
//! `# airone_ignore!` marker saying the user declined. `TargetInjector`
//! walks the document until no target is left without one of the two.
//!
//! ## Loop
//!
//! 1. Scan for the next target without a marker.
//! 2. Ask the `ConfirmOracle` whether to inject into it.
//! 3. Insert the enable or skip marker right after the declaration line.
//! 4. Re-scan the mutated document from the top.
//!
//! Each pass turns one unmarked target into a marked one and injection never
//! creates targets, so the loop ends after at most one question per target.
//! Targets already carrying a marker from an earlier run are never asked
//! about again.

use log::info;
use std::collections::VecDeque;

use crate::document::TextDocument;
use crate::error::{Error, Result};
use crate::region::GENERATED_METHOD;
use crate::scanner;

/// Marker line (without indentation) recording that a target was skipped.
pub const SKIP_MARKER: &str = "# airone_ignore!";

/// Answers whether airone modules should be injected into a target.
pub trait ConfirmOracle {
    /// Decide for the target named `target`.
    fn confirm(&mut self, target: &str) -> Result<bool>;
}

impl<O: ConfirmOracle + ?Sized> ConfirmOracle for &mut O {
    fn confirm(&mut self, target: &str) -> Result<bool> {
        (**self).confirm(target)
    }
}

/// Gives the same answer for every target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl ConfirmOracle for FixedAnswer {
    fn confirm(&mut self, _target: &str) -> Result<bool> {
        Ok(self.0)
    }
}

/// Replays a queue of answers and records every question it was asked.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    answers: VecDeque<bool>,
    asked: Vec<String>,
}

impl ScriptedOracle {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Target names asked about, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl ConfirmOracle for ScriptedOracle {
    fn confirm(&mut self, target: &str) -> Result<bool> {
        self.asked.push(target.to_string());
        self.answers.pop_front().ok_or_else(|| Error::Prompt {
            message: format!("no scripted answer left for target '{}'", target),
        })
    }
}

/// The decision recorded for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Injected,
    Skipped,
}

/// Decisions made during one injector run, in the order they were made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    pub decisions: Vec<(String, Decision)>,
}

impl InjectionReport {
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    pub fn injected(&self) -> impl Iterator<Item = &str> {
        self.decisions
            .iter()
            .filter(|(_, d)| *d == Decision::Injected)
            .map(|(name, _)| name.as_str())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &str> {
        self.decisions
            .iter()
            .filter(|(_, d)| *d == Decision::Skipped)
            .map(|(name, _)| name.as_str())
    }
}

/// Drives the per-target confirmation loop over a document.
pub struct TargetInjector<O: ConfirmOracle> {
    oracle: O,
}

impl<O: ConfirmOracle> TargetInjector<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn into_oracle(self) -> O {
        self.oracle
    }

    /// Mark every unmarked target of `doc`, asking the oracle for each one.
    pub fn run(&mut self, doc: &mut TextDocument) -> Result<InjectionReport> {
        let mut report = InjectionReport::default();

        while let Some(block) = scanner::find_next_uninjected_target(doc) {
            let inject = self.oracle.confirm(&block.name)?;
            let declaration = doc.line(block.start).unwrap_or_default();
            let indent = format!("{}  ", leading_whitespace(declaration));

            let (marker, decision) = if inject {
                (format!("{}{}", indent, GENERATED_METHOD), Decision::Injected)
            } else {
                (format!("{}{}", indent, SKIP_MARKER), Decision::Skipped)
            };

            doc.insert(block.start + 1, [marker])?;
            info!(
                "Target '{}': {}",
                block.name,
                match decision {
                    Decision::Injected => "airone modules injected",
                    Decision::Skipped => "skipped",
                }
            );
            report.decisions.push((block.name, decision));
        }

        Ok(report)
    }
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start();
    &line[..line.len() - trimmed.len()]
}
