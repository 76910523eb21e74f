//! Checking one drawing against an ordered list of spells
//!
//! [`SpellScan`] is an explicit step function: each `step` classifies one
//! candidate. The host decides how steps are scheduled; a plain loop
//! ([`SpellScan::run`]) or a cooperative task ([`SpellScan::run_cooperative`])
//! that yields to the runtime after every failed candidate. Stopping early is
//! just not calling `step` again, and restarting is always safe because
//! classification only reads the snapshot.

use painting::CanvasSnapshot;
use tracing::{debug, info, warn};

use crate::classifier::{ClassificationResult, PatternClassifier};
use crate::error::ClassifyError;
use crate::spellbook::SpellData;

/// First spell the drawing matched
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanMatch<'a> {
    /// Position in the scanned list
    pub index: usize,
    pub spell: &'a SpellData,
    pub result: ClassificationResult,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanStep<'a> {
    /// The candidate failed; `next` is tried on the following step
    Continue { next: usize },
    Matched(ScanMatch<'a>),
    /// Every candidate failed, or the scan already matched
    Exhausted,
}

pub struct SpellScan<'a> {
    classifier: &'a PatternClassifier,
    snapshot: &'a CanvasSnapshot,
    spells: &'a [SpellData],
    next: usize,
}

impl<'a> SpellScan<'a> {
    pub fn new(
        classifier: &'a PatternClassifier,
        snapshot: &'a CanvasSnapshot,
        spells: &'a [SpellData],
    ) -> Self {
        Self {
            classifier,
            snapshot,
            spells,
            next: 0,
        }
    }

    /// Index of the candidate the next step will classify
    #[inline]
    pub fn position(&self) -> usize {
        self.next
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.next >= self.spells.len()
    }

    /// Classify one candidate
    ///
    /// A candidate whose map cannot be classified returns its error; the
    /// scan has already moved past it, so stepping again continues with the
    /// next one.
    pub fn step(&mut self) -> Result<ScanStep<'a>, ClassifyError> {
        let Some(spell) = self.spells.get(self.next) else {
            return Ok(ScanStep::Exhausted);
        };
        let index = self.next;
        self.next += 1;

        let result = self.classifier.classify(self.snapshot, &spell.map)?;
        debug!("Checked against spell {}: {:?}", spell.name, result);

        if result.is_match() {
            // Nothing after a match is ever tried
            self.next = self.spells.len();
            info!("Drawing matched spell '{}' ({:?})", spell.name, result);
            return Ok(ScanStep::Matched(ScanMatch {
                index,
                spell,
                result,
            }));
        }
        Ok(ScanStep::Continue { next: self.next })
    }

    /// Step until a match or the end of the list
    ///
    /// Candidates whose map cannot be classified are logged and skipped.
    pub fn run(mut self) -> Option<ScanMatch<'a>> {
        loop {
            match self.step() {
                Ok(ScanStep::Continue { .. }) => {}
                Ok(ScanStep::Matched(found)) => return Some(found),
                Ok(ScanStep::Exhausted) => return None,
                Err(e) => self.skip_failed(e),
            }
        }
    }

    /// Like [`run`](Self::run), yielding to the tokio scheduler after every
    /// failed or skipped candidate
    pub async fn run_cooperative(mut self) -> Option<ScanMatch<'a>> {
        loop {
            match self.step() {
                Ok(ScanStep::Continue { .. }) => {}
                Ok(ScanStep::Matched(found)) => return Some(found),
                Ok(ScanStep::Exhausted) => return None,
                Err(e) => self.skip_failed(e),
            }
            tokio::task::yield_now().await;
        }
    }

    fn skip_failed(&self, error: ClassifyError) {
        let index = self.next - 1;
        let name = self.spells.get(index).map_or("?", |s| s.name.as_str());
        warn!("Skipping spell '{}' at index {}: {}", name, index, error);
    }
}
