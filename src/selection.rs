// src/selection.rs
//
// The set of statistical tests enabled for a run.
//
// Tests are numbered 1..=15. Number 0 is an historical alias meaning
// "enable every test"; it expands immediately when seen and is never a
// member of the set itself.

use serde::{Deserialize, Serialize};

/// Number of built-in statistical tests.
pub const NUM_TESTS: usize = 15;

/// Stable test names, indexed by test number. Slot 0 names the alias.
pub const TEST_NAMES: [&str; NUM_TESTS + 1] = [
    "((all_tests))",
    "Frequency",
    "BlockFrequency",
    "CumulativeSums",
    "Runs",
    "LongestRun",
    "Rank",
    "DFT",
    "NonOverlappingTemplate",
    "OverlappingTemplate",
    "Universal",
    "ApproximateEntropy",
    "RandomExcursions",
    "RandomExcursionsVariant",
    "Serial",
    "LinearComplexity",
];

/// Which tests are enabled. Repeated `-t` flags union into the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSelection {
    /// enabled[n] for n in 1..=NUM_TESTS; enabled[0] records that the
    /// all-tests alias was requested.
    enabled: [bool; NUM_TESTS + 1],
}

impl Default for TestSelection {
    fn default() -> Self {
        Self {
            enabled: [false; NUM_TESTS + 1],
        }
    }
}

impl TestSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable one test by number. Number 0 expands to all tests at once.
    ///
    /// Callers must have range-checked `number` against [0, NUM_TESTS];
    /// the option grammar does this before we are reached.
    pub fn enable(&mut self, number: usize) {
        if number == 0 {
            self.enabled[0] = true;
            self.enable_all();
        } else {
            self.enabled[number] = true;
        }
    }

    /// Enable every test 1..=NUM_TESTS. The alias slot is left as-is.
    pub fn enable_all(&mut self) {
        for slot in self.enabled.iter_mut().skip(1) {
            *slot = true;
        }
    }

    /// True if the all-tests alias (test number 0) was ever requested.
    pub fn alias_used(&self) -> bool {
        self.enabled[0]
    }

    pub fn is_enabled(&self, number: usize) -> bool {
        number >= 1 && number <= NUM_TESTS && self.enabled[number]
    }

    /// Number of enabled tests. The alias slot does not count.
    pub fn count(&self) -> usize {
        self.enabled.iter().skip(1).filter(|&&on| on).count()
    }

    /// Enabled test numbers in ascending order.
    pub fn iter_enabled(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=NUM_TESTS).filter(move |&n| self.enabled[n])
    }
}
