//! Compile verdicts remembered from past runs.
//!
//! `code_compiles` rules cannot be decided locally. After each run that
//! included compilation tests the runner records whether that exact code
//! compiled, keyed by its SHA-256, and answers later rule evaluations from
//! here.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use codequest_validation::CompileOracle;

const DEFAULT_CAPACITY: usize = 128;

/// Bounded map from code hash to compile outcome.
#[derive(Debug)]
pub struct CompileVerdicts {
    inner: RwLock<VerdictMap>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct VerdictMap {
    verdicts: HashMap<String, bool>,
    order: VecDeque<String>,
}

impl CompileVerdicts {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create with room for `capacity` entries; the oldest is evicted first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(VerdictMap::default()),
            capacity: capacity.max(1),
        }
    }

    /// Record whether `code` compiled.
    pub fn record(&self, code: &str, compiles: bool) {
        let key = code_hash(code);
        let mut map = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if map.verdicts.insert(key.clone(), compiles).is_none() {
            map.order.push_back(key);
            while map.order.len() > self.capacity {
                if let Some(oldest) = map.order.pop_front() {
                    map.verdicts.remove(&oldest);
                }
            }
        }
    }

    /// Look up the verdict for `code`.
    pub fn get(&self, code: &str) -> Option<bool> {
        let map = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        map.verdicts.get(&code_hash(code)).copied()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .verdicts
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CompileVerdicts {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileOracle for CompileVerdicts {
    fn verdict(&self, code: &str) -> Option<bool> {
        self.get(code)
    }
}

fn code_hash(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_lookup() {
        let verdicts = CompileVerdicts::new();
        assert_eq!(verdicts.verdict("fn main() {}"), None);

        verdicts.record("fn main() {}", true);
        verdicts.record("fn main( {}", false);

        assert_eq!(verdicts.verdict("fn main() {}"), Some(true));
        assert_eq!(verdicts.verdict("fn main( {}"), Some(false));
        assert_eq!(verdicts.verdict("fn main() { }"), None);
    }

    #[test]
    fn test_latest_verdict_wins() {
        let verdicts = CompileVerdicts::new();
        verdicts.record("code", false);
        verdicts.record("code", true);

        assert_eq!(verdicts.get("code"), Some(true));
        assert_eq!(verdicts.len(), 1);
    }

    #[test]
    fn test_eviction() {
        let verdicts = CompileVerdicts::with_capacity(2);
        verdicts.record("a", true);
        verdicts.record("b", true);
        verdicts.record("c", true);

        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts.get("a"), None);
        assert_eq!(verdicts.get("c"), Some(true));
    }
}
