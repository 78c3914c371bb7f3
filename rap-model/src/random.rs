//! Injectable randomness.
//!
//! Every mock identifier and the simulated intrusion sensor draw from a
//! [`RandomSource`] rather than a global generator.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of uniformly distributed integers.
pub trait RandomSource: Send + Sync {
    /// Uniform integer in `0..bound`. `bound` is never zero.
    fn below(&self, bound: u32) -> u32;
}

/// Thread-local generator from the `rand` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, bound: u32) -> u32 {
        rand::thread_rng().gen_range(0..bound.max(1))
    }
}

/// Deterministic source that cycles through a fixed script.
///
/// Each value is reduced modulo the requested bound, so a script of
/// `[0, 3, 0, 2]` fed to a `below(5)` caller yields exactly those values.
#[derive(Debug)]
pub struct ScriptedRandom {
    script: Vec<u32>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    /// Create a source that replays `script` forever.
    pub fn new(script: impl Into<Vec<u32>>) -> Self {
        let mut script = script.into();
        if script.is_empty() {
            script.push(0);
        }
        Self {
            script,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&self, bound: u32) -> u32 {
        let index = self.cursor.fetch_add(1, Ordering::SeqCst) % self.script.len();
        self.script[index] % bound.max(1)
    }
}

/// Draw `len` characters from `alphabet`.
pub fn random_string(rng: &dyn RandomSource, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.below(alphabet.len() as u32) as usize] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_cycles() {
        let rng = ScriptedRandom::new(vec![1, 7, 2]);
        let drawn: Vec<u32> = (0..5).map(|_| rng.below(5)).collect();
        assert_eq!(drawn, vec![1, 2, 2, 1, 2]);
        assert_eq!(rng.draws(), 5);
    }

    #[test]
    fn test_thread_random_in_range() {
        let rng = ThreadRandom;
        for _ in 0..200 {
            assert!(rng.below(5) < 5);
        }
    }

    #[test]
    fn test_random_string_alphabet() {
        let rng = ScriptedRandom::new(vec![0, 1, 2]);
        assert_eq!(random_string(&rng, b"abc", 4), "abca");
    }
}
