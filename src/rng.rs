//! Entropy source abstraction.
//!
//! Key generation needs hardware randomness; on the secure target that is a
//! TRNG peripheral, on a development host the operating system RNG. The trait
//! keeps the vault testable with a deterministic source.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::Error;

/// Source of key-generation entropy.
pub trait EntropySource {
    /// Fill `out` with random bytes.
    fn fill(&mut self, out: &mut [u8]) -> Result<(), Error>;
}

/// Operating-system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&mut self, out: &mut [u8]) -> Result<(), Error> {
        OsRng.try_fill_bytes(out).map_err(|_| Error::Rng)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Deterministic source for tests: repeats a fixed pattern.
    pub struct FixedEntropy(pub u8);

    impl EntropySource for FixedEntropy {
        fn fill(&mut self, out: &mut [u8]) -> Result<(), Error> {
            for (i, byte) in out.iter_mut().enumerate() {
                *byte = self.0.wrapping_add(i as u8);
            }
            self.0 = self.0.wrapping_add(1);
            Ok(())
        }
    }

    /// Source that always fails, for exercising the RNG error path.
    pub struct BrokenEntropy;

    impl EntropySource for BrokenEntropy {
        fn fill(&mut self, _out: &mut [u8]) -> Result<(), Error> {
            Err(Error::Rng)
        }
    }
}
