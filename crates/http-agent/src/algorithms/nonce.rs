//! # Nonce Generation
//!
//! Two random 32-bit words packed big-endian into 8 bytes. The packing is
//! either one 64-bit write or two 32-bit writes; the strategy is picked once
//! when the generator is built and both produce identical bytes.

use rand::RngCore;

use crate::domain::{Nonce, NONCE_LEN};

/// How the two random words are written into the nonce buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoncePacking {
    /// Single 64-bit big-endian write.
    WideWrite,
    /// Two sequential 32-bit big-endian writes.
    NarrowWrites,
}

impl NoncePacking {
    /// Strategy for the current target: wide writes need native 64-bit words.
    pub fn detect() -> Self {
        if cfg!(target_pointer_width = "64") {
            NoncePacking::WideWrite
        } else {
            NoncePacking::NarrowWrites
        }
    }

    /// Pack the high and low words.
    pub fn pack(&self, hi: u32, lo: u32) -> Nonce {
        let mut buffer = [0u8; NONCE_LEN];
        match self {
            NoncePacking::WideWrite => {
                let wide = (u64::from(hi) << 32) | u64::from(lo);
                buffer.copy_from_slice(&wide.to_be_bytes());
            }
            NoncePacking::NarrowWrites => {
                buffer[..4].copy_from_slice(&hi.to_be_bytes());
                buffer[4..].copy_from_slice(&lo.to_be_bytes());
            }
        }
        Nonce::new(buffer)
    }
}

/// Produces a fresh nonce per state-changing request.
#[derive(Clone, Copy, Debug)]
pub struct NonceGenerator {
    packing: NoncePacking,
}

impl NonceGenerator {
    /// Generator using the detected packing strategy.
    pub fn new() -> Self {
        Self::with_packing(NoncePacking::detect())
    }

    /// Generator with an explicit strategy.
    pub fn with_packing(packing: NoncePacking) -> Self {
        Self { packing }
    }

    /// Strategy in use.
    pub fn packing(&self) -> NoncePacking {
        self.packing
    }

    /// Draw two words from the thread RNG and pack them.
    pub fn generate(&self) -> Nonce {
        let mut rng = rand::thread_rng();
        let hi = rng.next_u32();
        let lo = rng.next_u32();
        self.packing.pack(hi, lo)
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self::new()
    }
}
