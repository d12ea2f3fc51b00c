// Tiny RNG for paint colors (no external crate).

/// Deterministic xorshift32 RNG.
/// Visual: picks the starting joint colors and every new bucket color.
#[derive(Clone, Debug)]
pub struct Rng32 {
    state: u32,
}

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self {
        Self { state: seed | 1 }
    }

    /// Seed from the wall clock, for runs where no seed is configured.
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(0xC0FFEE);
        Self::from_seed(nanos)
    }

    pub fn next_u32(&mut self) -> u32 {
        // xorshift32 (13, 17, 5)
        let s = self.state ^ (self.state << 13);
        let s = s ^ (s >> 17);
        self.state = s ^ (s << 5);
        self.state
    }

    #[inline]
    pub fn next_u8(&mut self) -> u8 {
        (self.next_u32() >> 24) as u8
    }
}
