//! Mesh expiry. Terrain-conforming meshes age out on a jittered deadline so
//! that a fleet of shapes regenerated against streaming terrain does not
//! refresh in the same frame; everything else lives until evicted.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Expiration deadline of a cached mesh, in frame-time units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    Never,
    At(u64),
}

impl Expiry {
    #[must_use]
    pub fn is_expired(&self, now: u64) -> bool {
        match self {
            Expiry::Never => false,
            Expiry::At(deadline) => now > *deadline,
        }
    }
}

/// Draws jittered expiry deadlines from a seedable RNG. One instance lives
/// in the geometry context; nothing here is global.
pub struct ExpiryJitter {
    rng: ChaCha8Rng,
    min: u64,
    max: u64,
}

/// Default lifetime window, frame-time units (milliseconds in practice).
pub const DEFAULT_MIN_LIFETIME: u64 = 2000;
pub const DEFAULT_MAX_LIFETIME: u64 = 6000;

impl ExpiryJitter {
    /// Deterministic jitter source. Same seed, same deadline sequence.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            min: DEFAULT_MIN_LIFETIME,
            max: DEFAULT_MAX_LIFETIME,
        }
    }

    /// OS-seeded jitter source.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_os_rng(),
            min: DEFAULT_MIN_LIFETIME,
            max: DEFAULT_MAX_LIFETIME,
        }
    }

    /// Set the lifetime window. `min` and `max` are swapped if reversed.
    pub fn set_window(&mut self, min: u64, max: u64) {
        self.min = min.min(max);
        self.max = min.max(max);
    }

    #[must_use]
    pub fn window(&self) -> (u64, u64) {
        (self.min, self.max)
    }

    /// Deadline for a mesh generated at `now`: uniform in
    /// `[now + min, now + max]`.
    pub fn deadline(&mut self, now: u64) -> Expiry {
        Expiry::At(now + self.rng.random_range(self.min..=self.max))
    }
}
