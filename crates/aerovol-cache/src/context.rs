//! The cache-and-clock context threaded through the render pass. All shared
//! mutable state of the geometry subsystem lives here, constructed
//! explicitly by the application; there are no globals.

use crate::expiry::ExpiryJitter;
use crate::mesh_cache::MeshCache;

/// Session-lived geometry state: the mesh cache and the expiry jitter
/// source, plus the current frame timestamp.
pub struct GeometryContext {
    pub cache: MeshCache,
    pub jitter: ExpiryJitter,
    frame_time: u64,
}

impl GeometryContext {
    #[must_use]
    pub fn new(cache: MeshCache, jitter: ExpiryJitter) -> Self {
        Self {
            cache,
            jitter,
            frame_time: 0,
        }
    }

    /// Default-capacity cache with OS-seeded jitter.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(MeshCache::new(), ExpiryJitter::from_entropy())
    }

    /// Advance the frame clock. Timestamps are monotonic frame-time units;
    /// a timestamp earlier than the current one is ignored.
    pub fn begin_frame(&mut self, now: u64) {
        if now > self.frame_time {
            self.frame_time = now;
        }
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.frame_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock_is_monotonic() {
        let mut ctx = GeometryContext::new(MeshCache::new(), ExpiryJitter::from_seed(1));
        ctx.begin_frame(100);
        assert_eq!(ctx.now(), 100);
        ctx.begin_frame(50);
        assert_eq!(ctx.now(), 100, "clock never runs backwards");
        ctx.begin_frame(200);
        assert_eq!(ctx.now(), 200);
    }
}
