/// Frames-per-second counter refreshed once per accumulated second.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    accumulated: f32,
    frames: u32,
    last: u32,
}

impl FpsCounter {
    /// `initial` is reported until the first full second has elapsed.
    pub fn new(initial: u32) -> Self {
        Self { accumulated: 0.0, frames: 0, last: initial }
    }

    /// Records one frame of `dt` seconds. Returns `true` when the reading changed.
    pub fn update(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        self.frames += 1;
        if self.accumulated < 1.0 {
            return false;
        }
        self.accumulated -= 1.0;
        self.last = self.frames;
        self.frames = 0;
        true
    }

    #[inline]
    pub fn fps(&self) -> u32 {
        self.last
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_frames_of_last_second() {
        let mut fps = FpsCounter::default();
        for _ in 0..15 {
            assert!(!fps.update(0.0625));
        }
        assert_eq!(fps.fps(), 60);
        assert!(fps.update(0.0625));
        assert_eq!(fps.fps(), 16);
    }
}
