use crate::config::PALETTE_NAMES;

const OFFSET_STEP: f32 = 0.3;
const OFFSET_WRAP: f32 = 10_000.0;
const PALETTE_TIMER_STEP: f32 = 0.001;
const TIME_STEP: f32 = 0.016;

/// Color animation parameters forwarded to the evaluator each frame.
///
/// With auto-cycle on, each palette holds for 1000 ticks while `palette_mix`
/// ramps from 0 to 1 toward the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCycle {
    pub color_offset: f32,
    pub palette_index: u32,
    pub palette_timer: f32,
    pub palette_mix: f32,
    pub auto_cycle: bool,
    /// Seconds-ish clock for animated shading.
    pub time: f32,
}

impl ColorCycle {
    pub fn new(palette_index: u32, auto_cycle: bool) -> Self {
        Self {
            color_offset: 0.0,
            palette_index: palette_index % PALETTE_NAMES.len() as u32,
            palette_timer: 0.0,
            palette_mix: 0.0,
            auto_cycle,
            time: 0.0,
        }
    }

    pub fn set_palette(&mut self, palette_index: u32) {
        self.palette_index = palette_index % PALETTE_NAMES.len() as u32;
    }

    pub fn tick(&mut self) {
        self.color_offset += OFFSET_STEP;
        if self.color_offset > OFFSET_WRAP {
            self.color_offset = 0.0;
        }

        if self.auto_cycle {
            self.palette_timer += PALETTE_TIMER_STEP;
            if self.palette_timer >= 1.0 {
                self.palette_timer = 0.0;
                self.palette_index = (self.palette_index + 1) % PALETTE_NAMES.len() as u32;
            }
            self.palette_mix = self.palette_timer;
        } else {
            self.palette_mix = 0.0;
        }

        self.time += TIME_STEP;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_cycle_advances_palette() {
        let mut cycle = ColorCycle::new(8, true);
        for _ in 0..1100 {
            cycle.tick();
        }
        // f32 accumulation reaches 1.0 within a few ticks of 1000.
        assert_eq!(cycle.palette_index, 0);
        assert!(cycle.palette_mix < 0.11);
        assert_eq!(cycle.palette_mix, cycle.palette_timer);
    }

    #[test]
    fn manual_palette_holds_with_zero_mix() {
        let mut cycle = ColorCycle::new(3, false);
        for _ in 0..5000 {
            cycle.tick();
        }
        assert_eq!(cycle.palette_index, 3);
        assert_eq!(cycle.palette_mix, 0.0);
    }

    #[test]
    fn color_offset_wraps() {
        let mut cycle = ColorCycle::new(0, false);
        cycle.color_offset = 9_999.9;
        cycle.tick();
        assert_eq!(cycle.color_offset, 0.0);
        cycle.tick();
        assert!((cycle.color_offset - 0.3).abs() < 1e-6);
    }

    #[test]
    fn time_advances_each_tick() {
        let mut cycle = ColorCycle::new(0, true);
        cycle.tick();
        cycle.tick();
        assert!((cycle.time - 0.032).abs() < 1e-6);
    }
}
