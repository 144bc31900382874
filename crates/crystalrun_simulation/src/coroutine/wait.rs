//! WaitSeconds: накопление tick-времени до duration.

/// Накопленное время сравнивается с небольшим допуском: 300 тиков по 1/60
/// в f32 дают 4.99999..., а это должно считаться пятью секундами.
const TIME_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitSeconds {
    pub elapsed: f32,
    pub duration: f32,
}

impl WaitSeconds {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Добавить dt; `true` когда ожидание закончено
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.elapsed + TIME_EPSILON >= self.duration
    }

    /// 0..1
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 || self.is_done() {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}
