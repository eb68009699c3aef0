//! Horizontal back-and-forth movement shared by the solar panel and the
//! garbage truck.

/// A body of fixed width sweeping between `0` and `bound`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sweep {
    pub x: f64,
    pub width: f64,
    pub speed: f64,
    pub direction: f64,
    pub bound: f64,
}

impl Sweep {
    /// Starts moving right from `x`.
    pub fn new(x: f64, width: f64, speed: f64, bound: f64) -> Self {
        Self {
            x,
            width,
            speed,
            direction: 1.0,
            bound,
        }
    }

    /// Advances one frame, turning around at either edge.
    pub fn step(&mut self) {
        self.x += self.speed * self.direction;
        if self.x + self.width >= self.bound {
            self.x = self.bound - self.width;
            self.direction = -1.0;
        }
        if self.x <= 0.0 {
            self.x = 0.0;
            self.direction = 1.0;
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn center(&self) -> f64 {
        self.x + self.width / 2.0
    }
}
