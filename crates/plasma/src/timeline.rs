use crate::types::Direction;

/// Length of one ping-pong sweep in phase units.
pub const PINGPONG_PERIOD: f32 = 10.0;

/// Phase value and direction sign for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase {
    pub time: f32,
    pub direction_sign: f32,
}

/// Maps elapsed wall-clock seconds onto the kernel phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeEvolution {
    direction: Direction,
    speed: f32,
}

impl TimeEvolution {
    pub fn new(direction: Direction, speed: f32) -> Self {
        Self { direction, speed }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// PingPong sweeps on the raw clock and scales the swing by speed, so
    /// speed never changes how often the sweep turns around.
    pub fn sample(&self, elapsed: f32) -> Phase {
        let time = match self.direction {
            Direction::Forward | Direction::Reverse => elapsed * self.speed,
            Direction::PingPong => pingpong(elapsed) * self.speed,
        };
        Phase {
            time: if time.is_finite() { time } else { 0.0 },
            direction_sign: self.direction.sign(),
        }
    }
}

fn smoothstep(t: f32) -> f32 {
    let clamped = t.clamp(0.0, 1.0);
    clamped * clamped * (3.0 - 2.0 * clamped)
}

/// Even segments sweep `0 -> PERIOD`, odd segments sweep back.
fn pingpong(clock: f32) -> f32 {
    let segment = clock.div_euclid(PINGPONG_PERIOD);
    let offset = clock.rem_euclid(PINGPONG_PERIOD);
    let eased = smoothstep(offset / PINGPONG_PERIOD);
    if segment.rem_euclid(2.0) < 1.0 {
        eased * PINGPONG_PERIOD
    } else {
        (1.0 - eased) * PINGPONG_PERIOD
    }
}
