//! Kinematic mover
//!
//! Euler-integrated velocity/acceleration with friction, optional elastic
//! bouncing against the view bounds, and a single-destination "move-to"
//! mode that always lands exactly on its destination.
//!
//! Per-frame order in [`Mover::update`]:
//!
//! ```text
//! move-to arrival / re-aim
//!     ↓
//! elastic bounce (reflect, cross-damp)
//!     ↓
//! friction decay (never flips sign)
//!     ↓
//! velocity += acceleration·dt, position += velocity·dt
//! ```

use tessera_core::{Point, Rect, Transform, Vec2};

/// Default floor for move-to speed, in px/s
pub const DEFAULT_MIN_ARRIVAL_SPEED: f32 = 10.0;

/// Outcome of one [`Mover::update`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveStatus {
    /// Nothing moved
    Idle,
    /// Position changed this frame
    Moving,
    /// A move-to reached its destination this frame
    Arrived,
}

/// Per-widget kinematic state
#[derive(Clone, Debug)]
pub struct Mover {
    /// Velocity in px/s
    pub velocity: Vec2,
    /// Acceleration in px/s²
    pub acceleration: Vec2,
    /// Per-axis deceleration in px/s²
    pub friction: f32,
    elasticity: Option<f32>,
    move_angle: f32,
    destination: Point,
    min_arrival_speed: f32,
}

impl Default for Mover {
    fn default() -> Self {
        Self::new()
    }
}

impl Mover {
    pub fn new() -> Self {
        Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            friction: 0.0,
            elasticity: None,
            move_angle: 0.0,
            destination: Point::UNSET,
            min_arrival_speed: DEFAULT_MIN_ARRIVAL_SPEED,
        }
    }

    /// Lowest speed a frictional move-to decays to, so it still arrives
    pub fn with_min_arrival_speed(mut self, speed: f32) -> Self {
        self.min_arrival_speed = speed.abs();
        self
    }

    pub fn set_min_arrival_speed(&mut self, speed: f32) {
        self.min_arrival_speed = speed.abs();
    }

    /// Head from `from` towards `target` at `speed` px/s, slowed by `drag`
    ///
    /// Any standing acceleration is dropped so the path stays straight.
    pub fn move_to(&mut self, from: Point, target: Point, speed: f32, drag: f32) {
        if !target.is_set() {
            self.stop();
            return;
        }
        self.destination = target;
        self.move_angle = from.angle_to(target);
        self.velocity = Vec2::from_angle(self.move_angle, speed.abs());
        self.acceleration = Vec2::ZERO;
        self.friction = drag.abs();
    }

    /// Set the velocity directly: `speed` px/s along `angle`
    pub fn push(&mut self, angle: f32, speed: f32) {
        self.move_angle = angle;
        self.velocity = Vec2::from_angle(angle, speed);
    }

    /// Set a constant acceleration of `magnitude` px/s² along `angle`
    pub fn accelerate(&mut self, angle: f32, magnitude: f32) {
        self.acceleration = Vec2::from_angle(angle, magnitude);
    }

    /// Abandon any move-to and come to rest immediately
    pub fn stop(&mut self) {
        self.destination = Point::UNSET;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    /// Enable bouncing off the view bounds; 0 stops dead, 1 is perfectly elastic
    pub fn set_elasticity(&mut self, elasticity: Option<f32>) {
        self.elasticity = elasticity.map(|e| e.clamp(0.0, 1.0));
    }

    pub fn elasticity(&self) -> Option<f32> {
        self.elasticity
    }

    pub fn destination(&self) -> Option<Point> {
        self.destination.is_set().then_some(self.destination)
    }

    pub fn has_destination(&self) -> bool {
        self.destination.is_set()
    }

    pub fn move_angle(&self) -> f32 {
        self.move_angle
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    pub fn is_moving(&self) -> bool {
        !self.velocity.is_zero() || !self.acceleration.is_zero()
    }

    fn halt(&mut self) {
        self.destination = Point::UNSET;
        self.velocity = Vec2::ZERO;
        self.acceleration = Vec2::ZERO;
    }

    /// Advance one frame of `dt` seconds
    ///
    /// `bounds` is the area the widget bounces inside when elasticity is set.
    pub fn update(&mut self, transform: &mut Transform, dt: f32, bounds: Option<Rect>) -> MoveStatus {
        if self.destination.is_set() {
            let position = transform.position;
            let destination = self.destination;
            if position == destination {
                self.halt();
                return MoveStatus::Arrived;
            }

            let speed = self.velocity.length().max(self.min_arrival_speed);
            if position.distance_to(destination) - speed * dt <= 0.0 {
                transform.position = destination;
                self.halt();
                return MoveStatus::Arrived;
            }

            self.move_angle = position.angle_to(destination);
            self.velocity = Vec2::from_angle(self.move_angle, speed);
        }

        if let (Some(elasticity), Some(bounds)) = (self.elasticity, bounds) {
            self.bounce(transform, bounds, elasticity);
        }

        if self.friction > 0.0 {
            let decay = self.friction * dt;
            self.velocity.x = decay_toward_zero(self.velocity.x, decay);
            self.velocity.y = decay_toward_zero(self.velocity.y, decay);
        }

        self.velocity += self.acceleration * dt;
        if self.velocity.is_zero() {
            return MoveStatus::Idle;
        }
        transform.position += self.velocity * dt;
        MoveStatus::Moving
    }

    fn bounce(&mut self, transform: &mut Transform, bounds: Rect, elasticity: f32) {
        let rect = transform.rect();

        if rect.x() < bounds.x() && self.velocity.x < 0.0 {
            transform.position.x += bounds.x() - rect.x();
            self.velocity.x = -self.velocity.x * elasticity;
            self.velocity.y *= elasticity;
        } else if rect.right() > bounds.right() && self.velocity.x > 0.0 {
            transform.position.x -= rect.right() - bounds.right();
            self.velocity.x = -self.velocity.x * elasticity;
            self.velocity.y *= elasticity;
        }

        if rect.y() < bounds.y() && self.velocity.y < 0.0 {
            transform.position.y += bounds.y() - rect.y();
            self.velocity.y = -self.velocity.y * elasticity;
            self.velocity.x *= elasticity;
        } else if rect.bottom() > bounds.bottom() && self.velocity.y > 0.0 {
            transform.position.y -= rect.bottom() - bounds.bottom();
            self.velocity.y = -self.velocity.y * elasticity;
            self.velocity.x *= elasticity;
        }
    }
}

/// Reduce `value`'s magnitude by `amount`, stopping at zero
fn decay_toward_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        0.0
    }
}
