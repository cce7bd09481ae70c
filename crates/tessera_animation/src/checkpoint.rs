//! Checkpoint paths and passive animations
//!
//! An [`AnimationEntry`] walks its target through an ordered list of
//! checkpoints. Each checkpoint is a destination, a speed and an
//! interpolation kind. Position is always recomputed from the checkpoint's
//! start point and the distance travelled so far, so rounding never
//! accumulates across frames, and every checkpoint ends with an exact snap
//! onto its destination.
//!
//! Independently of the path, an entry may carry one passive animation
//! (fade in, fade out, continuous rotation) that runs every frame.

use tessera_core::{HasAlpha, Point};

use crate::error::{AnimationError, Result};

/// Lower bound of the ease factor so eased checkpoints never stall
const MIN_EASE_FACTOR: f32 = 0.1;

/// Something a scheduler entry can move, rotate and fade
pub trait Animatable: HasAlpha {
    fn position(&self) -> Point;
    fn set_position(&mut self, position: Point);
    /// Rotation in degrees
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, degrees: f32);
}

/// How a checkpoint interpolates from its start to its destination
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckpointKind {
    /// Constant speed
    #[default]
    Slide,
    /// Starts slow, speeds up as the destination nears
    Accelerate,
    /// Starts fast, slows down as the destination nears
    Decelerate,
    /// Jumps straight to the destination on the next frame
    Instant,
}

impl CheckpointKind {
    /// Speed multiplier given the fraction of distance still to go
    ///
    /// Eased kinds average to roughly 1 over a checkpoint, so a path takes
    /// about as long whichever kind it uses.
    pub fn factor(self, remaining_ratio: f32) -> f32 {
        let remaining_ratio = remaining_ratio.clamp(0.0, 1.0);
        match self {
            CheckpointKind::Slide | CheckpointKind::Instant => 1.0,
            CheckpointKind::Decelerate => (2.0 * remaining_ratio).max(MIN_EASE_FACTOR),
            CheckpointKind::Accelerate => (2.0 * (1.0 - remaining_ratio)).max(MIN_EASE_FACTOR),
        }
    }
}

/// One waypoint of a path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub destination: Point,
    /// Base speed in px/s
    pub speed: f32,
    pub kind: CheckpointKind,
}

impl Checkpoint {
    pub fn new(destination: Point, speed: f32, kind: CheckpointKind) -> Self {
        Self {
            destination,
            speed: speed.abs(),
            kind,
        }
    }

    pub fn slide(destination: Point, speed: f32) -> Self {
        Self::new(destination, speed, CheckpointKind::Slide)
    }

    pub fn accelerate(destination: Point, speed: f32) -> Self {
        Self::new(destination, speed, CheckpointKind::Accelerate)
    }

    pub fn decelerate(destination: Point, speed: f32) -> Self {
        Self::new(destination, speed, CheckpointKind::Decelerate)
    }

    pub fn instant(destination: Point) -> Self {
        Self::new(destination, 0.0, CheckpointKind::Instant)
    }
}

/// Continuous effect layered on top of checkpoint motion
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PassiveAnimation {
    /// Raise alpha toward 255 by `rate` per second
    FadeIn { rate: f32 },
    /// Lower alpha toward 0 by `rate` per second
    FadeOut { rate: f32 },
    /// Add `degrees_per_frame` to the rotation every frame, forever
    Rotate { degrees_per_frame: f32 },
}

impl PassiveAnimation {
    /// Apply one frame; returns whether there is more work to do
    pub fn apply(&self, target: &mut dyn Animatable, dt: f32) -> bool {
        match *self {
            PassiveAnimation::FadeIn { rate } => {
                target.fade_toward(u8::MAX, alpha_delta(rate, dt))
            }
            PassiveAnimation::FadeOut { rate } => target.fade_toward(0, alpha_delta(rate, dt)),
            PassiveAnimation::Rotate { degrees_per_frame } => {
                target.set_rotation(target.rotation() + degrees_per_frame);
                true
            }
        }
    }
}

/// `rate·dt` as an 8-bit step of at least 1, so slow fades never stall
fn alpha_delta(rate: f32, dt: f32) -> u8 {
    (rate.abs() * dt).clamp(1.0, 255.0) as u8
}

/// Checkpoint path plus passive animation for one target
#[derive(Clone, Debug)]
pub struct AnimationEntry<K> {
    target: K,
    checkpoints: Vec<Checkpoint>,
    current: usize,
    start: Point,
    travelled: f32,
    elapsed: f32,
    move_angle: f32,
    passive: Option<PassiveAnimation>,
}

impl<K: Copy> AnimationEntry<K> {
    /// Empty entry for `target`, which currently sits at `origin`
    pub fn new(target: K, origin: Point) -> Self {
        Self {
            target,
            checkpoints: Vec::new(),
            current: 0,
            start: origin,
            travelled: 0.0,
            elapsed: 0.0,
            move_angle: 0.0,
            passive: None,
        }
    }

    pub fn target(&self) -> K {
        self.target
    }

    /// Append checkpoints to the path
    ///
    /// Absolute checkpoints are appended verbatim. Cumulative checkpoints
    /// are offsets, each chained onto the destination before it; the first
    /// one chains onto the last pending checkpoint, or onto `origin` (the
    /// target's current position) when nothing is pending.
    pub fn add_checkpoints(
        &mut self,
        origin: Point,
        checkpoints: impl IntoIterator<Item = Checkpoint>,
        cumulative: bool,
    ) {
        let was_idle = self.is_exhausted();
        if was_idle {
            // Restart from where the target actually is
            self.checkpoints.clear();
            self.current = 0;
            self.start = origin;
            self.travelled = 0.0;
            self.elapsed = 0.0;
        }

        let mut anchor = self
            .checkpoints
            .last()
            .map(|cp| cp.destination)
            .unwrap_or(origin);

        for mut checkpoint in checkpoints {
            if cumulative {
                checkpoint.destination = anchor + (checkpoint.destination - Point::ZERO);
            }
            anchor = checkpoint.destination;
            self.checkpoints.push(checkpoint);
        }

        if was_idle {
            self.aim();
        }
    }

    /// Replace every pending checkpoint and restart from `from`
    ///
    /// `from` should be the target's current position, so switching paths
    /// mid-flight never makes the target jump.
    pub fn change_path(&mut self, from: Point, checkpoints: impl IntoIterator<Item = Checkpoint>) {
        self.checkpoints.clear();
        self.current = 0;
        self.start = from;
        self.travelled = 0.0;
        self.elapsed = 0.0;
        self.checkpoints.extend(checkpoints);
        self.aim();
    }

    /// Drop the remaining path, keeping any passive animation
    pub fn clear_path(&mut self) {
        self.current = self.checkpoints.len();
        self.travelled = 0.0;
        self.elapsed = 0.0;
    }

    pub fn set_passive(&mut self, passive: Option<PassiveAnimation>) {
        self.passive = passive;
    }

    pub fn passive(&self) -> Option<PassiveAnimation> {
        self.passive
    }

    /// Whether the passive animation has more work to do
    pub fn check_passive(&self) -> bool {
        self.passive.is_some()
    }

    /// No checkpoints left and no passive work left
    pub fn finished(&self) -> bool {
        self.is_exhausted() && !self.check_passive()
    }

    pub fn is_exhausted(&self) -> bool {
        self.current >= self.checkpoints.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn checkpoint(&self, index: usize) -> Result<&Checkpoint> {
        self.checkpoints
            .get(index)
            .ok_or(AnimationError::CheckpointOutOfRange {
                index,
                len: self.checkpoints.len(),
            })
    }

    /// Where the current checkpoint started
    pub fn checkpoint_start(&self) -> Point {
        self.start
    }

    /// Seconds spent on the current checkpoint
    pub fn elapsed_in_checkpoint(&self) -> f32 {
        self.elapsed
    }

    pub fn move_angle(&self) -> f32 {
        self.move_angle
    }

    fn aim(&mut self) {
        if let Some(cp) = self.checkpoints.get(self.current) {
            self.move_angle = self.start.angle_to(cp.destination);
        }
    }

    /// Advance path and passive animation by `dt` seconds
    pub fn frame(&mut self, dt: f32, target: &mut dyn Animatable) {
        if let Some(cp) = self.checkpoints.get(self.current).copied() {
            self.elapsed += dt;
            let total = self.start.distance_to(cp.destination);

            if cp.kind == CheckpointKind::Instant || self.travelled >= total {
                self.arrive(cp, target);
            } else {
                let remaining_ratio = (total - self.travelled) / total;
                let step = dt * cp.speed * cp.kind.factor(remaining_ratio);
                self.travelled = (self.travelled + step).min(total);

                if self.travelled >= total {
                    self.arrive(cp, target);
                } else {
                    target.set_position(self.start.project(self.move_angle, self.travelled));
                }
            }
        }

        if let Some(passive) = self.passive {
            if !passive.apply(target, dt) {
                self.passive = None;
            }
        }
    }

    fn arrive(&mut self, cp: Checkpoint, target: &mut dyn Animatable) {
        target.set_position(cp.destination);
        self.start = cp.destination;
        self.current += 1;
        self.travelled = 0.0;
        self.elapsed = 0.0;
        self.aim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal animatable target
    #[derive(Debug, Default)]
    struct Dot {
        position: Point,
        rotation: f32,
        alpha: u8,
        /// Ignores alpha writes, like a target without fadeable layers
        alpha_locked: bool,
    }

    impl HasAlpha for Dot {
        fn alpha(&self) -> u8 {
            self.alpha
        }

        fn set_alpha(&mut self, alpha: u8) {
            if !self.alpha_locked {
                self.alpha = alpha;
            }
        }
    }

    impl Animatable for Dot {
        fn position(&self) -> Point {
            self.position
        }

        fn set_position(&mut self, position: Point) {
            self.position = position;
        }

        fn rotation(&self) -> f32 {
            self.rotation
        }

        fn set_rotation(&mut self, degrees: f32) {
            self.rotation = degrees;
        }
    }

    const DT: f32 = 1.0 / 60.0;

    fn run_until_exhausted(entry: &mut AnimationEntry<u32>, dot: &mut Dot) -> Vec<Point> {
        let mut visited = Vec::new();
        for _ in 0..10_000 {
            if entry.is_exhausted() {
                break;
            }
            entry.frame(DT, dot);
            visited.push(dot.position);
        }
        visited
    }

    #[test]
    fn test_path_visits_checkpoints_in_order() {
        let a = Point::new(50.0, 0.0);
        let b = Point::new(50.0, 80.0);
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.add_checkpoints(
            dot.position,
            [Checkpoint::slide(a, 300.0), Checkpoint::slide(b, 300.0)],
            false,
        );

        let visited = run_until_exhausted(&mut entry, &mut dot);
        let hit_a = visited.iter().position(|p| *p == a).expect("A never reached");
        let hit_b = visited.iter().position(|p| *p == b).expect("B never reached");
        assert!(hit_a < hit_b);
        assert_eq!(dot.position, b);
        assert!(entry.finished());
    }

    #[test]
    fn test_change_path_continues_from_current_position() {
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.add_checkpoints(
            dot.position,
            [Checkpoint::slide(Point::new(100.0, 0.0), 60.0)],
            false,
        );

        for _ in 0..30 {
            entry.frame(DT, &mut dot);
        }
        let midway = dot.position;
        assert!((midway.x - 30.0).abs() < 0.01);

        let c = Point::new(30.0, 60.0);
        entry.change_path(dot.position, [Checkpoint::slide(c, 60.0)]);
        entry.frame(DT, &mut dot);

        // One frame of travel from where it was, straight toward C
        assert!(dot.position.distance_to(midway) <= 60.0 * DT + 1e-3);
        assert!(dot.position.y > midway.y);
        assert!((dot.position.x - 30.0).abs() < 1e-3);

        run_until_exhausted(&mut entry, &mut dot);
        assert_eq!(dot.position, c);
    }

    #[test]
    fn test_cumulative_checkpoints_chain() {
        let origin = Point::new(10.0, 10.0);
        let mut entry = AnimationEntry::new(1u32, origin);
        entry.add_checkpoints(
            origin,
            [
                Checkpoint::slide(Point::new(5.0, 0.0), 10.0),
                Checkpoint::slide(Point::new(0.0, 5.0), 10.0),
            ],
            true,
        );
        entry.add_checkpoints(origin, [Checkpoint::slide(Point::new(-15.0, 0.0), 10.0)], true);

        assert_eq!(entry.checkpoint(0).unwrap().destination, Point::new(15.0, 10.0));
        assert_eq!(entry.checkpoint(1).unwrap().destination, Point::new(15.0, 15.0));
        assert_eq!(entry.checkpoint(2).unwrap().destination, Point::new(0.0, 15.0));
    }

    #[test]
    fn test_absolute_checkpoints_appended_verbatim() {
        let mut entry = AnimationEntry::new(1u32, Point::new(3.0, 3.0));
        entry.add_checkpoints(Point::new(3.0, 3.0), [Checkpoint::slide(Point::new(5.0, 0.0), 1.0)], false);
        assert_eq!(entry.checkpoint(0).unwrap().destination, Point::new(5.0, 0.0));
    }

    #[test]
    fn test_checkpoint_index_out_of_range() {
        let entry = AnimationEntry::new(1u32, Point::ZERO);
        assert_eq!(
            entry.checkpoint(2),
            Err(AnimationError::CheckpointOutOfRange { index: 2, len: 0 })
        );
    }

    #[test]
    fn test_decelerate_slows_down_and_arrives() {
        let dest = Point::new(100.0, 0.0);
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.add_checkpoints(dot.position, [Checkpoint::decelerate(dest, 120.0)], false);

        entry.frame(DT, &mut dot);
        let first_step = dot.position.x;
        let visited = run_until_exhausted(&mut entry, &mut dot);
        let n = visited.len();
        let late_step = visited[n - 2].x - visited[n - 3].x;

        assert!(late_step < first_step);
        assert_eq!(dot.position, dest);
    }

    #[test]
    fn test_accelerate_speeds_up() {
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.add_checkpoints(
            dot.position,
            [Checkpoint::accelerate(Point::new(100.0, 0.0), 120.0)],
            false,
        );

        entry.frame(DT, &mut dot);
        let first_step = dot.position.x;
        for _ in 0..40 {
            entry.frame(DT, &mut dot);
        }
        let before = dot.position.x;
        entry.frame(DT, &mut dot);
        assert!(dot.position.x - before > first_step);
    }

    #[test]
    fn test_instant_checkpoint_snaps() {
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.add_checkpoints(dot.position, [Checkpoint::instant(Point::new(400.0, 300.0))], false);
        entry.frame(DT, &mut dot);
        assert_eq!(dot.position, Point::new(400.0, 300.0));
        assert!(entry.finished());
    }

    #[test]
    fn test_passive_fade_keeps_entry_alive() {
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.set_passive(Some(PassiveAnimation::FadeIn { rate: 600.0 }));
        assert!(!entry.finished());

        let mut frames = 0;
        while !entry.finished() {
            entry.frame(DT, &mut dot);
            frames += 1;
        }
        // 10 alpha per frame
        assert_eq!(frames, 26);
        assert_eq!(dot.alpha, 255);
    }

    #[test]
    fn test_passive_fade_on_unfadeable_target_finishes() {
        let mut dot = Dot {
            alpha_locked: true,
            ..Default::default()
        };
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.set_passive(Some(PassiveAnimation::FadeIn { rate: 600.0 }));

        entry.frame(DT, &mut dot);
        assert!(entry.finished());
        assert_eq!(dot.alpha, 0);
    }

    #[test]
    fn test_slow_fade_out_still_progresses() {
        let mut dot = Dot {
            alpha: 3,
            ..Default::default()
        };
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.set_passive(Some(PassiveAnimation::FadeOut { rate: 0.5 }));
        entry.frame(DT, &mut dot);
        assert_eq!(dot.alpha, 2);
    }

    #[test]
    fn test_rotation_runs_alongside_path() {
        let mut dot = Dot::default();
        let mut entry = AnimationEntry::new(1u32, dot.position);
        entry.add_checkpoints(dot.position, [Checkpoint::slide(Point::new(10.0, 0.0), 60.0)], false);
        entry.set_passive(Some(PassiveAnimation::Rotate {
            degrees_per_frame: 3.0,
        }));

        run_until_exhausted(&mut entry, &mut dot);
        assert!(entry.is_exhausted());
        // Continuous rotation never finishes on its own
        assert!(!entry.finished());
        assert!(dot.rotation > 0.0);
    }
}
