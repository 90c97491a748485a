//! Host-clocked value animations with completion payloads.
//!
//! The host drives time by calling `advance` with the elapsed milliseconds,
//! which plays the role of the animation thread. A finished animation hands
//! back its completion payload; the owner queues it and dispatches the queue
//! in FIFO order.
//!
//! Superseding a running animation (a new target or a direct write) still
//! hands back the old payload, marked `interrupted`. Handlers drop
//! interrupted payloads, and compare the [`Token`] carried in the payload
//! against the current [`Generation`] to drop stale ones.

use serde::{Deserialize, Serialize};

/// Spring parameters (physical model, SI-like units per second).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpringConfig {
    pub damping: f64,
    pub mass: f64,
    pub stiffness: f64,
    /// Distance to the target under which the spring may rest.
    pub rest_displacement_threshold: f64,
    /// Speed under which the spring may rest.
    pub rest_speed_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            damping: 10.0,
            mass: 1.0,
            stiffness: 100.0,
            rest_displacement_threshold: 0.01,
            rest_speed_threshold: 2.0,
        }
    }
}

/// Tween parameters; the curve is quadratic ease-in-out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    pub duration_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { duration_ms: 300.0 }
    }
}

/// Animation settings used by the reconcilers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationConfig {
    pub spring: SpringConfig,
    pub timing: TimingConfig,
}

/// How a value travels to its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Spring(SpringConfig),
    Timing(TimingConfig),
}

/// Springs that never come to rest are snapped after this long.
const MAX_SPRING_MS: f64 = 10_000.0;
/// Integration step for springs.
const SPRING_STEP_MS: f64 = 1.0;

/// Quadratic ease-in-out on `t` in `[0, 1]`.
fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (2.0 - 2.0 * t).powi(2) / 2.0
    }
}

/// A single running animation from `from` to `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    from: f64,
    to: f64,
    easing: Easing,
    elapsed_ms: f64,
    position: f64,
    velocity: f64,
    finished: bool,
}

impl Animation {
    pub fn new(from: f64, to: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            easing,
            elapsed_ms: 0.0,
            position: from,
            velocity: 0.0,
            finished: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance by `dt_ms` and return the new position.
    pub fn step(&mut self, dt_ms: f64) -> f64 {
        if self.finished || dt_ms.is_nan() || dt_ms <= 0.0 {
            return self.position;
        }
        let before = self.elapsed_ms;
        self.elapsed_ms += dt_ms;

        match self.easing {
            Easing::Timing(timing) => {
                let t = if timing.duration_ms > 0.0 {
                    (self.elapsed_ms / timing.duration_ms).min(1.0)
                } else {
                    1.0
                };
                if t >= 1.0 {
                    self.finish();
                } else {
                    self.position = self.from + (self.to - self.from) * ease_in_out_quad(t);
                }
            }
            Easing::Spring(spring) => {
                let mut remaining = dt_ms.min((MAX_SPRING_MS - before).max(0.0));
                while remaining > 0.0 && !self.finished {
                    let h = remaining.min(SPRING_STEP_MS);
                    remaining -= h;

                    let dt = h / 1000.0;
                    let displacement = self.position - self.to;
                    let accel = (-spring.stiffness * displacement - spring.damping * self.velocity)
                        / spring.mass;
                    self.velocity += accel * dt;
                    self.position += self.velocity * dt;

                    if self.velocity.abs() < spring.rest_speed_threshold
                        && (self.position - self.to).abs() < spring.rest_displacement_threshold
                    {
                        self.finish();
                    }
                }
                if self.elapsed_ms >= MAX_SPRING_MS {
                    self.finish();
                }
            }
        }
        self.position
    }

    fn finish(&mut self) {
        self.position = self.to;
        self.velocity = 0.0;
        self.finished = true;
    }
}

/// Completion handed back by an [`AnimatedValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finished<C> {
    pub payload: C,
    /// The animation was superseded before reaching its target.
    pub interrupted: bool,
}

#[derive(Debug, Clone)]
struct Running<C> {
    animation: Animation,
    on_finish: Option<C>,
}

/// A scalar that is either at rest or travelling to a target.
#[derive(Debug, Clone)]
pub struct AnimatedValue<C> {
    value: f64,
    running: Option<Running<C>>,
}

impl<C> AnimatedValue<C> {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            running: None,
        }
    }

    /// Current (possibly mid-flight) value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.running.is_some()
    }

    /// Write directly, cancelling any running animation.
    pub fn set(&mut self, value: f64) -> Option<Finished<C>> {
        self.value = value;
        self.interrupt()
    }

    /// Start travelling to `target`; `on_finish` is handed back when it gets there.
    pub fn animate_to(&mut self, target: f64, easing: Easing, on_finish: Option<C>) -> Option<Finished<C>> {
        let superseded = self.interrupt();
        self.running = Some(Running {
            animation: Animation::new(self.value, target, easing),
            on_finish,
        });
        superseded
    }

    /// Step the running animation, returning its completion once it lands.
    pub fn advance(&mut self, dt_ms: f64) -> Option<Finished<C>> {
        let running = self.running.as_mut()?;
        self.value = running.animation.step(dt_ms);
        if !running.animation.is_finished() {
            return None;
        }
        self.running.take()?.on_finish.map(|payload| Finished {
            payload,
            interrupted: false,
        })
    }

    fn interrupt(&mut self) -> Option<Finished<C>> {
        self.running.take()?.on_finish.map(|payload| Finished {
            payload,
            interrupted: true,
        })
    }
}

/// Token identifying one settle/reconcile operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

/// Monotonic generation counter.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new operation; tokens from earlier ones become stale.
    pub fn bump(&mut self) -> Token {
        self.current += 1;
        Token(self.current)
    }

    pub fn is_current(&self, token: Token) -> bool {
        token.0 == self.current
    }
}
