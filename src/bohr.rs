//! Bohr-style shell animation.
//!
//! Each shell becomes a [`ShellOrbit`]: a tilted, slightly eccentric ring
//! with the shell's electrons spaced evenly around it. The tilt and ring
//! shape are fixed when the orbit is built; per frame only the electron
//! angles move, and they are computed from elapsed time alone:
//!
//! ```text
//! angle_i(t) = 0.6 * animation_speed * (valence ? 1.4 : 1) * t + 2π i / n
//! ```
//!
//! The guiding path line (96 points) is sampled once per orbit and never
//! touched by [`Animate::advance`].
//!
//! # Example
//!
//! ```ignore
//! let mut rng = SmallRng::seed_from_u64(7);
//! let animator = ShellAnimator::new(&AtomPreset::Oxygen.atom(), AtomMode::Realistic, &mut rng);
//! let frame = animator.advance(elapsed, &settings);
//! for shell in &frame.shells {
//!     backend.place_electrons(shell.level, &shell.electrons);
//! }
//! ```

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::{EulerRot, Quat, Vec3};
use rand::Rng;

use crate::atom::{Atom, Shell};
use crate::palette;
use crate::scene::Animate;
use crate::settings::{AtomMode, Settings};

/// Angular speed of a core shell at `animation_speed == 1`, in rad/s.
pub const BASE_SPEED: f32 = 0.6;
pub const VALENCE_SPEED_FACTOR: f32 = 1.4;
pub const PATH_POINTS: usize = 96;
pub const ELECTRON_RADIUS: f32 = 0.08;
pub const ELECTRON_EMISSIVE_INTENSITY: f32 = 0.7;
/// Dash pattern of the path line, in world units.
pub const PATH_DASH: (f32, f32) = (0.2, 0.1);

/// Ring shape for an [`AtomMode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitShape {
    pub eccentricity: f32,
    pub wobble: f32,
}

impl OrbitShape {
    pub fn for_mode(mode: AtomMode) -> Self {
        match mode {
            AtomMode::Realistic => Self {
                eccentricity: 0.35,
                wobble: 0.18,
            },
            AtomMode::Simplified => Self {
                eccentricity: 0.05,
                wobble: 0.06,
            },
        }
    }
}

/// One shell's ring and the electrons riding it.
#[derive(Debug, Clone)]
pub struct ShellOrbit {
    pub level: u32,
    pub radius: f32,
    pub is_valence: bool,
    pub electron_count: usize,
    pub tilt: Quat,
    pub x_radius: f32,
    pub z_radius: f32,
    pub wobble: f32,
    path: Arc<[Vec3]>,
    pub path_color: Vec3,
    pub electron_color: Vec3,
    pub emissive: Vec3,
}

impl ShellOrbit {
    pub fn new<R: Rng + ?Sized>(shell: &Shell, mode: AtomMode, rng: &mut R) -> Self {
        let mut jitter = |scale: f32| (rng.gen::<f32>() - 0.5) * scale;
        let tilt = Quat::from_euler(EulerRot::XYZ, jitter(0.6), jitter(0.6), jitter(0.4));
        let shape = OrbitShape::for_mode(mode);

        let mut orbit = Self {
            level: shell.level,
            radius: shell.radius,
            is_valence: shell.is_valence,
            electron_count: shell.electron_count(),
            tilt,
            x_radius: shell.radius * (1.0 + shape.eccentricity * 0.4),
            z_radius: shell.radius * (1.0 - shape.eccentricity * 0.3),
            wobble: shape.wobble,
            path: Arc::from(Vec::new()),
            path_color: if shell.is_valence {
                palette::VALENCE_ACCENT
            } else {
                palette::CORE_PATH
            },
            electron_color: if shell.is_valence {
                palette::VALENCE_ACCENT
            } else {
                palette::CORE_ELECTRON
            },
            emissive: if shell.is_valence {
                palette::VALENCE_EMISSIVE
            } else {
                palette::CORE_ELECTRON
            },
        };
        orbit.path = (0..PATH_POINTS)
            .map(|i| orbit.position_at(i as f32 / PATH_POINTS as f32 * TAU))
            .collect();
        orbit
    }

    /// Point on the tilted ring at `angle`.
    pub fn position_at(&self, angle: f32) -> Vec3 {
        let local = Vec3::new(
            angle.cos() * self.x_radius,
            (angle * 0.9).sin() * self.wobble,
            angle.sin() * self.z_radius,
        );
        self.tilt * local
    }

    pub fn angular_speed(&self, settings: &Settings) -> f32 {
        let factor = if self.is_valence { VALENCE_SPEED_FACTOR } else { 1.0 };
        BASE_SPEED * settings.animation_speed * factor
    }

    /// Starting angle of electron `index`.
    pub fn electron_offset(&self, index: usize) -> f32 {
        if self.electron_count == 0 {
            return 0.0;
        }
        index as f32 / self.electron_count as f32 * TAU
    }

    pub fn electron_positions(&self, elapsed: f32, settings: &Settings) -> Vec<Vec3> {
        let base = elapsed * self.angular_speed(settings);
        (0..self.electron_count)
            .map(|i| self.position_at(base + self.electron_offset(i)))
            .collect()
    }

    /// The static guiding path line.
    pub fn path(&self) -> &Arc<[Vec3]> {
        &self.path
    }
}

/// Translucent torus marking the valence shell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValenceHighlight {
    pub radius: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightFrame {
    pub radius: f32,
    pub tube: f32,
    pub scale: f32,
    pub opacity: f32,
    pub color: Vec3,
    pub emissive_intensity: f32,
}

pub const HIGHLIGHT_TUBE: f32 = 0.05;
pub const HIGHLIGHT_EMISSIVE_INTENSITY: f32 = 1.1;
pub const SPRING_TENSION: f32 = 170.0;
pub const SPRING_FRICTION: f32 = 20.0;

/// Step response of a unit-mass spring released at rest from 1 toward 0.
fn spring_response(stiffness: f32, friction: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 1.0;
    }
    if stiffness <= 0.0 {
        return 1.0;
    }
    let omega = stiffness.sqrt();
    let zeta = friction / (2.0 * omega);
    if (zeta - 1.0).abs() < 1e-4 {
        (-omega * t).exp() * (1.0 + omega * t)
    } else if zeta < 1.0 {
        let damped = omega * (1.0 - zeta * zeta).sqrt();
        (-zeta * omega * t).exp() * ((damped * t).cos() + zeta * omega / damped * (damped * t).sin())
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        (r2 * (r1 * t).exp() - r1 * (r2 * t).exp()) / (r2 - r1)
    }
}

impl ValenceHighlight {
    pub fn new(radius: f32, visible: bool) -> Self {
        Self { radius, visible }
    }

    /// Resting values for the current settings.
    pub fn target(&self, settings: &Settings) -> HighlightFrame {
        let (color, base_opacity) = match settings.atom_mode {
            AtomMode::Realistic => (palette::VALENCE_ACCENT, 0.6),
            AtomMode::Simplified => (palette::VALENCE_RING_SIMPLIFIED, 0.35),
        };
        HighlightFrame {
            radius: self.radius,
            tube: HIGHLIGHT_TUBE,
            scale: if self.visible { 1.0 } else { 0.5 },
            opacity: if self.visible { base_opacity } else { 0.0 },
            color,
            emissive_intensity: HIGHLIGHT_EMISSIVE_INTENSITY,
        }
    }

    /// Spring from `from` toward [`target`](Self::target), `since_change`
    /// seconds after the change began. Tension scales with animation speed.
    pub fn settle(&self, from: &HighlightFrame, since_change: f32, settings: &Settings) -> HighlightFrame {
        let target = self.target(settings);
        let k = SPRING_TENSION * settings.animation_speed;
        let remaining = spring_response(k, SPRING_FRICTION, since_change);
        HighlightFrame {
            scale: target.scale + (from.scale - target.scale) * remaining,
            opacity: (target.opacity + (from.opacity - target.opacity) * remaining).max(0.0),
            ..target
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShellFrame {
    pub level: u32,
    pub electrons: Vec<Vec3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BohrFrame {
    pub shells: Vec<ShellFrame>,
    pub highlight: Option<HighlightFrame>,
}

/// All shell orbits of one atom plus its valence highlight.
#[derive(Debug, Clone)]
pub struct ShellAnimator {
    orbits: Vec<ShellOrbit>,
    highlight: Option<ValenceHighlight>,
    mode: AtomMode,
}

impl ShellAnimator {
    pub fn new<R: Rng + ?Sized>(atom: &Atom, mode: AtomMode, rng: &mut R) -> Self {
        let orbits = atom
            .shells
            .iter()
            .map(|shell| ShellOrbit::new(shell, mode, rng))
            .collect();
        let highlight = atom
            .valence_shell()
            .map(|shell| ValenceHighlight::new(shell.radius, true));
        log::debug!(
            target: "atom",
            "built {} shell orbits for {} ({:?})",
            atom.shells.len(),
            atom.symbol,
            mode
        );
        Self {
            orbits,
            highlight,
            mode,
        }
    }

    pub fn orbits(&self) -> &[ShellOrbit] {
        &self.orbits
    }

    pub fn highlight(&self) -> Option<&ValenceHighlight> {
        self.highlight.as_ref()
    }

    /// Mode the ring shapes were built for.
    pub fn mode(&self) -> AtomMode {
        self.mode
    }
}

impl Animate for ShellAnimator {
    type Frame = BohrFrame;

    fn advance(&self, elapsed: f32, settings: &Settings) -> BohrFrame {
        BohrFrame {
            shells: self
                .orbits
                .iter()
                .map(|orbit| ShellFrame {
                    level: orbit.level,
                    electrons: orbit.electron_positions(elapsed, settings),
                })
                .collect(),
            highlight: self.highlight.map(|h| h.target(settings)),
        }
    }
}
