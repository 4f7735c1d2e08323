//! Bond visualization.
//!
//! Each bond of a molecule gets a [`BondVisual`]: two density blobs that
//! slide from `start_distance` apart to `end_distance` apart and back
//! (a linear ping-pong, one leg every `2.6 / animation_speed` seconds), an
//! overlap pulse between them, a strip of 36 electron-density points biased
//! toward the heavier atom, and a connecting line.
//!
//! Everything in a [`BondFrame`] is a function of elapsed time and settings.
//! The density strip and bond direction are built once per molecule.
//!
//! # Example
//!
//! ```ignore
//! let bonds = BondAnimator::new(&Molecule::water(), &mut rng);
//! for frame in bonds.advance(elapsed, &settings) {
//!     backend.place_blobs(frame.bond_id, frame.blob_a, frame.blob_b);
//! }
//! ```

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use glam::{Quat, Vec3};
use rand::Rng;

use crate::molecule::{Bond, Molecule};
use crate::palette;
use crate::quantum::CloudVertex;
use crate::scene::Animate;
use crate::settings::{Settings, VisualizationMode};

pub const DENSITY_SAMPLES: usize = 36;
pub const DENSITY_POINT_SIZE: f32 = 0.06;
/// Seconds per approach leg at `animation_speed == 1`.
pub const APPROACH_LEG_SECS: f32 = 2.6;
/// Seconds per leg of the Bohr-mode line fade.
pub const LINE_FADE_LEG_SECS: f32 = 1.2;
pub const LINE_FADE_MAX: f32 = 0.9;
pub const ANCHOR_DISTANCE: f32 = 0.55;
pub const BLOB_RADIUS: f32 = 0.42;
pub const OVERLAP_RADIUS: f32 = 0.35;
/// Control point shared by every bond line.
pub const LINE_MID: Vec3 = Vec3::new(0.0, 0.2, 0.0);

/// Blob separation at the far end of the approach.
pub fn start_distance(strength: f32) -> f32 {
    (3.1 - strength * 1.2).clamp(1.4, 3.1)
}

/// Blob separation at the near end of the approach.
pub fn end_distance(strength: f32) -> f32 {
    (1.15 - strength * 0.35).clamp(0.75, 1.4)
}

/// Signed pull toward the higher-Z atom, in `[-1, 1]`. Zero when both are 0.
pub fn electron_bias(z_from: u32, z_to: u32) -> f32 {
    let total = z_from + z_to;
    if total == 0 {
        return 0.0;
    }
    (z_to as f32 - z_from as f32) / total as f32
}

/// Linear triangle wave in `[0, 1]`: up over one leg, down over the next.
pub fn ping_pong(elapsed: f32, leg: f32) -> f32 {
    if leg.is_nan() || leg <= 0.0 || !elapsed.is_finite() {
        return 0.0;
    }
    let phase = (elapsed / leg).rem_euclid(2.0);
    if phase <= 1.0 {
        phase
    } else {
        2.0 - phase
    }
}

/// Unit direction of bond `index` out of `count`, fanned around the atom.
pub fn bond_direction(index: usize, count: usize) -> Vec3 {
    if count == 0 {
        return Vec3::X;
    }
    let a = index as f32 / count as f32 * TAU;
    Vec3::new(a.cos(), a.sin() * 0.6, (a * 1.4).sin() * 0.4)
        .try_normalize()
        .unwrap_or(Vec3::X)
}

/// The 36-point density strip in bond-local space.
pub fn electron_density(bias: f32) -> Vec<CloudVertex> {
    (0..DENSITY_SAMPLES)
        .map(|i| {
            let t = i as f32 / (DENSITY_SAMPLES - 1) as f32;
            let position = Vec3::new(
                (t - 0.5) * 0.5 + bias * 0.25 * (t - 0.5),
                ((t * TAU).sin() * 0.1 + bias * 0.08) * 0.7,
                (t * TAU).cos() * 0.08,
            );
            let mix = (t + bias * 0.35).clamp(0.0, 1.0);
            let color = palette::DENSITY_COOL.lerp(palette::DENSITY_WARM, mix);
            CloudVertex {
                position: position.to_array(),
                color: color.to_array(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondColors {
    pub bond: Vec3,
    pub overlap: Vec3,
    /// Color of the dashed line from the origin to [`BondVisual::line_end`].
    pub line: Vec3,
}

impl BondColors {
    pub fn for_mode(mode: VisualizationMode) -> Self {
        match mode {
            VisualizationMode::Quantum => Self {
                bond: palette::BOND_QUANTUM,
                overlap: palette::OVERLAP_QUANTUM,
                line: palette::BOND_LINE,
            },
            VisualizationMode::Bohr => Self {
                bond: palette::BOND_BOHR,
                overlap: palette::OVERLAP_BOHR,
                line: palette::BOND_LINE,
            },
        }
    }
}

/// Static geometry of one bond.
#[derive(Debug, Clone)]
pub struct BondVisual {
    pub bond_id: u64,
    pub strength: f32,
    pub direction: Vec3,
    pub anchor: Vec3,
    /// Rotates bond-local +X onto `direction`.
    pub orientation: Quat,
    pub start_distance: f32,
    pub end_distance: f32,
    pub bias: f32,
    density: Arc<[CloudVertex]>,
    /// Far end of the dashed Bohr-mode line; it starts at the origin.
    pub line_end: Vec3,
}

impl BondVisual {
    pub fn new<R: Rng + ?Sized>(bond: &Bond, index: usize, count: usize, rng: &mut R) -> Self {
        let direction = bond_direction(index, count);
        let bias = electron_bias(bond.from.atomic_number, bond.to.atomic_number);
        let line_end = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 1.5,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        Self {
            bond_id: bond.id,
            strength: bond.strength,
            direction,
            anchor: direction * ANCHOR_DISTANCE,
            orientation: Quat::from_rotation_arc(Vec3::X, direction),
            start_distance: start_distance(bond.strength),
            end_distance: end_distance(bond.strength),
            bias,
            density: electron_density(bias).into(),
            line_end,
        }
    }

    pub fn density(&self) -> &[CloudVertex] {
        &self.density
    }

    pub fn density_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.density[..])
    }

    /// Blob separation at `approach` in `[0, 1]`.
    pub fn separation(&self, approach: f32) -> f32 {
        self.start_distance + (self.end_distance - self.start_distance) * approach
    }

    pub fn frame(&self, elapsed: f32, settings: &Settings) -> BondFrame {
        let approach = ping_pong(elapsed, APPROACH_LEG_SECS / settings.animation_speed);
        let pulse = 0.65 + 0.35 * approach;
        let separation = self.separation(approach);
        BondFrame {
            bond_id: self.bond_id,
            approach,
            overlap_pulse: pulse,
            blob_a: Vec3::new(-separation / 2.0, 0.0, 0.0),
            blob_b: Vec3::new(separation / 2.0, 0.0, 0.0),
            overlap_offset: Vec3::new(0.0, 0.0, 0.08 + 0.05 * (PI * approach).sin()),
            overlap_scale: 0.72 + pulse * 0.35,
            density_scale: Vec3::new(separation, 1.05, 1.05),
            line_scale: 0.9 + 0.25 * approach,
            line_opacity: LINE_FADE_MAX * ping_pong(elapsed, LINE_FADE_LEG_SECS),
            colors: BondColors::for_mode(settings.visualization_mode),
        }
    }
}

/// Per-frame values of one bond, in bond-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondFrame {
    pub bond_id: u64,
    pub approach: f32,
    pub overlap_pulse: f32,
    pub blob_a: Vec3,
    pub blob_b: Vec3,
    pub overlap_offset: Vec3,
    pub overlap_scale: f32,
    pub density_scale: Vec3,
    pub line_scale: f32,
    /// Opacity of the dashed Bohr-mode line.
    pub line_opacity: f32,
    pub colors: BondColors,
}

#[derive(Debug, Clone, Default)]
pub struct BondAnimator {
    visuals: Vec<BondVisual>,
}

impl BondAnimator {
    pub fn new<R: Rng + ?Sized>(molecule: &Molecule, rng: &mut R) -> Self {
        let count = molecule.bonds.len();
        let visuals = molecule
            .bonds
            .iter()
            .enumerate()
            .map(|(i, bond)| BondVisual::new(bond, i, count, rng))
            .collect();
        log::debug!(target: "bond", "{} bond visuals for {}", count, molecule.name);
        Self { visuals }
    }

    pub fn visuals(&self) -> &[BondVisual] {
        &self.visuals
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }
}

impl Animate for BondAnimator {
    type Frame = Vec<BondFrame>;

    fn advance(&self, elapsed: f32, settings: &Settings) -> Vec<BondFrame> {
        self.visuals.iter().map(|v| v.frame(elapsed, settings)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    fn same_color(a: [f32; 3], b: Vec3) -> bool {
        (Vec3::from_array(a) - b).length() < 1e-5
    }

    #[test]
    fn test_distances() {
        assert!(close(start_distance(1.0), 1.9));
        assert!(close(end_distance(1.0), 0.8));
        assert!(close(start_distance(0.0), 3.1));
        assert!(close(end_distance(0.0), 1.15));
        assert!(close(start_distance(1e-3), 3.1 - 1.2e-3));
        assert!(close(start_distance(5.0), 1.4));
        assert!(close(end_distance(5.0), 0.75));
        assert!(close(end_distance(-2.0), 1.4));
    }

    #[test]
    fn test_bias() {
        assert_eq!(electron_bias(0, 0), 0.0);
        assert_eq!(electron_bias(1, 1), 0.0);
        assert!(close(electron_bias(8, 1), -7.0 / 9.0));
        assert!(close(electron_bias(1, 8), 7.0 / 9.0));
    }

    #[test]
    fn test_ping_pong() {
        assert_eq!(ping_pong(0.0, 2.6), 0.0);
        assert!(close(ping_pong(1.3, 2.6), 0.5));
        assert!(close(ping_pong(2.6, 2.6), 1.0));
        assert!(close(ping_pong(3.9, 2.6), 0.5));
        assert!(close(ping_pong(5.2, 2.6), 0.0));
        assert_eq!(ping_pong(1.0, 0.0), 0.0);
        for i in 0..100 {
            let v = ping_pong(i as f32 * 0.77, 1.2);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_density_strip() {
        let neutral = electron_density(0.0);
        assert_eq!(neutral.len(), 36);
        assert!(close(neutral[0].position[0], -0.25));
        assert!(close(neutral[35].position[0], 0.25));
        assert!(same_color(neutral[0].color, palette::DENSITY_COOL));
        assert!(same_color(neutral[35].color, palette::DENSITY_WARM));

        let toward_to = electron_density(0.8);
        assert!(toward_to[35].position[0] > neutral[35].position[0]);
        assert!(toward_to[0].position[1] > neutral[0].position[1]);
        assert!(same_color(toward_to[30].color, palette::DENSITY_WARM));
    }

    #[test]
    fn test_directions() {
        for count in 1..6 {
            for i in 0..count {
                assert!(close(bond_direction(i, count).length(), 1.0));
            }
        }
        assert!(close(bond_direction(0, 2).x, 1.0));
    }

    #[test]
    fn test_water_frames() {
        let water = Molecule::water();
        let mut rng = SmallRng::seed_from_u64(5);
        let animator = BondAnimator::new(&water, &mut rng);
        assert_eq!(animator.visuals().len(), 2);
        let v = &animator.visuals()[0];
        assert!((v.orientation * Vec3::X - v.direction).length() < 1e-5);
        assert!(close(v.anchor.length(), 0.55));
        assert!(v.bias < 0.0);

        let settings = Settings::default();
        let at_start = v.frame(0.0, &settings);
        assert!(close(at_start.blob_b.x - at_start.blob_a.x, v.start_distance));
        assert!(close(at_start.overlap_pulse, 0.65));
        assert!(close(at_start.overlap_scale, 0.72 + 0.65 * 0.35));

        let closest = v.frame(2.6, &settings);
        assert!(close(closest.blob_b.x * 2.0, v.end_distance));
        assert!(close(closest.overlap_offset.z, 0.08));
        assert!(close(closest.line_scale, 1.15));
        assert!(close(closest.density_scale.x, v.end_distance));

        let fast = Settings {
            animation_speed: 2.0,
            ..Settings::default()
        };
        assert!(close(v.frame(1.3, &fast).approach, 1.0));
    }

    #[test]
    fn test_colors_follow_mode() {
        let mut rng = SmallRng::seed_from_u64(5);
        let animator = BondAnimator::new(&Molecule::water(), &mut rng);
        let quantum = Settings {
            visualization_mode: VisualizationMode::Quantum,
            ..Settings::default()
        };
        let frames = animator.advance(0.4, &quantum);
        assert_eq!(frames[0].colors.bond, palette::BOND_QUANTUM);
        let frames = animator.advance(0.4, &Settings::default());
        assert_eq!(frames[0].colors.overlap, palette::OVERLAP_BOHR);
        assert_eq!(frames[0].colors.line, palette::BOND_LINE);
    }

    #[test]
    fn test_line_fade() {
        let mut rng = SmallRng::seed_from_u64(5);
        let animator = BondAnimator::new(&Molecule::water(), &mut rng);
        let s = Settings::default();
        assert_eq!(animator.advance(0.0, &s)[0].line_opacity, 0.0);
        assert!(close(animator.advance(1.2, &s)[0].line_opacity, 0.9));
    }

    #[test]
    fn test_no_bonds_no_frames() {
        let mut rng = SmallRng::seed_from_u64(5);
        let lone = Molecule::custom(vec![crate::atom::AtomPreset::Neon.atom()]);
        let animator = BondAnimator::new(&lone, &mut rng);
        assert!(animator.is_empty());
        assert!(animator.advance(1.0, &Settings::default()).is_empty());
    }
}
