//! Quantum-style orbital fields.
//!
//! An atom's orbital sets become three kinds of visual element:
//!
//! - **Noise volumes**: one sphere per `s` orbital and two lobes per `p`
//!   orbital, drawn with the noise material from [`crate::shader`].
//! - **Particle clouds**: one per `p` orbital, ~650 points spread along the
//!   orbital's axis with Gaussian jitter across it.
//! - **Knots**: a static torus-knot placeholder per `d` orbital.
//!
//! Everything random (cloud points) is sampled once in [`QuantumField::new`].
//! [`Animate::advance`] recomputes every opacity and time uniform from
//! `(elapsed, settings)` alone, so frames never accumulate drift.
//!
//! Valence sets are tilted `0.06` rad about X. Volume centers and cloud
//! points are stored in that tilted frame.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::atom::Atom;
use crate::orbital::{decompose_atom, Orbital, OrbitalSet, OrbitalType};
use crate::scene::Animate;
use crate::settings::Settings;
use crate::uniforms::UniformSet;

pub const VALENCE_TILT: f32 = 0.06;
/// Radius of the unit sphere mesh a noise volume scales.
pub const VOLUME_MESH_RADIUS: f32 = 0.9;
pub const LOBE_OFFSET: f32 = 0.7;
pub const CLOUD_SAMPLES: usize = 650;
pub const VALENCE_DENSITY: f32 = 1.35;
/// Per-volume step added to the noise time uniform.
pub const VOLUME_TIME_STEP: f32 = 0.12;
/// Per-cloud step added to the opacity pulse phase.
pub const CLOUD_PHASE_STEP: f32 = 0.35;

/// Interleaved point-cloud vertex as uploaded to a vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CloudVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Shared animation clock of the field.
pub fn field_time(elapsed: f32, settings: &Settings) -> f32 {
    elapsed * settings.animation_speed * settings.quantum_animation_intensity * settings.motion_damping()
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoiseVolume {
    pub orbital_id: String,
    pub kind: OrbitalType,
    pub center: Vec3,
    /// Scale applied to the unit sphere mesh.
    pub scale: f32,
    pub rotation: Quat,
    pub color: Vec3,
    pub base_opacity: f32,
    pub phase_offset: f32,
    /// Position in traversal order; drives the time uniform step.
    pub index: usize,
}

impl NoiseVolume {
    pub fn base_opacity_for(is_valence: bool) -> f32 {
        if is_valence {
            0.45
        } else {
            0.32
        }
    }

    pub fn time_uniform(&self, t: f32) -> f32 {
        t + self.index as f32 * VOLUME_TIME_STEP + self.phase_offset
    }

    pub fn opacity(&self, settings: &Settings) -> f32 {
        let scale = 0.7 + settings.quantum_animation_intensity * 0.5;
        (self.base_opacity * scale * settings.motion_damping()).min(1.0)
    }

    /// World-space radius of the drawn sphere.
    pub fn world_radius(&self) -> f32 {
        VOLUME_MESH_RADIUS * self.scale
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleCloud {
    pub orbital_id: String,
    pub axis: Vec3,
    pub rotation: Quat,
    positions: Arc<[Vec3]>,
    pub color: Vec3,
    pub point_size: f32,
    pub base_opacity: f32,
    pub opacity_range: f32,
    pub phase_offset: f32,
    pub index: usize,
}

impl ParticleCloud {
    /// Sample a cloud around `orbital`'s axis, then rotate it by `rotation`.
    pub fn sample<R: Rng + ?Sized>(orbital: &Orbital, rotation: Quat, index: usize, rng: &mut R) -> Self {
        let density = if orbital.is_valence { VALENCE_DENSITY } else { 1.0 };
        let count = (CLOUD_SAMPLES as f32 * density).round() as usize;
        let radius = orbital.radius * 0.92;
        let axis = orbital.orientation.map(|o| o.axis()).unwrap_or(Vec3::Y);
        let (u, v) = axis.any_orthonormal_pair();

        let positions = match Normal::new(0.0f32, 0.18 * radius) {
            Ok(gauss) => (0..count)
                .map(|_| {
                    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    let axial = rng.gen_range(0.4f32..1.2) * radius * sign;
                    let local = axis * axial + u * gauss.sample(rng) + v * gauss.sample(rng);
                    rotation * local
                })
                .collect(),
            Err(e) => {
                log::warn!(target: "quantum", "cloud {} has no spread ({}); skipping points", orbital.id, e);
                Arc::from(Vec::new())
            }
        };

        Self {
            orbital_id: orbital.id.clone(),
            axis: rotation * axis,
            rotation,
            positions,
            color: orbital.color,
            point_size: if orbital.is_valence { 0.058 } else { 0.05 },
            base_opacity: if orbital.is_valence { 0.23 } else { 0.18 },
            opacity_range: if orbital.is_valence { 0.12 } else { 0.08 },
            phase_offset: orbital.phase_offset,
            index,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Tightly packed `xyz` floats for a position-only vertex buffer.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions[..])
    }

    pub fn vertices(&self) -> Vec<CloudVertex> {
        self.positions
            .iter()
            .map(|p| CloudVertex {
                position: p.to_array(),
                color: self.color.to_array(),
            })
            .collect()
    }

    pub fn opacity(&self, t: f32, settings: &Settings) -> f32 {
        let motion = settings.motion_damping();
        let pulse = 0.55 + settings.quantum_animation_intensity * 0.6;
        let damping = motion * 0.8 + 0.25;
        let wave = (t * 0.9 + self.phase_offset + self.index as f32 * CLOUD_PHASE_STEP).sin();
        (self.base_opacity * pulse + self.opacity_range * damping * wave).min(1.0)
    }
}

/// Static stand-in for a `d` orbital.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotPlaceholder {
    pub orbital_id: String,
    pub rotation: Quat,
    pub radius: f32,
    pub tube: f32,
    pub tubular_segments: u32,
    pub radial_segments: u32,
    pub color: Vec3,
    pub opacity: f32,
    pub emissive_intensity: f32,
}

impl KnotPlaceholder {
    pub fn new(orbital: &Orbital, rotation: Quat) -> Self {
        Self {
            orbital_id: orbital.id.clone(),
            rotation,
            radius: orbital.radius * 0.5,
            tube: orbital.radius * 0.1,
            tubular_segments: 90,
            radial_segments: 12,
            color: orbital.color,
            opacity: if orbital.is_valence { 0.32 } else { 0.25 },
            emissive_intensity: if orbital.is_valence { 0.45 } else { 0.25 },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeFrame {
    pub time: f32,
    pub opacity: f32,
    /// `time`, `opacity`, `color` in noise material order.
    pub uniforms: UniformSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantumFrame {
    /// Parallel to [`QuantumField::volumes`].
    pub volumes: Vec<VolumeFrame>,
    /// Parallel to [`QuantumField::clouds`].
    pub cloud_opacity: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct QuantumField {
    sets: Vec<OrbitalSet>,
    volumes: Vec<NoiseVolume>,
    clouds: Vec<ParticleCloud>,
    knots: Vec<KnotPlaceholder>,
}

impl QuantumField {
    pub fn new<R: Rng + ?Sized>(atom: &Atom, rng: &mut R) -> Self {
        Self::from_sets(decompose_atom(atom, rng), rng)
    }

    /// Build the field for already decomposed orbital sets.
    pub fn from_sets<R: Rng + ?Sized>(sets: Vec<OrbitalSet>, rng: &mut R) -> Self {
        let mut volumes = Vec::new();
        let mut clouds = Vec::new();
        let mut knots = Vec::new();

        for set in &sets {
            let rotation = if set.is_valence {
                Quat::from_rotation_x(VALENCE_TILT)
            } else {
                Quat::IDENTITY
            };

            for orbital in &set.orbitals {
                let mut push_volume = |center: Vec3, scale: f32| {
                    let index = volumes.len();
                    volumes.push(NoiseVolume {
                        orbital_id: orbital.id.clone(),
                        kind: orbital.kind,
                        center: rotation * center,
                        scale,
                        rotation,
                        color: orbital.color,
                        base_opacity: NoiseVolume::base_opacity_for(orbital.is_valence),
                        phase_offset: orbital.phase_offset,
                        index,
                    });
                };

                match orbital.kind {
                    OrbitalType::S => push_volume(Vec3::ZERO, orbital.radius),
                    OrbitalType::P => {
                        let axis = orbital.orientation.map(|o| o.axis()).unwrap_or(Vec3::Z);
                        let offset = axis * orbital.radius * LOBE_OFFSET;
                        push_volume(offset, orbital.radius * 0.6);
                        push_volume(-offset, orbital.radius * 0.6);
                        let index = clouds.len();
                        clouds.push(ParticleCloud::sample(orbital, rotation, index, rng));
                    }
                    OrbitalType::D => knots.push(KnotPlaceholder::new(orbital, rotation)),
                }
            }
        }

        log::debug!(
            target: "quantum",
            "field with {} volumes, {} clouds, {} knots",
            volumes.len(),
            clouds.len(),
            knots.len()
        );

        Self {
            sets,
            volumes,
            clouds,
            knots,
        }
    }

    pub fn orbital_sets(&self) -> &[OrbitalSet] {
        &self.sets
    }

    pub fn volumes(&self) -> &[NoiseVolume] {
        &self.volumes
    }

    pub fn clouds(&self) -> &[ParticleCloud] {
        &self.clouds
    }

    pub fn knots(&self) -> &[KnotPlaceholder] {
        &self.knots
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty() && self.clouds.is_empty() && self.knots.is_empty()
    }
}

impl Animate for QuantumField {
    type Frame = QuantumFrame;

    fn advance(&self, elapsed: f32, settings: &Settings) -> QuantumFrame {
        let t = field_time(elapsed, settings);
        let volumes = self
            .volumes
            .iter()
            .map(|volume| {
                let time = volume.time_uniform(t);
                let opacity = volume.opacity(settings);
                VolumeFrame {
                    time,
                    opacity,
                    uniforms: UniformSet::new()
                        .with("time", time)
                        .with("opacity", opacity)
                        .with("color", volume.color),
                }
            })
            .collect();
        let cloud_opacity = self.clouds.iter().map(|c| c.opacity(t, settings)).collect();
        QuantumFrame {
            volumes,
            cloud_opacity,
        }
    }
}
