//! The orbital noise material.
//!
//! Noise volumes (s spheres and p lobes) are drawn with a transparent
//! material whose alpha is a flickering band of 3D value noise sampled at the
//! fragment's object-space position. [`ORBITAL_NOISE_WGSL`] is the shader a
//! GPU backend compiles; [`noise_alpha`] is the same fragment function on the
//! CPU for backends that rasterize or ray-march the volumes themselves.
//!
//! Material uniforms, in struct order: `time: f32`, `opacity: f32`,
//! `color: vec3<f32>`. The quantum engine produces them per frame as a
//! [`UniformSet`](crate::uniforms::UniformSet).

use glam::Vec3;

/// Bind group 0 holds the camera, bind group 1 the per-volume material.
pub const ORBITAL_NOISE_WGSL: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
};

struct NoiseMaterial {
    time: f32,
    opacity: f32,
    color: vec3<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(1) @binding(0) var<uniform> material: NoiseMaterial;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) local_position: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.local_position = position;
    out.clip_position = camera.view_proj * camera.model * vec4<f32>(position, 1.0);
    return out;
}

fn random3(p: vec3<f32>) -> f32 {
    return fract(sin(dot(p, vec3<f32>(12.9898, 78.233, 37.719))) * 43758.5453);
}

fn value_noise(p: vec3<f32>) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let u = f * f * (vec3<f32>(3.0) - 2.0 * f);

    let n000 = random3(i);
    let n100 = random3(i + vec3<f32>(1.0, 0.0, 0.0));
    let n010 = random3(i + vec3<f32>(0.0, 1.0, 0.0));
    let n110 = random3(i + vec3<f32>(1.0, 1.0, 0.0));
    let n001 = random3(i + vec3<f32>(0.0, 0.0, 1.0));
    let n101 = random3(i + vec3<f32>(1.0, 0.0, 1.0));
    let n011 = random3(i + vec3<f32>(0.0, 1.0, 1.0));
    let n111 = random3(i + vec3<f32>(1.0, 1.0, 1.0));

    let n00 = mix(n000, n100, u.x);
    let n01 = mix(n001, n101, u.x);
    let n10 = mix(n010, n110, u.x);
    let n11 = mix(n011, n111, u.x);
    let n0 = mix(n00, n10, u.y);
    let n1 = mix(n01, n11, u.y);
    return mix(n0, n1, u.z);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = value_noise(in.local_position * 0.8 + vec3<f32>(material.time * 0.35));
    let band = smoothstep(0.25, 0.95, n);
    let flicker = 0.4 + 0.6 * value_noise(vec3<f32>(n * 1.4) + vec3<f32>(material.time * 0.7));
    return vec4<f32>(material.color, material.opacity * band * flicker);
}
"#;

const HASH_DIR: Vec3 = Vec3::new(12.9898, 78.233, 37.719);

fn random3(p: Vec3) -> f32 {
    let v = p.dot(HASH_DIR).sin() * 43758.5453;
    v - v.floor()
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Trilinear value noise in `[0, 1)`.
pub fn value_noise(p: Vec3) -> f32 {
    let i = p.floor();
    let f = p - i;
    let u = f * f * (Vec3::splat(3.0) - 2.0 * f);

    let corner = |x: f32, y: f32, z: f32| random3(i + Vec3::new(x, y, z));
    let n00 = mix(corner(0.0, 0.0, 0.0), corner(1.0, 0.0, 0.0), u.x);
    let n01 = mix(corner(0.0, 0.0, 1.0), corner(1.0, 0.0, 1.0), u.x);
    let n10 = mix(corner(0.0, 1.0, 0.0), corner(1.0, 1.0, 0.0), u.x);
    let n11 = mix(corner(0.0, 1.0, 1.0), corner(1.0, 1.0, 1.0), u.x);
    let n0 = mix(n00, n10, u.y);
    let n1 = mix(n01, n11, u.y);
    mix(n0, n1, u.z)
}

/// Fragment alpha of the noise material at object-space `point`.
pub fn noise_alpha(point: Vec3, time: f32, opacity: f32) -> f32 {
    let n = value_noise(point * 0.8 + Vec3::splat(time * 0.35));
    let band = smoothstep(0.25, 0.95, n);
    let flicker = 0.4 + 0.6 * value_noise(Vec3::splat(n * 1.4) + Vec3::splat(time * 0.7));
    opacity * band * flicker
}

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::wgsl;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    #[test]
    fn test_wgsl_parses_and_validates() {
        let module = match wgsl::parse_str(ORBITAL_NOISE_WGSL) {
            Ok(module) => module,
            Err(e) => panic!("{}", e.emit_to_string(ORBITAL_NOISE_WGSL)),
        };
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        if let Err(e) = validator.validate(&module) {
            panic!("{:?}", e);
        }
        let entry_points: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(entry_points.contains(&"vs_main"));
        assert!(entry_points.contains(&"fs_main"));
    }

    #[test]
    fn test_value_noise_range_and_determinism() {
        for i in 0..200 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.11, (i % 13) as f32 * 0.5);
            let n = value_noise(p);
            assert!((0.0..=1.0).contains(&n), "{} at {:?}", n, p);
            assert_eq!(n, value_noise(p));
        }
    }

    #[test]
    fn test_lattice_points_are_hash_values() {
        let p = Vec3::new(2.0, -1.0, 3.0);
        assert_eq!(value_noise(p), random3(p));
    }

    #[test]
    fn test_alpha_bounded_by_opacity() {
        for i in 0..100 {
            let p = Vec3::new(i as f32 * 0.21, 0.3, -(i as f32) * 0.07);
            let a = noise_alpha(p, i as f32 * 0.1, 0.4);
            assert!((0.0..=0.4).contains(&a));
            assert_eq!(noise_alpha(p, i as f32 * 0.1, 0.0), 0.0);
        }
    }

    #[test]
    fn test_smoothstep() {
        assert_eq!(smoothstep(0.25, 0.95, 0.0), 0.0);
        assert_eq!(smoothstep(0.25, 0.95, 1.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
