//! Named colors used by the visualizations.
//!
//! Every color is linear RGB in `0.0..=1.0`, written as the hex value the
//! design uses so the constants stay easy to compare against a style sheet.

use glam::Vec3;

/// Convert a `0xRRGGBB` literal into an RGB vector.
pub const fn hex(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

// Nucleus
pub const PROTON: Vec3 = hex(0xff5f6d);
pub const NEUTRON: Vec3 = hex(0x6ee7b7);

// Bohr shells
pub const VALENCE_ACCENT: Vec3 = hex(0xff6584);
pub const VALENCE_EMISSIVE: Vec3 = hex(0xff2d55);
pub const CORE_PATH: Vec3 = hex(0x64748b);
pub const CORE_ELECTRON: Vec3 = hex(0x22d3ee);
pub const VALENCE_RING_SIMPLIFIED: Vec3 = hex(0xfb7185);

// Orbitals
pub const ORBITAL_VALENCE: Vec3 = hex(0xc8b5ff);
pub const ORBITAL_CORE: Vec3 = hex(0x7ad0e3);

// Bonds
pub const BOND_QUANTUM: Vec3 = hex(0x9bd5ff);
pub const BOND_BOHR: Vec3 = hex(0xb6a8ff);
pub const OVERLAP_QUANTUM: Vec3 = hex(0x66e2e8);
pub const OVERLAP_BOHR: Vec3 = hex(0xf2c94c);
pub const BOND_LINE: Vec3 = hex(0x7c3aed);
pub const DENSITY_COOL: Vec3 = hex(0x8ec5ff);
pub const DENSITY_WARM: Vec3 = hex(0xffb997);

// Backgrounds
pub const BACKGROUND_LIGHT: Vec3 = hex(0xf8fafc);
pub const BACKGROUND_DARK: Vec3 = hex(0x0b1224);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_channels() {
        let c = hex(0xff8000);
        assert!((c.x - 1.0).abs() < 1e-6);
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }
}
