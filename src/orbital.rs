//! Orbital decomposition of electron shells.
//!
//! Each shell is split into at most one `s` orbital, three `p` orbitals and
//! five `d` orbitals, two electrons apiece, always in the fixed orientation
//! order `px, py, pz` then `dxy, dyz, dxz, dx2y2, dz2`. There is no `f` tier:
//! a shell holding more than 18 electrons keeps the excess undistributed.
//!
//! Counts and orientations are deterministic. Only `phase_offset` is random;
//! it is drawn once when the orbital is built and never changes afterwards.

use std::f32::consts::TAU;
use std::fmt;

use glam::Vec3;
use rand::Rng;

use crate::atom::{Atom, Shell};
use crate::palette;

/// Most electrons a single orbital can hold.
pub const ELECTRONS_PER_ORBITAL: usize = 2;

/// Most electrons `s + p + d` can hold within one shell.
pub const MAX_DECOMPOSED: usize = 2 + 6 + 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrbitalType {
    S,
    P,
    D,
}

impl OrbitalType {
    pub fn letter(self) -> &'static str {
        match self {
            OrbitalType::S => "s",
            OrbitalType::P => "p",
            OrbitalType::D => "d",
        }
    }

    /// Orbital radius relative to the parent shell radius.
    fn radius_factor(self) -> f32 {
        match self {
            OrbitalType::S => 0.7,
            OrbitalType::P => 1.0,
            OrbitalType::D => 1.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Px,
    Py,
    Pz,
    Dxy,
    Dyz,
    Dxz,
    Dx2y2,
    Dz2,
}

impl Orientation {
    pub const P: [Orientation; 3] = [Orientation::Px, Orientation::Py, Orientation::Pz];
    pub const D: [Orientation; 5] = [
        Orientation::Dxy,
        Orientation::Dyz,
        Orientation::Dxz,
        Orientation::Dx2y2,
        Orientation::Dz2,
    ];

    /// Principal lobe axis of a `p` orientation.
    ///
    /// `d` orientations have no single axis and fall back to +Y, the axis
    /// used for unoriented clouds.
    pub fn axis(self) -> Vec3 {
        match self {
            Orientation::Px => Vec3::X,
            Orientation::Py => Vec3::Y,
            Orientation::Pz => Vec3::Z,
            _ => Vec3::Y,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Px => "px",
            Orientation::Py => "py",
            Orientation::Pz => "pz",
            Orientation::Dxy => "dxy",
            Orientation::Dyz => "dyz",
            Orientation::Dxz => "dxz",
            Orientation::Dx2y2 => "dx2y2",
            Orientation::Dz2 => "dz2",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Orbital {
    /// `"{level}-s"`, `"{level}-p-{i}"` or `"{level}-d-{i}"`.
    pub id: String,
    pub kind: OrbitalType,
    pub principal: u32,
    /// 1 or 2.
    pub electrons: usize,
    pub orientation: Option<Orientation>,
    pub radius: f32,
    pub color: Vec3,
    /// Fixed animation phase in `[0, 2π)`.
    pub phase_offset: f32,
    pub is_valence: bool,
}

/// The orbitals of one shell.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalSet {
    pub shell: u32,
    pub orbitals: Vec<Orbital>,
    pub is_valence: bool,
}

impl OrbitalSet {
    pub fn electron_count(&self) -> usize {
        self.orbitals.iter().map(|o| o.electrons).sum()
    }

    pub fn of_kind(&self, kind: OrbitalType) -> impl Iterator<Item = &Orbital> {
        self.orbitals.iter().filter(move |o| o.kind == kind)
    }
}

struct Filler<'a, R: Rng + ?Sized> {
    shell: &'a Shell,
    remaining: usize,
    color: Vec3,
    rng: &'a mut R,
    orbitals: Vec<Orbital>,
}

impl<R: Rng + ?Sized> Filler<'_, R> {
    fn take(&mut self, kind: OrbitalType, orientation: Option<(usize, Orientation)>) {
        let electrons = self.remaining.min(ELECTRONS_PER_ORBITAL);
        let id = match orientation {
            Some((i, _)) => format!("{}-{}-{}", self.shell.level, kind.letter(), i),
            None => format!("{}-{}", self.shell.level, kind.letter()),
        };
        self.orbitals.push(Orbital {
            id,
            kind,
            principal: self.shell.level,
            electrons,
            orientation: orientation.map(|(_, o)| o),
            radius: self.shell.radius * kind.radius_factor(),
            color: self.color,
            phase_offset: self.rng.gen_range(0.0..TAU),
            is_valence: self.shell.is_valence,
        });
        self.remaining -= electrons;
    }

    fn fill_tier(&mut self, kind: OrbitalType, orientations: &[Orientation]) {
        for (i, &o) in orientations.iter().enumerate() {
            if self.remaining == 0 {
                break;
            }
            self.take(kind, Some((i, o)));
        }
    }
}

/// Split a shell's electrons into `s`, `p` and `d` orbitals.
pub fn decompose<R: Rng + ?Sized>(shell: &Shell, rng: &mut R) -> Vec<Orbital> {
    let color = if shell.is_valence {
        palette::ORBITAL_VALENCE
    } else {
        palette::ORBITAL_CORE
    };
    let mut filler = Filler {
        shell,
        remaining: shell.electron_count(),
        color,
        rng,
        orbitals: Vec::new(),
    };

    if filler.remaining > 0 {
        filler.take(OrbitalType::S, None);
    }
    if shell.level >= 2 {
        filler.fill_tier(OrbitalType::P, &Orientation::P);
    }
    if shell.level >= 3 {
        filler.fill_tier(OrbitalType::D, &Orientation::D);
    }

    if filler.remaining > 0 {
        log::debug!(
            target: "atom",
            "shell {} leaves {} electrons without an orbital",
            shell.level,
            filler.remaining
        );
    }

    filler.orbitals
}

pub fn decompose_shell<R: Rng + ?Sized>(shell: &Shell, rng: &mut R) -> OrbitalSet {
    OrbitalSet {
        shell: shell.level,
        orbitals: decompose(shell, rng),
        is_valence: shell.is_valence,
    }
}

/// Orbital sets for every shell of an atom, in shell order.
pub fn decompose_atom<R: Rng + ?Sized>(atom: &Atom, rng: &mut R) -> Vec<OrbitalSet> {
    atom.shells.iter().map(|s| decompose_shell(s, rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::build_shells;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_electron_conservation() {
        let mut rng = rng();
        for level in 1..=4u32 {
            let cap = crate::atom::capacity(level);
            for count in 0..=cap {
                let shell = Shell::new(level, count, true);
                let total: usize = decompose(&shell, &mut rng).iter().map(|o| o.electrons).sum();
                if count <= MAX_DECOMPOSED {
                    let reachable = match level {
                        1 => count.min(2),
                        2 => count.min(8),
                        _ => count,
                    };
                    assert_eq!(total, reachable, "level {} count {}", level, count);
                } else {
                    assert_eq!(total, MAX_DECOMPOSED);
                }
            }
        }
    }

    #[test]
    fn test_real_atoms_conserve_up_to_krypton() {
        let mut rng = rng();
        for z in 1..=36u32 {
            for shell in build_shells(z) {
                let set = decompose_shell(&shell, &mut rng);
                assert_eq!(set.electron_count(), shell.electron_count().min(MAX_DECOMPOSED));
            }
        }
    }

    #[test]
    fn test_p_orientation_order() {
        let shell = Shell::new(2, 8, true);
        let orbitals = decompose(&shell, &mut rng());
        let p: Vec<_> = orbitals.iter().filter_map(|o| o.orientation).collect();
        assert_eq!(p, Orientation::P.to_vec());
        assert_eq!(orbitals[0].kind, OrbitalType::S);
        assert!(orbitals[1..].iter().all(|o| o.electrons == 2));
    }

    #[test]
    fn test_d_orientation_order() {
        let shell = Shell::new(3, 18, false);
        let orbitals = decompose(&shell, &mut rng());
        let d: Vec<_> = orbitals
            .iter()
            .filter(|o| o.kind == OrbitalType::D)
            .filter_map(|o| o.orientation)
            .collect();
        assert_eq!(d, Orientation::D.to_vec());
        assert_eq!(orbitals.len(), 1 + 3 + 5);
    }

    #[test]
    fn test_partial_fill_odd_count() {
        let shell = Shell::new(2, 5, true);
        let orbitals = decompose(&shell, &mut rng());
        let electrons: Vec<_> = orbitals.iter().map(|o| o.electrons).collect();
        assert_eq!(electrons, vec![2, 2, 1]);
        assert_eq!(orbitals[2].orientation, Some(Orientation::Py));
    }

    #[test]
    fn test_ids_and_radii() {
        let shell = Shell::new(3, 12, true);
        let orbitals = decompose(&shell, &mut rng());
        assert_eq!(orbitals[0].id, "3-s");
        assert_eq!(orbitals[1].id, "3-p-0");
        assert_eq!(orbitals[4].id, "3-d-0");
        assert!((orbitals[0].radius - shell.radius * 0.7).abs() < 1e-6);
        assert!((orbitals[1].radius - shell.radius).abs() < 1e-6);
        assert!((orbitals[4].radius - shell.radius * 1.15).abs() < 1e-6);
        assert!(orbitals.iter().all(|o| o.color == palette::ORBITAL_VALENCE));
    }

    #[test]
    fn test_phase_offsets_in_range() {
        let mut rng = rng();
        for z in [8u32, 18, 30] {
            let atom = Atom::new("X", "X", z, 0);
            for set in decompose_atom(&atom, &mut rng) {
                for o in &set.orbitals {
                    assert!((0.0..TAU).contains(&o.phase_offset));
                }
            }
        }
    }

    #[test]
    fn test_empty_shell_has_no_orbitals() {
        let shell = Shell::new(1, 0, false);
        assert!(decompose(&shell, &mut rng()).is_empty());
    }
}
