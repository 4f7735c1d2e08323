//! Atom structure: particles, electron shells and the preset catalog.
//!
//! Shell layout is fully deterministic. Electrons are distributed greedily
//! over at most four shells with capacities `[2, 8, 18, 32]`; anything past
//! the 60th electron is dropped rather than spilling into a fifth shell, so
//! heavy elements render incompletely by design of the model.
//!
//! ```ignore
//! use atomscope::atom::{build_shells, Atom};
//!
//! let oxygen = Atom::new("Oxygen", "O", 8, 8);
//! assert_eq!(oxygen.shells.len(), 2);
//! assert!(oxygen.shells[1].is_valence);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;
use rand::Rng;

use crate::palette;

/// Maximum electrons per shell, indexed by `level - 1`.
pub const SHELL_CAPACITIES: [usize; 4] = [2, 8, 18, 32];

/// Highest number of electrons the shell builder will place.
pub const MAX_ELECTRONS: usize = 2 + 8 + 18 + 32;

static NEXT_PARTICLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique particle identity, only used for stable keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(u64);

impl ParticleId {
    fn next() -> Self {
        ParticleId(NEXT_PARTICLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Proton,
    Neutron,
    Electron,
}

impl ParticleKind {
    /// Elementary charge carried by this kind of particle.
    pub fn charge(self) -> i8 {
        match self {
            ParticleKind::Proton => 1,
            ParticleKind::Neutron => 0,
            ParticleKind::Electron => -1,
        }
    }
}

/// A proton, neutron or electron. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub charge: i8,
    /// Slot of an electron within its shell.
    pub position_index: Option<usize>,
}

impl Particle {
    pub fn new(kind: ParticleKind, position_index: Option<usize>) -> Self {
        Self {
            id: ParticleId::next(),
            kind,
            charge: kind.charge(),
            position_index,
        }
    }

    pub fn electron(position_index: usize) -> Self {
        Self::new(ParticleKind::Electron, Some(position_index))
    }
}

/// A principal energy level and the electrons it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    /// Principal level, starting at 1.
    pub level: u32,
    pub electrons: Vec<Particle>,
    pub radius: f32,
    /// True only for the outermost populated shell.
    pub is_valence: bool,
}

impl Shell {
    /// A shell at `level` holding `electron_count` fresh electrons.
    pub fn new(level: u32, electron_count: usize, is_valence: bool) -> Self {
        Self {
            level,
            electrons: (0..electron_count).map(Particle::electron).collect(),
            radius: shell_radius(level),
            is_valence,
        }
    }

    #[inline]
    pub fn electron_count(&self) -> usize {
        self.electrons.len()
    }

    /// Capacity of this shell's level, or 0 beyond level 4.
    pub fn capacity(&self) -> usize {
        capacity(self.level)
    }
}

/// Orbit radius for a principal level. Depends on nothing but the level.
#[inline]
pub fn shell_radius(level: u32) -> f32 {
    1.5 + level as f32 * 0.75
}

/// Capacity of a principal level (0 for unsupported levels).
pub fn capacity(level: u32) -> usize {
    match level {
        1..=4 => SHELL_CAPACITIES[level as usize - 1],
        _ => 0,
    }
}

/// Distribute `atomic_number` electrons over shells 1..=4.
///
/// Each shell takes `min(remaining, capacity)`. Electrons beyond
/// [`MAX_ELECTRONS`] are silently dropped.
pub fn build_shells(atomic_number: u32) -> Vec<Shell> {
    let mut counts = Vec::with_capacity(SHELL_CAPACITIES.len());
    let mut remaining = atomic_number as usize;

    for &cap in SHELL_CAPACITIES.iter() {
        if remaining == 0 {
            break;
        }
        let count = remaining.min(cap);
        counts.push(count);
        remaining -= count;
    }

    if remaining > 0 {
        log::debug!(
            target: "atom",
            "Z={} exceeds {} electrons, dropping {}",
            atomic_number,
            MAX_ELECTRONS,
            remaining
        );
    }

    let last = counts.len().saturating_sub(1);
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Shell::new(i as u32 + 1, count, i == last))
        .collect()
}

/// An element with its shell structure. A new selection always builds a new
/// `Atom`; existing atoms are never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,
    pub symbol: String,
    pub atomic_number: u32,
    pub neutrons: u32,
    pub shells: Vec<Shell>,
}

impl Atom {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, atomic_number: u32, neutrons: u32) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            atomic_number,
            neutrons,
            shells: build_shells(atomic_number),
        }
    }

    pub fn valence_shell(&self) -> Option<&Shell> {
        self.shells.iter().find(|s| s.is_valence)
    }

    /// Electrons actually placed in shells (capped at [`MAX_ELECTRONS`]).
    pub fn electron_count(&self) -> usize {
        self.shells.iter().map(Shell::electron_count).sum()
    }

    pub fn protons(&self) -> Vec<Particle> {
        (0..self.atomic_number)
            .map(|_| Particle::new(ParticleKind::Proton, None))
            .collect()
    }

    pub fn neutron_particles(&self) -> Vec<Particle> {
        (0..self.neutrons)
            .map(|_| Particle::new(ParticleKind::Neutron, None))
            .collect()
    }
}

impl Default for Atom {
    fn default() -> Self {
        AtomPreset::Oxygen.atom()
    }
}

/// The fixed catalog of atoms offered for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AtomPreset {
    Hydrogen,
    Helium,
    Carbon,
    Nitrogen,
    #[default]
    Oxygen,
    Neon,
    Sodium,
}

impl AtomPreset {
    pub const ALL: [AtomPreset; 7] = [
        AtomPreset::Hydrogen,
        AtomPreset::Helium,
        AtomPreset::Carbon,
        AtomPreset::Nitrogen,
        AtomPreset::Oxygen,
        AtomPreset::Neon,
        AtomPreset::Sodium,
    ];

    /// `(name, symbol, Z, N)`
    pub fn data(self) -> (&'static str, &'static str, u32, u32) {
        match self {
            AtomPreset::Hydrogen => ("Hydrogen", "H", 1, 0),
            AtomPreset::Helium => ("Helium", "He", 2, 2),
            AtomPreset::Carbon => ("Carbon", "C", 6, 6),
            AtomPreset::Nitrogen => ("Nitrogen", "N", 7, 7),
            AtomPreset::Oxygen => ("Oxygen", "O", 8, 8),
            AtomPreset::Neon => ("Neon", "Ne", 10, 10),
            AtomPreset::Sodium => ("Sodium", "Na", 11, 12),
        }
    }

    /// Lowercase key, used for translation lookups (`atom.presets.<key>.label`).
    pub fn key(self) -> &'static str {
        match self {
            AtomPreset::Hydrogen => "hydrogen",
            AtomPreset::Helium => "helium",
            AtomPreset::Carbon => "carbon",
            AtomPreset::Nitrogen => "nitrogen",
            AtomPreset::Oxygen => "oxygen",
            AtomPreset::Neon => "neon",
            AtomPreset::Sodium => "sodium",
        }
    }

    pub fn symbol(self) -> &'static str {
        self.data().1
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    pub fn atom(self) -> Atom {
        let (name, symbol, z, n) = self.data();
        Atom::new(name, symbol, z, n)
    }
}

/// Radius of a rendered nucleon sphere.
pub const NUCLEON_RADIUS: f32 = 0.12;

/// Half-size of the cube nucleons are scattered in.
const NUCLEUS_SPREAD: f32 = 0.3;

/// One rendered proton or neutron.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nucleon {
    pub kind: ParticleKind,
    pub position: Vec3,
    pub color: Vec3,
}

/// Jittered nucleon cluster shared by both visualizations.
///
/// Built once per `(protons, neutrons)` change; positions are static.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NucleusLayout {
    pub nucleons: Vec<Nucleon>,
}

impl NucleusLayout {
    pub fn generate<R: Rng + ?Sized>(protons: u32, neutrons: u32, rng: &mut R) -> Self {
        let total = protons + neutrons;
        let nucleons = (0..total)
            .map(|i| {
                let (kind, color) = if i < protons {
                    (ParticleKind::Proton, palette::PROTON)
                } else {
                    (ParticleKind::Neutron, palette::NEUTRON)
                };
                let position = Vec3::new(
                    rng.gen_range(-NUCLEUS_SPREAD..NUCLEUS_SPREAD),
                    rng.gen_range(-NUCLEUS_SPREAD..NUCLEUS_SPREAD),
                    rng.gen_range(-NUCLEUS_SPREAD..NUCLEUS_SPREAD),
                );
                Nucleon { kind, position, color }
            })
            .collect();
        Self { nucleons }
    }

    pub fn for_atom<R: Rng + ?Sized>(atom: &Atom, rng: &mut R) -> Self {
        Self::generate(atom.atomic_number, atom.neutrons, rng)
    }

    pub fn len(&self) -> usize {
        self.nucleons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nucleons.is_empty()
    }
}
