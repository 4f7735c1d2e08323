//! Toy molecules built from [`Atom`]s.
//!
//! Atoms are shared through [`Arc`]: a bond points at the same atom value the
//! molecule lists, and one atom can anchor several bonds. Removing an atom
//! from the list does not touch the bonds, so a bond may keep referring to an
//! atom the molecule no longer lists.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::atom::{Atom, AtomPreset};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Smallest strength a bond may carry; strengths live in `(0, 1]`.
pub const MIN_STRENGTH: f32 = 1e-3;

/// Strength of each O-H bond in water.
pub const WATER_BOND_STRENGTH: f32 = 0.8;

/// Strength of a hydrogen appended with [`Molecule::add_hydrogen`].
pub const ADDED_HYDROGEN_STRENGTH: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub id: u64,
    pub from: Arc<Atom>,
    pub to: Arc<Atom>,
    /// Visual tightness in `(0, 1]`.
    pub strength: f32,
}

impl Bond {
    /// Strength is clamped into `(0, 1]`; non-finite input becomes 1.
    pub fn new(from: Arc<Atom>, to: Arc<Atom>, strength: f32) -> Self {
        let strength = if strength.is_finite() {
            strength.clamp(MIN_STRENGTH, 1.0)
        } else {
            1.0
        };
        Self {
            id: next_id(),
            from,
            to,
            strength,
        }
    }

    pub fn label(&self) -> String {
        format!(
            "{}–{} ({}%)",
            self.from.symbol,
            self.to.symbol,
            (self.strength * 100.0).round() as u32
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    pub id: u64,
    pub name: String,
    pub atoms: Vec<Arc<Atom>>,
    pub bonds: Vec<Bond>,
}

impl Molecule {
    pub fn new(name: impl Into<String>, atoms: Vec<Arc<Atom>>, bonds: Vec<Bond>) -> Self {
        Self {
            id: next_id(),
            name: name.into(),
            atoms,
            bonds,
        }
    }

    /// One oxygen bonded to two hydrogens.
    pub fn water() -> Self {
        let oxygen = Arc::new(AtomPreset::Oxygen.atom());
        let h1 = Arc::new(AtomPreset::Hydrogen.atom());
        let h2 = Arc::new(AtomPreset::Hydrogen.atom());
        let bonds = vec![
            Bond::new(oxygen.clone(), h1.clone(), WATER_BOND_STRENGTH),
            Bond::new(oxygen.clone(), h2.clone(), WATER_BOND_STRENGTH),
        ];
        Self::new("Water", vec![oxygen, h1, h2], bonds)
    }

    /// Star topology: the first atom bonds to every other atom with strength
    /// `0.6 + 0.1 * i`.
    pub fn custom(atoms: Vec<Atom>) -> Self {
        let atoms: Vec<Arc<Atom>> = atoms.into_iter().map(Arc::new).collect();
        let bonds = match atoms.split_first() {
            Some((center, rest)) => rest
                .iter()
                .enumerate()
                .map(|(i, atom)| Bond::new(center.clone(), atom.clone(), 0.6 + i as f32 * 0.1))
                .collect(),
            None => Vec::new(),
        };
        Self::new("Custom molecule", atoms, bonds)
    }

    /// Append a hydrogen bonded from the first atom. No-op when empty.
    pub fn add_hydrogen(&mut self) {
        let Some(center) = self.atoms.first().cloned() else {
            log::warn!(target: "molecule", "cannot add hydrogen to an empty molecule");
            return;
        };
        let hydrogen = Arc::new(AtomPreset::Hydrogen.atom());
        self.bonds
            .push(Bond::new(center, hydrogen.clone(), ADDED_HYDROGEN_STRENGTH));
        self.atoms.push(hydrogen);
        log::debug!(target: "molecule", "{} now has {} atoms", self.name, self.atoms.len());
    }

    /// Remove and return the atom at `index`. Bonds are left as they are.
    pub fn remove_atom(&mut self, index: usize) -> Option<Arc<Atom>> {
        if index < self.atoms.len() {
            Some(self.atoms.remove(index))
        } else {
            None
        }
    }

    /// Bonds whose endpoints are not both listed in `atoms`.
    pub fn dangling_bonds(&self) -> impl Iterator<Item = &Bond> {
        self.bonds.iter().filter(move |b| {
            !(self.atoms.iter().any(|a| Arc::ptr_eq(a, &b.from))
                && self.atoms.iter().any(|a| Arc::ptr_eq(a, &b.to)))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl Default for Molecule {
    fn default() -> Self {
        Self::water()
    }
}
