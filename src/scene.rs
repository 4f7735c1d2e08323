//! Scene composition.
//!
//! [`SceneState`] is what the user has selected: an atom, a molecule and the
//! random source presentation jitter is drawn from. [`SceneRenderer`] turns
//! that selection plus [`Settings`] into per-frame [`RenderState`] values.
//!
//! Building geometry (orbits, orbital fields, nucleus, bond visuals) is the
//! expensive part, so the renderer memoizes each piece against the inputs it
//! depends on and rebuilds only when one of those changes. Per frame it only
//! evaluates the [`Animate`] implementations.
//!
//! # Example
//!
//! ```ignore
//! let mut scene = SceneState::with_seed(42);
//! let mut renderer = SceneRenderer::new();
//! let mut clock = FrameClock::new();
//!
//! loop {
//!     let state = renderer.frame(&mut scene, clock.tick(), store.settings());
//!     backend.draw(&state);
//! }
//! ```

use std::sync::Arc;

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::atom::{Atom, AtomPreset, NucleusLayout};
use crate::bohr::{BohrFrame, ShellAnimator};
use crate::bond::{BondAnimator, BondFrame};
use crate::molecule::Molecule;
use crate::palette;
use crate::quantum::{QuantumField, QuantumFrame};
use crate::settings::{AtomMode, Settings, Theme, VisualizationMode};

/// Something that can be evaluated at an elapsed time.
///
/// Implementations must be pure in `(elapsed, settings)`: calling `advance`
/// twice with the same arguments yields the same frame.
pub trait Animate {
    type Frame;

    fn advance(&self, elapsed: f32, settings: &Settings) -> Self::Frame;
}

/// Viewport width below which the mobile layout is used.
pub const MOBILE_BREAKPOINT: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Mobile,
    Desktop,
}

impl LayoutKind {
    pub fn for_width(width_px: u32) -> Self {
        if width_px < MOBILE_BREAKPOINT {
            LayoutKind::Mobile
        } else {
            LayoutKind::Desktop
        }
    }
}

pub fn background(theme: Theme) -> Vec3 {
    match theme {
        Theme::Light => palette::BACKGROUND_LIGHT,
        Theme::Dark | Theme::System => palette::BACKGROUND_DARK,
    }
}

/// Idle bob applied to the whole atom group.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatMotion {
    /// XYZ Euler angles in radians.
    pub rotation: Vec3,
    pub offset_y: f32,
}

pub const FLOAT_ROTATION_INTENSITY: f32 = 0.4;
pub const FLOAT_INTENSITY: f32 = 0.6;

impl FloatMotion {
    pub fn at(elapsed: f32, settings: &Settings) -> Self {
        if settings.reduced_motion {
            return Self::default();
        }
        let u = elapsed / 4.0 * settings.animation_speed;
        Self {
            rotation: Vec3::new(u.cos() / 8.0, u.sin() / 8.0, u.sin() / 20.0) * FLOAT_ROTATION_INTENSITY,
            offset_y: u.sin() / 10.0 * FLOAT_INTENSITY,
        }
    }
}

/// The current selection.
#[derive(Debug, Clone)]
pub struct SceneState {
    atom: Arc<Atom>,
    preset: Option<AtomPreset>,
    molecule: Molecule,
    rng: SmallRng,
}

impl SceneState {
    /// Oxygen and water, with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_entropy())
    }

    /// Same as [`new`](Self::new) but reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            atom: Arc::new(AtomPreset::Oxygen.atom()),
            preset: Some(AtomPreset::Oxygen),
            molecule: Molecule::water(),
            rng,
        }
    }

    pub fn atom(&self) -> &Arc<Atom> {
        &self.atom
    }

    /// `None` when a custom atom is selected.
    pub fn preset(&self) -> Option<AtomPreset> {
        self.preset
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    pub fn molecule_mut(&mut self) -> &mut Molecule {
        &mut self.molecule
    }

    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    pub fn select_preset(&mut self, preset: AtomPreset) {
        log::info!(target: "home", "selected {}", preset.key());
        self.atom = Arc::new(preset.atom());
        self.preset = Some(preset);
    }

    pub fn select_atom(&mut self, atom: Atom) {
        log::info!(target: "home", "selected custom atom {} (Z={})", atom.symbol, atom.atomic_number);
        self.atom = Arc::new(atom);
        self.preset = None;
    }

    pub fn set_molecule(&mut self, molecule: Molecule) {
        self.molecule = molecule;
    }

    pub fn add_hydrogen(&mut self) {
        self.molecule.add_hydrogen();
    }

    /// Back to oxygen and water. The random source is kept.
    pub fn reset(&mut self) {
        log::info!(target: "molecule", "scene reset");
        self.atom = Arc::new(AtomPreset::Oxygen.atom());
        self.preset = Some(AtomPreset::Oxygen);
        self.molecule = Molecule::water();
    }
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BohrKey {
    atomic_number: u32,
    radii: Vec<u32>,
    mode: AtomMode,
}

impl BohrKey {
    fn of(atom: &Atom, mode: AtomMode) -> Self {
        Self {
            atomic_number: atom.atomic_number,
            radii: atom.shells.iter().map(|s| s.radius.to_bits()).collect(),
            mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct BondKey {
    molecule: u64,
    bonds: Vec<u64>,
}

impl BondKey {
    fn of(molecule: &Molecule) -> Self {
        Self {
            molecule: molecule.id,
            bonds: molecule.bonds.iter().map(|b| b.id).collect(),
        }
    }
}

#[derive(Debug, Clone)]
enum AtomView {
    Bohr { key: BohrKey, animator: ShellAnimator },
    Quantum { atomic_number: u32, field: QuantumField },
}

/// What the atom part of the scene looks like this frame.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomFrame {
    Bohr(BohrFrame),
    Quantum(QuantumFrame),
    /// Nothing has been built yet.
    Empty,
}

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub background: Vec3,
    pub nucleus: Arc<NucleusLayout>,
    pub atom: AtomFrame,
    pub bonds: Vec<BondFrame>,
    pub float: FloatMotion,
}

/// Memoizing scene builder and per-frame evaluator.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderer {
    view: Option<AtomView>,
    nucleus: Arc<NucleusLayout>,
    nucleus_key: Option<(u32, u32)>,
    bonds: BondAnimator,
    bond_key: Option<BondKey>,
    rebuilds: u64,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild whatever no longer matches `scene` and `settings`.
    pub fn sync(&mut self, scene: &mut SceneState, settings: &Settings) {
        let atom = scene.atom.clone();

        let nucleus_key = (atom.atomic_number, atom.neutrons);
        if self.nucleus_key != Some(nucleus_key) {
            self.nucleus = Arc::new(NucleusLayout::for_atom(&atom, &mut scene.rng));
            self.nucleus_key = Some(nucleus_key);
            self.rebuilds += 1;
        }

        let view_is_current = match (&self.view, settings.visualization_mode) {
            (Some(AtomView::Bohr { key, .. }), VisualizationMode::Bohr) => *key == BohrKey::of(&atom, settings.atom_mode),
            (Some(AtomView::Quantum { atomic_number, .. }), VisualizationMode::Quantum) => {
                *atomic_number == atom.atomic_number
            }
            _ => false,
        };
        if !view_is_current {
            self.view = Some(match settings.visualization_mode {
                VisualizationMode::Bohr => AtomView::Bohr {
                    key: BohrKey::of(&atom, settings.atom_mode),
                    animator: ShellAnimator::new(&atom, settings.atom_mode, &mut scene.rng),
                },
                VisualizationMode::Quantum => AtomView::Quantum {
                    atomic_number: atom.atomic_number,
                    field: QuantumField::new(&atom, &mut scene.rng),
                },
            });
            self.rebuilds += 1;
            log::debug!(
                target: "scene",
                "rebuilt {:?} view for {}",
                settings.visualization_mode,
                atom.symbol
            );
        }

        let bond_key = BondKey::of(&scene.molecule);
        if self.bond_key.as_ref() != Some(&bond_key) {
            self.bonds = BondAnimator::new(&scene.molecule, &mut scene.rng);
            self.bond_key = Some(bond_key);
            self.rebuilds += 1;
        }
    }

    /// [`sync`](Self::sync) then [`advance`](Animate::advance).
    pub fn frame(&mut self, scene: &mut SceneState, elapsed: f32, settings: &Settings) -> RenderState {
        self.sync(scene, settings);
        self.advance(elapsed, settings)
    }

    /// How many pieces have been (re)built so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    pub fn shell_animator(&self) -> Option<&ShellAnimator> {
        match &self.view {
            Some(AtomView::Bohr { animator, .. }) => Some(animator),
            _ => None,
        }
    }

    pub fn quantum_field(&self) -> Option<&QuantumField> {
        match &self.view {
            Some(AtomView::Quantum { field, .. }) => Some(field),
            _ => None,
        }
    }

    pub fn bond_animator(&self) -> &BondAnimator {
        &self.bonds
    }

    pub fn nucleus(&self) -> &Arc<NucleusLayout> {
        &self.nucleus
    }
}

impl Animate for SceneRenderer {
    type Frame = RenderState;

    fn advance(&self, elapsed: f32, settings: &Settings) -> RenderState {
        let atom = match &self.view {
            Some(AtomView::Bohr { animator, .. }) => AtomFrame::Bohr(animator.advance(elapsed, settings)),
            Some(AtomView::Quantum { field, .. }) => AtomFrame::Quantum(field.advance(elapsed, settings)),
            None => AtomFrame::Empty,
        };
        RenderState {
            background: background(settings.theme),
            nucleus: self.nucleus.clone(),
            atom,
            bonds: self.bonds.advance(elapsed, settings),
            float: FloatMotion::at(elapsed, settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_breakpoint() {
        assert_eq!(LayoutKind::for_width(375), LayoutKind::Mobile);
        assert_eq!(LayoutKind::for_width(1023), LayoutKind::Mobile);
        assert_eq!(LayoutKind::for_width(1024), LayoutKind::Desktop);
    }

    #[test]
    fn test_background() {
        assert_eq!(background(Theme::Light), palette::BACKGROUND_LIGHT);
        assert_eq!(background(Theme::Dark), palette::BACKGROUND_DARK);
        assert_eq!(background(Theme::System), palette::BACKGROUND_DARK);
    }

    #[test]
    fn test_float_motion() {
        let settings = Settings::default();
        let start = FloatMotion::at(0.0, &settings);
        assert!((start.rotation.x - 0.05).abs() < 1e-6);
        assert_eq!(start.offset_y, 0.0);
        let later = FloatMotion::at(4.0 * std::f32::consts::FRAC_PI_2, &settings);
        assert!((later.offset_y - 0.06).abs() < 1e-6);

        let reduced = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert_eq!(FloatMotion::at(3.0, &reduced), FloatMotion::default());
    }

    #[test]
    fn test_scene_state_selection() {
        let mut scene = SceneState::with_seed(1);
        assert_eq!(scene.preset(), Some(AtomPreset::Oxygen));
        assert_eq!(scene.molecule().atoms.len(), 3);

        scene.select_preset(AtomPreset::Neon);
        assert_eq!(scene.atom().atomic_number, 10);
        scene.select_atom(Atom::new("Argon", "Ar", 18, 22));
        assert_eq!(scene.preset(), None);

        scene.add_hydrogen();
        assert_eq!(scene.molecule().atoms.len(), 4);
        scene.reset();
        assert_eq!(scene.atom().symbol, "O");
        assert_eq!(scene.molecule().atoms.len(), 3);
    }

    #[test]
    fn test_renderer_memoizes() {
        let mut scene = SceneState::with_seed(9);
        let mut renderer = SceneRenderer::new();
        let settings = Settings::default();

        renderer.sync(&mut scene, &settings);
        let built = renderer.rebuilds();
        assert_eq!(built, 3);
        for i in 0..10 {
            renderer.frame(&mut scene, i as f32 * 0.016, &settings);
        }
        assert_eq!(renderer.rebuilds(), built);

        let faster = Settings {
            animation_speed: 2.0,
            reduced_motion: true,
            ..Settings::default()
        };
        renderer.sync(&mut scene, &faster);
        assert_eq!(renderer.rebuilds(), built);

        let simplified = Settings {
            atom_mode: AtomMode::Simplified,
            ..Settings::default()
        };
        renderer.sync(&mut scene, &simplified);
        assert_eq!(renderer.rebuilds(), built + 1);

        scene.add_hydrogen();
        renderer.sync(&mut scene, &simplified);
        assert_eq!(renderer.rebuilds(), built + 2);
        assert_eq!(renderer.bond_animator().visuals().len(), 3);
    }

    #[test]
    fn test_mode_switch_swaps_view() {
        let mut scene = SceneState::with_seed(2);
        let mut renderer = SceneRenderer::new();
        let quantum = Settings {
            visualization_mode: VisualizationMode::Quantum,
            ..Settings::default()
        };

        let state = renderer.frame(&mut scene, 1.0, &Settings::default());
        assert!(matches!(state.atom, AtomFrame::Bohr(_)));
        assert!(renderer.shell_animator().is_some());

        let state = renderer.frame(&mut scene, 1.0, &quantum);
        assert!(matches!(state.atom, AtomFrame::Quantum(_)));
        assert!(renderer.shell_animator().is_none());
        assert!(renderer.quantum_field().is_some());
    }

    #[test]
    fn test_nucleus_rebuilt_on_atom_change() {
        let mut scene = SceneState::with_seed(4);
        let mut renderer = SceneRenderer::new();
        let settings = Settings::default();
        let first = renderer.frame(&mut scene, 0.0, &settings);
        assert_eq!(first.nucleus.len(), 16);

        scene.select_preset(AtomPreset::Helium);
        let second = renderer.frame(&mut scene, 0.0, &settings);
        assert_eq!(second.nucleus.len(), 4);
        assert!(!Arc::ptr_eq(&first.nucleus, &second.nucleus));
    }

    #[test]
    fn test_unsynced_renderer_is_empty() {
        let renderer = SceneRenderer::new();
        let state = renderer.advance(1.0, &Settings::default());
        assert_eq!(state.atom, AtomFrame::Empty);
        assert!(state.bonds.is_empty());
        assert!(state.nucleus.is_empty());
    }
}
