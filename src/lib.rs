//! # Atomscope
//!
//! Animation data for stylized 3D atom and molecule visualizers.
//!
//! Atomscope builds the structure of an atom (electron shells, s/p/d
//! orbitals, a jittered nucleus) and of small molecules, then evaluates the
//! animation of that structure at any elapsed time. It does not draw
//! anything: a rendering backend calls [`Animate::advance`] once per frame
//! and gets plain positions, scales, colors and shader uniforms back.
//!
//! ## Quick Start
//!
//! ```ignore
//! use atomscope::prelude::*;
//!
//! fn main() {
//!     atomscope::logging::init();
//!
//!     let mut settings = SettingsStore::new(StoredSettings::new(MemoryStore::new()));
//!     settings.subscribe(|s| atomscope::logging::apply_settings(s));
//!
//!     let mut scene = SceneState::with_seed(7);
//!     let mut renderer = SceneRenderer::new();
//!     let mut clock = FrameClock::new();
//!
//!     loop {
//!         let state = renderer.frame(&mut scene, clock.tick(), settings.settings());
//!         // hand `state` to the renderer of your choice
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Structure
//!
//! [`build_shells`] fills shells 1 to 4 greedily with capacities
//! `[2, 8, 18, 32]`; anything past 60 electrons is dropped. [`decompose`]
//! splits a shell into at most one `s`, three `p` and five `d` orbitals.
//! Counts, radii and orientation order are deterministic; only presentation
//! jitter (tilts, phases, cloud points) comes from the caller's RNG.
//!
//! ### Animation
//!
//! Every engine implements [`Animate`], a pure function of
//! `(elapsed, &Settings)`:
//!
//! | Engine | Frame |
//! |--------|-------|
//! | [`ShellAnimator`] | electron positions on tilted rings, valence highlight |
//! | [`QuantumField`] | noise volume uniforms, particle cloud opacities |
//! | [`BondAnimator`] | blob approach, overlap pulse, density strip scale |
//! | [`SceneRenderer`] | all of the above plus background and float motion |
//!
//! Geometry is built when its inputs change and reused across frames.
//!
//! ### Settings
//!
//! [`SettingsStore`] owns the live [`Settings`]. Updates go through
//! [`SettingsStore::update`], which persists the result and notifies
//! subscribers before returning.

pub mod atom;
pub mod bohr;
pub mod bond;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod molecule;
pub mod orbital;
pub mod palette;
pub mod quantum;
pub mod scene;
pub mod settings;
pub mod shader;
pub mod storage;
pub mod time;
pub mod uniforms;

pub use bytemuck;
pub use glam::{Quat, Vec3, Vec4};

pub use atom::{build_shells, Atom, AtomPreset, NucleusLayout, Particle, ParticleKind, Shell};
pub use bohr::{BohrFrame, ShellAnimator, ShellOrbit, ValenceHighlight};
pub use bond::{BondAnimator, BondFrame, BondVisual};
pub use error::{SettingsError, StorageError};
pub use i18n::{Catalog, Localization, Translate};
pub use molecule::{Bond, Molecule};
pub use orbital::{decompose, decompose_atom, decompose_shell, Orbital, OrbitalSet, OrbitalType, Orientation};
pub use quantum::{CloudVertex, QuantumField, QuantumFrame};
pub use scene::{Animate, AtomFrame, LayoutKind, RenderState, SceneRenderer, SceneState};
pub use settings::{
    AtomMode, LoggingLevel, Settings, SettingsPatch, SettingsProvider, SettingsStore, StoredSettings, Theme,
    VisualizationMode,
};
pub use storage::{BlobStore, FileStore, MemoryStore};
pub use time::FrameClock;
pub use uniforms::{UniformSet, UniformValue};

/// Prelude module for convenient imports.
///
/// ```ignore
/// use atomscope::prelude::*;
/// ```
///
/// This imports the scene, settings and storage entry points, the
/// [`Animate`] trait, the atom and molecule builders, and glam's [`Vec3`].
pub mod prelude {
    pub use crate::atom::{Atom, AtomPreset};
    pub use crate::i18n::{Catalog, Localization, Translate};
    pub use crate::molecule::Molecule;
    pub use crate::scene::{Animate, AtomFrame, RenderState, SceneRenderer, SceneState};
    pub use crate::settings::{
        AtomMode, Settings, SettingsPatch, SettingsStore, StoredSettings, Theme, VisualizationMode,
    };
    pub use crate::storage::{BlobStore, FileStore, MemoryStore};
    pub use crate::time::FrameClock;
    pub use crate::{Quat, Vec3};
}
