//! # Módulo Core — Tipos Fundamentais do Modelo
//!
//! Este módulo agrupa os tipos sobre os quais o motor de inferência opera:
//!
//! - [`PredicateSpec`] — Predicado com aridade (`Friends/2`)
//! - [`GroundAtom`] — Predicado aplicado a constantes (`Friends(Anna,Bob)`)
//! - [`AtomIndex`] — Interning dos átomos em ids densos `[0, K)`
//! - [`World`] — Atribuição total de verdade, como vetor de bits
//! - [`WeightedRule`] / [`Formula`] — Regras ponderadas e seus templates
//! - [`Model`] — Constantes + predicados + regras
//!
//! ## Fluxo
//!
//! ```text
//! constantes + predicados ──► AtomIndex ──► World (bits 0..K)
//!                                 │
//!           WeightedRule ──compile──► CompiledRule ──► nᵢ(world)
//! ```

/// Sub-módulo com [`PredicateSpec`], [`GroundAtom`] e [`AtomIndex`].
pub mod atom;

/// Sub-módulo com [`World`] e o iterador de mundos.
pub mod world;

/// Sub-módulo com [`WeightedRule`], [`Formula`] e [`CompiledRule`].
pub mod rule;

/// Sub-módulo com o [`Model`] completo e o exemplo embutido.
pub mod model;

// Re-exports para conveniência — permite usar `crate::core::World` diretamente.
pub use atom::{
    generate_ground_atoms, generate_ground_atoms_from_specs, AtomId, AtomIndex, GroundAtom,
    PredicateSpec,
};
pub use model::Model;
pub use rule::{CompiledRule, Formula, Grounding, WeightedRule};
pub use world::{world_count, World, WorldIter, MAX_WORLD_BITS};
