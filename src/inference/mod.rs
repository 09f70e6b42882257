//! # Módulo Inference — Inferência Exata por Enumeração
//!
//! Este módulo contém o **motor de inferência**: dado um [`Model`](crate::core::Model),
//! calcula probabilidades exatas somando o score de cada um dos `2^K`
//! mundos possíveis.
//!
//! ## Pipeline
//!
//! ```text
//! World ──► scorer::log_score ──► Σ wᵢ·nᵢ
//!                 ▲
//! Enumerator ─────┘  (2^K mundos, rayon)  ──► Tally { ln Z, somas filtradas em log }
//!                                                  │
//! QueryEngine ◄────────────────────────────────────┘
//!   marginal  = exp(ln joint(a) - ln Z)
//!   conditional = exp(ln joint(e ∧ q) - ln joint(e))
//! ```
//!
//! ## Complexidade
//!
//! `O(2^K · groundings)`. Exata por construção — passa a ser intratável
//! por volta de 20–25 átomos, por isso o limite em
//! [`EngineConfig::max_atoms`](crate::config::EngineConfig::max_atoms).

/// Sub-módulo com o score não normalizado de um mundo.
pub mod scorer;

/// Sub-módulo com a enumeração paralela e a função de partição.
pub mod enumerate;

/// Sub-módulo com o [`QueryEngine`] e a API funcional.
pub mod query;

pub use enumerate::{CancelToken, Enumerator, LogSum, Tally, WorldFilter};
pub use query::{
    compute_conditional, compute_joint, compute_marginal, compute_partition_function, QueryEngine,
};
pub use scorer::{log_score, score_assignments, score_world};
