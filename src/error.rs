//! # Erros do Motor de Inferência
//!
//! Todas as operações públicas da biblioteca retornam
//! `Result<T, InferenceError>` — nenhuma entra em pânico.
//!
//! Os casos permissivos (predicado sem `/`, átomo ausente do mundo, Z = 0)
//! **não** são erros: são tratados com valores padrão documentados em cada
//! módulo. Esta enum cobre apenas o que não tem padrão razoável.

use thiserror::Error;

/// Erros que podem ocorrer ao gerar átomos ou enumerar mundos.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Especificação de predicado com aridade não numérica (ex: `Smokes/x`).
    #[error("predicado inválido '{spec}': aridade '{arity}' não é um inteiro não-negativo")]
    InvalidPredicate { spec: String, arity: String },

    /// O conjunto de átomos é grande demais para enumeração exata.
    #[error("{atoms} átomos exigem 2^{atoms} mundos; o limite configurado é {limit}")]
    TooManyAtoms { atoms: usize, limit: usize },

    /// A enumeração foi interrompida por um [`CancelToken`](crate::inference::CancelToken).
    #[error("enumeração cancelada após {worlds_scored} mundos")]
    Cancelled { worlds_scored: u64 },

    /// O prazo configurado expirou antes do fim da enumeração.
    #[error("prazo de {timeout_ms} ms excedido após {worlds_scored} mundos")]
    DeadlineExceeded { timeout_ms: u128, worlds_scored: u64 },

    /// Uma regra rígida `+∞` satisfeita domina a massa e a razão não é
    /// representável.
    #[error("overflow numérico: a massa de '{query}' é infinita")]
    NumericalOverflow { query: String },

    /// Regras `+∞` e `-∞` satisfeitas no mesmo mundo: o score é indefinido.
    #[error("score indefinido em {context}: regras rígidas +∞ e -∞ satisfeitas juntas")]
    IndeterminateScore { context: String },
}

/// Alias de conveniência usado em toda a biblioteca.
pub type Result<T> = std::result::Result<T, InferenceError>;
