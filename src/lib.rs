//! # mln-exact — Inferência Exata em Markov Logic
//!
//! Calcula probabilidades **exatas** sobre um modelo de fórmulas ponderadas
//! no estilo Markov Logic: dadas constantes, predicados e regras com peso,
//! enumera todos os `2^K` mundos possíveis, pontua cada um com
//! `exp(Σ wᵢ · nᵢ)` e normaliza.
//!
//! ## Arquitetura
//!
//! ```text
//! core::atom       constantes × predicados ──► átomos ground (ids 0..K)
//! core::rule       regra ponderada ──► nᵢ(mundo)
//! inference::scorer   mundo ──► exp(Σ wᵢ·nᵢ)
//! inference::enumerate  2^K mundos (rayon) ──► Z + somas filtradas
//! inference::query     marginal / conjunta / condicional
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use mln_exact::config::EngineConfig;
//! use mln_exact::core::{Model, PredicateSpec, WeightedRule};
//! use mln_exact::inference::QueryEngine;
//!
//! let model = Model::new(
//!     vec!["Anna".into(), "Bob".into()],
//!     vec![PredicateSpec::parse("Smokes/1").unwrap()],
//!     vec![WeightedRule::smokes(0.5)],
//! );
//! let engine = QueryEngine::new(&model, EngineConfig::default()).unwrap();
//! assert!(engine.marginal("Smokes(Anna)").unwrap() > 0.5);
//! ```
//!
//! Fora do escopo: amostragem (MCMC), inferência lifted, aprendizado de
//! pesos e negação nos literais de consulta.

/// Módulo `config` — limites da enumeração e overrides por ambiente.
pub mod config;

/// Módulo `core` — átomos, mundos, regras e modelo.
pub mod core;

/// Módulo `error` — a enum [`InferenceError`](error::InferenceError).
pub mod error;

/// Módulo `inference` — scorer, enumerador e motor de consultas.
pub mod inference;

/// Módulo `persistence` — leitura de modelos em JSON.
pub mod persistence;

/// Módulo `report` — consultas declarativas e relatório de resultados.
pub mod report;

pub use error::{InferenceError, Result};
