//! # Consultas e Relatório
//!
//! Descreve as consultas que um arquivo de modelo (ou a CLI) pode pedir e
//! o relatório produzido ao executá-las.
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "kind")]` para produzir JSON com discriminador:
//!
//! ```json
//! { "kind": "conditional", "query": "Smokes(Anna)", "evidence": ["Smokes(Bob)"] }
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Model;
use crate::error::Result;
use crate::inference::QueryEngine;

/// Uma consulta a ser executada contra o modelo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuerySpec {
    /// `P(atom)`.
    Marginal { atom: String },
    /// Massa não normalizada dos mundos com todos os `atoms` verdadeiros.
    Joint { atoms: Vec<String> },
    /// `P(query | evidence)`.
    Conditional { query: String, evidence: Vec<String> },
    /// `Z`.
    PartitionFunction,
}

impl QuerySpec {
    /// Executa a consulta no motor.
    pub fn run(&self, engine: &QueryEngine) -> Result<f64> {
        match self {
            QuerySpec::Marginal { atom } => engine.marginal(atom),
            QuerySpec::Joint { atoms } => engine.joint(atoms),
            QuerySpec::Conditional { query, evidence } => engine.conditional(query, evidence),
            QuerySpec::PartitionFunction => engine.partition_function(),
        }
    }
}

/// Notação legível: `P(Smokes(Anna) | Smokes(Bob))`, `Z`, ...
impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuerySpec::Marginal { atom } => write!(f, "P({})", atom),
            QuerySpec::Joint { atoms } => write!(f, "joint({})", atoms.join(", ")),
            QuerySpec::Conditional { query, evidence } => {
                write!(f, "P({} | {})", query, evidence.join(", "))
            }
            QuerySpec::PartitionFunction => write!(f, "Z"),
        }
    }
}

/// Resultado de uma consulta: valor ou mensagem de erro.
#[derive(Clone, Debug, Serialize)]
pub struct QueryOutcome {
    pub query: QuerySpec,
    /// Notação legível da consulta.
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Relatório completo de uma execução, serializado com `--output json`.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub constants: usize,
    pub predicates: usize,
    pub rules: usize,
    pub atoms: usize,
    pub worlds: u64,
    pub results: Vec<QueryOutcome>,
}

impl Report {
    /// Executa todas as consultas. Uma consulta que falha não interrompe
    /// as demais — o erro fica registrado no resultado.
    pub fn run(model: &Model, engine: &QueryEngine, queries: &[QuerySpec]) -> Self {
        let results = queries
            .iter()
            .map(|query| {
                let started = std::time::Instant::now();
                let outcome = query.run(engine);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                match outcome {
                    Ok(value) => QueryOutcome {
                        query: query.clone(),
                        label: query.to_string(),
                        value: Some(value),
                        error: None,
                        elapsed_ms,
                    },
                    Err(e) => {
                        tracing::warn!(query = %query, error = %e, "Consulta falhou");
                        QueryOutcome {
                            query: query.clone(),
                            label: query.to_string(),
                            value: None,
                            error: Some(e.to_string()),
                            elapsed_ms,
                        }
                    }
                }
            })
            .collect();

        let index = engine.index();
        Self {
            generated_at: Utc::now(),
            constants: model.constants.len(),
            predicates: model.predicates.len(),
            rules: engine.rules().len(),
            atoms: index.len(),
            worlds: crate::core::world_count(index.len()),
            results,
        }
    }

    /// Uma linha por consulta: `P(Smokes(Anna)) = 0.6224`.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} constantes, {} predicados, {} regras → {} átomos, {} mundos\n",
            self.constants, self.predicates, self.rules, self.atoms, self.worlds
        );
        for r in &self.results {
            let line = match (&r.value, &r.error) {
                (Some(v), _) if matches!(r.query, QuerySpec::PartitionFunction | QuerySpec::Joint { .. }) => {
                    format!("{} = {:.6e}", r.label, v)
                }
                (Some(v), _) => format!("{} = {:.4}", r.label, v),
                (None, Some(e)) => format!("{} → erro: {}", r.label, e),
                (None, None) => format!("{} → sem resultado", r.label),
            };
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
