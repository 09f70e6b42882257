//! # Configuração do Motor
//!
//! [`EngineConfig`] reúne os limites da enumeração exata. As fontes, da
//! menor para a maior prioridade:
//!
//! ```text
//! Default ─► seção "engine" do arquivo de modelo ─► variáveis de ambiente ─► flags da CLI
//! ```
//!
//! | Campo | Padrão | Ambiente |
//! |-------|--------|----------|
//! | `max_atoms` | 24 | `MLN_MAX_ATOMS` |
//! | `parallel_threshold` | 12 | — |
//! | `chunk_bits` | 10 | — |
//! | `timeout` | nenhum | `MLN_TIMEOUT_MS` |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::MAX_WORLD_BITS;

/// Variável de ambiente que sobrescreve [`EngineConfig::max_atoms`].
pub const ENV_MAX_ATOMS: &str = "MLN_MAX_ATOMS";

/// Variável de ambiente que define [`EngineConfig::timeout`] em milissegundos.
pub const ENV_TIMEOUT_MS: &str = "MLN_TIMEOUT_MS";

/// Limites e parâmetros de paralelismo da enumeração.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maior número de átomos aceito (`2^max_atoms` mundos).
    /// Nunca passa de [`MAX_WORLD_BITS`].
    pub max_atoms: usize,
    /// Abaixo deste número de átomos a enumeração é sequencial — o custo
    /// de distribuir o trabalho supera o ganho.
    pub parallel_threshold: usize,
    /// Cada chunk paralelo cobre `2^chunk_bits` mundos consecutivos.
    pub chunk_bits: u32,
    /// Prazo máximo de uma enumeração. `None` = sem prazo.
    #[serde(with = "timeout_ms")]
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_atoms: 24,
            parallel_threshold: 12,
            chunk_bits: 10,
            timeout: None,
        }
    }
}

impl EngineConfig {
    /// Aplica as variáveis de ambiente sobre esta configuração.
    ///
    /// Valores não numéricos são ignorados com um `warn`.
    pub fn with_env(mut self) -> Self {
        if let Some(max_atoms) = read_env(ENV_MAX_ATOMS) {
            self.max_atoms = max_atoms as usize;
        }
        if let Some(ms) = read_env(ENV_TIMEOUT_MS) {
            self.timeout = Some(Duration::from_millis(ms));
        }
        self
    }

    /// Limite efetivo de átomos, respeitando a largura do vetor de bits.
    pub fn atom_limit(&self) -> usize {
        self.max_atoms.min(MAX_WORLD_BITS)
    }
}

fn read_env(key: &str) -> Option<u64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "Variável de ambiente inválida ignorada");
            None
        }
    }
}

/// `Option<Duration>` serializado como milissegundos inteiros (ou `null`).
mod timeout_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
