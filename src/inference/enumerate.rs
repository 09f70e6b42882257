//! # Enumeração de Mundos e Função de Partição
//!
//! O [`Enumerator`] percorre **todos** os `2^K` mundos — sem poda, sem
//! amostragem — e acumula um [`Tally`]: a soma total dos scores (`Z`) e,
//! para cada filtro pedido, a soma restrita aos mundos em que todos os
//! átomos do filtro são verdadeiros.
//!
//! ## Paralelismo
//!
//! Cada mundo é independente, então o espaço `[0, 2^K)` é cortado em chunks
//! de `2^chunk_bits` mundos consecutivos, pontuados em paralelo com rayon:
//!
//! ```text
//! [0 ........ 2^K)
//!  ├─chunk 0─┤├─chunk 1─┤ ... ├─chunk n─┤     (rayon)
//!      ↓          ↓               ↓
//!   Tally₀     Tally₁   ...    Tallyₙ
//!      └──────────┴── soma na ordem dos chunks ──► Tally
//! ```
//!
//! A combinação final segue a ordem dos chunks, então o resultado é
//! idêntico bit a bit entre execuções, independente do escalonamento.
//! Para `K < parallel_threshold` a varredura é sequencial.
//!
//! ## Cancelamento
//!
//! Entre blocos de [`CHECK_INTERVAL`] mundos o enumerador verifica o
//! [`CancelToken`] e o prazo configurado.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::core::{world_count, CompiledRule, World, WorldIter};
use crate::error::{InferenceError, Result};

use super::scorer::log_score;

/// Mundos pontuados entre duas verificações de cancelamento/prazo.
pub const CHECK_INTERVAL: u64 = 1 << 12;

/// Sinal de cancelamento compartilhável entre threads.
///
/// Clonar o token compartilha o mesmo sinal.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Filtro de mundos: máscara de átomos que precisam ser verdadeiros.
///
/// `None` é um filtro insatisfazível (algum átomo está fora do domínio e,
/// pelo pressuposto de mundo fechado, é sempre falso).
pub type WorldFilter = Option<u64>;

/// Soma de scores guardada em espaço log, para que pesos grandes não
/// estourem nem zerem o `f64`.
///
/// Mantém o maior expoente visto (`max`) e a soma dos scores relativos a
/// ele, `Σ exp(lnᵢ - max)`, como em `log_sum_exp`:
///
/// ```text
/// ln(Σ exp(lnᵢ)) = max + ln(Σ exp(lnᵢ - max))
/// ```
///
/// Mundos com expoente `+∞` (regra rígida positiva satisfeita) deixam a
/// soma em `+∞`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogSum {
    max: f64,
    scaled: f64,
}

impl Default for LogSum {
    fn default() -> Self {
        Self {
            max: f64::NEG_INFINITY,
            scaled: 0.0,
        }
    }
}

impl LogSum {
    /// Acumula um score dado pelo seu expoente. `-∞` (score 0) não muda nada.
    #[inline]
    pub fn add(&mut self, ln: f64) {
        if ln == f64::NEG_INFINITY {
            return;
        }
        if ln > self.max {
            self.scaled = self.scaled * (self.max - ln).exp() + 1.0;
            self.max = ln;
        } else if ln == self.max {
            self.scaled += 1.0;
        } else {
            self.scaled += (ln - self.max).exp();
        }
    }

    /// Combina duas somas parciais (ex: de chunks diferentes).
    pub fn merge(&mut self, other: &LogSum) {
        if other.scaled == 0.0 {
            return;
        }
        if self.scaled == 0.0 {
            *self = *other;
            return;
        }
        let max = self.max.max(other.max);
        if max == f64::INFINITY {
            let weight = |s: &LogSum| if s.max == f64::INFINITY { s.scaled } else { 0.0 };
            self.scaled = weight(&*self) + weight(other);
        } else {
            self.scaled = self.scaled * (self.max - max).exp() + other.scaled * (other.max - max).exp();
        }
        self.max = max;
    }

    /// `ln(Σ score)`; `-∞` se nenhum mundo contribuiu.
    pub fn ln(&self) -> f64 {
        if self.scaled == 0.0 {
            return f64::NEG_INFINITY;
        }
        if self.max == f64::INFINITY {
            return f64::INFINITY;
        }
        self.max + self.scaled.ln()
    }

    /// `Σ score` fora do espaço log; pode estourar para `+∞` ou `0.0`.
    pub fn value(&self) -> f64 {
        self.ln().exp()
    }
}

/// Somas acumuladas durante uma enumeração.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tally {
    /// Soma de todos os scores — a função de partição `Z`.
    pub total: LogSum,
    /// Uma soma por filtro, na ordem em que os filtros foram passados.
    pub matched: Vec<LogSum>,
    /// Mundos pontuados.
    pub worlds: u64,
}

impl Tally {
    fn with_filters(n: usize) -> Self {
        Self {
            total: LogSum::default(),
            matched: vec![LogSum::default(); n],
            worlds: 0,
        }
    }

    #[inline]
    fn add(&mut self, world: &World, ln_score: f64, filters: &[WorldFilter]) {
        self.total.add(ln_score);
        self.worlds += 1;
        for (sum, filter) in self.matched.iter_mut().zip(filters) {
            if filter.is_some_and(|mask| world.satisfies(mask)) {
                sum.add(ln_score);
            }
        }
    }

    fn merge(mut self, other: &Tally) -> Self {
        self.total.merge(&other.total);
        self.worlds += other.worlds;
        for (a, b) in self.matched.iter_mut().zip(&other.matched) {
            a.merge(b);
        }
        self
    }
}

/// Enumerador exato sobre `K` átomos e um conjunto de regras compiladas.
pub struct Enumerator<'a> {
    rules: &'a [CompiledRule],
    atom_count: usize,
    config: &'a EngineConfig,
    cancel: Option<&'a CancelToken>,
}

impl<'a> Enumerator<'a> {
    /// Cria o enumerador, recusando `K` acima de
    /// [`EngineConfig::atom_limit`] antes de qualquer trabalho.
    pub fn new(rules: &'a [CompiledRule], atom_count: usize, config: &'a EngineConfig) -> Result<Self> {
        let limit = config.atom_limit();
        if atom_count > limit {
            return Err(InferenceError::TooManyAtoms {
                atoms: atom_count,
                limit,
            });
        }
        Ok(Self {
            rules,
            atom_count,
            config,
            cancel: None,
        })
    }

    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Número de mundos que uma enumeração completa visita.
    pub fn world_count(&self) -> u64 {
        world_count(self.atom_count)
    }

    /// Função de partição `Z = Σ score(x)` sobre todos os mundos.
    ///
    /// Pode ser `+∞` em `f64` mesmo com pesos finitos; use
    /// [`log_partition_function`](Enumerator::log_partition_function) para
    /// comparar ou dividir.
    pub fn partition_function(&self) -> Result<f64> {
        Ok(self.log_partition_function()?.exp())
    }

    /// `ln Z`.
    pub fn log_partition_function(&self) -> Result<f64> {
        Ok(self.tally(&[])?.total.ln())
    }

    /// Enumera todos os mundos e acumula `Z` e as somas filtradas.
    pub fn tally(&self, filters: &[WorldFilter]) -> Result<Tally> {
        let started = Instant::now();
        let deadline = self.config.timeout.map(|t| (started + t, t));
        let scored = AtomicU64::new(0);
        let n = self.world_count();
        let parallel = self.atom_count >= self.config.parallel_threshold;

        tracing::debug!(
            atoms = self.atom_count,
            worlds = n,
            rules = self.rules.len(),
            parallel,
            "Iniciando enumeração exata"
        );

        let tally = if parallel {
            let chunk = 1u64 << self.config.chunk_bits.min(62);
            let chunks = n.div_ceil(chunk);
            let partials = (0..chunks)
                .into_par_iter()
                .map(|c| {
                    let start = c * chunk;
                    let end = (start + chunk).min(n);
                    self.scan(start, end, filters, deadline, &scored)
                })
                .collect::<Result<Vec<Tally>>>()?;
            partials
                .iter()
                .fold(Tally::with_filters(filters.len()), Tally::merge)
        } else {
            self.scan(0, n, filters, deadline, &scored)?
        };

        tracing::debug!(
            worlds = tally.worlds,
            ln_z = tally.total.ln(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Enumeração concluída"
        );
        Ok(tally)
    }

    /// Pontua os mundos `[start, end)` sequencialmente.
    fn scan(
        &self,
        start: u64,
        end: u64,
        filters: &[WorldFilter],
        deadline: Option<(Instant, Duration)>,
        scored: &AtomicU64,
    ) -> Result<Tally> {
        let mut tally = Tally::with_filters(filters.len());
        for (done, world) in (0u64..).zip(WorldIter::range(start, end)) {
            if done % CHECK_INTERVAL == 0 {
                self.check(deadline, scored.load(Ordering::Relaxed) + done)?;
            }
            let ln_score = log_score(&world, self.rules);
            if ln_score.is_nan() {
                return Err(InferenceError::IndeterminateScore {
                    context: format!("mundo {:#b}", world.bits()),
                });
            }
            tally.add(&world, ln_score, filters);
        }
        scored.fetch_add(end - start, Ordering::Relaxed);
        Ok(tally)
    }

    fn check(&self, deadline: Option<(Instant, Duration)>, worlds_scored: u64) -> Result<()> {
        if self.cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(InferenceError::Cancelled { worlds_scored });
        }
        if let Some((at, timeout)) = deadline {
            if Instant::now() >= at {
                return Err(InferenceError::DeadlineExceeded {
                    timeout_ms: timeout.as_millis(),
                    worlds_scored,
                });
            }
        }
        Ok(())
    }
}
