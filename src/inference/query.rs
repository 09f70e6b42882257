//! # Query Engine — Probabilidades Marginais, Conjuntas e Condicionais
//!
//! Todas as consultas usam a mesma primitiva: enumerar os mundos, filtrar
//! pelos literais que precisam ser verdadeiros e somar os scores.
//!
//! | Operador | Fórmula | Passadas |
//! |----------|---------|----------|
//! | [`joint`](QueryEngine::joint) | `Σ score(x)` onde todos os átomos são verdadeiros | 1 |
//! | [`marginal`](QueryEngine::marginal) | `joint(a) / Z` | 1 (Z e numerador juntos) |
//! | [`conditional`](QueryEngine::conditional) | `joint(e ∧ q) / joint(e)` | 1 (Z não é necessário) |
//!
//! Os literais são **positivos e conjuntivos** — não há negação.
//!
//! As somas são feitas em espaço log ([`LogSum`](super::LogSum)), e as
//! razões saem de `exp(ln num - ln den)`: pesos finitos grandes (±800)
//! não estouram nem zeram o resultado.
//!
//! ## Casos Degenerados
//!
//! - `Z = 0` ou evidência com massa zero (só mundos com regra `-∞`) → probabilidade `0.0`, nunca divisão por zero
//! - Literal fora do domínio → nunca é verdadeiro, massa `0.0` (com `warn`)
//! - Denominador `+∞` (regra rígida `+∞` satisfeita) → [`InferenceError::NumericalOverflow`]
//! - Regras `+∞` e `-∞` no mesmo mundo → [`InferenceError::IndeterminateScore`]
//!
//! ## Exemplo
//!
//! ```rust
//! use mln_exact::config::EngineConfig;
//! use mln_exact::core::Model;
//! use mln_exact::inference::QueryEngine;
//!
//! let engine = QueryEngine::new(&Model::smokers(), EngineConfig::default()).unwrap();
//! let p = engine.marginal("Smokes(Anna)").unwrap();
//! assert!(p > 0.5 && p < 1.0);
//!
//! let given = engine.conditional("Smokes(Anna)", &["Friends(Anna,Bob)", "Smokes(Bob)"]).unwrap();
//! assert!(given > p);
//! ```

use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::core::{AtomIndex, CompiledRule, GroundAtom, Model, PredicateSpec, WeightedRule, World};
use crate::error::{InferenceError, Result};

use super::enumerate::{CancelToken, Enumerator, WorldFilter};
use super::scorer::{log_score, score_world};

/// Motor de consultas sobre um modelo fixo.
///
/// Os átomos são indexados e as regras compiladas uma única vez na
/// construção; cada consulta é então uma enumeração pura.
pub struct QueryEngine {
    index: AtomIndex,
    rules: Vec<CompiledRule>,
    config: EngineConfig,
    cancel: CancelToken,
}

impl QueryEngine {
    /// Indexa os átomos e compila as regras do modelo.
    ///
    /// # Erros
    ///
    /// [`InferenceError::TooManyAtoms`] se o domínio excede o limite
    /// configurado — detectado aqui, antes de qualquer consulta.
    pub fn new(model: &Model, config: EngineConfig) -> Result<Self> {
        let index = model.atom_index();
        let limit = config.atom_limit();
        if index.len() > limit {
            return Err(InferenceError::TooManyAtoms {
                atoms: index.len(),
                limit,
            });
        }
        let rules = model.compile_rules(&index);
        tracing::debug!(
            constants = model.constants.len(),
            predicates = model.predicates.len(),
            atoms = index.len(),
            rules = rules.len(),
            "QueryEngine pronto"
        );
        Ok(Self {
            index,
            rules,
            config,
            cancel: CancelToken::new(),
        })
    }

    /// Usa um token externo para poder cancelar consultas em andamento.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn index(&self) -> &AtomIndex {
        &self.index
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn enumerator(&self) -> Result<Enumerator<'_>> {
        Ok(Enumerator::new(&self.rules, self.index.len(), &self.config)?.with_cancel(&self.cancel))
    }

    /// Converte literais em máscara de bits; `None` se algum literal está
    /// fora do domínio (e portanto nunca é verdadeiro).
    fn filter<S: AsRef<str>>(&self, atoms: &[S]) -> WorldFilter {
        let mut mask = 0u64;
        for atom in atoms {
            match self.index.id_of(atom.as_ref()) {
                Some(id) => mask |= 1u64 << id,
                None => {
                    tracing::warn!(atom = %atom.as_ref(), "Literal fora do domínio: massa zero");
                    return None;
                }
            }
        }
        Some(mask)
    }

    /// Score não normalizado de um mundo.
    pub fn score(&self, world: &World) -> f64 {
        score_world(world, &self.rules)
    }

    /// Função de partição `Z`. Pode ser `+∞` em `f64`; veja
    /// [`log_partition_function`](QueryEngine::log_partition_function).
    pub fn partition_function(&self) -> Result<f64> {
        Ok(self.log_partition_function()?.exp())
    }

    /// `ln Z`.
    pub fn log_partition_function(&self) -> Result<f64> {
        let ln_z = self.enumerator()?.log_partition_function()?;
        tracing::info!(atoms = self.index.len(), ln_z, "Função de partição calculada");
        Ok(ln_z)
    }

    /// Soma **não normalizada** dos scores dos mundos em que todos os
    /// `atoms` são verdadeiros.
    ///
    /// Lista vazia não filtra nada, então o resultado é `Z`.
    pub fn joint<S: AsRef<str>>(&self, atoms: &[S]) -> Result<f64> {
        Ok(self.log_joint(atoms)?.exp())
    }

    /// `ln joint(atoms)`; `-∞` quando a massa é zero.
    pub fn log_joint<S: AsRef<str>>(&self, atoms: &[S]) -> Result<f64> {
        let filter = self.filter(atoms);
        let tally = self.enumerator()?.tally(&[filter])?;
        let ln_mass = tally.matched[0].ln();
        tracing::info!(atoms = %join(atoms), ln_mass, "Consulta conjunta");
        Ok(ln_mass)
    }

    /// `P(atom) = joint(atom) / Z`, ou `0.0` se `Z = 0`.
    pub fn marginal(&self, atom: &str) -> Result<f64> {
        let filter = self.filter(&[atom]);
        let tally = self.enumerator()?.tally(&[filter])?;
        let ln_z = tally.total.ln();
        let p = ratio(tally.matched[0].ln(), ln_z, atom)?;
        tracing::info!(atom = %atom, ln_z, p, "Probabilidade marginal");
        Ok(p)
    }

    /// `P(query | evidence) = joint(evidence ∧ query) / joint(evidence)`.
    ///
    /// `Z` se cancela e não é usado. Evidência impossível (massa zero)
    /// resulta em `0.0`.
    pub fn conditional<S: AsRef<str>>(&self, query: &str, evidence: &[S]) -> Result<f64> {
        let given = self.filter(evidence);
        let both = given.zip(self.filter(&[query])).map(|(e, q)| e | q);
        let tally = self.enumerator()?.tally(&[given, both])?;
        let label = format!("{} | {}", query, join(evidence));
        let p = ratio(tally.matched[1].ln(), tally.matched[0].ln(), &label)?;
        tracing::info!(query = %query, evidence = %join(evidence), p, "Probabilidade condicional");
        Ok(p)
    }

    /// `P(world) = score(world) / Z`.
    ///
    /// Enumera todos os mundos para obter `Z`; para vários mundos calcule
    /// [`log_partition_function`](QueryEngine::log_partition_function) uma
    /// vez e use [`probability_with`](QueryEngine::probability_with).
    pub fn probability_of_world(&self, world: &World) -> Result<f64> {
        let ln_z = self.log_partition_function()?;
        self.probability_with(world, ln_z)
    }

    /// `P(world)` dado um `ln Z` já calculado. Não enumera.
    pub fn probability_with(&self, world: &World, ln_z: f64) -> Result<f64> {
        let ln_score = log_score(world, &self.rules);
        if ln_score.is_nan() {
            return Err(InferenceError::IndeterminateScore {
                context: format!("mundo {:#b}", world.bits()),
            });
        }
        ratio(ln_score, ln_z, "world")
    }
}

/// `exp(ln_num - ln_den)` com os padrões permissivos do motor.
///
/// `ln_num ≤ ln_den` sempre (o numerador é uma sub-soma).
fn ratio(ln_num: f64, ln_den: f64, query: &str) -> Result<f64> {
    if ln_den.is_nan() || ln_num.is_nan() {
        return Err(InferenceError::IndeterminateScore {
            context: format!("'{}'", query),
        });
    }
    if ln_den == f64::NEG_INFINITY {
        return Ok(0.0);
    }
    if ln_den == f64::INFINITY {
        return Err(InferenceError::NumericalOverflow {
            query: query.to_string(),
        });
    }
    Ok((ln_num - ln_den).exp())
}

fn join<S: AsRef<str>>(atoms: &[S]) -> String {
    atoms.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}

// ─── API funcional ───────────────────────────────────────────────
// Atalhos sem estado sobre (constantes, predicados, regras), com a
// configuração padrão + variáveis de ambiente.

fn engine_for<S: AsRef<str>>(
    constants: &[S],
    predicates: &[PredicateSpec],
    rules: &[WeightedRule],
) -> Result<QueryEngine> {
    let model = Model::new(
        constants.iter().map(|c| c.as_ref().to_string()).collect(),
        predicates.to_vec(),
        rules.to_vec(),
    );
    QueryEngine::new(&model, EngineConfig::default().with_env())
}

/// `Z` sobre um conjunto de átomos já gerado.
///
/// As regras são avaliadas sobre o domínio `constants` declarado.
pub fn compute_partition_function<S: AsRef<str>>(
    rules: &[WeightedRule],
    ground_atoms: &BTreeSet<GroundAtom>,
    constants: &[S],
) -> Result<f64> {
    let index = AtomIndex::new(ground_atoms.clone());
    let compiled: Vec<CompiledRule> = rules.iter().map(|r| r.compile(&index, constants)).collect();
    let config = EngineConfig::default().with_env();
    Enumerator::new(&compiled, index.len(), &config)?.partition_function()
}

pub fn compute_marginal<S: AsRef<str>>(
    atom: &str,
    constants: &[S],
    predicates: &[PredicateSpec],
    rules: &[WeightedRule],
) -> Result<f64> {
    engine_for(constants, predicates, rules)?.marginal(atom)
}

pub fn compute_joint<S: AsRef<str>, A: AsRef<str>>(
    atoms: &[A],
    constants: &[S],
    predicates: &[PredicateSpec],
    rules: &[WeightedRule],
) -> Result<f64> {
    engine_for(constants, predicates, rules)?.joint(atoms)
}

pub fn compute_conditional<S: AsRef<str>, E: AsRef<str>>(
    query: &str,
    evidence: &[E],
    constants: &[S],
    predicates: &[PredicateSpec],
    rules: &[WeightedRule],
) -> Result<f64> {
    engine_for(constants, predicates, rules)?.conditional(query, evidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{generate_ground_atoms, Formula};

    fn engine(model: &Model) -> QueryEngine {
        QueryEngine::new(model, EngineConfig::default()).unwrap()
    }

    fn unary_model(constants: &[&str], rules: Vec<WeightedRule>) -> Model {
        Model::new(
            constants.iter().map(|c| c.to_string()).collect(),
            vec![PredicateSpec::new("Smokes", 1)],
            rules,
        )
    }

    /// Cenário A: sem regras, todos os mundos pesam igual → 0.5
    #[test]
    fn test_uniform_marginal() {
        let model = unary_model(&["A", "B"], vec![]);
        let p = engine(&model).marginal("Smokes(A)").unwrap();
        assert!((p - 0.5).abs() < 1e-12);
    }

    /// Cenário B: peso positivo favorece o átomo, e há simetria
    #[test]
    fn test_positive_weight_and_symmetry() {
        let model = unary_model(&["Anna", "Bob"], vec![WeightedRule::smokes(0.5)]);
        let e = engine(&model);
        let anna = e.marginal("Smokes(Anna)").unwrap();
        let bob = e.marginal("Smokes(Bob)").unwrap();
        assert!(anna > 0.5);
        assert!((anna - bob).abs() < 1e-12);
        // Átomos independentes: sigmoid(0.5)
        assert!((anna - 1.0 / (1.0 + (-0.5f64).exp())).abs() < 1e-12);
    }

    /// P(Q | Q) = 1
    #[test]
    fn test_conditional_on_itself() {
        let e = engine(&Model::smokers());
        let p = e.conditional("Smokes(Anna)", &["Smokes(Anna)"]).unwrap();
        assert!((p - 1.0).abs() < 1e-12);
    }

    /// Um amigo fumante aumenta a probabilidade de fumar
    #[test]
    fn test_friendship_raises_probability() {
        let e = engine(&Model::smokers());
        let prior = e.marginal("Smokes(Anna)").unwrap();
        let posterior = e
            .conditional("Smokes(Anna)", &["Friends(Anna,Bob)", "Smokes(Bob)"])
            .unwrap();
        assert!(posterior > prior);
    }

    /// Condicional é a razão de duas conjuntas
    #[test]
    fn test_conditional_is_joint_ratio() {
        let e = engine(&Model::smokers());
        let num = e.joint(&["Friends(Anna,Bob)", "Smokes(Bob)", "Smokes(Anna)"]).unwrap();
        let den = e.joint(&["Friends(Anna,Bob)", "Smokes(Bob)"]).unwrap();
        let p = e.conditional("Smokes(Anna)", &["Friends(Anna,Bob)", "Smokes(Bob)"]).unwrap();
        assert!((p - num / den).abs() < 1e-12);
    }

    /// Conjunta sem literais é Z
    #[test]
    fn test_empty_joint_is_partition() {
        let e = engine(&Model::smokers());
        let none: [&str; 0] = [];
        let z = e.partition_function().unwrap();
        assert!((e.joint(&none).unwrap() - z).abs() / z < 1e-12);
    }

    /// Literal fora do domínio tem probabilidade 0
    #[test]
    fn test_unknown_literal() {
        let e = engine(&Model::smokers());
        assert_eq!(e.marginal("Cancer(Anna)").unwrap(), 0.0);
        assert_eq!(e.conditional("Smokes(Anna)", &["Smokes(Dave)"]).unwrap(), 0.0);
        assert_eq!(e.joint(&["Friends(Anna,Dave)"]).unwrap(), 0.0);
    }

    /// Evidência impossível sob regra rígida → 0, sem divisão por zero
    #[test]
    fn test_impossible_evidence() {
        let model = unary_model(&["A"], vec![WeightedRule::smokes(f64::NEG_INFINITY)]);
        let e = engine(&model);
        assert_eq!(e.conditional("Smokes(A)", &["Smokes(A)"]).unwrap(), 0.0);
        assert_eq!(e.marginal("Smokes(A)").unwrap(), 0.0);
    }

    /// Z = 0 → marginal 0
    #[test]
    fn test_zero_partition() {
        // Todo mundo pesa exp(-∞) = 0
        let e = engine(&unary_model(&["A"], vec![always_satisfied(f64::NEG_INFINITY)]));
        assert_eq!(e.partition_function().unwrap(), 0.0);
        assert_eq!(e.marginal("Smokes(A)").unwrap(), 0.0);
    }

    /// Regra `Smokes(x) ⇒ Smokes(x)`, satisfeita em todo mundo
    fn always_satisfied(weight: f64) -> WeightedRule {
        WeightedRule::new(
            "always",
            weight,
            Formula::Implication {
                antecedent: "Smokes".to_string(),
                consequent: "Smokes".to_string(),
            },
        )
    }

    /// Peso finito muito negativo não zera Z: todos os mundos empatam
    #[test]
    fn test_large_negative_weight() {
        let e = engine(&unary_model(&["A"], vec![always_satisfied(-800.0)]));
        assert!((e.marginal("Smokes(A)").unwrap() - 0.5).abs() < 1e-12);
        assert!((e.conditional("Smokes(A)", &["Smokes(A)"]).unwrap() - 1.0).abs() < 1e-12);
        let ln_z = e.log_partition_function().unwrap();
        assert!((ln_z - (-800.0 + 2f64.ln())).abs() < 1e-9);
    }

    /// Peso finito muito positivo não estoura: ainda 0.5
    #[test]
    fn test_large_positive_weight() {
        let e = engine(&unary_model(&["A"], vec![always_satisfied(800.0)]));
        assert!((e.marginal("Smokes(A)").unwrap() - 0.5).abs() < 1e-12);
        assert!((e.conditional("Smokes(A)", &["Smokes(A)"]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(e.partition_function().unwrap(), f64::INFINITY);
    }

    /// Peso 1000 num só mundo: probabilidade ≈ 1, sem overflow
    #[test]
    fn test_dominant_world() {
        let e = engine(&unary_model(&["A"], vec![WeightedRule::smokes(1000.0)]));
        assert!((e.marginal("Smokes(A)").unwrap() - 1.0).abs() < 1e-12);
    }

    /// Só uma regra rígida +∞ satisfeita torna a razão irrepresentável
    #[test]
    fn test_overflow() {
        let e = engine(&unary_model(&["A"], vec![WeightedRule::smokes(f64::INFINITY)]));
        let err = e.marginal("Smokes(A)").unwrap_err();
        assert!(matches!(err, InferenceError::NumericalOverflow { .. }));
    }

    /// +∞ e -∞ no mesmo mundo viram erro, nunca NaN
    #[test]
    fn test_indeterminate() {
        let e = engine(&unary_model(
            &["A"],
            vec![WeightedRule::smokes(f64::INFINITY), WeightedRule::smokes(f64::NEG_INFINITY)],
        ));
        assert!(matches!(
            e.marginal("Smokes(A)"),
            Err(InferenceError::IndeterminateScore { .. })
        ));
        assert!(matches!(
            e.probability_with(&World::from_bits(1), 0.0),
            Err(InferenceError::IndeterminateScore { .. })
        ));
    }

    /// Domínio grande demais é recusado na construção
    #[test]
    fn test_rejects_large_domain() {
        let config = EngineConfig {
            max_atoms: 8,
            ..EngineConfig::default()
        };
        assert!(matches!(
            QueryEngine::new(&Model::smokers(), config),
            Err(InferenceError::TooManyAtoms { atoms: 12, limit: 8 })
        ));
    }

    /// As probabilidades de todos os mundos somam 1
    #[test]
    fn test_world_probability() {
        let model = unary_model(&["A", "B"], vec![WeightedRule::smokes(0.7)]);
        let e = engine(&model);
        let ln_z = e.log_partition_function().unwrap();
        let total: f64 = crate::core::WorldIter::new(e.index().len())
            .map(|w| e.probability_with(&w, ln_z).unwrap())
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
        let everyone = World::from_bits(0b11);
        let p = e.probability_of_world(&everyone).unwrap();
        assert!((p - e.probability_with(&everyone, ln_z).unwrap()).abs() < 1e-15);
    }

    /// Token cancelado interrompe as consultas
    #[test]
    fn test_cancel_token() {
        let token = CancelToken::new();
        let e = engine(&Model::smokers()).with_cancel_token(token.clone());
        token.cancel();
        assert!(matches!(
            e.partition_function(),
            Err(InferenceError::Cancelled { .. })
        ));
        assert!(e.cancel_token().is_cancelled());
    }

    /// A API funcional concorda com o QueryEngine
    #[test]
    fn test_functional_api() {
        let model = Model::smokers();
        let p = compute_marginal("Smokes(Anna)", &model.constants, &model.predicates, &model.rules).unwrap();
        assert!((p - engine(&model).marginal("Smokes(Anna)").unwrap()).abs() < 1e-12);

        let atoms = generate_ground_atoms(&model.constants, &model.predicates);
        let z = compute_partition_function(&model.rules, &atoms, &model.constants).unwrap();
        assert!((z - engine(&model).partition_function().unwrap()).abs() / z < 1e-12);

        let c = compute_conditional("Smokes(Anna)", &["Smokes(Bob)"], &model.constants, &model.predicates, &model.rules).unwrap();
        let j = compute_joint(&["Smokes(Anna)"], &model.constants, &model.predicates, &model.rules).unwrap();
        assert!(c > 0.0 && c < 1.0);
        assert!(j > 0.0);
    }
}
