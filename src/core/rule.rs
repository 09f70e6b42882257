//! # Regras Ponderadas — O Conhecimento do Modelo
//!
//! Uma [`WeightedRule`] é um par (peso, fórmula). A fórmula define, para um
//! mundo e um domínio de constantes, **quantas groundings** dela são
//! satisfeitas — o `nᵢ(x)` da distribuição de Markov Logic:
//!
//! ```text
//! P(x) = exp(Σᵢ wᵢ · nᵢ(x)) / Z
//! ```
//!
//! ## Fórmulas Suportadas
//!
//! | Tipo | Fórmula | Groundings |
//! |------|---------|------------|
//! | [`Formula::Unary`] | `P(x)` | uma por constante |
//! | [`Formula::Implication`] | `A(x) ⇒ C(x)` | uma por constante |
//! | [`Formula::PairwiseEquivalence`] | `R(x,y) ⇒ (P(x) ⇔ P(y))` | uma por par ordenado, incluindo x = y |
//!
//! As implicações são avaliadas pela forma equivalente `¬A ∨ B`.
//!
//! ## Compilação
//!
//! Avaliar uma regra por strings em cada um dos `2^K` mundos seria caro.
//! [`WeightedRule::compile`] resolve **uma vez** os ids de todos os átomos
//! de todas as groundings; a [`CompiledRule`] resultante só faz leituras de
//! bits. Átomos fora do índice viram `None` e são falsos em qualquer mundo.
//!
//! ## Exemplo
//!
//! ```rust
//! use mln_exact::core::{AtomIndex, PredicateSpec, WeightedRule, World};
//!
//! let constants = ["Anna", "Bob"];
//! let index = AtomIndex::build(&constants, &[PredicateSpec::new("Smokes", 1)]);
//! let rule = WeightedRule::smokes(0.5);
//!
//! let world = World::from_assignments(&index, [("Smokes(Anna)", true)])?;
//! assert_eq!(rule.evaluate(&world, &index, &constants), 1);
//! # Ok::<(), mln_exact::InferenceError>(())
//! ```

use serde::{Deserialize, Serialize};

use super::atom::{AtomId, AtomIndex};
use super::world::World;

/// Template lógico de uma regra, com seus próprios parâmetros.
///
/// Serializado com a tag `kind` (ex: `{"kind": "unary", "predicate": "Smokes"}`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// `∀x. P(x)` — conta as constantes com `P(x)` verdadeiro.
    Unary { predicate: String },
    /// `∀x. A(x) ⇒ C(x)` — conta as constantes com `¬A(x) ∨ C(x)`.
    Implication { antecedent: String, consequent: String },
    /// `∀x,y. R(x,y) ⇒ (P(x) ⇔ P(y))` — conta os pares ordenados com
    /// `¬R(x,y) ∨ (P(x) = P(y))`.
    PairwiseEquivalence { relation: String, property: String },
}

impl Formula {
    /// Resolve todas as groundings desta fórmula sobre o domínio completo.
    ///
    /// O domínio é sempre o declarado pelo chamador — nunca inferido dos
    /// átomos presentes num mundo.
    pub fn ground<S: AsRef<str>>(&self, index: &AtomIndex, constants: &[S]) -> Vec<Grounding> {
        match self {
            Formula::Unary { predicate } => constants
                .iter()
                .map(|x| Grounding::Fact(index.lookup(predicate, &[x.as_ref()])))
                .collect(),
            Formula::Implication {
                antecedent,
                consequent,
            } => constants
                .iter()
                .map(|x| Grounding::Implies {
                    antecedent: index.lookup(antecedent, &[x.as_ref()]),
                    consequent: index.lookup(consequent, &[x.as_ref()]),
                })
                .collect(),
            Formula::PairwiseEquivalence { relation, property } => {
                let mut groundings = Vec::with_capacity(constants.len() * constants.len());
                for x in constants {
                    for y in constants {
                        let (x, y) = (x.as_ref(), y.as_ref());
                        groundings.push(Grounding::GuardedEquivalence {
                            guard: index.lookup(relation, &[x, y]),
                            left: index.lookup(property, &[x]),
                            right: index.lookup(property, &[y]),
                        });
                    }
                }
                groundings
            }
        }
    }
}

/// Uma grounding já resolvida para ids de átomos.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grounding {
    /// Satisfeita se o átomo é verdadeiro.
    Fact(Option<AtomId>),
    /// Satisfeita se `¬antecedent ∨ consequent`.
    Implies {
        antecedent: Option<AtomId>,
        consequent: Option<AtomId>,
    },
    /// Satisfeita se `¬guard ∨ (left = right)`.
    GuardedEquivalence {
        guard: Option<AtomId>,
        left: Option<AtomId>,
        right: Option<AtomId>,
    },
}

impl Grounding {
    #[inline]
    pub fn holds(&self, world: &World) -> bool {
        match *self {
            Grounding::Fact(atom) => world.holds(atom),
            Grounding::Implies {
                antecedent,
                consequent,
            } => !world.holds(antecedent) || world.holds(consequent),
            Grounding::GuardedEquivalence { guard, left, right } => {
                !world.holds(guard) || world.holds(left) == world.holds(right)
            }
        }
    }
}

/// Regra ponderada imutável: nome (só para logs), peso e fórmula.
///
/// A avaliação é uma função pura de (mundo, domínio) — sem estado interno,
/// portanto segura para chamar em paralelo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightedRule {
    /// Nome legível usado nos logs.
    #[serde(default)]
    pub name: String,
    /// Peso `wᵢ`. Positivo favorece mundos que satisfazem a regra;
    /// `±∞` funciona como regra rígida.
    pub weight: f64,
    pub formula: Formula,
}

impl WeightedRule {
    pub fn new(name: impl Into<String>, weight: f64, formula: Formula) -> Self {
        Self {
            name: name.into(),
            weight,
            formula,
        }
    }

    /// `Friends(x,y) ⇒ (Smokes(x) ⇔ Smokes(y))` — amigos têm o mesmo hábito.
    pub fn friends_smokes(weight: f64) -> Self {
        Self::new(
            "friends_smokes",
            weight,
            Formula::PairwiseEquivalence {
                relation: "Friends".to_string(),
                property: "Smokes".to_string(),
            },
        )
    }

    /// `Smokes(x)` — prior sobre fumar.
    pub fn smokes(weight: f64) -> Self {
        Self::new(
            "smokes",
            weight,
            Formula::Unary {
                predicate: "Smokes".to_string(),
            },
        )
    }

    /// Resolve as groundings desta regra contra um índice e um domínio.
    pub fn compile<S: AsRef<str>>(&self, index: &AtomIndex, constants: &[S]) -> CompiledRule {
        let groundings = self.formula.ground(index, constants);
        tracing::debug!(
            rule = %self.name,
            weight = self.weight,
            groundings = groundings.len(),
            "Regra compilada"
        );
        CompiledRule {
            name: self.name.clone(),
            weight: self.weight,
            groundings,
        }
    }

    /// `nᵢ(world)`: número de groundings satisfeitas no mundo.
    ///
    /// Compila a regra a cada chamada; para avaliar muitos mundos use
    /// [`compile`](WeightedRule::compile) uma vez e
    /// [`CompiledRule::count_satisfied`].
    pub fn evaluate<S: AsRef<str>>(&self, world: &World, index: &AtomIndex, constants: &[S]) -> u64 {
        self.compile(index, constants).count_satisfied(world)
    }
}

/// Regra pronta para a enumeração: peso + groundings com ids resolvidos.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    pub name: String,
    pub weight: f64,
    groundings: Vec<Grounding>,
}

impl CompiledRule {
    #[inline]
    pub fn count_satisfied(&self, world: &World) -> u64 {
        self.groundings.iter().filter(|g| g.holds(world)).count() as u64
    }

    /// Termo `wᵢ · nᵢ(world)` do expoente.
    ///
    /// Contagem zero contribui exatamente 0, mesmo com peso infinito
    /// (evita `∞ · 0 = NaN` nas regras rígidas).
    #[inline]
    pub fn log_weight(&self, world: &World) -> f64 {
        match self.count_satisfied(world) {
            0 => 0.0,
            n => self.weight * n as f64,
        }
    }

    pub fn groundings(&self) -> &[Grounding] {
        &self.groundings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PredicateSpec;

    const PEOPLE: [&str; 2] = ["Anna", "Bob"];

    fn smokers_index() -> AtomIndex {
        AtomIndex::build(
            &PEOPLE,
            &[PredicateSpec::new("Smokes", 1), PredicateSpec::new("Friends", 2)],
        )
    }

    /// Regra unária conta constantes com o átomo verdadeiro
    #[test]
    fn test_unary_counts_true_atoms() {
        let index = smokers_index();
        let rule = WeightedRule::smokes(0.5);
        let none = World::empty();
        let both = World::from_assignments(&index, [("Smokes(Anna)", true), ("Smokes(Bob)", true)]).unwrap();
        assert_eq!(rule.evaluate(&none, &index, &PEOPLE), 0);
        assert_eq!(rule.evaluate(&both, &index, &PEOPLE), 2);
    }

    /// Sem amizades, todos os n² pares satisfazem a implicação
    #[test]
    fn test_pairwise_vacuous_without_friendships() {
        let index = smokers_index();
        let rule = WeightedRule::friends_smokes(2.0);
        let world = World::from_assignments(&index, [("Smokes(Anna)", true)]).unwrap();
        assert_eq!(rule.evaluate(&world, &index, &PEOPLE), 4);
    }

    /// Amizade entre hábitos diferentes viola exatamente uma grounding
    #[test]
    fn test_pairwise_violation() {
        let index = smokers_index();
        let rule = WeightedRule::friends_smokes(2.0);
        let world = World::from_assignments(
            &index,
            [("Friends(Anna,Bob)", true), ("Smokes(Anna)", true)],
        )
        .unwrap();
        assert_eq!(rule.evaluate(&world, &index, &PEOPLE), 3);

        let agree = World::from_assignments(
            &index,
            [("Friends(Anna,Bob)", true), ("Smokes(Anna)", true), ("Smokes(Bob)", true)],
        )
        .unwrap();
        assert_eq!(rule.evaluate(&agree, &index, &PEOPLE), 4);
    }

    /// Auto-amizade Friends(x,x) é sempre satisfeita
    #[test]
    fn test_pairwise_self_friendship() {
        let index = smokers_index();
        let rule = WeightedRule::friends_smokes(1.0);
        let world = World::from_assignments(&index, [("Friends(Anna,Anna)", true)]).unwrap();
        assert_eq!(rule.evaluate(&world, &index, &PEOPLE), 4);
    }

    /// O domínio declarado é usado mesmo quando o mundo não menciona a constante
    #[test]
    fn test_uses_declared_domain() {
        let constants = ["Anna", "Bob", "Charlie"];
        let index = AtomIndex::build(
            &constants,
            &[PredicateSpec::new("Smokes", 1), PredicateSpec::new("Friends", 2)],
        );
        let rule = WeightedRule::friends_smokes(2.0);
        // Mundo parcial que só menciona Anna e Bob
        let world = World::from_assignments(&index, [("Friends(Anna,Bob)", true), ("Smokes(Anna)", true)]).unwrap();
        assert_eq!(rule.evaluate(&world, &index, &constants), 8);
    }

    /// A ⇒ C: só (A verdadeiro, C falso) viola
    #[test]
    fn test_implication() {
        let index = AtomIndex::build(
            &PEOPLE,
            &[PredicateSpec::new("Smokes", 1), PredicateSpec::new("Cancer", 1)],
        );
        let rule = WeightedRule::new(
            "smoking_causes_cancer",
            1.5,
            Formula::Implication {
                antecedent: "Smokes".to_string(),
                consequent: "Cancer".to_string(),
            },
        );
        let world = World::from_assignments(&index, [("Smokes(Anna)", true), ("Smokes(Bob)", true), ("Cancer(Bob)", true)]).unwrap();
        assert_eq!(rule.evaluate(&world, &index, &PEOPLE), 1);
    }

    /// Peso infinito com contagem zero não gera NaN
    #[test]
    fn test_infinite_weight_zero_count() {
        let index = smokers_index();
        let rule = WeightedRule::smokes(f64::NEG_INFINITY).compile(&index, &PEOPLE);
        assert_eq!(rule.log_weight(&World::empty()), 0.0);
        let world = World::from_assignments(&index, [("Smokes(Bob)", true)]).unwrap();
        assert_eq!(rule.log_weight(&world), f64::NEG_INFINITY);
    }

    /// O formato serializado usa a tag `kind`
    #[test]
    fn test_formula_serde_tag() {
        let json = r#"{"name":"f","weight":2.0,"formula":{"kind":"pairwise_equivalence","relation":"Friends","property":"Smokes"}}"#;
        let rule: WeightedRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.formula, WeightedRule::friends_smokes(2.0).formula);
    }
}
