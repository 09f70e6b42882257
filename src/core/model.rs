//! # Model — Domínio + Regras
//!
//! O [`Model`] agrupa tudo que o chamador fornece uma única vez e que fica
//! imutável durante as consultas: constantes, predicados e regras.
//!
//! A ordem das regras não tem efeito semântico (as contribuições são
//! somadas); ela só determina a ordem dos logs.

use serde::{Deserialize, Serialize};

use super::atom::{AtomIndex, PredicateSpec};
use super::rule::{CompiledRule, WeightedRule};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Indivíduos do domínio. Duplicatas não são verificadas.
    pub constants: Vec<String>,
    /// Predicados, serializados como `Nome/Aridade`.
    pub predicates: Vec<PredicateSpec>,
    #[serde(default)]
    pub rules: Vec<WeightedRule>,
}

impl Model {
    pub fn new(
        constants: Vec<String>,
        predicates: Vec<PredicateSpec>,
        rules: Vec<WeightedRule>,
    ) -> Self {
        Self {
            constants,
            predicates,
            rules,
        }
    }

    /// Modelo clássico "Friends & Smokers" com Anna, Bob e Charlie.
    ///
    /// | Regra | Peso |
    /// |-------|------|
    /// | `Friends(x,y) ⇒ (Smokes(x) ⇔ Smokes(y))` | 2.0 |
    /// | `Smokes(x)` | 0.5 |
    ///
    /// São 3 + 9 = 12 átomos, ou seja, 4096 mundos.
    pub fn smokers() -> Self {
        Self::new(
            ["Anna", "Bob", "Charlie"].map(String::from).to_vec(),
            vec![PredicateSpec::new("Smokes", 1), PredicateSpec::new("Friends", 2)],
            vec![WeightedRule::friends_smokes(2.0), WeightedRule::smokes(0.5)],
        )
    }

    /// Gera e indexa todos os átomos ground do domínio.
    pub fn atom_index(&self) -> AtomIndex {
        AtomIndex::build(&self.constants, &self.predicates)
    }

    /// Compila todas as regras contra um índice, sempre com o domínio completo.
    pub fn compile_rules(&self, index: &AtomIndex) -> Vec<CompiledRule> {
        self.rules
            .iter()
            .map(|rule| rule.compile(index, &self.constants))
            .collect()
    }
}
