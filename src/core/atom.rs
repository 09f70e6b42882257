//! # Átomos Ground — As Variáveis Aleatórias do Modelo
//!
//! Um **átomo ground** é um predicado aplicado a constantes concretas,
//! como `Friends(Anna,Bob)` ou `Smokes(Anna)`. Cada átomo é uma variável
//! booleana: num dado mundo ele é verdadeiro ou falso.
//!
//! ## Codificação Textual
//!
//! | Conceito | Formato | Exemplo |
//! |----------|---------|---------|
//! | Predicado | `Nome/Aridade` | `Friends/2` |
//! | Átomo ground | `Nome(arg1,arg2,...)` | `Friends(Anna,Bob)` |
//!
//! A string canônica do átomo **é** sua identidade: sem espaços, argumentos
//! separados por vírgula na ordem fornecida, sensível a maiúsculas.
//!
//! ## Interning
//!
//! Comparar e hashear strings em cada um dos `2^K` mundos seria o gargalo
//! da enumeração. Por isso o [`AtomIndex`] atribui a cada átomo um
//! [`AtomId`] denso em `[0, K)`, na ordem lexicográfica das strings.
//! O resto do motor trabalha apenas com esses índices.
//!
//! ```text
//! constantes: [Anna, Bob]       predicados: [Smokes/1, Friends/2]
//!   ─────────────────────────────────────────────────────────────
//!   0 → Friends(Anna,Anna)      3 → Friends(Bob,Bob)
//!   1 → Friends(Anna,Bob)       4 → Smokes(Anna)
//!   2 → Friends(Bob,Anna)       5 → Smokes(Bob)
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InferenceError, Result};

/// Identificador denso de um átomo dentro de um [`AtomIndex`].
pub type AtomId = usize;

/// Especificação de predicado: nome + aridade.
///
/// Construída a partir da codificação `Nome/Aridade` via [`PredicateSpec::parse`],
/// que também é o formato serializado (`"Friends/2"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PredicateSpec {
    /// Nome do predicado (ex: `Friends`).
    pub name: String,
    /// Número de argumentos. Aridade 0 gera o átomo nulário `Nome()`.
    pub arity: usize,
}

impl PredicateSpec {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Interpreta a codificação `Nome/Aridade`, separando no **primeiro** `/`.
    ///
    /// - Sem `/` → aridade 1 (padrão permissivo, registra um `warn`)
    /// - Aridade não numérica → [`InferenceError::InvalidPredicate`]
    ///
    /// # Exemplo
    ///
    /// ```rust
    /// use mln_exact::core::PredicateSpec;
    ///
    /// let p = PredicateSpec::parse("Friends/2").unwrap();
    /// assert_eq!(p.arity, 2);
    /// assert_eq!(PredicateSpec::parse("Smokes").unwrap().arity, 1);
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('/') {
            Some((name, arity_str)) => {
                let arity = arity_str.trim().parse::<usize>().map_err(|_| {
                    InferenceError::InvalidPredicate {
                        spec: spec.to_string(),
                        arity: arity_str.to_string(),
                    }
                })?;
                Ok(Self::new(name, arity))
            }
            None => {
                tracing::warn!(spec = %spec, "Predicado sem aridade explícita, assumindo 1");
                Ok(Self::new(spec, 1))
            }
        }
    }

    /// Monta o átomo ground deste predicado para os argumentos dados.
    ///
    /// Não verifica se `args.len() == arity` — o chamador é responsável.
    pub fn ground<S: AsRef<str>>(&self, args: &[S]) -> GroundAtom {
        GroundAtom::new(&self.name, args)
    }
}

impl fmt::Display for PredicateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

impl TryFrom<String> for PredicateSpec {
    type Error = InferenceError;

    fn try_from(spec: String) -> Result<Self> {
        Self::parse(&spec)
    }
}

impl From<PredicateSpec> for String {
    fn from(spec: PredicateSpec) -> Self {
        spec.to_string()
    }
}

/// Átomo ground identificado pela sua string canônica `Nome(a1,...,aN)`.
///
/// A ordenação (`Ord`) é a ordem lexicográfica da string — é ela que define
/// os [`AtomId`]s do [`AtomIndex`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundAtom(String);

impl GroundAtom {
    /// Constrói a string canônica `predicate(arg1,arg2,...)`.
    pub fn new<S: AsRef<str>>(predicate: &str, args: &[S]) -> Self {
        let joined = args
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        Self(format!("{}({})", predicate, joined))
    }

    /// Aceita uma string já canônica (ex: vinda de uma query do usuário).
    pub fn from_canonical(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroundAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GroundAtom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Permite `HashMap<GroundAtom, _>::get(&str)` sem alocar.
impl Borrow<str> for GroundAtom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Gera **todos** os átomos ground: cada predicado aplicado a cada
/// combinação ordenada (produto cartesiano com repetição) das constantes.
///
/// Para um predicado de aridade `a` são produzidos exatamente
/// `|constants|^a` átomos. O resultado é um conjunto ordenado
/// lexicograficamente, então a saída é estável entre execuções.
///
/// # Exemplo
///
/// ```rust
/// use mln_exact::core::{generate_ground_atoms, PredicateSpec};
///
/// let constants = vec!["Anna".to_string(), "Bob".to_string()];
/// let predicates = vec![PredicateSpec::parse("Friends/2").unwrap()];
/// let atoms = generate_ground_atoms(&constants, &predicates);
/// assert_eq!(atoms.len(), 4);
/// ```
pub fn generate_ground_atoms<S: AsRef<str>>(
    constants: &[S],
    predicates: &[PredicateSpec],
) -> BTreeSet<GroundAtom> {
    let mut atoms = BTreeSet::new();
    for predicate in predicates {
        for args in Tuples::new(constants, predicate.arity) {
            atoms.insert(predicate.ground(&args));
        }
    }
    atoms
}

/// Variante de [`generate_ground_atoms`] que recebe as especificações na
/// codificação textual `Nome/Aridade`.
pub fn generate_ground_atoms_from_specs<S: AsRef<str>, P: AsRef<str>>(
    constants: &[S],
    specs: &[P],
) -> Result<BTreeSet<GroundAtom>> {
    let predicates = specs
        .iter()
        .map(|s| PredicateSpec::parse(s.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(generate_ground_atoms(constants, &predicates))
}

/// Iterador "odômetro" sobre todas as tuplas de tamanho `arity` de
/// `constants`, com repetição, na ordem do produto cartesiano.
struct Tuples<'a, S> {
    constants: &'a [S],
    digits: Vec<usize>,
    done: bool,
}

impl<'a, S: AsRef<str>> Tuples<'a, S> {
    fn new(constants: &'a [S], arity: usize) -> Self {
        Self {
            constants,
            digits: vec![0; arity],
            // Domínio vazio com aridade > 0 não tem nenhuma tupla.
            done: constants.is_empty() && arity > 0,
        }
    }
}

impl<'a, S: AsRef<str>> Iterator for Tuples<'a, S> {
    type Item = Vec<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .digits
            .iter()
            .map(|&d| self.constants[d].as_ref())
            .collect();

        // Avança o odômetro da direita para a esquerda
        self.done = true;
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.constants.len() {
                self.done = false;
                break;
            }
            *digit = 0;
        }
        Some(item)
    }
}

/// Tabela de interning: átomo ground ↔ [`AtomId`] denso.
///
/// Construída uma única vez por modelo. Os ids seguem a ordem
/// lexicográfica das strings canônicas.
#[derive(Clone, Debug, Default)]
pub struct AtomIndex {
    atoms: Vec<GroundAtom>,
    ids: HashMap<GroundAtom, AtomId>,
}

impl AtomIndex {
    /// Indexa um conjunto de átomos. A ordem do `BTreeSet` já é a final.
    pub fn new(atoms: BTreeSet<GroundAtom>) -> Self {
        let atoms: Vec<GroundAtom> = atoms.into_iter().collect();
        let ids = atoms
            .iter()
            .enumerate()
            .map(|(id, atom)| (atom.clone(), id))
            .collect();
        Self { atoms, ids }
    }

    /// Gera e indexa os átomos de um domínio.
    pub fn build<S: AsRef<str>>(constants: &[S], predicates: &[PredicateSpec]) -> Self {
        Self::new(generate_ground_atoms(constants, predicates))
    }

    /// Busca o id de um átomo pela string canônica.
    ///
    /// `None` significa que o átomo não pertence ao domínio — pelo
    /// pressuposto de mundo fechado, ele é falso em qualquer mundo.
    pub fn id_of(&self, atom: &str) -> Option<AtomId> {
        self.ids.get(atom).copied()
    }

    /// Atalho para `id_of(Nome(args))`.
    pub fn lookup<S: AsRef<str>>(&self, predicate: &str, args: &[S]) -> Option<AtomId> {
        self.ids.get(GroundAtom::new(predicate, args).as_str()).copied()
    }

    pub fn atom(&self, id: AtomId) -> Option<&GroundAtom> {
        self.atoms.get(id)
    }

    pub fn atoms(&self) -> &[GroundAtom] {
        &self.atoms
    }

    /// Número de átomos (o `K` de `2^K`).
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}
