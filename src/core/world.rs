//! # World — Uma Atribuição Total de Verdade
//!
//! Um [`World`] atribui verdadeiro/falso a **cada** átomo de um [`AtomIndex`].
//! A representação é um vetor de bits de tamanho fixo: o bit `i` é o valor
//! do átomo de id `i`.
//!
//! ```text
//! átomos:  0=Friends(A,A) 1=Friends(A,B) 2=Smokes(A) 3=Smokes(B)
//! bits:    0b1010  →  Friends(A,B) = true, Smokes(B) = true, resto = false
//! ```
//!
//! Essa escolha torna a enumeração dos `2^K` mundos trivial: o contador
//! inteiro `0..2^K` **é** o mundo. Por isso `K` nunca passa de
//! [`MAX_WORLD_BITS`].
//!
//! Para inspeção humana e para compatibilidade com mapas `nome → bool`
//! (mundos parciais), há conversões em ambos os sentidos. Átomos ausentes
//! do mapa são falsos (pressuposto de mundo fechado).

use std::collections::BTreeMap;

use super::atom::{AtomId, AtomIndex};
use crate::error::{InferenceError, Result};

/// Maior `K` representável: o contador de mundos é um `u64` e `2^K`
/// precisa caber nele.
pub const MAX_WORLD_BITS: usize = 63;

/// Atribuição total sobre os átomos de um [`AtomIndex`], como vetor de bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct World {
    bits: u64,
}

impl World {
    /// Mundo em que todos os átomos são falsos.
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Interpreta um inteiro da enumeração como mundo.
    pub fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Valor verdade do átomo `id`.
    #[inline]
    pub fn get(&self, id: AtomId) -> bool {
        id < MAX_WORLD_BITS && self.bits & (1u64 << id) != 0
    }

    /// Valor verdade de um átomo possivelmente ausente do índice.
    ///
    /// `None` (átomo fora do domínio) é sempre falso — nunca um erro.
    #[inline]
    pub fn holds(&self, id: Option<AtomId>) -> bool {
        id.is_some_and(|id| self.get(id))
    }

    /// Ids `≥ MAX_WORLD_BITS` são ignorados; [`World::from_assignments`]
    /// recusa esses índices antes.
    pub fn set(&mut self, id: AtomId, value: bool) {
        if id >= MAX_WORLD_BITS {
            return;
        }
        if value {
            self.bits |= 1u64 << id;
        } else {
            self.bits &= !(1u64 << id);
        }
    }

    /// `true` se todos os bits de `mask` estão ligados neste mundo.
    #[inline]
    pub fn satisfies(&self, mask: u64) -> bool {
        self.bits & mask == mask
    }

    /// Constrói um mundo a partir de pares `(átomo, valor)`.
    ///
    /// Átomos desconhecidos pelo índice são ignorados (com `warn`), e átomos
    /// não mencionados ficam falsos.
    ///
    /// # Erros
    ///
    /// [`InferenceError::TooManyAtoms`] se o índice tem mais de
    /// [`MAX_WORLD_BITS`] átomos: os ids excedentes não caberiam nos bits.
    pub fn from_assignments<'a, I>(index: &AtomIndex, assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        if index.len() > MAX_WORLD_BITS {
            return Err(InferenceError::TooManyAtoms {
                atoms: index.len(),
                limit: MAX_WORLD_BITS,
            });
        }
        let mut world = Self::empty();
        for (atom, value) in assignments {
            match index.id_of(atom) {
                Some(id) => world.set(id, value),
                None => {
                    tracing::warn!(atom = %atom, "Átomo fora do domínio ignorado no mundo");
                }
            }
        }
        Ok(world)
    }

    /// Expande o mundo para um mapa `átomo → valor` com **todos** os átomos.
    pub fn to_assignments(&self, index: &AtomIndex) -> BTreeMap<String, bool> {
        index
            .atoms()
            .iter()
            .enumerate()
            .map(|(id, atom)| (atom.to_string(), self.get(id)))
            .collect()
    }
}

/// Iterador sobre todos os `2^K` mundos de `K` átomos, em ordem crescente
/// do contador.
///
/// Cada mundo aparece exatamente uma vez. O chamador deve garantir
/// `K ≤ MAX_WORLD_BITS`; valores maiores são truncados para esse limite.
pub struct WorldIter {
    next: u64,
    end: u64,
}

impl WorldIter {
    pub fn new(atom_count: usize) -> Self {
        Self::range(0, world_count(atom_count))
    }

    /// Subfaixa `[start, end)` do espaço de mundos — usada pelos chunks
    /// da enumeração paralela.
    pub fn range(start: u64, end: u64) -> Self {
        Self { next: start, end }
    }
}

impl Iterator for WorldIter {
    type Item = World;

    fn next(&mut self) -> Option<World> {
        if self.next >= self.end {
            return None;
        }
        let world = World::from_bits(self.next);
        self.next += 1;
        Some(world)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WorldIter {}

/// `2^K`, limitado a `K ≤ MAX_WORLD_BITS`.
pub fn world_count(atom_count: usize) -> u64 {
    1u64 << atom_count.min(MAX_WORLD_BITS)
}
