//! # World Scorer
//!
//! Peso não normalizado de um mundo:
//!
//! ```text
//! score(x) = exp(Σᵢ wᵢ · nᵢ(x))
//! ```
//!
//! O scorer nunca normaliza — dividir por `Z` é papel do
//! [`QueryEngine`](super::QueryEngine). A enumeração soma os expoentes em
//! espaço log ([`log_score`]); `exp` só aparece no score isolado.

use crate::core::{CompiledRule, Model, World};
use crate::error::Result;

/// Expoente `Σᵢ wᵢ · nᵢ(world)`.
///
/// `NaN` quando uma regra `+∞` e uma `-∞` disparam no mesmo mundo.
#[inline]
pub fn log_score(world: &World, rules: &[CompiledRule]) -> f64 {
    rules.iter().map(|rule| rule.log_weight(world)).sum()
}

/// `exp(Σᵢ wᵢ · nᵢ(world))` — sempre `> 0` para pesos finitos.
#[inline]
pub fn score_world(world: &World, rules: &[CompiledRule]) -> f64 {
    log_score(world, rules).exp()
}

/// Pontua um mundo descrito como pares `(átomo, valor)`, possivelmente parcial.
///
/// Átomos não mencionados são falsos; átomos fora do domínio do modelo são
/// ignorados. As regras são avaliadas sobre o domínio **declarado** do
/// modelo, não sobre as constantes que aparecem no mapa.
///
/// # Exemplo
///
/// ```rust
/// use mln_exact::core::Model;
/// use mln_exact::inference::score_assignments;
///
/// let model = Model::smokers();
/// let score = score_assignments(&model, [("Smokes(Anna)", true), ("Friends(Anna,Bob)", true)])?;
/// // 8 de 9 pares satisfeitos (peso 2.0) + 1 fumante (peso 0.5)
/// assert!((score - (2.0f64 * 8.0 + 0.5).exp()).abs() < 1e-6);
/// # Ok::<(), mln_exact::InferenceError>(())
/// ```
///
/// # Erros
///
/// [`InferenceError::TooManyAtoms`](crate::InferenceError::TooManyAtoms) se o
/// domínio tem mais átomos do que um [`World`] comporta.
pub fn score_assignments<'a, I>(model: &Model, assignments: I) -> Result<f64>
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    let index = model.atom_index();
    let world = World::from_assignments(&index, assignments)?;
    Ok(score_world(&world, &model.compile_rules(&index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AtomIndex, PredicateSpec, WeightedRule};
    use crate::error::InferenceError;

    /// Sem regras todo mundo tem score exp(0) = 1
    #[test]
    fn test_no_rules_scores_one() {
        let index = AtomIndex::build(&["A"], &[PredicateSpec::new("Smokes", 1)]);
        assert_eq!(score_world(&World::from_bits(1), &[]), 1.0);
        assert_eq!(index.len(), 1);
    }

    /// O expoente é a soma ponderada das contagens
    #[test]
    fn test_weighted_sum() {
        let model = Model::smokers();
        let index = model.atom_index();
        let rules = model.compile_rules(&index);
        // Ninguém fuma, ninguém é amigo: 9 pares satisfeitos, 0 fumantes
        assert!((log_score(&World::empty(), &rules) - 18.0).abs() < 1e-12);

        let everyone = World::from_assignments(
            &index,
            [("Smokes(Anna)", true), ("Smokes(Bob)", true), ("Smokes(Charlie)", true)],
        )
        .unwrap();
        assert!((log_score(&everyone, &rules) - (18.0 + 1.5)).abs() < 1e-12);
    }

    /// Mundos parciais usam o domínio declarado, inclusive para Charlie
    #[test]
    fn test_partial_world_uses_full_domain() {
        let model = Model::smokers();
        let score = score_assignments(
            &model,
            [
                ("Friends(Anna,Bob)", true),
                ("Smokes(Anna)", true),
                ("Smokes(Bob)", false),
                ("Friends(Bob,Charlie)", true),
                ("Smokes(Charlie)", true),
            ],
        )
        .unwrap();
        // Pares violados: (Anna,Bob) e (Bob,Charlie) → 7 de 9; fumantes: 2
        let expected = (2.0f64 * 7.0 + 0.5 * 2.0).exp();
        assert!((score - expected).abs() / expected < 1e-12);
    }

    /// Regra rígida com peso -∞ zera o score de mundos que a satisfazem
    #[test]
    fn test_hard_rule() {
        let index = AtomIndex::build(&["A"], &[PredicateSpec::new("Smokes", 1)]);
        let rules = vec![WeightedRule::smokes(f64::NEG_INFINITY).compile(&index, &["A"])];
        assert_eq!(score_world(&World::empty(), &rules), 1.0);
        assert_eq!(score_world(&World::from_bits(1), &rules), 0.0);
    }

    /// Domínio com mais de 63 átomos é recusado em vez de perder átomos
    #[test]
    fn test_wide_domain_is_rejected() {
        let model = Model::new(
            (0..8).map(|i| format!("C{}", i)).collect(),
            vec![PredicateSpec::new("Smokes", 1), PredicateSpec::new("Friends", 2)],
            vec![WeightedRule::smokes(0.5)],
        );
        let err = score_assignments(&model, [("Smokes(C0)", true)]).unwrap_err();
        assert!(matches!(err, InferenceError::TooManyAtoms { atoms: 72, .. }));
    }

    /// +∞ e -∞ no mesmo mundo dão expoente indefinido
    #[test]
    fn test_conflicting_hard_rules_are_nan() {
        let index = AtomIndex::build(&["A"], &[PredicateSpec::new("Smokes", 1)]);
        let rules = vec![
            WeightedRule::smokes(f64::INFINITY).compile(&index, &["A"]),
            WeightedRule::smokes(f64::NEG_INFINITY).compile(&index, &["A"]),
        ];
        assert_eq!(log_score(&World::empty(), &rules), 0.0);
        assert!(log_score(&World::from_bits(1), &rules).is_nan());
    }
}
