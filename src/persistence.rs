//! # Persistência — Carregamento de Modelos em JSON
//!
//! Módulo responsável por ler um [`ModelFile`] do disco: o [`Model`], as
//! consultas a executar e, opcionalmente, a configuração do motor.
//!
//! ## Formato
//!
//! ```json
//! {
//!   "constants": ["Anna", "Bob"],
//!   "predicates": ["Smokes/1", "Friends/2"],
//!   "rules": [
//!     {"name": "smokes", "weight": 0.5, "formula": {"kind": "unary", "predicate": "Smokes"}}
//!   ],
//!   "queries": [{"kind": "marginal", "atom": "Smokes(Anna)"}],
//!   "engine": {"max_atoms": 20}
//! }
//! ```
//!
//! Sem arquivo, a CLI usa o modelo embutido [`ModelFile::smokers`].

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::core::Model;
use crate::report::QuerySpec;

/// Conteúdo de um arquivo de modelo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    #[serde(flatten)]
    pub model: Model,
    /// Consultas executadas por padrão.
    #[serde(default)]
    pub queries: Vec<QuerySpec>,
    /// Sobrescreve os padrões de [`EngineConfig`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,
}

impl ModelFile {
    /// Modelo "Friends & Smokers" com as duas consultas clássicas:
    /// `P(Smokes(Anna))` e `P(Smokes(Anna) | Friends(Anna,Bob), Smokes(Bob))`.
    pub fn smokers() -> Self {
        Self {
            model: Model::smokers(),
            queries: vec![
                QuerySpec::Marginal {
                    atom: "Smokes(Anna)".to_string(),
                },
                QuerySpec::Conditional {
                    query: "Smokes(Anna)".to_string(),
                    evidence: vec!["Friends(Anna,Bob)".to_string(), "Smokes(Bob)".to_string()],
                },
            ],
            engine: None,
        }
    }
}

/// Lê e desserializa um arquivo de modelo.
///
/// # Erros
///
/// Retorna erro se o arquivo não puder ser lido ou se o JSON for inválido
/// (incluindo predicados com aridade não numérica).
pub fn load_model(path: &Path) -> Result<ModelFile> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    let file: ModelFile = serde_json::from_str(&json)
        .with_context(|| format!("Falha ao desserializar {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        constants = file.model.constants.len(),
        predicates = file.model.predicates.len(),
        rules = file.model.rules.len(),
        queries = file.queries.len(),
        "Modelo carregado do disco"
    );
    Ok(file)
}

/// Carrega `path` se fornecido, ou o modelo embutido.
pub fn load_or_default(path: Option<&Path>) -> Result<ModelFile> {
    match path {
        Some(path) => load_model(path),
        None => {
            tracing::info!("Nenhum modelo informado, usando o exemplo Friends & Smokers");
            Ok(ModelFile::smokers())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// O arquivo de exemplo do repositório é válido
    #[test]
    fn test_load_bundled_model() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/smokers.json");
        let file = load_model(&path).unwrap();
        assert_eq!(file.model, Model::smokers());
        assert!(!file.queries.is_empty());
    }

    /// JSON serializado é lido de volta igual
    #[test]
    fn test_json_roundtrip() {
        let file = ModelFile::smokers();
        let json = serde_json::to_string(&file).unwrap();
        let back: ModelFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, file);
    }

    /// Aridade inválida é um erro de carregamento, com contexto
    #[test]
    fn test_invalid_predicate_fails() {
        let dir = std::env::temp_dir().join("mln-exact-invalid-predicate.json");
        std::fs::write(&dir, r#"{"constants": ["A"], "predicates": ["Smokes/one"]}"#).unwrap();
        let err = load_model(&dir).unwrap_err();
        assert!(format!("{:#}", err).contains("Falha ao desserializar"));
        let _ = std::fs::remove_file(&dir);
    }

    /// Arquivo inexistente → erro, não pânico
    #[test]
    fn test_missing_file() {
        assert!(load_model(Path::new("data/nao-existe.json")).is_err());
        assert!(load_or_default(None).is_ok());
    }
}
