//! # mln-exact — CLI
//!
//! **Ponto de entrada** do motor de inferência exata.
//!
//! ## Fluxo
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Carrega o modelo (arquivo JSON ou exemplo embutido)
//!   ├── Monta EngineConfig: padrão → arquivo → ambiente → flags
//!   ├── Dimensiona o pool global do rayon (--threads)
//!   ├── Executa as consultas do modelo + as da linha de comando
//!   └── Imprime resumo ou relatório JSON
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Modelo embutido (Anna, Bob, Charlie)
//! cargo run
//!
//! # Arquivo de modelo, consulta extra e saída JSON
//! cargo run -- data/cancer.json --marginal "Smokes(Bob)" --output json
//!
//! # Condicional pela linha de comando
//! cargo run -- --query "Smokes(Anna)" --given "Friends(Anna,Bob),Smokes(Bob)"
//!
//! # Logs detalhados
//! RUST_LOG=debug cargo run
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use mln_exact::inference::QueryEngine;
use mln_exact::persistence;
use mln_exact::report::{QuerySpec, Report};

#[derive(Parser)]
#[command(name = "mln-exact")]
#[command(version)]
#[command(about = "Inferência exata sobre modelos de Markov Logic por enumeração de mundos")]
struct Cli {
    /// Arquivo de modelo JSON (padrão: exemplo Friends & Smokers embutido)
    #[arg(value_name = "MODEL")]
    model: Option<PathBuf>,

    /// Probabilidade marginal de um átomo (pode repetir)
    #[arg(short, long, value_name = "ATOM")]
    marginal: Vec<String>,

    /// Massa conjunta de átomos separados por vírgula no nível superior
    #[arg(short, long, value_name = "ATOMS")]
    joint: Option<String>,

    /// Átomo consultado numa probabilidade condicional (exige --given)
    #[arg(short, long, value_name = "ATOM", requires = "given")]
    query: Option<String>,

    /// Evidência da consulta condicional, separada por vírgula no nível superior
    #[arg(short, long, value_name = "ATOMS", requires = "query")]
    given: Option<String>,

    /// Ignora as consultas do arquivo de modelo
    #[arg(long)]
    only_cli: bool,

    /// Formato de saída
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
    output: OutputFormat,

    /// Número de threads do rayon (padrão: núcleos disponíveis)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Prazo por consulta, em milissegundos
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Maior número de átomos aceito
    #[arg(long, value_name = "N")]
    max_atoms: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

fn main() -> Result<()> {
    // Aceita a variável de ambiente RUST_LOG para configurar o nível.
    // Logs vão para stderr para não misturar com o relatório.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = persistence::load_or_default(cli.model.as_deref())?;

    // Padrão → arquivo → ambiente → flags
    let mut config = file.engine.clone().unwrap_or_default().with_env();
    if let Some(max_atoms) = cli.max_atoms {
        config.max_atoms = max_atoms;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Some(Duration::from_millis(ms));
    }

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Falha ao configurar o pool de threads")?;
    }

    let mut queries = if cli.only_cli {
        Vec::new()
    } else {
        file.queries.clone()
    };
    queries.extend(cli_queries(&cli));
    if queries.is_empty() {
        queries.push(QuerySpec::PartitionFunction);
    }

    let engine = QueryEngine::new(&file.model, config).context("Modelo grande demais para enumeração exata")?;
    tracing::info!(
        atoms = engine.index().len(),
        queries = queries.len(),
        "🎲 Iniciando consultas"
    );

    let report = Report::run(&file.model, &engine, &queries);
    match cli.output {
        OutputFormat::Summary => print!("{}", report.summary()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Falha ao serializar o relatório")?
        ),
    }
    Ok(())
}

/// Consultas pedidas por flags, na ordem marginal → conjunta → condicional.
fn cli_queries(cli: &Cli) -> Vec<QuerySpec> {
    let mut queries: Vec<QuerySpec> = cli
        .marginal
        .iter()
        .map(|atom| QuerySpec::Marginal { atom: atom.clone() })
        .collect();
    if let Some(atoms) = &cli.joint {
        queries.push(QuerySpec::Joint {
            atoms: split_atoms(atoms),
        });
    }
    if let (Some(query), Some(given)) = (&cli.query, &cli.given) {
        queries.push(QuerySpec::Conditional {
            query: query.clone(),
            evidence: split_atoms(given),
        });
    }
    queries
}

/// Separa `Friends(Anna,Bob),Smokes(Bob)` nas vírgulas fora de parênteses.
fn split_atoms(list: &str) -> Vec<String> {
    let mut atoms = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in list.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                atoms.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    atoms.push(current);
    atoms
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}
