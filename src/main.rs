//! Demo offline del pipeline completo: parsea `data/demo.smi`, despacha
//! los tres pattern-sets contra un servicio enlatado (sin red ni Python)
//! y muestra la lista unificada más el handoff de análisis.
//!
//! Para correr contra el servicio real, usar `smarts-cli`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use smarts_adapters::{run_submission, FilterSelection, MatchService, PartitionResponse, ServiceError, SubmissionGate,
                      ToxicityResponse};
use smarts_core::{AnalysisDetail, AnalysisStore, Passthrough};
use smarts_domain::{ExpertFlags, PatternSpec, SubmissionConfig};

/// Respuestas fijas con las moléculas de `data/demo.smi`.
struct DemoService;

#[async_trait]
impl MatchService for DemoService {
    async fn filter_toxicity(&self,
                             _structures: &[&str],
                             _names: &[&str],
                             _flags: &ExpertFlags)
                             -> Result<ToxicityResponse, ServiceError> {
        let value = json!({
            "results": [
                {"name": "ethanol", "smiles": "CCO", "failed": false},
                {"name": "benzene", "smiles": "c1ccccc1", "failed": false},
                {"name": "aspirin", "smiles": "CC(=O)Oc1ccccc1C(=O)O", "failed": false},
                {"name": "phthalimide", "smiles": "O=C1NC(=O)c2ccccc21", "failed": true,
                 "reasons": ["imide_A"], "highlight_atoms": [[0, 1, 2, 3, 4]]},
                {"name": "caffeine", "smiles": "CN1C=NC2=C1C(=O)N(C)C(=O)N2C", "failed": false}
            ],
            "all_pains_filters": ["quinone_A", "imide_A", "ene_rhod_A"]
        });
        Ok(serde_json::from_value(value).expect("demo toxicity shape"))
    }

    async fn multi_match(&self,
                         _structures: &[&str],
                         _names: &[&str],
                         _patterns: &[PatternSpec],
                         _flags: &ExpertFlags)
                         -> Result<PartitionResponse, ServiceError> {
        let value = json!({
            "failed": [
                {"name": "aspirin", "smiles": "CC(=O)Oc1ccccc1C(=O)O",
                 "reason": "phenyl_ester_A", "highlight_atoms": [[3, 4]]}
            ],
            "passed": [
                {"name": "ethanol", "smiles": "CCO"},
                {"name": "benzene", "smiles": "c1ccccc1"},
                {"name": "phthalimide", "smiles": "O=C1NC(=O)c2ccccc21"},
                {"name": "caffeine", "smiles": "CN1C=NC2=C1C(=O)N(C)C(=O)N2C"}
            ]
        });
        Ok(serde_json::from_value(value).expect("demo partition shape"))
    }

    async fn match_counts(&self,
                          _structures: &[&str],
                          _names: &[&str],
                          _patterns: &[PatternSpec],
                          _flags: &ExpertFlags)
                          -> Result<Vec<Value>, ServiceError> {
        let entries = vec![json!({"smiles": "CCO", "name": "ethanol",
                                  "matches": [{"name": "aromatic", "count": 0}]}),
                           json!({"smiles": "c1ccccc1", "name": "benzene",
                                  "matches": [{"name": "aromatic", "count": 1,
                                               "highlight_atoms": [0, 1, 2, 3, 4, 5]}]}),
                           json!({"smiles": "CC(=O)Oc1ccccc1C(=O)O", "name": "aspirin",
                                  "matches": [{"name": "aromatic", "count": 1,
                                               "highlight_atoms": [4, 5, 6, 7, 8, 9]}]}),
                           json!({"smiles": "O=C1NC(=O)c2ccccc21", "name": "phthalimide",
                                  "matches": [{"name": "aromatic", "count": 1,
                                               "highlight_atoms": [6, 7, 8, 9, 10, 11]}]}),
                           json!({"smiles": "CN1C=NC2=C1C(=O)N(C)C(=O)N2C", "name": "caffeine",
                                  "matches": [{"name": "aromatic", "count": 0}]})];
        Ok(entries)
    }
}

#[tokio::main]
async fn main() {
    let smiles_text = match std::fs::read_to_string("data/demo.smi") {
        Ok(t) => t,
        Err(e) => {
            eprintln!("[demo] no se pudo leer data/demo.smi: {e}");
            std::process::exit(3);
        }
    };

    let selection = FilterSelection { toxicity: true,
                                      secondary_asset: Some("data/ursu_pains.sma".into()),
                                      custom: vec![PatternSpec::new("c1ccccc1", "aromatic").expect("valid demo pattern")],
                                      ..FilterSelection::default() };

    let gate = SubmissionGate::new();
    let ctx = match run_submission(&DemoService,
                                   Arc::new(Passthrough),
                                   &gate,
                                   SubmissionConfig::default(),
                                   &smiles_text,
                                   &selection).await
    {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("[demo] submission fallida: {e}");
            std::process::exit(4);
        }
    };

    for error in &ctx.errors {
        eprintln!("[demo] {error}");
    }

    println!("Unified results ({} molecules, {} failing records)", ctx.processed, ctx.failed_count());
    println!("{:>4}  {:<6}  {:<8}  {:<12}  {}", "#", "Result", "Filter", "Molecule", "Patterns matched");
    for (idx, record) in ctx.results.iter().enumerate() {
        println!("{:>4}  {:<6}  {:<8}  {:<12}  {}",
                 idx + 1,
                 if record.failed { "Fail" } else { "Pass" },
                 record.filter_name,
                 record.name,
                 if record.pattern_label.is_empty() { "-" } else { record.pattern_label.as_str() });
    }

    // Handoff de análisis: token de lectura única, como el paso de la
    // lista de resultados a la vista de detalle en la UI original.
    let store = AnalysisStore::new();
    let custom_benzene = ctx.results
                            .iter()
                            .find(|r| r.filter_name == "Custom" && r.name == "benzene")
                            .expect("benzene matches the demo aromatic pattern");
    let columns = ctx.columns_for("Custom").expect("custom set participated");
    let detail = AnalysisDetail::from_record(custom_benzene, columns).expect("count sets carry match vectors");
    let token = store.store(detail);

    let detail = store.take(&token).expect("fresh token");
    println!("\nAnalysis of {} ({} of {} patterns matched)",
             detail.name,
             detail.total_matches(),
             detail.pattern_names.len());
    for (pattern, matched) in detail.pattern_names.iter().zip(detail.matches.iter()) {
        println!("  {}  {}", if *matched { "Fail" } else { "Pass" }, pattern);
    }
    assert!(store.take(&token).is_none(), "analysis tokens are read-once");
}
