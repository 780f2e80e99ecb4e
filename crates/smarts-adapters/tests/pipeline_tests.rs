use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use smarts_adapters::{run_submission, FilterSelection, MatchService, PartitionResponse, ServiceError, SubmissionGate,
                      ToxicityResponse};
use smarts_core::{CoreError, Passthrough};
use smarts_domain::{ExpertFlags, PatternSpec, SubmissionConfig};

/// Servicio enlatado para probar el pipeline sin red.
#[derive(Default)]
struct CannedService {
    toxicity: Option<Value>,
    partition: Option<Value>,
    counts: Option<Value>,
    fail_toxicity: bool,
    calls: AtomicUsize,
}

impl CannedService {
    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchService for CannedService {
    async fn filter_toxicity(&self,
                             _structures: &[&str],
                             _names: &[&str],
                             _flags: &ExpertFlags)
                             -> Result<ToxicityResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_toxicity {
            return Err(ServiceError::Status { endpoint: "get_filterpains".to_string(),
                                              status: 500 });
        }
        let value = self.toxicity.clone().expect("canned toxicity response");
        Ok(serde_json::from_value(value).expect("valid canned toxicity"))
    }

    async fn multi_match(&self,
                         _structures: &[&str],
                         _names: &[&str],
                         _patterns: &[PatternSpec],
                         _flags: &ExpertFlags)
                         -> Result<PartitionResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = self.partition.clone().expect("canned partition response");
        Ok(serde_json::from_value(value).expect("valid canned partition"))
    }

    async fn match_counts(&self,
                          _structures: &[&str],
                          _names: &[&str],
                          _patterns: &[PatternSpec],
                          _flags: &ExpertFlags)
                          -> Result<Vec<Value>, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = self.counts.clone().expect("canned counts response");
        Ok(value.as_array().expect("array").clone())
    }
}

fn toxicity_json() -> Value {
    json!({
        "results": [
            {"name": "benzene", "smiles": "c1ccccc1", "failed": true,
             "reasons": ["quinone_A"], "highlight_atoms": [[0, 1, 2]]},
            {"name": "ethanol", "smiles": "CCO", "failed": false}
        ],
        "all_pains_filters": ["quinone_A", "ene_rhod_A"]
    })
}

fn counts_json() -> Value {
    json!([
        {"smiles": "c1ccccc1", "name": "benzene",
         "matches": [{"name": "aromatic", "count": 1, "highlight_atoms": [0, 1]}]},
        {"smiles": "CCO", "name": "ethanol",
         "matches": [{"name": "aromatic", "count": 0}]}
    ])
}

#[tokio::test]
async fn test_two_sets_merge_into_fail_first_list() {
    let service = CannedService { toxicity: Some(toxicity_json()),
                                  counts: Some(counts_json()),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();
    let selection = FilterSelection { toxicity: true,
                                      custom: vec![PatternSpec::new("c1ccccc1", "aromatic").unwrap()],
                                      ..FilterSelection::default() };

    let ctx = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "CCO ethanol\nc1ccccc1 benzene",
                             &selection).await
                                        .expect("submission should succeed");

    assert_eq!(ctx.processed, 2);
    assert!(ctx.errors.is_empty());
    assert_eq!(ctx.results.len(), 4);
    // both benzene fail records sort before the two ethanol passes
    assert!(ctx.results[0].failed && ctx.results[1].failed);
    assert!(!ctx.results[2].failed && !ctx.results[3].failed);
    // column order recorded per set, in dispatch order
    assert_eq!(ctx.pattern_columns.len(), 2);
    assert_eq!(ctx.columns_for("PAINS").unwrap().len(), 2);
    assert_eq!(ctx.columns_for("Custom").unwrap(), ["aromatic".to_string()]);
    assert_eq!(service.call_count(), 2);
}

#[tokio::test]
async fn test_failed_set_does_not_abort_the_others() {
    let service = CannedService { fail_toxicity: true,
                                  counts: Some(counts_json()),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();
    let selection = FilterSelection { toxicity: true,
                                      custom: vec![PatternSpec::new("c1ccccc1", "aromatic").unwrap()],
                                      ..FilterSelection::default() };

    let ctx = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "CCO ethanol\nc1ccccc1 benzene",
                             &selection).await
                                        .expect("submission should still succeed");

    // the toxicity failure is a user-visible error, not an abort
    assert_eq!(ctx.errors.len(), 1);
    assert!(ctx.errors[0].contains("PAINS"));
    // the custom set still contributed its records
    assert_eq!(ctx.results.len(), 2);
    assert_eq!(ctx.results[0].filter_name, "Custom");
}

#[tokio::test]
async fn test_second_submission_is_a_noop_while_busy() {
    let service = CannedService { counts: Some(counts_json()),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();
    let permit = gate.try_acquire().expect("gate starts free");

    let selection = FilterSelection { custom: vec![PatternSpec::new("c1ccccc1", "aromatic").unwrap()],
                                      ..FilterSelection::default() };
    let err = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "CCO ethanol",
                             &selection).await
                                        .unwrap_err();
    assert_eq!(err, CoreError::SubmissionInFlight);
    assert_eq!(service.call_count(), 0);

    // releasing the permit lets the next submission through
    drop(permit);
    assert!(gate.try_acquire().is_some());
}

#[tokio::test]
async fn test_no_enabled_pattern_set_is_rejected() {
    let service = CannedService::default();
    let gate = SubmissionGate::new();
    let err = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "CCO ethanol",
                             &FilterSelection::default()).await
                                                         .unwrap_err();
    assert_eq!(err, CoreError::NoPatternSet);
}

#[tokio::test]
async fn test_empty_batch_skips_dispatch() {
    let service = CannedService { toxicity: Some(toxicity_json()),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();
    let selection = FilterSelection { toxicity: true,
                                      ..FilterSelection::default() };

    let ctx = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "\n\n",
                             &selection).await
                                        .expect("empty input is not an error");
    assert_eq!(ctx.processed, 0);
    assert!(ctx.results.is_empty());
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_secondary_asset_set_flows_through_to_merged_records() {
    let partition = json!({
        "failed": [{"name": "benzene", "smiles": "c1ccccc1",
                    "reason": "quinone_A", "highlight_atoms": [[0, 1]]}],
        "passed": [{"name": "ethanol", "smiles": "CCO"}]
    });
    let service = CannedService { partition: Some(partition),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();

    let asset_path = std::env::temp_dir().join(format!("smartsfilter_blake_{}.sma", std::process::id()));
    std::fs::write(&asset_path, "O=C1C=CC(=O)C=C1 quinone_A\n[OH] hydroxyl\n").unwrap();
    let selection = FilterSelection { secondary_asset: Some(asset_path.clone()),
                                      ..FilterSelection::default() };

    let ctx = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "CCO ethanol\nc1ccccc1 benzene",
                             &selection).await
                                        .expect("submission should succeed");
    let _ = std::fs::remove_file(&asset_path);

    assert!(ctx.errors.is_empty());
    assert_eq!(service.call_count(), 1);
    // the asset's pattern names become the set's declared columns
    assert_eq!(ctx.columns_for("Blake").unwrap(),
               ["quinone_A".to_string(), "hydroxyl".to_string()]);
    assert_eq!(ctx.results.len(), 2);
    assert_eq!(ctx.results[0].name, "benzene");
    assert!(ctx.results[0].failed);
    assert_eq!(ctx.results[0].filter_name, "Blake");
    assert_eq!(ctx.results[0].matches, Some(vec![true, false]));
    assert_eq!(ctx.results[0].highlight_atoms, vec![0, 1]);
    assert!(!ctx.results[1].failed);
}

#[tokio::test]
async fn test_missing_secondary_asset_only_disables_that_set() {
    let service = CannedService { counts: Some(counts_json()),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();
    let selection = FilterSelection { secondary_asset: Some("/nonexistent/ursu_pains.sma".into()),
                                      custom: vec![PatternSpec::new("c1ccccc1", "aromatic").unwrap()],
                                      ..FilterSelection::default() };

    let ctx = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             SubmissionConfig::default(),
                             "CCO ethanol\nc1ccccc1 benzene",
                             &selection).await
                                        .expect("submission should succeed");
    assert_eq!(ctx.errors.len(), 1);
    assert!(ctx.errors[0].contains("asset"));
    assert_eq!(ctx.results.len(), 2);
}

#[tokio::test]
async fn test_include_fails_filter_drops_pass_rows() {
    let service = CannedService { counts: Some(counts_json()),
                                  ..CannedService::default() };
    let gate = SubmissionGate::new();
    let selection = FilterSelection { custom: vec![PatternSpec::new("c1ccccc1", "aromatic").unwrap()],
                                      ..FilterSelection::default() };
    let mut config = SubmissionConfig::default();
    config.flags.include_passes = false;

    let ctx = run_submission(&service,
                             Arc::new(Passthrough),
                             &gate,
                             config,
                             "CCO ethanol\nc1ccccc1 benzene",
                             &selection).await
                                        .expect("submission should succeed");
    assert_eq!(ctx.results.len(), 1);
    assert!(ctx.results[0].failed);
}
