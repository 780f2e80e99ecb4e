use std::path::PathBuf;
use std::sync::Arc;

use smarts_adapters::{run_submission, FilterSelection, HttpMatchService, ServiceConfig, SubmissionGate};
use smarts_core::{AnalysisDetail, AnalysisStore, MatchRecord, SubmissionContext};
use smarts_domain::{parse_pattern_list, PatternSpec, SubmissionConfig};
use smarts_rdkit::RdkitEngine;

/// Opciones de línea de comandos, parseadas a mano.
#[derive(Debug, Default)]
struct CliArgs {
    smiles_file: Option<PathBuf>,
    smarts_file: Option<PathBuf>,
    single: Option<String>,
    pains: bool,
    blake: bool,
    delimiter: Option<String>,
    structure_col: Option<usize>,
    name_col: Option<Option<usize>>,
    header: bool,
    csv_out: Option<PathBuf>,
    depict_dir: Option<PathBuf>,
    analyze: Option<String>,
    no_passes: bool,
    no_fails: bool,
    exclude_molprops: bool,
    strict: bool,
    unique_atoms: bool,
    kekulized: bool,
    isomeric: bool,
    non_zero_rows: bool,
}

fn print_usage() {
    eprintln!("uso: smarts-cli --smiles <archivo> [filtros] [opciones]");
    eprintln!("  filtros: --pains | --blake | --smarts <archivo> | --pattern <SMARTS[:nombre]>");
    eprintln!("  entrada: --delimiter <c> --structure-col <N> --name-col <N|none> --header");
    eprintln!("  salida:  --csv <archivo> --depict <dir> --analyze <nombre[@set]> --no-passes --no-fails");
    eprintln!("  experto: --exclude-molprops --strict --unique-atoms --kekulized --isomeric --non-zero-rows");
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        let take_value = |i: &mut usize| -> Result<String, String> {
            *i += 1;
            args.get(*i).cloned().ok_or_else(|| format!("falta valor para {}", args[*i - 1]))
        };
        match args[i].as_str() {
            "--smiles" => parsed.smiles_file = Some(PathBuf::from(take_value(&mut i)?)),
            "--smarts" => parsed.smarts_file = Some(PathBuf::from(take_value(&mut i)?)),
            "--pattern" => parsed.single = Some(take_value(&mut i)?),
            "--pains" => parsed.pains = true,
            "--blake" => parsed.blake = true,
            "--delimiter" => parsed.delimiter = Some(take_value(&mut i)?),
            "--structure-col" => {
                let v = take_value(&mut i)?;
                parsed.structure_col = Some(v.parse().map_err(|_| format!("columna inválida: {v}"))?);
            }
            "--name-col" => {
                let v = take_value(&mut i)?;
                parsed.name_col = Some(if v == "none" {
                                           None
                                       } else {
                                           Some(v.parse().map_err(|_| format!("columna inválida: {v}"))?)
                                       });
            }
            "--header" => parsed.header = true,
            "--csv" => parsed.csv_out = Some(PathBuf::from(take_value(&mut i)?)),
            "--depict" => parsed.depict_dir = Some(PathBuf::from(take_value(&mut i)?)),
            "--analyze" => parsed.analyze = Some(take_value(&mut i)?),
            "--no-passes" => parsed.no_passes = true,
            "--no-fails" => parsed.no_fails = true,
            "--exclude-molprops" => parsed.exclude_molprops = true,
            "--strict" => parsed.strict = true,
            "--unique-atoms" => parsed.unique_atoms = true,
            "--kekulized" => parsed.kekulized = true,
            "--isomeric" => parsed.isomeric = true,
            "--non-zero-rows" => parsed.non_zero_rows = true,
            other => return Err(format!("opción desconocida: {other}")),
        }
        i += 1;
    }
    Ok(parsed)
}

fn build_config(args: &CliArgs) -> SubmissionConfig {
    let mut config = SubmissionConfig::default();
    if let Some(d) = &args.delimiter {
        config.delimiter = d.clone();
    }
    if let Some(c) = args.structure_col {
        config.structure_col = c;
    }
    if let Some(c) = args.name_col {
        config.name_col = c;
    }
    config.has_header = args.header;
    config.flags.exclude_molprops = args.exclude_molprops;
    config.flags.strict = args.strict;
    config.flags.unique_atom_set = args.unique_atoms;
    config.flags.kekulized = args.kekulized;
    config.flags.isomeric = args.isomeric;
    config.flags.non_zero_rows = args.non_zero_rows;
    config.flags.include_passes = !args.no_passes;
    config.flags.include_fails = !args.no_fails;
    config
}

/// Toma el primer token de la estructura antes de depictarla (puede
/// arrastrar el nombre si el usuario pegó "SMILES nombre").
fn sanitize_structure(structure: &str) -> &str {
    structure.split(' ').next().unwrap_or(structure).trim()
}

fn write_csv(path: &PathBuf, results: &[MatchRecord]) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Index", "Structure", "Molecule Name", "SMART Filter", "Result"])?;
    for (idx, record) in results.iter().enumerate() {
        writer.write_record([(idx + 1).to_string(),
                             record.structure.clone(),
                             record.name.clone(),
                             record.pattern_label.clone(),
                             if record.failed { "Matched".to_string() } else { "Not Matched".to_string() }])?;
    }
    writer.flush()?;
    Ok(())
}

fn print_results(ctx: &SubmissionContext) {
    println!("Results ({} molecules processed, {} failed)", ctx.processed, ctx.failed_count());
    for (idx, record) in ctx.results.iter().enumerate() {
        println!("{:>4}  {:<6}  {:<12}  {:<24}  {}",
                 idx + 1,
                 if record.failed { "Fail" } else { "Pass" },
                 record.filter_name,
                 record.name,
                 record.pattern_label);
    }
}

/// `--analyze` acepta `nombre` o `nombre@set` cuando la molécula aparece
/// en más de un pattern-set.
fn split_analysis_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('@') {
        Some((name, set)) => (name, Some(set)),
        None => (target, None),
    }
}

fn find_analysis_records<'a>(results: &'a [MatchRecord], target: &str) -> Vec<&'a MatchRecord> {
    let (name, set) = split_analysis_target(target);
    results.iter()
           .filter(|r| r.name == name && set.map_or(true, |s| r.filter_name == s))
           .collect()
}

/// Vista de análisis de una molécula: mismo detalle que la página
/// `/analyze` original, entregado vía token de sesión de lectura única.
fn print_analysis(ctx: &SubmissionContext, store: &AnalysisStore, target: &str) {
    let candidates = find_analysis_records(&ctx.results, target);
    let record = match candidates.as_slice() {
        [] => {
            eprintln!("[smarts-cli] molécula no encontrada en los resultados: {target}");
            return;
        }
        [only] => *only,
        [first, ..] => {
            let sets: Vec<&str> = candidates.iter().map(|r| r.filter_name.as_str()).collect();
            eprintln!("[smarts-cli] la molécula aparece en varios sets ({}); usar nombre@set",
                      sets.join(", "));
            *first
        }
    };
    let Some(columns) = ctx.columns_for(&record.filter_name) else {
        eprintln!("[smarts-cli] sin columnas de patrones para el set {}", record.filter_name);
        return;
    };
    let Some(detail) = AnalysisDetail::from_record(record, columns) else {
        eprintln!("[smarts-cli] el registro no trae vector de matches");
        return;
    };

    let token = store.store(detail);
    // lectura única, como el sessionStorage original
    let detail = store.take(&token).expect("token recién emitido");
    println!("\nAnalysis of Molecule");
    println!("  Name: {}", detail.name);
    println!("  Result: {}", if detail.failed() { "Fail" } else { "Pass" });
    println!("  Total SMARTS: {}", detail.pattern_names.len());
    println!("  Total Matches: {}", detail.total_matches());
    for (pattern, matched) in detail.pattern_names.iter().zip(detail.matches.iter()) {
        println!("    {}  {}", if *matched { "Fail" } else { "Pass" }, pattern);
    }
}

fn depict_failed(engine: &RdkitEngine, dir: &PathBuf, results: &[MatchRecord]) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("[smarts-cli] no se pudo crear {}: {e}", dir.display());
        return;
    }
    for record in results.iter().filter(|r| r.failed) {
        let safe: String = record.name.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect();
        let path = dir.join(format!("{safe}.svg"));
        match engine.depict_svg(sanitize_structure(&record.structure), &record.highlight_atoms) {
            Ok(svg) => {
                if let Err(e) = std::fs::write(&path, svg) {
                    eprintln!("[smarts-cli] error escribiendo {}: {e}", path.display());
                }
            }
            Err(e) => eprintln!("[smarts-cli] depicción fallida para {}: {e}", record.name),
        }
    }
}

#[tokio::main]
async fn main() {
    // Cargar .env si existe para obtener SMARTSFILTER_API_URL
    let _ = dotenvy::dotenv();
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw_args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("[smarts-cli] {e}");
            print_usage();
            std::process::exit(2);
        }
    };

    let Some(smiles_file) = &args.smiles_file else {
        print_usage();
        std::process::exit(2);
    };
    let smiles_text = match std::fs::read_to_string(smiles_file) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("[smarts-cli] no se pudo leer {}: {e}", smiles_file.display());
            std::process::exit(3);
        }
    };

    let mut selection = FilterSelection { toxicity: args.pains,
                                          ..FilterSelection::default() };
    let service_config = ServiceConfig::from_env();
    if args.blake {
        selection.secondary_asset = Some(service_config.asset_dir.join("ursu_pains.sma"));
    }
    if let Some(raw) = &args.single {
        let (smarts, name) = match raw.split_once(':') {
            Some((s, n)) => (s, n),
            None => (raw.as_str(), "single"),
        };
        match PatternSpec::new(smarts, name) {
            Ok(spec) => selection.single = Some(spec),
            Err(e) => {
                eprintln!("[smarts-cli] patrón inválido: {e}");
                std::process::exit(2);
            }
        }
    }
    if let Some(path) = &args.smarts_file {
        match std::fs::read_to_string(path) {
            Ok(text) => selection.custom = parse_pattern_list(&text),
            Err(e) => {
                eprintln!("[smarts-cli] no se pudo leer {}: {e}", path.display());
                std::process::exit(3);
            }
        }
    }

    let engine = match RdkitEngine::init() {
        Ok(e) => Arc::new(e),
        Err(e) => {
            eprintln!("[smarts-cli] RDKit no disponible: {e}");
            std::process::exit(5);
        }
    };
    let service = match HttpMatchService::new(&service_config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("[smarts-cli] cliente HTTP inválido: {e}");
            std::process::exit(5);
        }
    };

    let gate = SubmissionGate::new();
    let ctx = match run_submission(&service,
                                   engine.clone(),
                                   &gate,
                                   build_config(&args),
                                   &smiles_text,
                                   &selection).await
    {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("[smarts-cli] submission fallida: {e}");
            std::process::exit(4);
        }
    };

    for error in &ctx.errors {
        eprintln!("[smarts-cli] {error}");
    }
    print_results(&ctx);

    if let Some(path) = &args.csv_out {
        if let Err(e) = write_csv(path, &ctx.results) {
            eprintln!("[smarts-cli] error exportando CSV: {e}");
        } else {
            println!("CSV escrito en {}", path.display());
        }
    }
    if let Some(dir) = &args.depict_dir {
        depict_failed(&engine, dir, &ctx.results);
    }
    if let Some(target) = &args.analyze {
        let store = AnalysisStore::new();
        print_analysis(&ctx, &store, target);
    }
}
