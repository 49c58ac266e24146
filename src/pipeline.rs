// Batch orchestration: long CSV -> master table -> figures and tables

use crate::charts::{Heatmap, RankedBars, TileMap, TimeSeries};
use crate::config::PipelineConfig;
use crate::features::{MasterTable, Observation};
use crate::profile::{LongProfile, MasterProfile, QualityProfile};
use crate::report::TableEmitter;
use crate::scene::Scene;
use crate::stats::{correlation_matrix, describe, simple_regression};
use crate::svg;
use crate::table::Table;
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const MASTER_FILE: &str = "master_dataset.csv";
pub const TIMESERIES_PREFIX: &str = "fig_timeseries";
pub const RANKED_BAR_FILE: &str = "fig_top_countries.svg";
pub const HEATMAP_FILE: &str = "fig_correlation_heatmap.svg";
pub const TILE_MAP_FILE: &str = "fig_tile_grid_map.svg";
pub const DESCRIPTIVES_FILE: &str = "table_descriptives.tex";
pub const CORRELATIONS_FILE: &str = "table_correlations.tex";
pub const REGRESSIONS_FILE: &str = "table_regressions.tex";

/// What a run of [`build_assets`] produced.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AssetReport {
    pub written: Vec<PathBuf>,
    /// Artifacts not written because they had no usable data.
    pub skipped: Vec<String>,
}

/// File name of the time-series figure for `geo` and `variable`.
pub fn timeseries_file(geo: &str, variable: &str) -> String {
    format!("{}_{}_{}.svg", TIMESERIES_PREFIX, geo, variable).to_lowercase()
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, so readers never see a partially written artifact.
pub fn write_artifact(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(contents)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to persist {}", path.display()))?;

    info!("wrote {}", path.display());
    Ok(())
}

/// Load the long table and convert it to observations.
pub fn load_long(path: &Path, config: &PipelineConfig) -> Result<(Table, Vec<Observation>)> {
    let table = Table::from_path(path)
        .with_context(|| format!("Failed to read long table {}", path.display()))?;
    if table.skipped_rows > 0 {
        warn!("{}: skipped {} malformed rows", path.display(), table.skipped_rows);
    }
    let observations = Observation::from_long_table(&table, &config.long_columns)?;
    info!("loaded {} observations from {}", observations.len(), path.display());
    Ok((table, observations))
}

pub fn build_master(long_path: &Path, config: &PipelineConfig) -> Result<MasterTable> {
    let (_, observations) = load_long(long_path, config)?;
    let builder = config
        .feature_builder()
        .context("Invalid derived column configuration")?;
    Ok(builder.build(&observations))
}

pub fn write_master(master: &MasterTable, path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    master.to_table().write_to(&mut buf)?;
    write_artifact(path, &buf)
}

pub fn load_master(path: &Path) -> Result<MasterTable> {
    let table = Table::from_path(path)
        .with_context(|| format!("Failed to read master table {}", path.display()))?;
    Ok(MasterTable::from_table(&table)?)
}

/// Render every figure and table for `master`. Charts without data are
/// skipped and listed in the report; an empty master table is an error.
pub fn build_assets(
    master: &MasterTable,
    config: &PipelineConfig,
    figures_dir: &Path,
    tables_dir: &Path,
) -> Result<AssetReport> {
    if master.is_empty() {
        anyhow::bail!("Master table has no rows; nothing to render");
    }

    let mut report = AssetReport::default();
    let style = config.scene_style();

    let ts = &config.timeseries;
    let scene = TimeSeries::from_master(master, &ts.geo, &ts.variable).map(|s| s.render(ts.size, &style));
    emit_scene(&mut report, figures_dir, &timeseries_file(&ts.geo, &ts.variable), scene)?;

    let rb = &config.ranked_bar;
    let scene = RankedBars::from_master(master, &rb.variable, rb.min_observations, rb.top_k)
        .map(|r| r.render(rb.size, &style));
    emit_scene(&mut report, figures_dir, RANKED_BAR_FILE, scene)?;

    let scene = Heatmap::from_master(master, &config.variables)
        .map(|h| h.render(config.heatmap.size, &style));
    emit_scene(&mut report, figures_dir, HEATMAP_FILE, scene)?;

    let tm = &config.tile_map;
    let scene = TileMap::from_master(master, &tm.variable).map(|t| t.render(tm.size, &style));
    emit_scene(&mut report, figures_dir, TILE_MAP_FILE, scene)?;

    let emitter = TableEmitter::new(config.derived_names());

    let stats: Vec<_> = config
        .variables
        .iter()
        .filter_map(|v| describe(v, &master.column(v)))
        .collect();
    emit_table(&mut report, tables_dir, DESCRIPTIVES_FILE, emitter.descriptives(&stats))?;

    let columns: Vec<(String, Vec<Option<f64>>)> = config
        .variables
        .iter()
        .map(|v| (v.clone(), master.column(v)))
        .collect();
    let matrix = correlation_matrix(&columns);
    emit_table(&mut report, tables_dir, CORRELATIONS_FILE, emitter.correlations(&matrix))?;

    let response = master.column(&config.response);
    let fits: Vec<_> = config
        .predictors
        .iter()
        .map(|p| simple_regression(p, &config.response, &master.column(p), &response))
        .inspect(|f| {
            if !f.is_defined() {
                warn!("regression of {} on {} is undefined", f.response, f.predictor);
            }
        })
        .collect();
    emit_table(
        &mut report,
        tables_dir,
        REGRESSIONS_FILE,
        emitter.regressions(&config.response, &fits),
    )?;

    info!(
        "assets: {} written, {} skipped",
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}

fn emit_scene(report: &mut AssetReport, dir: &Path, name: &str, scene: Option<Scene>) -> Result<()> {
    match scene {
        Some(scene) => {
            let path = dir.join(name);
            write_artifact(&path, svg::render(&scene).as_bytes())?;
            report.written.push(path);
        }
        None => {
            info!("skipping {}: no usable data", name);
            report.skipped.push(name.to_string());
        }
    }
    Ok(())
}

fn emit_table(report: &mut AssetReport, dir: &Path, name: &str, contents: String) -> Result<()> {
    let path = dir.join(name);
    write_artifact(&path, contents.as_bytes())?;
    report.written.push(path);
    Ok(())
}

/// Build the master table and every asset under `out_dir`.
pub fn run(long_path: &Path, out_dir: &Path, config: &PipelineConfig) -> Result<AssetReport> {
    let master = build_master(long_path, config)?;
    write_master(&master, &out_dir.join(MASTER_FILE))?;
    build_assets(&master, config, &out_dir.join("figures"), &out_dir.join("tables"))
}

pub fn profile(long_path: &Path, config: &PipelineConfig) -> Result<QualityProfile> {
    let (table, observations) = load_long(long_path, config)?;
    let builder = config
        .feature_builder()
        .context("Invalid derived column configuration")?;
    let master = builder.build(&observations);
    Ok(QualityProfile {
        long: LongProfile::new(&observations, table.skipped_rows),
        master: MasterProfile::new(&master, &config.variables),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtlasError;

    const LONG: &str = "freq,indic_nrgm,unit,geo,year,value
A,CMPY_ECAP5,PC,DE,2020,10.0
A,GRTL,NR,DE,2020,5.0
A,CMPY_ECAP5,PC,DE,2021,12.0
A,GRTL,NR,DE,2021,5.5
A,CMPY_ECAP5,PC,DE,2022,11.0
A,GRTL,NR,DE,2022,5.2
A,CMPY_EG5,PC,DE,2022,4.0
";

    #[test]
    fn test_timeseries_file_name() {
        assert_eq!(timeseries_file("DE", "GRTL_NR"), "fig_timeseries_de_grtl_nr.svg");
    }

    #[test]
    fn test_write_artifact_creates_dirs_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");
        write_artifact(&path, b"first").unwrap();
        write_artifact(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        // No temporary files left behind.
        assert_eq!(fs::read_dir(dir.path().join("nested")).unwrap().count(), 1);
    }

    #[test]
    fn test_run_writes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let long = dir.path().join("long.csv");
        fs::write(&long, LONG).unwrap();

        let out = dir.path().join("out");
        let report = run(&long, &out, &PipelineConfig::default()).unwrap();

        // Only DE has data and only three observations: no ranked bars.
        assert_eq!(report.skipped, vec![RANKED_BAR_FILE.to_string()]);
        assert!(out.join(MASTER_FILE).is_file());
        assert!(out.join("figures").join("fig_timeseries_de_grtl_nr.svg").is_file());
        assert!(out.join("figures").join(HEATMAP_FILE).is_file());
        assert!(out.join("figures").join(TILE_MAP_FILE).is_file());
        assert!(!out.join("figures").join(RANKED_BAR_FILE).exists());
        for table in [DESCRIPTIVES_FILE, CORRELATIONS_FILE, REGRESSIONS_FILE] {
            assert!(out.join("tables").join(table).is_file());
        }
        assert_eq!(report.written.len(), 6);

        let master = load_master(&out.join(MASTER_FILE)).unwrap();
        assert_eq!(master.len(), 3);
        assert_eq!(master.rows[2].get("DERIV_energy_price_gap_PC"), Some("7.000"));
        assert_eq!(master.rows[0].get("DERIV_energy_price_gap_PC"), Some(""));
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let err = run(&dir.path().join("absent.csv"), &out, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AtlasError>(),
            Some(AtlasError::InputNotFound(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn test_empty_master_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_assets(
            &MasterTable::default(),
            &PipelineConfig::default(),
            dir.path(),
            dir.path(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_profile() {
        let dir = tempfile::tempdir().unwrap();
        let long = dir.path().join("long.csv");
        fs::write(&long, LONG).unwrap();
        let p = profile(&long, &PipelineConfig::default()).unwrap();
        assert_eq!(p.long.rows, 7);
        assert_eq!(p.master.rows, 3);
        assert_eq!(p.master.first_year.as_deref(), Some("2020"));
    }
}
