//! Per-command reports: the store's records run through the core analysis,
//! shaped for JSON output.
//!
//! Reports assume the payloads they need are already loaded; see
//! [`crate::data_dir::DataDir`]. A missing projection or observed payload
//! yields an empty report section, never an error.

use crate::config::RequestConfig;
use htf_core::error::HtfError;
use htf_core::ingest::StationDatumLevels;
use htf_core::levels::{ContextEntry, LevelCatalog, LevelKey, LevelPayload, ReferenceLevel, ThresholdOption};
use htf_core::scenario::Scenario;
use htf_core::station::Station;
use htf_core::threshold::{ThresholdDescriptor, ThresholdSelection};
use htf_core::unit::Unit;
use htf_data::narrative::{
    classify_change, projection_narrative, ChangeClass, Likelihood, Probability,
    ProjectionNarrative,
};
use htf_data::observed::{analyze_observed, FloodCounts, FloodingDay, ObservedPayload, ObservedSummary};
use htf_data::projection::ProjectionTables;
use htf_data::yoi::{agrees_with_precomputed, detect_yoi, YoiResult};
use htf_db::models::ProjectionKey;
use htf_db::Database;
use serde::Serialize;

/// A station with its catalog and the resolved threshold for one request.
#[derive(Debug, Clone)]
pub struct StationContext {
    pub station: Station,
    pub catalog: LevelCatalog,
    pub selection: ThresholdSelection,
}

impl StationContext {
    /// Look up the station, build its catalog in the request unit and resolve
    /// the threshold. Fails for an unknown station or a station without levels.
    pub fn resolve(db: &Database, station_id: &str, config: &RequestConfig) -> anyhow::Result<Self> {
        let station = db.query_station(station_id)?;
        let payload = db.query_levels(station_id)?.ok_or_else(|| {
            HtfError::MissingData(format!("no levels for station {station_id}"))
        })?;
        let catalog = LevelCatalog::build(&payload, config.unit);
        let selection = config.resolve_threshold(&catalog)?;
        log::info!(
            "[HTF] report: {} at {} ({})",
            station.id,
            selection.key,
            selection.name()
        );
        Ok(Self {
            station,
            catalog,
            selection,
        })
    }

    fn station_id(&self) -> &str {
        &self.station.id
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LevelsReport {
    pub station: Station,
    pub unit: Unit,
    pub levels: Vec<ReferenceLevel>,
    pub threshold_options: Vec<ThresholdOption>,
    pub selected: ThresholdDescriptor,
    /// Reference-line draw order, selected level last.
    pub highlight_order: Vec<LevelKey>,
    pub return_period_context: Vec<ContextEntry>,
    pub updated: Option<String>,
}

pub fn levels_report(context: &StationContext) -> LevelsReport {
    let catalog = &context.catalog;
    LevelsReport {
        station: context.station.clone(),
        unit: catalog.unit,
        levels: catalog.levels().to_vec(),
        threshold_options: catalog.threshold_options(),
        selected: context.selection.descriptor(),
        highlight_order: catalog
            .highlight_order(&context.selection.key)
            .into_iter()
            .map(|level| level.key)
            .collect(),
        return_period_context: catalog.return_period_context(),
        updated: catalog.updated.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdReport {
    pub station_id: String,
    pub unit: Unit,
    /// Selection-list value: a category name or "custom".
    pub value: &'static str,
    pub descriptor: ThresholdDescriptor,
    pub display_height: f64,
}

pub fn threshold_report(context: &StationContext, config: &RequestConfig) -> ThresholdReport {
    let selection = &context.selection;
    ThresholdReport {
        station_id: context.station_id().to_string(),
        unit: config.unit,
        value: selection.resolution.value(),
        descriptor: selection.descriptor(),
        display_height: selection.display_height(config.unit),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountSource {
    DailyRecord,
    Precomputed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservedReport {
    pub station_id: String,
    pub unit: Unit,
    pub threshold: ThresholdDescriptor,
    /// Threshold in `unit`, the height flooding days are compared against.
    pub display_threshold: f64,
    pub source: CountSource,
    pub flooding_days: Vec<FloodingDay>,
    pub counts: ObservedPayload,
    pub summary: ObservedSummary,
    pub long_term: Option<LongTermNarrative>,
}

/// Observed flooding for the selected threshold.
///
/// Days are always counted from the daily record. With `precomputed`, the
/// annual/monthly/climatology tables come from the stored observed payload
/// instead, when one exists.
pub fn observed_report(
    db: &Database,
    context: &StationContext,
    config: &RequestConfig,
    precomputed: bool,
) -> anyhow::Result<ObservedReport> {
    let station_id = context.station_id();
    let record = db.query_daily_record(station_id)?;
    let payload = db.query_observed(station_id, &context.selection.key)?;
    let long_term = payload.as_ref().and_then(|p| p.long_term.clone());

    let analysis = analyze_observed(&record, &context.selection, config.unit, long_term.clone());
    let mut summary = analysis.summary;
    let (source, counts) = match payload.as_ref().filter(|_| precomputed) {
        Some(payload) => {
            let counts = FloodCounts::from_payload(payload)?;
            summary.climatology = counts.climatology_months();
            summary.annual_max = counts.annual_max();
            summary.monthly_max = counts.monthly_max();
            (CountSource::Precomputed, counts)
        }
        None => {
            if precomputed {
                log::warn!(
                    "[HTF] report: no precomputed counts for {} at {}, counting the daily record",
                    station_id,
                    context.selection.key
                );
            }
            (CountSource::DailyRecord, analysis.counts)
        }
    };

    Ok(ObservedReport {
        station_id: station_id.to_string(),
        unit: config.unit,
        threshold: context.selection.descriptor(),
        display_threshold: analysis.threshold,
        source,
        flooding_days: analysis.flooding_days,
        counts: counts.to_payload(long_term.clone()),
        summary,
        long_term: long_term.map(|lt| LongTermNarrative::new(&lt, config.unit)),
    })
}

/// First-decade vs last-decade comparison, ready for phrasing.
#[derive(Debug, Clone, Serialize)]
pub struct LongTermNarrative {
    pub first_period: String,
    pub last_period: String,
    /// Mean sea level change between the periods, in the report unit.
    pub msl_change: f64,
    pub first_per_year: f64,
    pub last_per_year: f64,
    pub change: ChangeClass,
    /// How likely the sea-level change contributed to the change in flooding.
    /// `None` when the flooding rate did not change.
    pub likelihood: Option<Likelihood>,
    /// Percent-chance range quoted with `likelihood`.
    pub likelihood_range: Option<(u32, u32)>,
}

impl LongTermNarrative {
    pub fn new(long_term: &htf_data::observed::LongTermChange, unit: Unit) -> Self {
        let likelihood = (long_term.htf_pyr_change != 0.0).then(|| {
            Likelihood::from_chance_probability(Probability::Percent(long_term.htf_pyr_diff_prob))
        });
        Self {
            first_period: long_term.first_period_label(),
            last_period: long_term.last_period_label(),
            msl_change: long_term.msl_change_in(unit),
            first_per_year: long_term.f10_htf_pyr,
            last_per_year: long_term.l10_htf_pyr,
            change: classify_change(long_term.f10_htf_pyr, long_term.l10_htf_pyr),
            likelihood,
            likelihood_range: likelihood.map(|l| l.chance_range()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionReport {
    pub station_id: String,
    pub scenario: Scenario,
    pub threshold: ThresholdDescriptor,
    /// `None` when nothing was computed for this combination.
    pub projection: Option<ProjectionTables>,
}

pub fn projection_report(
    db: &Database,
    context: &StationContext,
    config: &RequestConfig,
) -> anyhow::Result<ProjectionReport> {
    let tables = db.query_projection(context.station_id(), config.scenario, &context.selection.key)?;
    Ok(ProjectionReport {
        station_id: context.station_id().to_string(),
        scenario: config.scenario,
        threshold: context.selection.descriptor(),
        projection: tables.map(|t| (*t).clone()),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct YoiReport {
    pub station_id: String,
    pub scenario: Scenario,
    pub threshold: ThresholdDescriptor,
    pub has_projection: bool,
    /// Recomputed from the projection's median annual series.
    pub yoi: Option<YoiResult>,
    pub precomputed: Option<[i32; 3]>,
    pub agrees: bool,
}

pub fn yoi_report(
    db: &Database,
    context: &StationContext,
    config: &RequestConfig,
) -> anyhow::Result<YoiReport> {
    let tables = db.query_projection(context.station_id(), config.scenario, &context.selection.key)?;
    let yoi = tables.as_ref().and_then(|t| detect_yoi(&t.annual_median(), None));
    let precomputed = tables.as_ref().and_then(|t| t.yoi);
    Ok(YoiReport {
        station_id: context.station_id().to_string(),
        scenario: config.scenario,
        threshold: context.selection.descriptor(),
        has_projection: tables.is_some(),
        agrees: agrees_with_precomputed(yoi.as_ref(), precomputed),
        yoi,
        precomputed,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrativeReport {
    pub station_id: String,
    pub scenario: Scenario,
    pub scenario_label: &'static str,
    pub threshold: ThresholdDescriptor,
    pub yoi: Option<YoiResult>,
    pub projection: Option<ProjectionNarrative>,
    pub long_term: Option<LongTermNarrative>,
}

pub fn narrative_report(
    db: &Database,
    context: &StationContext,
    config: &RequestConfig,
) -> anyhow::Result<NarrativeReport> {
    let station_id = context.station_id();
    let key = &context.selection.key;
    let tables = db.query_projection(station_id, config.scenario, key)?;
    let yoi = tables.as_ref().and_then(|t| detect_yoi(&t.annual_median(), None));
    let projection = tables
        .as_ref()
        .map(|t| projection_narrative(t, config.scenario, yoi.as_ref().map(|y| y.counts)));
    let long_term = db
        .query_observed(station_id, key)?
        .and_then(|payload| payload.long_term)
        .map(|lt| LongTermNarrative::new(&lt, config.unit));
    Ok(NarrativeReport {
        station_id: station_id.to_string(),
        scenario: config.scenario,
        scenario_label: config.scenario.label(),
        threshold: context.selection.descriptor(),
        yoi,
        projection,
        long_term,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenariosReport {
    pub station_id: String,
    pub threshold: ThresholdDescriptor,
    pub available: Vec<ProjectionKey>,
}

pub fn scenarios_report(db: &Database, context: &StationContext) -> anyhow::Result<ScenariosReport> {
    let available = db
        .query_projection_keys(context.station_id())?
        .into_iter()
        .filter(|k| k.threshold_key == context.selection.key)
        .collect();
    Ok(ScenariosReport {
        station_id: context.station_id().to_string(),
        threshold: context.selection.descriptor(),
        available,
    })
}

/// Convert published station-datum levels into an MHHW-relative payload.
pub fn normalize_levels(json: &str) -> anyhow::Result<LevelPayload> {
    let raw: StationDatumLevels = serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("Failed to parse station levels: {}", e))?;
    Ok(raw.normalize())
}
