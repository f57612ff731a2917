//! # Mass-Range Catalog
//!
//! The static configuration of the engine: an ordered list of mass ranges,
//! each with its own ordered stage sequence.
//!
//! A catalog is validated once when it is built and is read-only afterwards.
//! The built-in catalog ships as a TOML asset and is parsed on first use into
//! a process-wide [`OnceLock`]; alternative catalogs can be loaded from disk
//! with [`Catalog::load`].
//!
//! ## Validation Rules
//!
//! | Rule | Scope |
//! |------|-------|
//! | First range starts at `MIN_MASS`, last ends at `MAX_MASS` | catalog |
//! | Each range starts where the previous one ends | catalog |
//! | Range names are unique | catalog |
//! | `min <= max`, at least one stage | range |
//! | Last stage is unbounded, every other stage is finite | range |
//! | Non-terminal stages have a transition time `> 0` | stage |
//! | Colors in `[0, 1]`, radius / emission / spread finite and `>= 0` | stage |
//! | Particle count `<= MAX_PARTICLE_COUNT` | stage |

use crate::primitives::{MAX_MASS, MAX_PARTICLE_COUNT, MIN_MASS};
use crate::types::{Color, ParticleEmission, Stage, StageDuration, StellarError, TextureRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// The built-in catalog source.
const BUILTIN_TOML: &str = include_str!("../assets/mass_ranges.toml");

static BUILTIN: OnceLock<Result<Catalog, StellarError>> = OnceLock::new();

/// Get the process-wide built-in catalog.
///
/// Parsed and validated on first call; every later call returns the same
/// instance.
pub fn builtin_catalog() -> Result<&'static Catalog, StellarError> {
    BUILTIN
        .get_or_init(|| Catalog::from_toml_str(BUILTIN_TOML))
        .as_ref()
        .map_err(Clone::clone)
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Position of a mass range in its catalog's declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MassRangeId(pub usize);

// =============================================================================
// MASS RANGE
// =============================================================================

/// A named bucket of masses sharing one stage sequence.
///
/// Fields are private: a `MassRange` can only exist in validated form.
#[derive(Debug, Clone, PartialEq)]
pub struct MassRange {
    name: String,
    min: f64,
    max: f64,
    stages: Vec<Stage>,
}

impl MassRange {
    /// Create a range, validating its interval and stage sequence.
    pub fn new(
        name: impl Into<String>,
        min: f64,
        max: f64,
        stages: Vec<Stage>,
    ) -> Result<Self, StellarError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(config_error("mass range name must not be empty"));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(config_error(format!(
                "range '{}' has an invalid interval [{}, {}]",
                name, min, max
            )));
        }
        if stages.is_empty() {
            return Err(config_error(format!("range '{}' has no stages", name)));
        }

        let last = stages.len().saturating_sub(1);
        for (index, stage) in stages.iter().enumerate() {
            validate_stage(&name, index, stage, index == last)?;
        }

        Ok(Self {
            name,
            min,
            max,
            stages,
        })
    }

    /// Get the range name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the inclusive lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Get the inclusive upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Get the ordered stage sequence. Never empty.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Get a stage by index.
    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    /// Index of the terminal stage.
    #[must_use]
    pub fn terminal_index(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    /// Check if the inclusive interval contains `mass`.
    #[must_use]
    pub fn contains(&self, mass: f64) -> bool {
        self.min <= mass && mass <= self.max
    }

    /// Simulated seconds from the start of the sequence until the terminal
    /// stage is committed, transitions included.
    #[must_use]
    pub fn lifetime(&self) -> f64 {
        self.stages
            .iter()
            .filter_map(|s| s.duration.seconds().map(|d| d + s.transition))
            .sum()
    }
}

fn validate_stage(
    range: &str,
    index: usize,
    stage: &Stage,
    terminal: bool,
) -> Result<(), StellarError> {
    let at = || format!("range '{}', stage {} ('{}')", range, index, stage.name);

    if stage.name.trim().is_empty() {
        return Err(config_error(format!(
            "range '{}', stage {} has no name",
            range, index
        )));
    }
    if !stage.color.is_normalized() {
        return Err(config_error(format!("{}: color outside [0, 1]", at())));
    }
    if !stage.radius.is_finite() || stage.radius < 0.0 {
        return Err(config_error(format!("{}: invalid radius", at())));
    }
    if !stage.emission.is_finite() || stage.emission < 0.0 {
        return Err(config_error(format!("{}: invalid emission", at())));
    }
    if let Some(emission) = stage.particles {
        if !emission.spread.is_finite() || emission.spread < 0.0 {
            return Err(config_error(format!("{}: invalid particle spread", at())));
        }
        if emission.count > MAX_PARTICLE_COUNT {
            return Err(config_error(format!(
                "{}: {} particles exceeds the maximum of {}",
                at(),
                emission.count,
                MAX_PARTICLE_COUNT
            )));
        }
    }

    match (terminal, stage.duration) {
        (true, StageDuration::Unbounded) => Ok(()),
        (true, StageDuration::Finite(_)) => Err(config_error(format!(
            "{}: the last stage must be unbounded",
            at()
        ))),
        (false, StageDuration::Unbounded) => Err(config_error(format!(
            "{}: only the last stage may be unbounded",
            at()
        ))),
        (false, StageDuration::Finite(secs)) => {
            if !secs.is_finite() || secs < 0.0 {
                return Err(config_error(format!("{}: invalid duration", at())));
            }
            if !stage.transition.is_finite() || stage.transition <= 0.0 {
                return Err(config_error(format!(
                    "{}: transition time must be positive",
                    at()
                )));
            }
            Ok(())
        }
    }
}

fn config_error(msg: impl Into<String>) -> StellarError {
    StellarError::Configuration(msg.into())
}

// =============================================================================
// CATALOG
// =============================================================================

/// Ordered, validated set of mass ranges covering `[MIN_MASS, MAX_MASS]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    ranges: Vec<MassRange>,
}

impl Catalog {
    /// Create a catalog, validating coverage of the mass domain.
    pub fn new(ranges: Vec<MassRange>) -> Result<Self, StellarError> {
        let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
            return Err(config_error("catalog has no mass ranges"));
        };

        if first.min != MIN_MASS {
            return Err(config_error(format!(
                "first range '{}' starts at {}, expected {}",
                first.name, first.min, MIN_MASS
            )));
        }
        if last.max != MAX_MASS {
            return Err(config_error(format!(
                "last range '{}' ends at {}, expected {}",
                last.name, last.max, MAX_MASS
            )));
        }

        for pair in ranges.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if lower.max != upper.min {
                return Err(config_error(format!(
                    "ranges '{}' and '{}' are not contiguous ({} != {})",
                    lower.name, upper.name, lower.max, upper.min
                )));
            }
        }

        let mut names = BTreeSet::new();
        for range in &ranges {
            if !names.insert(range.name.as_str()) {
                return Err(config_error(format!(
                    "duplicate range name '{}'",
                    range.name
                )));
            }
        }

        Ok(Self { ranges })
    }

    /// Parse and validate a catalog from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, StellarError> {
        let file: CatalogFile =
            toml::from_str(source).map_err(|e| StellarError::Deserialization(e.to_string()))?;

        let ranges = file
            .ranges
            .into_iter()
            .map(RangeRecord::into_range)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ranges)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StellarError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            StellarError::Io(format!("Cannot read catalog '{}': {}", path.display(), e))
        })?;
        let catalog = Self::from_toml_str(&source)?;

        tracing::info!(
            path = %path.display(),
            ranges = catalog.len(),
            "Loaded mass-range catalog"
        );
        Ok(catalog)
    }

    /// Render the catalog back into the TOML file format.
    pub fn to_toml_string(&self) -> Result<String, StellarError> {
        let file = CatalogFile {
            ranges: self.ranges.iter().map(RangeRecord::from_range).collect(),
        };
        toml::to_string_pretty(&file).map_err(|e| StellarError::Serialization(e.to_string()))
    }

    /// Get all ranges in declared order.
    #[must_use]
    pub fn ranges(&self) -> &[MassRange] {
        &self.ranges
    }

    /// Get a range by id.
    #[must_use]
    pub fn range(&self, id: MassRangeId) -> Option<&MassRange> {
        self.ranges.get(id.0)
    }

    /// Find a range by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(MassRangeId, &MassRange)> {
        self.ranges
            .iter()
            .enumerate()
            .find(|(_, r)| r.name == name)
            .map(|(i, r)| (MassRangeId(i), r))
    }

    /// Number of ranges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always false for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

// =============================================================================
// FILE FORMAT
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(rename = "range")]
    ranges: Vec<RangeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RangeRecord {
    name: String,
    min: f64,
    max: f64,
    #[serde(rename = "stage")]
    stages: Vec<StageRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StageRecord {
    name: String,
    /// Omitted for the terminal stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    color: Color,
    radius: f64,
    emission: f64,
    texture: TextureRef,
    description: String,
    #[serde(default)]
    transition_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    particles: Option<ParticleEmission>,
}

impl RangeRecord {
    fn into_range(self) -> Result<MassRange, StellarError> {
        let stages = self.stages.into_iter().map(StageRecord::into_stage).collect();
        MassRange::new(self.name, self.min, self.max, stages)
    }

    fn from_range(range: &MassRange) -> Self {
        Self {
            name: range.name.clone(),
            min: range.min,
            max: range.max,
            stages: range.stages.iter().map(StageRecord::from_stage).collect(),
        }
    }
}

impl StageRecord {
    fn into_stage(self) -> Stage {
        Stage {
            name: self.name,
            duration: self
                .duration_ms
                .map_or(StageDuration::Unbounded, StageDuration::from_millis),
            color: self.color,
            radius: self.radius,
            emission: self.emission,
            texture: self.texture,
            description: self.description,
            transition: self.transition_ms as f64 / 1000.0,
            particles: self.particles,
        }
    }

    fn from_stage(stage: &Stage) -> Self {
        Self {
            name: stage.name.clone(),
            duration_ms: stage.duration.seconds().map(to_millis),
            color: stage.color,
            radius: stage.radius,
            emission: stage.emission,
            texture: stage.texture.clone(),
            description: stage.description.clone(),
            transition_ms: to_millis(stage.transition),
            particles: stage.particles,
        }
    }
}

fn to_millis(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, duration: StageDuration, transition: f64) -> Stage {
        Stage {
            name: name.to_string(),
            duration,
            color: Color::new(0.5, 0.5, 0.5),
            radius: 1.0,
            emission: 0.5,
            texture: TextureRef::Procedural,
            description: format!("{} stage", name),
            transition,
            particles: None,
        }
    }

    fn two_stage_range(name: &str, min: f64, max: f64) -> MassRange {
        MassRange::new(
            name,
            min,
            max,
            vec![
                stage("Start", StageDuration::Finite(1.0), 0.5),
                stage("End", StageDuration::Unbounded, 0.0),
            ],
        )
        .expect("valid range")
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = builtin_catalog().expect("builtin");
        assert_eq!(catalog.len(), 4);
        let names: Vec<_> = catalog.ranges().iter().map(MassRange::name).collect();
        assert_eq!(
            names,
            vec!["Very Low Mass", "Low Mass", "Medium Mass", "High Mass"]
        );
    }

    #[test]
    fn builtin_catalog_is_shared() {
        let a = builtin_catalog().expect("builtin");
        let b = builtin_catalog().expect("builtin");
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn builtin_low_mass_nebula_timings() {
        let catalog = builtin_catalog().expect("builtin");
        let (_, low) = catalog.find("Low Mass").expect("low mass");
        let nebula = &low.stages()[0];
        assert_eq!(nebula.duration, StageDuration::Finite(5.0));
        assert_eq!(nebula.transition, 1.0);
        assert_eq!(
            nebula.particles,
            Some(ParticleEmission {
                count: 5000,
                spread: 2.5
            })
        );
        assert_eq!(low.stages()[1].name, "Protostar");
    }

    #[test]
    fn terminal_stage_is_last() {
        let catalog = builtin_catalog().expect("builtin");
        for range in catalog.ranges() {
            let terminal = &range.stages()[range.terminal_index()];
            assert!(terminal.is_terminal(), "{}", range.name());
        }
    }

    #[test]
    fn gap_between_ranges_rejected() {
        let result = Catalog::new(vec![
            two_stage_range("A", MIN_MASS, 1.0),
            two_stage_range("B", 1.5, MAX_MASS),
        ]);
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn domain_not_covered_rejected() {
        let result = Catalog::new(vec![two_stage_range("A", MIN_MASS, 10.0)]);
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn duplicate_names_rejected() {
        let result = Catalog::new(vec![
            two_stage_range("A", MIN_MASS, 1.0),
            two_stage_range("A", 1.0, MAX_MASS),
        ]);
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(matches!(
            Catalog::new(Vec::new()),
            Err(StellarError::Configuration(_))
        ));
    }

    #[test]
    fn finite_last_stage_rejected() {
        let result = MassRange::new(
            "A",
            MIN_MASS,
            MAX_MASS,
            vec![stage("Only", StageDuration::Finite(1.0), 1.0)],
        );
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn unbounded_middle_stage_rejected() {
        let result = MassRange::new(
            "A",
            MIN_MASS,
            MAX_MASS,
            vec![
                stage("Stuck", StageDuration::Unbounded, 1.0),
                stage("End", StageDuration::Unbounded, 0.0),
            ],
        );
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn zero_transition_rejected() {
        let result = MassRange::new(
            "A",
            MIN_MASS,
            MAX_MASS,
            vec![
                stage("Start", StageDuration::Finite(1.0), 0.0),
                stage("End", StageDuration::Unbounded, 0.0),
            ],
        );
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn out_of_range_color_rejected() {
        let mut bad = stage("End", StageDuration::Unbounded, 0.0);
        bad.color = Color::new(0.5, 1.5, 0.5);
        let result = MassRange::new("A", MIN_MASS, MAX_MASS, vec![bad]);
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn oversized_particle_count_rejected() {
        let mut nebula = stage("Nebula", StageDuration::Finite(1.0), 1.0);
        nebula.particles = Some(ParticleEmission {
            count: MAX_PARTICLE_COUNT + 1,
            spread: 2.0,
        });
        let result = MassRange::new(
            "A",
            MIN_MASS,
            MAX_MASS,
            vec![nebula, stage("End", StageDuration::Unbounded, 0.0)],
        );
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn huge_particle_count_in_toml_rejected() {
        let source = r#"
[[range]]
name = "All"
min = 0.08
max = 50.0

[[range.stage]]
name = "Nebula"
duration_ms = 1000
color = [0.6, 0.4, 0.8]
radius = 0.0
emission = 0.2
texture = "NO-TEXTURE"
description = "Cloud"
transition_ms = 1000
particles = { count = 1152921504606846976, spread = 2.0 }

[[range.stage]]
name = "End"
color = [1.0, 1.0, 1.0]
radius = 0.3
emission = 0.1
texture = "NO-TEXTURE"
description = "Remnant"
"#;
        assert!(matches!(
            Catalog::from_toml_str(source),
            Err(StellarError::Configuration(_))
        ));
    }

    #[test]
    fn builtin_particle_counts_within_limit() {
        let catalog = builtin_catalog().expect("builtin");
        for range in catalog.ranges() {
            for stage in range.stages() {
                if let Some(emission) = stage.particles {
                    assert!(emission.count <= MAX_PARTICLE_COUNT);
                }
            }
        }
    }

    #[test]
    fn overlapping_ranges_rejected() {
        let result = Catalog::new(vec![
            two_stage_range("A", MIN_MASS, 2.5),
            two_stage_range("B", 2.0, MAX_MASS),
        ]);
        assert!(matches!(result, Err(StellarError::Configuration(_))));
    }

    #[test]
    fn malformed_toml_is_a_deserialization_error() {
        let result = Catalog::from_toml_str("[[range]]\nname = 3");
        assert!(matches!(result, Err(StellarError::Deserialization(_))));
    }

    #[test]
    fn toml_output_parses_back_to_same_catalog() {
        let catalog = builtin_catalog().expect("builtin");
        let rendered = catalog.to_toml_string().expect("render");
        let reparsed = Catalog::from_toml_str(&rendered).expect("reparse");
        assert_eq!(&reparsed, catalog);
    }

    #[test]
    fn load_reads_catalog_file() {
        let catalog = builtin_catalog().expect("builtin");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ranges.toml");
        std::fs::write(&path, catalog.to_toml_string().expect("render")).expect("write");

        let loaded = Catalog::load(&path).expect("load");
        assert_eq!(&loaded, catalog);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = Catalog::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(StellarError::Io(_))));
    }

    #[test]
    fn lifetime_sums_finite_stages() {
        let range = two_stage_range("A", MIN_MASS, MAX_MASS);
        assert!((range.lifetime() - 1.5).abs() < 1e-12);
    }
}
