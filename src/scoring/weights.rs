use serde::{Deserialize, Serialize};

use super::error::ScoringError;

/// Tolerance when deciding whether weights already sum to 100.
/// Sized for user-typed values with two decimals.
pub const TOTAL_TOLERANCE: f64 = 0.005;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Class relevance criteria: does the paper plausibly use multilevel and/or
/// mixed-methods analysis.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ClassRelevanceWeights {
    pub multilevel_strong: f64,
    pub multilevel_weak: f64,
    pub mixed_methods_explicit: f64,
    pub mixed_methods_implicit: f64,
}

impl Default for ClassRelevanceWeights {
    fn default() -> Self {
        Self {
            multilevel_strong: 20.0,
            multilevel_weak: 10.0,
            mixed_methods_explicit: 15.0,
            mixed_methods_implicit: 5.0,
        }
    }
}

/// Topical fit to the research context.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct PhdRelevanceWeights {
    pub vbhc: f64,
    pub nhs_context: f64,
    pub portugal: f64,
}

impl Default for PhdRelevanceWeights {
    fn default() -> Self {
        Self {
            vbhc: 10.0,
            nhs_context: 10.0,
            portugal: 5.0,
        }
    }
}

/// Maximum points awarded for the venue's bibliometric indicators.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct JournalQualityWeights {
    pub citescore_max: f64,
    pub sjr_max: f64,
}

impl Default for JournalQualityWeights {
    fn default() -> Self {
        Self {
            citescore_max: 12.0,
            sjr_max: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct ImpactWeights {
    pub citations_max: f64,
}

impl Default for ImpactWeights {
    fn default() -> Self {
        Self { citations_max: 5.0 }
    }
}

/// Raw, user-supplied grading weights.
///
/// This is what the config file and the interactive editor produce. It may
/// contain anything (negative values, arbitrary totals) until it goes through
/// [`normalize_weights`].
///
/// Example YAML:
/// ```yaml
/// weights:
///   class_relevance:
///     multilevel_strong: 20
///     multilevel_weak: 10
///   impact:
///     citations_max: 5
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields, default)]
pub struct GradingWeights {
    pub class_relevance: ClassRelevanceWeights,
    pub phd_relevance: PhdRelevanceWeights,
    pub journal_quality: JournalQualityWeights,
    pub impact: ImpactWeights,
}

impl GradingWeights {
    /// Every criterion with its dotted path, in a fixed order.
    pub fn criteria(&self) -> [(&'static str, f64); 10] {
        [
            ("class_relevance.multilevel_strong", self.class_relevance.multilevel_strong),
            ("class_relevance.multilevel_weak", self.class_relevance.multilevel_weak),
            ("class_relevance.mixed_methods_explicit", self.class_relevance.mixed_methods_explicit),
            ("class_relevance.mixed_methods_implicit", self.class_relevance.mixed_methods_implicit),
            ("phd_relevance.vbhc", self.phd_relevance.vbhc),
            ("phd_relevance.nhs_context", self.phd_relevance.nhs_context),
            ("phd_relevance.portugal", self.phd_relevance.portugal),
            ("journal_quality.citescore_max", self.journal_quality.citescore_max),
            ("journal_quality.sjr_max", self.journal_quality.sjr_max),
            ("impact.citations_max", self.impact.citations_max),
        ]
    }

    /// Sum of all criteria.
    pub fn total(&self) -> f64 {
        self.criteria().iter().map(|(_, v)| v).sum()
    }

    /// Overwrite one criterion by its dotted path. Returns false for an
    /// unknown path.
    pub fn set(&mut self, criterion: &str, value: f64) -> bool {
        let slot = match criterion {
            "class_relevance.multilevel_strong" => &mut self.class_relevance.multilevel_strong,
            "class_relevance.multilevel_weak" => &mut self.class_relevance.multilevel_weak,
            "class_relevance.mixed_methods_explicit" => {
                &mut self.class_relevance.mixed_methods_explicit
            }
            "class_relevance.mixed_methods_implicit" => {
                &mut self.class_relevance.mixed_methods_implicit
            }
            "phd_relevance.vbhc" => &mut self.phd_relevance.vbhc,
            "phd_relevance.nhs_context" => &mut self.phd_relevance.nhs_context,
            "phd_relevance.portugal" => &mut self.phd_relevance.portugal,
            "journal_quality.citescore_max" => &mut self.journal_quality.citescore_max,
            "journal_quality.sjr_max" => &mut self.journal_quality.sjr_max,
            "impact.citations_max" => &mut self.impact.citations_max,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            class_relevance: ClassRelevanceWeights {
                multilevel_strong: f(self.class_relevance.multilevel_strong),
                multilevel_weak: f(self.class_relevance.multilevel_weak),
                mixed_methods_explicit: f(self.class_relevance.mixed_methods_explicit),
                mixed_methods_implicit: f(self.class_relevance.mixed_methods_implicit),
            },
            phd_relevance: PhdRelevanceWeights {
                vbhc: f(self.phd_relevance.vbhc),
                nhs_context: f(self.phd_relevance.nhs_context),
                portugal: f(self.phd_relevance.portugal),
            },
            journal_quality: JournalQualityWeights {
                citescore_max: f(self.journal_quality.citescore_max),
                sjr_max: f(self.journal_quality.sjr_max),
            },
            impact: ImpactWeights {
                citations_max: f(self.impact.citations_max),
            },
        }
    }
}

/// Validated weights summing to 100 (within rounding).
///
/// Only obtainable through [`Default`] or [`normalize_weights`], and read-only
/// afterwards, so it can be shared freely across grading calls.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(transparent)]
pub struct WeightConfiguration(GradingWeights);

impl Default for WeightConfiguration {
    fn default() -> Self {
        Self(GradingWeights::default())
    }
}

impl WeightConfiguration {
    pub fn class_relevance(&self) -> &ClassRelevanceWeights {
        &self.0.class_relevance
    }

    pub fn phd_relevance(&self) -> &PhdRelevanceWeights {
        &self.0.phd_relevance
    }

    pub fn journal_quality(&self) -> &JournalQualityWeights {
        &self.0.journal_quality
    }

    pub fn impact(&self) -> &ImpactWeights {
        &self.0.impact
    }

    /// Copy out the underlying values, e.g. to edit and re-normalize.
    pub fn to_raw(&self) -> GradingWeights {
        self.0
    }

    pub fn total(&self) -> f64 {
        self.0.total()
    }
}

/// Validate and rescale raw weights so they sum to 100.
///
/// Negative or non-finite values are rejected with
/// [`ScoringError::InvalidWeight`]; an all-zero configuration with
/// [`ScoringError::InvalidWeightConfiguration`]. Totals within
/// [`TOTAL_TOLERANCE`] of 100 are kept as-is, anything else is scaled by
/// `100 / total` and rounded to two decimals per criterion.
pub fn normalize_weights(raw: &GradingWeights) -> Result<WeightConfiguration, ScoringError> {
    for (criterion, value) in raw.criteria() {
        if !value.is_finite() || value < 0.0 {
            return Err(ScoringError::InvalidWeight {
                criterion: criterion.to_string(),
                value,
            });
        }
    }

    let total = raw.total();
    if total <= 0.0 {
        return Err(ScoringError::InvalidWeightConfiguration { total });
    }

    if (total - 100.0).abs() <= TOTAL_TOLERANCE {
        return Ok(WeightConfiguration(*raw));
    }

    let factor = 100.0 / total;
    tracing::debug!(total, factor, "Rescaling grading weights to 100");
    Ok(WeightConfiguration(raw.map(|v| round2(v * factor))))
}
