use serde::{Deserialize, Serialize};

use super::keywords::{
    keyword_score, TopicKeywords, EXPLICIT_MIXED_METHODS_TERMS, IMPLICIT_MIXED_METHODS_TERMS,
    STRONG_MULTILEVEL_TERMS, STRONG_POINTS, WEAK_MULTILEVEL_TERMS, WEAK_POINTS,
};
use super::metrics::MetricsProvider;
use super::weights::{round2, WeightConfiguration};
use crate::paper::Paper;

/// Citation count that earns the full impact weight.
pub const DEFAULT_MAX_CITATIONS: u64 = 500;
/// CiteScore treated as top of the scale.
pub const CITESCORE_CEILING: f64 = 20.0;
/// SJR treated as top of the scale.
pub const SJR_CEILING: f64 = 5.0;

/// Knobs of a grading pass that are not weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOptions {
    pub max_citations: u64,
    pub keywords: TopicKeywords,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            max_citations: DEFAULT_MAX_CITATIONS,
            keywords: TopicKeywords::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultilevelScore {
    pub strong: f64,
    pub weak: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixedMethodsScore {
    pub explicit: f64,
    pub implicit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhdRelevanceScore {
    pub vbhc: f64,
    pub nhs_context: f64,
    pub portugal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JournalQualityScore {
    pub citescore: f64,
    pub sjr: f64,
    pub raw_citescore: Option<f64>,
    pub raw_sjr: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct ClassRelevanceBreakdown {
    pub multilevel_strong: f64,
    pub multilevel_weak: f64,
    pub mixed_methods_explicit: f64,
    pub mixed_methods_implicit: f64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct PhdRelevanceBreakdown {
    pub vbhc: f64,
    pub nhs_context: f64,
    pub portugal: f64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct JournalQualityBreakdown {
    pub citescore: f64,
    pub sjr: f64,
    pub raw_citescore: Option<f64>,
    pub raw_sjr: Option<f64>,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct ImpactBreakdown {
    pub citations: f64,
    pub raw_citations: u64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct ScoreBreakdown {
    pub class_relevance: ClassRelevanceBreakdown,
    pub phd_relevance: PhdRelevanceBreakdown,
    pub journal_quality: JournalQualityBreakdown,
    pub impact: ImpactBreakdown,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub struct GradingResult {
    pub total_score: f64,
    pub breakdown: ScoreBreakdown,
    /// True when the paper showed no class relevance and its total was zeroed
    #[serde(default)]
    pub gated: bool,
}

/// Strong multilevel terms win outright; weak ones only count without them.
pub fn score_multilevel(text: &str, weights: &WeightConfiguration) -> MultilevelScore {
    let w = weights.class_relevance();
    let strong = keyword_score(text, STRONG_MULTILEVEL_TERMS, STRONG_POINTS, w.multilevel_strong);
    let weak = if strong == 0.0 {
        keyword_score(text, WEAK_MULTILEVEL_TERMS, WEAK_POINTS, w.multilevel_weak)
    } else {
        0.0
    };
    MultilevelScore { strong, weak }
}

pub fn score_mixed_methods(text: &str, weights: &WeightConfiguration) -> MixedMethodsScore {
    let w = weights.class_relevance();
    let explicit = keyword_score(
        text,
        EXPLICIT_MIXED_METHODS_TERMS,
        STRONG_POINTS,
        w.mixed_methods_explicit,
    );
    let implicit = if explicit == 0.0 {
        keyword_score(
            text,
            IMPLICIT_MIXED_METHODS_TERMS,
            WEAK_POINTS,
            w.mixed_methods_implicit,
        )
    } else {
        0.0
    };
    MixedMethodsScore { explicit, implicit }
}

/// The three topical criteria are independent of each other.
pub fn score_phd_relevance(
    text: &str,
    weights: &WeightConfiguration,
    keywords: &TopicKeywords,
) -> PhdRelevanceScore {
    let w = weights.phd_relevance();
    PhdRelevanceScore {
        vbhc: keyword_score(text, &keywords.vbhc, WEAK_POINTS, w.vbhc),
        nhs_context: keyword_score(text, &keywords.nhs_context, WEAK_POINTS, w.nhs_context),
        portugal: keyword_score(text, &keywords.portugal, WEAK_POINTS, w.portugal),
    }
}

/// Linear share of `max` for `raw` against `ceiling`, capped at `max`.
fn scaled_metric(raw: Option<f64>, ceiling: f64, max: f64) -> f64 {
    match raw {
        Some(value) if value.is_finite() => round2((value / ceiling * max).clamp(0.0, max)),
        _ => 0.0,
    }
}

/// Score the venue. Without an ISSN the provider is never consulted.
pub fn score_journal_quality(
    issn: Option<&str>,
    weights: &WeightConfiguration,
    provider: &dyn MetricsProvider,
) -> JournalQualityScore {
    let w = weights.journal_quality();
    let metrics = issn
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|issn| {
            let found = provider.lookup(issn);
            if found.is_none() {
                tracing::debug!(issn, "No journal metrics available");
            }
            found
        });

    let raw_citescore = metrics.and_then(|m| m.citescore).filter(|v| v.is_finite());
    let raw_sjr = metrics.and_then(|m| m.sjr).filter(|v| v.is_finite());

    JournalQualityScore {
        citescore: scaled_metric(raw_citescore, CITESCORE_CEILING, w.citescore_max),
        sjr: scaled_metric(raw_sjr, SJR_CEILING, w.sjr_max),
        raw_citescore,
        raw_sjr,
    }
}

pub fn score_citations(cited_by_count: u64, weights: &WeightConfiguration, max_citations: u64) -> f64 {
    let cap = weights.impact().citations_max;
    if max_citations == 0 {
        return 0.0;
    }
    round2((cited_by_count as f64 / max_citations as f64 * cap).min(cap))
}

/// Grade one paper against the rubric.
///
/// Never fails: missing fields contribute zero. When the class relevance
/// subtotal is zero the total is zero too, but the breakdown is still filled
/// in so the listing can show why.
pub fn grade_paper(
    paper: &Paper,
    weights: &WeightConfiguration,
    provider: &dyn MetricsProvider,
    options: &ScoringOptions,
) -> GradingResult {
    let text = paper.scoring_text();

    let multilevel = score_multilevel(&text, weights);
    let mixed = score_mixed_methods(&text, weights);
    let phd = score_phd_relevance(&text, weights, &options.keywords);
    let journal = score_journal_quality(paper.journal_issn(), weights, provider);
    let citations = score_citations(paper.cited_by_count, weights, options.max_citations);

    let class_subtotal = round2(multilevel.strong + multilevel.weak + mixed.explicit + mixed.implicit);
    let phd_subtotal = round2(phd.vbhc + phd.nhs_context + phd.portugal);
    let journal_subtotal = round2(journal.citescore + journal.sjr);

    let gated = class_subtotal == 0.0;
    let total_score = if gated {
        0.0
    } else {
        round2(class_subtotal + phd_subtotal + journal_subtotal + citations).min(100.0)
    };

    GradingResult {
        total_score,
        gated,
        breakdown: ScoreBreakdown {
            class_relevance: ClassRelevanceBreakdown {
                multilevel_strong: multilevel.strong,
                multilevel_weak: multilevel.weak,
                mixed_methods_explicit: mixed.explicit,
                mixed_methods_implicit: mixed.implicit,
                subtotal: class_subtotal,
            },
            phd_relevance: PhdRelevanceBreakdown {
                vbhc: phd.vbhc,
                nhs_context: phd.nhs_context,
                portugal: phd.portugal,
                subtotal: phd_subtotal,
            },
            journal_quality: JournalQualityBreakdown {
                citescore: journal.citescore,
                sjr: journal.sjr,
                raw_citescore: journal.raw_citescore,
                raw_sjr: journal.raw_sjr,
                subtotal: journal_subtotal,
            },
            impact: ImpactBreakdown {
                citations,
                raw_citations: paper.cited_by_count,
                subtotal: citations,
            },
        },
    }
}

/// Grade every paper (replacing any earlier grading) and order them by
/// total score, highest first. Equal scores keep their input order.
pub fn rank_papers(
    papers: Vec<Paper>,
    weights: &WeightConfiguration,
    provider: &dyn MetricsProvider,
    options: &ScoringOptions,
) -> Vec<Paper> {
    let mut graded: Vec<Paper> = papers
        .into_iter()
        .map(|mut paper| {
            paper.grading = Some(grade_paper(&paper, weights, provider, options));
            paper
        })
        .collect();

    // sort_by is stable
    graded.sort_by(|a, b| {
        b.total_score()
            .partial_cmp(&a.total_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let gated = graded
        .iter()
        .filter(|p| p.grading.map(|g| g.gated).unwrap_or(false))
        .count();
    tracing::debug!(papers = graded.len(), gated, "Ranked papers");

    graded
}
