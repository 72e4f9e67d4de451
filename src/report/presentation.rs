use super::or_unknown;
use crate::paper::Paper;

pub const PRESENTATION_FILE: &str = "presentation.md";

/// Slides 2 to 8 and the speaker notes. Only slide 1 depends on the paper.
const SLIDES: &str = "## Slide 2: Research Question & Objectives

### Research Question

*[Extract main research question from paper]*

### Objectives

1. *[Objective 1]*
2. *[Objective 2]*
3. *[Objective 3]*

### Significance

*[Why this research matters]*

---

## Slide 3: Multilevel Analysis Approach

### Why Multilevel?

- Nested/hierarchical data structure
- Cross-level interactions
- Contextual effects

### Methodology

**Levels Analyzed**:
- Level 1: *[e.g., Individual patients]*
- Level 2: *[e.g., Healthcare providers]*
- Level 3: *[e.g., Hospitals/regions]*

**Statistical Approach**:
- Hierarchical Linear Modeling (HLM)
- Mixed-effects models
- Random intercepts/slopes

### Key Variables

- **Outcome**: *[Dependent variable]*
- **Predictors**: *[Independent variables at each level]*

---

## Slide 4: Mixed Methods Integration

### Qualitative Component

- Interviews / Focus groups
- Thematic analysis
- **Sample**: *[Qualitative sample details]*

### Quantitative Component

- Survey / Administrative data
- Statistical analysis
- **Sample size**: *[N]*

### Integration Strategy

- **Convergent design**: Parallel collection and analysis
- **Triangulation**: Comparing qual/quant findings
- **Complementarity**: Qual explains quant patterns

---

## Slide 5: Key Findings

### Multilevel Results

1. **Within-level effects**: *[Finding 1]*
2. **Cross-level interactions**: *[Finding 2]*
3. **Variance explained**: Level 1 *[%]*, Level 2 *[%]*

### Mixed Methods Insights

- **Quantitative**: *[Statistical findings]*
- **Qualitative**: *[Thematic findings]*
- **Integration**: *[How they complement each other]*

---

## Slide 6: Implications for VBHC

### Value-Based Healthcare Relevance

- **Outcomes**: *[How findings relate to patient outcomes]*
- **Cost**: *[Economic implications]*
- **Quality**: *[Practice implications]*

### Health Systems Implications

- **Policy**: *[Policy recommendations]*
- **Practice**: *[Clinical/organizational changes]*
- **Research**: *[Future research directions]*

---

## Slide 7: Limitations & Future Research

### Methodological Limitations

1. **Multilevel approach**: *[e.g., sample size at higher levels]*
2. **Mixed methods**: *[e.g., generalizability of qualitative findings]*

### Future Directions

1. *[Suggestion 1]*
2. *[Suggestion 2]*

---

## Slide 8: Discussion & Questions

### Key Takeaways

1. **Multilevel analysis** reveals *[key insight]*
2. **Mixed methods** provide *[complementary understanding]*
3. **VBHC implications**: *[practical application]*

### Discussion Questions

1. How might this approach apply to other healthcare contexts?
2. What additional levels of analysis could be valuable?
3. How can we better integrate qualitative and quantitative findings?

**Thank you! Questions?**

---

## Presentation Notes

**Timing**: 15 minutes total
- Slides 1-2: 2 minutes (Introduction)
- Slides 3-4: 4 minutes (Methods)
- Slide 5: 3 minutes (Findings)
- Slide 6: 2 minutes (Implications)
- Slide 7: 2 minutes (Limitations)
- Slide 8: 2 minutes (Discussion)

**Tips**:
- Replace every bracketed placeholder with content from the paper
- Add charts or diagrams where they help
- Prepare an example that illustrates the levels of analysis
";

/// An 8-slide, 15-minute deck outline for `paper`.
pub fn render_presentation(paper: &Paper) -> String {
    let journal = or_unknown(paper.publication_name.as_deref());
    let year = or_unknown(paper.year());

    let mut out = format!("# {}\n\n", paper.title);
    out.push_str("**Presenter**: [Your Name]  \n");
    out.push_str("**Date**: [Presentation Date]  \n");
    out.push_str("**Class**: Multilevel and Mixed Methods Approaches\n\n---\n\n");

    out.push_str("## Slide 1: Title & Context\n\n");
    out.push_str(&format!("### {}\n\n", paper.title));
    out.push_str(&format!("**Authors**: {}\n\n", or_unknown(paper.authors.as_deref())));
    out.push_str(&format!("**Journal**: {} ({})\n\n", journal, year));
    out.push_str(&format!("**Citations**: {}\n\n", paper.cited_by_count));
    out.push_str("**Context**:\n");
    out.push_str(&format!(
        "- Selected with a score of {}/100\n",
        paper.total_score()
    ));
    out.push_str("- Multilevel and mixed methods approach\n");
    out.push_str("- Relevant to Value-Based Healthcare research\n\n---\n\n");

    out.push_str(SLIDES);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::test_support::graded_paper;

    #[test]
    fn test_presentation_has_eight_slides() {
        let paper = graded_paper("1", "A multilevel model study", "Mixed methods.");
        let deck = render_presentation(&paper);

        assert!(deck.starts_with("# A multilevel model study\n"));
        assert_eq!(deck.matches("## Slide ").count(), 8);
        assert!(deck.contains("**Journal**: Health Services Research (2021)"));
        assert!(deck.contains("**Citations**: 250"));
        assert!(deck.contains("- Slides 3-4: 4 minutes (Methods)"));
    }

    #[test]
    fn test_unknown_metadata() {
        let deck = render_presentation(&Paper::new("1", "Untitled"));
        assert!(deck.contains("**Authors**: unknown"));
        assert!(deck.contains("**Journal**: unknown (unknown)"));
        assert!(deck.contains("score of 0/100"));
    }
}
