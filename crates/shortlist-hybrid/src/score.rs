use regex::{Regex, RegexBuilder};
use tracing::warn;

use shortlist_core::config::RankingSettings;
use shortlist_core::types::{Candidate, SearchHit};

/// Linear fusion weights: `fused = semantic * similarity + lexical * lexical_score`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { semantic: 0.7, lexical: 0.3 }
    }
}

impl From<&RankingSettings> for FusionWeights {
    fn from(r: &RankingSettings) -> Self {
        Self { semantic: r.semantic_weight, lexical: r.lexical_weight }
    }
}

impl FusionWeights {
    #[inline]
    #[must_use]
    pub fn fuse(&self, similarity: f32, lexical: f32) -> f32 {
        self.semantic * similarity + self.lexical * lexical
    }
}

/// Whole-word, case-insensitive matchers for a query's skills.
///
/// Skill text is matched literally; regex metacharacters in a skill such as
/// "C++" carry no special meaning.
pub struct SkillMatcher {
    /// One slot per skill; `None` where the pattern could not be compiled.
    patterns: Vec<Option<Regex>>,
}

/// Compiled-size cap per skill pattern. Real skills are a few words long.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

impl SkillMatcher {
    pub fn new<S: AsRef<str>>(skills: &[S]) -> Self {
        let patterns = skills
            .iter()
            .map(|s| {
                let pattern = format!(r"\b{}\b", regex::escape(s.as_ref()));
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .size_limit(PATTERN_SIZE_LIMIT)
                    .build()
                    .map_err(|e| warn!(chars = s.as_ref().len(), error = %e, "skill pattern rejected; it never matches"))
                    .ok()
            })
            .collect();
        Self { patterns }
    }

    /// Fraction of skills found in `text`, in `[0, 1]`.
    ///
    /// No skills or an empty text scores 0. A skill whose pattern could not
    /// be compiled counts as not found.
    pub fn score(&self, text: &str) -> f32 {
        if self.patterns.is_empty() || text.is_empty() {
            return 0.0;
        }
        let found = self.patterns.iter().flatten().filter(|re| re.is_match(text)).count();
        found as f32 / self.patterns.len() as f32
    }
}

/// Convenience form of [`SkillMatcher::score`] for a single text.
pub fn lexical_score<S: AsRef<str>>(text: &str, skills: &[S]) -> f32 {
    SkillMatcher::new(skills).score(text)
}

/// Score every hit against the skills and order by fused score, best first.
///
/// Equal fused scores keep the order the index returned them in.
pub fn rank<'a, S: AsRef<str>>(hits: &[SearchHit<'a>], skills: &[S], weights: FusionWeights) -> Vec<Candidate<'a>> {
    let matcher = SkillMatcher::new(skills);
    let mut ranked: Vec<Candidate<'a>> = hits
        .iter()
        .enumerate()
        .map(|(position, hit)| {
            let lexical = matcher.score(&hit.item.description);
            Candidate {
                item: hit.item,
                position,
                similarity: hit.score,
                lexical,
                fused: weights.fuse(hit.score, lexical),
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.fused.total_cmp(&a.fused));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortlist_core::types::CatalogItem;

    fn item(description: &str) -> CatalogItem {
        CatalogItem {
            name: description.to_string(),
            url: String::new(),
            category: "K".to_string(),
            description: description.to_string(),
            tags: None,
        }
    }

    #[test]
    fn half_of_the_skills_found() {
        let s = lexical_score("Advanced Java programming assessment", &["java", "python"]);
        assert!((s - 0.5).abs() < 1e-6);
    }

    #[test]
    fn whole_words_only() {
        assert_eq!(lexical_score("JavaScript fundamentals", &["Java"]), 0.0);
        assert_eq!(lexical_score("Core java, SQL.", &["JAVA", "sql"]), 1.0);
    }

    #[test]
    fn empty_inputs_score_zero() {
        let none: [&str; 0] = [];
        assert_eq!(lexical_score("Java", &none), 0.0);
        assert_eq!(lexical_score("", &["Java"]), 0.0);
    }

    #[test]
    fn metacharacters_are_literal() {
        assert_eq!(lexical_score("Knowledge of C.N.E and Node.js", &["c.n.e", "node.js"]), 1.0);
        assert_eq!(lexical_score("CXNXE and NodeXjs", &["C.N.E", "Node.js"]), 0.0);
    }

    #[test]
    fn oversized_skill_counts_as_unmatched() {
        let huge = "x".repeat(200_000);
        let s = lexical_score("Java fundamentals", &["Java", huge.as_str()]);
        assert!((s - 0.5).abs() < 1e-6);
    }

    #[test]
    fn fuse_uses_configured_weights() {
        assert!((FusionWeights::default().fuse(0.8, 0.5) - 0.71).abs() < 1e-6);
        let w = FusionWeights { semantic: 1.0, lexical: 0.0 };
        assert_eq!(w.fuse(0.4, 1.0), 0.4);
    }

    #[test]
    fn rank_orders_by_fused_and_keeps_ties_in_hit_order() {
        let a = item("Leadership questionnaire");
        let b = item("Numerical reasoning");
        let c = item("Verbal reasoning");
        let hits = vec![
            SearchHit { item: &b, row: 1, score: 0.6 },
            SearchHit { item: &c, row: 2, score: 0.6 },
            SearchHit { item: &a, row: 0, score: 0.5 },
        ];
        let ranked = rank(&hits, &["leadership"], FusionWeights::default());
        let names: Vec<&str> = ranked.iter().map(|c| c.item.name.as_str()).collect();
        assert_eq!(names, vec!["Leadership questionnaire", "Numerical reasoning", "Verbal reasoning"]);
        assert_eq!(ranked[0].position, 2);
        assert!((ranked[0].fused - 0.65).abs() < 1e-6);
    }
}
