use tracing::debug;

use shortlist_core::category::{Category, CategorySet};
use shortlist_core::config::RankingSettings;
use shortlist_core::types::Candidate;

/// Result-size budget for [`select`]. `min_results` is advisory: a short
/// list is returned as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    pub min_results: usize,
    pub max_results: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self { min_results: 5, max_results: 10 }
    }
}

impl From<&RankingSettings> for SelectionLimits {
    fn from(r: &RankingSettings) -> Self {
        Self { min_results: r.min_results, max_results: r.max_results }
    }
}

/// Pick the final ordered list from ranked candidates.
///
/// With several required categories the best candidate of each one is
/// placed first, in configured category order, and the remaining slots go
/// to the best leftover candidates of the required categories. With a
/// single required category the result is that category's top candidates.
/// Candidates whose category is not in `categories` are never selected.
/// An empty `required` is treated as every category.
pub fn select<'a>(
    ranked: &[Candidate<'a>],
    required: &[Category],
    categories: &CategorySet,
    limits: SelectionLimits,
) -> Vec<Candidate<'a>> {
    let mut ordered = ranked.to_vec();
    ordered.sort_by(|a, b| b.fused.total_cmp(&a.fused));

    let mut wanted = vec![required.is_empty(); categories.len()];
    for c in required {
        if let Some(i) = categories.position(&c.code) {
            wanted[i] = true;
        }
    }

    // (category slot, candidate) for candidates of wanted categories, in fused order
    let pool: Vec<(usize, Candidate<'a>)> = ordered
        .into_iter()
        .filter_map(|c| categories.position(&c.item.category).map(|slot| (slot, c)))
        .filter(|(slot, _)| wanted[*slot])
        .collect();

    let max = limits.max_results;
    let mut out: Vec<Candidate<'a>> = Vec::with_capacity(max.min(pool.len()));

    if wanted.iter().filter(|w| **w).count() > 1 {
        let mut seeded = vec![false; pool.len()];
        for slot in (0..categories.len()).filter(|s| wanted[*s]) {
            if let Some(i) = pool.iter().position(|(s, _)| *s == slot) {
                seeded[i] = true;
                out.push(pool[i].1);
            }
        }
        out.truncate(max);
        out.extend(
            pool.iter()
                .zip(&seeded)
                .filter(|(_, s)| !**s)
                .map(|((_, c), _)| *c)
                .take(max.saturating_sub(out.len())),
        );
    } else {
        out.extend(pool.iter().map(|(_, c)| *c).take(max));
    }

    if out.len() < limits.min_results {
        debug!(selected = out.len(), min_results = limits.min_results, "fewer results than requested minimum");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortlist_core::types::CatalogItem;

    fn item(name: &str, category: &str) -> CatalogItem {
        CatalogItem {
            name: name.to_string(),
            url: format!("https://example.test/{name}"),
            category: category.to_string(),
            description: String::new(),
            tags: None,
        }
    }

    fn cand(item: &CatalogItem, position: usize, fused: f32) -> Candidate<'_> {
        Candidate { item, position, similarity: fused, lexical: 0.0, fused }
    }

    fn names(out: &[Candidate<'_>]) -> Vec<String> {
        out.iter().map(|c| c.item.name.clone()).collect()
    }

    fn limits(max_results: usize) -> SelectionLimits {
        SelectionLimits { min_results: 0, max_results }
    }

    #[test]
    fn lower_ranked_category_is_seeded_second() {
        let items = [item("k1", "K"), item("k2", "K"), item("k3", "K"), item("p1", "P")];
        let ranked: Vec<_> =
            items.iter().zip([0.9, 0.8, 0.7, 0.2]).enumerate().map(|(i, (it, f))| cand(it, i, f)).collect();
        let set = CategorySet::default();
        let out = select(&ranked, &set.all(), &set, limits(3));
        assert_eq!(names(&out), vec!["k1", "p1", "k2"]);
    }

    #[test]
    fn single_required_category_takes_its_top() {
        let items = [item("k1", "K"), item("p1", "P"), item("p2", "P"), item("p3", "P")];
        let ranked: Vec<_> =
            items.iter().zip([0.9, 0.8, 0.7, 0.6]).enumerate().map(|(i, (it, f))| cand(it, i, f)).collect();
        let set = CategorySet::default();
        let p = set.normalize(&["P"]);
        assert_eq!(names(&select(&ranked, &p, &set, limits(2))), vec!["p1", "p2"]);
    }

    #[test]
    fn missing_group_is_skipped_and_short_result_is_fine() {
        let items = [item("k1", "K"), item("k2", "K")];
        let ranked: Vec<_> = items.iter().enumerate().map(|(i, it)| cand(it, i, 0.5)).collect();
        let set = CategorySet::default();
        let out = select(&ranked, &set.all(), &set, SelectionLimits { min_results: 5, max_results: 10 });
        assert_eq!(names(&out), vec!["k1", "k2"]);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let set = CategorySet::default();
        assert!(select(&[], &set.all(), &set, SelectionLimits::default()).is_empty());
    }

    #[test]
    fn unknown_categories_are_never_selected() {
        let items = [item("x1", "Z"), item("k1", "K")];
        let ranked: Vec<_> =
            items.iter().zip([0.9, 0.1]).enumerate().map(|(i, (it, f))| cand(it, i, f)).collect();
        let set = CategorySet::default();
        assert_eq!(names(&select(&ranked, &set.all(), &set, limits(5))), vec!["k1"]);
    }

    #[test]
    fn seeds_follow_configured_order_and_respect_max() {
        let set = CategorySet::new(vec![
            Category::new("P", "Personality", ""),
            Category::new("K", "Knowledge", ""),
            Category::new("S", "Simulation", ""),
        ])
        .unwrap();
        let items = [item("k1", "K"), item("s1", "S"), item("p1", "P")];
        let ranked: Vec<_> =
            items.iter().zip([0.9, 0.8, 0.1]).enumerate().map(|(i, (it, f))| cand(it, i, f)).collect();
        assert_eq!(names(&select(&ranked, &set.all(), &set, limits(10))), vec!["p1", "k1", "s1"]);
        assert_eq!(names(&select(&ranked, &set.all(), &set, limits(2))), vec!["p1", "k1"]);
    }

    #[test]
    fn unsorted_input_is_ordered_by_fused_score() {
        let items = [item("k1", "K"), item("k2", "K")];
        let ranked = vec![cand(&items[0], 0, 0.1), cand(&items[1], 1, 0.9)];
        let set = CategorySet::default();
        let k = set.normalize(&["k"]);
        assert_eq!(names(&select(&ranked, &k, &set, limits(2))), vec!["k2", "k1"]);
    }
}
