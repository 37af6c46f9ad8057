//! Facet filtering and random selection over the visible catalog.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use smoothie_shared::Recipe;

/// Boolean filters the UI exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    pub no_fat: bool,
    pub no_nuts: bool,
    pub favorites_only: bool,
}

pub fn matches(recipe: &Recipe, facets: &Facets, favorites: &BTreeSet<String>) -> bool {
    (!facets.no_fat || !recipe.contains_fat)
        && (!facets.no_nuts || !recipe.contains_nuts)
        && (!facets.favorites_only || favorites.contains(&recipe.id.to_string()))
}

/// Keep catalog order; drop records that fail any active facet.
pub fn filter(catalog: &[Recipe], facets: &Facets, favorites: &BTreeSet<String>) -> Vec<Recipe> {
    catalog
        .iter()
        .filter(|r| matches(r, facets, favorites))
        .cloned()
        .collect()
}

/// Uniform choice. `None` on an empty slice is a normal outcome, not an error.
pub fn pick_random<'a, T, R>(candidates: &'a [T], rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    candidates.choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use smoothie_shared::{RecipeDraft, RecipeId};

    fn recipe(n: u32, fat: bool, nuts: bool) -> Recipe {
        let mut r = Recipe::from_draft(
            RecipeId::Seed(n),
            "team",
            RecipeDraft {
                name: format!("r{n}"),
                ..RecipeDraft::default()
            },
            Utc::now(),
        );
        r.contains_fat = fat;
        r.contains_nuts = nuts;
        r
    }

    fn catalog() -> Vec<Recipe> {
        vec![
            recipe(1, false, false),
            recipe(2, true, false),
            recipe(3, false, true),
            recipe(4, true, true),
        ]
    }

    fn ids(recipes: &[Recipe]) -> Vec<String> {
        recipes.iter().map(|r| r.id.to_string()).collect()
    }

    #[test]
    fn no_facets_keeps_everything() {
        let out = filter(&catalog(), &Facets::default(), &BTreeSet::new());
        assert_eq!(out.len(), 4);
    }

    #[test]
    fn fat_and_nut_facets_combine() {
        let favorites = BTreeSet::new();
        let no_fat = Facets {
            no_fat: true,
            ..Facets::default()
        };
        assert_eq!(ids(&filter(&catalog(), &no_fat, &favorites)), vec!["1", "3"]);

        let both = Facets {
            no_fat: true,
            no_nuts: true,
            ..Facets::default()
        };
        assert_eq!(ids(&filter(&catalog(), &both, &favorites)), vec!["1"]);
    }

    #[test]
    fn favorites_only_ignores_stale_ids() {
        let favorites: BTreeSet<String> = ["2".to_string(), "recipe:9:gone".to_string()].into();
        let facets = Facets {
            favorites_only: true,
            ..Facets::default()
        };
        assert_eq!(ids(&filter(&catalog(), &facets, &favorites)), vec!["2"]);
    }

    #[test]
    fn pick_from_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let empty: Vec<Recipe> = Vec::new();
        assert!(pick_random(&empty, &mut rng).is_none());
    }

    #[test]
    fn pick_stays_within_candidates_and_covers_them() {
        let mut rng = StdRng::seed_from_u64(42);
        let candidates = catalog();
        let mut seen = BTreeSet::new();
        for _ in 0..200 {
            let pick = pick_random(&candidates, &mut rng).unwrap();
            seen.insert(pick.id.to_string());
        }
        assert_eq!(seen.len(), candidates.len());
    }
}
