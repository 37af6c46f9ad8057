//! Built-in demo recipes shown while the remote catalog is unreachable.

use crate::recipe::Recipe;
use crate::types::RecipeId;

struct Seed {
    name: &'static str,
    emoji: &'static str,
    color: &'static str,
    ingredients: &'static [&'static str],
    instructions: &'static str,
    servings: u32,
    prep_time: &'static str,
    contains_fat: bool,
    contains_nuts: bool,
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Strawberry Banana Classic",
        emoji: "🍓",
        color: "#ff6b9d",
        ingredients: &["1 cup strawberries", "1 banana", "1 cup milk", "1 tbsp honey"],
        instructions: "Blend everything until smooth. Serve cold.",
        servings: 2,
        prep_time: "5 min",
        contains_fat: true,
        contains_nuts: false,
    },
    Seed {
        name: "Green Machine",
        emoji: "🥬",
        color: "#4caf50",
        ingredients: &["1 cup spinach", "1 green apple", "1/2 cucumber", "1 cup coconut water"],
        instructions: "Blend the greens with the coconut water first, then add the fruit.",
        servings: 1,
        prep_time: "5 min",
        contains_fat: false,
        contains_nuts: false,
    },
    Seed {
        name: "Tropical Sunrise",
        emoji: "🥭",
        color: "#ffb347",
        ingredients: &["1 cup mango", "1/2 cup pineapple", "1 orange, juiced", "ice"],
        instructions: "Blend the fruit with the orange juice and a handful of ice.",
        servings: 2,
        prep_time: "7 min",
        contains_fat: false,
        contains_nuts: false,
    },
    Seed {
        name: "Peanut Butter Power",
        emoji: "🥜",
        color: "#c68642",
        ingredients: &["2 tbsp peanut butter", "1 banana", "1 cup oat milk", "1 tbsp cocoa"],
        instructions: "Blend on high until creamy.",
        servings: 1,
        prep_time: "4 min",
        contains_fat: true,
        contains_nuts: true,
    },
    Seed {
        name: "Very Berry",
        emoji: "🫐",
        color: "#6a5acd",
        ingredients: &["1 cup mixed berries", "1/2 cup yoghurt", "1/2 cup apple juice"],
        instructions: "Blend until smooth and pour over ice.",
        servings: 2,
        prep_time: "5 min",
        contains_fat: true,
        contains_nuts: false,
    },
    Seed {
        name: "Almond Date Shake",
        emoji: "🌰",
        color: "#a0522d",
        ingredients: &["1 cup almond milk", "4 medjool dates", "1 tbsp almond butter", "pinch of cinnamon"],
        instructions: "Soak the dates for ten minutes, then blend everything.",
        servings: 1,
        prep_time: "15 min",
        contains_fat: true,
        contains_nuts: true,
    },
];

/// Attribution shown on bundled recipes. Not a user identity.
pub const SEED_CONTRIBUTOR: &str = "Smoothie Team";

/// The bundled seed catalog. Ids are `1..=n` and never collide with local or
/// remote ids. Seeds carry no creation timestamp.
pub fn seed_recipes() -> Vec<Recipe> {
    SEEDS
        .iter()
        .zip(1u32..)
        .map(|(seed, n)| Recipe {
            id: RecipeId::Seed(n),
            name: seed.name.to_string(),
            contributor: SEED_CONTRIBUTOR.to_string(),
            emoji: seed.emoji.to_string(),
            color: seed.color.to_string(),
            ingredients: seed.ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: seed.instructions.to_string(),
            servings: seed.servings,
            prep_time: seed.prep_time.to_string(),
            contains_fat: seed.contains_fat,
            contains_nuts: seed.contains_nuts,
            created_at: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_use_seed_namespace() {
        let seeds = seed_recipes();
        assert!(!seeds.is_empty());
        assert!(seeds.iter().all(|r| r.id.is_seed()));
        assert!(seeds.iter().all(|r| r.contributor == SEED_CONTRIBUTOR));
        assert!(seeds.iter().all(|r| r.is_complete()));
    }

    #[test]
    fn seeds_cover_both_facets() {
        let seeds = seed_recipes();
        assert!(seeds.iter().any(|r| !r.contains_fat && !r.contains_nuts));
        assert!(seeds.iter().any(|r| r.contains_nuts));
    }
}
