//! Streak milestones and the rewards they unlock.

use rand::Rng;
use serde::Serialize;

/// Streak interval between rewards.
pub const MILESTONE_INTERVAL: u32 = 10;

/// Images shown for the first tier and for every streak past the table.
pub const CALF_GALLERY: &[&str] = &[
    "assets/Calf crash.png",
    "assets/Calf hop.png",
    "assets/Calf kick.png",
    "assets/Calf licking daisy.png",
    "assets/Calf Milk.png",
    "assets/Calf Sitting.png",
    "assets/Calf v Butterfly.png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RewardAsset {
    /// One image from the set, chosen per presentation.
    Gallery(&'static [&'static str]),
    Image(&'static str),
}

impl RewardAsset {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        match *self {
            RewardAsset::Image(path) => path,
            RewardAsset::Gallery(items) => items[rng.gen_range(0..items.len())],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub title: &'static str,
    pub asset: RewardAsset,
}

const FIRST_TIER: Milestone = Milestone {
    title: "BOUGIE STREAK!",
    asset: RewardAsset::Gallery(CALF_GALLERY),
};

/// Explicit tiers keyed by exact streak value.
const TABLE: &[(u32, Milestone)] = &[
    (10, FIRST_TIER),
    (
        20,
        Milestone {
            title: "DOUBLE BOUGIE!",
            asset: RewardAsset::Image("assets/Double Bougie Ramming.png"),
        },
    ),
    (
        30,
        Milestone {
            title: "TRIPLE BOUGIE!",
            asset: RewardAsset::Gallery(CALF_GALLERY),
        },
    ),
    (
        40,
        Milestone {
            title: "QUADRUPLE BOUGIE!",
            asset: RewardAsset::Image("assets/Double Bougie Ramming.png"),
        },
    ),
    (
        50,
        Milestone {
            title: "LEGENDARY BOUGIE!",
            asset: RewardAsset::Gallery(CALF_GALLERY),
        },
    ),
];

/// True when `streak` is a positive multiple of the interval.
pub fn is_milestone(streak: u32) -> bool {
    streak > 0 && streak % MILESTONE_INTERVAL == 0
}

/// Reward for a milestone streak, `None` for any other value.
///
/// Streaks past the table reuse the first tier's title and images.
pub fn milestone_for(streak: u32) -> Option<Milestone> {
    if !is_milestone(streak) {
        return None;
    }
    let entry = TABLE
        .iter()
        .find(|(threshold, _)| *threshold == streak)
        .map(|(_, m)| *m)
        .unwrap_or(FIRST_TIER);
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    #[test]
    fn only_positive_multiples_of_ten_are_milestones() {
        assert!(!is_milestone(0));
        for streak in 1..200 {
            assert_eq!(is_milestone(streak), streak % 10 == 0, "streak {streak}");
            assert_eq!(milestone_for(streak).is_some(), streak % 10 == 0);
        }
    }

    #[test]
    fn table_tiers_match_exactly() {
        assert_eq!(milestone_for(10).unwrap().title, "BOUGIE STREAK!");
        assert_eq!(milestone_for(20).unwrap().title, "DOUBLE BOUGIE!");
        assert_eq!(milestone_for(50).unwrap().title, "LEGENDARY BOUGIE!");
    }

    #[test]
    fn beyond_table_falls_back_to_first_tier() {
        assert_eq!(milestone_for(60), Some(FIRST_TIER));
        assert_eq!(milestone_for(1230), Some(FIRST_TIER));
    }

    #[test]
    fn gallery_resolves_to_a_member() {
        let mut rng = Mcg128Xsl64::seed_from_u64(5);
        for _ in 0..20 {
            let path = FIRST_TIER.asset.resolve(&mut rng);
            assert!(CALF_GALLERY.contains(&path));
        }
        let fixed = milestone_for(20).unwrap().asset.resolve(&mut rng);
        assert_eq!(fixed, "assets/Double Bougie Ramming.png");
    }
}
