//! Randomized check-in rewards.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_INGOT_MAX, DEFAULT_INGOT_MIN, DEFAULT_POINTS_MAX, DEFAULT_POINTS_MIN,
    DEFAULT_POINTS_PROB,
};
use crate::error::SettingsError;
use crate::types::{CurrencyKind, Reward};

/// Probability and ranges of the reward draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardConfig {
    pub points_prob: f64,
    pub points_min: u64,
    pub points_max: u64,
    pub ingot_min: u64,
    pub ingot_max: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            points_prob: DEFAULT_POINTS_PROB,
            points_min: DEFAULT_POINTS_MIN,
            points_max: DEFAULT_POINTS_MAX,
            ingot_min: DEFAULT_INGOT_MIN,
            ingot_max: DEFAULT_INGOT_MAX,
        }
    }
}

impl RewardConfig {
    /// Reject configurations that `draw` could not sample from.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.points_prob) {
            return Err(SettingsError::Probability(self.points_prob));
        }
        if self.points_min > self.points_max {
            return Err(SettingsError::EmptyRange {
                name: "reward_points",
                min: self.points_min,
                max: self.points_max,
            });
        }
        if self.ingot_min > self.ingot_max {
            return Err(SettingsError::EmptyRange {
                name: "reward_ingot",
                min: self.ingot_min,
                max: self.ingot_max,
            });
        }
        Ok(())
    }
}

/// Draw one reward. `cfg` must have passed [`RewardConfig::validate`].
pub fn draw<R: Rng + ?Sized>(cfg: &RewardConfig, rng: &mut R) -> Reward {
    let (kind, min, max) = if rng.gen::<f64>() < cfg.points_prob {
        (CurrencyKind::Points, cfg.points_min, cfg.points_max)
    } else {
        (CurrencyKind::Ingots, cfg.ingot_min, cfg.ingot_max)
    };
    Reward {
        kind,
        amount: rng.gen_range(min..=max).max(1),
    }
}

/// Seam through which the ledger obtains reward draws.
pub trait RewardSource: Send + Sync {
    fn draw(&self, cfg: &RewardConfig) -> Reward;
}

/// Draws from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRewards;

impl RewardSource for RandomRewards {
    fn draw(&self, cfg: &RewardConfig) -> Reward {
        draw(cfg, &mut rand::thread_rng())
    }
}

/// Always yields the same reward.
#[derive(Debug, Clone, Copy)]
pub struct FixedReward(pub Reward);

impl RewardSource for FixedReward {
    fn draw(&self, _cfg: &RewardConfig) -> Reward {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draws_stay_in_range() {
        let cfg = RewardConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let r = draw(&cfg, &mut rng);
            match r.kind {
                CurrencyKind::Points => assert!((10..=50).contains(&r.amount)),
                CurrencyKind::Ingots => assert!((5..=30).contains(&r.amount)),
            }
        }
    }

    #[test]
    fn test_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let all_points = RewardConfig { points_prob: 1.0, ..Default::default() };
        let all_ingots = RewardConfig { points_prob: 0.0, ..Default::default() };
        for _ in 0..50 {
            assert_eq!(draw(&all_points, &mut rng).kind, CurrencyKind::Points);
            assert_eq!(draw(&all_ingots, &mut rng).kind, CurrencyKind::Ingots);
        }
    }

    #[test]
    fn test_amount_floored_at_one() {
        let cfg = RewardConfig {
            points_prob: 1.0,
            points_min: 0,
            points_max: 0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(draw(&cfg, &mut rng).amount, 1);
    }

    #[test]
    fn test_validate_rejects_empty_range() {
        let cfg = RewardConfig { ingot_min: 31, ingot_max: 30, ..Default::default() };
        assert!(matches!(
            cfg.validate(),
            Err(SettingsError::EmptyRange { name: "reward_ingot", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_probability() {
        let cfg = RewardConfig { points_prob: 1.5, ..Default::default() };
        assert!(cfg.validate().is_err());
        assert!(RewardConfig::default().validate().is_ok());
    }
}
