//! Rank derivation: total XP to rank tier, sub-level and overall level.
//!
//! Each rank's XP span is split into [`SUB_LEVELS_PER_RANK`] equal bands.
//! The overall level is `rank_index * 5 + 1 + sub_level`, so a brand new
//! mentee starts at level 1 and the first sub-band of the second rank is
//! level 6.

use serde::Serialize;

use crate::error::CoreError;

/// Number of equal sub-bands each rank is divided into.
pub const SUB_LEVELS_PER_RANK: i64 = 5;

/// Fallback XP span used for the open-ended top rank.
pub const DEFAULT_TOP_RANK_SPAN: i64 = 5000;

/// Default rank ladder as `(name, min_xp)` pairs.
pub const DEFAULT_RANKS: &[(&str, i64)] = &[
    ("ROOKIE", 0),
    ("APPRENTICE", 500),
    ("PRO", 1500),
    ("ELITE", 3500),
    ("LEGEND", 7000),
];

/// A named band of XP with a fixed minimum threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankTier {
    pub name: String,
    pub min_xp: i64,
}

/// Ordered rank ladder with strictly increasing thresholds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    tiers: Vec<RankTier>,
    top_rank_span: i64,
}

/// Everything the dashboard needs to render rank progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankProgress {
    pub rank: RankTier,
    pub rank_index: usize,
    pub next_rank: Option<RankTier>,
    /// XP still needed to reach `next_rank`; `None` at the top rank.
    pub xp_to_next_rank: Option<i64>,
    /// Sub-band within the current rank, in `[0, 4]`.
    pub sub_level: i64,
    pub level: i32,
    /// Fraction of the current rank's span already covered, in `[0, 1]`.
    pub progress: f64,
}

impl Default for RankTable {
    fn default() -> Self {
        Self {
            tiers: DEFAULT_RANKS
                .iter()
                .map(|(name, min_xp)| RankTier {
                    name: (*name).to_string(),
                    min_xp: *min_xp,
                })
                .collect(),
            top_rank_span: DEFAULT_TOP_RANK_SPAN,
        }
    }
}

impl RankTable {
    /// Build a ladder, validating that thresholds start at 0 and strictly increase.
    pub fn new(tiers: Vec<RankTier>, top_rank_span: i64) -> Result<Self, CoreError> {
        let first = tiers
            .first()
            .ok_or_else(|| CoreError::Validation("Rank table must not be empty".into()))?;
        if first.min_xp != 0 {
            return Err(CoreError::Validation(format!(
                "First rank '{}' must start at 0 XP, got {}",
                first.name, first.min_xp
            )));
        }
        if let Some(pair) = tiers.windows(2).find(|w| w[1].min_xp <= w[0].min_xp) {
            return Err(CoreError::Validation(format!(
                "Rank thresholds must strictly increase: '{}' ({}) follows '{}' ({})",
                pair[1].name, pair[1].min_xp, pair[0].name, pair[0].min_xp
            )));
        }
        if top_rank_span <= 0 {
            return Err(CoreError::Validation(format!(
                "Top rank span must be positive, got {top_rank_span}"
            )));
        }
        Ok(Self {
            tiers,
            top_rank_span,
        })
    }

    /// Parse `"ROOKIE:0,APPRENTICE:500,..."` into a ladder.
    pub fn parse(raw: &str, top_rank_span: i64) -> Result<Self, CoreError> {
        let tiers = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| {
                let (name, xp) = entry.split_once(':').ok_or_else(|| {
                    CoreError::Validation(format!("Rank entry '{entry}' must be NAME:MIN_XP"))
                })?;
                let min_xp = xp.trim().parse::<i64>().map_err(|_| {
                    CoreError::Validation(format!("Rank entry '{entry}' has a non-numeric threshold"))
                })?;
                Ok(RankTier {
                    name: name.trim().to_string(),
                    min_xp,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        Self::new(tiers, top_rank_span)
    }

    pub fn tiers(&self) -> &[RankTier] {
        &self.tiers
    }

    /// Derive rank progress for `total_xp`. Negative input is treated as 0.
    pub fn derive(&self, total_xp: i64) -> RankProgress {
        let xp = total_xp.max(0);
        let rank_index = self
            .tiers
            .iter()
            .rposition(|tier| tier.min_xp <= xp)
            .unwrap_or(0);
        let rank = &self.tiers[rank_index];
        let next_rank = self.tiers.get(rank_index + 1);

        let span = match next_rank {
            Some(next) => next.min_xp - rank.min_xp,
            None => self.top_rank_span,
        };
        let xp_into_rank = xp - rank.min_xp;
        let band = (span / SUB_LEVELS_PER_RANK).max(1);
        let sub_level = (xp_into_rank / band).clamp(0, SUB_LEVELS_PER_RANK - 1);
        let progress = (xp_into_rank as f64 / span as f64).clamp(0.0, 1.0);

        RankProgress {
            rank: rank.clone(),
            rank_index,
            next_rank: next_rank.cloned(),
            xp_to_next_rank: next_rank.map(|next| next.min_xp - xp),
            sub_level,
            level: (rank_index as i64 * SUB_LEVELS_PER_RANK + 1 + sub_level) as i32,
            progress,
        }
    }

    /// Shorthand for `derive(total_xp).level`.
    pub fn level_for(&self, total_xp: i64) -> i32 {
        self.derive(total_xp).level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_xp_is_rookie_level_one() {
        let p = RankTable::default().derive(0);
        assert_eq!(p.rank.name, "ROOKIE");
        assert_eq!(p.sub_level, 0);
        assert_eq!(p.level, 1);
        assert_eq!(p.next_rank.unwrap().name, "APPRENTICE");
        assert_eq!(p.xp_to_next_rank, Some(500));
    }

    #[test]
    fn sub_levels_split_rank_into_fifths() {
        let table = RankTable::default();
        // ROOKIE spans 500 XP, so each band is 100 XP.
        assert_eq!(table.derive(99).sub_level, 0);
        assert_eq!(table.derive(100).sub_level, 1);
        assert_eq!(table.derive(499).sub_level, 4);
        assert_eq!(table.derive(499).level, 5);
    }

    #[test]
    fn crossing_threshold_moves_to_next_rank() {
        let p = RankTable::default().derive(500);
        assert_eq!(p.rank.name, "APPRENTICE");
        assert_eq!(p.rank_index, 1);
        assert_eq!(p.level, 6);
        assert_eq!(p.xp_to_next_rank, Some(1000));
    }

    #[test]
    fn top_rank_uses_synthetic_span() {
        let table = RankTable::default();
        let p = table.derive(7000);
        assert_eq!(p.rank.name, "LEGEND");
        assert!(p.next_rank.is_none());
        assert!(p.xp_to_next_rank.is_none());
        assert_eq!(p.level, 21);
        // 5000 / 5 = 1000 XP per band.
        assert_eq!(table.derive(8000).sub_level, 1);
        assert_eq!(table.derive(1_000_000).sub_level, 4);
        assert_eq!(table.derive(1_000_000).progress, 1.0);
    }

    #[test]
    fn rank_invariants_hold_across_range() {
        let table = RankTable::default();
        for xp in (0..20_000).step_by(37) {
            let p = table.derive(xp);
            assert!(p.rank.min_xp <= xp, "xp {xp}");
            if let Some(next) = &p.next_rank {
                assert!(next.min_xp > xp, "xp {xp}");
            }
            assert!((0..=4).contains(&p.sub_level), "xp {xp}");
            assert!((0.0..=1.0).contains(&p.progress), "xp {xp}");
        }
    }

    #[test]
    fn level_never_decreases_as_xp_grows() {
        let table = RankTable::default();
        let mut last = 0;
        for xp in 0..10_000 {
            let level = table.level_for(xp);
            assert!(level >= last);
            last = level;
        }
    }

    #[test]
    fn tiny_span_does_not_divide_by_zero() {
        let table = RankTable::new(
            vec![
                RankTier { name: "A".into(), min_xp: 0 },
                RankTier { name: "B".into(), min_xp: 3 },
            ],
            2,
        )
        .unwrap();
        assert_eq!(table.derive(2).sub_level, 2);
        assert_eq!(table.derive(10).sub_level, 4);
    }

    #[test]
    fn non_increasing_thresholds_are_rejected() {
        let result = RankTable::parse("A:0,B:100,C:100", 5000);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn first_threshold_must_be_zero() {
        assert!(RankTable::parse("A:10,B:100", 5000).is_err());
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(RankTable::parse("", 5000).is_err());
    }

    #[test]
    fn parse_round_trips_default_ladder() {
        let parsed =
            RankTable::parse("ROOKIE:0,APPRENTICE:500,PRO:1500,ELITE:3500,LEGEND:7000", 5000)
                .unwrap();
        assert_eq!(parsed, RankTable::default());
    }
}
