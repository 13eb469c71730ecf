use crate::models::{DistributionPlan, UserContext};

/// Tier shares in whole percent: easy, review, normal, hard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TierShares {
    easy: usize,
    review: usize,
    normal: usize,
    hard: usize,
}

// Gentle introduction, no review history yet
const NEW_USER: TierShares = TierShares {
    easy: 60,
    review: 0,
    normal: 30,
    hard: 10,
};

// Confidence builders, no hard questions
const STRUGGLING: TierShares = TierShares {
    easy: 40,
    review: 30,
    normal: 30,
    hard: 0,
};

const EXCELLING: TierShares = TierShares {
    easy: 10,
    review: 20,
    normal: 40,
    hard: 30,
};

const BALANCED: TierShares = TierShares {
    easy: 20,
    review: 20,
    normal: 50,
    hard: 10,
};

/// Splits `total_count` into tier counts for the learner's current state.
///
/// Buckets are checked in priority order: new, struggling, excelling,
/// balanced. Each share is rounded up on its own and the result is not
/// renormalized, so the plan may ask for more than `total_count`; the
/// selector truncates afterwards.
pub fn plan_distribution(context: &UserContext, total_count: usize) -> DistributionPlan {
    let shares = if context.is_new {
        NEW_USER
    } else if context.is_struggling {
        STRUGGLING
    } else if context.is_excelling {
        EXCELLING
    } else {
        BALANCED
    };

    DistributionPlan {
        easy: ceil_share(total_count, shares.easy),
        review: ceil_share(total_count, shares.review),
        normal: ceil_share(total_count, shares.normal),
        hard: ceil_share(total_count, shares.hard),
    }
}

/// `ceil(total * percent / 100)` without floating point drift
fn ceil_share(total: usize, percent: usize) -> usize {
    (total * percent).div_ceil(100)
}
