/// Team Match Engine: Arithmetic Primitives
///
/// All numeric values: i64 fixed-point (SCALE = 10_000).
/// No float. No f64. No f32.

use crate::domain::RankDecay;
use crate::error::EngineError;

/// Fixed-point scale factor. All "real" values are stored as `real * SCALE`.
pub const SCALE: i64 = 10_000;

/// Ceiling of every factor score: 100 points in fixed-point.
pub const MAX_SCORE: i64 = 100 * SCALE;

/// Checked integer addition. Panics on i64 overflow.
pub fn checked_add(a: i64, b: i64) -> i64 {
    match a.checked_add(b) {
        Some(result) => result,
        None => panic!("Overflow: {} + {} overflows i64", a, b),
    }
}

/// Checked integer multiplication. Panics on i64 overflow.
pub fn checked_mul(a: i64, b: i64) -> i64 {
    match a.checked_mul(b) {
        Some(result) => result,
        None => panic!("Overflow: {} * {} overflows i64", a, b),
    }
}

/// Whole points (0..=100) to a fixed-point score.
pub fn points(whole: i64) -> i64 {
    checked_mul(whole, SCALE)
}

/// `num / den` as a fixed-point fraction. Returns 0 when `den == 0`.
pub fn ratio(num: i64, den: i64) -> i64 {
    if den == 0 {
        return 0;
    }
    checked_mul(num, SCALE) / den
}

/// Apply a fixed-point weight: `value * weight / SCALE`, truncating.
pub fn apply_weight(value: i64, weight: i64) -> i64 {
    checked_mul(value, weight) / SCALE
}

/// Clamp a fixed-point score into `[0, MAX_SCORE]`.
pub fn clamp_score(score: i64) -> i64 {
    score.clamp(0, MAX_SCORE)
}

/// A fraction in `[0, SCALE]` mapped onto the `[0, MAX_SCORE]` score range.
pub fn fraction_to_score(fraction: i64) -> i64 {
    clamp_score(checked_mul(fraction, 100))
}

/// Round a fixed-point value to whole units, half rounding up.
pub fn round_to_units(value: i64) -> i64 {
    checked_add(value, SCALE / 2).div_euclid(SCALE)
}

/// Rank → contribution curve shared by coverage and culture fit.
///
/// Rank 1 yields `SCALE`. Higher ranks decay monotonically and never reach
/// zero. Rank 0 is not a valid rank and yields 0.
pub fn rank_weight(rank: u32, decay: &RankDecay) -> i64 {
    if rank == 0 {
        return 0;
    }
    let rank = i64::from(rank);
    let value = match decay {
        RankDecay::Reciprocal => SCALE / rank,
        RankDecay::Table { weights } => match weights.get((rank - 1) as usize) {
            Some(w) => *w,
            // Past the table the curve continues as a reciprocal tail.
            None => match weights.last() {
                Some(last) => checked_mul(*last, weights.len() as i64) / rank,
                None => SCALE / rank,
            },
        },
    };
    value.max(1)
}

/// Validate that a member ID matches `[a-zA-Z0-9_-]+`.
pub fn validate_member_id(member_id: &str) -> Result<(), EngineError> {
    let well_formed = !member_id.is_empty()
        && member_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if well_formed {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!(
            "Invalid member ID {:?}: must match [a-zA-Z0-9_-]+",
            member_id
        )))
    }
}
