/// Bonus for finishing early: a tenth of a point per full ten seconds left.
pub fn time_bonus(time_remaining: u32) -> f64 {
    (time_remaining / 10) as f64 * 0.1
}

pub fn final_score(score: u32, time_remaining: u32) -> f64 {
    score as f64 + time_bonus(time_remaining)
}
