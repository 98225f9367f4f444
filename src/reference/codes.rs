use rand::seq::SliceRandom;
use std::collections::HashSet;

pub const PALETTE: [&str; 12] = [
    "#ef4444", "#f97316", "#f59e0b", "#84cc16", "#22c55e", "#14b8a6", "#06b6d4", "#3b82f6",
    "#6366f1", "#8b5cf6", "#d946ef", "#ec4899",
];

/// Next free sequential code (`V001`, `A012`, `WS004`).
///
/// Starts from `existing.len() + 1` and steps forward until the candidate
/// is not taken, so gaps left by deletions never produce duplicates.
pub fn next_code<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: HashSet<String> = existing.into_iter().map(|c| c.to_ascii_uppercase()).collect();
    let mut n = taken.len() + 1;
    loop {
        let candidate = format!("{}{:03}", prefix, n);
        if !taken.contains(&candidate.to_ascii_uppercase()) {
            return candidate;
        }
        n += 1;
    }
}

/// Random palette color, preferring ones no existing entry uses.
pub fn pick_color<'a, I>(used: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let used: HashSet<String> = used.into_iter().map(|c| c.to_ascii_lowercase()).collect();
    let free: Vec<&str> = PALETTE
        .iter()
        .copied()
        .filter(|c| !used.contains(*c))
        .collect();
    let pool: &[&str] = if free.is_empty() { &PALETTE } else { &free };
    let mut rng = rand::thread_rng();
    pool.choose(&mut rng).copied().unwrap_or(PALETTE[0]).to_string()
}
