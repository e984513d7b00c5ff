use crate::models::Match;

/// Pick the fixture a qualifying team's prediction applies to.
///
/// The soonest scheduled fixture wins. Without one, the team's combined
/// timeline is searched for the first match kicking off after `latest`
/// (the most recent of the two triggering results).
pub fn link_fixture<'a>(past: &[&'a Match], future: &[&'a Match], latest: &Match) -> Option<&'a Match> {
    if let Some(next) = future.iter().min_by_key(|m| m.date) {
        return Some(*next);
    }

    let mut timeline: Vec<&Match> = past.iter().chain(future.iter()).copied().collect();
    timeline.sort_by_key(|m| m.date);
    timeline.into_iter().find(|m| m.date > latest.date)
}
