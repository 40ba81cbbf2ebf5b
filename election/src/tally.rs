//! Tally engine: rankings and winner, derived from the recorded votes.
//!
//! Nothing here is cached: every query re-sorts the current candidate list,
//! so results always agree with the vote counts they were computed from.

use ballotbox_types::{Candidate, ElectionPhase};
use serde::{Deserialize, Serialize};

use crate::election::Election;

/// Order candidates by vote count, highest first. Ties go to the lower id,
/// i.e. the candidate registered earlier.
pub fn rank(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// The candidate currently ranked first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub candidate: Candidate,
    /// `true` only once voting has closed. Before that the leader can change.
    pub is_final: bool,
}

/// Aggregate view of an election, for dashboards and status queries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStatus {
    pub phase: ElectionPhase,
    pub candidates: u64,
    pub registered_voters: u64,
    pub votes_cast: u64,
    /// Votes cast per registered voter, in basis points.
    pub turnout_bps: u32,
}

impl Election {
    /// All candidates, best first.
    pub fn rankings(&self) -> Vec<Candidate> {
        rank(self.registry.candidates())
    }

    /// The winner once closed, the provisional leader before that, or `None`
    /// if no candidate was ever registered.
    pub fn winner(&self) -> Option<Standing> {
        let is_final = self.phase.current().is_final();
        self.rankings()
            .into_iter()
            .next()
            .map(|candidate| Standing {
                candidate,
                is_final,
            })
    }

    /// Sum of all candidates' vote counts.
    pub fn total_votes(&self) -> u64 {
        self.registry
            .candidates()
            .iter()
            .map(|c| c.vote_count)
            .sum()
    }

    pub fn status(&self) -> ElectionStatus {
        let registered_voters = self.registry.voter_count();
        let votes_cast = self.registry.votes_cast();
        let turnout_bps = if registered_voters == 0 {
            0
        } else {
            (votes_cast.saturating_mul(10_000) / registered_voters) as u32
        };
        ElectionStatus {
            phase: self.phase.current(),
            candidates: self.registry.candidate_count(),
            registered_voters,
            votes_cast,
            turnout_bps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ElectionPolicy;
    use ballotbox_types::{CandidateId, Principal};

    fn candidate(id: u32, votes: u64) -> Candidate {
        Candidate {
            id: CandidateId::new(id),
            name: format!("c{id}"),
            affiliation: String::new(),
            vote_count: votes,
        }
    }

    fn ids(ranked: &[Candidate]) -> Vec<u32> {
        ranked.iter().map(|c| c.id.get()).collect()
    }

    #[test]
    fn test_ties_broken_by_lowest_id() {
        let ranked = rank(&[candidate(1, 5), candidate(2, 5), candidate(3, 7)]);
        assert_eq!(ids(&ranked), vec![3, 1, 2]);
    }

    #[test]
    fn test_rank_ignores_input_order() {
        let ranked = rank(&[candidate(3, 0), candidate(2, 4), candidate(1, 0)]);
        assert_eq!(ids(&ranked), vec![2, 1, 3]);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_end_to_end_tie_goes_to_first_registered() {
        let admin = Principal::from_seed(0xaa);
        let a = Principal::from_seed(1);
        let b = Principal::from_seed(2);
        let mut e = Election::new(admin, ElectionPolicy::default());
        e.register_voter(&admin, a).unwrap();
        e.register_voter(&admin, b).unwrap();
        let x = e.register_candidate(&admin, "X", "Blue").unwrap();
        let y = e.register_candidate(&admin, "Y", "Green").unwrap();
        e.start_voting(&admin).unwrap();
        e.cast_vote(&a, x).unwrap();
        e.cast_vote(&b, y).unwrap();
        e.end_voting(&admin).unwrap();

        let winner = e.winner().unwrap();
        assert!(winner.is_final);
        assert_eq!(winner.candidate.id, x);

        let ranked = e.rankings();
        assert_eq!(ids(&ranked), vec![1, 2]);
        assert_eq!(ranked[0].vote_count, 1);
        assert_eq!(ranked[1].vote_count, 1);
    }

    #[test]
    fn test_provisional_leader_before_close() {
        let admin = Principal::from_seed(0xaa);
        let a = Principal::from_seed(1);
        let mut e = Election::new(admin, ElectionPolicy::default());
        e.register_voter(&admin, a).unwrap();
        e.register_candidate(&admin, "X", "Blue").unwrap();
        let y = e.register_candidate(&admin, "Y", "Green").unwrap();
        e.start_voting(&admin).unwrap();
        e.cast_vote(&a, y).unwrap();

        let leader = e.winner().unwrap();
        assert!(!leader.is_final);
        assert_eq!(leader.candidate.id, y);
    }

    #[test]
    fn test_no_winner_without_candidates() {
        let admin = Principal::from_seed(0xaa);
        let mut e = Election::new(admin, ElectionPolicy::default());
        e.start_voting(&admin).unwrap();
        e.end_voting(&admin).unwrap();
        assert_eq!(e.winner(), None);
        assert!(e.rankings().is_empty());
    }

    #[test]
    fn test_rankings_are_repeatable() {
        let admin = Principal::from_seed(0xaa);
        let mut e = Election::new(admin, ElectionPolicy::default());
        for name in ["A", "B", "C"] {
            e.register_candidate(&admin, name, "").unwrap();
        }
        assert_eq!(e.rankings(), e.rankings());
    }

    #[test]
    fn test_status_turnout() {
        let admin = Principal::from_seed(0xaa);
        let mut e = Election::new(admin, ElectionPolicy::default());
        for seed in 1..=4 {
            e.register_voter(&admin, Principal::from_seed(seed)).unwrap();
        }
        let x = e.register_candidate(&admin, "X", "Blue").unwrap();
        e.start_voting(&admin).unwrap();
        e.cast_vote(&Principal::from_seed(1), x).unwrap();

        let status = e.status();
        assert_eq!(status.phase, ElectionPhase::Open);
        assert_eq!(status.candidates, 1);
        assert_eq!(status.registered_voters, 4);
        assert_eq!(status.votes_cast, 1);
        assert_eq!(status.turnout_bps, 2_500);
        assert_eq!(e.total_votes(), 1);
    }

    #[test]
    fn test_status_without_voters() {
        let e = Election::new(Principal::from_seed(0xaa), ElectionPolicy::default());
        assert_eq!(e.status().turnout_bps, 0);
    }
}
