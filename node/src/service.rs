//! Election service.
//!
//! Every mutation is a read-modify-write inside the store's write
//! transaction: the call is checked against the state as stored at that
//! moment, and its changes commit in the same transaction. Several services
//! or processes may therefore share one ledger. Reads come from the copy
//! published by this service's last open or write.

use tokio::sync::RwLock;

use ballotbox_election::{
    Election, ElectionError, ElectionPolicy, ElectionStatus, SignedCall, Standing, StateChange,
};
use ballotbox_store::ElectionStore;
use ballotbox_types::{Candidate, CandidateId, ElectionPhase, Principal, Role, Voter};

use crate::NodeError;

/// Outcome of one call inside a batch.
pub type CallResult = Result<Vec<StateChange>, ElectionError>;

pub struct ElectionService<S> {
    election: RwLock<Election>,
    store: S,
}

impl<S: ElectionStore> ElectionService<S> {
    /// Restore the election held by `store`, or initialise a new one.
    ///
    /// An existing election must belong to `admin`. Its stored policy wins
    /// over `policy`: rules cannot change once the election exists.
    pub fn open(store: S, admin: Principal, policy: ElectionPolicy) -> Result<Self, NodeError> {
        let election = match store.load_election()? {
            Some(election) => {
                check_admin(&election, admin)?;
                if *election.policy() != policy {
                    tracing::warn!(
                        stored = ?election.policy(),
                        configured = ?policy,
                        "configured policy ignored, using the stored one"
                    );
                }
                election
            }
            None => {
                store.initialize(&admin, &policy)?;
                tracing::info!(admin = %admin, ?policy, "new election created");
                Election::new(admin, policy)
            }
        };
        Ok(Self::with_election(store, election))
    }

    /// Restore an existing election; never creates one.
    ///
    /// With `admin` given, the stored administrator must match it.
    pub fn load(store: S, admin: Option<Principal>) -> Result<Self, NodeError> {
        let election = store.load_election()?.ok_or(NodeError::NotInitialized)?;
        if let Some(admin) = admin {
            check_admin(&election, admin)?;
        }
        Ok(Self::with_election(store, election))
    }

    fn with_election(store: S, election: Election) -> Self {
        tracing::info!(
            admin = %election.admin(),
            phase = %election.current_phase(),
            candidates = election.candidate_count(),
            "election service ready"
        );
        Self {
            election: RwLock::new(election),
            store,
        }
    }

    /// Apply one call atomically.
    ///
    /// The call is checked against the latest stored state and its changes
    /// are committed before the refreshed election is published. A rejected
    /// call writes nothing; a failed commit also leaves memory as it was.
    pub async fn submit(&self, call: SignedCall) -> Result<Vec<StateChange>, NodeError> {
        let mut election = self.election.write().await;
        let (latest, result) = self.store.update(|working| match working.apply(&call) {
            Ok(changes) => (changes.clone(), Ok(changes)),
            Err(e) => (Vec::new(), Err(e)),
        })?;
        *election = latest;
        Ok(result?)
    }

    /// Apply calls in order, each one independently.
    ///
    /// A rejected call does not affect the others. Changes from all accepted
    /// calls are committed in a single storage transaction; if that commit
    /// fails, none of them take effect and the error is returned instead.
    pub async fn submit_batch(&self, calls: Vec<SignedCall>) -> Result<Vec<CallResult>, NodeError> {
        let mut election = self.election.write().await;
        let (latest, results) = self.store.update(|working| {
            let mut pending = Vec::new();
            let results: Vec<CallResult> = calls
                .iter()
                .map(|call| {
                    let result = working.apply(call);
                    if let Ok(changes) = &result {
                        pending.extend(changes.iter().cloned());
                    }
                    result
                })
                .collect();
            (pending, results)
        })?;
        *election = latest;

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        tracing::info!(
            calls = results.len(),
            accepted,
            rejected = results.len() - accepted,
            "batch applied"
        );
        Ok(results)
    }

    pub async fn admin(&self) -> Principal {
        self.election.read().await.admin()
    }

    pub async fn policy(&self) -> ElectionPolicy {
        self.election.read().await.policy().clone()
    }

    pub async fn phase(&self) -> ElectionPhase {
        self.election.read().await.current_phase()
    }

    pub async fn voter(&self, principal: &Principal) -> Option<Voter> {
        self.election.read().await.voter(principal).cloned()
    }

    pub async fn candidate(&self, id: CandidateId) -> Option<Candidate> {
        self.election.read().await.candidate(id).cloned()
    }

    pub async fn candidates(&self) -> Vec<Candidate> {
        self.election.read().await.candidates().to_vec()
    }

    pub async fn candidate_count(&self) -> u64 {
        self.election.read().await.candidate_count()
    }

    pub async fn role_of(&self, principal: &Principal) -> Role {
        self.election.read().await.role_of(principal)
    }

    pub async fn rankings(&self) -> Vec<Candidate> {
        self.election.read().await.rankings()
    }

    pub async fn winner(&self) -> Option<Standing> {
        self.election.read().await.winner()
    }

    pub async fn status(&self) -> ElectionStatus {
        self.election.read().await.status()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn check_admin(election: &Election, configured: Principal) -> Result<(), NodeError> {
    if election.admin() != configured {
        return Err(NodeError::AdminMismatch {
            configured,
            stored: election.admin(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballotbox_election::ElectionCall;
    use ballotbox_nullables::NullStore;
    use std::sync::Arc;

    fn admin() -> Principal {
        Principal::from_seed(0xaa)
    }

    fn call(caller: Principal, call: ElectionCall) -> SignedCall {
        SignedCall::new(caller, call)
    }

    fn candidate_call(name: &str, affiliation: &str) -> SignedCall {
        call(
            admin(),
            ElectionCall::RegisterCandidate {
                name: name.into(),
                affiliation: affiliation.into(),
            },
        )
    }

    fn vote(voter: Principal, id: u32) -> SignedCall {
        call(
            voter,
            ElectionCall::CastVote {
                candidate: CandidateId::new(id),
            },
        )
    }

    fn service() -> ElectionService<NullStore> {
        ElectionService::open(NullStore::new(), admin(), ElectionPolicy::default()).unwrap()
    }

    #[tokio::test]
    async fn submit_persists_before_publishing() {
        let svc = service();
        let a = Principal::from_seed(1);
        svc.submit(call(admin(), ElectionCall::RegisterVoter { voter: a }))
            .await
            .unwrap();
        svc.submit(candidate_call("X", "Blue")).await.unwrap();
        svc.submit(call(admin(), ElectionCall::StartVoting))
            .await
            .unwrap();
        svc.submit(vote(a, 1)).await.unwrap();

        let stored = svc.store().load_election().unwrap().unwrap();
        assert_eq!(stored.candidates(), svc.candidates().await.as_slice());
        assert_eq!(stored.voter(&a).cloned(), svc.voter(&a).await);
        assert_eq!(stored.current_phase(), ElectionPhase::Open);
        assert_eq!(svc.candidate(CandidateId::FIRST).await.unwrap().vote_count, 1);
    }

    #[tokio::test]
    async fn rejected_call_changes_nothing() {
        let svc = service();
        let intruder = Principal::from_seed(9);
        let err = svc
            .submit(call(intruder, ElectionCall::StartVoting))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            NodeError::Election(ElectionError::Unauthorized { caller }) if caller == intruder
        ));
        assert_eq!(svc.phase().await, ElectionPhase::Setup);
        assert_eq!(svc.store().get_phase().unwrap(), Some(ElectionPhase::Setup));
    }

    #[tokio::test]
    async fn failed_commit_leaves_memory_untouched() {
        let svc = service();
        svc.store().fail_writes(true);
        let err = svc.submit(candidate_call("X", "Blue")).await.unwrap_err();
        assert!(matches!(err, NodeError::Store(_)));
        assert_eq!(svc.candidate_count().await, 0);

        svc.store().fail_writes(false);
        svc.submit(candidate_call("X", "Blue")).await.unwrap();
        assert_eq!(svc.candidates().await[0].id, CandidateId::FIRST);
    }

    #[tokio::test]
    async fn batch_results_are_independent() {
        let svc = service();
        let a = Principal::from_seed(1);
        let stranger = Principal::from_seed(2);
        let results = svc
            .submit_batch(vec![
                call(admin(), ElectionCall::RegisterVoter { voter: a }),
                call(admin(), ElectionCall::RegisterVoter { voter: a }),
                candidate_call("X", "Blue"),
                call(admin(), ElectionCall::StartVoting),
                vote(stranger, 1),
                vote(a, 1),
                vote(a, 1),
            ])
            .await
            .unwrap();

        let kinds: Vec<&str> = results
            .iter()
            .map(|r| r.as_ref().err().map_or("ok", |e| e.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                "ok",
                "already_registered",
                "ok",
                "ok",
                "unregistered",
                "ok",
                "already_voted"
            ]
        );

        let stored = svc.store().load_election().unwrap().unwrap();
        assert_eq!(stored.total_votes(), 1);
        assert_eq!(svc.status().await.votes_cast, 1);
    }

    #[tokio::test]
    async fn failed_batch_commit_discards_every_call() {
        let svc = service();
        svc.store().fail_writes(true);
        let result = svc
            .submit_batch(vec![candidate_call("X", "Blue"), candidate_call("Y", "Red")])
            .await;
        assert!(result.is_err());
        assert_eq!(svc.candidate_count().await, 0);
    }

    #[tokio::test]
    async fn reopen_keeps_stored_policy() {
        let store = NullStore::new();
        store.initialize(&admin(), &ElectionPolicy::strict()).unwrap();
        let svc = ElectionService::open(store, admin(), ElectionPolicy::default()).unwrap();
        assert_eq!(svc.policy().await, ElectionPolicy::strict());
    }

    #[tokio::test]
    async fn reopen_with_another_admin_is_refused() {
        let store = NullStore::new();
        store.initialize(&admin(), &ElectionPolicy::default()).unwrap();
        let other = Principal::from_seed(1);
        let result = ElectionService::open(store, other, ElectionPolicy::default());
        assert!(matches!(
            result,
            Err(NodeError::AdminMismatch { configured, stored })
                if configured == other && stored == admin()
        ));
    }

    #[tokio::test]
    async fn load_requires_an_election() {
        let result = ElectionService::load(NullStore::new(), Some(admin()));
        assert!(matches!(result, Err(NodeError::NotInitialized)));
    }

    #[tokio::test]
    async fn load_checks_the_expected_admin() {
        let store = NullStore::new();
        store.initialize(&admin(), &ElectionPolicy::default()).unwrap();
        let other = Principal::from_seed(1);
        let result = ElectionService::load(store, Some(other));
        assert!(matches!(result, Err(NodeError::AdminMismatch { .. })));
    }

    #[tokio::test]
    async fn submit_checks_against_stored_state_not_the_cached_copy() {
        let svc = service();
        let a = Principal::from_seed(1);
        let b = Principal::from_seed(2);
        for voter in [a, b] {
            svc.submit(call(admin(), ElectionCall::RegisterVoter { voter }))
                .await
                .unwrap();
        }
        svc.submit(candidate_call("X", "Blue")).await.unwrap();
        svc.submit(call(admin(), ElectionCall::StartVoting))
            .await
            .unwrap();

        // Another writer on the same storage records a's vote.
        svc.store()
            .update(|election| (election.apply(&vote(a, 1)).unwrap(), ()))
            .unwrap();
        assert_eq!(
            svc.candidate(CandidateId::FIRST).await.unwrap().vote_count,
            0
        );

        let err = svc.submit(vote(a, 1)).await.unwrap_err();
        assert!(matches!(err, NodeError::Election(e) if e.kind() == "already_voted"));
        svc.submit(vote(b, 1)).await.unwrap();

        assert_eq!(
            svc.candidate(CandidateId::FIRST).await.unwrap().vote_count,
            2
        );
        let stored = svc.store().load_election().unwrap().unwrap();
        assert_eq!(stored.total_votes(), 2);
    }

    #[tokio::test]
    async fn queries_report_roles_and_standings() {
        let svc = service();
        let a = Principal::from_seed(1);
        svc.submit(call(admin(), ElectionCall::RegisterVoter { voter: a }))
            .await
            .unwrap();
        svc.submit(candidate_call("X", "Blue")).await.unwrap();
        svc.submit(candidate_call("Y", "Green")).await.unwrap();

        assert_eq!(svc.admin().await, admin());
        assert_eq!(svc.role_of(&admin()).await, Role::Admin);
        assert_eq!(svc.role_of(&a).await, Role::RegisteredVoter);
        assert_eq!(
            svc.role_of(&Principal::from_seed(2)).await,
            Role::Unregistered
        );

        svc.submit(call(admin(), ElectionCall::StartVoting))
            .await
            .unwrap();
        svc.submit(vote(a, 2)).await.unwrap();
        let leader = svc.winner().await.unwrap();
        assert!(!leader.is_final);
        assert_eq!(leader.candidate.name, "Y");

        svc.submit(call(admin(), ElectionCall::EndVoting))
            .await
            .unwrap();
        assert!(svc.winner().await.unwrap().is_final);
        assert_eq!(
            svc.rankings()
                .await
                .iter()
                .map(|c| c.id.get())
                .collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert!(svc.voter(&a).await.unwrap().has_voted());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_votes_count_exactly_once() {
        let svc = Arc::new(service());
        let voters: Vec<Principal> = (1..=20).map(Principal::from_seed).collect();
        for v in &voters {
            svc.submit(call(admin(), ElectionCall::RegisterVoter { voter: *v }))
                .await
                .unwrap();
        }
        svc.submit(candidate_call("X", "Blue")).await.unwrap();
        svc.submit(call(admin(), ElectionCall::StartVoting))
            .await
            .unwrap();

        // Every voter tries twice, concurrently.
        let mut handles = Vec::new();
        for v in voters.iter().chain(voters.iter()) {
            let svc = Arc::clone(&svc);
            let v = *v;
            handles.push(tokio::spawn(async move { svc.submit(vote(v, 1)).await }));
        }
        let mut accepted = 0;
        for h in handles {
            if h.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, voters.len());
        assert_eq!(
            svc.candidate(CandidateId::FIRST).await.unwrap().vote_count,
            voters.len() as u64
        );
    }
}
