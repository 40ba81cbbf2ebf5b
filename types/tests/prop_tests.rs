use proptest::prelude::*;

use ballotbox_types::{CandidateId, ElectionPhase, Principal};

fn any_phase() -> impl Strategy<Value = ElectionPhase> {
    prop_oneof![
        Just(ElectionPhase::Setup),
        Just(ElectionPhase::Open),
        Just(ElectionPhase::Closed),
    ]
}

proptest! {
    /// Any 20 bytes render to a string that parses back to the same principal,
    /// and the rendering is always 42 characters.
    #[test]
    fn principal_text_form_is_canonical(bytes in prop::array::uniform20(0u8..)) {
        let p = Principal::new(bytes);
        let text = p.to_string();
        prop_assert_eq!(text.len(), 42);
        prop_assert_eq!(text.to_uppercase().replacen("0X", "0x", 1).parse::<Principal>().unwrap(), p);
    }

    /// Principal ordering follows the raw byte ordering.
    #[test]
    fn principal_ordering_matches_bytes(
        a in prop::array::uniform20(0u8..),
        b in prop::array::uniform20(0u8..),
    ) {
        prop_assert_eq!(Principal::new(a) < Principal::new(b), a < b);
    }

    /// Storage keys preserve candidate id ordering.
    #[test]
    fn candidate_key_order(a in 1u32.., b in 1u32..) {
        let ka = CandidateId::new(a).to_key();
        let kb = CandidateId::new(b).to_key();
        prop_assert_eq!(ka < kb, a < b);
    }

    /// A successor is always strictly later, so phases can only move forward.
    #[test]
    fn successor_is_strictly_later(phase in any_phase()) {
        if let Some(next) = phase.successor() {
            prop_assert!(next > phase);
            prop_assert!(!phase.is_final());
        } else {
            prop_assert!(phase.is_final());
        }
    }

    /// Registration and voting windows never overlap.
    #[test]
    fn windows_are_disjoint(phase in any_phase()) {
        prop_assert!(!(phase.accepts_registration() && phase.accepts_votes()));
    }
}

#[test]
fn principal_bincode_is_raw_bytes() {
    let p = Principal::from_seed(9);
    let encoded = bincode::serialize(&p).unwrap();
    assert_eq!(encoded, vec![9u8; 20]);
    let decoded: Principal = bincode::deserialize(&encoded).unwrap();
    assert_eq!(decoded, p);
}
