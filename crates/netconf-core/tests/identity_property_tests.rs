use std::cmp::Ordering;

use netconf_core::identity::{natural_cmp, ModelNodeId, Rdn, RequestScope};
use netconf_core_types::RequestContext;
use proptest::prelude::*;

const NS: &str = "urn:example:jukebox";

fn rdn_strategy() -> impl Strategy<Value = Rdn> {
    prop_oneof![
        prop::sample::select(vec!["jukebox", "library", "artist", "album"])
            .prop_map(|name| Rdn::container(NS, name)),
        ("[a-c]{1,2}[0-9]{0,2}").prop_map(|value| Rdn::key(NS, "name", value)),
    ]
}

fn id_strategy() -> impl Strategy<Value = ModelNodeId> {
    prop::collection::vec(rdn_strategy(), 0..6).prop_map(ModelNodeId::from_rdns)
}

/// An identity plus two nested prefixes of it
fn chain_strategy() -> impl Strategy<Value = (ModelNodeId, ModelNodeId, ModelNodeId)> {
    prop::collection::vec(rdn_strategy(), 0..8).prop_flat_map(|rdns| {
        let len = rdns.len();
        (0..=len, 0..=len).prop_map(move |(a, b)| {
            let (short, long) = if a <= b { (a, b) } else { (b, a) };
            (
                ModelNodeId::from_rdns(rdns.clone()),
                ModelNodeId::from_rdns(rdns[..long].to_vec()),
                ModelNodeId::from_rdns(rdns[..short].to_vec()),
            )
        })
    })
}

proptest! {
    #[test]
    fn prop_begins_with_is_transitive((full, mid, short) in chain_strategy()) {
        prop_assert!(full.begins_with(&mid));
        prop_assert!(mid.begins_with(&short));
        prop_assert!(full.begins_with(&short));
    }

    #[test]
    fn prop_begins_with_transitive_for_arbitrary_ids(
        a in id_strategy(),
        b in id_strategy(),
        c in id_strategy(),
    ) {
        if a.begins_with(&b) && b.begins_with(&c) {
            prop_assert!(a.begins_with(&c));
        }
    }

    #[test]
    fn prop_cmp_equal_iff_eq(a in id_strategy(), b in id_strategy()) {
        prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn prop_prefix_sorts_first((full, prefix, _) in chain_strategy()) {
        prop_assert_ne!(prefix.cmp(&full), Ordering::Greater);
    }

    #[test]
    fn prop_memoized_compare_agrees(ids in prop::collection::vec(id_strategy(), 1..8)) {
        let scope = RequestScope::new(RequestContext::default());
        for a in &ids {
            for b in &ids {
                prop_assert_eq!(scope.compare(a, b), a.cmp(b));
                // second lookup comes from the memo
                prop_assert_eq!(scope.compare(a, b), a.cmp(b));
            }
        }
    }

    #[test]
    fn prop_path_string_round_trips(id in id_strategy()) {
        let parsed = ModelNodeId::from_path_string(id.path_string(), NS).unwrap();
        prop_assert_eq!(parsed, id);
    }

    #[test]
    fn prop_natural_cmp_is_antisymmetric(a in "[a-c0-9]{0,5}", b in "[a-c0-9]{0,5}") {
        prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        prop_assert_eq!(natural_cmp(&a, &b) == Ordering::Equal, a == b);
    }
}

#[test]
fn test_natural_order_of_keys() {
    let mut ids: Vec<ModelNodeId> = ["song10", "song2", "song1"]
        .iter()
        .map(|v| {
            ModelNodeId::from_rdns(vec![
                Rdn::container(NS, "playlist"),
                Rdn::key(NS, "name", *v),
            ])
        })
        .collect();
    ids.sort();

    let names: Vec<&str> = ids.iter().map(|id| id.rdns()[1].value()).collect();
    assert_eq!(names, vec!["song1", "song2", "song10"]);
}
