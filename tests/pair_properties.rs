//! Cross-network properties of generated pairs under default parameters.

use hypernet::{NetworkPair, NetworkPairBuilder, WorkloadBuilder};

/// Helper function to set up an initialized default pair from seed 0.
fn setup_default_pair() -> NetworkPair {
    let mut pair = NetworkPairBuilder::new(0).generate().expect("default configuration is valid");
    pair.init();
    pair
}

#[test]
fn test_default_pair_has_equal_wealth_everywhere() {
    let pair = setup_default_pair();
    let classic = pair.classic_network();
    let hyper = pair.hyper_network();

    assert_eq!(classic.num_members(), 1_000);
    assert_eq!(classic.num_channels(), 1_200);
    assert_eq!(classic.members(), hyper.members());

    for &member in classic.members() {
        assert_eq!(
            classic.wealth_of(member),
            hyper.wealth_of(member),
            "wealth of {} differs between classic and hyper",
            member
        );
    }
}

#[test]
fn test_default_pair_is_deterministic() {
    let first = setup_default_pair();
    let second = setup_default_pair();

    for (ours, theirs) in [
        (first.classic_network(), second.classic_network()),
        (first.hyper_network(), second.hyper_network()),
    ] {
        assert_eq!(ours.members(), theirs.members());
        assert_eq!(ours.num_channels(), theirs.num_channels());

        for ((id, channel), (other_id, other_channel)) in ours.channels().zip(theirs.channels()) {
            assert_eq!(id, other_id);
            assert_eq!(channel.members(), other_channel.members());
            assert_eq!(channel.balances(), other_channel.balances());
            assert_eq!(channel.funding_amount(), other_channel.funding_amount());
        }
    }
}

#[test]
fn test_workload_preserves_channel_sums_on_both_networks() {
    let mut pair = setup_default_pair();

    let mut classic_workload =
        WorkloadBuilder::new(0).num_payments(100).generate().expect("configuration is valid");
    classic_workload.init(pair.classic_network_mut());

    let mut hyper_workload =
        WorkloadBuilder::new(0).num_payments(100).generate().expect("configuration is valid");
    hyper_workload.init(pair.hyper_network_mut());

    // Identical seeds against identical wealth distributions attempt the
    // same payments on both networks.
    assert_eq!(classic_workload.payments(), hyper_workload.payments());

    for network in [pair.classic_network(), pair.hyper_network()] {
        for (id, channel) in network.channels() {
            let sum: i64 = channel.balances().iter().map(|(_, balance)| balance).sum();
            assert_eq!(
                sum,
                channel.funding_amount(),
                "balance sum of channel {} drifted from its funding amount",
                id
            );
            assert!(
                channel.balances().iter().all(|&(_, balance)| balance >= 0),
                "channel {} holds a negative balance",
                id
            );
        }
    }
}

#[test]
fn test_workload_conserves_total_wealth() {
    let mut pair = setup_default_pair();

    let total_before: i64 = {
        let hyper = pair.hyper_network();
        hyper.members().iter().map(|&member| hyper.wealth_of(member)).sum()
    };

    let mut workload =
        WorkloadBuilder::new(0).num_payments(100).generate().expect("configuration is valid");
    workload.init(pair.hyper_network_mut());

    let hyper = pair.hyper_network();
    let total_after: i64 = hyper.members().iter().map(|&member| hyper.wealth_of(member)).sum();

    // Fees only move money between channel members; nothing leaves the
    // network.
    assert_eq!(total_before, total_after);
}
