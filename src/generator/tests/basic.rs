use crate::generator::{ConfigError, NetworkPair, NetworkPairBuilder};
use crate::types::MemberId;

/// Helper function to set up a small initialized pair.
fn setup_small_pair() -> NetworkPair {
    let mut pair = NetworkPairBuilder::new(0)
        .num_members(100)
        .num_classic_channels(120)
        .max_hyper_channel_size(30)
        .hpc_avoidance_min_connectivity(20)
        .generate()
        .expect("configuration is valid");
    pair.init();
    pair
}

#[test]
fn test_classic_network_shape() {
    let pair = setup_small_pair();
    let classic = pair.classic_network();

    assert_eq!(classic.num_members(), 100);
    assert_eq!(classic.num_channels(), 120);
    // Preferential attachment only ever opens two-member channels.
    assert_eq!(classic.num_classic_channels(), 120);
    assert!(classic.channels().all(|(_, channel)| channel.num_members() == 2));
}

#[test]
fn test_deposits_stay_within_funding_bounds() {
    let pair = setup_small_pair();

    for (_, channel) in pair.classic_network().channels() {
        for (_, balance) in channel.balances() {
            assert!(balance >= 10_000_000, "deposit {} below the funding minimum", balance);
            assert!(balance <= 10_000_000_000, "deposit {} above the funding maximum", balance);
        }
    }
}

#[test]
fn test_hyper_channels_respect_size_cap() {
    let pair = setup_small_pair();

    for (_, channel) in pair.hyper_network().channels() {
        assert!(channel.num_members() >= 2);
        assert!(channel.num_members() <= 30);
    }
}

#[test]
fn test_hyper_network_fuses_dead_ends() {
    let pair = setup_small_pair();
    let hyper = pair.hyper_network();

    // With 100 members and 120 channels the classic network has plenty of
    // degree-one members, so fusion must produce multi-member channels and
    // shrink the channel count.
    assert!(hyper.num_proper_hyper_channels() > 0);
    assert!(hyper.num_channels() < pair.classic_network().num_channels());

    // No member of the hyper network lost its dead-end connection.
    for &member in hyper.members() {
        assert!(
            !hyper.incident_channels(member).is_empty(),
            "{} has no channel in the hyper network",
            member
        );
    }
}

#[test]
fn test_wealth_is_equal_between_the_pair() {
    let pair = setup_small_pair();
    let classic = pair.classic_network();
    let hyper = pair.hyper_network();

    assert_eq!(classic.members(), hyper.members());

    for &member in classic.members() {
        assert_eq!(
            classic.wealth_of(member),
            hyper.wealth_of(member),
            "wealth of {} differs between the networks",
            member
        );
    }
}

#[test]
fn test_same_seed_reproduces_the_pair() {
    let first = setup_small_pair();
    let second = setup_small_pair();

    for (ours, theirs) in [
        (first.classic_network(), second.classic_network()),
        (first.hyper_network(), second.hyper_network()),
    ] {
        assert_eq!(ours.members(), theirs.members());
        assert_eq!(ours.num_channels(), theirs.num_channels());
        for ((_, a), (_, b)) in ours.channels().zip(theirs.channels()) {
            assert_eq!(a, b);
        }
    }
}

#[test]
fn test_different_seeds_differ() {
    let first = setup_small_pair();

    let mut second = NetworkPairBuilder::new(1)
        .num_members(100)
        .num_classic_channels(120)
        .max_hyper_channel_size(30)
        .hpc_avoidance_min_connectivity(20)
        .generate()
        .expect("configuration is valid");
    second.init();

    let differs = first
        .classic_network()
        .channels()
        .zip(second.classic_network().channels())
        .any(|((_, a), (_, b))| a != b);
    assert!(differs, "different seeds should produce different deposits or wiring");
}

#[test]
fn test_parsimony_produces_fewer_channels() {
    let mut parsimonious = NetworkPairBuilder::new(0)
        .num_members(100)
        .num_classic_channels(120)
        .max_hyper_channel_size(30)
        .hpc_avoidance_min_connectivity(20)
        .hpc_parsimony(true)
        .generate()
        .expect("configuration is valid");
    parsimonious.init();

    let generous = setup_small_pair();

    // Skipping path contraction leaves more classic channels untouched.
    assert!(
        parsimonious.hyper_network().num_classic_channels()
            >= generous.hyper_network().num_classic_channels()
    );

    // Wealth equivalence holds either way.
    let hyper = parsimonious.hyper_network();
    for &member in parsimonious.classic_network().members() {
        assert_eq!(parsimonious.classic_network().wealth_of(member), hyper.wealth_of(member));
    }
}

#[test]
fn test_too_few_channels_is_a_config_error() {
    let result = NetworkPairBuilder::new(0)
        .num_members(100)
        .num_classic_channels(50)
        .generate();

    assert!(matches!(result, Err(ConfigError::TooFewChannels { .. })));
}

#[test]
fn test_invalid_funding_bounds_are_a_config_error() {
    let result = NetworkPairBuilder::new(0)
        .funding_contribution_min(1_000)
        .funding_contribution_max(10)
        .generate();
    assert!(matches!(result, Err(ConfigError::InvalidFundingBounds { .. })));

    let result = NetworkPairBuilder::new(0).funding_contribution_min(0).generate();
    assert!(matches!(result, Err(ConfigError::InvalidFundingBounds { .. })));
}

#[test]
fn test_tiny_networks_are_rejected() {
    let result = NetworkPairBuilder::new(0).num_members(1).generate();
    assert!(matches!(result, Err(ConfigError::TooFewMembers(1))));

    let result = NetworkPairBuilder::new(0).max_hyper_channel_size(1).generate();
    assert!(matches!(result, Err(ConfigError::ChannelSizeTooSmall(1))));
}

#[test]
#[should_panic(expected = "only be initialized once")]
fn test_double_init_is_fatal() {
    let mut pair = setup_small_pair();
    pair.init();
}

#[test]
#[should_panic(expected = "requires an initialized NetworkPair")]
fn test_accessor_before_init_is_fatal() {
    let pair = NetworkPairBuilder::new(0).generate().expect("configuration is valid");
    pair.classic_network();
}

#[test]
fn test_members_are_minted_in_order() {
    let pair = setup_small_pair();
    let members: Vec<MemberId> = (0..100).map(MemberId).collect();
    assert_eq!(pair.classic_network().members(), &members[..]);
}
