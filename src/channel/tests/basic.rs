use crate::channel::HyperChannel;
use crate::types::MemberId;

/// Helper function to set up a two-member channel with a 70/30 split.
fn setup_two_member_channel() -> HyperChannel {
    HyperChannel::new(
        vec![MemberId(0), MemberId(1)],
        vec![70_000_000, 30_000_000],
    )
}

#[test]
fn test_construction_and_accessors() {
    let channel = setup_two_member_channel();

    assert_eq!(channel.num_members(), 2);
    assert_eq!(channel.members(), &[MemberId(0), MemberId(1)]);
    assert_eq!(channel.funding_amount(), 100_000_000);
    assert_eq!(channel.balance_of(MemberId(0)), 70_000_000);
    assert_eq!(channel.balance_of(MemberId(1)), 30_000_000);
    assert!(channel.is_member(MemberId(0)));
    assert!(!channel.is_member(MemberId(7)));
    assert_eq!(
        channel.balances(),
        vec![(MemberId(0), 70_000_000), (MemberId(1), 30_000_000)]
    );
}

#[test]
fn test_zero_deposit_is_allowed() {
    let channel = HyperChannel::new(vec![MemberId(3), MemberId(4)], vec![0, 5_000_000]);
    assert_eq!(channel.balance_of(MemberId(3)), 0);
    assert_eq!(channel.funding_amount(), 5_000_000);
}

#[test]
fn test_min_on_chain_bytes() {
    let channel = setup_two_member_channel();
    // 10 fixed + 180 input + 2 members * (73 signature + 34 address)
    assert_eq!(channel.min_on_chain_bytes(), 404);

    let wide = HyperChannel::new(
        vec![MemberId(0), MemberId(1), MemberId(2)],
        vec![1, 2, 3],
    );
    assert_eq!(wide.min_on_chain_bytes(), 10 + 180 + 3 * 107);
}

#[test]
fn test_time_value_of_funds() {
    let channel = setup_two_member_channel();
    // 100_000_000 / 12_000_000 + 2 * 10
    assert_eq!(channel.time_value_of_funds(), 28);
}

#[test]
#[should_panic(expected = "equal in size")]
fn test_mismatched_deposits_are_fatal() {
    HyperChannel::new(vec![MemberId(0), MemberId(1)], vec![1_000_000]);
}

#[test]
#[should_panic(expected = "negative")]
fn test_negative_deposit_is_fatal() {
    HyperChannel::new(vec![MemberId(0), MemberId(1)], vec![1_000_000, -1]);
}

#[test]
#[should_panic(expected = "at least two members")]
fn test_single_member_channel_is_fatal() {
    HyperChannel::new(vec![MemberId(0)], vec![1_000_000]);
}

#[test]
#[should_panic(expected = "more than once")]
fn test_duplicate_member_is_fatal() {
    HyperChannel::new(vec![MemberId(0), MemberId(0)], vec![1, 2]);
}

#[test]
#[should_panic(expected = "not a member")]
fn test_balance_of_non_member_is_fatal() {
    setup_two_member_channel().balance_of(MemberId(9));
}
