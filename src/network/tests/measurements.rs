use crate::network::HyperNetwork;
use crate::types::MemberId;

/// Helper function to set up a network with a two-member and a three-member
/// channel: m0 - m1 - {m2, m3}.
fn setup_mixed_network() -> HyperNetwork {
    let mut network = HyperNetwork::new();
    for i in 0..4 {
        network.add_member(MemberId(i));
    }
    network.add_channel(&[MemberId(0), MemberId(1)], &[10_000_000, 20_000_000]);
    network.add_channel(
        &[MemberId(1), MemberId(2), MemberId(3)],
        &[30_000_000, 40_000_000, 50_000_000],
    );
    network
}

#[test]
fn test_channel_census() {
    let network = setup_mixed_network();

    assert_eq!(network.num_channels(), 2);
    assert_eq!(network.num_channel_memberships(), 5);
    assert_eq!(network.num_classic_channels(), 1);
    assert_eq!(network.num_proper_hyper_channels(), 1);
    assert_eq!(network.total_on_chain_bytes(), (190 + 2 * 107) + (190 + 3 * 107));
}

#[test]
fn test_wealth_and_max_receipt() {
    let network = setup_mixed_network();

    assert_eq!(network.wealth_of(MemberId(0)), 10_000_000);
    assert_eq!(network.wealth_of(MemberId(1)), 50_000_000);

    // m0 can receive its channel's funding minus its own balance.
    assert_eq!(network.max_receipt_of(MemberId(0)), 20_000_000);
    // m1 can receive over both channels: 30M - 20M and 120M - 30M.
    assert_eq!(network.max_receipt_of(MemberId(1)), 10_000_000 + 90_000_000);
}

#[test]
fn test_diameter_via_clique_expansion() {
    let network = setup_mixed_network();

    // m0 needs two hops to reach m2 or m3; the hyper channel is a clique.
    assert_eq!(network.diameter(), 2.0);
}

#[test]
fn test_diameter_of_disconnected_network() {
    let mut network = HyperNetwork::new();
    for i in 0..4 {
        network.add_member(MemberId(i));
    }
    network.add_channel(&[MemberId(0), MemberId(1)], &[1_000, 1_000]);

    assert!(network.diameter().is_infinite());
}

#[test]
fn test_stats_block_is_populated() {
    let network = setup_mixed_network();
    let stats = network.stats();

    assert!(stats.contains("Number of channels:"));
    assert!(stats.contains("Diameter:"));
    assert!(stats.contains("Proper hyper-channel proportion:"));
}

#[test]
fn test_graphml_hyperedge_form() {
    let network = setup_mixed_network();
    let graphml = network.to_graphml();

    assert!(graphml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(graphml.contains("<graph id=\"G\" edgedefault=\"undirected\">"));
    for i in 1..=4 {
        assert!(graphml.contains(&format!("<node id=\"n{}\"/>", i)));
    }
    assert_eq!(graphml.matches("<hyperedge>").count(), 2);
    assert_eq!(graphml.matches("<endpoint").count(), 5);
    assert!(graphml.ends_with("</graph>\n</graphml>\n"));

    // Endpoints follow member insertion order within the channel.
    let hyperedge_section = &graphml[graphml.find("<hyperedge>").unwrap()..];
    assert!(
        hyperedge_section.find("<endpoint node=\"n1\"/>").unwrap()
            < hyperedge_section.find("<endpoint node=\"n2\"/>").unwrap()
    );
}

#[test]
fn test_graphml_clique_form() {
    let network = setup_mixed_network();
    let graphml = network.to_graphml_cliques();

    // One pair from the classic channel, three from the triangle.
    assert_eq!(graphml.matches("<edge ").count(), 4);
    assert!(graphml.contains("<edge id=\"e1\" source=\"n1\" target=\"n2\"/>"));
    assert!(graphml.contains("<edge id=\"e2\" source=\"n2\" target=\"n3\"/>"));
    assert!(graphml.contains("<edge id=\"e3\" source=\"n2\" target=\"n4\"/>"));
    assert!(graphml.contains("<edge id=\"e4\" source=\"n3\" target=\"n4\"/>"));
    assert!(!graphml.contains("<hyperedge>"));
}

#[test]
fn test_display_lists_channels() {
    let network = setup_mixed_network();
    let rendered = network.to_string();

    assert_eq!(rendered.lines().count(), 2);
    assert!(rendered.starts_with("C1:\tM1,\tM2"));
    assert!(rendered.lines().nth(1).unwrap().starts_with("C2:\tM2,\tM3,\tM4"));
}
