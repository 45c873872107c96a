//! GraphML rendering of a network.

use std::fmt::Write;

use super::HyperNetwork;

const GRAPHML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
    <graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\" >\n\
    <graph id=\"G\" edgedefault=\"undirected\">\n";
const GRAPHML_FOOTER: &str = "</graph>\n</graphml>\n";

impl HyperNetwork {
    /// Renders the network as a GraphML hypergraph: one `<node>` per member
    /// and one `<hyperedge>` per channel with an `<endpoint>` per member in
    /// member insertion order.
    pub fn to_graphml(&self) -> String {
        let mut output = String::from(GRAPHML_HEADER);

        for index in 1..=self.members.len() {
            writeln!(output, "<node id=\"n{}\"/>", index).expect("writing to a string cannot fail");
        }

        for channel in &self.channels {
            output.push_str("<hyperedge>\n");
            for member in channel.members() {
                writeln!(output, "<endpoint node=\"n{}\"/>", self.member_index[member] + 1)
                    .expect("writing to a string cannot fail");
            }
            output.push_str("</hyperedge>\n");
        }

        output.push_str(GRAPHML_FOOTER);
        output
    }

    /// Renders the network as a plain GraphML graph, expanding each channel
    /// into the clique of its members: one `<edge>` per ordered member pair
    /// `(i, j)` with `i < j` in member insertion order.
    pub fn to_graphml_cliques(&self) -> String {
        let mut output = String::from(GRAPHML_HEADER);

        for index in 1..=self.members.len() {
            writeln!(output, "<node id=\"n{}\"/>", index).expect("writing to a string cannot fail");
        }

        let mut edge_counter = 0usize;
        for channel in &self.channels {
            let members = channel.members();
            for (i, source) in members.iter().enumerate() {
                for target in &members[i + 1..] {
                    edge_counter += 1;
                    writeln!(
                        output,
                        "<edge id=\"e{}\" source=\"n{}\" target=\"n{}\"/>",
                        edge_counter,
                        self.member_index[source] + 1,
                        self.member_index[target] + 1,
                    )
                    .expect("writing to a string cannot fail");
                }
            }
        }

        output.push_str(GRAPHML_FOOTER);
        output
    }
}
