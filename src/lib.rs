pub mod activity;
pub mod annotation;
pub mod builder;
pub mod config;
pub mod connection;
pub mod display_width;
pub mod error;
pub mod flow;
pub mod layout;
pub mod model;
pub mod mutation;
pub mod raw;
pub mod tree;

#[cfg(test)]
mod testutil;

pub use config::LayoutConfig;
pub use error::{Error, Result};
pub use flow::FlowGraph;
pub use layout::NodeHeights;
pub use model::GraphModel;

/// Parses a Minerva model document and builds the full graph model:
/// nodes, edges, activities and the connections between them.
pub fn build_model(input: &str) -> Result<GraphModel> {
    let raw = raw::parse_raw_model(input)?;
    Ok(builder::build_graph_model(&raw))
}

/// Builds the model and lays out its activities for the flow renderer.
pub fn layout_model(
    input: &str,
    heights: &NodeHeights,
    config: &LayoutConfig,
) -> Result<FlowGraph> {
    let model = build_model(input)?;
    Ok(flow::layout_graph_model(&model, heights, config))
}

/// Serializes any pipeline output as JSON, optionally pretty-printed.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(Error::Serialize)
}
