// src/description.rs
//! JSON description of a node tree, as read by the `kryon-flex` binary.

use std::collections::HashMap;

use anyhow::{Context, Result};
use glam::DVec2;
use kryon_core::{
    Align, Direction, Edge, Edges, FlexDirection, Justify, MeasureMode, Overflow, PositionType,
    Style, Value, Wrap,
};
use kryon_layout::{LayoutTree, Node, NodeId};
use serde::Deserialize;

/// Advance of one character of sample text.
pub const CHAR_WIDTH: f64 = 8.0;
pub const LINE_HEIGHT: f64 = 16.0;

/// A length given either as a bare number of pixels or as a string such as
/// `"50%"`, `"12px"` or `"auto"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Number(f64),
    Text(String),
}

impl Length {
    fn to_value(&self) -> Result<Value> {
        match self {
            Length::Number(pixels) => Ok(Value::pixels(*pixels)),
            Length::Text(text) => text
                .parse::<Value>()
                .with_context(|| format!("Invalid length: {text:?}")),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StyleDescription {
    direction: Option<Direction>,
    flex_direction: Option<FlexDirection>,
    justify_content: Option<Justify>,
    align_content: Option<Align>,
    align_items: Option<Align>,
    align_self: Option<Align>,
    position_type: Option<PositionType>,
    flex_wrap: Option<Wrap>,
    overflow: Option<Overflow>,
    flex: Option<f64>,
    flex_grow: Option<f64>,
    flex_shrink: Option<f64>,
    flex_basis: Option<Length>,
    aspect_ratio: Option<f64>,
    width: Option<Length>,
    height: Option<Length>,
    min_width: Option<Length>,
    min_height: Option<Length>,
    max_width: Option<Length>,
    max_height: Option<Length>,
    #[serde(default)]
    margin: HashMap<Edge, Length>,
    #[serde(default)]
    padding: HashMap<Edge, Length>,
    #[serde(default)]
    border: HashMap<Edge, Length>,
    #[serde(default)]
    position: HashMap<Edge, Length>,
}

impl StyleDescription {
    pub fn to_style(&self) -> Result<Style> {
        let mut style = Style::default();

        macro_rules! keyword {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    style.$field = value;
                })*
            };
        }
        keyword!(
            direction,
            flex_direction,
            justify_content,
            align_content,
            align_items,
            align_self,
            position_type,
            flex_wrap,
            overflow,
            flex,
            flex_grow,
            flex_shrink,
            aspect_ratio
        );

        set_length(&self.flex_basis, &mut style.flex_basis)?;
        set_length(&self.width, &mut style.dimensions[0])?;
        set_length(&self.height, &mut style.dimensions[1])?;
        set_length(&self.min_width, &mut style.min_dimensions[0])?;
        set_length(&self.min_height, &mut style.min_dimensions[1])?;
        set_length(&self.max_width, &mut style.max_dimensions[0])?;
        set_length(&self.max_height, &mut style.max_dimensions[1])?;

        apply_edges(&self.margin, &mut style.margin).context("Invalid margin")?;
        apply_edges(&self.padding, &mut style.padding).context("Invalid padding")?;
        apply_edges(&self.border, &mut style.border).context("Invalid border")?;
        apply_edges(&self.position, &mut style.position).context("Invalid position")?;

        Ok(style)
    }
}

fn set_length(length: &Option<Length>, slot: &mut Value) -> Result<()> {
    if let Some(length) = length {
        *slot = length.to_value()?;
    }
    Ok(())
}

fn apply_edges(source: &HashMap<Edge, Length>, edges: &mut Edges) -> Result<()> {
    for (edge, length) in source {
        *edges.get_mut(*edge) = length.to_value()?;
    }
    Ok(())
}

/// One node of the description. A node either has children or is a leaf
/// sized by `text` or a fixed `content` size.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDescription {
    /// Label shown in the dump.
    pub id: Option<String>,
    #[serde(default)]
    pub style: StyleDescription,
    pub text: Option<String>,
    pub content: Option<[f64; 2]>,
    /// Fixed baseline offset from the top of the node.
    pub baseline: Option<f64>,
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    /// Create the node and its subtree in `tree`, returning the root handle.
    pub fn build(&self, tree: &mut LayoutTree) -> Result<NodeId> {
        let label = self.id.as_deref().unwrap_or("<anonymous>");
        let style = self
            .style
            .to_style()
            .with_context(|| format!("Invalid style on node {label}"))?;
        let id = tree.new_node_with_style(style);

        if let Some(name) = &self.id {
            tree.set_context(id, name.clone())?;
            tree.set_print_func(
                id,
                Some(Box::new(|node: &Node| {
                    let name = node.context::<String>().map(String::as_str).unwrap_or_default();
                    format!("id=\"{name}\"")
                })),
            )?;
        }

        if let Some(text) = &self.text {
            let text = text.clone();
            tree.set_measure_func(
                id,
                Some(Box::new(move |_, width, width_mode, _, _| {
                    measure_text(&text, width, width_mode)
                })),
            )?;
        } else if let Some([width, height]) = self.content {
            tree.set_measure_func(id, Some(Box::new(move |_, _, _, _, _| DVec2::new(width, height))))?;
        }

        if let Some(baseline) = self.baseline {
            tree.set_baseline_func(id, Some(Box::new(move |_, _, _| baseline)))?;
        }

        for child in &self.children {
            let child_id = child.build(tree)?;
            tree.add_child(id, child_id)
                .with_context(|| format!("Cannot add child to node {label}"))?;
        }

        Ok(id)
    }
}

/// Monospace text that wraps at the available width.
pub fn measure_text(text: &str, width: f64, width_mode: MeasureMode) -> DVec2 {
    let chars = text.chars().count() as f64;
    let natural = chars * CHAR_WIDTH;
    let line_width = match width_mode {
        MeasureMode::Undefined => natural,
        MeasureMode::Exactly => width,
        MeasureMode::AtMost => natural.min(width),
    };

    let per_line = (line_width / CHAR_WIDTH).floor().max(1.0);
    let lines = (chars / per_line).ceil().max(1.0);
    DVec2::new(line_width, lines * LINE_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kryon_core::Unit;

    #[test]
    fn test_measure_text_wraps() {
        let size = measure_text("hello world", f64::NAN, MeasureMode::Undefined);
        assert_eq!(size, DVec2::new(88.0, 16.0));

        let size = measure_text("hello world", 40.0, MeasureMode::AtMost);
        assert_eq!(size, DVec2::new(40.0, 48.0));
    }

    #[test]
    fn test_style_parsing() {
        let json = r#"{
            "flex-direction": "row",
            "justify-content": "space-between",
            "width": 300,
            "height": "50%",
            "margin": { "all": 4, "left": "10%" },
            "flex-grow": 1
        }"#;
        let description: StyleDescription = serde_json::from_str(json).unwrap();
        let style = description.to_style().unwrap();

        assert_eq!(style.flex_direction, FlexDirection::Row);
        assert_eq!(style.justify_content, Justify::SpaceBetween);
        assert_eq!(style.dimensions[0], Value::pixels(300.0));
        assert_eq!(style.dimensions[1].unit, Unit::Percent);
        assert_eq!(style.margin.get(Edge::All), Value::pixels(4.0));
        assert_eq!(style.margin.get(Edge::Left), Value::percent(10.0));
        assert_eq!(style.flex_grow, 1.0);
    }

    #[test]
    fn test_invalid_length_is_reported() {
        let description: StyleDescription = serde_json::from_str(r#"{ "width": "wide" }"#).unwrap();
        assert!(description.to_style().is_err());
    }

    #[test]
    fn test_build_and_layout() {
        let json = r#"{
            "id": "root",
            "style": { "flex-direction": "row", "width": 200, "height": 100 },
            "children": [
                { "id": "label", "text": "abcd" },
                { "style": { "flex-grow": 1 } }
            ]
        }"#;
        let description: NodeDescription = serde_json::from_str(json).unwrap();
        let mut tree = LayoutTree::new();
        let root = description.build(&mut tree).unwrap();
        tree.compute_layout(root, f64::NAN, f64::NAN, Direction::Ltr).unwrap();

        let children = tree.children(root).unwrap().to_vec();
        assert_eq!(tree.layout(children[0]).unwrap().width(), 32.0);
        assert_eq!(tree.layout(children[1]).unwrap().left(), 32.0);
        assert_eq!(tree.layout(children[1]).unwrap().width(), 168.0);
        assert_eq!(tree.context::<String>(root).unwrap().map(String::as_str), Some("root"));
    }

    #[test]
    fn test_leaf_with_children_rejected() {
        let json = r#"{ "text": "x", "children": [ {} ] }"#;
        let description: NodeDescription = serde_json::from_str(json).unwrap();
        let mut tree = LayoutTree::new();
        assert!(description.build(&mut tree).is_err());
    }
}
