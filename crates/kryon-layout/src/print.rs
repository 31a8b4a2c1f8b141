// crates/kryon-layout/src/print.rs
//! Human-readable dump of a subtree, for debugging layouts.

use std::fmt::Write;

use bitflags::bitflags;
use kryon_core::{Edge, Edges, Result, Style, Value};
use tracing::debug;

use crate::node::NodeId;
use crate::tree::LayoutTree;

bitflags! {
    /// What [`LayoutTree::print_tree`] includes for each node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PrintOptions: u8 {
        const LAYOUT = 1 << 0;
        const STYLE = 1 << 1;
        const CHILDREN = 1 << 2;
    }
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions::LAYOUT | PrintOptions::CHILDREN
    }
}

const INDENT: &str = "  ";

impl LayoutTree {
    /// Render `id` (and with [`PrintOptions::CHILDREN`], its subtree) as
    /// nested `<div>` elements.
    pub fn print_tree(&self, id: NodeId, options: PrintOptions) -> Result<String> {
        let mut output = String::new();
        self.print_node(&mut output, id, options, 0)?;
        Ok(output)
    }

    /// Emit the dump through `tracing` at debug level.
    pub fn log_tree(&self, id: NodeId, options: PrintOptions) -> Result<()> {
        let dump = self.print_tree(id, options)?;
        debug!("layout tree:\n{}", dump);
        Ok(())
    }

    fn print_node(
        &self,
        output: &mut String,
        id: NodeId,
        options: PrintOptions,
        depth: usize,
    ) -> Result<()> {
        let node = self.node(id)?;
        let indent = INDENT.repeat(depth);
        output.push_str(&indent);
        output.push_str("<div ");

        if let Some(print) = node.print.as_ref() {
            output.push_str(&print(node));
            output.push(' ');
        }

        if options.contains(PrintOptions::LAYOUT) {
            let layout = &node.layout;
            output.push_str("layout=\"");
            let _ = write!(
                output,
                "width: {}; height: {}; top: {}; left: {};",
                layout.width(),
                layout.height(),
                layout.top(),
                layout.left()
            );
            output.push_str("\" ");
        }

        if options.contains(PrintOptions::STYLE) {
            output.push_str("style=\"");
            output.push_str(&style_declarations(&node.style));
            output.push_str("\" ");
        }

        if node.has_measure_func() {
            output.push_str("has-custom-measure=\"true\"");
        }
        output.push('>');

        let children = node.children();
        if options.contains(PrintOptions::CHILDREN) && !children.is_empty() {
            output.push('\n');
            for &child in children {
                self.print_node(output, child, options, depth + 1)?;
                output.push('\n');
            }
            output.push_str(&indent);
        }
        output.push_str("</div>");
        Ok(())
    }
}

/// CSS-like declarations for every property that differs from the default style.
fn style_declarations(style: &Style) -> String {
    let defaults = Style::default();
    let mut out = String::new();

    macro_rules! keyword {
        ($field:ident, $name:literal) => {
            if style.$field != defaults.$field {
                let _ = write!(out, "{}: {}; ", $name, style.$field);
            }
        };
    }

    keyword!(direction, "direction");
    keyword!(flex_direction, "flex-direction");
    keyword!(justify_content, "justify-content");
    keyword!(align_items, "align-items");
    keyword!(align_content, "align-content");
    keyword!(align_self, "align-self");
    keyword!(flex_wrap, "flex-wrap");
    keyword!(overflow, "overflow");
    keyword!(position_type, "position");

    push_number(&mut out, "flex", style.flex);
    push_number(&mut out, "flex-grow", style.flex_grow);
    push_number(&mut out, "flex-shrink", style.flex_shrink);
    push_value(&mut out, "flex-basis", style.flex_basis);
    push_edges(&mut out, "margin", &style.margin);
    push_edges(&mut out, "padding", &style.padding);
    push_edges(&mut out, "border", &style.border);
    push_value(&mut out, "width", style.dimensions[0]);
    push_value(&mut out, "height", style.dimensions[1]);
    push_value(&mut out, "min-width", style.min_dimensions[0]);
    push_value(&mut out, "min-height", style.min_dimensions[1]);
    push_value(&mut out, "max-width", style.max_dimensions[0]);
    push_value(&mut out, "max-height", style.max_dimensions[1]);
    push_edges(&mut out, "", &style.position);
    push_number(&mut out, "aspect-ratio", style.aspect_ratio);

    out.trim_end().to_string()
}

fn push_number(out: &mut String, name: &str, value: f64) {
    if !value.is_nan() {
        let _ = write!(out, "{}: {}; ", name, value);
    }
}

fn push_value(out: &mut String, name: &str, value: Value) {
    if value.is_defined() {
        let _ = write!(out, "{}: {}; ", name, value);
    }
}

/// Collapses to the shorthand when all four physical edges agree.
fn push_edges(out: &mut String, prefix: &str, edges: &Edges) {
    const PHYSICAL: [(Edge, &str); 4] =
        [(Edge::Left, "left"), (Edge::Top, "top"), (Edge::Right, "right"), (Edge::Bottom, "bottom")];
    const LOGICAL: [(Edge, &str); 2] = [(Edge::Start, "start"), (Edge::End, "end")];

    let resolved = PHYSICAL.map(|(edge, _)| edges.computed(edge, Value::UNDEFINED).unwrap_or_default());
    let uniform = resolved.iter().all(|value| *value == resolved[0]);
    let name = |side: &str| {
        if prefix.is_empty() {
            side.to_string()
        } else {
            format!("{}-{}", prefix, side)
        }
    };

    if uniform && !prefix.is_empty() {
        push_value(out, prefix, resolved[0]);
    } else {
        for ((_, side), value) in PHYSICAL.iter().zip(resolved) {
            push_value(out, &name(side), value);
        }
    }
    for (edge, side) in LOGICAL {
        push_value(out, &name(side), edges.get(edge));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kryon_core::{Direction, FlexDirection};

    #[test]
    fn test_print_layout_and_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        tree.set_width(root, 100.0).unwrap();
        tree.set_height(root, 50.0).unwrap();
        tree.add_child(root, child).unwrap();
        tree.compute_layout(root, f64::NAN, f64::NAN, Direction::Ltr).unwrap();

        let dump = tree.print_tree(root, PrintOptions::default()).unwrap();
        assert!(dump.starts_with("<div layout=\"width: 100; height: 50; top: 0; left: 0;\" >\n"));
        assert!(dump.contains("\n  <div layout=\"width: 100; height: 0; top: 0; left: 0;\" ></div>\n"));
        assert!(dump.ends_with("</div>"));
    }

    #[test]
    fn test_print_without_children() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        let child = tree.new_node();
        tree.add_child(root, child).unwrap();

        let dump = tree.print_tree(root, PrintOptions::empty()).unwrap();
        assert_eq!(dump, "<div ></div>");
    }

    #[test]
    fn test_style_lists_only_changes() {
        let mut style = Style::default();
        assert_eq!(style_declarations(&style), "");

        style.flex_direction = FlexDirection::Row;
        style.flex_grow = 1.0;
        *style.margin.get_mut(Edge::All) = Value::pixels(4.0);
        *style.padding.get_mut(Edge::Left) = Value::percent(10.0);
        style.dimensions[0] = Value::pixels(20.0);

        let declarations = style_declarations(&style);
        assert!(declarations.contains("flex-direction: row;"));
        assert!(declarations.contains("flex-grow: 1;"));
        assert!(declarations.contains("margin: 4px;"));
        assert!(declarations.contains("padding-left: 10%;"));
        assert!(!declarations.contains("padding-top"));
        assert!(declarations.contains("width: 20px;"));
        assert!(!declarations.contains("height"));
    }

    #[test]
    fn test_print_callback_output() {
        let mut tree = LayoutTree::new();
        let root = tree.new_node();
        tree.set_print_func(root, Some(Box::new(|_| String::from("id=\"root\"")))).unwrap();
        let dump = tree.print_tree(root, PrintOptions::empty()).unwrap();
        assert_eq!(dump, "<div id=\"root\" ></div>");
    }
}
