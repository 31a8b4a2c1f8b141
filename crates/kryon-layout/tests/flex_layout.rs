// crates/kryon-layout/tests/flex_layout.rs
use glam::DVec2;
use kryon_layout::{
    Align, Direction, Edge, FlexDirection, Justify, LayoutTree, NodeId, PositionType, Wrap,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}

fn assert_frame(tree: &LayoutTree, id: NodeId, left: f64, top: f64, width: f64, height: f64) {
    let layout = tree.layout(id).unwrap();
    assert_close(layout.left(), left);
    assert_close(layout.top(), top);
    assert_close(layout.width(), width);
    assert_close(layout.height(), height);
}

fn container(tree: &mut LayoutTree, direction: FlexDirection, width: f64, height: f64) -> NodeId {
    let root = tree.new_node();
    tree.set_flex_direction(root, direction).unwrap();
    tree.set_width(root, width).unwrap();
    tree.set_height(root, height).unwrap();
    root
}

fn sized_child(tree: &mut LayoutTree, parent: NodeId, width: f64, height: f64) -> NodeId {
    let child = tree.new_node();
    tree.set_width(child, width).unwrap();
    tree.set_height(child, height).unwrap();
    tree.add_child(parent, child).unwrap();
    child
}

fn layout(tree: &mut LayoutTree, root: NodeId) {
    tree.compute_layout(root, f64::NAN, f64::NAN, Direction::Ltr).unwrap();
}

#[test]
fn test_grow_splits_space_evenly() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 300.0, 100.0);
    let children: Vec<_> = (0..3)
        .map(|_| {
            let child = tree.new_node();
            tree.set_flex_grow(child, 1.0).unwrap();
            tree.set_flex_basis(child, 0.0).unwrap();
            tree.add_child(root, child).unwrap();
            child
        })
        .collect();

    layout(&mut tree, root);

    assert_frame(&tree, root, 0.0, 0.0, 300.0, 100.0);
    for (i, &child) in children.iter().enumerate() {
        assert_frame(&tree, child, 100.0 * i as f64, 0.0, 100.0, 100.0);
    }
}

#[test]
fn test_shrink_respects_min_width() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 100.0, 50.0);
    let first = tree.new_node();
    let second = tree.new_node();
    for &child in &[first, second] {
        tree.set_flex_basis(child, 80.0).unwrap();
        tree.set_flex_shrink(child, 1.0).unwrap();
        tree.add_child(root, child).unwrap();
    }
    tree.set_min_width(first, 60.0).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, first, 0.0, 0.0, 60.0, 50.0);
    assert_frame(&tree, second, 60.0, 0.0, 40.0, 50.0);
}

#[test]
fn test_grow_refreezes_after_clamps() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 300.0, 100.0);
    let children: Vec<_> = [Some(50.0), Some(120.0), None]
        .into_iter()
        .map(|max_width| {
            let child = tree.new_node();
            tree.set_flex_grow(child, 1.0).unwrap();
            tree.set_flex_basis(child, 0.0).unwrap();
            if let Some(max_width) = max_width {
                tree.set_max_width(child, max_width).unwrap();
            }
            tree.add_child(root, child).unwrap();
            child
        })
        .collect();

    layout(&mut tree, root);

    // the second item only hits its max once the first one is frozen
    assert_frame(&tree, children[0], 0.0, 0.0, 50.0, 100.0);
    assert_frame(&tree, children[1], 50.0, 0.0, 120.0, 100.0);
    assert_frame(&tree, children[2], 170.0, 0.0, 130.0, 100.0);
}

#[test]
fn test_shrink_refreezes_after_clamps() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 100.0, 50.0);
    let children: Vec<_> = [Some(60.0), Some(30.0), None]
        .into_iter()
        .map(|min_width| {
            let child = tree.new_node();
            tree.set_flex_basis(child, 100.0).unwrap();
            tree.set_flex_shrink(child, 1.0).unwrap();
            if let Some(min_width) = min_width {
                tree.set_min_width(child, min_width).unwrap();
            }
            tree.add_child(root, child).unwrap();
            child
        })
        .collect();

    layout(&mut tree, root);

    assert_frame(&tree, children[0], 0.0, 0.0, 60.0, 50.0);
    assert_frame(&tree, children[1], 60.0, 0.0, 30.0, 50.0);
    assert_frame(&tree, children[2], 90.0, 0.0, 10.0, 50.0);
}

#[test]
fn test_flex_shorthand_grows() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 200.0);
    let fixed = sized_child(&mut tree, root, 100.0, 50.0);
    let flexible = tree.new_node();
    tree.set_flex(flexible, 1.0).unwrap();
    tree.add_child(root, flexible).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, fixed, 0.0, 0.0, 100.0, 50.0);
    assert_frame(&tree, flexible, 0.0, 50.0, 100.0, 150.0);
}

#[test]
fn test_justify_content_variants() {
    let cases = [
        (Justify::FlexStart, 0.0, 50.0),
        (Justify::Center, 100.0, 150.0),
        (Justify::FlexEnd, 200.0, 250.0),
        (Justify::SpaceBetween, 0.0, 250.0),
        (Justify::SpaceAround, 50.0, 200.0),
    ];

    for (justify, first_left, second_left) in cases {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, FlexDirection::Row, 300.0, 100.0);
        tree.set_justify_content(root, justify).unwrap();
        let first = sized_child(&mut tree, root, 50.0, 50.0);
        let second = sized_child(&mut tree, root, 50.0, 50.0);

        layout(&mut tree, root);

        assert_close(tree.layout(first).unwrap().left(), first_left);
        assert_close(tree.layout(second).unwrap().left(), second_left);
    }
}

#[test]
fn test_align_items_and_align_self() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 200.0, 200.0);
    tree.set_align_items(root, Align::Center).unwrap();
    let centered = sized_child(&mut tree, root, 50.0, 50.0);
    let end = sized_child(&mut tree, root, 50.0, 50.0);
    tree.set_align_self(end, Align::FlexEnd).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, centered, 75.0, 0.0, 50.0, 50.0);
    assert_frame(&tree, end, 150.0, 50.0, 50.0, 50.0);
}

#[test]
fn test_stretch_fills_cross_axis() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 200.0, 200.0);
    let child = tree.new_node();
    tree.set_height(child, 30.0).unwrap();
    tree.add_child(root, child).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, child, 0.0, 0.0, 200.0, 30.0);
}

#[test]
fn test_padding_margin_and_border() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 100.0);
    tree.set_padding(root, Edge::All, 10.0).unwrap();
    let child = tree.new_node();
    tree.set_flex_grow(child, 1.0).unwrap();
    tree.set_margin(child, Edge::All, 5.0).unwrap();
    tree.add_child(root, child).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, child, 15.0, 15.0, 70.0, 70.0);

    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 100.0, 100.0);
    tree.set_border(root, Edge::Left, 4.0).unwrap();
    tree.set_border(root, Edge::Top, 2.0).unwrap();
    let child = sized_child(&mut tree, root, 10.0, 10.0);

    layout(&mut tree, root);

    assert_frame(&tree, child, 4.0, 2.0, 10.0, 10.0);
}

#[test]
fn test_wrap_breaks_lines() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 100.0, 200.0);
    tree.set_flex_wrap(root, Wrap::Wrap).unwrap();
    let children: Vec<_> = (0..3).map(|_| sized_child(&mut tree, root, 40.0, 40.0)).collect();

    layout(&mut tree, root);

    assert_frame(&tree, children[0], 0.0, 0.0, 40.0, 40.0);
    assert_frame(&tree, children[1], 40.0, 0.0, 40.0, 40.0);
    assert_frame(&tree, children[2], 0.0, 40.0, 40.0, 40.0);
    assert_eq!(tree.node(children[1]).unwrap().line_index(), 0);
    assert_eq!(tree.node(children[2]).unwrap().line_index(), 1);
}

#[test]
fn test_align_content_center() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 100.0, 200.0);
    tree.set_flex_wrap(root, Wrap::Wrap).unwrap();
    tree.set_align_content(root, Align::Center).unwrap();
    let children: Vec<_> = (0..3).map(|_| sized_child(&mut tree, root, 40.0, 40.0)).collect();

    layout(&mut tree, root);

    assert_close(tree.layout(children[0]).unwrap().top(), 60.0);
    assert_close(tree.layout(children[1]).unwrap().top(), 60.0);
    assert_close(tree.layout(children[2]).unwrap().top(), 100.0);
}

#[test]
fn test_align_content_distributes_lines() {
    let cases = [
        (Align::FlexEnd, [120.0, 160.0]),
        (Align::Stretch, [0.0, 100.0]),
        (Align::SpaceBetween, [0.0, 160.0]),
        (Align::SpaceAround, [30.0, 130.0]),
    ];

    for (align, [first_line, second_line]) in cases {
        let mut tree = LayoutTree::new();
        let root = container(&mut tree, FlexDirection::Row, 100.0, 200.0);
        tree.set_flex_wrap(root, Wrap::Wrap).unwrap();
        tree.set_align_content(root, align).unwrap();
        let children: Vec<_> = (0..3).map(|_| sized_child(&mut tree, root, 40.0, 40.0)).collect();

        layout(&mut tree, root);

        assert_frame(&tree, children[0], 0.0, first_line, 40.0, 40.0);
        assert_frame(&tree, children[1], 40.0, first_line, 40.0, 40.0);
        assert_frame(&tree, children[2], 0.0, second_line, 40.0, 40.0);
    }
}

#[test]
fn test_absolute_trailing_offsets() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 100.0);
    let child = sized_child(&mut tree, root, 20.0, 20.0);
    tree.set_position_type(child, PositionType::Absolute).unwrap();
    tree.set_position(child, Edge::Right, 10.0).unwrap();
    tree.set_position(child, Edge::Bottom, 10.0).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, child, 70.0, 70.0, 20.0, 20.0);
}

#[test]
fn test_absolute_leading_offsets_and_stretch_between_insets() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 100.0);
    let pinned = sized_child(&mut tree, root, 20.0, 20.0);
    tree.set_position_type(pinned, PositionType::Absolute).unwrap();
    tree.set_position(pinned, Edge::Left, 10.0).unwrap();
    tree.set_position(pinned, Edge::Top, 5.0).unwrap();

    let spanning = tree.new_node();
    tree.set_position_type(spanning, PositionType::Absolute).unwrap();
    tree.set_position(spanning, Edge::Left, 10.0).unwrap();
    tree.set_position(spanning, Edge::Right, 10.0).unwrap();
    tree.add_child(root, spanning).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, pinned, 10.0, 5.0, 20.0, 20.0);
    assert_close(tree.layout(spanning).unwrap().left(), 10.0);
    assert_close(tree.layout(spanning).unwrap().width(), 80.0);
}

#[test]
fn test_relative_offsets() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 100.0);
    let child = tree.new_node();
    tree.set_height(child, 10.0).unwrap();
    tree.set_position(child, Edge::Left, 10.0).unwrap();
    tree.set_position(child, Edge::Top, 5.0).unwrap();
    tree.add_child(root, child).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, child, 10.0, 5.0, 100.0, 10.0);
}

#[test]
fn test_baseline_alignment() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 200.0, 100.0);
    tree.set_align_items(root, Align::Baseline).unwrap();
    let tall = sized_child(&mut tree, root, 50.0, 40.0);
    let short = sized_child(&mut tree, root, 50.0, 20.0);
    let custom = sized_child(&mut tree, root, 50.0, 20.0);
    tree.set_baseline_func(custom, Some(Box::new(|_, _, _| 5.0))).unwrap();

    layout(&mut tree, root);

    assert_close(tree.layout(tall).unwrap().top(), 0.0);
    assert_close(tree.layout(short).unwrap().top(), 20.0);
    assert_close(tree.layout(custom).unwrap().top(), 35.0);
}

#[test]
fn test_baseline_sizes_auto_height_row() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row).unwrap();
    tree.set_width(root, 200.0).unwrap();
    tree.set_align_items(root, Align::Baseline).unwrap();
    let tall = sized_child(&mut tree, root, 50.0, 40.0);
    tree.set_baseline_func(tall, Some(Box::new(|_, _, _| 30.0))).unwrap();
    let short = sized_child(&mut tree, root, 50.0, 20.0);
    tree.set_baseline_func(short, Some(Box::new(|_, _, _| 5.0))).unwrap();

    layout(&mut tree, root);

    // ascent 30 from the tall child, descent 15 from the short one
    assert_frame(&tree, tall, 0.0, 0.0, 50.0, 40.0);
    assert_frame(&tree, short, 50.0, 25.0, 50.0, 20.0);
    assert_frame(&tree, root, 0.0, 0.0, 200.0, 45.0);
}

#[test]
fn test_min_and_max_clamp() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 300.0);
    let capped = tree.new_node();
    tree.set_height(capped, 200.0).unwrap();
    tree.set_max_height(capped, 100.0).unwrap();
    tree.add_child(root, capped).unwrap();

    layout(&mut tree, root);
    assert_close(tree.layout(capped).unwrap().height(), 100.0);

    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 300.0, 50.0);
    let floored = sized_child(&mut tree, root, 50.0, 50.0);
    tree.set_min_width(floored, 100.0).unwrap();

    layout(&mut tree, root);
    assert_close(tree.layout(floored).unwrap().width(), 100.0);
}

#[test]
fn test_aspect_ratio() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 100.0, 200.0);
    let fixed_width = tree.new_node();
    tree.set_width(fixed_width, 50.0).unwrap();
    tree.set_aspect_ratio(fixed_width, 2.0).unwrap();
    tree.add_child(root, fixed_width).unwrap();
    let stretched = tree.new_node();
    tree.set_aspect_ratio(stretched, 2.0).unwrap();
    tree.add_child(root, stretched).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, fixed_width, 0.0, 0.0, 50.0, 25.0);
    assert_frame(&tree, stretched, 0.0, 25.0, 100.0, 50.0);
}

#[test]
fn test_percentages() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 200.0, 100.0);
    let child = tree.new_node();
    tree.set_width_percent(child, 50.0).unwrap();
    tree.set_height_percent(child, 50.0).unwrap();
    tree.set_padding_percent(child, Edge::Left, 10.0).unwrap();
    tree.add_child(root, child).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, child, 0.0, 0.0, 100.0, 50.0);
    assert_close(tree.layout(child).unwrap().padding(Edge::Left).unwrap(), 20.0);
}

#[test]
fn test_vertical_percentages_use_parent_height() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Column, 200.0, 100.0);
    let child = sized_child(&mut tree, root, 50.0, 30.0);
    tree.set_margin_percent(child, Edge::Top, 10.0).unwrap();
    tree.set_margin_percent(child, Edge::Left, 10.0).unwrap();
    tree.set_padding_percent(child, Edge::Top, 20.0).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, child, 20.0, 10.0, 50.0, 30.0);
    let child_layout = tree.layout(child).unwrap();
    assert_close(child_layout.margin(Edge::Top).unwrap(), 10.0);
    assert_close(child_layout.padding(Edge::Top).unwrap(), 20.0);
}

#[test]
fn test_rtl_reverses_rows_and_remaps_margins() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::Row, 300.0, 100.0);
    let first = sized_child(&mut tree, root, 50.0, 50.0);
    let second = sized_child(&mut tree, root, 50.0, 50.0);
    tree.set_margin(first, Edge::Start, 5.0).unwrap();

    tree.compute_layout(root, f64::NAN, f64::NAN, Direction::Rtl).unwrap();

    let first_layout = tree.layout(first).unwrap();
    assert_eq!(first_layout.direction(), Direction::Rtl);
    assert_close(first_layout.left(), 245.0);
    assert_close(first_layout.margin(Edge::Right).unwrap(), 5.0);
    assert_close(first_layout.margin(Edge::Left).unwrap(), 0.0);
    assert_close(tree.layout(second).unwrap().left(), 195.0);
}

#[test]
fn test_column_reverse() {
    let mut tree = LayoutTree::new();
    let root = container(&mut tree, FlexDirection::ColumnReverse, 100.0, 100.0);
    let first = sized_child(&mut tree, root, 10.0, 10.0);
    let second = sized_child(&mut tree, root, 10.0, 20.0);

    layout(&mut tree, root);

    assert_close(tree.layout(first).unwrap().top(), 90.0);
    assert_close(tree.layout(second).unwrap().top(), 70.0);
}

#[test]
fn test_measured_leaf_with_padding() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_width(root, 100.0).unwrap();
    let leaf = tree.new_node();
    tree.set_padding(leaf, Edge::All, 5.0).unwrap();
    tree.set_measure_func(leaf, Some(Box::new(|_, _, _, _, _| DVec2::new(32.0, 16.0)))).unwrap();
    tree.add_child(root, leaf).unwrap();

    layout(&mut tree, root);

    assert_frame(&tree, root, 0.0, 0.0, 100.0, 26.0);
    assert_frame(&tree, leaf, 0.0, 0.0, 100.0, 26.0);
}

#[test]
fn test_content_sized_root() {
    let mut tree = LayoutTree::new();
    let root = tree.new_node();
    tree.set_flex_direction(root, FlexDirection::Row).unwrap();
    sized_child(&mut tree, root, 30.0, 10.0);
    sized_child(&mut tree, root, 20.0, 25.0);

    layout(&mut tree, root);

    assert_frame(&tree, root, 0.0, 0.0, 50.0, 25.0);
    assert_eq!(tree.layout(root).unwrap().size(), DVec2::new(50.0, 25.0));
}
