use super::*;

fn graph(host: &mut CpuFilterHost, children: &[CpuFilterNode]) -> CpuFilterNode {
    let root = host.create_node(FilterPrimitive::Filter).unwrap();
    for c in children {
        host.append_child(&root, c).unwrap();
    }
    root
}

#[test]
fn flood_color_is_premultiplied() {
    assert_eq!(parse_rgba_hex("#ff000080").unwrap(), [128, 0, 0, 128]);
    assert!(parse_rgba_hex("ff000080").is_err());
    assert!(parse_rgba_hex("#ff0000").is_err());
    assert!(parse_rgba_hex("#gg000000").is_err());
}

#[test]
fn leaf_primitives_reject_children() {
    let mut host = CpuFilterHost::new();
    let blur = host.create_node(FilterPrimitive::GaussianBlur).unwrap();
    let offset = host.create_node(FilterPrimitive::Offset).unwrap();
    assert!(host.append_child(&blur, &offset).is_err());
    assert_eq!(host.created_nodes(), 2);
}

#[test]
fn empty_graph_passes_source_through() {
    let mut host = CpuFilterHost::new();
    let root = graph(&mut host, &[]);
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(evaluate(&root, &src, 2, 1).unwrap(), src);
}

#[test]
fn offset_moves_pixels_and_clips() {
    let mut host = CpuFilterHost::new();
    let offset = host.create_node(FilterPrimitive::Offset).unwrap();
    host.set_attribute(&offset, FilterAttribute::Offset { dx: 1.0, dy: 0.0 })
        .unwrap();
    let root = graph(&mut host, &[offset]);

    let src = vec![10, 10, 10, 255, 20, 20, 20, 255];
    let out = evaluate(&root, &src, 2, 1).unwrap();
    assert_eq!(out, vec![0, 0, 0, 0, 10, 10, 10, 255]);
}

#[test]
fn flood_in_source_alpha_tints_the_shape() {
    let mut host = CpuFilterHost::new();
    let flood = host.create_node(FilterPrimitive::Flood).unwrap();
    host.set_attribute(&flood, FilterAttribute::FloodColor("#0000ffff".into()))
        .unwrap();
    host.set_attribute(&flood, FilterAttribute::Result("flood"))
        .unwrap();
    let comp = host.create_node(FilterPrimitive::Composite).unwrap();
    host.set_attribute(&comp, FilterAttribute::Input(FilterInput::Result("flood")))
        .unwrap();
    host.set_attribute(&comp, FilterAttribute::Input2(FilterInput::SourceAlpha))
        .unwrap();
    host.set_attribute(&comp, FilterAttribute::Operator(FilterOperator::In))
        .unwrap();
    let root = graph(&mut host, &[flood, comp]);

    let src = vec![255, 0, 0, 255, 0, 0, 0, 0];
    let out = evaluate(&root, &src, 2, 1).unwrap();
    assert_eq!(out, vec![0, 0, 255, 255, 0, 0, 0, 0]);
}

#[test]
fn merge_layers_in_order() {
    let mut host = CpuFilterHost::new();
    let flood = host.create_node(FilterPrimitive::Flood).unwrap();
    host.set_attribute(&flood, FilterAttribute::FloodColor("#00ff00ff".into()))
        .unwrap();
    host.set_attribute(&flood, FilterAttribute::Result("bg"))
        .unwrap();
    let merge = host.create_node(FilterPrimitive::Merge).unwrap();
    for input in [FilterInput::Result("bg"), FilterInput::SourceGraphic] {
        let n = host.create_node(FilterPrimitive::MergeNode).unwrap();
        host.set_attribute(&n, FilterAttribute::Input(input)).unwrap();
        host.append_child(&merge, &n).unwrap();
    }
    let root = graph(&mut host, &[flood, merge]);

    let src = vec![255, 0, 0, 255, 0, 0, 0, 0];
    let out = evaluate(&root, &src, 2, 1).unwrap();
    assert_eq!(out, vec![255, 0, 0, 255, 0, 255, 0, 255]);
}

#[test]
fn color_matrix_node_applies_values() {
    let mut host = CpuFilterHost::new();
    let node = host.create_node(FilterPrimitive::ColorMatrix).unwrap();
    let swap_rb = ColorMatrix([
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);
    host.set_attribute(&node, FilterAttribute::Values(swap_rb.to_filter_values()))
        .unwrap();
    let root = graph(&mut host, &[node]);

    let out = evaluate(&root, &[200, 0, 50, 255], 1, 1).unwrap();
    assert_eq!(out, vec![50, 0, 200, 255]);
}

#[test]
fn unknown_result_reference_is_an_error() {
    let mut host = CpuFilterHost::new();
    let offset = host.create_node(FilterPrimitive::Offset).unwrap();
    host.set_attribute(&offset, FilterAttribute::Input(FilterInput::Result("missing")))
        .unwrap();
    let root = graph(&mut host, &[offset]);
    assert!(evaluate(&root, &[0, 0, 0, 0], 1, 1).is_err());
}

#[test]
fn invalid_attributes_are_rejected() {
    let mut host = CpuFilterHost::new();
    let node = host.create_node(FilterPrimitive::GaussianBlur).unwrap();
    assert!(
        host.set_attribute(&node, FilterAttribute::StdDeviation { dx: -1.0, dy: 0.0 })
            .is_err()
    );
    assert!(
        host.set_attribute(&node, FilterAttribute::Values("1 2 3".into()))
            .is_err()
    );
}
