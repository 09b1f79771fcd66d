use std::f32::consts::TAU;

use float_cmp::assert_approx_eq;

use clipgraph::{
    EditorSession,
    alignment::{GuideOrientation, GuideSource, TidyMode},
    config::AppConfig,
    cycle_layout::MIN_RADIUS,
    geometry::{Point, Size},
    graph::{Edge, Node, RelationType},
    identifier::Id,
    snapshot::GraphSnapshot,
};

const SNAPSHOT: &str = r#"{
    "nodes": [
        { "id": "A", "position": { "x": 0, "y": 0 }, "size": { "width": 100, "height": 100 } },
        { "id": "B", "position": { "x": 120, "y": 140 }, "size": { "width": 100, "height": 100 } },
        { "id": "C", "position": { "x": -120, "y": 140 }, "size": { "width": 100, "height": 100 } },
        { "id": "D", "position": { "x": 600, "y": 600 } }
    ],
    "edges": [
        { "id": "ab", "source": "A", "target": "B", "relationType": "reference" },
        { "id": "bc", "source": "B", "target": "C", "relationType": "derivation" },
        { "id": "ca", "source": "C", "target": "A" },
        { "id": "cd", "source": "C", "target": "D", "relationType": "continuation" },
        { "id": "dangling", "source": "D", "target": "ghost" }
    ]
}"#;

fn loaded_session() -> EditorSession {
    let (nodes, edges) = GraphSnapshot::from_json(SNAPSHOT).unwrap().into_parts();
    let mut session = EditorSession::new(&AppConfig::default());
    session.sync(nodes, edges);
    session
}

#[test]
fn test_triangle_scenario_lays_out_once_on_a_circle() {
    let mut session = loaded_session();

    assert_eq!(session.cycles().len(), 1);
    let cycle = session.cycles()[0].clone();
    assert_eq!(cycle.key().to_string(), "A|B|C");
    let centroid = cycle.center();

    let moved = session.on_animation_frame();
    assert_eq!(moved.len(), 3);
    assert_eq!(moved[0].0, Id::new("A"));

    let radius = session
        .auto_layout()
        .geometry()
        .radius(3, Size::new(100.0, 100.0));
    assert!(radius >= MIN_RADIUS);

    let mut angles = Vec::new();
    for (id, position) in &moved {
        let center = session.node(*id).unwrap().center();
        assert_eq!(session.node(*id).unwrap().position(), *position);
        assert_approx_eq!(f32, center.distance(centroid), radius, epsilon = 0.01);
        angles.push(center.angle_from(centroid));
    }
    angles.sort_by(f32::total_cmp);
    assert_approx_eq!(f32, angles[1] - angles[0], TAU / 3.0, epsilon = 0.001);
    assert_approx_eq!(f32, angles[2] - angles[1], TAU / 3.0, epsilon = 0.001);

    // A drag afterwards is never undone by another automatic pass.
    let a = Id::new("A");
    session.on_node_drag(a, Point::new(-500.0, -500.0));
    session.on_node_drag_stop(a);
    let (nodes, edges) = GraphSnapshot::from_json(SNAPSHOT).unwrap().into_parts();
    session.sync(nodes, edges);
    assert!(session.on_animation_frame().is_empty());
    assert_eq!(session.node(a).unwrap().position(), Point::new(-500.0, -500.0));
}

#[test]
fn test_relayout_restores_the_polygon() {
    let mut session = loaded_session();
    let first = session.on_animation_frame();

    let a = Id::new("A");
    session.on_node_drag(a, Point::new(-500.0, -500.0));
    session.on_node_drag_stop(a);

    let key = session.cycles()[0].key().clone();
    let again = session.relayout_cycle(&key);

    assert_eq!(again.len(), 3);
    // The centroid moved with the drag, so the polygon lands elsewhere.
    assert_ne!(again, first);
}

#[test]
fn test_broken_cycle_before_frame_is_skipped() {
    let mut session = loaded_session();
    let (nodes, mut edges) = GraphSnapshot::from_json(SNAPSHOT).unwrap().into_parts();
    edges.retain(|edge| edge.id() != Id::new("ca"));

    session.sync(nodes.clone(), edges);
    assert!(session.on_animation_frame().is_empty());
    assert_eq!(session.node(Id::new("A")).unwrap().position(), Point::new(0.0, 0.0));

    // Closing the loop again schedules a fresh layout.
    let (_, edges) = GraphSnapshot::from_json(SNAPSHOT).unwrap().into_parts();
    session.sync(nodes, edges);
    assert_eq!(session.on_animation_frame().len(), 3);
}

#[test]
fn test_lineage_over_mixed_edges() {
    let session = loaded_session();
    let names = |ids: Vec<Id>| ids.into_iter().map(|id| id.to_string()).collect::<Vec<_>>();

    assert_eq!(names(session.upstream_chain(Id::new("D"))), ["C", "B", "A"]);
    assert_eq!(names(session.downstream_chain(Id::new("D"))), Vec::<String>::new());
    assert_eq!(names(session.direct_upstream(Id::new("A"))), ["C"]);
    assert!(session.has_relation(Id::new("B"), Id::new("A")));
    assert!(!session.has_relation(Id::new("C"), Id::new("A")));

    let classified = session.classify_edges();
    assert_eq!(classified.relation_edges.len(), 3);
    assert_eq!(classified.plain_edges.len(), 2);
}

#[test]
fn test_relations_only_lineage_from_config() {
    let config: AppConfig = toml::from_str("[lineage]\ntraversal = \"relations_only\"").unwrap();
    let (nodes, edges) = GraphSnapshot::from_json(SNAPSHOT).unwrap().into_parts();
    let mut session = EditorSession::new(&config);
    session.sync(nodes, edges);

    let upstream: Vec<Id> = session.upstream_chain(Id::new("A"));
    assert!(upstream.is_empty());

    session.set_relations([Edge::new("ca-rel", "C", "A").with_relation(RelationType::Transition)]);
    assert_eq!(session.upstream_chain(Id::new("A")), vec![Id::new("C")]);
    assert!(!session.graph().contains_edge(Id::new("ab")));
    assert!(session.graph().contains_edge(Id::new("ca")));
}

#[test]
fn test_drag_guides_snap_and_spacing() {
    let mut session = EditorSession::default();
    session.sync(
        [
            Node::new("a", Point::new(0.0, 0.0)).with_size(Size::new(50.0, 50.0)),
            Node::new("b", Point::new(100.0, 0.0)).with_size(Size::new(50.0, 50.0)),
            Node::new("c", Point::new(200.0, 0.0)).with_size(Size::new(50.0, 50.0)),
            Node::new("d", Point::new(0.0, 400.0)).with_size(Size::new(50.0, 50.0)),
        ],
        Vec::new(),
    );

    let guides = session.on_node_drag(Id::new("d"), Point::new(605.0, 3.0));

    assert!(guides.iter().any(|line| {
        line.source() == GuideSource::EqualSpacing
            && line.orientation() == GuideOrientation::Vertical
            && line.position() == 100.0
    }));
    assert!(guides.iter().any(|line| {
        line.orientation() == GuideOrientation::Horizontal
            && line.position() == 0.0
            && matches!(line.source(), GuideSource::Node(_))
    }));
    assert!(
        guides
            .iter()
            .all(|line| line.orientation() == GuideOrientation::Horizontal
                || line.source() == GuideSource::EqualSpacing)
    );
}

#[test]
fn test_grid_tidy_rows_of_three_and_two() {
    let mut session = EditorSession::default();
    session.sync(
        (0..5).map(|i| Node::new(format!("n{i}"), Point::new(i as f32 * 7.0, i as f32 * 3.0))),
        Vec::new(),
    );

    session.tidy(Some(TidyMode::Grid), Some(40.0), None);

    let mut rows: Vec<f32> = session.graph().nodes().map(|node| node.position().y()).collect();
    rows.dedup();
    assert_eq!(rows, vec![0.0, 324.0]);
    let first_row = session
        .graph()
        .nodes()
        .filter(|node| node.position().y() == 0.0)
        .count();
    assert_eq!(first_row, 3);
}

#[test]
fn test_sessions_do_not_share_state() {
    let mut first = loaded_session();
    let second = loaded_session();

    first.on_animation_frame();

    assert_eq!(first.alignment().cache().len(), 3);
    assert!(second.alignment().cache().is_empty());
    assert!(second.auto_layout().has_pending());
}
