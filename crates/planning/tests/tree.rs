use planning::{Region, Tree, TreeError, Vertex, VertexId};

fn v(id: u64, th: &[f64]) -> Vertex {
    Vertex::new(VertexId(id), th.to_vec())
}

fn grid_tree() -> Tree {
    let mut tree = Tree::new(2);
    let mut id = 0;
    for x in 0..4 {
        for y in 0..4 {
            tree.insert(v(id, &[f64::from(x) * 0.25, f64::from(y) * 0.25]))
                .unwrap();
            id += 1;
        }
    }
    tree
}

#[test]
fn insert_returns_sequential_keys() -> anyhow::Result<()> {
    let mut tree = Tree::new(3);
    assert_eq!(tree.insert(v(10, &[0.0, 0.0, 0.0]))?, 0);
    assert_eq!(tree.insert(v(4, &[1.0, 0.0, 0.0]))?, 1);
    assert_eq!(tree.count(), 2);
    assert_eq!(tree.get(VertexId(4)).map(|v| v.th[0]), Some(1.0));
    Ok(())
}

#[test]
fn insert_rejects_duplicates_and_wrong_dimension() {
    let mut tree = Tree::new(2);
    tree.insert(v(1, &[0.0, 0.0])).unwrap();

    assert_eq!(
        tree.insert(v(1, &[1.0, 1.0])),
        Err(TreeError::DuplicateVertex(VertexId(1)))
    );
    assert_eq!(
        tree.insert(v(2, &[1.0, 1.0, 1.0])),
        Err(TreeError::DimensionMismatch { expected: 2, got: 3 })
    );
    assert_eq!(tree.count(), 1);
}

#[test]
fn nearest_is_sorted_and_bounded() -> anyhow::Result<()> {
    let tree = grid_tree();

    for k in [0, 1, 5, 16, 40] {
        let found = tree.nearest(&[0.3, 0.6], k)?;
        assert_eq!(found.len(), k.min(tree.count()));
        assert!(found.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    let closest = tree.nearest(&[0.3, 0.6], 1)?;
    assert_eq!(closest[0].0.th, vec![0.25, 0.5]);
    Ok(())
}

#[test]
fn nearest_breaks_ties_by_insertion_order() -> anyhow::Result<()> {
    let mut tree = Tree::new(2);
    tree.insert(v(7, &[0.0, 1.0]))?;
    tree.insert(v(3, &[1.0, 0.0]))?;
    tree.insert(v(5, &[0.0, -1.0]))?;

    let ids: Vec<_> = tree
        .nearest(&[0.0, 0.0], 3)?
        .into_iter()
        .map(|(v, _)| v.id)
        .collect();
    assert_eq!(ids, vec![VertexId(7), VertexId(3), VertexId(5)]);
    Ok(())
}

#[test]
fn nearest_rejects_wrong_dimension() {
    let tree = grid_tree();
    assert!(matches!(
        tree.nearest(&[0.0], 1),
        Err(TreeError::DimensionMismatch { expected: 2, got: 1 })
    ));
}

#[test]
fn range_query_returns_vertices_in_box() -> anyhow::Result<()> {
    let tree = grid_tree();
    let region = Region::new(vec![0.2, 0.0], vec![0.5, 0.3]);

    let found: Vec<_> = tree.range_query(&region)?.into_iter().map(|v| v.th.clone()).collect();
    assert_eq!(
        found,
        vec![vec![0.25, 0.0], vec![0.25, 0.25], vec![0.5, 0.0], vec![0.5, 0.25]]
    );
    assert!(found.iter().all(|th| region.contains(th)));
    Ok(())
}

#[test]
fn edges_require_stored_endpoints() {
    let mut tree = grid_tree();
    assert_eq!(
        tree.add_edge(VertexId(0), VertexId(99), 1.0),
        Err(TreeError::DanglingEdge {
            parent: VertexId(0),
            child: VertexId(99)
        })
    );
    assert_eq!(tree.edge_count(), 0);
}

#[test]
fn neighbors_only_reference_stored_vertices() -> anyhow::Result<()> {
    let mut tree = grid_tree();
    tree.add_edge(VertexId(0), VertexId(1), 2.0)?;
    tree.add_edge(VertexId(0), VertexId(4), 3.0)?;
    tree.add_edge(VertexId(1), VertexId(5), 1.0)?;

    assert_eq!(
        tree.neighbors(VertexId(0))?,
        vec![(VertexId(1), 2.0), (VertexId(4), 3.0)]
    );
    assert!(tree.neighbors(VertexId(5))?.is_empty());
    for vertex in tree.iter() {
        for (child, _) in tree.neighbors(vertex.id)? {
            assert!(tree.contains(child));
        }
    }
    assert_eq!(
        tree.neighbors(VertexId(42)),
        Err(TreeError::UnknownVertex(VertexId(42)))
    );
    Ok(())
}

#[test]
fn remove_drops_incident_edges() -> anyhow::Result<()> {
    let mut tree = grid_tree();
    tree.add_edge(VertexId(0), VertexId(1), 2.0)?;
    tree.add_edge(VertexId(1), VertexId(2), 2.0)?;
    tree.add_edge(VertexId(3), VertexId(2), 2.0)?;

    let removed = tree.remove(VertexId(1))?;
    assert_eq!(removed.id, VertexId(1));
    assert_eq!(tree.count(), 15);
    assert_eq!(tree.edge_count(), 1);
    assert!(tree.neighbors(VertexId(0))?.is_empty());
    assert!(!tree.contains(VertexId(1)));

    let closest = tree.nearest(&[0.0, 0.25], 1)?;
    assert_ne!(closest[0].0.id, VertexId(1));
    assert_eq!(
        tree.remove(VertexId(1)).unwrap_err(),
        TreeError::UnknownVertex(VertexId(1))
    );
    Ok(())
}

#[test]
fn path_follows_parent_edges() -> anyhow::Result<()> {
    let mut tree = grid_tree();
    tree.add_edge(VertexId(0), VertexId(5), 1.0)?;
    tree.add_edge(VertexId(5), VertexId(10), 1.0)?;
    tree.add_edge(VertexId(10), VertexId(15), 1.0)?;

    assert_eq!(tree.parent_of(VertexId(10)), Some((VertexId(5), 1.0)));
    assert_eq!(tree.parent_of(VertexId(0)), None);
    assert_eq!(
        tree.path_to(VertexId(15))?,
        vec![VertexId(0), VertexId(5), VertexId(10), VertexId(15)]
    );
    assert_eq!(tree.path_to(VertexId(3))?, vec![VertexId(3)]);
    Ok(())
}

#[test]
fn parent_lookup_tracks_edge_changes() -> anyhow::Result<()> {
    let mut tree = grid_tree();
    tree.add_edge(VertexId(7), VertexId(9), 4.0)?;
    tree.add_edge(VertexId(2), VertexId(9), 3.0)?;
    tree.add_edge(VertexId(9), VertexId(12), 1.0)?;

    // lowest parent id wins when a child has several
    assert_eq!(tree.parent_of(VertexId(9)), Some((VertexId(2), 3.0)));
    tree.add_edge(VertexId(2), VertexId(9), 0.5)?;
    assert_eq!(tree.parent_of(VertexId(9)), Some((VertexId(2), 0.5)));

    tree.remove(VertexId(2))?;
    assert_eq!(tree.parent_of(VertexId(9)), Some((VertexId(7), 4.0)));
    assert_eq!(
        tree.path_to(VertexId(12))?,
        vec![VertexId(7), VertexId(9), VertexId(12)]
    );

    tree.remove(VertexId(9))?;
    assert_eq!(tree.parent_of(VertexId(12)), None);
    assert_eq!(tree.edge_count(), 0);
    Ok(())
}

#[test]
fn path_stops_on_a_parent_cycle() -> anyhow::Result<()> {
    let mut tree = grid_tree();
    tree.add_edge(VertexId(1), VertexId(2), 1.0)?;
    tree.add_edge(VertexId(2), VertexId(1), 1.0)?;

    assert_eq!(tree.path_to(VertexId(2))?, vec![VertexId(1), VertexId(2)]);
    Ok(())
}

#[test]
fn tags_are_set_in_place() -> anyhow::Result<()> {
    let mut tree = grid_tree();
    tree.set_tag(VertexId(3), true)?;
    assert!(tree.get(VertexId(3)).is_some_and(|v| v.tag));
    assert_eq!(tree.iter().filter(|v| v.tag).count(), 1);
    assert!(tree.set_tag(VertexId(77), true).is_err());
    Ok(())
}

#[test]
fn cloned_vertex_owns_its_buffers() {
    let original = Vertex::new(VertexId(1), vec![0.1, 0.2]).with_velocity(vec![0.5, 0.5]);
    let mut copy = original.clone();
    copy.th[0] = 9.0;
    copy.w.clear();

    assert_eq!(original.th, vec![0.1, 0.2]);
    assert_eq!(original.w, vec![0.5, 0.5]);
    assert_eq!(original.tau, vec![0.0, 0.0]);
}
