//! Connected components by breadth-first search

use std::collections::VecDeque;

use crate::Graph;

/// Connected components of `graph` as induced subgraphs, ordered by their smallest local id.
///
/// Isolated vertices come out as singleton components.
pub fn connected_components(graph: &Graph) -> Vec<Graph> {
    let n = graph.order();
    let mut visited = vec![false; n];
    let mut components = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        while let Some(u) = queue.pop_front() {
            component.push(u);
            graph.traverse_incident_edges(u, |v, _| {
                if !visited[v] {
                    visited[v] = true;
                    queue.push_back(v);
                }
            });
        }

        components.push(component);
    }

    if components.len() == 1 {
        return vec![graph.clone()];
    }
    components
        .iter()
        .map(|component| graph.local_subgraph(component))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphBuilder;

    #[test]
    fn test_components_in_order() {
        let graph = GraphBuilder::new()
            .with_order(7)
            .add(5, 6, 1.0)
            .add(0, 2, 1.0)
            .add(2, 4, 1.0)
            .add(1, 3, 1.0)
            .build()
            .unwrap();
        let components = connected_components(&graph);
        let ids: Vec<&[u32]> = components.iter().map(|c| c.global_ids()).collect();
        assert_eq!(ids, vec![&[0u32, 2, 4][..], &[1u32, 3][..], &[5u32, 6][..]]);
    }

    #[test]
    fn test_connected_graph_is_one_component() {
        let graph = GraphBuilder::new().add(0, 1, 1.0).add(1, 2, 1.0).build().unwrap();
        let components = connected_components(&graph);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].order(), 3);
    }

    #[test]
    fn test_components_of_subgraph() {
        let graph = GraphBuilder::new().add(0, 1, 1.0).add(1, 2, 1.0).build().unwrap();
        let sub = graph.induced_subgraph([0, 2]);
        let components = connected_components(&sub);
        assert_eq!(components.len(), 2);
        assert_eq!(components[1].global_ids(), &[2]);
    }

    #[test]
    fn test_empty_graph_has_no_components() {
        let graph = GraphBuilder::new().build().unwrap();
        assert!(connected_components(&graph).is_empty());
    }
}
