use cell_reach::prelude::*;
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// All-pairs reference distances by Floyd-Warshall.
fn reference_distances(
    n: usize,
    graph: &AdjacencyGraph,
    weights: &StoredWeights<'_>,
) -> Vec<Vec<f64>> {
    let mut dist = vec![vec![f64::INFINITY; n]; n];
    for (i, row) in dist.iter_mut().enumerate() {
        row[i] = 0.0;
    }
    for node in 0..n {
        for edge in graph.out_edges(node) {
            let w = weights.weight(&edge);
            if w < dist[node][edge.target] {
                dist[node][edge.target] = w;
            }
        }
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let via = dist[i][k] + dist[k][j];
                if via < dist[i][j] {
                    dist[i][j] = via;
                }
            }
        }
    }
    dist
}

fn graph_from_edges(n: usize, edges: &[(usize, usize, u32)]) -> AdjacencyGraph {
    let mut graph = AdjacencyGraph::with_nodes(n);
    for &(u, v, w) in edges {
        graph.add_edge(u % n, v % n, f64::from(w));
    }
    graph
}

proptest! {
    #[test]
    fn range_dijkstra_matches_brute_force(
        n in 2usize..8,
        edges in proptest::collection::vec((0usize..8, 0usize..8, 1u32..10), 0..24),
    ) {
        let graph = graph_from_edges(n, &edges);
        let weights = graph.stored_weights();
        let reference = reference_distances(n, &graph, &weights);

        let relevant: NodeSet = (0..n).collect();
        let mut search = RangeDijkstra::new(&graph, &weights, AcceptAllEdges)
            .with_cell_nodes(&relevant);
        let max = search.calc_max_weight(0, &relevant).unwrap();

        // integer weights sum exactly in f64, so equality is exact
        let expected = reference[0]
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .fold(0.0f64, f64::max);
        prop_assert_eq!(max, expected);

        let reachable = reference[0].iter().filter(|d| d.is_finite()).count();
        prop_assert_eq!(search.found_cell_nodes(), reachable);
    }

    #[test]
    fn one_to_many_matches_brute_force(
        n in 2usize..8,
        edges in proptest::collection::vec((0usize..8, 0usize..8, 1u32..10), 0..24),
    ) {
        let graph = graph_from_edges(n, &edges);
        let weights = graph.stored_weights();
        let reference = reference_distances(n, &graph, &weights);

        let targets: Vec<NodeId> = (0..n).collect();
        let mut search = DijkstraOneToMany::new(&graph, &weights, AcceptAllEdges);
        let paths = search.calc_paths(0, &targets).unwrap();

        for target in 0..n {
            match paths.get(&target) {
                Some(entry) => prop_assert_eq!(entry.weight, reference[0][target]),
                None => prop_assert!(reference[0][target].is_infinite()),
            }
        }
    }
}

#[test]
fn visited_budget_bounds_any_search() {
    // ring with random chords, far more nodes than the budget allows
    let mut rng = SmallRng::seed_from_u64(7);
    let n = 400;
    let mut graph = AdjacencyGraph::with_nodes(n);
    for node in 0..n {
        graph.add_bidirectional_edge(node, (node + 1) % n, 1.0);
    }
    for _ in 0..200 {
        let a = rng.gen_range(0..n);
        let b = rng.gen_range(0..n);
        graph.add_edge(a, b, f64::from(rng.gen_range(1u32..5)));
    }
    let weights = graph.stored_weights();
    let relevant: NodeSet = (0..n).collect();

    for budget in [1usize, 10, 57, 399] {
        let mut search = RangeDijkstra::new(&graph, &weights, AcceptAllEdges)
            .with_cell_nodes(&relevant)
            .with_max_visited(budget);
        search.calc_max_weight(0, &relevant).unwrap();
        assert!(
            search.visited_nodes() <= budget,
            "budget {budget} exceeded: {}",
            search.visited_nodes()
        );
    }

    let mut search = DijkstraOneToMany::new(&graph, &weights, AcceptAllEdges).with_max_visited(25);
    search.calc_paths(0, &[n - 1]).unwrap();
    assert!(search.visited_nodes() <= 25);
}
