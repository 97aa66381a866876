//! Uniform-cost search over an implicit graph. The graph is never materialised: every expanded
//! node is handed to an adjacency closure which yields `(edge cost, neighbour)` pairs, so the same
//! engine works for any adjacency rule. The adjacency closure may fail, in which case the error is
//! returned as-is and the search is abandoned.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use log::debug;
use num_traits::Zero;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

pub type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

struct SmallestCostHolder<C> {
    cost: C,
    index: usize,
}

impl<C: PartialOrd> Eq for SmallestCostHolder<C> {}

impl<C: PartialOrd> PartialEq for SmallestCostHolder<C> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: PartialOrd> PartialOrd for SmallestCostHolder<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: PartialOrd> Ord for SmallestCostHolder<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so that the max-heap pops the cheapest entry first. Costs that cannot be
        // compared (NaN) are treated as equal rather than poisoning the heap.
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

fn reverse_path<N, V, F>(parents: &FxIndexMap<N, V>, mut parent: F, start: usize) -> Vec<N>
where
    N: Eq + Hash + Clone,
    F: FnMut(&V) -> usize,
{
    let mut path: Vec<N> = itertools::unfold(start, |i| {
        parents.get_index(*i).map(|(node, value)| {
            *i = parent(value);
            node.clone()
        })
    })
    .collect();
    path.reverse();
    path
}

/// Computes a minimal cost path from `start` to `destination`, returning the path (both ends
/// included) together with its cost.
///
/// `adjacency` is queried lazily with the `graph` and each expanded node. Returns `Ok(None)` if
/// `destination` cannot be reached, and `Ok(Some((vec![start], 0)))` if `start == destination`.
pub fn shortest_path_with_cost<N, C, G, FN, IN, E>(
    start: &N,
    destination: &N,
    graph: &G,
    mut adjacency: FN,
) -> Result<Option<(Vec<N>, C)>, E>
where
    N: Eq + Hash + Clone,
    C: Zero + PartialOrd + Copy,
    G: ?Sized,
    FN: FnMut(&G, &N) -> Result<IN, E>,
    IN: IntoIterator<Item = (C, N)>,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        cost: C::zero(),
        index: 0,
    });
    // Tracking table: node -> (index of predecessor, best known cost). The start node has no
    // predecessor, which is encoded as usize::MAX.
    let mut parents: FxIndexMap<N, (usize, C)> = FxIndexMap::default();
    parents.insert(start.clone(), (usize::MAX, C::zero()));
    let mut expanded = 0usize;
    while let Some(SmallestCostHolder { cost, index }) = to_see.pop() {
        let neighbours = {
            let Some((node, &(_, c))) = parents.get_index(index) else {
                continue;
            };
            if node == destination {
                debug!("Destination found after expanding {} nodes", expanded);
                let path = reverse_path(&parents, |&(p, _)| p, index);
                return Ok(Some((path, cost)));
            }
            // A node is pushed again whenever a cheaper way to it is found, leaving the older
            // entry behind in the heap. Only the entry matching the tracked cost is expanded.
            if cost > c {
                continue;
            }
            expanded += 1;
            adjacency(graph, node)?
        };
        for (move_cost, neighbour) in neighbours {
            let new_cost = cost + move_cost;
            let n;
            match parents.entry(neighbour) {
                Vacant(e) => {
                    n = e.index();
                    e.insert((index, new_cost));
                }
                Occupied(mut e) => {
                    if new_cost < e.get().1 {
                        n = e.index();
                        e.insert((index, new_cost));
                    } else {
                        continue;
                    }
                }
            }
            to_see.push(SmallestCostHolder {
                cost: new_cost,
                index: n,
            });
        }
    }
    debug!("No path after expanding {} nodes", expanded);
    Ok(None)
}

/// Computes a minimal cost path from `start` to `destination`. See
/// [shortest_path_with_cost] for the meaning of the arguments.
pub fn shortest_path<N, C, G, FN, IN, E>(
    start: &N,
    destination: &N,
    graph: &G,
    adjacency: FN,
) -> Result<Option<Vec<N>>, E>
where
    N: Eq + Hash + Clone,
    C: Zero + PartialOrd + Copy,
    G: ?Sized,
    FN: FnMut(&G, &N) -> Result<IN, E>,
    IN: IntoIterator<Item = (C, N)>,
{
    shortest_path_with_cost(start, destination, graph, adjacency).map(|r| r.map(|(p, _c)| p))
}

/// Computes the minimal cost from `start` to every node reachable from it. The result always
/// contains `start` itself with cost zero; unreachable nodes are simply absent.
pub fn shortest_path_costs<N, C, G, FN, IN, E>(
    start: &N,
    graph: &G,
    mut adjacency: FN,
) -> Result<FxIndexMap<N, C>, E>
where
    N: Eq + Hash + Clone,
    C: Zero + PartialOrd + Copy,
    G: ?Sized,
    FN: FnMut(&G, &N) -> Result<IN, E>,
    IN: IntoIterator<Item = (C, N)>,
{
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        cost: C::zero(),
        index: 0,
    });
    let mut costs: FxIndexMap<N, C> = FxIndexMap::default();
    costs.insert(start.clone(), C::zero());
    while let Some(SmallestCostHolder { cost, index }) = to_see.pop() {
        let neighbours = {
            let Some((node, &c)) = costs.get_index(index) else {
                continue;
            };
            if cost > c {
                continue;
            }
            adjacency(graph, node)?
        };
        for (move_cost, neighbour) in neighbours {
            let new_cost = cost + move_cost;
            let n;
            match costs.entry(neighbour) {
                Vacant(e) => {
                    n = e.index();
                    e.insert(new_cost);
                }
                Occupied(mut e) => {
                    if new_cost < *e.get() {
                        n = e.index();
                        e.insert(new_cost);
                    } else {
                        continue;
                    }
                }
            }
            to_see.push(SmallestCostHolder {
                cost: new_cost,
                index: n,
            });
        }
    }
    debug!("Computed costs to {} nodes", costs.len());
    Ok(costs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    /// Directed test graph given as an adjacency list of `(cost, target)` per node.
    fn edges(graph: &[Vec<(u32, usize)>], node: &usize) -> Result<Vec<(u32, usize)>, Infallible> {
        Ok(graph[*node].clone())
    }

    fn diamond() -> Vec<Vec<(u32, usize)>> {
        //   1 --1-- 3
        //  /1      /1
        // 0 --5-- 2 --1-- 4
        vec![
            vec![(1, 1), (5, 2)],
            vec![(1, 0), (1, 3)],
            vec![(5, 0), (1, 3), (1, 4)],
            vec![(1, 1), (1, 2)],
            vec![(1, 2)],
        ]
    }

    #[test]
    fn equal_start_goal() {
        let graph = diamond();
        let result = shortest_path_with_cost(&2, &2, &graph[..], edges).unwrap();
        assert_eq!(result, Some((vec![2], 0)));
    }

    /// The direct but expensive edge 0-2 is discovered first and must be replaced by the cheaper
    /// detour through 1 and 3.
    #[test]
    fn cheaper_rediscovery_wins() {
        let graph = diamond();
        let (path, cost) = shortest_path_with_cost(&0, &4, &graph[..], edges)
            .unwrap()
            .unwrap();
        assert_eq!(path, vec![0, 1, 3, 2, 4]);
        assert_eq!(cost, 4);
    }

    #[test]
    fn unreachable_destination() {
        let mut graph = diamond();
        graph.push(vec![(1, 0)]);
        // Node 5 has an outgoing edge but nothing leads into it
        assert_eq!(shortest_path(&0, &5, &graph[..], edges).unwrap(), None);
    }

    #[test]
    fn costs_to_all_nodes() {
        let mut graph = diamond();
        graph.push(vec![]);
        let costs = shortest_path_costs(&0, &graph[..], edges).unwrap();
        assert_eq!(costs.len(), 5);
        assert_eq!(costs[&0], 0);
        assert_eq!(costs[&1], 1);
        assert_eq!(costs[&3], 2);
        assert_eq!(costs[&2], 3);
        assert_eq!(costs[&4], 4);
        assert!(!costs.contains_key(&5));
    }

    #[test]
    fn costs_match_single_destination_searches() {
        let graph = diamond();
        let costs = shortest_path_costs(&4, &graph[..], edges).unwrap();
        for (node, cost) in &costs {
            let (_, path_cost) = shortest_path_with_cost(&4, node, &graph[..], edges)
                .unwrap()
                .unwrap();
            assert_eq!(*cost, path_cost);
        }
    }

    #[test]
    fn float_costs() {
        let graph: Vec<Vec<(f64, usize)>> =
            vec![vec![(0.5, 1), (2.0, 2)], vec![(0.25, 2)], vec![]];
        let (path, cost) =
            shortest_path_with_cost(&0, &2, &graph[..], |g: &[Vec<(f64, usize)>], n: &usize| {
                Ok::<_, Infallible>(g[*n].clone())
            })
        .unwrap()
        .unwrap();
        assert_eq!(path, vec![0, 1, 2]);
        assert!((cost - 0.75).abs() < 1e-12);
    }

    #[test]
    fn adjacency_errors_are_propagated() {
        let graph = diamond();
        let result = shortest_path(&0, &4, &graph[..], |g: &[Vec<(u32, usize)>], n: &usize| {
            if *n == 3 {
                Err(format!("cannot expand {n}"))
            } else {
                Ok(g[*n].clone())
            }
        });
        assert_eq!(result, Err("cannot expand 3".to_owned()));
        let costs = shortest_path_costs(&0, &graph[..], |_: &[Vec<(u32, usize)>], n: &usize| {
            Err::<Vec<(u32, usize)>, _>(*n)
        });
        assert_eq!(costs, Err(0));
    }
}
