/// Average-linkage agglomerative clustering over a dense distance matrix.
///
/// Repeatedly merges the closest pair of clusters until `clusters`
/// remain. Cluster distance is the mean over all cross pairs of the
/// original matrix, maintained incrementally with size-weighted updates.
/// Ties resolve to the lowest pair in the current scan order, so the
/// outcome is deterministic.
///
/// Returns one label per cell, numbered by first cell appearance: the
/// cluster holding cell 0 is label 0.
pub(crate) fn average_linkage_labels(distance: Vec<Vec<f64>>, clusters: usize) -> Vec<usize> {
    let cells = distance.len();
    debug_assert!(clusters >= 1);
    debug_assert!(distance.iter().all(|row| row.len() == cells));

    let mut groups: Vec<Vec<usize>> = (0..cells).map(|cell| vec![cell]).collect();
    let mut dist = distance;

    while groups.len() > clusters {
        let mut best = (0, 1);
        let mut best_distance = f64::INFINITY;
        for i in 0..groups.len() {
            for j in i + 1..groups.len() {
                if dist[i][j] < best_distance {
                    best_distance = dist[i][j];
                    best = (i, j);
                }
            }
        }
        let (i, j) = best;

        // Weighting by member count keeps every entry the mean over the
        // cross pairs of the original matrix.
        let size_i = groups[i].len() as f64;
        let size_j = groups[j].len() as f64;
        for k in 0..groups.len() {
            if k == i || k == j {
                continue;
            }
            let merged = (size_i * dist[i][k] + size_j * dist[j][k]) / (size_i + size_j);
            dist[i][k] = merged;
            dist[k][i] = merged;
        }

        let absorbed = groups.remove(j);
        groups[i].extend(absorbed);
        dist.remove(j);
        for row in &mut dist {
            row.remove(j);
        }
    }

    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by_key(|&group| groups[group].iter().min().copied().unwrap_or(usize::MAX));

    let mut labels = vec![0; cells];
    for (label, &group) in order.iter().enumerate() {
        for &cell in &groups[group] {
            labels[cell] = label;
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(cells: usize, pairs: &[(usize, usize, f64)]) -> Vec<Vec<f64>> {
        let mut matrix = vec![vec![0.0; cells]; cells];
        for &(a, b, d) in pairs {
            matrix[a][b] = d;
            matrix[b][a] = d;
        }
        matrix
    }

    #[test]
    fn two_tight_pairs_split_cleanly() {
        let distance = matrix(
            4,
            &[
                (0, 1, 0.1),
                (2, 3, 0.1),
                (0, 2, 2.0),
                (0, 3, 2.0),
                (1, 2, 2.0),
                (1, 3, 2.0),
            ],
        );
        assert_eq!(average_linkage_labels(distance, 2), vec![0, 0, 1, 1]);
    }

    #[test]
    fn labels_follow_first_cell_appearance() {
        // Interleaved membership: cell 0's cluster is label 0 even though
        // its partner is cell 2.
        let distance = matrix(
            4,
            &[
                (0, 2, 0.1),
                (1, 3, 0.1),
                (0, 1, 1.0),
                (0, 3, 1.0),
                (1, 2, 1.0),
                (2, 3, 1.0),
            ],
        );
        assert_eq!(average_linkage_labels(distance, 2), vec![0, 1, 0, 1]);
    }

    #[test]
    fn linkage_weights_clusters_by_member_count() {
        // After {0,1} absorbs 2, the distance to 3 is the mean over the
        // three cross pairs, (0.31 + 0.31 + 0.32) / 3 ~ 0.3133, which
        // undercuts d(3,4) = 0.314. An unweighted average of the cluster
        // distances, (0.31 + 0.32) / 2 = 0.315, would lose that race and
        // pair 3 with 4 instead.
        let distance = matrix(
            5,
            &[
                (0, 1, 0.1),
                (0, 2, 0.3),
                (1, 2, 0.3),
                (0, 3, 0.31),
                (1, 3, 0.31),
                (2, 3, 0.32),
                (3, 4, 0.314),
                (0, 4, 0.9),
                (1, 4, 0.9),
                (2, 4, 0.9),
            ],
        );
        assert_eq!(average_linkage_labels(distance, 2), vec![0, 0, 0, 0, 1]);
    }

    #[test]
    fn equal_distances_merge_the_lowest_pair_first() {
        let distance = matrix(3, &[(0, 1, 0.5), (0, 2, 0.5), (1, 2, 0.5)]);
        assert_eq!(average_linkage_labels(distance, 2), vec![0, 0, 1]);
    }

    #[test]
    fn one_cluster_swallows_everything() {
        let distance = matrix(3, &[(0, 1, 0.2), (0, 2, 0.9), (1, 2, 0.4)]);
        assert_eq!(average_linkage_labels(distance, 1), vec![0, 0, 0]);
    }

    #[test]
    fn as_many_clusters_as_cells_is_the_identity() {
        let distance = matrix(4, &[(0, 1, 0.2), (2, 3, 0.3)]);
        assert_eq!(average_linkage_labels(distance, 4), vec![0, 1, 2, 3]);
    }
}
