//! Seeded, stratified train/test split.
//!
//! Each class contributes to the test partition in proportion to its size.
//! Per-class test counts are apportioned with the largest-remainder method
//! so the partition sizes add up exactly.

use crate::error::{ForgeError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Seed used when the caller does not pick one.
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Row indices of the two partitions, each in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StratifiedSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl StratifiedSplit {
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Split rows into train/test partitions stratified by `labels`.
///
/// `labels[row]` is a class code indexing `class_names`. The test partition
/// holds `ceil(test_fraction * n)` rows. Fails when a class is too small to
/// appear in both partitions.
pub fn stratified_split(
    labels: &[usize],
    class_names: &[String],
    test_fraction: f64,
    seed: u64,
) -> Result<StratifiedSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ForgeError::InvalidParameter(format!(
            "test fraction must be between 0 and 1, got {}",
            test_fraction
        )));
    }

    let n = labels.len();
    if n == 0 {
        return Err(ForgeError::InfeasibleSplit("no rows to split".to_string()));
    }

    let k = class_names.len();
    let mut counts = vec![0usize; k];
    for &label in labels {
        let slot = counts.get_mut(label).ok_or_else(|| {
            ForgeError::InvalidData(format!("label code {} has no class (only {} classes)", label, k))
        })?;
        *slot += 1;
    }

    if let Some((code, &count)) = counts.iter().enumerate().find(|(_, &c)| c < 2) {
        return Err(ForgeError::InfeasibleSplit(format!(
            "class '{}' has only {} member(s); every class needs at least 2",
            class_names[code], count
        )));
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n - n_test;
    if n_test < k || n_train < k {
        return Err(ForgeError::InfeasibleSplit(format!(
            "train size {} and test size {} must each be at least the number of classes ({})",
            n_train, n_test, k
        )));
    }

    let test_counts = apportion(&counts, n_test);
    let test_counts = ensure_both_partitions(&counts, test_counts).ok_or_else(|| {
        ForgeError::InfeasibleSplit(format!(
            "cannot place every class in both partitions at test fraction {}",
            test_fraction
        ))
    })?;

    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (row, &label) in labels.iter().enumerate() {
        by_class[label].push(row);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test = Vec::with_capacity(n_test);
    for (rows, &in_test) in by_class.iter_mut().zip(&test_counts) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..in_test]);
        train.extend_from_slice(&rows[in_test..]);
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    tracing::debug!(n_train = train.len(), n_test = test.len(), classes = k, "Stratified split");
    Ok(StratifiedSplit { train, test })
}

/// Distribute `total` draws across classes in proportion to `counts`.
///
/// Each class gets `floor(count * total / n)`, and the leftover draws go to
/// the largest fractional remainders (lowest class code on ties).
fn apportion(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    if n == 0 {
        return vec![0; counts.len()];
    }

    let mut alloc: Vec<usize> = counts.iter().map(|&c| c * total / n).collect();
    let assigned: usize = alloc.iter().sum();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = counts[a] * total % n;
        let rb = counts[b] * total % n;
        rb.cmp(&ra).then(a.cmp(&b))
    });
    for &code in order.iter().take(total - assigned) {
        alloc[code] += 1;
    }
    alloc
}

/// Move single rows between classes so every class has at least one test
/// row and one train row, keeping the total test count unchanged.
///
/// Rows are taken from the class with the most test rows to spare, and given
/// to the class with the most train rows to spare. `None` when no such class
/// exists.
fn ensure_both_partitions(counts: &[usize], mut alloc: Vec<usize>) -> Option<Vec<usize>> {
    while let Some(code) = alloc.iter().position(|&a| a == 0) {
        let donor = (0..alloc.len())
            .filter(|&c| alloc[c] > 1)
            .max_by(|&a, &b| alloc[a].cmp(&alloc[b]).then(b.cmp(&a)))?;
        alloc[donor] -= 1;
        alloc[code] += 1;
    }
    while let Some(code) = (0..alloc.len()).find(|&c| alloc[c] == counts[c]) {
        let receiver = (0..alloc.len())
            .filter(|&c| counts[c] - alloc[c] > 1)
            .max_by(|&a, &b| (counts[a] - alloc[a]).cmp(&(counts[b] - alloc[b])).then(b.cmp(&a)))?;
        alloc[code] -= 1;
        alloc[receiver] += 1;
    }
    Some(alloc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn classes(k: usize) -> Vec<String> {
        (0..k).map(|i| format!("class_{}", i)).collect()
    }

    fn three_balanced_classes() -> Vec<usize> {
        (0..150).map(|i| i / 50).collect()
    }

    #[test]
    fn test_partition_sizes() {
        let labels = three_balanced_classes();
        let split = stratified_split(&labels, &classes(3), 0.2, DEFAULT_SPLIT_SEED).unwrap();
        assert_eq!(split.n_train(), 120);
        assert_eq!(split.n_test(), 30);
    }

    #[test]
    fn test_partitions_cover_all_rows_once() {
        let labels = three_balanced_classes();
        let split = stratified_split(&labels, &classes(3), 0.25, 7).unwrap();

        let all: HashSet<usize> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), labels.len());
        assert_eq!(split.n_train() + split.n_test(), labels.len());
    }

    #[test]
    fn test_class_proportions_preserved() {
        let labels = three_balanced_classes();
        let split = stratified_split(&labels, &classes(3), 0.2, DEFAULT_SPLIT_SEED).unwrap();

        for class in 0..3 {
            let in_test = split.test.iter().filter(|&&r| labels[r] == class).count();
            assert_eq!(in_test, 10);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let labels = three_balanced_classes();
        let a = stratified_split(&labels, &classes(3), 0.2, DEFAULT_SPLIT_SEED).unwrap();
        let b = stratified_split(&labels, &classes(3), 0.2, DEFAULT_SPLIT_SEED).unwrap();
        assert_eq!(a, b);

        let c = stratified_split(&labels, &classes(3), 0.2, 1234).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_small_imbalanced_split() {
        // 3 of class 0, 2 of class 1, test fraction 0.4 -> 2 test rows, one per class
        let labels = vec![0, 1, 0, 1, 0];
        let split = stratified_split(&labels, &classes(2), 0.4, DEFAULT_SPLIT_SEED).unwrap();
        assert_eq!(split.n_test(), 2);
        assert_eq!(split.n_train(), 3);
        let test_classes: HashSet<usize> = split.test.iter().map(|&r| labels[r]).collect();
        assert_eq!(test_classes.len(), 2);
    }

    #[test]
    fn test_rare_class_gets_a_test_row() {
        let mut labels = vec![0; 100];
        labels.extend([1, 1]);
        let names = vec!["common".to_string(), "rare".to_string()];
        let split = stratified_split(&labels, &names, 0.2, DEFAULT_SPLIT_SEED).unwrap();

        // ceil(0.2 * 102) = 21
        assert_eq!(split.n_test(), 21);
        assert_eq!(split.n_train(), 81);
        let rare_test = split.test.iter().filter(|&&r| labels[r] == 1).count();
        let rare_train = split.train.iter().filter(|&&r| labels[r] == 1).count();
        assert_eq!((rare_test, rare_train), (1, 1));
    }

    #[test]
    fn test_ensure_both_partitions() {
        assert_eq!(ensure_both_partitions(&[100, 2], vec![21, 0]), Some(vec![20, 1]));
        assert_eq!(ensure_both_partitions(&[4, 2], vec![1, 2]), Some(vec![2, 1]));
        assert_eq!(ensure_both_partitions(&[3, 3], vec![3, 0]), Some(vec![2, 1]));
    }

    #[test]
    fn test_singleton_class_rejected() {
        let labels = vec![0, 0, 0, 0, 1];
        let err = stratified_split(&labels, &classes(2), 0.4, DEFAULT_SPLIT_SEED).unwrap_err();
        assert!(matches!(err, ForgeError::InfeasibleSplit(_)));
        assert!(err.to_string().contains("class_1"));
    }

    #[test]
    fn test_too_few_test_rows_rejected() {
        // 3 classes but only ceil(0.1 * 6) = 1 test row
        let labels = vec![0, 0, 1, 1, 2, 2];
        let result = stratified_split(&labels, &classes(3), 0.1, DEFAULT_SPLIT_SEED);
        assert!(matches!(result, Err(ForgeError::InfeasibleSplit(_))));
    }

    #[test]
    fn test_bad_fraction_rejected() {
        let labels = three_balanced_classes();
        for fraction in [0.0, 1.0, -0.2, f64::NAN] {
            let result = stratified_split(&labels, &classes(3), fraction, DEFAULT_SPLIT_SEED);
            assert!(matches!(result, Err(ForgeError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_apportion_largest_remainder() {
        // 3 * 2 / 5 = 1.2, 2 * 2 / 5 = 0.8 -> [1, 1]
        assert_eq!(apportion(&[3, 2], 2), vec![1, 1]);
        // Equal remainders go to the lowest class code
        assert_eq!(apportion(&[3, 3], 1), vec![1, 0]);
        assert_eq!(apportion(&[50, 50, 50], 30), vec![10, 10, 10]);
    }
}
