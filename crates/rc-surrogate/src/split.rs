use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Seeded shuffle, then the first `fraction` of rows train and the rest validate.
pub fn split_training_validation<T: Clone>(rows: &[T], fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut idx: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);
    let n_train = ((rows.len() as f64) * fraction.clamp(0.0, 1.0)).floor() as usize;
    let training = idx[..n_train].iter().map(|&i| rows[i].clone()).collect();
    let validation = idx[n_train..].iter().map(|&i| rows[i].clone()).collect();
    (training, validation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_deterministic_and_partitions() {
        let rows: Vec<u32> = (0..50).collect();
        let (a, b) = split_training_validation(&rows, 0.8, 50);
        let (c, d) = split_training_validation(&rows, 0.8, 50);
        assert_eq!(a, c);
        assert_eq!(b, d);
        assert_eq!(a.len(), 40);
        assert_eq!(b.len(), 10);

        let mut all: Vec<u32> = a.into_iter().chain(b).collect();
        all.sort();
        assert_eq!(all, rows);
    }

    #[test]
    fn different_seeds_shuffle_differently() {
        let rows: Vec<u32> = (0..50).collect();
        let (a, _) = split_training_validation(&rows, 0.8, 1);
        let (b, _) = split_training_validation(&rows, 0.8, 2);
        assert_ne!(a, b);
    }
}
