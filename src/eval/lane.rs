//! Intermediate columns of the evaluation.

/// The values of one node over a chunk of the domain. Constants stay
/// `Splat` until they meet a `t`-dependent operand, so literals never
/// allocate.
#[derive(Debug, Clone, PartialEq)]
pub enum Lane<T> {
    Splat(T),
    Each(Vec<T>),
}

impl<T: Copy> Lane<T> {
    pub fn map<R>(self, f: impl Fn(T) -> R) -> Lane<R> {
        match self {
            Lane::Splat(x) => Lane::Splat(f(x)),
            Lane::Each(xs) => Lane::Each(xs.into_iter().map(f).collect()),
        }
    }

    /// Elementwise combination; a `Splat` broadcasts against an `Each`.
    pub fn zip_with<U: Copy, R>(&self, other: &Lane<U>, f: impl Fn(T, U) -> R) -> Lane<R> {
        match (self, other) {
            (Lane::Splat(a), Lane::Splat(b)) => Lane::Splat(f(*a, *b)),
            (Lane::Splat(a), Lane::Each(bs)) => Lane::Each(bs.iter().map(|&b| f(*a, b)).collect()),
            (Lane::Each(xs), Lane::Splat(b)) => Lane::Each(xs.iter().map(|&a| f(a, *b)).collect()),
            (Lane::Each(xs), Lane::Each(bs)) => {
                Lane::Each(xs.iter().zip(bs).map(|(&a, &b)| f(a, b)).collect())
            }
        }
    }

    /// Index of the first element matching `pred`. A matching `Splat`
    /// matches at every index, so it reports 0.
    pub fn position(&self, pred: impl Fn(T) -> bool) -> Option<usize> {
        match self {
            Lane::Splat(x) => pred(*x).then_some(0),
            Lane::Each(xs) => xs.iter().position(|&x| pred(x)),
        }
    }

    /// Materialize to exactly `len` elements. `None` if an `Each` lane has
    /// a different length.
    pub fn into_vec(self, len: usize) -> Option<Vec<T>> {
        match self {
            Lane::Splat(x) => Some(vec![x; len]),
            Lane::Each(xs) if xs.len() == len => Some(xs),
            Lane::Each(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splat_stays_splat() {
        let a = Lane::Splat(3u32);
        let b = Lane::Splat(4u32);
        assert_eq!(a.zip_with(&b, |x, y| x * y), Lane::Splat(12));
        assert_eq!(a.map(|x| x + 1), Lane::Splat(4));
    }

    #[test]
    fn splat_broadcasts_against_each() {
        let a = Lane::Each(vec![1u32, 2, 3]);
        let b = Lane::Splat(10u32);
        assert_eq!(a.zip_with(&b, |x, y| x + y), Lane::Each(vec![11, 12, 13]));
        assert_eq!(b.zip_with(&a, |x, y| x - y), Lane::Each(vec![9, 8, 7]));
    }

    #[test]
    fn each_zips_pairwise() {
        let a = Lane::Each(vec![1.0f64, 2.0]);
        let b = Lane::Each(vec![0.5f64, 0.25]);
        assert_eq!(a.zip_with(&b, |x, y| x * y), Lane::Each(vec![0.5, 0.5]));
    }

    #[test]
    fn position_finds_first_match() {
        assert_eq!(Lane::Each(vec![3u32, 0, 0]).position(|x| x == 0), Some(1));
        assert_eq!(Lane::Splat(0u32).position(|x| x == 0), Some(0));
        assert_eq!(Lane::Splat(1u32).position(|x| x == 0), None);
    }

    #[test]
    fn into_vec_broadcasts_and_checks_length() {
        assert_eq!(Lane::Splat(7u32).into_vec(3), Some(vec![7, 7, 7]));
        assert_eq!(Lane::Each(vec![1u32, 2]).into_vec(2), Some(vec![1, 2]));
        assert_eq!(Lane::Each(vec![1u32, 2]).into_vec(3), None);
    }
}
