//! Sequential host kernels.
//!
//! Single-threaded loops over plain slices, used as correctness oracles for
//! tiled launches and for the scan/reduce shapes that have no tiled form.

/// `out[i] = f(x[i])`.
pub fn map<I, O, F>(input: &[I], f: F) -> Vec<O>
where
    I: Copy,
    F: Fn(I) -> O,
{
    input.iter().map(|&x| f(x)).collect()
}

/// `out[i] = f(lhs[i], rhs[i])` over the shorter of the two inputs.
pub fn zip_map<L, R, O, F>(lhs: &[L], rhs: &[R], f: F) -> Vec<O>
where
    L: Copy,
    R: Copy,
    F: Fn(L, R) -> O,
{
    lhs.iter().zip(rhs).map(|(&l, &r)| f(l, r)).collect()
}

/// Inclusive scan: `out[i] = f(out[i - 1], x[i])`, seeded with `init`.
pub fn scan<T, A, F>(input: &[T], init: A, f: F) -> Vec<A>
where
    T: Copy,
    A: Copy,
    F: Fn(A, T) -> A,
{
    let mut acc = init;
    input
        .iter()
        .map(|&x| {
            acc = f(acc, x);
            acc
        })
        .collect()
}

/// Left fold seeded with `init`. Empty input yields `init`.
pub fn reduce<T, A, F>(input: &[T], init: A, f: F) -> A
where
    T: Copy,
    F: Fn(A, T) -> A,
{
    input.iter().fold(init, |acc, &x| f(acc, x))
}

/// `out[i] = f(x[i], x[i + 1])`; one shorter than the input, empty for
/// fewer than two items.
pub fn pairwise_map<T, O, F>(input: &[T], f: F) -> Vec<O>
where
    T: Copy,
    F: Fn(T, T) -> O,
{
    input.windows(2).map(|w| f(w[0], w[1])).collect()
}
