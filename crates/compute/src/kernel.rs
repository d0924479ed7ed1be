//! Per-element function capability plugged into the lane dispatcher.
//!
//! The dispatcher only ever asks "what goes at flat offset `i`". Adapters
//! bind a pure function of fixed arity to its input arrays.

/// Produces the output element for a flat offset.
pub trait ElementKernel<O>: Sync {
    /// Number of inputs the wrapped function takes.
    fn arity(&self) -> usize;

    /// Items readable at every input; the launcher rejects `n` above this.
    fn input_len(&self) -> usize;

    /// Evaluate at `offset`. Called once per live work item, with
    /// `offset < input_len()`.
    fn eval(&self, offset: usize) -> O;
}

impl<O, K: ElementKernel<O> + ?Sized> ElementKernel<O> for &K {
    fn arity(&self) -> usize {
        (**self).arity()
    }

    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn eval(&self, offset: usize) -> O {
        (**self).eval(offset)
    }
}

/// `out[i] = f(input[i])`.
pub struct Unary<'a, I, F> {
    input: &'a [I],
    f: F,
}

impl<'a, I, F> Unary<'a, I, F> {
    pub fn new(input: &'a [I], f: F) -> Self {
        Self { input, f }
    }
}

impl<I, O, F> ElementKernel<O> for Unary<'_, I, F>
where
    I: Copy + Sync,
    F: Fn(I) -> O + Sync,
{
    fn arity(&self) -> usize {
        1
    }

    fn input_len(&self) -> usize {
        self.input.len()
    }

    fn eval(&self, offset: usize) -> O {
        (self.f)(self.input[offset])
    }
}

/// `out[i] = f(lhs[i], rhs[i])`.
pub struct Binary<'a, L, R, F> {
    lhs: &'a [L],
    rhs: &'a [R],
    f: F,
}

impl<'a, L, R, F> Binary<'a, L, R, F> {
    pub fn new(lhs: &'a [L], rhs: &'a [R], f: F) -> Self {
        Self { lhs, rhs, f }
    }
}

impl<L, R, O, F> ElementKernel<O> for Binary<'_, L, R, F>
where
    L: Copy + Sync,
    R: Copy + Sync,
    F: Fn(L, R) -> O + Sync,
{
    fn arity(&self) -> usize {
        2
    }

    fn input_len(&self) -> usize {
        self.lhs.len().min(self.rhs.len())
    }

    fn eval(&self, offset: usize) -> O {
        (self.f)(self.lhs[offset], self.rhs[offset])
    }
}

/// `out[i] = f(i)`, with no backing input. Handy for generators and for
/// observing which offsets get dispatched.
pub struct FromIndex<F> {
    f: F,
}

impl<F> FromIndex<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<O, F> ElementKernel<O> for FromIndex<F>
where
    F: Fn(usize) -> O + Sync,
{
    fn arity(&self) -> usize {
        0
    }

    fn input_len(&self) -> usize {
        usize::MAX
    }

    fn eval(&self, offset: usize) -> O {
        (self.f)(offset)
    }
}

/// Degrees to radians, the reference unary transform.
pub fn radians(x: f64) -> f64 {
    x * std::f64::consts::PI / 180.0
}

/// `log(exp(a) + exp(b))`, the reference binary transform.
pub fn logaddexp(a: f64, b: f64) -> f64 {
    let hi = a.max(b);
    if hi == f64::NEG_INFINITY {
        return hi;
    }
    hi + ((a - hi).exp() + (b - hi).exp()).ln()
}
