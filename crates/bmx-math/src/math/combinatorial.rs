//! Memoized triangular recurrences.
//!
//! Sequences of the form
//!
//! ```text
//! s(0, 0) = 1
//! s(a, 0) = 0                  for a > 0
//! s(a, b) = 0                  for b > a
//! s(a, b) = f(a, b) * s(a - 1, b) + g(a, b) * s(a - 1, b - 1)
//! ```
//!
//! cover the unsigned Stirling numbers of the first kind (`f = a - 1`,
//! `g = 1`) and the generalized factorial numbers `C(n, k; σ)`
//! (`f = n - 1 - σk`, `g = σ`) that drive the prior on the number of
//! clusters under Dirichlet and Pitman–Yor processes.
//!
//! Values are stored as a sign and a log-magnitude. `|s(1000, k)|` is far
//! outside the f64 range, while its log is a modest number, so the cache is
//! built with a signed log-add-exp recurrence and only exponentiated on
//! request. Multipliers may take either sign, e.g. the signed Stirling
//! numbers `f = -(a - 1)`.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bmx_common::{Error, Result};

use super::stable::log_add_exp;

type Multiplier = Box<dyn Fn(usize, usize) -> f64 + Send + Sync>;

/// Lazily grown cache of a triangular recurrence.
///
/// Rows are appended on demand and never recomputed. Growth takes the write
/// lock; lookups of rows already computed only take the read lock, so a
/// shared memoizer serves concurrent readers with a single writer.
pub struct TriangularMemoizer {
    first: Multiplier,
    second: Multiplier,
    /// `rows[a][b] = s(a, b)` for `b <= a`.
    rows: RwLock<Vec<Vec<SignedLn>>>,
}

/// `sign · exp(ln)`; zero is `ln = -inf` with a positive sign.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SignedLn {
    ln: f64,
    negative: bool,
}

impl SignedLn {
    const ZERO: SignedLn = SignedLn {
        ln: f64::NEG_INFINITY,
        negative: false,
    };
    const ONE: SignedLn = SignedLn {
        ln: 0.0,
        negative: false,
    };

    fn value(self) -> f64 {
        let magnitude = self.ln.exp();
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// `multiplier · self`, with zeros kept exact.
    fn scale(self, multiplier: f64) -> SignedLn {
        if self.ln == f64::NEG_INFINITY || multiplier == 0.0 {
            return SignedLn::ZERO;
        }
        SignedLn {
            ln: multiplier.abs().ln() + self.ln,
            negative: self.negative != multiplier.is_sign_negative(),
        }
    }

    fn plus(self, other: SignedLn) -> SignedLn {
        if other.ln == f64::NEG_INFINITY {
            return self;
        }
        if self.ln == f64::NEG_INFINITY {
            return other;
        }
        if self.negative == other.negative {
            return SignedLn {
                ln: log_add_exp(self.ln, other.ln),
                negative: self.negative,
            };
        }
        let (hi, lo) = if self.ln >= other.ln {
            (self, other)
        } else {
            (other, self)
        };
        if hi.ln == lo.ln {
            return SignedLn::ZERO;
        }
        SignedLn {
            ln: hi.ln + (-(lo.ln - hi.ln).exp()).ln_1p(),
            negative: hi.negative,
        }
    }
}

impl TriangularMemoizer {
    /// Memoizer for an arbitrary recurrence with multipliers `f` and `g`.
    pub fn new<F, G>(first: F, second: G) -> Self
    where
        F: Fn(usize, usize) -> f64 + Send + Sync + 'static,
        G: Fn(usize, usize) -> f64 + Send + Sync + 'static,
    {
        Self {
            first: Box::new(first),
            second: Box::new(second),
            rows: RwLock::new(vec![vec![SignedLn::ONE]]),
        }
    }

    /// Unsigned Stirling numbers of the first kind `|s(n, k)|`.
    pub fn stirling_first_kind() -> Self {
        Self::new(|a, _| (a - 1) as f64, |_, _| 1.0)
    }

    /// Generalized factorial numbers `C(n, k; σ)` with discount `σ ∈ (0, 1)`.
    pub fn generalized_factorial(sigma: f64) -> Result<Self> {
        if !(sigma > 0.0 && sigma < 1.0) {
            return Err(Error::invalid_parameter(
                "sigma",
                format!("must be in (0, 1), got {}", sigma),
            ));
        }
        Ok(Self::new(
            move |n, k| (n as f64) - 1.0 - sigma * (k as f64),
            move |_, _| sigma,
        ))
    }

    /// `s(a, b)` on the natural scale. Underflows to 0 and overflows to
    /// infinity outside the f64 range; use [`Self::ln_evaluate`] there.
    pub fn evaluate(&self, a: usize, b: usize) -> f64 {
        self.entry(a, b).value()
    }

    /// `ln |s(a, b)|`, with `NEG_INFINITY` for zeros. For non-negative
    /// sequences this is `ln s(a, b)`.
    pub fn ln_evaluate(&self, a: usize, b: usize) -> f64 {
        self.entry(a, b).ln
    }

    /// Sign of `s(a, b)`: `-1.0`, `1.0`, or `0.0` for zeros.
    pub fn signum(&self, a: usize, b: usize) -> f64 {
        let entry = self.entry(a, b);
        if entry.ln == f64::NEG_INFINITY {
            0.0
        } else if entry.negative {
            -1.0
        } else {
            1.0
        }
    }

    fn entry(&self, a: usize, b: usize) -> SignedLn {
        if b > a {
            return SignedLn::ZERO;
        }
        if b == 0 {
            return if a == 0 { SignedLn::ONE } else { SignedLn::ZERO };
        }

        if let Some(row) = self.read_rows().get(a) {
            return row[b];
        }

        let mut rows = self.write_rows();
        // Another writer may have grown the table between the two locks.
        self.grow_to(&mut rows, a);
        rows[a][b]
    }

    /// Number of rows currently cached (row 0 is always present).
    pub fn cached_rows(&self) -> usize {
        self.read_rows().len()
    }

    fn grow_to(&self, rows: &mut Vec<Vec<SignedLn>>, max_a: usize) {
        for a in rows.len()..=max_a {
            let prev = &rows[a - 1];
            let mut row = vec![SignedLn::ZERO; a + 1];
            for b in 1..=a {
                // prev has entries 0..=a-1, so s(a-1, a) is a structural zero.
                let stay = if b < a {
                    prev[b].scale((self.first)(a, b))
                } else {
                    SignedLn::ZERO
                };
                let join = prev[b - 1].scale((self.second)(a, b));
                row[b] = stay.plus(join);
            }
            rows.push(row);
        }
    }

    fn read_rows(&self) -> RwLockReadGuard<'_, Vec<Vec<SignedLn>>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rows(&self) -> RwLockWriteGuard<'_, Vec<Vec<SignedLn>>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TriangularMemoizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangularMemoizer")
            .field("cached_rows", &self.cached_rows())
            .finish_non_exhaustive()
    }
}
