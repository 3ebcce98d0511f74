use std::fmt;

/// An integer property value, anywhere from `i64::MIN` to `u64::MAX`.
///
/// Native integers of every width convert into it through `From`, so a `u8` and an `i64`
/// holding the same number produce equal values. Ordering is numeric.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer(i128);

impl Integer {
    pub fn as_i64(&self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }

    pub fn as_u64(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// The nearest `f64`. Used when comparing against floating-point literals, where `1` and
    /// `1.0` are the same value.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

macro_rules! integer_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Integer {
                fn from(n: $t) -> Self {
                    Integer(n as i128)
                }
            }
        )*
    };
}

integer_from!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);
