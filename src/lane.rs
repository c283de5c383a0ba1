use std::ops::{Add, Mul};

use crate::activation::Activation;
use crate::utils::{relu, relu_f32, sigmoid, sigmoid_f32, tanh, tanh_f32};

/// One lane of cell arithmetic: a scalar, or a register holding several
/// independent scalars that are processed together.
///
/// The cell step bodies are written once against this trait, so every lane
/// type evaluates the same operations in the same order.
pub trait Lane: Copy + Add<Output = Self> + Mul<Output = Self> {
    fn zero() -> Self;

    /// Apply `act` to every element.
    fn activate(self, act: Activation) -> Self;

    /// Multiply the incoming gradient `self` by the derivative of `act`,
    /// expressed through the already activated value.
    fn activate_grad(self, activated: Self, act: Activation) -> Self;
}

/// Lane types that can be loaded from and stored to a slice of `T`.
pub trait Packed<T>: Lane {
    /// Number of `T` elements covered by one lane value.
    const WIDTH: usize;

    /// Load `WIDTH` elements starting at `at`. Panics when fewer remain.
    fn load(src: &[T], at: usize) -> Self;

    fn store(self, dst: &mut [T], at: usize);
}

/// Element types the kernel runs on.
pub trait Element: Lane + Packed<Self> + PartialEq + std::fmt::Debug {
    /// Whether this build has a wide lane for the element type.
    const HAS_WIDE_LANE: bool;

    /// Widest lane available for this element type in this build; the scalar
    /// type itself when there is none.
    type Wide: Packed<Self>;
}

macro_rules! scalar_lane {
    ($t:ty, $sigmoid:path, $tanh:path, $relu:path) => {
        impl Lane for $t {
            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn activate(self, act: Activation) -> Self {
                match act {
                    Activation::Identity => self,
                    Activation::Sigmoid => $sigmoid(self),
                    Activation::Tanh => $tanh(self),
                    Activation::Relu => $relu(self),
                }
            }

            #[inline]
            fn activate_grad(self, activated: Self, act: Activation) -> Self {
                match act {
                    Activation::Identity => self,
                    Activation::Sigmoid => self * activated * (1.0 - activated),
                    Activation::Tanh => self * (1.0 - activated * activated),
                    Activation::Relu => self * if activated > 0.0 { 1.0 } else { 0.0 },
                }
            }
        }

        impl Packed<$t> for $t {
            const WIDTH: usize = 1;

            #[inline]
            fn load(src: &[$t], at: usize) -> Self {
                src[at]
            }

            #[inline]
            fn store(self, dst: &mut [$t], at: usize) {
                dst[at] = self;
            }
        }
    };
}

scalar_lane!(f64, sigmoid, tanh, relu);
scalar_lane!(f32, sigmoid_f32, tanh_f32, relu_f32);

impl Element for f64 {
    const HAS_WIDE_LANE: bool = false;
    type Wide = f64;
}

impl Element for f32 {
    const HAS_WIDE_LANE: bool = cfg!(all(target_arch = "x86_64", target_feature = "avx"));

    #[cfg(all(target_arch = "x86_64", target_feature = "avx"))]
    type Wide = crate::simd::F32x8;
    #[cfg(not(all(target_arch = "x86_64", target_feature = "avx")))]
    type Wide = f32;
}
