//! Eight-wide single-precision lane backed by one 256-bit AVX register.
//!
//! This module only exists when the crate is compiled for `x86_64` with the
//! `avx` target feature enabled (e.g. `RUSTFLAGS="-C target-cpu=native"`).
//! Add and multiply are single AVX instructions. Identity and relu dispatch
//! stay in registers; sigmoid and tanh go through the scalar functions one
//! element at a time so each element matches the scalar lane exactly.

use std::arch::x86_64::*;
use std::fmt;
use std::ops::{Add, Mul};

use crate::activation::Activation;
use crate::lane::{Lane, Packed};
use crate::utils::{sigmoid_f32, tanh_f32};

#[derive(Clone, Copy)]
pub struct F32x8(__m256);

impl F32x8 {
    pub const LANES: usize = 8;

    #[inline]
    pub fn splat(value: f32) -> Self {
        F32x8(unsafe { _mm256_set1_ps(value) })
    }

    #[inline]
    pub fn from_array(values: [f32; 8]) -> Self {
        F32x8(unsafe { _mm256_loadu_ps(values.as_ptr()) })
    }

    #[inline]
    pub fn to_array(self) -> [f32; 8] {
        let mut out = [0.0f32; 8];
        unsafe { _mm256_storeu_ps(out.as_mut_ptr(), self.0) };
        out
    }

    /// Load the first eight elements of `src`. Panics if `src` is shorter.
    #[inline]
    pub fn from_slice(src: &[f32]) -> Self {
        let head = &src[..Self::LANES];
        F32x8(unsafe { _mm256_loadu_ps(head.as_ptr()) })
    }

    /// Store into the first eight elements of `dst`. Panics if `dst` is shorter.
    #[inline]
    pub fn write_to_slice(self, dst: &mut [f32]) {
        let head = &mut dst[..Self::LANES];
        unsafe { _mm256_storeu_ps(head.as_mut_ptr(), self.0) };
    }

    #[inline]
    fn map(self, f: impl Fn(f32) -> f32) -> Self {
        let mut values = self.to_array();
        for v in values.iter_mut() {
            *v = f(*v);
        }
        F32x8::from_array(values)
    }
}

impl Add for F32x8 {
    type Output = F32x8;

    #[inline]
    fn add(self, rhs: F32x8) -> F32x8 {
        F32x8(unsafe { _mm256_add_ps(self.0, rhs.0) })
    }
}

impl Mul for F32x8 {
    type Output = F32x8;

    #[inline]
    fn mul(self, rhs: F32x8) -> F32x8 {
        F32x8(unsafe { _mm256_mul_ps(self.0, rhs.0) })
    }
}

impl Lane for F32x8 {
    #[inline]
    fn zero() -> Self {
        F32x8(unsafe { _mm256_setzero_ps() })
    }

    #[inline]
    fn activate(self, act: Activation) -> Self {
        match act {
            Activation::Identity => self,
            Activation::Sigmoid => self.map(sigmoid_f32),
            Activation::Tanh => self.map(tanh_f32),
            // maxps returns the second operand when the first is NaN, like the scalar relu.
            Activation::Relu => F32x8(unsafe { _mm256_max_ps(self.0, _mm256_setzero_ps()) }),
        }
    }

    #[inline]
    fn activate_grad(self, activated: Self, act: Activation) -> Self {
        let one = F32x8::splat(1.0);
        match act {
            Activation::Identity => self,
            Activation::Sigmoid => {
                let complement = F32x8(unsafe { _mm256_sub_ps(one.0, activated.0) });
                self * activated * complement
            }
            Activation::Tanh => {
                let complement = F32x8(unsafe { _mm256_sub_ps(one.0, (activated * activated).0) });
                self * complement
            }
            Activation::Relu => {
                let mask = unsafe {
                    let positive = _mm256_cmp_ps::<_CMP_GT_OQ>(activated.0, _mm256_setzero_ps());
                    _mm256_and_ps(positive, one.0)
                };
                self * F32x8(mask)
            }
        }
    }
}

impl Packed<f32> for F32x8 {
    const WIDTH: usize = F32x8::LANES;

    #[inline]
    fn load(src: &[f32], at: usize) -> Self {
        F32x8::from_slice(&src[at..])
    }

    #[inline]
    fn store(self, dst: &mut [f32], at: usize) {
        self.write_to_slice(&mut dst[at..]);
    }
}

impl fmt::Debug for F32x8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("F32x8").field(&self.to_array()).finish()
    }
}

impl PartialEq for F32x8 {
    fn eq(&self, other: &Self) -> bool {
        self.to_array() == other.to_array()
    }
}
