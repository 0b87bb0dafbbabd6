//! Storage types for the reduced-precision formats.

use half::{bf16, f16};

use super::{decode, encode, MiniFloat};

macro_rules! mini_float {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            exp: $exp:expr,
            mant: $mant:expr,
            bias: $bias:expr,
            nan: $nan:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            /// Positive zero
            pub const ZERO: Self = Self(0);
            /// Positive infinity
            pub const INFINITY: Self = Self(((1 << $exp) - 1) << $mant);
            /// Negative infinity
            pub const NEG_INFINITY: Self =
                Self((1 << ($exp + $mant)) | (((1 << $exp) - 1) << $mant));
            /// NaN pattern produced by encode
            pub const NAN: Self = Self((((1 << $exp) - 1) << $mant) | $nan);

            /// Wrap a raw bit pattern.
            #[inline]
            pub const fn from_bits(bits: $repr) -> Self {
                Self(bits)
            }

            /// Raw bit pattern.
            #[inline]
            pub const fn to_bits(self) -> $repr {
                self.0
            }

            /// Encode an f32 (truncating, saturating).
            #[inline]
            pub fn from_f32(v: f32) -> Self {
                encode(v)
            }

            /// Decode to f32.
            #[inline]
            pub fn to_f32(self) -> f32 {
                decode(self)
            }

            /// Sign bit set
            #[inline]
            pub fn is_sign_negative(self) -> bool {
                (self.0 >> ($exp + $mant)) & 1 == 1
            }

            /// Exponent all ones, mantissa non-zero
            #[inline]
            pub fn is_nan(self) -> bool {
                let exp = (self.0 >> $mant) & ((1 << $exp) - 1);
                let mant = self.0 & ((1 << $mant) - 1);
                exp == (1 << $exp) - 1 && mant != 0
            }

            /// Exponent all ones, mantissa zero
            #[inline]
            pub fn is_infinite(self) -> bool {
                let exp = (self.0 >> $mant) & ((1 << $exp) - 1);
                let mant = self.0 & ((1 << $mant) - 1);
                exp == (1 << $exp) - 1 && mant == 0
            }
        }

        impl MiniFloat for $name {
            const BITS: u32 = <$repr>::BITS;
            const EXP_BITS: u32 = $exp;
            const MANT_BITS: u32 = $mant;
            const BIAS: i32 = $bias;
            const NAN_MANTISSA: u32 = $nan;

            #[inline]
            fn from_raw(raw: u32) -> Self {
                Self(raw as $repr)
            }

            #[inline]
            fn raw(self) -> u32 {
                self.0 as u32
            }
        }

        impl From<$name> for f32 {
            #[inline]
            fn from(v: $name) -> f32 {
                v.to_f32()
            }
        }
    };
}

mini_float! {
    /// IEEE-754 half precision: 1 sign, 5 exponent, 10 mantissa bits.
    E5m10(u16) { exp: 5, mant: 10, bias: 15, nan: 0x200 }
}

mini_float! {
    /// Brain float: 1 sign, 8 exponent, 7 mantissa bits (upper half of an f32).
    E8m7(u16) { exp: 8, mant: 7, bias: 127, nan: 0x40 }
}

mini_float! {
    /// 8-bit float: 1 sign, 4 exponent, 3 mantissa bits.
    ///
    /// Largest finite value is 240; anything above saturates to infinity.
    E4m3(u8) { exp: 4, mant: 3, bias: 7, nan: 0x7 }
}

// e5m10 and e8m7 share their bit layout with the `half` crate types,
// so these conversions are plain bit copies.

impl From<E5m10> for f16 {
    #[inline]
    fn from(v: E5m10) -> f16 {
        f16::from_bits(v.to_bits())
    }
}

impl From<f16> for E5m10 {
    #[inline]
    fn from(v: f16) -> E5m10 {
        E5m10::from_bits(v.to_bits())
    }
}

impl From<E8m7> for bf16 {
    #[inline]
    fn from(v: E8m7) -> bf16 {
        bf16::from_bits(v.to_bits())
    }
}

impl From<bf16> for E8m7 {
    #[inline]
    fn from(v: bf16) -> E8m7 {
        E8m7::from_bits(v.to_bits())
    }
}
