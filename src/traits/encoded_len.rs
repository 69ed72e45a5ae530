/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Types that know the number of bytes of their serialized form.
///
/// Generated structures implement this trait by summing the lengths of
/// their fields; this crate provides implementations for primitives,
/// strings, sequences, options and tuples. Strings count their UTF-8 bytes,
/// and an absent optional value counts as zero bytes.
pub trait EncodedLen {
    /// Returns the length in bytes of the encoded value.
    fn encoded_len(&self) -> u64;
}

/// Returns the encoded length of `value`.
#[inline(always)]
pub fn size_of<T: EncodedLen + ?Sized>(value: &T) -> u64 {
    value.encoded_len()
}

macro_rules! impl_fixed_len {
    ($($ty:ty),*) => {$(
        impl EncodedLen for $ty {
            #[inline(always)]
            fn encoded_len(&self) -> u64 {
                core::mem::size_of::<$ty>() as u64
            }
        }
    )*};
}

impl_fixed_len!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl EncodedLen for bool {
    #[inline(always)]
    fn encoded_len(&self) -> u64 {
        1
    }
}

impl EncodedLen for str {
    #[inline(always)]
    fn encoded_len(&self) -> u64 {
        self.len() as u64
    }
}

impl EncodedLen for String {
    #[inline(always)]
    fn encoded_len(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: EncodedLen> EncodedLen for [T] {
    fn encoded_len(&self) -> u64 {
        self.iter().map(EncodedLen::encoded_len).sum()
    }
}

impl<T: EncodedLen, const N: usize> EncodedLen for [T; N] {
    fn encoded_len(&self) -> u64 {
        self.as_slice().encoded_len()
    }
}

impl<T: EncodedLen> EncodedLen for Vec<T> {
    fn encoded_len(&self) -> u64 {
        self.as_slice().encoded_len()
    }
}

impl<T: EncodedLen> EncodedLen for Option<T> {
    fn encoded_len(&self) -> u64 {
        self.as_ref().map_or(0, EncodedLen::encoded_len)
    }
}

impl<T: EncodedLen + ?Sized> EncodedLen for &T {
    #[inline(always)]
    fn encoded_len(&self) -> u64 {
        (**self).encoded_len()
    }
}

impl<T: EncodedLen + ?Sized> EncodedLen for Box<T> {
    #[inline(always)]
    fn encoded_len(&self) -> u64 {
        (**self).encoded_len()
    }
}

macro_rules! impl_tuple_len {
    ($($name:ident),+) => {
        impl<$($name: EncodedLen),+> EncodedLen for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encoded_len(&self) -> u64 {
                let ($($name,)+) = self;
                0 $(+ $name.encoded_len())+
            }
        }
    };
}

impl_tuple_len!(A);
impl_tuple_len!(A, B);
impl_tuple_len!(A, B, C);
impl_tuple_len!(A, B, C, D);
impl_tuple_len!(A, B, C, D, E);
impl_tuple_len!(A, B, C, D, E, F);
