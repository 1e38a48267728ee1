//! # Component Schema
//!
//! Components are plain data with no behavior. A schema is the ordered tuple
//! of component types a store is built for; the position of a type in the
//! tuple is its component index.
//!
//! ```rust
//! use blitz_ecs::{ColumnAt, Schema};
//!
//! type Particle = ([f32; 2], f64, f64);
//!
//! assert_eq!(<Particle as Schema>::LEN, 3);
//! let _: fn(&<Particle as Schema>::Columns) -> &[f64] = <Particle as ColumnAt<1>>::column;
//! ```
//!
//! The storage for a schema is a tuple of `Vec`s, one per component type
//! (struct-of-arrays). Column access goes through [`ColumnAt<K>`], which is
//! only implemented for `K` inside the schema, so a bad index does not compile.

use std::mem::size_of;

/// Marker trait for component types.
///
/// Components must be:
/// - `Copy`: moved between slots by swap-remove with a bitwise copy
/// - `Default`: new slots are filled with the default value
/// - `Send + Sync`: the store can be handed to another thread
///
/// Implemented for every type that satisfies the bounds.
pub trait Component: Copy + Default + Send + Sync + 'static {}

impl<T: Copy + Default + Send + Sync + 'static> Component for T {}

/// An ordered, fixed list of component types backed by parallel columns.
///
/// Implemented for tuples of 1 to 12 [`Component`] types. The operations
/// here touch every column at once and are how the store keeps all columns
/// the same length.
pub trait Schema: 'static {
    /// One `Vec` per component type.
    type Columns: Default + Send + Sync;

    /// Number of component types.
    const LEN: usize;

    /// Sum of the component sizes, i.e. bytes of column data per entity.
    const ROW_BYTES: usize;

    /// Appends a default value to every column.
    fn push_default(columns: &mut Self::Columns);

    /// Moves the last row into `index` in every column and drops the last row.
    fn swap_remove(columns: &mut Self::Columns, index: usize);

    /// Ensures every column has room for `additional` more rows.
    fn reserve_exact(columns: &mut Self::Columns, additional: usize);

    /// Empties every column, keeping allocations.
    fn clear(columns: &mut Self::Columns);

    /// Releases unused allocation in every column.
    fn shrink_to_fit(columns: &mut Self::Columns);

    /// Checks that every column holds exactly `len` rows.
    fn columns_have_len(columns: &Self::Columns, len: usize) -> bool;

    /// Smallest allocated capacity among the columns.
    fn min_capacity(columns: &Self::Columns) -> usize;
}

/// Typed access to column `K` of a schema.
pub trait ColumnAt<const K: usize>: Schema {
    /// The component type stored at index `K`.
    type Component: Component;

    /// Column `K` as a slice, one value per live entity.
    fn column(columns: &Self::Columns) -> &[Self::Component];

    /// Column `K` as a mutable slice.
    fn column_mut(columns: &mut Self::Columns) -> &mut [Self::Component];
}

macro_rules! impl_column_at {
    ([$($all:ident),+];) => {};
    ([$($all:ident),+]; $idx:tt : $ty:ident $(, $rest_idx:tt : $rest_ty:ident)*) => {
        impl<$($all: Component),+> ColumnAt<$idx> for ($($all,)+) {
            type Component = $ty;

            #[inline]
            fn column(columns: &Self::Columns) -> &[$ty] {
                &columns.$idx
            }

            #[inline]
            fn column_mut(columns: &mut Self::Columns) -> &mut [$ty] {
                &mut columns.$idx
            }
        }

        impl_column_at!([$($all),+]; $($rest_idx : $rest_ty),*);
    };
}

macro_rules! impl_schema {
    ($len:expr; $($idx:tt : $ty:ident),+) => {
        impl<$($ty: Component),+> Schema for ($($ty,)+) {
            type Columns = ($(Vec<$ty>,)+);

            const LEN: usize = $len;
            const ROW_BYTES: usize = 0 $(+ size_of::<$ty>())+;

            #[inline]
            fn push_default(columns: &mut Self::Columns) {
                $(columns.$idx.push(<$ty>::default());)+
            }

            #[inline]
            fn swap_remove(columns: &mut Self::Columns, index: usize) {
                $(columns.$idx.swap_remove(index);)+
            }

            fn reserve_exact(columns: &mut Self::Columns, additional: usize) {
                $(columns.$idx.reserve_exact(additional);)+
            }

            fn clear(columns: &mut Self::Columns) {
                $(columns.$idx.clear();)+
            }

            fn shrink_to_fit(columns: &mut Self::Columns) {
                $(columns.$idx.shrink_to_fit();)+
            }

            fn columns_have_len(columns: &Self::Columns, len: usize) -> bool {
                true $(&& columns.$idx.len() == len)+
            }

            fn min_capacity(columns: &Self::Columns) -> usize {
                usize::MAX $(.min(columns.$idx.capacity()))+
            }
        }

        impl_column_at!([$($ty),+]; $($idx : $ty),+);
    };
}

impl_schema!(1; 0: C0);
impl_schema!(2; 0: C0, 1: C1);
impl_schema!(3; 0: C0, 1: C1, 2: C2);
impl_schema!(4; 0: C0, 1: C1, 2: C2, 3: C3);
impl_schema!(5; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4);
impl_schema!(6; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5);
impl_schema!(7; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6);
impl_schema!(8; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7);
impl_schema!(9; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8);
impl_schema!(10; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9);
impl_schema!(11; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10);
impl_schema!(12; 0: C0, 1: C1, 2: C2, 3: C3, 4: C4, 5: C5, 6: C6, 7: C7, 8: C8, 9: C9, 10: C10, 11: C11);
