//! This crate implements the reconciliation of modifier trees against cached data.
//!
//! A caller describes the cache side effects of a mutation as a [`Modifier`]: a tree that
//! mirrors the shape of the data, where any position can be a literal value or a function
//! from the currently cached value to a new one. [`reconcile`] takes that tree together with
//! a snapshot of what is currently cached and produces the plain data that should be written
//! back.
//!
//! The crate is side effect free - it never reads or writes a cache itself. The only thing it
//! needs from the cache is an [`IdentityResolver`], used to line up list entries with their
//! cached counterparts by identity rather than by position.

mod identity;
mod modifier;
mod reconcile;

pub use self::{
    identity::{find_match, IdentityResolver},
    modifier::{Modifier, ModifierFn, ModifierRecord},
    reconcile::{reconcile, Reconciler},
};

