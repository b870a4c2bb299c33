//! Bidirectional canonical ↔ exchange string tables
//!
//! Built once from a literal list of pairs. Construction fails if either
//! side repeats, so every table in use is a true bijection.

use crate::errors::{ExchangeError, Result};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct Bijection<C> {
    name: &'static str,
    forward: HashMap<C, &'static str>,
    inverse: HashMap<&'static str, C>,
}

impl<C> Bijection<C>
where
    C: Copy + Eq + Hash + Debug,
{
    /// Build both directions from `pairs`, rejecting duplicates on either side.
    pub fn new(name: &'static str, pairs: &[(C, &'static str)]) -> Result<Self> {
        let mut forward = HashMap::with_capacity(pairs.len());
        let mut inverse = HashMap::with_capacity(pairs.len());

        for &(canonical, wire) in pairs {
            if forward.insert(canonical, wire).is_some() {
                return Err(ExchangeError::Configuration(format!(
                    "{name} table maps {canonical:?} more than once"
                )));
            }
            if inverse.insert(wire, canonical).is_some() {
                return Err(ExchangeError::Configuration(format!(
                    "{name} table maps {wire:?} more than once"
                )));
            }
        }

        Ok(Self {
            name,
            forward,
            inverse,
        })
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Exchange string for a canonical value.
    ///
    /// A value missing from the table is a local configuration error.
    pub fn to_exchange(&self, canonical: C) -> Result<&'static str> {
        self.forward.get(&canonical).copied().ok_or_else(|| {
            ExchangeError::Configuration(format!(
                "{} table has no exchange value for {canonical:?}",
                self.name
            ))
        })
    }

    /// Canonical value for an exchange string, `None` if the exchange sent
    /// something this table does not know.
    pub fn to_canonical(&self, wire: &str) -> Option<C> {
        self.inverse.get(wire).copied()
    }
}
