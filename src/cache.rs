use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use bevy::prelude::Resource;

use crate::{
    error::ParseError,
    function::{CompiledFunction, parse},
};

/// Entries kept by [`ExpressionCache::default`].
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Memoizes [`parse`] by source text.
///
/// Compiled functions are shared through [`Arc`] so an async build task can hold one
/// without copying the tree. Failed parses are not cached. Past `capacity` entries the
/// oldest insertion is evicted; tasks already holding it keep their `Arc`.
#[derive(Resource, Debug)]
pub struct ExpressionCache {
    compiled: HashMap<String, Arc<CompiledFunction>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl Default for ExpressionCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ExpressionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` functions. `0` disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            compiled: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the cached function for `source`, parsing it on first use.
    pub fn get_or_parse(&mut self, source: &str) -> Result<Arc<CompiledFunction>, ParseError> {
        if let Some(function) = self.compiled.get(source) {
            log::trace!("expression cache hit for `{source}`");
            return Ok(Arc::clone(function));
        }

        let function = Arc::new(parse(source)?);
        if self.capacity == 0 {
            return Ok(function);
        }

        while self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                log::trace!("expression cache evicting `{oldest}`");
                self.compiled.remove(&oldest);
            }
        }
        self.order.push_back(source.to_owned());
        self.compiled.insert(source.to_owned(), Arc::clone(&function));
        Ok(function)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.compiled.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Drops every cached function.
    pub fn clear(&mut self) {
        self.compiled.clear();
        self.order.clear();
    }
}
