use std::collections::HashMap;
use std::hash::Hash;

use chrono::Utc;

struct EDValue<U> {
    val: U,
    ts: i64,    // [ms]
}

/// HashMap whose records are dropped `ttl` milliseconds after insertion.
pub struct ExpiringDict<T: Eq + Hash + Clone, U> {
    dict: HashMap<T, EDValue<U>>,
    ttl: i64,   // [ms]
    last_tick_ts: i64,
}

impl<T: Eq + Hash + Clone, U: Clone> ExpiringDict<T, U> {
    pub fn new(ttl: i64) -> ExpiringDict<T, U> {
        ExpiringDict {
            dict: HashMap::new(),
            ttl,
            last_tick_ts: 0,
        }
    }

    pub fn insert(&mut self, key: T, val: U) {
        self.insert_at(key, val, Utc::now().timestamp_millis());
    }

    fn insert_at(&mut self, key: T, val: U, ts: i64) {
        self.dict.insert(key, EDValue { val, ts });
    }

    pub fn get(&self, key: &T) -> Option<U> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    fn get_at(&self, key: &T, now: i64) -> Option<U> {
        match self.dict.get(key) {
            Some(v) if now - v.ts <= self.ttl => Some(v.val.clone()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    /// Drops expired records; does nothing more often than once per ttl.
    pub fn tick(&mut self) {
        self.tick_at(Utc::now().timestamp_millis());
    }

    fn tick_at(&mut self, now: i64) {
        if now - self.last_tick_ts < self.ttl { return; }
        self.last_tick_ts = now;

        let ttl = self.ttl;
        self.dict.retain(|_, v| now - v.ts <= ttl);
    }
}
