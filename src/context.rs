use serde::{Deserialize, Serialize};

/// Per-call denormalization options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Context {
    /// Parse integer and string input for `bool` fields with a permissive
    /// boolean filter instead of rejecting it.
    pub filter_bool: bool,
    /// Keep walking after a rejection and report every failure at once.
    pub collect_errors: bool,
}

impl Context {
    pub fn filter_bool(mut self, on: bool) -> Self {
        self.filter_bool = on;
        self
    }

    pub fn collect_errors(mut self, on: bool) -> Self {
        self.collect_errors = on;
        self
    }
}
