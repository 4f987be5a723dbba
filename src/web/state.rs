// src/web/state.rs
// Shared state handed to every handler

use std::sync::Arc;

use crate::pipeline::VibePipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<VibePipeline>,
}

impl AppState {
    pub fn new(pipeline: VibePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
