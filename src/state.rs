// src/state.rs
use crate::poll::PollRepo;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: PollRepo,
}

impl AppState {
    pub fn new(repo: PollRepo) -> Self {
        Self { repo }
    }
}
