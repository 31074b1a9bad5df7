//! Feed service: HTTP surface, generation pipeline and scheduled refresh.

pub mod api;
pub mod middleware;
pub mod pipeline;
pub mod scheduler;
