//! # Council Gateway
//! HTTP front end for the orchestrator.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /` | browser chat page |
//! | `POST /api/chat` | `{ "message": ... }` → `{ "answer": ... }` |
//! | `GET /api/stats` | cumulative model usage |
//! | `GET /health` | liveness and uptime |

pub mod page;
pub mod routes;
pub mod server;

#[cfg(test)]
pub(crate) mod testing;

pub use server::{AppState, build_router, start};
