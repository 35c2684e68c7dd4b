//! # CourtDesk
//!
//! A natural-language analytics assistant for a tennis club. A manager asks
//! free-form questions about members, bookings, coaches, and courts; the
//! assistant synthesizes a bounded SQL query with a text-completion oracle,
//! runs it against SQLite, and narrates the result back as a spoken-style
//! answer.
//!
//! ## Pipeline
//!
//! ```text
//! request ─▶ rate limiter ─▶ intent triage ─▶ SQL synthesis ─▶ read-only
//!            (admit/reject)   (chatter short-   (oracle call)    guard
//!                              circuit)                            │
//!                                                                  ▼
//!                         envelope ◀─ narration ◀─ execution (SQLite)
//!                                      (oracle call)
//! ```
//!
//! Every failure mode collapses into one of three canned answers (chatter
//! helper, over-limit notice, "couldn't understand") or a generic service
//! error; raw store or oracle errors never reach the user.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and the response envelope |
//! | [`schema`] | Static schema descriptor and date anchor |
//! | [`triage`] | Chatter vs. data-question classification |
//! | [`rate_limit`] | Sliding-window admission control |
//! | [`oracle`] | Text-completion oracle trait + Anthropic client |
//! | [`synthesize`] | Prompt building and statement extraction |
//! | [`executor`] | Statement execution and row normalization |
//! | [`narrate`] | Result rendering and answer generation |
//! | [`pipeline`] | Orchestration and outcome rendering |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`seed`] | Demo data |

pub mod config;
pub mod db;
pub mod executor;
pub mod migrate;
pub mod models;
pub mod narrate;
pub mod oracle;
pub mod pipeline;
pub mod rate_limit;
pub mod schema;
pub mod seed;
pub mod server;
pub mod synthesize;
pub mod triage;
