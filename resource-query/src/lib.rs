//! Resource Query lets a backend service describe the resource types it exposes to clients and
//! validate client-supplied query parameters — filters, sorters, sparse fieldsets, included
//! relations, pagination — into a safe, typed internal query. It consists of two sections:
//!
//! * A frontend, which most users will interact with, for defining resource types. A
//!   [`type_system`] catalogue describes clients' view of the application's data model: each
//!   [`ResourceType`](type_system::ResourceType) names its attributes and relationships, and a
//!   [`Registry`](type_system::Registry) precomputes the graph of nested fields reachable from
//!   each type so that dotted names like `"album.artist.name"` resolve in constant time. The
//!   [`params`] module is the request-facing surface: it validates a whole parameter set at
//!   once, returning either a merged option bag or every error found, each tagged with the
//!   path of the input that caused it.
//! * A [`collection`] backend, which applies a validated query to actual data. The backend is
//!   completely agnostic to where the data lives: it dispatches through a small capability
//!   protocol ([`Delegate`](collection::Delegate)) so the same validated query runs identically
//!   against an in-memory sequence of records or an external queryable. This crate ships both
//!   reference backends — [`memory`](collection::memory) for fixtures and tests, and
//!   [`sql`](collection::sql) which renders parameterized statements for a host ORM to execute.
//!
//! The library is completely modular: implement [`Delegate`](collection::Delegate) to plug in a
//! backend that meets your application's specific needs.
//!
//! This is deliberately not a query language — there is no boolean grouping, no `OR`, and no
//! arbitrary expressions — and not an ORM: just a fixed operator vocabulary validated against
//! per-field types and permissions.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

pub mod collection;
pub mod error;
pub mod params;
pub mod prelude;
pub mod query;
pub mod type_system;
pub mod value;

/// Initialize tracing.
pub fn init_logging() {
    static ONCE: Once = Once::new();

    ONCE.call_once(|| {
        color_eyre::install().unwrap();
        tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}
