//! Shared application state.

use channels::InMemoryChannelSet;
use gateway::{InMemoryBackend, SessionRegistry, TransactionalGateway};
use reporting::{FallbackOutbox, PollPolicy, ReportingService};
use router::Router;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub router: Router<InMemoryChannelSet>,
    pub channels: InMemoryChannelSet,
    pub reporting: ReportingService,
    /// Orders with no bakery line, parked until an external worker takes them.
    pub outbox: FallbackOutbox,
    pub gateway: TransactionalGateway<InMemoryBackend>,
    pub sessions: SessionRegistry<InMemoryBackend>,
    /// Polling policy advertised to status clients through `/health`.
    pub poll_policy: PollPolicy,
}
