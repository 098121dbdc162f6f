//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod session_command;
mod session_query;
mod session_store;

#[cfg(test)]
pub use session_command::MockSessionCommand;
pub use session_command::{
    AddBuyInRequest, AddPlayerRequest, CreateSessionRequest, CreateSessionResponse,
    FixtureSessionCommand, JoinSessionRequest, JoinSessionResponse, SessionCommand,
    UpdatePlayerChipsRequest,
};
#[cfg(test)]
pub use session_query::MockSessionQuery;
pub use session_query::{FixtureSessionQuery, SessionQuery, SessionSnapshot, SessionSubscription};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{
    DocumentKey, DocumentPatch, DocumentWatch, FieldPatch, FieldPath, FixtureSessionStore,
    Precondition, SessionStore, SessionStoreError, WatchItem,
};
