//! # Acrotip Protocols
//!
//! Shared vocabulary for the acrotip workspace: the lookup data model, the
//! seams external collaborators plug into, the error taxonomy, and the
//! request/response message bus connecting the page runtime to the
//! background lookup service.
//!
//! ## Core Traits
//!
//! - [`DefinitionSource`] - Primary (wiki-style) definition lookup
//! - [`CompletionProvider`] - AI completion service used as a fallback tier
//! - [`KeyValueStore`] - Durable, namespaced key-value storage

pub mod error;
pub mod lookup;
pub mod messaging;
pub mod provider;
pub mod source;
pub mod storage;

pub use error::{MessagingError, ProviderError, SourceError, StorageError};
pub use lookup::{normalize_term, Definition, LookupResult, LookupSource, PageContext};
pub use messaging::{
    Envelope, MessageBus, MessageReceiver, MessageSender, Request, RequestHandler, Responder,
    Response,
};
pub use provider::{CompletionProvider, CompletionRequest};
pub use source::DefinitionSource;
pub use storage::{get_value, set_value, KeyValueStore, StorageArea, StorageMap};
