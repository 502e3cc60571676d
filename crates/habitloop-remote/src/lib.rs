pub mod error;
pub mod firebase_auth;
pub mod firestore;
mod http;
pub mod quotes;
pub mod refreshing;
pub mod session;
pub mod supabase;
pub mod traits;

pub use error::{AuthError, RemoteError, RemoteResult};
pub use firebase_auth::FirebaseAuthClient;
pub use firestore::FirestoreClient;
pub use quotes::{ZenQuotesClient, DEFAULT_QUOTE_URL};
pub use refreshing::{RefreshHook, RefreshingStore};
pub use session::{AuthSession, SessionHandle};
pub use supabase::SupabaseStorage;
pub use traits::{AuthService, DocumentStore, ObjectStorage, QuoteSource};

#[cfg(test)]
pub(crate) mod test_server;
