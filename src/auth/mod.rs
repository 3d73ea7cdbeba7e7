pub mod callback;
pub mod credentials;
pub mod oauth;
pub mod token;
pub mod token_store;

pub use credentials::{CredentialProvider, OAuthCredentials};
pub use oauth::{AuthLoginResult, AuthService, AuthStatus};
pub use token::TokenSet;
pub use token_store::{FileTokenStore, TokenStore};
