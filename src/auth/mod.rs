pub mod backend;
pub mod local;
pub mod policy;

pub use backend::{AuthBackend, AuthSession, Profile, Role, SignUpMetadata};
pub use local::LocalAuthBackend;
pub use policy::{AccessDecision, AccessPolicy, AccessRule};
