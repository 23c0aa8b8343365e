//! Domain entities - core business objects

mod file;
mod identity;
mod profile;
mod refresh_token;
mod view;

pub use file::{FileRecord, NewFileRecord, NewUploadSignature, PresignedUpload, UploadSignature};
pub use identity::Identity;
pub use profile::{Profile, ProviderProfile};
pub use refresh_token::{NewRefreshToken, RefreshToken};
pub use view::{LoginView, UserView};
