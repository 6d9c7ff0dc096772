//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod bvid;
pub mod cookie;
pub mod lenient;
pub mod monitor;
pub mod time;
pub mod video;

pub use validation::ValidationError;
pub use bvid::{Bvid, COMMENT_COLLECTION_PREFIX};
pub use cookie::{mask_secret, CookieCredential, CookieInput, MaskedCookie};
pub use monitor::{MonitorConfig, MonitorPatch, MonitorResponse};
pub use video::{
    Comment, CommentResponse, StatsResponse, StatsSnapshot, VideoMetadata, VideoResponse,
};
