pub mod aggregate;
pub mod efficiency;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod policy;
pub mod scoring;
pub mod types;

pub use aggregate::*;
pub use efficiency::*;
pub use error::QcmError;
pub use filter::*;
pub use pipeline::*;
pub use policy::*;
pub use scoring::*;
pub use types::*;
