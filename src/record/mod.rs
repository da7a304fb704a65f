//! Record layer
//!
//! A record is a uniquely identified entity with named attributes and an
//! error collection. All attribute access goes through [`Accessor`].

mod accessor;
mod record;
mod upload;
mod value;

pub use accessor::Accessor;
pub use record::Record;
pub use upload::Upload;
pub use value::{RecordId, Value};
