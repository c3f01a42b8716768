// Event draft domain: the record assembled across chat turns and the rules
// that decide when it is ready to publish.

pub mod draft;
pub mod merge;
pub mod preview;
pub mod questions;
pub mod status;
pub mod validate;
