// Core modules implementing the record model, catalog storage, and error modeling.
pub mod error;
pub mod library;
pub mod record;
pub mod validate;
