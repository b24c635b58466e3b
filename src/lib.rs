pub mod ast;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod parser;
pub mod presenter;
pub mod session;
pub mod translator;
pub mod validator;


pub use catalog::{RelationName, SchemaCatalog};
pub use config::Config;
pub use error::{DispatchError, Error, RejectionReason, SyntaxError};
pub use parser::parse_statement;
pub use session::{prepare, Session};
pub use translator::{translate, OutboundRequest};
pub use validator::{NormalizedRequest, ValidationOutcome, Validator};
