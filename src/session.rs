use tracing::{debug, warn};

use crate::backend::Backend;
use crate::catalog::SchemaCatalog;
use crate::error::{Error, Result};
use crate::parser::parse_statement;
use crate::presenter::View;
use crate::translator::{translate, OutboundRequest};
use crate::validator::Validator;

/// Parses, validates and translates one statement. Nothing is sent
/// anywhere; a rejected statement never produces a request.
pub fn prepare(catalog: &SchemaCatalog, sql: &str) -> Result<OutboundRequest> {
    let statement = parse_statement(sql)?;
    debug!(?statement, "parsed statement");

    let request = Validator::new(catalog)
        .validate(&statement)
        .into_result()
        .map_err(|reason| {
            warn!(%reason, "statement rejected");
            reason
        })?;

    Ok(translate(sql, request))
}

/// A single user's view of the system: the statement error, if any, and
/// the results area.
pub struct Session<'c, B> {
    catalog: &'c SchemaCatalog,
    backend: B,
    error: Option<Error>,
    view: View,
}

impl<'c, B: Backend> Session<'c, B> {
    pub fn new(catalog: &'c SchemaCatalog, backend: B) -> Self {
        Self {
            catalog,
            backend,
            error: None,
            view: View::Prompt,
        }
    }

    /// Submits a statement. Previous results and errors are cleared first,
    /// and the call returns once the backend has answered.
    pub fn submit(&mut self, sql: &str) {
        self.error = None;
        self.view = View::Prompt;

        match prepare(self.catalog, sql) {
            Ok(request) => {
                let reply = self.backend.dispatch(&request);
                self.view = View::from(reply);
            }
            Err(err) => self.error = Some(err),
        }
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
