use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{Backend, Record, Reply};
use crate::error::DispatchError;
use crate::translator::{Operation, OutboundRequest};

pub const DEFAULT_SELECT_URL: &str = "http://localhost:5000/select";
pub const DEFAULT_INSERT_URL: &str = "http://localhost:5000/insert";

/// The two fixed addresses of the data service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    pub select: String,
    pub insert: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            select: DEFAULT_SELECT_URL.to_owned(),
            insert: DEFAULT_INSERT_URL.to_owned(),
        }
    }
}

impl Endpoints {
    pub fn url(&self, operation: Operation) -> &str {
        match operation {
            Operation::Select => &self.select,
            Operation::Insert => &self.insert,
        }
    }
}

/// Talks to the data service over HTTP, one multipart POST per request.
pub struct HttpBackend {
    agent: ureq::Agent,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent, endpoints }
    }
}

impl Backend for HttpBackend {
    fn dispatch(&mut self, request: &OutboundRequest) -> Result<Reply, DispatchError> {
        let operation = request.operation();
        let url = self.endpoints.url(operation);
        let form = MultipartForm::new(request.form_fields());
        info!(operation = operation.as_str(), %url, "dispatching request");

        let response = match self
            .agent
            .post(url)
            .set("Content-Type", &form.content_type())
            .send_bytes(form.body().as_bytes())
        {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => {
                return Err(transport(
                    anyhow::Error::new(err).context(format!("POST {} failed", url)),
                ))
            }
        };

        let code = response.status();
        let body = response
            .into_string()
            .with_context(|| format!("reading reply from {}", url))
            .map_err(transport)?;
        debug!(code, bytes = body.len(), "received reply");

        decode_reply(operation, code, &body)
    }
}

fn transport(err: anyhow::Error) -> DispatchError {
    DispatchError::Transport(format!("{:#}", err))
}

#[derive(Deserialize)]
struct StatusBody {
    status: Value,
}

/// Interprets a reply body: a select answered with 200 carries records,
/// everything else carries `{status}`.
pub(crate) fn decode_reply(
    operation: Operation,
    code: u16,
    body: &str,
) -> Result<Reply, DispatchError> {
    if operation == Operation::Select && code == 200 {
        let records: Vec<Record> = serde_json::from_str(body)
            .context("select reply is not a list of records")
            .map_err(transport)?;
        check_uniform(&records).map_err(transport)?;
        return Ok(Reply::Records(records));
    }

    let StatusBody { status } = serde_json::from_str(body)
        .with_context(|| {
            format!(
                "{} reply with status {} has no status message",
                operation.as_str(),
                code
            )
        })
        .map_err(transport)?;
    let status = match status {
        Value::String(s) => s,
        other => other.to_string(),
    };

    if operation == Operation::Insert && (200..300).contains(&code) {
        Ok(Reply::Status(status))
    } else {
        Err(DispatchError::Rejected(status))
    }
}

fn check_uniform(records: &[Record]) -> anyhow::Result<()> {
    let first = match records.first() {
        Some(first) => first,
        None => return Ok(()),
    };
    for (index, record) in records.iter().enumerate().skip(1) {
        if record.len() != first.len() || !record.keys().all(|key| first.contains_key(key)) {
            return Err(anyhow!(
                "record {} does not have the same columns as the first record",
                index
            ));
        }
    }
    Ok(())
}

/// A `multipart/form-data` body built from flat text fields.
///
/// Every part is a UTF-8 text value with no filename or per-part content
/// type, so the encoding reduces to boundary lines and a
/// `Content-Disposition` header per field. `ureq` has no multipart support
/// of its own. The boundary is lengthened until no value contains it.
#[derive(Clone, Debug)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<(String, String)>,
}

impl MultipartForm {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        let mut boundary = String::from("ddbms-form-boundary");
        while fields
            .iter()
            .any(|(name, value)| name.contains(&boundary) || value.contains(&boundary))
        {
            boundary.push_str("-x");
        }
        Self { boundary, fields }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn body(&self) -> String {
        let mut body = String::new();
        for (name, value) in &self.fields {
            body.push_str("--");
            body.push_str(&self.boundary);
            body.push_str("\r\nContent-Disposition: form-data; name=\"");
            body.push_str(&name.replace('"', "%22"));
            body.push_str("\"\r\n\r\n");
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str("--");
        body.push_str(&self.boundary);
        body.push_str("--\r\n");
        body
    }
}
