//! CLI command implementations
//!
//! Each command loads the configuration, boots the schema registry and the
//! store, reads at most one JSON document from stdin and writes one JSON
//! response to stdout. Rejections are written as error responses and also
//! returned as errors so the process exits non-zero.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::{Config, LogFormat};
use crate::entity::{EntityError, EntityService, WriteContext};
use crate::observability::init_logging;
use crate::relations::{RelationError, RelationValidator};
use crate::schema::SchemaRegistry;
use crate::store::MemoryStore;
use crate::webhooks::WebhookForm;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_error_details, write_response};

/// Booted registry and store
struct Workspace {
    config: Config,
    registry: SchemaRegistry,
    store: MemoryStore,
}

impl Workspace {
    /// Load the config, install logging, then load schemas and data.
    fn boot(config_path: &Path) -> CliResult<Self> {
        let config = Config::load(config_path)?;
        init_logging(config.log_format, &config.log_level);

        let mut registry = SchemaRegistry::new(&config.schema_dir);
        registry.load_all()?;

        let store = match &config.data_file {
            Some(path) if path.exists() => MemoryStore::load(path)?,
            _ => MemoryStore::new(),
        };

        info!(
            schemas = registry.len(),
            schema_dir = %config.schema_dir.display(),
            "workspace booted"
        );
        Ok(Self {
            config,
            registry,
            store,
        })
    }

    fn data_file(&self) -> CliResult<&Path> {
        self.config
            .data_file
            .as_deref()
            .ok_or_else(|| CliError::config_error("data_file is required for writes"))
    }
}

/// Run the CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Validate {
            config,
            schema,
            all,
        } => validate(&config, &schema, all),
        Command::Collect { config, schema } => collect(&config, &schema),
        Command::Create { config, schema } => create(&config, &schema),
        Command::Update { config, schema, id } => update(&config, &schema, id),
        Command::Schemas { config } => schemas(&config),
        Command::WebhookCheck { draft_and_publish } => webhook_check(draft_and_publish),
    }
}

/// Validate the relations of a stdin payload
pub fn validate(config_path: &Path, uid: &str, all: bool) -> CliResult<()> {
    let workspace = Workspace::boot(config_path)?;
    let payload = read_request()?;
    respond(validate_payload(&workspace, uid, &payload, all))
}

/// Print collected references without touching storage
pub fn collect(config_path: &Path, uid: &str) -> CliResult<()> {
    let workspace = Workspace::boot(config_path)?;
    let payload = read_request()?;
    respond(collect_payload(&workspace, uid, &payload))
}

/// Validate and insert an entry, then save the data file
pub fn create(config_path: &Path, uid: &str) -> CliResult<()> {
    let workspace = Workspace::boot(config_path)?;
    let payload = read_request()?;
    respond(write_entry(workspace, uid, None, payload))
}

/// Validate and update an entry, then save the data file
pub fn update(config_path: &Path, uid: &str, id: u64) -> CliResult<()> {
    let workspace = Workspace::boot(config_path)?;
    let payload = read_request()?;
    respond(write_entry(workspace, uid, Some(id), payload))
}

/// List registered content type uids
pub fn schemas(config_path: &Path) -> CliResult<()> {
    let workspace = Workspace::boot(config_path)?;
    let uids: Vec<&str> = workspace.registry.uids().collect();
    write_response(json!(uids))
}

/// Validate a stdin webhook form
pub fn webhook_check(draft_and_publish: bool) -> CliResult<()> {
    init_logging(LogFormat::default(), "info");
    let payload = read_request()?;
    respond(check_webhook(payload, draft_and_publish))
}

/// Outcome of a command before it is written out
enum Reply {
    Ok(Value),
    Rejected {
        code: String,
        message: String,
        details: Option<Value>,
    },
}

fn respond(reply: CliResult<Reply>) -> CliResult<()> {
    match reply? {
        Reply::Ok(data) => write_response(data),
        Reply::Rejected {
            code,
            message,
            details,
        } => {
            match details {
                Some(details) => write_error_details(&code, &message, details)?,
                None => write_error(&code, &message)?,
            }
            Err(CliError::rejected(message))
        }
    }
}

fn block_on<F: Future>(future: F) -> CliResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

fn validate_payload(
    workspace: &Workspace,
    uid: &str,
    payload: &Value,
    all: bool,
) -> CliResult<Reply> {
    let options = workspace.config.collect_options();
    let validator = RelationValidator::new(&workspace.registry, &workspace.store, &options);

    if all {
        let outcome = match block_on(validator.check(payload, uid))? {
            Ok(outcome) => outcome,
            Err(e) => return relation_rejection(e),
        };
        let details = serde_json::to_value(outcome.missing())?;
        return match outcome.into_result() {
            Ok(()) => Ok(Reply::Ok(json!({ "valid": true }))),
            Err(e) => Ok(Reply::Rejected {
                code: e.code().into(),
                message: e.to_string(),
                details: Some(details),
            }),
        };
    }

    match block_on(validator.validate(payload, uid))? {
        Ok(()) => Ok(Reply::Ok(json!({ "valid": true }))),
        Err(e) => relation_rejection(e),
    }
}

fn collect_payload(workspace: &Workspace, uid: &str, payload: &Value) -> CliResult<Reply> {
    let options = workspace.config.collect_options();
    let validator = RelationValidator::new(&workspace.registry, &workspace.store, &options);
    match validator.collect(payload, uid) {
        Ok(buckets) => Ok(Reply::Ok(buckets.to_json())),
        Err(e) => relation_rejection(e),
    }
}

fn relation_rejection(e: RelationError) -> CliResult<Reply> {
    if !e.is_client_error() {
        return Err(CliError::data_error(e.to_string()));
    }
    Ok(Reply::Rejected {
        code: e.code().into(),
        message: e.to_string(),
        details: None,
    })
}

fn write_entry(
    workspace: Workspace,
    uid: &str,
    id: Option<u64>,
    payload: Value,
) -> CliResult<Reply> {
    let data_file = workspace.data_file()?.to_path_buf();
    let options = workspace.config.collect_options();
    let store = Arc::new(workspace.store);
    let service = EntityService::new(Arc::new(workspace.registry), Arc::clone(&store), options);
    let ctx = WriteContext::new();

    let result = block_on(async {
        match id {
            None => service.create(&ctx, uid, payload).await,
            Some(id) => service.update(&ctx, uid, id, payload).await,
        }
    })?;

    match result {
        Ok(entity) => {
            store.save(&data_file)?;
            debug!(path = %data_file.display(), "data file saved");
            Ok(Reply::Ok(entity))
        }
        Err(e) if e.is_application_error() => Ok(Reply::Rejected {
            code: e.code().into(),
            message: e.to_string(),
            details: None,
        }),
        Err(EntityError::Store(e)) => Err(e.into()),
        Err(e) => Err(CliError::data_error(e.to_string())),
    }
}

fn check_webhook(payload: Value, draft_and_publish: bool) -> CliResult<Reply> {
    let form: WebhookForm = serde_json::from_value(payload)?;
    match form.validate(draft_and_publish) {
        Ok(()) => Ok(Reply::Ok(serde_json::to_value(form.into_webhook(None))?)),
        Err(errors) => Ok(Reply::Rejected {
            code: "AERO_CMS_WEBHOOK_INVALID".into(),
            message: errors.to_string(),
            details: Some(serde_json::to_value(errors.fields())?),
        }),
    }
}
