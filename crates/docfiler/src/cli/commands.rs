//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::document::{DocumentPayload, Status};
use crate::search::SearchCriteria;

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Internal id of the document
    pub id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// The editable contents of a document, shared by `create` and `update`.
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Person or party the document concerns
    #[arg(long = "person")]
    pub person_name: Option<String>,

    /// Who authorized the document
    #[arg(long)]
    pub authorized_by: Option<String>,

    /// Approval status
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Type-specific field, repeatable (e.g. --field assetTag=LT001234)
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

impl DocumentArgs {
    /// Build the request payload these arguments describe, for `doc_type`
    /// when given.
    #[must_use]
    pub fn to_payload(&self, doc_type: Option<&str>) -> DocumentPayload {
        let mut payload = DocumentPayload {
            doc_type: doc_type.map(str::to_string),
            ..DocumentPayload::default()
        };
        if let Some(date) = &self.date {
            payload = payload.date(date.clone());
        }
        if let Some(name) = &self.person_name {
            payload = payload.person_name(name.clone());
        }
        if let Some(name) = &self.authorized_by {
            payload = payload.authorized_by(name.clone());
        }
        if let Some(status) = self.status {
            payload = payload.status(status.into());
        }
        for (name, value) in &self.fields {
            payload = payload.field(name.clone(), value.clone());
        }
        payload
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("field name missing in `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Create command arguments.
#[derive(Debug, Args)]
pub struct CreateCommand {
    /// Document type key (see `docfile types`)
    #[arg(value_name = "TYPE")]
    pub doc_type: String,

    /// Document contents
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Update command arguments.
///
/// Only the values given are changed; the rest keep their stored values.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Internal id of the document
    pub id: String,

    /// Change the document type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub doc_type: Option<String>,

    /// Changed document contents
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Internal id of the document
    pub id: String,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Substring of the person name or document code
    #[arg(short, long)]
    pub name: Option<String>,

    /// Exact document type key
    #[arg(short = 't', long = "type")]
    pub doc_type: Option<String>,

    /// Earliest document date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Latest document date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,

    /// Exact status
    #[arg(short, long, value_enum)]
    pub status: Option<StatusArg>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

impl SearchCommand {
    /// The search criteria these arguments describe.
    #[must_use]
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            name: self.name.clone(),
            doc_type: self.doc_type.clone(),
            date_from: self.from.clone(),
            date_to: self.to.clone(),
            status: self.status.map(Status::from),
        }
    }
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Types command arguments.
#[derive(Debug, Args)]
pub struct TypesCommand {
    /// Show the fields of one type
    pub key: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Status argument for filtering and editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Awaiting a decision
    Pending,
    /// Approved
    Approved,
    /// Rejected
    Rejected,
}

impl CreateCommand {
    /// The payload for the new document.
    #[must_use]
    pub fn payload(&self) -> DocumentPayload {
        self.document.to_payload(Some(&self.doc_type))
    }
}

impl UpdateCommand {
    /// The partial payload to lay over the stored document.
    #[must_use]
    pub fn payload(&self) -> DocumentPayload {
        self.document.to_payload(self.doc_type.as_deref())
    }
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Approved => Self::Approved,
            StatusArg::Rejected => Self::Rejected,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_args() -> DocumentArgs {
        DocumentArgs {
            date: Some("2024-01-15".to_string()),
            person_name: Some("John Doe".to_string()),
            authorized_by: Some("Manager Smith".to_string()),
            status: Some(StatusArg::Approved),
            fields: vec![("assetTag".to_string(), "LT001234".to_string())],
        }
    }

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(Status::from(StatusArg::Pending), Status::Pending);
        assert_eq!(Status::from(StatusArg::Approved), Status::Approved);
        assert_eq!(Status::from(StatusArg::Rejected), Status::Rejected);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("assetTag=LT001234").unwrap(),
            ("assetTag".to_string(), "LT001234".to_string())
        );
        assert_eq!(
            parse_field("purpose=a=b").unwrap(),
            ("purpose".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_field("notes=").unwrap(),
            ("notes".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_field_rejects_malformed() {
        assert!(parse_field("assetTag").is_err());
        assert!(parse_field("=value").is_err());
    }

    #[test]
    fn test_document_args_to_payload() {
        let payload = document_args().to_payload(Some("gate-pass"));
        let expected = DocumentPayload::new("gate-pass")
            .date("2024-01-15")
            .person_name("John Doe")
            .authorized_by("Manager Smith")
            .status(Status::Approved)
            .field("assetTag", "LT001234");
        assert_eq!(payload, expected);
    }

    #[test]
    fn test_document_args_minimal_payload() {
        let args = DocumentArgs {
            date: None,
            person_name: None,
            authorized_by: None,
            status: None,
            fields: Vec::new(),
        };
        assert_eq!(args.to_payload(Some("invoice")), DocumentPayload::new("invoice"));
        assert_eq!(args.to_payload(None), DocumentPayload::default());
    }

    #[test]
    fn test_update_payload_is_partial() {
        let cmd = UpdateCommand {
            id: "1".to_string(),
            doc_type: None,
            document: DocumentArgs {
                date: None,
                person_name: None,
                authorized_by: None,
                status: Some(StatusArg::Rejected),
                fields: Vec::new(),
            },
            format: OutputFormat::Plain,
        };
        assert_eq!(
            cmd.payload(),
            DocumentPayload::default().status(Status::Rejected)
        );
    }

    #[test]
    fn test_search_command_criteria() {
        let cmd = SearchCommand {
            name: Some("john".to_string()),
            doc_type: None,
            from: Some("2024-01-01".to_string()),
            to: None,
            status: Some(StatusArg::Pending),
            format: OutputFormat::Table,
        };
        let criteria = cmd.criteria();
        assert_eq!(criteria.name.as_deref(), Some("john"));
        assert_eq!(criteria.date_from.as_deref(), Some("2024-01-01"));
        assert_eq!(criteria.status, Some(Status::Pending));
        assert!(criteria.doc_type.is_none());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
