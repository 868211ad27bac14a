//! The built-in document type registry.
//!
//! Each document type is identified by a type key such as `gate-pass` and
//! describes the extra fields a record of that type carries on top of the
//! common ones. The table is static and never changes at runtime.

use serde::Serialize;

/// The input kind of a type-specific field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line free text.
    Text,
    /// Multi-line free text.
    Textarea,
    /// A decimal number.
    Number,
    /// A calendar date in `YYYY-MM-DD` form.
    Date,
    /// One value out of a fixed list of options.
    Select,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Textarea => write!(f, "textarea"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
            Self::Select => write!(f, "select"),
        }
    }
}

/// A single type-specific field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Field name, unique within its type. Used as the JSON key.
    pub name: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// How the value is entered and checked.
    pub kind: FieldKind,
    /// Whether a create or update must supply a value.
    pub required: bool,
    /// Allowed values. Only non-empty for [`FieldKind::Select`].
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
}

/// A document type and its ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTypeDescriptor {
    /// The type key, e.g. `gate-pass`.
    pub key: &'static str,
    /// Human-readable name, e.g. `Gate Pass`.
    pub name: &'static str,
    /// Fields in display order.
    pub fields: &'static [FieldDescriptor],
}

impl DocumentTypeDescriptor {
    /// Look up a field of this type by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor {
        name,
        label,
        kind,
        required: true,
        options: &[],
    }
}

const fn select(
    name: &'static str,
    label: &'static str,
    options: &'static [&'static str],
) -> FieldDescriptor {
    FieldDescriptor {
        name,
        label,
        kind: FieldKind::Select,
        required: true,
        options,
    }
}

static DOCUMENT_TYPES: &[DocumentTypeDescriptor] = &[
    DocumentTypeDescriptor {
        key: "gate-pass",
        name: "Gate Pass",
        fields: &[
            select(
                "assetType",
                "Asset Type",
                &["Laptop", "Desktop", "Printer", "Monitor", "Other"],
            ),
            field("assetTag", "Asset Tag/Serial Number", FieldKind::Text),
            field("exitDate", "Exit Date", FieldKind::Date),
            field("returnDate", "Expected Return Date", FieldKind::Date),
            field("purpose", "Purpose/Reason", FieldKind::Textarea),
        ],
    },
    DocumentTypeDescriptor {
        key: "job-card",
        name: "Job Card",
        fields: &[
            field("jobTitle", "Job Title", FieldKind::Text),
            select("priority", "Priority", &["Low", "Medium", "High", "Critical"]),
            field("assignedTo", "Assigned To", FieldKind::Text),
            field("dueDate", "Due Date", FieldKind::Date),
            field("description", "Job Description", FieldKind::Textarea),
        ],
    },
    DocumentTypeDescriptor {
        key: "invoice",
        name: "Invoice",
        fields: &[
            field("invoiceNumber", "Invoice Number", FieldKind::Text),
            field("clientName", "Client Name", FieldKind::Text),
            field("amount", "Amount", FieldKind::Number),
            field("dueDate", "Due Date", FieldKind::Date),
            field("description", "Service Description", FieldKind::Textarea),
        ],
    },
    DocumentTypeDescriptor {
        key: "asset-movement",
        name: "Asset Movement",
        fields: &[
            field("assetName", "Asset Name", FieldKind::Text),
            field("fromLocation", "From Location", FieldKind::Text),
            field("toLocation", "To Location", FieldKind::Text),
            field("movementDate", "Movement Date", FieldKind::Date),
            field("reason", "Reason for Movement", FieldKind::Textarea),
        ],
    },
    DocumentTypeDescriptor {
        key: "score-card",
        name: "Score Card",
        fields: &[
            field("employeeName", "Employee Name", FieldKind::Text),
            field("period", "Review Period", FieldKind::Text),
            field("score", "Overall Score", FieldKind::Number),
            field("reviewer", "Reviewer", FieldKind::Text),
            field("comments", "Comments", FieldKind::Textarea),
        ],
    },
];

/// Look up the descriptor for a type key.
#[must_use]
pub fn describe(type_key: &str) -> Option<&'static DocumentTypeDescriptor> {
    DOCUMENT_TYPES.iter().find(|t| t.key == type_key)
}

/// All built-in descriptors in declaration order.
#[must_use]
pub fn all() -> &'static [DocumentTypeDescriptor] {
    DOCUMENT_TYPES
}

/// The human-readable name for a type key, or the key itself when unknown.
#[must_use]
pub fn display_name(type_key: &str) -> &str {
    describe(type_key).map_or(type_key, |t| t.name)
}
