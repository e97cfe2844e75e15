//! Defines the violation types reported by the validator.
use serde::Serialize;

/// The specific category of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A malformed field, bound, duplicate id or unparseable equation.
    StructuralError,
    /// An id outside the domain's allowed set for its kind.
    IdentifierNotAllowed,
    /// A flow endpoint or equation name that resolves to nothing declared.
    UnknownReference,
    ForbiddenEdge,
    ForbiddenFunction,
    MissingMandatoryIntermediate,
    MissingRequiredDependency,
    DependencyCycle,
    UnknownDomain,
}

impl ViolationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::StructuralError => "structural_error",
            ViolationKind::IdentifierNotAllowed => "identifier_not_allowed",
            ViolationKind::UnknownReference => "unknown_reference",
            ViolationKind::ForbiddenEdge => "forbidden_edge",
            ViolationKind::ForbiddenFunction => "forbidden_function",
            ViolationKind::MissingMandatoryIntermediate => "missing_mandatory_intermediate",
            ViolationKind::MissingRequiredDependency => "missing_required_dependency",
            ViolationKind::DependencyCycle => "dependency_cycle",
            ViolationKind::UnknownDomain => "unknown_domain",
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured report of one rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// A human-readable message explaining the violation.
    pub message: String,
    /// The declaration the violation is attached to, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offending_id: Option<String>,
    /// Other identifiers involved: the allowed set, the unresolved names, the
    /// other end of an edge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), offending_id: None, related: Vec::new() }
    }

    pub fn at(mut self, id: impl Into<String>) -> Self {
        self.offending_id = Some(id.into());
        self
    }

    pub fn with_related<I, S>(mut self, related: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.related = related.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
