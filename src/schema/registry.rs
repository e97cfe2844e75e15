//! Process-wide lookup of domain schemas. The table is static; new domains
//! need a code change.
use super::domain::{Domain, DomainSchema, SchemaError};

pub fn get(domain_name: &str) -> Result<&'static DomainSchema, SchemaError> {
    Ok(domain_name.parse::<Domain>()?.schema())
}

pub fn all() -> impl Iterator<Item = &'static DomainSchema> {
    Domain::ALL.into_iter().map(Domain::schema)
}
