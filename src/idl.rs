//! Interface-definition units.
//!
//! An interface definition lists the operations a backend exposes, grouped by
//! service, with their parameter names and types:
//!
//! ```yaml
//! package: shop
//! services:
//!   - name: Items
//!     operations:
//!       - name: get
//!         params:
//!           - { name: id, type: i64 }
//!         returns: Item
//! ```
//!
//! The fully-qualified name of the operation above is `shop.Items.get`. Names must
//! be unique across every unit loaded for one manifest.

use crate::error::CompileError;
use crate::spec::{load_document, ParamType};
use crate::validator::ValidationIssue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionUnit {
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub services: Vec<ServiceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDef {
    pub name: String,
    #[serde(default)]
    pub operations: Vec<OperationDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDef {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDef>,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParam {
    pub name: String,
    pub ty: ParamType,
}

/// Resolved signature of one backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    pub fully_qualified_name: String,
    pub parameters: Vec<SignatureParam>,
    pub returns: Option<String>,
}

impl OperationSignature {
    pub fn param(&self, name: &str) -> Option<&SignatureParam> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Read one interface-definition unit from disk.
pub fn load_unit(path: &Path) -> Result<DefinitionUnit, CompileError> {
    let unit: DefinitionUnit = load_document(path)?;
    debug!(
        unit = %path.display(),
        package = %unit.package,
        services = unit.services.len(),
        "Interface definition loaded"
    );
    Ok(unit)
}

fn qualify(package: &str, service: &str, operation: &str) -> String {
    if package.is_empty() {
        format!("{service}.{operation}")
    } else {
        format!("{package}.{service}.{operation}")
    }
}

/// Every operation signature visible to one compilation, keyed by fully-qualified name.
#[derive(Debug, Clone, Default)]
pub struct SignatureSet {
    signatures: HashMap<String, (OperationSignature, PathBuf)>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the operations of a unit.
    ///
    /// Unknown parameter types, repeated parameter names and names already defined
    /// by an earlier unit are recorded as issues; the offending operation is skipped.
    pub fn add_unit(
        &mut self,
        origin: &Path,
        unit: &DefinitionUnit,
        issues: &mut Vec<ValidationIssue>,
    ) {
        for service in &unit.services {
            for op in &service.operations {
                let fqn = qualify(&unit.package, &service.name, &op.name);
                let location = format!("{}: {fqn}", origin.display());

                let mut ok = true;
                let mut parameters = Vec::with_capacity(op.params.len());
                for p in &op.params {
                    if parameters.iter().any(|s: &SignatureParam| s.name == p.name) {
                        issues.push(ValidationIssue::new(
                            &location,
                            "DuplicateParameter",
                            format!("parameter '{}' is declared more than once", p.name),
                        ));
                        ok = false;
                        continue;
                    }
                    match p.ty.parse::<ParamType>() {
                        Ok(ty) => parameters.push(SignatureParam {
                            name: p.name.clone(),
                            ty,
                        }),
                        Err(e) => {
                            issues.push(ValidationIssue::new(
                                &location,
                                "UnknownType",
                                format!("parameter '{}': {e}", p.name),
                            ));
                            ok = false;
                        }
                    }
                }

                if let Some((_, first)) = self.signatures.get(&fqn) {
                    issues.push(ValidationIssue::new(
                        &location,
                        "DuplicateOperation",
                        format!("operation is already defined in {}", first.display()),
                    ));
                    continue;
                }
                if !ok {
                    continue;
                }

                self.signatures.insert(
                    fqn.clone(),
                    (
                        OperationSignature {
                            fully_qualified_name: fqn,
                            parameters,
                            returns: op.returns.clone(),
                        },
                        origin.to_path_buf(),
                    ),
                );
            }
        }
    }

    /// Add an already-resolved signature (used when signatures come from elsewhere than a file).
    pub fn insert(&mut self, signature: OperationSignature) {
        self.signatures.insert(
            signature.fully_qualified_name.clone(),
            (signature, PathBuf::new()),
        );
    }

    pub fn get(&self, fully_qualified_name: &str) -> Option<&OperationSignature> {
        self.signatures.get(fully_qualified_name).map(|(s, _)| s)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
