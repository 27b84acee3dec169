//! Extracted source model.
//!
//! These records are produced by an external extractor that resolves
//! identifiers on a best-effort basis. Names may be missing or ambiguous;
//! the helpers here apply the fallback rules every builder shares.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Simple name used for constructors.
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Marker the extractor puts in front of keys whose binding failed.
pub const NO_BINDING_PREFIX: &str = "NO_BINDING:";

/// A class (or interface/enum) from the analysed project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedClass {
    pub package_name: String,
    pub simple_name: String,
    /// May be empty when the extractor could not resolve the type.
    pub qualified_name: String,
    pub methods: Vec<ExtractedMethod>,
}

/// A method or constructor declared by an [`ExtractedClass`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedMethod {
    pub name: String,
    pub parameter_types: Vec<String>,
    /// Globally unique binding key, absent when binding failed.
    pub key: Option<String>,
    pub calls: Vec<Call>,
}

/// A call site inside a method body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Call {
    pub name: String,
    pub declaring_type: Option<String>,
    pub receiver_type: Option<String>,
    pub key: Option<String>,
    pub signature: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn bound_key(value: &Option<String>) -> Option<&str> {
    present(value).filter(|k| !k.starts_with(NO_BINDING_PREFIX))
}

impl ExtractedClass {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        let qualified_name = qualified_name.into();
        let (package_name, simple_name) = match qualified_name.rfind('.') {
            Some(dot) => (
                qualified_name[..dot].to_string(),
                qualified_name[dot + 1..].to_string(),
            ),
            None => (String::new(), qualified_name.clone()),
        };
        Self {
            package_name,
            simple_name,
            qualified_name,
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: ExtractedMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Identity used by every downstream algorithm: the qualified name, else
    /// `package.simple`, else the simple name alone.
    pub fn resolved_name(&self) -> String {
        if !self.qualified_name.is_empty() {
            self.qualified_name.clone()
        } else if !self.package_name.is_empty() {
            format!("{}.{}", self.package_name, self.simple_name)
        } else {
            self.simple_name.clone()
        }
    }

    /// Simple name for simple-name lookups; derived from the resolved name
    /// when the extractor left it empty.
    pub fn lookup_name(&self) -> String {
        if !self.simple_name.is_empty() {
            return self.simple_name.clone();
        }
        let resolved = self.resolved_name();
        match resolved.rfind('.') {
            Some(dot) => resolved[dot + 1..].to_string(),
            None => resolved,
        }
    }
}

impl ExtractedMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn constructor() -> Self {
        Self::new(CONSTRUCTOR_NAME)
    }

    pub fn with_parameters<I, S>(mut self, parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameter_types = parameter_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_call(mut self, call: Call) -> Self {
        self.calls.push(call);
        self
    }

    /// Binding key, ignoring empty keys and failed bindings.
    pub fn bound_key(&self) -> Option<&str> {
        bound_key(&self.key)
    }

    /// `name(T1,T2)`
    pub fn simple_signature(&self) -> String {
        format!("{}({})", self.name, self.parameter_types.join(","))
    }
}

impl Call {
    /// Call to `declaring_type.name`, the shape most extractors emit.
    pub fn to(declaring_type: impl Into<String>, name: impl Into<String>) -> Self {
        let declaring_type = declaring_type.into();
        Self {
            name: name.into(),
            receiver_type: Some(declaring_type.clone()),
            declaring_type: Some(declaring_type),
            key: None,
            signature: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_receiver(mut self, receiver_type: impl Into<String>) -> Self {
        self.receiver_type = Some(receiver_type.into());
        self
    }

    pub fn bound_key(&self) -> Option<&str> {
        bound_key(&self.key)
    }

    pub fn signature(&self) -> Option<&str> {
        present(&self.signature)
    }

    pub fn declaring_type(&self) -> Option<&str> {
        present(&self.declaring_type)
    }

    /// Key used to look the callee up among project methods: binding key,
    /// else qualified signature, else `Decl.name(?)`. `None` makes the call inert.
    pub fn callee_key(&self) -> Option<String> {
        if let Some(key) = self.bound_key() {
            return Some(key.to_string());
        }
        if let Some(sig) = self.signature() {
            return Some(sig.to_string());
        }
        match self.declaring_type() {
            Some(decl) if !self.name.is_empty() => Some(format!("{}.{}(?)", decl, self.name)),
            _ => None,
        }
    }

    /// Type the call lands on: declaring type, else static receiver type.
    ///
    /// Shared by the method-level external labels and the class-level graph.
    pub fn target_type(&self) -> Option<&str> {
        self.declaring_type().or_else(|| present(&self.receiver_type))
    }

    /// Best-effort signature for a callee outside the project.
    ///
    /// With neither a signature nor a target type this is the bare call
    /// name, not `name(...)`.
    pub fn external_signature(&self) -> String {
        if let Some(sig) = self.signature() {
            return sig.to_string();
        }
        match self.target_type() {
            Some(owner) => format!("{}.{}(...)", owner, self.name),
            None => self.name.clone(),
        }
    }
}

/// Reject classes that have no usable identity at all.
pub fn validate_classes(classes: &[ExtractedClass]) -> Result<()> {
    for (idx, class) in classes.iter().enumerate() {
        if class.resolved_name().is_empty() {
            return Err(AnalysisError::invalid(
                "classes",
                format!("class #{} has neither a qualified nor a simple name", idx),
            ));
        }
    }
    Ok(())
}
