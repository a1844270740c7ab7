//! Static descriptions of model types
//!
//! The resolver never looks at live Rust types. A build step (or a test) describes
//! every model, nested value type, mapper and adapter as a [`TypeDescriptor`] and
//! collects them into a [`TypeCatalog`].

use crate::annotations::Annotation;
use crate::error::{ArchError, ArchResult};
use crate::naming;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// TYPE NAMES
// ============================================================================

/// Fully qualified type path, the identity of a described type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn simple_name(&self) -> &str {
        naming::simple_name(&self.0)
    }

    /// A type in the same module: `app::Point` + `PointJdbcAdapter`.
    pub fn sibling(&self, simple_name: &str) -> TypeName {
        match self.0.rsplit_once("::") {
            Some((module, _)) => TypeName(format!("{module}::{simple_name}")),
            None => TypeName(simple_name.to_string()),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(path: &str) -> Self {
        TypeName::new(path)
    }
}

// ============================================================================
// TYPE REFERENCES
// ============================================================================

const ARRAY_PATH: &str = "[]";
const TRAIT_OBJECT_PREFIX: &str = "dyn ";

/// A type as written at a use site: a path plus generic arguments.
///
/// References are transparent (`&str` is `str`), slices and arrays are kept
/// as the `[]` path with the element type as their only argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    path: String,
    args: Vec<TypeRef>,
}

impl TypeRef {
    pub fn of(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
        }
    }

    pub fn generic(path: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    pub fn parse(text: &str) -> ArchResult<Self> {
        let invalid = || ArchError::InvalidTypeRef { text: text.to_string() };
        let text = text.trim();
        if text.is_empty() {
            return Err(invalid());
        }

        if let Some(rest) = text.strip_prefix('&') {
            let rest = rest.trim_start();
            let rest = match rest.strip_prefix('\'') {
                Some(lifetime) => lifetime
                    .split_once(char::is_whitespace)
                    .map(|(_, r)| r)
                    .ok_or_else(invalid)?,
                None => rest,
            };
            let rest = rest.strip_prefix("mut ").unwrap_or(rest);
            return Self::parse(rest);
        }

        if let Some(inner) = text.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(invalid)?;
            let element = match split_top_level(inner, ';')?.as_slice() {
                [element] | [element, _] => Self::parse(element)?,
                _ => return Err(invalid()),
            };
            return Ok(Self::generic(ARRAY_PATH, vec![element]));
        }

        match text.find('<') {
            Some(open) => {
                let inner = text[open + 1..].strip_suffix('>').ok_or_else(invalid)?;
                let path = text[..open].trim();
                check_path(path).ok_or_else(invalid)?;
                let args = split_top_level(inner, ',')?
                    .into_iter()
                    .map(Self::parse)
                    .collect::<ArchResult<Vec<_>>>()?;
                Ok(Self::generic(path, args))
            }
            None => {
                check_path(text).ok_or_else(invalid)?;
                Ok(Self::of(text))
            }
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn args(&self) -> &[TypeRef] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&TypeRef> {
        self.args.get(index)
    }

    pub fn simple_name(&self) -> &str {
        naming::simple_name(self.path.trim_start_matches(TRAIT_OBJECT_PREFIX))
    }

    pub fn type_name(&self) -> TypeName {
        TypeName::new(self.path.clone())
    }

    pub fn is_array(&self) -> bool {
        self.path == ARRAY_PATH
    }

    pub fn is_trait_object(&self) -> bool {
        self.path.starts_with(TRAIT_OBJECT_PREFIX)
            || (self.simple_name() == "Box" && self.arg(0).is_some_and(TypeRef::is_trait_object))
    }

    pub fn is_any(&self) -> bool {
        self.simple_name() == "Any"
            || (self.simple_name() == "Box" && self.arg(0).is_some_and(TypeRef::is_any))
    }

    /// `Option<T>` yields `T`.
    pub fn option_inner(&self) -> Option<&TypeRef> {
        match (self.simple_name(), self.args.as_slice()) {
            ("Option", [inner]) => Some(inner),
            _ => None,
        }
    }

    /// `Cell<T>` yields `T`.
    pub fn cell_inner(&self) -> Option<&TypeRef> {
        match (self.simple_name(), self.args.as_slice()) {
            ("Cell", [inner]) => Some(inner),
            _ => None,
        }
    }
}

fn check_path(path: &str) -> Option<()> {
    let bare = path.strip_prefix(TRAIT_OBJECT_PREFIX).unwrap_or(path);
    let valid = !bare.is_empty()
        && bare
            .split("::")
            .all(|segment| naming::is_valid_identifier(segment.trim()));
    valid.then_some(())
}

fn split_top_level(text: &str, separator: char) -> ArchResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
        if depth < 0 {
            return Err(ArchError::InvalidTypeRef { text: text.to_string() });
        }
    }
    if depth != 0 {
        return Err(ArchError::InvalidTypeRef { text: text.to_string() });
    }
    parts.push(text[start..].trim());
    Ok(parts)
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array() {
            return match self.arg(0) {
                Some(element) => write!(f, "[{element}]"),
                None => f.write_str("[]"),
            };
        }
        f.write_str(&self.path)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        Ok(())
    }
}

impl TryFrom<String> for TypeRef {
    type Error = ArchError;

    fn try_from(text: String) -> ArchResult<Self> {
        TypeRef::parse(&text)
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Struct,
    Enum,
    Trait,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: TypeRef,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl FieldDescriptor {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub params: Vec<ParamDescriptor>,
    #[serde(default)]
    pub returns: Option<TypeRef>,
}

/// Model-level declaration: the type becomes a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelAnnotation {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub sql_name: Option<String>,
    #[serde(default)]
    pub table_type_name: Option<String>,
    #[serde(default)]
    pub exposed_as: Option<TypeName>,
}

/// Marks a model as a many-to-many bridge between two of its foreign fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeDeclaration {
    pub left: String,
    pub right: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: TypeName,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    #[serde(default)]
    pub implements: Vec<TypeRef>,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub model: Option<ModelAnnotation>,
    #[serde(default)]
    pub adapts: Vec<TypeName>,
    #[serde(default)]
    pub bridge: Option<BridgeDeclaration>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<TypeName>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            methods: Vec::new(),
            implements: Vec::new(),
            variants: Vec::new(),
            model: None,
            adapts: Vec::new(),
            bridge: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn is_trait(&self) -> bool {
        self.kind == TypeKind::Trait
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MethodDescriptor> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// The first implemented trait with the given simple name.
    pub fn implemented(&self, simple_name: &str) -> Option<&TypeRef> {
        self.implements.iter().find(|t| t.simple_name() == simple_name)
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Every described type of a run, keyed by its path.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: Vec<TypeDescriptor>,
    index: HashMap<TypeName, usize>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: TypeDescriptor) -> ArchResult<()> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ArchError::DuplicateInput {
                key: descriptor.name.to_string(),
            });
        }
        self.index.insert(descriptor.name.clone(), self.types.len());
        self.types.push(descriptor);
        Ok(())
    }

    pub fn with(mut self, descriptor: TypeDescriptor) -> ArchResult<Self> {
        self.insert(descriptor)?;
        Ok(self)
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = TypeDescriptor>) -> ArchResult<Self> {
        descriptors.into_iter().try_fold(Self::new(), Self::with)
    }

    /// Reads a JSON array of descriptors.
    pub fn from_json(json: &str) -> ArchResult<Self> {
        let descriptors: Vec<TypeDescriptor> =
            serde_json::from_str(json).map_err(|e| ArchError::InvalidCatalog { reason: e.to_string() })?;
        Self::from_descriptors(descriptors)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.types)
    }

    pub fn get(&self, name: &TypeName) -> Option<&TypeDescriptor> {
        self.index.get(name).map(|&i| &self.types[i])
    }

    pub fn get_ref(&self, ty: &TypeRef) -> Option<&TypeDescriptor> {
        self.get(&ty.type_name())
    }

    pub fn require(&self, name: &TypeName) -> ArchResult<&TypeDescriptor> {
        self.get(name).ok_or_else(|| ArchError::UnknownType { ty: name.to_string() })
    }

    pub fn find_by_simple_name<'a>(&'a self, simple_name: &'a str) -> impl Iterator<Item = &'a TypeDescriptor> {
        self.types.iter().filter(move |t| t.simple_name() == simple_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
