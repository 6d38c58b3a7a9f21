//! Callable methods exposed by objects.

use std::fmt;
use std::rc::Rc;

use crate::domain::data_type::PortableValue;
use crate::domain::error::DomainError;
use crate::domain::object::ObjectHandle;

/// Whether calling the method may change the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    ReadWrite,
    ReadOnly,
}

type Callback =
    Rc<dyn Fn(&mut dyn ObjectHandle, &[PortableValue]) -> Result<PortableValue, DomainError>>;

/// A named operation on an object, callable with portable arguments.
#[derive(Clone)]
pub struct MethodHandle {
    keyword: String,
    kind: MethodKind,
    documentation: String,
    argument_names: Vec<String>,
    callback: Callback,
}

impl MethodHandle {
    pub fn new<F>(kind: MethodKind, callback: F) -> Self
    where
        F: Fn(&mut dyn ObjectHandle, &[PortableValue]) -> Result<PortableValue, DomainError>
            + 'static,
    {
        Self {
            keyword: String::new(),
            kind,
            documentation: String::new(),
            argument_names: Vec::new(),
            callback: Rc::new(callback),
        }
    }

    pub fn with_doc(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn with_arguments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argument_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn argument_names(&self) -> &[String] {
        &self.argument_names
    }

    pub(crate) fn bind(&mut self, keyword: &str) {
        self.keyword = keyword.to_string();
    }

    /// Call the method on `object`.
    ///
    /// The argument count must match [`Self::argument_names`].
    pub fn execute(
        &self,
        object: &mut dyn ObjectHandle,
        arguments: &[PortableValue],
    ) -> Result<PortableValue, DomainError> {
        if arguments.len() != self.argument_names.len() {
            return Err(DomainError::MethodFailed {
                method: self.keyword.clone(),
                reason: format!(
                    "expected {} argument(s), got {}",
                    self.argument_names.len(),
                    arguments.len()
                ),
            });
        }
        (self.callback)(object, arguments)
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("keyword", &self.keyword)
            .field("kind", &self.kind)
            .field("arguments", &self.argument_names)
            .finish()
    }
}
