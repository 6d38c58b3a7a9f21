//! Command handlers, one module per subcommand.
//!
//! Handlers take parsed arguments plus the loaded [`AppConfig`] and write
//! through the [`OutputManager`]. Services are wired here so every handler
//! sees the same factory.

use std::rc::Rc;

use caffa_adapters::{JsonObjectSerializer, LocalDocumentStorage, register_builtin_classes};
use caffa_core::{
    application::{ClassService, DocumentService},
    domain::DefaultObjectFactory,
    error::CaffaError,
};

use crate::{config::AppConfig, error::CliResult};

pub mod classes;
pub mod completions;
pub mod config;
pub mod describe;
pub mod init;
pub mod inspect;
pub mod new;

/// Factory holding every class the CLI knows.
pub(crate) fn class_factory() -> CliResult<Rc<DefaultObjectFactory>> {
    let mut factory = DefaultObjectFactory::new();
    register_builtin_classes(&mut factory).map_err(CaffaError::from)?;
    Ok(Rc::new(factory))
}

pub(crate) fn class_service() -> CliResult<ClassService> {
    Ok(ClassService::new(class_factory()?))
}

/// Document service over the local filesystem.
pub(crate) fn document_service(config: &AppConfig) -> CliResult<DocumentService> {
    Ok(DocumentService::new(
        Box::new(JsonObjectSerializer::new().with_pretty(config.io.pretty)),
        Box::new(LocalDocumentStorage::new()),
        class_factory()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use caffa_adapters::builtin_classes::BUILTIN_CLASSES;
    use caffa_core::domain::ObjectFactory;

    #[test]
    fn factory_knows_every_builtin_class() {
        let factory = class_factory().unwrap();
        for keyword in BUILTIN_CLASSES {
            assert!(factory.create(keyword).is_some(), "{keyword} missing");
        }
    }
}
