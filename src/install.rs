//! Installing activation gates into a page.
//!
//! Decides, per element id, whether a gate is bound now, deferred until the
//! document finishes parsing, skipped because it already exists, or refused
//! because the element never appeared. The browser binding supplies the
//! document and the bind/defer actions; everything here is host-agnostic.

use std::{cell::RefCell, collections::HashSet, fmt};
use thiserror::Error;

/// The parts of a page the installer needs to look at.
pub trait PageDocument {
    type Element;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// True while the document is still being parsed.
    fn is_loading(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A gate was bound to the element by this call.
    Installed,
    /// A gate already exists for this id; nothing was done.
    AlreadyInstalled,
    /// The element is not parsed yet; installation will retry once loaded.
    Deferred,
}

#[derive(Debug, Error, PartialEq)]
pub enum InstallError<E: fmt::Debug> {
    #[error("no element with id `{0}` in the document")]
    MissingElement(String),
    #[error("host rejected the listener: {0:?}")]
    Host(E),
}

/// Element ids that already carry a gate, for one document.
#[derive(Debug, Default)]
pub struct InstallRegistry {
    installed: RefCell<HashSet<String>>,
}

impl InstallRegistry {
    pub fn is_installed(&self, id: &str) -> bool {
        self.installed.borrow().contains(id)
    }

    /// Installs a gate for `id` at most once.
    ///
    /// `bind` runs when the element exists and records the id on success.
    /// `defer` runs when the element is missing but the document is still
    /// loading; it should arrange for `install` to be called again later.
    pub fn install<D, B, W, E>(
        &self,
        document: &D,
        id: &str,
        bind: B,
        defer: W,
    ) -> Result<InstallOutcome, InstallError<E>>
    where
        D: PageDocument,
        B: FnOnce(D::Element) -> Result<(), E>,
        W: FnOnce() -> Result<(), E>,
        E: fmt::Debug,
    {
        if self.is_installed(id) {
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        match document.element_by_id(id) {
            Some(element) => {
                bind(element).map_err(InstallError::Host)?;
                self.installed.borrow_mut().insert(id.to_owned());
                Ok(InstallOutcome::Installed)
            }
            None if document.is_loading() => {
                defer().map_err(InstallError::Host)?;
                Ok(InstallOutcome::Deferred)
            }
            None => Err(InstallError::MissingElement(id.to_owned())),
        }
    }
}
