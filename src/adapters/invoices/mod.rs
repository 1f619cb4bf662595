//! Local invoice tree
//!
//! Invoices live in one directory per patient reference number:
//! `<root>/<reference>/*.pdf`.

pub mod locator;

pub use locator::FsInvoiceLocator;

use crate::domain::{InvoiceFile, ReferenceNumber, Result};

/// Maps a reference number to the invoice files waiting to be uploaded
pub trait InvoiceLocator: Send + Sync {
    /// Files for one reference, in a deterministic order
    ///
    /// An absent directory or an empty match is `Ok(vec![])`, not an error.
    fn invoices_for(&self, reference: &ReferenceNumber) -> Result<Vec<InvoiceFile>>;

    /// Confirms the invoice root can be listed
    ///
    /// An absent root is not an error: no patient has invoices.
    fn check_root(&self) -> Result<()> {
        Ok(())
    }
}
