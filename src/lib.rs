pub mod binder;
pub mod document;
mod error;
pub mod linked;
pub mod provider;
pub mod section;

pub use binder::{BindOptions, BindReport, Bindable, Binder, Field};
pub use document::{DocumentOptions, ManagedDocument};
pub use error::Error;
pub use linked::LinkedDocuments;
pub use provider::ProviderRegistry;
pub use section::{KeyPath, Section, Table, Value};
