use crate::cddb::error::MetadataResult;
use crate::cddb::models::DiscMetadata;
use crate::toc::TableOfContents;
use std::future::Future;

pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod response;

pub use client::CddbClient;
pub use models::lookup_track;

/// Source of album and track titles for a disc layout.
pub trait MetadataProvider: Send + Sync + 'static {
    fn fetch(
        &self,
        toc: &TableOfContents,
    ) -> impl Future<Output = MetadataResult<DiscMetadata>> + Send;
}
