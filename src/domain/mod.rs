//! Domain layer: DSM domains, page data and lookup results.
//!
//! Nothing here touches the network or the filesystem, except
//! [`registry::DomainRegistry::from_json_file`] reading a domain list.
//!
//! - [`entities`] - Domain configs, page data, cache records and lookup results
//! - [`registry`] - The set of configured domains and site roots

pub mod entities;
pub mod registry;
