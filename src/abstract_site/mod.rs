mod local_snapshot;
mod site_interface;

pub use local_snapshot::make_local_site;
pub use site_interface::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};
