//! On-disk lifecycle of a site's directory tree and its domain alias.
//!
//! Creation and teardown are structural inverses. The alias is the only
//! domain-addressed state; everything else lives under the id-addressed root
//! and survives domain renames untouched.

use crate::paths::PathResolver;
use crate::site::Site;
use crate::write;
use tracing::info;

/// Creates the identifier-addressed root and every required subdirectory.
/// Idempotent: pre-existing directories are fine, which is what makes
/// duplicate deliveries of the initialization task harmless.
pub fn create_tree(paths: &PathResolver, site: &Site) -> write::Result<()> {
    write::ensure_dir(&paths.site_root(&site.uuid))?;
    for dir in paths.site_subdirectories(&site.uuid) {
        write::ensure_dir(&dir)?;
    }
    info!(site = %site.uuid, "initialized site directory tree");
    Ok(())
}

/// Points the site's domain at its id-addressed root. Fails soft if the
/// alias already exists.
pub fn bind_alias(paths: &PathResolver, site: &Site) -> write::Result<()> {
    write::ensure_dir(paths.by_domain_root())?;
    write::bind_alias(
        &paths.site_root(&site.uuid),
        &paths.domain_alias(&site.domain),
    );
    Ok(())
}

/// Removes the alias for `domain`. Fails soft if it is already gone.
pub fn unbind_alias(paths: &PathResolver, domain: &str) {
    write::unbind_alias(&paths.domain_alias(domain));
}

/// Removes the alias and the entire id-addressed tree. Used on site
/// deletion, which is why this takes an id/domain snapshot instead of a
/// [`Site`]: by the time the teardown task runs, the record is usually
/// already gone.
pub fn teardown(paths: &PathResolver, site: &uuid::Uuid, domain: &str) -> write::Result<()> {
    unbind_alias(paths, domain);
    write::remove_dir_recursive(&paths.site_root(site))?;
    info!(site = %site, "tore down site directory tree");
    Ok(())
}
