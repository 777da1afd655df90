/*
 * bundle.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Bundle-wide permissions.
 */

use super::permission::{Permission, parse_permissions};
use super::{PERMISSIONS_KEY, permission_entries, resource_pattern, rewrite_permissions};
use crate::mutator::{Mutator, MutatorContext};
use crate::settings::PermissionSettings;
use crate::{Error, Result};
use bundle_dyn::{Kind, Location, Path, Value, ValueKind, visit_by_pattern};
use bundle_error_reporting::{DiagnosticMessage, DiagnosticMessageBuilder, Diagnostics};

/// Copy the top-level `permissions` list onto every resource.
///
/// Levels are validated against the allow-list before anything is
/// touched, then translated per resource type. A resource type with no
/// translation for a level does not get that entry, and a type missing
/// from the table gets nothing. When a resource already grants the same
/// principal a different level, the resource's own entry wins and a
/// warning is recorded. A bundle-wide owner is not added to a resource
/// that already has an owner, declared or added earlier in the pass.
pub struct ApplyBundlePermissions;

impl Mutator for ApplyBundlePermissions {
    fn name(&self) -> &str {
        "ApplyBundlePermissions"
    }

    fn apply(&self, tree: Value, ctx: &mut MutatorContext) -> Result<Value> {
        let MutatorContext {
            settings,
            diagnostics,
            ..
        } = ctx;
        let settings = &settings.permissions;

        let bundle = bundle_permissions(&tree, settings)?;
        if bundle.is_empty() {
            return Ok(tree);
        }

        let mut tree = tree;
        for resource_type in settings.resource_types.keys() {
            let pattern = resource_pattern(Some(resource_type.as_str()));
            tree = rewrite_permissions(tree, &pattern, |path, entries| {
                let plan = plan_resource(resource_type, path, entries, &bundle, settings)?;
                diagnostics.extend(plan.warnings);
                if plan.added.is_empty() {
                    return Ok(None);
                }
                let mut updated = entries.to_vec();
                updated.extend(plan.added);
                Ok(Some(updated))
            })?;
        }
        Ok(tree)
    }
}

/// Report the conflicts between bundle-wide permissions and the
/// permissions declared on resources.
///
/// These are the warnings [`ApplyBundlePermissions`] would record, without
/// changing the tree.
pub fn permission_overlaps(tree: &Value, settings: &PermissionSettings) -> Result<Diagnostics> {
    let bundle = bundle_permissions(tree, settings)?;
    let mut diagnostics = Diagnostics::new();
    if bundle.is_empty() {
        return Ok(diagnostics);
    }

    for resource_type in settings.resource_types.keys() {
        let pattern = resource_pattern(Some(resource_type.as_str()));
        visit_by_pattern(tree, &pattern, |path, resource| {
            if resource.as_mapping().is_none() {
                return Ok(());
            }
            let entries = permission_entries(resource, path)?;
            let permissions_path = path.key(PERMISSIONS_KEY);
            let plan = plan_resource(resource_type, &permissions_path, entries, &bundle, settings)?;
            diagnostics.extend(plan.warnings);
            Ok::<_, Error>(())
        })?;
    }
    Ok(diagnostics)
}

/// Parse and validate the top-level `permissions` list.
///
/// Every level is checked before the caller touches any resource.
fn bundle_permissions(
    tree: &Value,
    settings: &PermissionSettings,
) -> Result<Vec<(Permission, Value)>> {
    let Some(list) = tree.get(PERMISSIONS_KEY) else {
        return Ok(Vec::new());
    };
    let path = Path::from_keys([PERMISSIONS_KEY]);
    let entries = match &list.kind {
        ValueKind::Sequence(entries) => entries,
        ValueKind::Nil | ValueKind::Invalid => return Ok(Vec::new()),
        _ => {
            return Err(bundle_dyn::Error::KindMismatch {
                path,
                expected: Kind::Sequence,
                found: list.kind(),
            }
            .into());
        }
    };

    let permissions = parse_permissions(entries, &path)?;
    if let Some(invalid) = permissions.iter().find(|p| !settings.is_allowed(&p.level)) {
        return Err(Error::InvalidPermissionLevel {
            level: invalid.level.clone(),
            allowed: settings.allowed_levels.clone(),
        });
    }
    Ok(permissions.into_iter().zip(entries.iter().cloned()).collect())
}

/// What the bundle-wide list does to one resource.
#[derive(Default)]
struct Plan {
    /// Entries to append, in bundle order
    added: Vec<Value>,
    warnings: Vec<DiagnosticMessage>,
}

fn plan_resource(
    resource_type: &str,
    permissions_path: &Path,
    entries: &[Value],
    bundle: &[(Permission, Value)],
    settings: &PermissionSettings,
) -> Result<Plan> {
    let declared = parse_permissions(entries, permissions_path)?;
    let mut added: Vec<(Permission, &Value)> = Vec::new();
    let mut plan = Plan::default();

    for (permission, source) in bundle {
        match classify(resource_type, &declared, &added, permission, settings) {
            Outcome::Unmapped | Outcome::Present => {}
            Outcome::Overlap(index) => plan.warnings.push(overlap_warning(
                permissions_path,
                &entries[index],
                &declared[index],
                source,
                permission,
            )),
            Outcome::OwnerTaken(owner) => {
                let (current, locations) = match owner {
                    Owner::Declared(index) => (&declared[index], &entries[index].locations),
                    Owner::Added(index) => (&added[index].0, &added[index].1.locations),
                };
                plan.warnings.push(owner_conflict_warning(
                    permissions_path,
                    current,
                    locations,
                    source,
                    permission,
                ));
            }
            Outcome::Add(generated) => {
                tracing::trace!(
                    path = %permissions_path,
                    level = %generated.level,
                    principal = %generated.principal,
                    "adding bundle permission"
                );
                plan.added
                    .push(generated.to_value().with_locations(source.locations.clone()));
                added.push((generated, source));
            }
        }
    }
    Ok(plan)
}

enum Outcome {
    /// The resource type has no counterpart for the level.
    Unmapped,
    /// The resource already has exactly this entry.
    Present,
    /// The resource grants the principal another level, at this index.
    Overlap(usize),
    /// The level is the owner level and another principal is owner.
    OwnerTaken(Owner),
    Add(Permission),
}

/// Where the current owner of a resource comes from.
enum Owner {
    /// Index into the declared entries
    Declared(usize),
    /// Index into the entries added earlier in the pass
    Added(usize),
}

fn classify(
    resource_type: &str,
    declared: &[Permission],
    added: &[(Permission, &Value)],
    permission: &Permission,
    settings: &PermissionSettings,
) -> Outcome {
    let Some(level) = settings.remap_level(resource_type, &permission.level) else {
        return Outcome::Unmapped;
    };
    let generated = Permission::new(level, permission.principal.clone());
    if declared.contains(&generated) || added.iter().any(|(p, _)| *p == generated) {
        return Outcome::Present;
    }
    if let Some(index) = declared
        .iter()
        .position(|d| d.principal == generated.principal)
    {
        return Outcome::Overlap(index);
    }

    let owner = settings.owner_level.as_str();
    if generated.level == owner {
        if let Some(index) = declared.iter().position(|d| d.level == owner) {
            return Outcome::OwnerTaken(Owner::Declared(index));
        }
        if let Some(index) = added.iter().position(|(a, _)| a.level == owner) {
            return Outcome::OwnerTaken(Owner::Added(index));
        }
    }
    Outcome::Add(generated)
}

fn overlap_warning(
    permissions_path: &Path,
    declared_entry: &Value,
    declared: &Permission,
    bundle_entry: &Value,
    bundle: &Permission,
) -> DiagnosticMessage {
    let builder = DiagnosticMessageBuilder::warning("Permission overlap")
        .with_code("B-2-1")
        .at_path(permissions_path.clone())
        .with_locations(&declared_entry.locations)
        .problem(format!(
            "{} has permissions on this resource and in the bundle-wide permissions",
            declared.principal
        ))
        .add_info(format!("the resource grants {}", declared.level));
    skipped_detail(builder, bundle_entry, format!("bundle-wide {} was not applied", bundle.level))
        .add_hint("Remove the principal from one of the two lists?")
        .build()
}

fn owner_conflict_warning(
    permissions_path: &Path,
    owner: &Permission,
    owner_locations: &[Location],
    bundle_entry: &Value,
    bundle: &Permission,
) -> DiagnosticMessage {
    let builder = DiagnosticMessageBuilder::warning("Owner conflict")
        .with_code("B-2-4")
        .at_path(permissions_path.clone())
        .with_locations(owner_locations)
        .problem(format!("{} already owns this resource", owner.principal))
        .add_info("a resource has at most one owner");
    skipped_detail(
        builder,
        bundle_entry,
        format!("bundle-wide {} for {} was not applied", bundle.level, bundle.principal),
    )
    .add_hint("Grant the other principal a manage level instead?")
    .build()
}

/// Point the "not applied" detail at the bundle-wide entry when it has a
/// location.
fn skipped_detail(
    builder: DiagnosticMessageBuilder,
    bundle_entry: &Value,
    skipped: String,
) -> DiagnosticMessageBuilder {
    match bundle_entry.location() {
        Some(location) => builder.add_detail_at(skipped, location.clone()),
        None => builder.add_detail(skipped),
    }
}
